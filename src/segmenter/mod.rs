/*!
 * Dataset segmentation.
 *
 * Turns a flat vocabulary dump into topics and vocabulary entries:
 *
 * ```text
 * TOPIC 1: Contracts
 * agreement
 * (n) sự đồng ý, hợp đồng
 * Ex: They reached an agreement.
 * ```
 *
 * Segmentation is lossy on purpose: a word without a discoverable meaning
 * line is dropped, and a topic without any valid word keeps an empty list.
 */

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::errors::SegmentError;

pub mod classifier;

pub use classifier::{HeuristicClassifier, LineClass, LineClassifier};

// @const: Topic boundary line, captures the topic name
static TOPIC_MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^[ \t]*(?:TOPIC|TOEIC) \d+:[ \t]*(.*)$").unwrap()
});

/// One word or phrase with its meaning and an optional example
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VocabularyEntry {
    pub english: String,
    pub vietnamese: String,
    #[serde(default)]
    pub example: String,
}

/// A named section of the dataset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    pub name: String,
    pub vocabulary: Vec<VocabularyEntry>,
}

impl Topic {
    /// Name used when a marker line carries no name
    pub fn fallback_name(index: usize) -> String {
        format!("TOEIC Topic {}", index + 1)
    }
}

/// Splits dataset text into topics using a line classifier
#[derive(Debug, Clone, Default)]
pub struct Segmenter<C = HeuristicClassifier> {
    classifier: C,
}

impl Segmenter {
    /// Segmenter with the default heuristic
    pub fn new() -> Self {
        Self::default()
    }
}

impl<C: LineClassifier> Segmenter<C> {
    /// Segmenter with a custom classification strategy
    pub fn with_classifier(classifier: C) -> Self {
        Self { classifier }
    }

    /// Read a UTF-8 dataset file and segment it
    pub fn segment_file<P: AsRef<Path>>(&self, path: P) -> Result<Vec<Topic>, SegmentError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SegmentError::InputNotFound(path.to_path_buf()));
        }

        let content = std::fs::read_to_string(path).map_err(|source| SegmentError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        Ok(self.segment(&content))
    }

    /// Segment dataset text into topics in source order
    pub fn segment(&self, text: &str) -> Vec<Topic> {
        let topics: Vec<Topic> = split_topics(text)
            .into_iter()
            .enumerate()
            .map(|(index, (name, block))| Topic {
                name: name
                    .map(str::to_string)
                    .unwrap_or_else(|| Topic::fallback_name(index)),
                vocabulary: self.scan_block(block),
            })
            .collect();

        debug!(
            "Segmented {} topics with {} entries",
            topics.len(),
            topics.iter().map(|t| t.vocabulary.len()).sum::<usize>()
        );

        topics
    }

    /// Scan one topic block and collect its vocabulary entries
    fn scan_block(&self, block: &str) -> Vec<VocabularyEntry> {
        let lines: Vec<&str> = block.lines().map(str::trim).collect();
        let classes: Vec<LineClass> = lines
            .iter()
            .map(|line| self.classifier.classify(line))
            .collect();

        let mut entries = Vec::new();
        let mut cursor = 0;

        while cursor < lines.len() {
            if classes[cursor] != LineClass::Word {
                cursor += 1;
                continue;
            }

            let english = lines[cursor];
            cursor += 1;

            let mut vietnamese = "";
            let mut example = String::new();

            // Everything up to the next word belongs to this one; blanks fall through
            while cursor < lines.len() && classes[cursor] != LineClass::Word {
                match classes[cursor] {
                    LineClass::Meaning => vietnamese = lines[cursor],
                    LineClass::Example => example = self.classifier.example_text(lines[cursor]),
                    LineClass::Other { parenthetical: false }
                        if example.is_empty() && !vietnamese.is_empty() =>
                    {
                        example = lines[cursor].to_string();
                    }
                    _ => {}
                }
                cursor += 1;
            }

            if english.is_empty() || vietnamese.is_empty() {
                debug!("Dropping '{}': no meaning line found", english);
                continue;
            }

            entries.push(VocabularyEntry {
                english: english.to_string(),
                vietnamese: vietnamese.to_string(),
                example,
            });
        }

        entries
    }
}

/// Split text into (name, block) pairs, one per topic marker
///
/// Text before the first marker is discarded. The marker line itself is not
/// part of the block.
fn split_topics(text: &str) -> Vec<(Option<&str>, &str)> {
    let markers: Vec<_> = TOPIC_MARKER.captures_iter(text).collect();

    markers
        .iter()
        .enumerate()
        .map(|(i, caps)| {
            let whole = caps.get(0).map_or(0..0, |m| m.range());
            let block_end = markers
                .get(i + 1)
                .and_then(|next| next.get(0))
                .map_or(text.len(), |m| m.start());

            let name = caps
                .get(1)
                .map(|m| m.as_str().trim())
                .filter(|name| !name.is_empty());

            (name, &text[whole.end..block_end])
        })
        .collect()
}

/// Segment text with the default heuristic
pub fn segment(text: &str) -> Vec<Topic> {
    Segmenter::new().segment(text)
}

/// Segment a dataset file with the default heuristic
pub fn segment_file<P: AsRef<Path>>(path: P) -> Result<Vec<Topic>, SegmentError> {
    Segmenter::new().segment_file(path)
}
