/*!
 * Line classification for the dataset segmenter.
 *
 * The dataset has no real markup: a vocabulary word is recognised only by
 * the absence of `=` and `:` on a line that starts with a letter. Keeping
 * that guess behind a trait lets the accumulation loop stay unchanged when
 * the heuristic is swapped or tuned.
 */

/// Part-of-speech markers that identify a meaning line
pub const MEANING_MARKERS: [&str; 3] = ["(v)", "(n)", "(adj)"];

/// Prefix that identifies a usage example line
pub const EXAMPLE_MARKER: &str = "Ex:";

/// Classification of a single trimmed line inside a topic block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineClass {
    /// Empty or whitespace-only line
    Blank,
    /// Candidate vocabulary word (the `english` value)
    Word,
    /// Line carrying a part-of-speech marker (the `vietnamese` value)
    Meaning,
    /// Line carrying the `Ex:` marker
    Example,
    /// Anything else; `parenthetical` is set when the line contains `(`
    Other { parenthetical: bool },
}

/// Strategy that decides what a dataset line is
///
/// Lines are passed already trimmed.
pub trait LineClassifier {
    /// Classify one trimmed line
    fn classify(&self, line: &str) -> LineClass;

    /// Extract the example sentence from a line classified as `Example`
    fn example_text(&self, line: &str) -> String {
        line.replace(EXAMPLE_MARKER, "").trim().to_string()
    }
}

/// The default heuristic used by the vocabulary datasets
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicClassifier;

impl HeuristicClassifier {
    /// A word starts with an ASCII letter and has no `=` or `:` anywhere
    pub fn is_word(line: &str) -> bool {
        line.chars().next().is_some_and(|c| c.is_ascii_alphabetic())
            && !line.contains('=')
            && !line.contains(':')
    }
}

impl LineClassifier for HeuristicClassifier {
    fn classify(&self, line: &str) -> LineClass {
        if line.is_empty() {
            return LineClass::Blank;
        }

        // Word wins over the markers: "run (v)" is still a headword line
        if Self::is_word(line) {
            return LineClass::Word;
        }

        if MEANING_MARKERS.iter().any(|marker| line.contains(marker)) {
            LineClass::Meaning
        } else if line.contains(EXAMPLE_MARKER) {
            LineClass::Example
        } else {
            LineClass::Other {
                parenthetical: line.contains('('),
            }
        }
    }
}
