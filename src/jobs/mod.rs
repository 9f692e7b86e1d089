/*!
 * Administrative batch jobs.
 *
 * Each job is a one-shot pipeline over an explicit store handle:
 * - `upload`: segment a dataset and upload courses, lessons and tests
 * - `fetch`: collect one course's vocabulary by lesson
 * - `android`: write the mobile client's vocabulary assets
 * - `practice_test`: generate and upload the four-part practice test
 * - `cleanup`: delete duplicate lessons and relocate vocabulary
 * - `video_urls`: point every lesson and question at one video
 * - `verify`: summarize what the store holds
 */

use indicatif::{ProgressBar, ProgressStyle};

pub mod android;
pub mod cleanup;
pub mod fetch;
pub mod upload;
pub mod verify;
pub mod video_urls;

/// Progress bar in the application's style, counting `unit`
pub(crate) fn progress_bar(len: u64, unit: &str) -> ProgressBar {
    let progress_bar = ProgressBar::new(len);
    let template = format!(
        "{{spinner:.green}} [{{elapsed_precise}}] [{{bar:40.cyan/blue}}] {{pos}}/{{len}} {} ({{percent}}%) {{msg}}",
        unit
    );
    let style = ProgressStyle::default_bar()
        .template(&template)
        .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    progress_bar.set_style(style.progress_chars("█▓▒░"));
    progress_bar
}
