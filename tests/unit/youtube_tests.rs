/*!
 * Tests for YouTube URL helpers
 */

use vocabkit::youtube::{extract_video_id, is_youtube_url};

/// Test that the configured default video parses
#[test]
fn test_extractVideoId_withDefaultVideo_shouldReturnId() {
    assert_eq!(
        extract_video_id("https://www.youtube.com/watch?v=kFYgLjdSkXE"),
        Some("kFYgLjdSkXE".to_string())
    );
}

/// Test that placeholder lesson URLs still carry an id
#[test]
fn test_extractVideoId_withPlaceholderLessonUrl_shouldReturnId() {
    assert_eq!(
        extract_video_id("https://www.youtube.com/watch?v=example1_3"),
        Some("example1_3".to_string())
    );
}

/// Test that channel and empty short links have no video id
#[test]
fn test_extractVideoId_withoutVideo_shouldReturnNone() {
    assert_eq!(extract_video_id("https://www.youtube.com/channel/UC123"), None);
    assert_eq!(extract_video_id("https://youtu.be/"), None);
}

/// Test host detection
#[test]
fn test_isYoutubeUrl_shouldDetectBothHosts() {
    assert!(is_youtube_url("https://youtu.be/kFYgLjdSkXE"));
    assert!(is_youtube_url("https://m.youtube.com/watch?v=kFYgLjdSkXE"));
    assert!(!is_youtube_url("https://example.com/images/toeic_1.jpg"));
}
