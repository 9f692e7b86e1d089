use url::Url;

// @module: YouTube URL helpers used when rewriting lesson videos

/// True when the URL points at youtube.com or youtu.be
pub fn is_youtube_url(url: &str) -> bool {
    url.contains("youtube.com") || url.contains("youtu.be")
}

/// Extract the video id from watch, short and embed URLs
pub fn extract_video_id(url: &str) -> Option<String> {
    if !is_youtube_url(url) {
        return None;
    }

    let parsed = Url::parse(url).ok()?;
    let host = parsed.host_str()?;

    let id = if host.ends_with("youtu.be") {
        parsed.path_segments()?.next().map(str::to_string)
    } else if parsed.path() == "/watch" {
        parsed
            .query_pairs()
            .find(|(key, _)| key == "v")
            .map(|(_, value)| value.into_owned())
    } else {
        let mut segments = parsed.path_segments()?;
        match segments.next() {
            Some("embed") => segments.next().map(str::to_string),
            _ => None,
        }
    };

    id.filter(|id| !id.is_empty())
}
