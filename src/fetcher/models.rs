use std::collections::HashMap;
use std::path::PathBuf;

use serde::Deserialize;
use url::Url;

/// Subset of yt-dlp's `--dump-single-json` output
#[derive(Debug, Clone, Deserialize)]
pub struct VideoInfo {
    #[serde(default)]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub formats: Vec<StreamFormat>,
}

/// One entry of the `formats` array
#[derive(Debug, Clone, Deserialize)]
pub struct StreamFormat {
    pub format_id: String,
    #[serde(default)]
    pub ext: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub protocol: Option<String>,
    #[serde(default)]
    pub vcodec: Option<String>,
    #[serde(default)]
    pub acodec: Option<String>,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub tbr: Option<f64>,
    #[serde(default)]
    pub filesize: Option<u64>,
    #[serde(default)]
    pub http_headers: HashMap<String, String>,
}

fn has_codec(codec: &Option<String>) -> bool {
    codec.as_deref().is_some_and(|c| !c.is_empty() && c != "none")
}

impl StreamFormat {
    /// Audio and video muxed into a single stream.
    pub fn is_progressive(&self) -> bool {
        has_codec(&self.vcodec) && has_codec(&self.acodec)
    }

    /// Served as one plain HTTP(S) resource rather than a manifest.
    pub fn is_direct_http(&self) -> bool {
        let protocol_ok = matches!(self.protocol.as_deref(), None | Some("http") | Some("https"));
        let url_ok = self
            .url
            .as_deref()
            .and_then(|u| Url::parse(u).ok())
            .is_some_and(|u| matches!(u.scheme(), "http" | "https"));
        protocol_ok && url_ok
    }
}

/// Picks the highest-resolution progressive stream in `container`.
pub fn select_progressive<'a>(
    formats: &'a [StreamFormat],
    container: &str,
) -> Option<&'a StreamFormat> {
    formats
        .iter()
        .filter(|f| f.ext.eq_ignore_ascii_case(container))
        .filter(|f| f.is_progressive() && f.is_direct_http())
        .max_by(|a, b| {
            a.height
                .unwrap_or(0)
                .cmp(&b.height.unwrap_or(0))
                .then_with(|| {
                    a.tbr
                        .unwrap_or(0.0)
                        .partial_cmp(&b.tbr.unwrap_or(0.0))
                        .unwrap_or(std::cmp::Ordering::Equal)
                })
        })
}

/// Configuration for the yt-dlp backed fetcher
#[derive(Debug, Clone)]
pub struct FetcherConfig {
    pub ytdlp_path: PathBuf,
    /// Container the selected stream must use, so ffmpeg can read it later.
    pub container: String,
    pub resolve_timeout_secs: u64,
}

pub const YTDLP_PATH_ENV: &str = "VIDEO_DL_YTDLP";

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            ytdlp_path: std::env::var(YTDLP_PATH_ENV)
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("yt-dlp")),
            container: "mp4".to_string(),
            resolve_timeout_secs: 180,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "id": "abc123",
        "title": "Big Buck Bunny",
        "formats": [
            {"format_id": "sb0", "ext": "mhtml", "protocol": "mhtml", "vcodec": "none", "acodec": "none",
             "url": "https://i.ytimg.com/sb/abc123/storyboard.jpg"},
            {"format_id": "140", "ext": "m4a", "protocol": "https", "vcodec": "none", "acodec": "mp4a.40.2",
             "url": "https://media.example/140"},
            {"format_id": "18", "ext": "mp4", "protocol": "https", "vcodec": "avc1.42001E", "acodec": "mp4a.40.2",
             "height": 360, "tbr": 500.1, "url": "https://media.example/18",
             "http_headers": {"User-Agent": "Mozilla/5.0"}},
            {"format_id": "22", "ext": "mp4", "protocol": "https", "vcodec": "avc1.64001F", "acodec": "mp4a.40.2",
             "height": 720, "tbr": 1200.0, "url": "https://media.example/22"},
            {"format_id": "95", "ext": "mp4", "protocol": "m3u8_native", "vcodec": "avc1.4d401f", "acodec": "mp4a.40.2",
             "height": 1080, "url": "https://manifest.example/95/index.m3u8"},
            {"format_id": "137", "ext": "mp4", "protocol": "https", "vcodec": "avc1.640028", "acodec": "none",
             "height": 1080, "url": "https://media.example/137"},
            {"format_id": "43", "ext": "webm", "protocol": "https", "vcodec": "vp8.0", "acodec": "vorbis",
             "height": 1440, "url": "https://media.example/43"}
        ]
    }"#;

    #[test]
    fn test_parse_video_info() {
        let info: VideoInfo = serde_json::from_str(SAMPLE).unwrap();
        assert_eq!(info.id, "abc123");
        assert_eq!(info.title, "Big Buck Bunny");
        assert_eq!(info.formats.len(), 7);
        assert_eq!(
            info.formats[2].http_headers.get("User-Agent").map(String::as_str),
            Some("Mozilla/5.0")
        );
    }

    #[test]
    fn test_selects_highest_progressive_mp4() {
        let info: VideoInfo = serde_json::from_str(SAMPLE).unwrap();
        let chosen = select_progressive(&info.formats, "mp4").unwrap();
        // 95 is a manifest, 137 is video-only, 43 is webm
        assert_eq!(chosen.format_id, "22");
    }

    #[test]
    fn test_no_progressive_stream() {
        let info: VideoInfo = serde_json::from_str(
            r#"{"title": "Adaptive only", "formats": [
                {"format_id": "137", "ext": "mp4", "vcodec": "avc1", "acodec": "none", "height": 1080,
                 "url": "https://media.example/137"},
                {"format_id": "140", "ext": "m4a", "vcodec": "none", "acodec": "mp4a.40.2",
                 "url": "https://media.example/140"}
            ]}"#,
        )
        .unwrap();
        assert!(select_progressive(&info.formats, "mp4").is_none());
    }

    #[test]
    fn test_missing_url_is_skipped() {
        let info: VideoInfo = serde_json::from_str(
            r#"{"title": "No url", "formats": [
                {"format_id": "18", "ext": "mp4", "vcodec": "avc1", "acodec": "mp4a", "height": 360}
            ]}"#,
        )
        .unwrap();
        assert!(info.formats[0].is_progressive());
        assert!(!info.formats[0].is_direct_http());
        assert!(select_progressive(&info.formats, "mp4").is_none());
    }

    #[test]
    fn test_tbr_breaks_height_ties() {
        let info: VideoInfo = serde_json::from_str(
            r#"{"title": "Ties", "formats": [
                {"format_id": "a", "ext": "mp4", "vcodec": "avc1", "acodec": "mp4a", "height": 720, "tbr": 900.0,
                 "url": "https://media.example/a"},
                {"format_id": "b", "ext": "MP4", "vcodec": "avc1", "acodec": "mp4a", "height": 720, "tbr": 1500.0,
                 "url": "https://media.example/b"}
            ]}"#,
        )
        .unwrap();
        assert_eq!(select_progressive(&info.formats, "mp4").unwrap().format_id, "b");
    }
}
