/// Sanitize filename to remove invalid characters
pub fn sanitize_filename(filename: &str) -> String {
    filename
        .chars()
        .map(|c| match c {
            '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*' => '_',
            c if c.is_control() => '_',
            _ => c,
        })
        .collect::<String>()
        .trim()
        .to_string()
}

/// File name stem for a media title, shared by the video and its audio exports.
pub fn file_stem(title: &str) -> String {
    let stem = sanitize_filename(title)
        .trim_matches(|c| c == '.' || c == ' ')
        .to_string();
    if stem.is_empty() {
        "video".to_string()
    } else {
        stem
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("test/file.mp3"), "test_file.mp3");
        assert_eq!(sanitize_filename("normal-name.mp3"), "normal-name.mp3");
        assert_eq!(sanitize_filename("tab\there"), "tab_here");
    }

    #[test]
    fn test_file_stem() {
        assert_eq!(file_stem("My: Clip?"), "My_ Clip_");
        assert_eq!(file_stem(" ..hidden.. "), "hidden");
        assert_eq!(file_stem("..."), "video");
    }
}
