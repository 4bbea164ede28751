//! Recognizes Google Drive links and pulls out the file id.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

pub const DEFAULT_DRIVE_HOST: &str = "drive.google.com";

static DRIVE_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"https://(?:drive|docs)\.google\.com/(?:file/d/|uc\?id=)([a-zA-Z0-9-]+)")
        .expect("drive link pattern is valid")
});

/// Opaque file id taken from a recognized Drive link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoIdentifier(String);

impl VideoIdentifier {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Canonical page that embeds the stream map for this file.
    pub fn view_url(&self, drive_host: &str) -> String {
        format!("https://{drive_host}/file/d/{}/view?pli=1", self.0)
    }
}

impl fmt::Display for VideoIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Searches `url` for a Drive link and returns its file id.
///
/// The search is unanchored, so surrounding text is tolerated. `None` means
/// the URL is not usable input and must never be treated as an empty id.
pub fn extract_identifier(url: &str) -> Option<VideoIdentifier> {
    DRIVE_LINK
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|token| VideoIdentifier(token.as_str().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(url: &str) -> Option<String> {
        extract_identifier(url).map(|id| id.as_str().to_string())
    }

    #[test]
    fn extracts_file_path_token() {
        assert_eq!(
            id("https://drive.google.com/file/d/ABC123-xyz/view").as_deref(),
            Some("ABC123-xyz")
        );
    }

    #[test]
    fn extracts_uc_query_token_on_docs_host() {
        assert_eq!(
            id("https://docs.google.com/uc?id=0B7abc-DEF&export=download").as_deref(),
            Some("0B7abc-DEF")
        );
    }

    #[test]
    fn token_stops_at_first_disallowed_character() {
        assert_eq!(
            id("https://drive.google.com/file/d/abc_def/view").as_deref(),
            Some("abc")
        );
    }

    #[test]
    fn rejects_other_hosts_and_shapes() {
        assert_eq!(id("https://example.com/file/d/abc/view"), None);
        assert_eq!(id("http://drive.google.com/file/d/abc/view"), None);
        assert_eq!(id("https://drive.google.com/open?id=abc"), None);
        assert_eq!(id("https://drive.google.com/file/d/"), None);
        assert_eq!(id(""), None);
    }

    #[test]
    fn uc_requires_literal_question_mark() {
        assert_eq!(id("https://drive.google.com/uid=abc"), None);
    }

    #[test]
    fn builds_view_url() {
        let ident = extract_identifier("https://drive.google.com/file/d/XYZ/view").unwrap();
        assert_eq!(
            ident.view_url(DEFAULT_DRIVE_HOST),
            "https://drive.google.com/file/d/XYZ/view?pli=1"
        );
        assert_eq!(ident.to_string(), "XYZ");
    }
}
