//! Format code to human readable quality label.

pub const UNKNOWN_QUALITY: &str = "unknown";

/// Known `itag`-style format codes.
pub const QUALITY_LABELS: &[(i64, &str)] = &[
    (5, "240p h263 flv"),
    (18, "360p h264 mp4"),
    (22, "720p h264 mp4"),
    (34, "360p h264 flv"),
    (35, "480p h264 flv"),
    (36, "3gpp"),
    (37, "1080p h264 mp4"),
    (38, "720p vp8 webm"),
    (43, "360p h264 flv"),
    (44, "480p vp8 webm"),
    (45, "720p vp8 webm"),
    (46, "520p vp8 webm"),
    (59, "480 for rtmpe"),
    (78, "400 for rtmpe"),
    (82, "360p h264 stereo"),
    (83, "240p h264 stereo"),
    (84, "720p h264 stereo"),
    (85, "520p h264 stereo"),
    (100, "360p vp8 webm stereo"),
    (101, "480p vp8 webm stereo"),
    (102, "720p vp8 webm stereo"),
    (120, "hd720"),
    (121, "hd1080"),
];

/// Label for `code`, or [`UNKNOWN_QUALITY`] when the code is not in the table.
pub fn quality_label(code: i64) -> &'static str {
    QUALITY_LABELS
        .iter()
        .find(|(known, _)| *known == code)
        .map(|(_, label)| *label)
        .unwrap_or(UNKNOWN_QUALITY)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn resolves_known_codes() {
        assert_eq!(quality_label(37), "1080p h264 mp4");
        assert_eq!(quality_label(18), "360p h264 mp4");
        assert_eq!(quality_label(120), "hd720");
        assert_eq!(quality_label(5), "240p h263 flv");
    }

    #[test]
    fn unknown_codes_fall_back() {
        assert_eq!(quality_label(999), UNKNOWN_QUALITY);
        assert_eq!(quality_label(0), UNKNOWN_QUALITY);
        assert_eq!(quality_label(-18), UNKNOWN_QUALITY);
        assert_eq!(quality_label(i64::MAX), UNKNOWN_QUALITY);
    }

    #[test]
    fn table_has_no_duplicate_codes() {
        let codes: HashSet<i64> = QUALITY_LABELS.iter().map(|(code, _)| *code).collect();
        assert_eq!(codes.len(), QUALITY_LABELS.len());
    }
}
