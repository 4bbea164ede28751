//! Renders resolved streams as plain lines or as a single JSON array.

use std::io;

use serde::Serialize;
use serde_json::ser::{Formatter, Serializer};

/// A stream ready to be reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedStream {
    pub format_code: i64,
    pub quality_label: String,
    pub link: String,
}

/// Wire shape of one JSON element. The format code goes out as a string.
#[derive(Serialize)]
struct JsonStream<'a> {
    #[serde(rename = "type")]
    format_code: String,
    quality: &'a str,
    link: &'a str,
}

impl<'a> From<&'a ResolvedStream> for JsonStream<'a> {
    fn from(stream: &'a ResolvedStream) -> Self {
        Self {
            format_code: stream.format_code.to_string(),
            quality: &stream.quality_label,
            link: &stream.link,
        }
    }
}

/// Compact JSON, except that array elements and object members are joined
/// with `, `.
struct SpacedSeparators;

impl Formatter for SpacedSeparators {
    fn begin_array_value<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        if first { Ok(()) } else { writer.write_all(b", ") }
    }

    fn begin_object_key<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        if first { Ok(()) } else { writer.write_all(b", ") }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Text,
    Json,
}

impl OutputMode {
    pub fn from_json_flag(json: bool) -> Self {
        if json { OutputMode::Json } else { OutputMode::Text }
    }
}

pub fn render(streams: &[ResolvedStream], mode: OutputMode) -> serde_json::Result<String> {
    match mode {
        OutputMode::Text => Ok(render_text(streams)),
        OutputMode::Json => render_json(streams),
    }
}

/// One `<code> <label> <link>` line per stream, each newline terminated.
pub fn render_text(streams: &[ResolvedStream]) -> String {
    let mut out = String::new();
    for stream in streams {
        out.push_str(&format!(
            "{} {} {}\n",
            stream.format_code, stream.quality_label, stream.link
        ));
    }
    out
}

/// `[{"type":"18", "quality":"...", "link":"..."}, ...]` in record order.
pub fn render_json(streams: &[ResolvedStream]) -> serde_json::Result<String> {
    let rows: Vec<JsonStream<'_>> = streams.iter().map(JsonStream::from).collect();
    let mut serializer = Serializer::with_formatter(Vec::new(), SpacedSeparators);
    rows.serialize(&mut serializer)?;
    Ok(String::from_utf8_lossy(&serializer.into_inner()).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn stream(code: i64, label: &str, link: &str) -> ResolvedStream {
        ResolvedStream {
            format_code: code,
            quality_label: label.into(),
            link: link.into(),
        }
    }

    #[test]
    fn json_of_nothing_is_empty_array() {
        assert_eq!(render_json(&[]).unwrap(), "[]");
    }

    #[test]
    fn json_single_element_has_no_trailing_comma() {
        let out = render_json(&[stream(18, "360p h264 mp4", "https://a/b?c=1&d=2")]).unwrap();
        assert_eq!(
            out,
            r#"[{"type":"18", "quality":"360p h264 mp4", "link":"https://a/b?c=1&d=2"}]"#
        );
    }

    #[test]
    fn json_preserves_order_and_separators() {
        let out = render_json(&[
            stream(37, "1080p h264 mp4", "https://a"),
            stream(18, "360p h264 mp4", "https://b"),
        ])
        .unwrap();
        assert!(out.contains(r#""link":"https://a"}, {"type":"18""#));
        let parsed: Value = serde_json::from_str(&out).unwrap();
        let items = parsed.as_array().unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0]["type"], "37");
        assert_eq!(items[1]["quality"], "360p h264 mp4");
    }

    #[test]
    fn json_escapes_quotes_in_links() {
        let out = render_json(&[stream(5, "240p h263 flv", r#"https://a/"x""#)]).unwrap();
        let parsed: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed[0]["link"], r#"https://a/"x""#);
    }

    #[test]
    fn text_mode_writes_one_line_per_stream() {
        let out = render_text(&[
            stream(18, "360p h264 mp4", "https://a"),
            stream(999, "unknown", "https://b"),
        ]);
        assert_eq!(out, "18 360p h264 mp4 https://a\n999 unknown https://b\n");
        assert_eq!(render_text(&[]), "");
    }

    #[test]
    fn json_escapes_control_characters() {
        let out = render_json(&[stream(18, "360p h264 mp4", "https://a/\\b\tc")]).unwrap();
        assert_eq!(
            out,
            r#"[{"type":"18", "quality":"360p h264 mp4", "link":"https://a/\\b\tc"}]"#
        );
    }

    #[test]
    fn mode_follows_flag() {
        assert_eq!(OutputMode::from_json_flag(true), OutputMode::Json);
        assert_eq!(
            render(&[stream(22, "720p h264 mp4", "l")], OutputMode::from_json_flag(false))
                .unwrap(),
            "22 720p h264 mp4 l\n"
        );
    }
}
