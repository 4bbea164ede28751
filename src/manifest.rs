//! Locating, unescaping and splitting the `fmt_stream_map` blob embedded in a
//! Drive view page.
//!
//! The blob sits inside a JS array literal of the form
//! `["fmt_stream_map","<code>|<link>,<code>|<link>,..."]`, with `=` and `&`
//! written as `\u003d` and `\u0026`.

use tracing::debug;

use crate::error::{Error, Result};

pub const START_MARKER: &str = "[\"fmt_stream_map\",\"";
pub const END_MARKER: &str = "\"]";

/// Escape tokens in the order they are undone.
const ESCAPES: [(&str, &str); 2] = [("\\u003d", "="), ("\\u0026", "&")];

const RECORD_DELIMITER: char = ',';
const FIELD_DELIMITER: char = '|';

/// One `<code>|<link>` group as it appears in the decoded blob.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamRecord {
    pub format_code: i64,
    pub link: String,
}

/// Returns the text strictly between the start marker and the first end
/// marker after it.
pub fn locate(body: &str) -> Result<&str> {
    let start = body.find(START_MARKER).ok_or(Error::ManifestNotFound)? + START_MARKER.len();
    let rest = &body[start..];
    let len = rest.find(END_MARKER).ok_or(Error::ManifestUnterminated)?;
    debug!(offset = start, len, "located stream manifest");
    Ok(&rest[..len])
}

/// Undoes the two escape tokens. Anything else, including other `\uXXXX`
/// sequences, is left as is.
pub fn decode(blob: &str) -> String {
    let mut decoded = blob.to_string();
    for (token, literal) in ESCAPES {
        while decoded.contains(token) {
            decoded = decoded.replace(token, literal);
        }
    }
    decoded
}

/// Splits the decoded blob into records, preserving blob order.
///
/// Only the first `|` of each record separates code from link; any later `|`
/// stays in the link. An empty blob carries no records and a single trailing
/// `,` does not open a new one. Any other malformed record, empty ones
/// included, fails the whole split.
pub fn split_records(decoded: &str) -> Result<Vec<StreamRecord>> {
    if decoded.is_empty() {
        return Ok(Vec::new());
    }
    let mut raw_records: Vec<&str> = decoded.split(RECORD_DELIMITER).collect();
    if raw_records.len() > 1 && raw_records.last().is_some_and(|last| last.is_empty()) {
        raw_records.pop();
    }
    raw_records
        .into_iter()
        .enumerate()
        .map(|(index, raw)| parse_record(index, raw))
        .collect()
}

fn parse_record(index: usize, raw: &str) -> Result<StreamRecord> {
    let malformed = |reason: String| Error::RecordParse {
        index,
        record: raw.to_string(),
        reason,
    };
    let (code, link) = raw
        .split_once(FIELD_DELIMITER)
        .ok_or_else(|| malformed("missing '|' between format code and link".into()))?;
    let format_code = code
        .parse::<i64>()
        .map_err(|err| malformed(format!("format code {code:?}: {err}")))?;
    Ok(StreamRecord {
        format_code,
        link: link.to_string(),
    })
}
