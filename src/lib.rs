#![forbid(unsafe_code)]

//! Extracts direct video stream links from a Google Drive file page.
//!
//! The pipeline is strictly sequential: link to file id, id to view page,
//! page to the embedded `fmt_stream_map` blob, blob to ordered streams with a
//! quality label and a redirector-based link each.

pub mod config;
pub mod error;
pub mod fetch;
pub mod identifier;
pub mod logging;
pub mod manifest;
pub mod quality;
pub mod report;
pub mod rewrite;

use tracing::info;

pub use error::{Error, Result};
use fetch::{Fetcher, PageSource};
use identifier::extract_identifier;
use report::ResolvedStream;

/// Turns a fetched page body into its streams, in manifest order.
pub fn resolve_streams(body: &str) -> Result<Vec<ResolvedStream>> {
    let blob = manifest::locate(body)?;
    let decoded = manifest::decode(blob);
    let streams: Vec<ResolvedStream> = manifest::split_records(&decoded)?
        .into_iter()
        .map(|record| ResolvedStream {
            format_code: record.format_code,
            quality_label: quality::quality_label(record.format_code).to_string(),
            link: rewrite::rewrite_link(&record.link),
        })
        .collect();
    info!(streams = streams.len(), "resolved stream manifest");
    Ok(streams)
}

/// Full run for one user supplied Drive link.
pub fn extract_streams<S: PageSource>(
    url: &str,
    drive_host: &str,
    fetcher: &Fetcher<S>,
) -> Result<Vec<ResolvedStream>> {
    let id = extract_identifier(url).ok_or_else(|| Error::InvalidInputUrl {
        url: url.to_string(),
    })?;
    info!(%id, "recognized Drive file");
    let page = fetcher.fetch(&id.view_url(drive_host))?;
    resolve_streams(&page.body)
}
