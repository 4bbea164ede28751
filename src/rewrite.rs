//! Swaps the per-session Google video host for the stable redirector.

use std::sync::LazyLock;

use regex::{NoExpand, Regex};

pub const REDIRECTOR_PATH: &str = "/redirector.googlevideo.com";

// Matches `/r4---sn-abc.c.docs.google.com` as well as
// `/r5---sn-foo.googlevideo.com`.
static SESSION_HOST: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"/[^/]+\.google(?:video)?\.com").expect("session host pattern is valid")
});

/// Rewrites every session host segment in `link` to [`REDIRECTOR_PATH`].
/// Idempotent: an already rewritten link is returned unchanged.
pub fn rewrite_link(link: &str) -> String {
    SESSION_HOST
        .replace_all(link, NoExpand(REDIRECTOR_PATH))
        .into_owned()
}
