//! Retrieves the Drive view page, retrying until it comes back as a rendered
//! HTML page with status 200.
//!
//! Transport lives behind [`PageSource`] so the retry policy can be exercised
//! without a network. [`HttpPageSource`] is the blocking `ureq` implementation
//! used by the binary.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::error::{Error, Result};

pub const DEFAULT_MAX_ATTEMPTS: u32 = 10;
pub const DEFAULT_INITIAL_BACKOFF: Duration = Duration::from_millis(500);
pub const DEFAULT_MAX_BACKOFF: Duration = Duration::from_secs(8);
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_USER_AGENT: &str = concat!("drive2html/", env!("CARGO_PKG_VERSION"));

const MAX_REDIRECTS: u32 = 10;
const CANCEL_POLL: Duration = Duration::from_millis(50);

/// Outcome of a single retrieval attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    pub body: String,
    pub status: u16,
    pub content_type: String,
    /// Set when the request failed below HTTP; `body` then holds the cause.
    pub is_error: bool,
}

impl FetchResponse {
    pub fn is_html(&self) -> bool {
        self.content_type
            .split(';')
            .next()
            .is_some_and(|mime| mime.trim().eq_ignore_ascii_case("text/html"))
    }

    /// True when this response can be handed to the manifest parser.
    pub fn is_usable(&self) -> bool {
        !self.is_error && self.status == 200 && self.is_html()
    }

    fn failure(&self) -> String {
        if self.is_error {
            format!("transport error: {}", self.body)
        } else if self.status != 200 {
            format!("HTTP status {}", self.status)
        } else {
            format!("unexpected content type {:?}", self.content_type)
        }
    }
}

/// Anything able to perform one GET for a page.
pub trait PageSource {
    fn fetch(&self, url: &str) -> FetchResponse;
}

/// Blocking HTTP source following redirects.
pub struct HttpPageSource {
    agent: ureq::Agent,
}

impl HttpPageSource {
    pub fn new(timeout: Duration, user_agent: &str) -> Self {
        let agent = ureq::AgentBuilder::new()
            .redirects(MAX_REDIRECTS)
            .timeout(timeout)
            .user_agent(user_agent)
            .build();
        Self { agent }
    }
}

impl PageSource for HttpPageSource {
    fn fetch(&self, url: &str) -> FetchResponse {
        match self.agent.get(url).call() {
            Ok(response) => read_response(response),
            Err(ureq::Error::Status(_, response)) => read_response(response),
            Err(ureq::Error::Transport(transport)) => FetchResponse {
                body: transport.to_string(),
                status: 0,
                content_type: String::new(),
                is_error: true,
            },
        }
    }
}

fn read_response(response: ureq::Response) -> FetchResponse {
    let status = response.status();
    let content_type = response.content_type().to_string();
    match response.into_string() {
        Ok(body) => FetchResponse {
            body,
            status,
            content_type,
            is_error: false,
        },
        Err(err) => FetchResponse {
            body: format!("reading body: {err}"),
            status,
            content_type,
            is_error: true,
        },
    }
}

/// Bounded retry with exponential backoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            initial_backoff: DEFAULT_INITIAL_BACKOFF,
            max_backoff: DEFAULT_MAX_BACKOFF,
        }
    }
}

impl RetryPolicy {
    /// Delay after the given failed attempt (1-based).
    pub fn backoff_after(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.initial_backoff
            .saturating_mul(factor)
            .min(self.max_backoff)
    }
}

/// Shared flag that aborts an in-flight retry loop.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

pub struct Fetcher<S> {
    source: S,
    policy: RetryPolicy,
    cancel: CancelFlag,
}

impl<S: PageSource> Fetcher<S> {
    pub fn new(source: S, policy: RetryPolicy) -> Self {
        Self {
            source,
            policy,
            cancel: CancelFlag::new(),
        }
    }

    pub fn with_cancel_flag(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn cancel_flag(&self) -> CancelFlag {
        self.cancel.clone()
    }

    /// Fetches `url` until a usable response arrives or the attempt budget
    /// runs out.
    pub fn fetch(&self, url: &str) -> Result<FetchResponse> {
        let max_attempts = self.policy.max_attempts.max(1);
        let mut last_failure = String::from("no attempt made");
        for attempt in 1..=max_attempts {
            if self.cancel.is_cancelled() {
                return Err(Error::Cancelled);
            }
            debug!(url, attempt, "fetching page");
            let response = self.source.fetch(url);
            if response.is_usable() {
                info!(url, attempt, bytes = response.body.len(), "page fetched");
                return Ok(response);
            }
            last_failure = response.failure();
            warn!(url, attempt, max_attempts, failure = %last_failure, "page fetch attempt failed");
            if attempt < max_attempts {
                self.pause(self.policy.backoff_after(attempt))?;
            }
        }
        Err(Error::FetchExhausted {
            attempts: max_attempts,
            last_failure,
        })
    }

    fn pause(&self, delay: Duration) -> Result<()> {
        let mut remaining = delay;
        while !remaining.is_zero() {
            if self.cancel.is_cancelled() {
                return Err(Error::Cancelled);
            }
            let step = remaining.min(CANCEL_POLL);
            thread::sleep(step);
            remaining -= step;
        }
        Ok(())
    }
}
