use std::io;

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Maps repeated `-v` flags onto a level, starting from `base`.
pub fn level_for_verbosity(base: &str, verbose: u8) -> String {
    match verbose {
        0 => base.to_string(),
        1 => "info".to_string(),
        _ => "debug".to_string(),
    }
}

/// Installs the global subscriber. `RUST_LOG` wins over `level`. Logs go to
/// stderr so stdout only carries the report.
pub fn init(level: &str) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let stderr_layer = fmt::layer()
        .with_writer(io::stderr)
        .with_target(false)
        .compact();

    // A second init (tests, embedding) keeps the first subscriber.
    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_raises_level() {
        assert_eq!(level_for_verbosity("warn", 0), "warn");
        assert_eq!(level_for_verbosity("warn", 1), "info");
        assert_eq!(level_for_verbosity("error", 4), "debug");
    }

    #[test]
    fn init_twice_does_not_panic() {
        init("debug");
        init("warn");
    }
}
