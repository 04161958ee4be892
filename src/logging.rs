//! Logging setup
//!
//! Logs go to stderr. `RUST_LOG` overrides the default filter.

use tracing_subscriber::EnvFilter;

pub const DEFAULT_FILTER: &str = "fittrack=info,tower_http=info";

/// Filter from `RUST_LOG`, or [`DEFAULT_FILTER`] when unset or invalid
pub fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Install the global subscriber. Calling it twice is harmless.
pub fn init() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_parses() {
        temp_env::with_var("RUST_LOG", None::<&str>, || {
            let filter = env_filter();
            assert!(filter.to_string().contains("fittrack=info"));
        });
    }

    #[test]
    fn test_init_twice() {
        init();
        init();
    }
}
