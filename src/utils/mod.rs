pub mod build_info;

use tracing_subscriber::{fmt, EnvFilter};

/// Picks the filter text: `RUST_LOG` wins when set and non-empty, otherwise
/// the configured directive.
fn filter_spec(rust_log: Option<String>, directive: &str) -> String {
    rust_log
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| directive.to_string())
}

/// Installs the global subscriber, writing to stderr so prompts stay on stdout.
///
/// An unparsable filter falls back to the crate default.
pub fn init_tracing(directive: &str) {
    let spec = filter_spec(std::env::var(EnvFilter::DEFAULT_ENV).ok(), directive);
    let filter = EnvFilter::try_new(&spec)
        .unwrap_or_else(|_| EnvFilter::new(crate::DEFAULT_LOG_FILTER));

    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rust_log_replaces_the_configured_directive() {
        assert_eq!(
            filter_spec(Some("loan_wizard=debug".into()), "loan_wizard=info"),
            "loan_wizard=debug"
        );
    }

    #[test]
    fn configured_directive_applies_without_rust_log() {
        assert_eq!(filter_spec(None, "sacco_core=warn"), "sacco_core=warn");
        assert_eq!(filter_spec(Some("  ".into()), "sacco_core=warn"), "sacco_core=warn");
    }

    #[test]
    fn default_filter_parses() {
        assert!(EnvFilter::try_new(crate::DEFAULT_LOG_FILTER).is_ok());
    }
}
