//! Tracing configuration for the lk binary.
//!
//! Library code logs through the `log` facade; the subscriber set up here
//! receives those records too. Messages containing one of the configured
//! `suppressed_patterns` are dropped.

use std::fs::File;
use std::io;
use std::sync::Mutex;

use leaderkey::config::LoggingConfig;
use tracing::{Event, Subscriber};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{self, FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Event formatter that drops messages containing a suppressed pattern.
struct FilteringFormatter {
    inner: fmt::format::Format,
    suppressed_patterns: Vec<String>,
}

impl FilteringFormatter {
    fn new(suppressed_patterns: Vec<String>) -> Self {
        Self {
            inner: fmt::format::Format::default().with_target(false),
            suppressed_patterns,
        }
    }

    fn is_suppressed(&self, message: &str) -> bool {
        self.suppressed_patterns
            .iter()
            .any(|pattern| message.contains(pattern.as_str()))
    }
}

impl<S, N> FormatEvent<S, N> for FilteringFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(&self, ctx: &FmtContext<'_, S, N>, mut writer: Writer<'_>, event: &Event<'_>) -> std::fmt::Result {
        let mut message_buf = String::new();
        self.inner.format_event(ctx, Writer::new(&mut message_buf), event)?;

        if self.is_suppressed(&message_buf) {
            Ok(())
        } else {
            write!(writer, "{message_buf}")
        }
    }
}

/// Initialize the tracing subscriber from `LoggingConfig`.
///
/// - `RUST_LOG` filtering, defaulting to the configured level
/// - suppressed patterns
/// - output to the configured log file, else stderr
///
/// # Panics
///
/// Panics if a global subscriber has already been set.
pub fn init(config: &LoggingConfig) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));
    let suppressed = config.suppressed_patterns.clone();

    let log_file = config.log_file.as_ref().and_then(|path| match File::create(path) {
        Ok(file) => Some(file),
        Err(err) => {
            eprintln!("Warning: cannot open log file {}: {err}", path.display());
            None
        }
    });

    if let Some(log_file) = log_file {
        let fmt_layer = fmt::layer()
            .with_ansi(false)
            .with_writer(Mutex::new(log_file))
            .event_format(FilteringFormatter::new(suppressed));

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .init();
    } else {
        let fmt_layer = fmt::layer()
            .with_writer(io::stderr)
            .event_format(FilteringFormatter::new(suppressed));

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suppressed_patterns_match_substrings() {
        let formatter = FilteringFormatter::new(vec!["Keymap reloaded".to_string()]);
        assert!(formatter.is_suppressed("DEBUG Keymap reloaded (0 override entries skipped)"));
        assert!(!formatter.is_suppressed("WARN Skipping override"));
    }
}
