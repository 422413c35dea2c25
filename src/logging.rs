//! Logging configuration and initialization.
//!
//! Maps the CLI verbosity flags onto a tracing subscriber.

use tracing::Level;

/// Effective verbosity selected by the CLI flags.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogLevel {
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Precedence:
    /// 1. `quiet` forces WARN+.
    /// 2. `-vv` => TRACE.
    /// 3. `-v`  => DEBUG.
    /// 4. Else INFO with optional `RUST_LOG` env filter overrides.
    pub fn from_flags(quiet: bool, verbose: u8) -> Self {
        if quiet {
            LogLevel::Warn
        } else if verbose > 1 {
            LogLevel::Trace
        } else if verbose == 1 {
            LogLevel::Debug
        } else {
            LogLevel::Info
        }
    }
}

/// Install the global tracing subscriber for the selected level.
pub fn configure_logging(level: LogLevel) {
    let max = match level {
        LogLevel::Warn => Level::WARN,
        LogLevel::Info => Level::INFO,
        LogLevel::Debug => Level::DEBUG,
        LogLevel::Trace => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_max_level(max)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quiet_wins_over_verbose() {
        assert_eq!(LogLevel::from_flags(true, 2), LogLevel::Warn);
    }

    #[test]
    fn verbosity_counts_map_to_levels() {
        assert_eq!(LogLevel::from_flags(false, 0), LogLevel::Info);
        assert_eq!(LogLevel::from_flags(false, 1), LogLevel::Debug);
        assert_eq!(LogLevel::from_flags(false, 2), LogLevel::Trace);
        assert_eq!(LogLevel::from_flags(false, 5), LogLevel::Trace);
    }
}
