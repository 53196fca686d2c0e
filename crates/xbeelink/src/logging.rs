use std::io::IsTerminal;

use clap::ValueEnum;
use tracing::level_filters::LevelFilter;

/// Overrides `--log-level` when set, e.g. `XBEELINK_LOG=trace` to see
/// every frame the reader thread handles.
pub const LOG_ENV: &str = "XBEELINK_LOG";

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_filter(self) -> LevelFilter {
        match self {
            LogLevel::Off => LevelFilter::OFF,
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Trace => LevelFilter::TRACE,
        }
    }

    /// The level named by [`LOG_ENV`], falling back to `self`.
    fn or_env(self, env: Option<&str>) -> Self {
        env.and_then(|value| LogLevel::from_str(value.trim(), true).ok())
            .unwrap_or(self)
    }
}

/// Install the stderr subscriber. Frames go to stdout, logs never do.
pub fn init_logging(format: LogFormat, level: LogLevel) {
    let env = std::env::var(LOG_ENV).ok();
    let level = level.or_env(env.as_deref());

    let stderr = std::io::stderr();
    let builder = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level.as_filter())
        .with_ansi(stderr.is_terminal())
        .with_target(level == LogLevel::Trace)
        .with_thread_names(true);

    match format {
        LogFormat::Text => {
            let _ = builder.try_init();
        }
        LogFormat::Json => {
            let _ = builder.json().try_init();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_level_overrides_flag() {
        assert_eq!(LogLevel::Info.or_env(Some("trace")), LogLevel::Trace);
        assert_eq!(LogLevel::Info.or_env(Some(" WARN ")), LogLevel::Warn);
    }

    #[test]
    fn bad_or_missing_env_keeps_flag() {
        assert_eq!(LogLevel::Debug.or_env(Some("loud")), LogLevel::Debug);
        assert_eq!(LogLevel::Debug.or_env(None), LogLevel::Debug);
    }

    #[test]
    fn off_disables_everything() {
        assert_eq!(LogLevel::Off.as_filter(), LevelFilter::OFF);
    }
}
