//! Log settings resolved from the environment and CLI flags.
//!
//! Precedence, lowest first: built-in defaults, `RUST_LOG`, `TG_LOG`,
//! `TG_LOG_FORMAT`, then `-v`/`-q`/`--log-format`.

use clap::ValueEnum;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

/// How log events are written to stderr.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogFormat {
    /// Console lines, colored on a terminal.
    #[default]
    #[value(alias = "pretty")]
    Human,
    /// One JSON object per event.
    #[value(alias = "json")]
    Jsonl,
}

impl std::fmt::Display for LogFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            LogFormat::Human => "human",
            LogFormat::Jsonl => "jsonl",
        })
    }
}

/// Level implied by `-v` repetitions and `-q`; `None` leaves the env in charge.
pub fn verbosity_level(verbose: u8, quiet: bool) -> Option<LevelFilter> {
    match (quiet, verbose) {
        (true, _) => Some(LevelFilter::ERROR),
        (false, 0) => None,
        (false, 1) => Some(LevelFilter::DEBUG),
        (false, _) => Some(LevelFilter::TRACE),
    }
}

#[derive(Debug, Clone)]
pub struct LogConfig {
    pub format: LogFormat,
    pub level: LevelFilter,
    /// Prefix human output with timestamps.
    pub timestamps: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::Human,
            level: LevelFilter::INFO,
            timestamps: true,
        }
    }
}

impl LogConfig {
    pub fn from_env(cli_level: Option<LevelFilter>, cli_format: Option<LogFormat>) -> Self {
        Self::from_lookup(cli_level, cli_format, |key| std::env::var(key).ok())
    }

    /// [`from_env`](Self::from_env) with the environment passed in.
    pub fn from_lookup<F>(
        cli_level: Option<LevelFilter>,
        cli_format: Option<LogFormat>,
        env: F,
    ) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        // TG_LOG is a bare level; RUST_LOG may be a directive list, so take
        // its most verbose level.
        let env_level = match env("TG_LOG") {
            Some(val) => val.parse::<LevelFilter>().ok(),
            None => env("RUST_LOG")
                .and_then(|val| EnvFilter::try_new(val).ok())
                .and_then(|filter| filter.max_level_hint()),
        };
        let env_format = env("TG_LOG_FORMAT").and_then(|val| LogFormat::from_str(&val, true).ok());

        Self {
            level: cli_level.or(env_level).unwrap_or(defaults.level),
            format: cli_format.or(env_format).unwrap_or(defaults.format),
            timestamps: defaults.timestamps,
        }
    }

    pub fn with_format(self, format: LogFormat) -> Self {
        Self { format, ..self }
    }

    pub fn with_level(self, level: LevelFilter) -> Self {
        Self { level, ..self }
    }

    pub fn without_timestamps(self) -> Self {
        Self {
            timestamps: false,
            ..self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn format_names_and_aliases() {
        assert_eq!(LogFormat::from_str("JSON", true).unwrap(), LogFormat::Jsonl);
        assert_eq!(LogFormat::from_str("pretty", true).unwrap(), LogFormat::Human);
        assert!(LogFormat::from_str("xml", true).is_err());
        assert_eq!(LogFormat::Jsonl.to_string(), "jsonl");
    }

    #[test]
    fn verbosity_flags() {
        assert_eq!(verbosity_level(0, false), None);
        assert_eq!(verbosity_level(1, false), Some(LevelFilter::DEBUG));
        assert_eq!(verbosity_level(4, false), Some(LevelFilter::TRACE));
        assert_eq!(verbosity_level(2, true), Some(LevelFilter::ERROR));
    }

    #[test]
    fn tg_log_beats_rust_log() {
        let env = lookup(&[
            ("TG_LOG", "warn"),
            ("RUST_LOG", "trace"),
            ("TG_LOG_FORMAT", "jsonl"),
        ]);
        let config = LogConfig::from_lookup(None, None, &env);
        assert_eq!(config.level, LevelFilter::WARN);
        assert_eq!(config.format, LogFormat::Jsonl);

        let config = LogConfig::from_lookup(Some(LevelFilter::DEBUG), Some(LogFormat::Human), &env);
        assert_eq!(config.level, LevelFilter::DEBUG);
        assert_eq!(config.format, LogFormat::Human);
    }

    #[test]
    fn rust_log_directives_use_most_verbose_level() {
        let env = lookup(&[("RUST_LOG", "warn,tg_core=debug")]);
        assert_eq!(LogConfig::from_lookup(None, None, env).level, LevelFilter::DEBUG);

        let config = LogConfig::from_lookup(None, None, lookup(&[]));
        assert_eq!(config.level, LevelFilter::INFO);
        assert_eq!(config.format, LogFormat::Human);
    }

    #[test]
    fn unparseable_values_fall_back() {
        let env = lookup(&[("TG_LOG", "loud"), ("TG_LOG_FORMAT", "xml")]);
        let config = LogConfig::from_lookup(None, None, env);
        assert_eq!(config.level, LevelFilter::INFO);
        assert_eq!(config.format, LogFormat::Human);
    }

    #[test]
    fn builder() {
        let config = LogConfig::default()
            .with_format(LogFormat::Jsonl)
            .with_level(LevelFilter::OFF)
            .without_timestamps();
        assert_eq!(config.format, LogFormat::Jsonl);
        assert_eq!(config.level, LevelFilter::OFF);
        assert!(!config.timestamps);
    }
}
