//! Logger setup for hosts embedding the engine.
//!
//! The engine itself only uses the `log` facade; binaries call
//! [`init_logging`] once early in `main`.

use std::sync::Once;

/// Logger configuration.
///
/// Filter precedence: `env_filter`, then `RUST_LOG`, then `default_level`.
/// Filters use `env_logger` syntax (e.g. "blockfall_engine=debug,warn").
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub env_filter: Option<String>,
    pub default_level: log::LevelFilter,
    pub write_style: env_logger::WriteStyle,
    /// Prefix records with a timestamp. Off for reproducible console output.
    pub timestamps: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            env_filter: None,
            default_level: log::LevelFilter::Info,
            write_style: env_logger::WriteStyle::Auto,
            timestamps: true,
        }
    }
}

impl LoggingConfig {
    fn filter(&self) -> Option<String> {
        self.env_filter.clone().or_else(|| std::env::var("RUST_LOG").ok())
    }
}

static INIT: Once = Once::new();

/// Installs `env_logger` as the global logger. Later calls are ignored.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let mut builder = env_logger::Builder::new();
        match config.filter() {
            Some(filter) => builder.parse_filters(&filter),
            None => builder.filter_level(config.default_level),
        };
        builder.write_style(config.write_style);
        if !config.timestamps {
            builder.format_timestamp(None);
        }

        if builder.try_init().is_err() {
            // Someone else installed a logger first; keep theirs.
            return;
        }
        log::debug!("logging initialized");
    });
}
