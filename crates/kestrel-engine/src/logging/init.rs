use std::sync::Once;

/// Logger configuration.
///
/// `env_filter` uses the `env_logger` filter syntax, e.g.
/// `"kestrel_engine=debug,wgpu=warn"`. When unset, `RUST_LOG` is consulted and
/// then [`LoggingConfig::DEFAULT_FILTER`] applies.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub env_filter: Option<String>,
    pub write_style: env_logger::WriteStyle,
    /// Prefix every line with a millisecond timestamp.
    pub timestamps: bool,
}

impl LoggingConfig {
    /// wgpu is chatty at info level; keep it at warn unless asked otherwise.
    pub const DEFAULT_FILTER: &'static str = "info,wgpu_core=warn,wgpu_hal=warn,naga=warn";
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            env_filter: None,
            write_style: env_logger::WriteStyle::Auto,
            timestamps: true,
        }
    }
}

static INIT: Once = Once::new();

/// Installs the global logger.
///
/// Only the first call has an effect. Call it at the top of `main`, before the
/// GPU device is created, so adapter selection is logged.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let mut builder = env_logger::Builder::new();

        let filter = config
            .env_filter
            .or_else(|| std::env::var("RUST_LOG").ok())
            .unwrap_or_else(|| LoggingConfig::DEFAULT_FILTER.to_string());
        builder.parse_filters(&filter);
        builder.write_style(config.write_style);

        if config.timestamps {
            builder.format_timestamp_millis();
        } else {
            builder.format_timestamp(None);
        }

        // `try_init` so a host application that already owns the logger wins.
        if builder.try_init().is_err() {
            log::debug!("global logger already installed; kestrel logging config ignored");
            return;
        }

        log::debug!("logging initialized (filter: {filter})");
    });
}
