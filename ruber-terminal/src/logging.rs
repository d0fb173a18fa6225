//! Logger initialization.
//!
//! The terminal is owned by the renderer while the app runs, so records can
//! be sent to a file instead of stderr.

use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::sync::Once;

use ruber_core::config::LoggingSection;

/// Logger configuration.
///
/// `env_filter` follows the `env_logger` filter syntax (e.g. "info",
/// "ruber_core=debug"). Without one, `RUST_LOG` is used, then `warn`.
#[derive(Debug, Clone, Default)]
pub struct LoggingConfig {
    pub env_filter: Option<String>,
    pub file: Option<PathBuf>,
}

impl From<&LoggingSection> for LoggingConfig {
    fn from(section: &LoggingSection) -> Self {
        Self {
            env_filter: section.filter.clone(),
            file: section.file.clone(),
        }
    }
}

static INIT: Once = Once::new();

/// Initializes the global logger once; later calls are ignored.
pub fn init_logging(config: LoggingConfig) -> io::Result<()> {
    let file = config.file.as_ref().map(File::create).transpose()?;

    INIT.call_once(|| {
        let mut builder = env_logger::Builder::new();

        if let Some(filter) = &config.env_filter {
            builder.parse_filters(filter);
        } else if let Ok(filter) = std::env::var("RUST_LOG") {
            builder.parse_filters(&filter);
        } else {
            builder.filter_level(log::LevelFilter::Warn);
        }

        if let Some(file) = file {
            builder.target(env_logger::Target::Pipe(Box::new(file)));
            builder.write_style(env_logger::WriteStyle::Never);
        }

        if builder.try_init().is_ok() {
            log::debug!("logging initialized");
        }
    });
    Ok(())
}
