//! Logging initialization.
//!
//! A thin `tracing-subscriber` setup driven by [`LoggingSettings`]: an
//! `EnvFilter` seeded from the configured level (with `RUST_LOG` taking
//! precedence when set), a compact/full/pretty format layer, and a
//! stdout/stderr writer.
//!
//! # Example
//!
//! ```rust,ignore
//! use cadre_runtime::logging::LoggingBuilder;
//!
//! LoggingBuilder::new()
//!     .directive("cadre_core=trace")
//!     .init();
//! ```

use tracing_subscriber::prelude::*;
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{EnvFilter, fmt};

use crate::settings::{LogFormat, LogOutput, LoggingSettings};

/// Initializes logging from settings; safe to call when a subscriber is
/// already installed.
pub fn init_from_settings(settings: &LoggingSettings) {
    let _ = LoggingBuilder::from_settings(settings).try_init();
}

/// A builder for configuring the tracing subscriber.
#[derive(Default)]
pub struct LoggingBuilder {
    directives: Vec<String>,
    level: Option<tracing::Level>,
    format: LogFormat,
    output: LogOutput,
}

impl LoggingBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_settings(settings: &LoggingSettings) -> Self {
        Self {
            directives: settings.filters.clone(),
            level: Some(settings.level.to_tracing_level()),
            format: settings.format,
            output: settings.output,
        }
    }

    pub fn with_level(mut self, level: tracing::Level) -> Self {
        self.level = Some(level);
        self
    }

    /// Adds a `target=level` filter directive.
    pub fn directive(mut self, directive: &str) -> Self {
        self.directives.push(directive.to_string());
        self
    }

    pub fn format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    pub fn output(mut self, output: LogOutput) -> Self {
        self.output = output;
        self
    }

    fn build_filter(&self) -> EnvFilter {
        let base_level = self.level.unwrap_or(tracing::Level::INFO);
        let base_filter = base_level.to_string().to_lowercase();

        // RUST_LOG wins over the configured level.
        let mut filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&base_filter));
        for directive in &self.directives {
            if let Ok(d) = directive.parse() {
                filter = filter.add_directive(d);
            }
        }
        filter
    }

    pub fn init(self) {
        let _ = self.try_init();
    }

    pub fn try_init(self) -> Result<(), TryInitError> {
        let filter = self.build_filter();

        macro_rules! init_with_writer {
            ($writer:expr) => {
                match self.format {
                    LogFormat::Compact => tracing_subscriber::registry()
                        .with(fmt::layer().compact().with_writer($writer))
                        .with(filter)
                        .try_init(),
                    LogFormat::Full => tracing_subscriber::registry()
                        .with(fmt::layer().with_writer($writer))
                        .with(filter)
                        .try_init(),
                    LogFormat::Pretty => tracing_subscriber::registry()
                        .with(fmt::layer().pretty().with_writer($writer))
                        .with(filter)
                        .try_init(),
                }
            };
        }

        match self.output {
            LogOutput::Stdout => init_with_writer!(std::io::stdout),
            LogOutput::Stderr => init_with_writer!(std::io::stderr),
        }
    }
}
