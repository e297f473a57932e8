//! Formatting options applied when a [`Logger`](crate::Logger) builds its handler chain.

use std::str::FromStr;

use crate::error::LoggerError;

/// Line layout handed to `tracing-subscriber`'s formatter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Timestamp, level, target, then message and fields.
    #[default]
    Full,

    /// Single-line layout with shortened spacing.
    Compact,
}

impl FromStr for LogFormat {
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "full" => Ok(LogFormat::Full),
            "compact" => Ok(LogFormat::Compact),
            _ => Err(LoggerError::UnknownFormat(s.to_string())),
        }
    }
}

/// Configuration for the formatting layers of a logger.
#[derive(Debug, Clone)]
pub struct LogConfig {
    pub format: LogFormat,

    /// Colored output. Only ever applied to console sinks, never to files or buffers.
    pub use_color: bool,

    pub use_timestamps: bool,

    /// Whether to print the event target (`ctxlog`, or `ctxlog::crit` for critical events).
    pub include_targets: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            format: LogFormat::Full,
            use_color: true,
            use_timestamps: true,
            include_targets: true,
        }
    }
}

impl LogConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_color(mut self, use_color: bool) -> Self {
        self.use_color = use_color;
        self
    }

    pub fn with_timestamps(mut self, use_timestamps: bool) -> Self {
        self.use_timestamps = use_timestamps;
        self
    }

    pub fn with_targets(mut self, include_targets: bool) -> Self {
        self.include_targets = include_targets;
        self
    }
}
