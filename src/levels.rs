use std::fmt;
use std::str::FromStr;

use tracing::Metadata;

use crate::error::LoggerError;

/// Target attached to every event emitted below `Crit`.
pub(crate) const TARGET: &str = "ctxlog";

/// `tracing` has no level above `ERROR`, so critical events are told apart by target.
pub(crate) const CRIT_TARGET: &str = "ctxlog::crit";

/// Severity of a log call, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    Debug,
    Info,
    Warn,
    Error,
    Crit,
}

impl Level {
    pub const ALL: [Level; 5] = [Level::Debug, Level::Info, Level::Warn, Level::Error, Level::Crit];

    pub fn as_str(self) -> &'static str {
        match self {
            Level::Debug => "debug",
            Level::Info => "info",
            Level::Warn => "warn",
            Level::Error => "error",
            Level::Crit => "crit",
        }
    }

    /// Whether a call at this level passes a logger configured with `threshold`.
    #[inline]
    pub fn passes(self, threshold: Level) -> bool {
        self >= threshold
    }

    /// Recovers the severity of an event emitted by a [`Logger`](crate::Logger).
    pub(crate) fn from_metadata(meta: &Metadata<'_>) -> Level {
        match *meta.level() {
            tracing::Level::ERROR if meta.target() == CRIT_TARGET => Level::Crit,
            tracing::Level::ERROR => Level::Error,
            tracing::Level::WARN => Level::Warn,
            tracing::Level::INFO => Level::Info,
            _ => Level::Debug,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "debug" | "dbug" => Ok(Level::Debug),
            "info" => Ok(Level::Info),
            "warn" => Ok(Level::Warn),
            "error" | "eror" => Ok(Level::Error),
            "crit" => Ok(Level::Crit),
            _ => Err(LoggerError::UnknownLevel(s.to_string())),
        }
    }
}

/// Anything a constructor accepts as a threshold: a [`Level`] or its name.
pub trait IntoLevel {
    fn into_level(self) -> Result<Level, LoggerError>;
}

impl IntoLevel for Level {
    fn into_level(self) -> Result<Level, LoggerError> {
        Ok(self)
    }
}

impl IntoLevel for &str {
    fn into_level(self) -> Result<Level, LoggerError> {
        self.parse()
    }
}

impl IntoLevel for String {
    fn into_level(self) -> Result<Level, LoggerError> {
        self.parse()
    }
}

impl IntoLevel for &String {
    fn into_level(self) -> Result<Level, LoggerError> {
        self.parse()
    }
}
