use std::fmt::Formatter;
use std::path::PathBuf;

pub enum LoggerError {
    UnknownLevel(String),
    UnknownFormat(String),
    OpenFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[cfg(feature = "singleton")]
    Poisoned
}

fn format_logger_error(l: &LoggerError, fmt: &mut Formatter) -> std::fmt::Result {
    match l {
        LoggerError::UnknownLevel(name) => {
            write!(fmt, "Unknown log level: {:?} (expected one of debug, info, warn, error, crit)", name)
        }
        LoggerError::UnknownFormat(name) => {
            write!(fmt, "Unknown log format: {:?} (expected one of full, compact)", name)
        }
        LoggerError::OpenFile { path, source } => {
            write!(fmt, "Cannot open log file {}: {}", path.display(), source)
        }
        #[cfg(feature = "singleton")]
        LoggerError::Poisoned => {
            write!(fmt, "Poisoned")
        }
    }
}

impl std::fmt::Display for LoggerError {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        format_logger_error(self, f)
    }
}

impl std::fmt::Debug for LoggerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        format_logger_error(self, f)
    }
}

impl std::error::Error for LoggerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LoggerError::OpenFile { source, .. } => Some(source),
            _ => None,
        }
    }
}
