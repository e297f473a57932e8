//! A process-wide default [`Logger`], for programs that want one shared stream.
//!
//! Until [`initialize`] succeeds every free function here is a no-op.

use std::fmt;
use std::sync::{Arc, RwLock};

use lazy_static::lazy_static;

use crate::error::LoggerError;
use crate::handler::Output;
use crate::levels::IntoLevel;
use crate::prelude::{Entry, Logger};

/// Context of the shared default logger.
pub const MAIN_CONTEXT: &str = "main";

lazy_static! {
    static ref DEFAULT_LOGGER: RwLock<Option<Arc<Logger>>> = RwLock::new(None);
}

/// Installs (or replaces) the default logger.
///
/// A replaced logger hands its indentation depth over to the new one.
///
/// # Returns
///
/// A result indicating success or containing a `LoggerError` on failure. On failure the
/// previous default logger stays in place.
pub fn initialize(output: impl Into<Output>, level: impl IntoLevel) -> Result<(), LoggerError> {
    let logger = Logger::with_context(MAIN_CONTEXT, output, level)?;

    let mut slot = DEFAULT_LOGGER.write().map_err(|_| LoggerError::Poisoned)?;
    if let Some(previous) = slot.as_ref() {
        for _ in 0..previous.indentation_depth() {
            logger.increase_indentation();
        }
    }
    *slot = Some(Arc::new(logger));
    Ok(())
}

/// The current default logger, if one was installed.
pub fn default_logger() -> Option<Arc<Logger>> {
    DEFAULT_LOGGER.read().ok().and_then(|slot| slot.clone())
}

#[track_caller]
pub fn debug<'a>(entry: impl Into<Entry<'a>>) {
    if let Some(logger) = default_logger() {
        logger.debug(entry);
    }
}

#[track_caller]
pub fn info<'a>(entry: impl Into<Entry<'a>>) {
    if let Some(logger) = default_logger() {
        logger.info(entry);
    }
}

#[track_caller]
pub fn warn<'a>(entry: impl Into<Entry<'a>>) {
    if let Some(logger) = default_logger() {
        logger.warn(entry);
    }
}

#[track_caller]
pub fn error<'a>(entry: impl Into<Entry<'a>>) {
    if let Some(logger) = default_logger() {
        logger.error(entry);
    }
}

#[track_caller]
pub fn crit<'a>(entry: impl Into<Entry<'a>>) {
    if let Some(logger) = default_logger() {
        logger.crit(entry);
    }
}

#[track_caller]
pub fn debug_fmt(args: fmt::Arguments<'_>) {
    debug(args)
}

#[track_caller]
pub fn info_fmt(args: fmt::Arguments<'_>) {
    info(args)
}

#[track_caller]
pub fn warn_fmt(args: fmt::Arguments<'_>) {
    warn(args)
}

#[track_caller]
pub fn error_fmt(args: fmt::Arguments<'_>) {
    error(args)
}

#[track_caller]
pub fn crit_fmt(args: fmt::Arguments<'_>) {
    crit(args)
}

#[track_caller]
pub fn debug_indent<'a>(depth: usize, entry: impl Into<Entry<'a>>) {
    if let Some(logger) = default_logger() {
        logger.debug_indent(depth, entry);
    }
}

#[track_caller]
pub fn info_indent<'a>(depth: usize, entry: impl Into<Entry<'a>>) {
    if let Some(logger) = default_logger() {
        logger.info_indent(depth, entry);
    }
}

#[track_caller]
pub fn warn_indent<'a>(depth: usize, entry: impl Into<Entry<'a>>) {
    if let Some(logger) = default_logger() {
        logger.warn_indent(depth, entry);
    }
}

#[track_caller]
pub fn error_indent<'a>(depth: usize, entry: impl Into<Entry<'a>>) {
    if let Some(logger) = default_logger() {
        logger.error_indent(depth, entry);
    }
}

#[track_caller]
pub fn crit_indent<'a>(depth: usize, entry: impl Into<Entry<'a>>) {
    if let Some(logger) = default_logger() {
        logger.crit_indent(depth, entry);
    }
}

pub fn increase_indentation() {
    if let Some(logger) = default_logger() {
        logger.increase_indentation();
    }
}

pub fn decrease_indentation() {
    if let Some(logger) = default_logger() {
        logger.decrease_indentation();
    }
}
