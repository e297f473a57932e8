use std::borrow::Cow;
use std::error::Error;
use std::fmt;
use std::panic::Location;

use chrono::{Local, SecondsFormat};
use tracing::field;
use tracing::Dispatch;

pub use crate::config::{LogConfig, LogFormat};
pub use crate::error::LoggerError;
pub use crate::handler::{Output, SharedBuffer};
pub use crate::levels::{IntoLevel, Level};
pub use crate::sync::{indentation, TAB_WIDTH};

use crate::handler::build_dispatch;
use crate::levels::{CRIT_TARGET, TARGET};
use crate::sync::Indentation;

/// First argument of a leveled call: either text or an error value.
#[derive(Debug)]
pub enum Payload<'a> {
    Message(Cow<'a, str>),
    Error(&'a (dyn Error + 'static)),
}

/// Ordered key/value pairs rendered as `key=value` after the message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fields(Vec<(String, String)>);

impl Fields {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Adds a pair. Whitespace and `=` in the key are replaced by `_` so the pair stays
    /// parseable; an empty key becomes `_`.
    pub fn push(&mut self, key: impl Into<String>, value: impl fmt::Display) {
        self.0.push((sanitize_key(key.into()), value.to_string()));
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

fn needs_quotes(value: &str) -> bool {
    value.is_empty() || value.chars().any(|c| c.is_whitespace() || c == '=' || c == '"')
}

fn sanitize_key(key: String) -> String {
    if key.is_empty() {
        return "_".to_string();
    }
    if !key.chars().any(|c| c.is_whitespace() || c == '=') {
        return key;
    }
    key.chars()
        .map(|c| if c.is_whitespace() || c == '=' { '_' } else { c })
        .collect()
}

/// A single `key=value` value, quoted when it would otherwise run into the next pair.
pub(crate) struct FieldValue<'a>(pub(crate) &'a str);

impl fmt::Display for FieldValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if needs_quotes(self.0) {
            write!(f, "{:?}", self.0)
        } else {
            f.write_str(self.0)
        }
    }
}

impl fmt::Display for Fields {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (key, value)) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}={}", key, FieldValue(value))?;
        }
        Ok(())
    }
}

/// A single log entry: what is being said, plus any structured context.
///
/// Plain text and `String`s convert into a message entry; `&dyn Error` converts into an
/// error entry, whose message is the error's text and which is routed to the error
/// formatter.
///
/// ```ignore
/// logger.info(Entry::message("listening").with("port", 8080));
/// logger.error(Entry::error(&err).with("path", path.display()));
/// ```
#[derive(Debug)]
pub struct Entry<'a> {
    payload: Payload<'a>,
    fields: Fields,
}

impl<'a> Entry<'a> {
    pub fn message(message: impl Into<Cow<'a, str>>) -> Self {
        Self {
            payload: Payload::Message(message.into()),
            fields: Fields::default(),
        }
    }

    pub fn error(err: &'a (dyn Error + 'static)) -> Self {
        Self {
            payload: Payload::Error(err),
            fields: Fields::default(),
        }
    }

    /// Attaches a key/value pair. Pairs are emitted in the order they were added.
    pub fn with(mut self, key: impl Into<String>, value: impl fmt::Display) -> Self {
        self.fields.push(key, value);
        self
    }

    pub fn payload(&self) -> &Payload<'a> {
        &self.payload
    }

    pub fn fields(&self) -> &Fields {
        &self.fields
    }
}

impl<'a> From<&'a str> for Entry<'a> {
    fn from(message: &'a str) -> Self {
        Entry::message(message)
    }
}

impl From<String> for Entry<'_> {
    fn from(message: String) -> Self {
        Entry::message(message)
    }
}

impl<'a> From<&'a String> for Entry<'a> {
    fn from(message: &'a String) -> Self {
        Entry::message(message.as_str())
    }
}

impl From<fmt::Arguments<'_>> for Entry<'_> {
    fn from(args: fmt::Arguments<'_>) -> Self {
        Entry::message(args.to_string())
    }
}

impl<'a> From<&'a (dyn Error + 'static)> for Entry<'a> {
    fn from(err: &'a (dyn Error + 'static)) -> Self {
        Entry::error(err)
    }
}

impl<'a> From<&'a (dyn Error + Send + Sync + 'static)> for Entry<'a> {
    fn from(err: &'a (dyn Error + Send + Sync + 'static)) -> Self {
        Entry::error(err)
    }
}

/// Emits one event at a `tracing` level that must be known at compile time.
macro_rules! emit_event {
    ($target:expr, $level:expr, $logger:expr, $message:expr, $fields:expr, $err:expr, $caller:expr
        $(, $extra:ident = $value:expr)*) => {
        tracing::event!(
            target: $target,
            $level,
            $($extra = %$value,)*
            context = %FieldValue(&$logger.context),
            fields = $fields,
            err = $err,
            caller = %$caller,
            "{}",
            $message
        )
    };
}

/// A leveled logger tagged with a context and carrying its own indentation.
///
/// Every call is written synchronously through the logger's own handler chain, which is
/// built once at construction: a severity filter in front of an [`ErrorSplitLayer`]
/// that sends plain records to the normal formatter and error records to the error
/// formatter.
///
/// [`ErrorSplitLayer`]: crate::handler::ErrorSplitLayer
pub struct Logger {
    dispatch: Dispatch,
    context: String,
    level: Level,
    indentation: Indentation,
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("context", &self.context)
            .field("level", &self.level)
            .field("indentation", &self.indentation.depth())
            .finish()
    }
}

/// Context used when none is given: the current time plus a random suffix.
fn generated_context() -> String {
    format!(
        "{}#{}",
        Local::now().to_rfc3339_opts(SecondsFormat::Secs, false),
        rand::random::<u32>()
    )
}

impl Logger {
    /// Creates a logger with a generated context.
    ///
    /// # Arguments
    ///
    /// * `output` - Where records go: `"STDOUT"`, `"NONE"`, a file path, or an [`Output`].
    /// * `level` - Minimum severity, as a [`Level`] or its name.
    ///
    /// # Returns
    ///
    /// The logger, or a `LoggerError` if the level is unknown or the file cannot be opened.
    pub fn new(output: impl Into<Output>, level: impl IntoLevel) -> Result<Self, LoggerError> {
        Self::with_config("", output, level, &LogConfig::default())
    }

    /// Creates a logger whose records carry `context`. An empty context is replaced by a
    /// generated one.
    pub fn with_context(
        context: impl Into<String>, output: impl Into<Output>, level: impl IntoLevel
    ) -> Result<Self, LoggerError> {
        Self::with_config(context, output, level, &LogConfig::default())
    }

    /// Creates a logger with explicit formatting options.
    pub fn with_config(
        context: impl Into<String>, output: impl Into<Output>, level: impl IntoLevel,
        config: &LogConfig
    ) -> Result<Self, LoggerError> {
        let level = level.into_level()?;
        let dispatch = build_dispatch(&output.into(), level, config)?;

        let mut context = context.into();
        if context.is_empty() {
            context = generated_context();
        }

        Ok(Self {
            dispatch,
            context,
            level,
            indentation: Indentation::new(0),
        })
    }

    /// Rebuilds the handler chain in place. Context and indentation are kept.
    pub fn initialize(
        &mut self, output: impl Into<Output>, level: impl IntoLevel
    ) -> Result<(), LoggerError> {
        self.initialize_with_config(output, level, &LogConfig::default())
    }

    /// Rebuilds the handler chain and retags the logger with `context`. An empty context
    /// is replaced by a generated one. Indentation is kept.
    pub fn initialize_with_context(
        &mut self, context: impl Into<String>, output: impl Into<Output>, level: impl IntoLevel
    ) -> Result<(), LoggerError> {
        self.initialize(output, level)?;

        let context = context.into();
        self.context = if context.is_empty() { generated_context() } else { context };
        Ok(())
    }

    pub fn initialize_with_config(
        &mut self, output: impl Into<Output>, level: impl IntoLevel, config: &LogConfig
    ) -> Result<(), LoggerError> {
        let level = level.into_level()?;
        self.dispatch = build_dispatch(&output.into(), level, config)?;
        self.level = level;
        Ok(())
    }

    pub fn context(&self) -> &str {
        &self.context
    }

    pub fn level(&self) -> Level {
        self.level
    }

    pub fn enabled(&self, level: Level) -> bool {
        level.passes(self.level)
    }

    #[track_caller]
    pub fn log<'a>(&self, level: Level, entry: impl Into<Entry<'a>>) {
        self.emit(level, self.indentation.depth(), entry.into(), Location::caller());
    }

    #[track_caller]
    pub fn debug<'a>(&self, entry: impl Into<Entry<'a>>) {
        self.log(Level::Debug, entry)
    }

    #[track_caller]
    pub fn info<'a>(&self, entry: impl Into<Entry<'a>>) {
        self.log(Level::Info, entry)
    }

    #[track_caller]
    pub fn warn<'a>(&self, entry: impl Into<Entry<'a>>) {
        self.log(Level::Warn, entry)
    }

    #[track_caller]
    pub fn error<'a>(&self, entry: impl Into<Entry<'a>>) {
        self.log(Level::Error, entry)
    }

    #[track_caller]
    pub fn crit<'a>(&self, entry: impl Into<Entry<'a>>) {
        self.log(Level::Crit, entry)
    }

    #[track_caller]
    pub fn debug_fmt(&self, args: fmt::Arguments<'_>) {
        self.debug(args)
    }

    #[track_caller]
    pub fn info_fmt(&self, args: fmt::Arguments<'_>) {
        self.info(args)
    }

    #[track_caller]
    pub fn warn_fmt(&self, args: fmt::Arguments<'_>) {
        self.warn(args)
    }

    #[track_caller]
    pub fn error_fmt(&self, args: fmt::Arguments<'_>) {
        self.error(args)
    }

    #[track_caller]
    pub fn crit_fmt(&self, args: fmt::Arguments<'_>) {
        self.crit(args)
    }

    /// Logs one entry at an explicit indentation depth.
    ///
    /// The logger's own indentation is left untouched, so this is safe to call while
    /// other threads log through the same logger.
    #[track_caller]
    pub fn log_indent<'a>(&self, level: Level, depth: usize, entry: impl Into<Entry<'a>>) {
        self.emit(level, depth, entry.into(), Location::caller());
    }

    #[track_caller]
    pub fn debug_indent<'a>(&self, depth: usize, entry: impl Into<Entry<'a>>) {
        self.log_indent(Level::Debug, depth, entry)
    }

    #[track_caller]
    pub fn info_indent<'a>(&self, depth: usize, entry: impl Into<Entry<'a>>) {
        self.log_indent(Level::Info, depth, entry)
    }

    #[track_caller]
    pub fn warn_indent<'a>(&self, depth: usize, entry: impl Into<Entry<'a>>) {
        self.log_indent(Level::Warn, depth, entry)
    }

    #[track_caller]
    pub fn error_indent<'a>(&self, depth: usize, entry: impl Into<Entry<'a>>) {
        self.log_indent(Level::Error, depth, entry)
    }

    #[track_caller]
    pub fn crit_indent<'a>(&self, depth: usize, entry: impl Into<Entry<'a>>) {
        self.log_indent(Level::Crit, depth, entry)
    }

    pub fn increase_indentation(&self) {
        self.indentation.increase();
    }

    /// Steps one level back out. Already at zero, this does nothing.
    pub fn decrease_indentation(&self) {
        self.indentation.decrease();
    }

    pub fn indentation_depth(&self) -> usize {
        self.indentation.depth()
    }

    /// Indents every call made while the returned guard is alive.
    pub fn indent(&self) -> IndentGuard<'_> {
        self.increase_indentation();
        IndentGuard { logger: self }
    }

    fn emit(&self, level: Level, depth: usize, entry: Entry<'_>, caller: &'static Location<'static>) {
        if !self.enabled(level) {
            return;
        }

        let prefix = indentation(depth);
        let (message, err) = match entry.payload {
            Payload::Message(message) => (format!("{}{}", prefix, message), None),
            Payload::Error(err) => (format!("{}{}", prefix, err), Some(err)),
        };
        let fields = (!entry.fields.is_empty()).then(|| field::display(&entry.fields));

        tracing::dispatcher::with_default(&self.dispatch, || match level {
            Level::Debug => emit_event!(TARGET, tracing::Level::DEBUG, self, message, fields, err, caller),
            Level::Info => emit_event!(TARGET, tracing::Level::INFO, self, message, fields, err, caller),
            Level::Warn => emit_event!(TARGET, tracing::Level::WARN, self, message, fields, err, caller),
            Level::Error => emit_event!(TARGET, tracing::Level::ERROR, self, message, fields, err, caller),
            // ERROR is shared with `Error`, so crit records always name their severity.
            Level::Crit => emit_event!(
                CRIT_TARGET, tracing::Level::ERROR, self, message, fields, err, caller,
                severity = Level::Crit
            ),
        });
    }
}

/// Returned by [`Logger::indent`]; steps the indentation back out when dropped.
#[must_use = "the indentation is undone as soon as the guard is dropped"]
pub struct IndentGuard<'a> {
    logger: &'a Logger,
}

impl Drop for IndentGuard<'_> {
    fn drop(&mut self) {
        self.logger.decrease_indentation();
    }
}
