//! The handler chain installed behind every [`Logger`](crate::Logger).
//!
//! ```text
//! event -> severity filter -> ErrorSplitLayer -+-> normal fmt layer -+-> sink
//!                                              +-> error fmt layer  -+
//! ```
//!
//! Both formatting layers write to the same sink. They differ only in how fields are
//! rendered: the error path drops the `err` value (it is already the message) and
//! appends the caller location and the error's source chain instead.

use std::error::Error;
use std::fmt;
use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tracing::field::{Field, Visit};
use tracing::{Dispatch, Event, Subscriber};
use tracing_subscriber::field::RecordFields;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{self as tracing_fmt, FormatFields, MakeWriter};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::{filter, Layer, Registry};

use crate::config::{LogConfig, LogFormat};
use crate::error::LoggerError;
use crate::levels::Level;

pub(crate) const MESSAGE_FIELD: &str = "message";
pub(crate) const CALLER_FIELD: &str = "caller";
pub(crate) const FIELDS_FIELD: &str = "fields";

/// Destination of a logger's output.
#[derive(Debug, Clone)]
pub enum Output {
    Stdout,
    Stderr,
    /// Drops every record without formatting it.
    Discard,
    /// Appends to the file, creating it if needed.
    File(PathBuf),
    /// Collects output in memory, mostly useful in tests.
    Buffer(SharedBuffer),
}

impl Output {
    pub const STDOUT_MARKER: &'static str = "STDOUT";
    pub const STDERR_MARKER: &'static str = "STDERR";
    pub const DISCARD_MARKER: &'static str = "NONE";

    /// Reads a destination the way command lines spell it: one of the markers, or a path.
    pub fn parse(destination: &str) -> Output {
        match destination {
            Self::STDOUT_MARKER => Output::Stdout,
            Self::STDERR_MARKER => Output::Stderr,
            Self::DISCARD_MARKER => Output::Discard,
            path => Output::File(PathBuf::from(path)),
        }
    }
}

impl From<&str> for Output {
    fn from(destination: &str) -> Self {
        Output::parse(destination)
    }
}

impl From<String> for Output {
    fn from(destination: String) -> Self {
        Output::parse(&destination)
    }
}

impl From<PathBuf> for Output {
    fn from(path: PathBuf) -> Self {
        Output::File(path)
    }
}

impl From<&Path> for Output {
    fn from(path: &Path) -> Self {
        Output::File(path.to_path_buf())
    }
}

impl From<SharedBuffer> for Output {
    fn from(buffer: SharedBuffer) -> Self {
        Output::Buffer(buffer)
    }
}

/// In-memory sink that can be cloned and read back while loggers keep writing to it.
#[derive(Debug, Clone, Default)]
pub struct SharedBuffer {
    inner: Arc<Mutex<Vec<u8>>>,
}

impl SharedBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> String {
        match self.inner.lock() {
            Ok(buffer) => String::from_utf8_lossy(&buffer).into_owned(),
            Err(poisoned) => String::from_utf8_lossy(&poisoned.into_inner()).into_owned(),
        }
    }

    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_string).collect()
    }

    pub fn clear(&self) {
        if let Ok(mut buffer) = self.inner.lock() {
            buffer.clear();
        }
    }
}

impl io::Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner
            .lock()
            .map_err(|_| io::Error::other("Mutex poisoned"))?
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// An [`Output`] resolved into something the formatting layers can write to.
#[derive(Clone)]
pub(crate) enum Sink {
    Stdout,
    Stderr,
    File(Arc<File>),
    Buffer(SharedBuffer),
}

impl Sink {
    fn is_console(&self) -> bool {
        matches!(self, Sink::Stdout | Sink::Stderr)
    }
}

impl<'a> MakeWriter<'a> for Sink {
    type Writer = Box<dyn io::Write + 'a>;

    fn make_writer(&'a self) -> Self::Writer {
        match self {
            Sink::Stdout => Box::new(io::stdout()),
            Sink::Stderr => Box::new(io::stderr()),
            Sink::File(file) => Box::new(&**file),
            Sink::Buffer(buffer) => Box::new(buffer.clone()),
        }
    }
}

fn open_append(path: &Path) -> Result<File, LoggerError> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| LoggerError::OpenFile {
            path: path.to_path_buf(),
            source,
        })
}

/// Field rendering for the two formatting paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldFormat {
    Normal,
    Error,
}

impl<'writer> FormatFields<'writer> for FieldFormat {
    fn format_fields<R: RecordFields>(&self, writer: Writer<'writer>, fields: R) -> fmt::Result {
        let mut visitor = FieldVisitor {
            writer,
            format: *self,
            result: Ok(()),
            is_empty: true,
        };
        fields.record(&mut visitor);
        visitor.result
    }
}

struct FieldVisitor<'a> {
    writer: Writer<'a>,
    format: FieldFormat,
    result: fmt::Result,
    is_empty: bool,
}

impl FieldVisitor<'_> {
    fn write(&mut self, args: fmt::Arguments<'_>) {
        if self.result.is_err() {
            return;
        }
        let separator = if self.is_empty { "" } else { " " };
        self.result = write!(self.writer, "{}{}", separator, args);
        self.is_empty = false;
    }
}

impl Visit for FieldVisitor<'_> {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == MESSAGE_FIELD {
            self.write(format_args!("{}", value));
        } else {
            self.record_debug(field, &value);
        }
    }

    fn record_error(&mut self, field: &Field, value: &(dyn Error + 'static)) {
        match self.format {
            FieldFormat::Normal => self.write(format_args!("{}=\"{}\"", field.name(), value)),
            FieldFormat::Error => {
                let mut source = value.source();
                while let Some(cause) = source {
                    self.write(format_args!("caused_by=\"{}\"", cause));
                    source = cause.source();
                }
            }
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        match field.name() {
            // Both arrive pre-rendered: the message as format arguments, fields as `k=v` pairs.
            MESSAGE_FIELD | FIELDS_FIELD => self.write(format_args!("{:?}", value)),
            CALLER_FIELD if self.format == FieldFormat::Normal => {}
            name => self.write(format_args!("{}={:?}", name, value)),
        }
    }
}

/// Sends events that carry an error value to `error`, everything else to `normal`.
pub struct ErrorSplitLayer<N, E> {
    normal: N,
    error: E,
}

impl<N, E> ErrorSplitLayer<N, E> {
    pub fn new(normal: N, error: E) -> Self {
        Self { normal, error }
    }
}

/// Whether any field of the event was recorded as an error value.
pub fn carries_error(event: &Event<'_>) -> bool {
    #[derive(Default)]
    struct ErrorSeen {
        found: bool,
    }

    impl Visit for ErrorSeen {
        fn record_debug(&mut self, _field: &Field, _value: &dyn fmt::Debug) {}

        fn record_error(&mut self, _field: &Field, _value: &(dyn Error + 'static)) {
            self.found = true;
        }
    }

    let mut seen = ErrorSeen::default();
    event.record(&mut seen);
    seen.found
}

impl<S, N, E> Layer<S> for ErrorSplitLayer<N, E>
where
    S: Subscriber,
    N: Layer<S>,
    E: Layer<S>,
{
    fn on_layer(&mut self, subscriber: &mut S) {
        self.normal.on_layer(subscriber);
        self.error.on_layer(subscriber);
    }

    fn on_event(&self, event: &Event<'_>, ctx: Context<'_, S>) {
        if carries_error(event) {
            self.error.on_event(event, ctx);
        } else {
            self.normal.on_event(event, ctx);
        }
    }
}

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

fn format_layer(sink: Sink, fields: FieldFormat, config: &LogConfig) -> BoxedLayer {
    let ansi = config.use_color && sink.is_console();
    let layer = tracing_fmt::layer::<Registry>()
        .with_writer(sink)
        .fmt_fields(fields)
        .with_ansi(ansi)
        .with_target(config.include_targets);

    match (config.format, config.use_timestamps) {
        (LogFormat::Full, true) => Box::new(layer),
        (LogFormat::Full, false) => Box::new(layer.without_time()),
        (LogFormat::Compact, true) => Box::new(layer.compact()),
        (LogFormat::Compact, false) => Box::new(layer.compact().without_time()),
    }
}

/// Builds the dispatcher a logger emits into.
pub(crate) fn build_dispatch(
    output: &Output, threshold: Level, config: &LogConfig
) -> Result<Dispatch, LoggerError> {
    let sink = match output {
        Output::Discard => return Ok(Dispatch::none()),
        Output::Stdout => Sink::Stdout,
        Output::Stderr => Sink::Stderr,
        Output::File(path) => Sink::File(Arc::new(open_append(path)?)),
        Output::Buffer(buffer) => Sink::Buffer(buffer.clone()),
    };

    let normal = format_layer(sink.clone(), FieldFormat::Normal, config);
    let error = format_layer(sink, FieldFormat::Error, config);

    let severity = filter::filter_fn(move |meta| Level::from_metadata(meta).passes(threshold));
    let subscriber = Registry::default()
        .with(ErrorSplitLayer::new(normal, error).with_filter(severity));

    Ok(Dispatch::new(subscriber))
}
