use std::error::Error;
use std::fmt;
use std::fs;

use ctxlog::{log_info, log_warn, Entry, Level, LogConfig, LogFormat, Logger, LoggerError, Output, SharedBuffer};

#[derive(Debug)]
struct ConnectError {
    cause: std::io::Error,
}

impl fmt::Display for ConnectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cannot reach upstream")
    }
}

impl Error for ConnectError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.cause)
    }
}

fn connect_error() -> ConnectError {
    ConnectError {
        cause: std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "connection refused"),
    }
}

fn buffered_logger(context: &str, level: impl ctxlog::IntoLevel) -> (Logger, SharedBuffer) {
    let buffer = SharedBuffer::new();
    let config = LogConfig::new().with_timestamps(false);
    let logger = Logger::with_config(context, buffer.clone(), level, &config).unwrap();
    (logger, buffer)
}

#[test]
fn test_unknown_level_fails() {
    let result = Logger::new(Output::Discard, "verbose");
    assert!(matches!(result, Err(LoggerError::UnknownLevel(name)) if name == "verbose"));
}

#[test]
fn test_level_filtering() {
    let (logger, buffer) = buffered_logger("filter", "warn");

    logger.debug("debug line");
    logger.info("info line");
    logger.warn("warn line");
    logger.error("error line");
    logger.crit("crit line");

    let out = buffer.contents();
    assert!(!out.contains("debug line"));
    assert!(!out.contains("info line"));
    assert!(out.contains("warn line"));
    assert!(out.contains("error line"));
    assert!(out.contains("crit line"));
    assert_eq!(buffer.lines().len(), 3);
}

#[test]
fn test_crit_threshold_only_passes_crit() {
    let (logger, buffer) = buffered_logger("crit-only", Level::Crit);

    logger.error("an error");
    logger.crit("on fire");

    let out = buffer.contents();
    assert!(!out.contains("an error"));
    assert!(out.contains("ctxlog::crit: on fire"), "{}", out);
}

#[test]
fn test_crit_is_marked_without_targets() {
    let buffer = SharedBuffer::new();
    let config = LogConfig::new().with_timestamps(false).with_targets(false);
    let logger = Logger::with_config("svc", buffer.clone(), Level::Debug, &config).unwrap();

    logger.error("plain error");
    logger.crit("on fire");

    let lines = buffer.lines();
    assert_eq!(lines.len(), 2);
    assert!(!lines[0].contains("crit"), "{}", lines[0]);
    assert!(lines[1].contains("on fire severity=crit context=svc"), "{}", lines[1]);
}

#[test]
fn test_context_and_keys_stay_parseable() {
    let (logger, buffer) = buffered_logger("batch job", Level::Info);

    logger.info(Entry::message("done").with("bad key", "x").with("a=b", 1));

    let out = buffer.contents();
    assert!(out.contains("done context=\"batch job\" bad_key=x a_b=1"), "{}", out);
}

#[test]
fn test_records_carry_context_and_fields() {
    let (logger, buffer) = buffered_logger("api", Level::Debug);

    logger.info(Entry::message("listening").with("port", 8080).with("host", "0.0.0.0"));

    let out = buffer.contents();
    assert!(out.contains("listening context=api port=8080 host=0.0.0.0"), "{}", out);
    assert!(!out.contains("caller="), "{}", out);
}

#[test]
fn test_error_entry_uses_error_text_and_error_path() {
    let (logger, buffer) = buffered_logger("db", Level::Debug);
    let err = connect_error();

    logger.error(Entry::error(&err).with("attempt", 3));

    let out = buffer.contents();
    assert!(out.contains("cannot reach upstream context=db attempt=3"), "{}", out);
    assert!(out.contains("caused_by=\"connection refused\""), "{}", out);
    assert!(out.contains("caller=tests/basic_test.rs:"), "{}", out);
    assert!(!out.contains("err="), "{}", out);
}

#[test]
fn test_error_entry_at_non_error_level_is_still_routed() {
    let (logger, buffer) = buffered_logger("db", Level::Debug);
    let err = connect_error();
    let err: &(dyn Error + 'static) = &err;

    logger.warn(err);

    let out = buffer.contents();
    assert!(out.contains("WARN"), "{}", out);
    assert!(out.contains("cannot reach upstream"), "{}", out);
    assert!(out.contains("caller="), "{}", out);
}

#[test]
fn test_increase_and_decrease_indentation() {
    let (logger, buffer) = buffered_logger("indent", Level::Debug);

    logger.info("top");
    logger.increase_indentation();
    logger.increase_indentation();
    logger.info("nested");
    logger.decrease_indentation();
    logger.info("back");
    logger.decrease_indentation();
    logger.decrease_indentation();
    logger.info("floor");

    let lines = buffer.lines();
    assert!(lines[0].contains(": top"), "{}", lines[0]);
    assert!(lines[1].contains(":     nested"), "{}", lines[1]);
    assert!(lines[2].contains(":   back"), "{}", lines[2]);
    assert!(lines[3].contains(": floor"), "{}", lines[3]);
    assert_eq!(logger.indentation_depth(), 0);
}

#[test]
fn test_scoped_indent_leaves_depth_untouched() {
    let (logger, buffer) = buffered_logger("scoped", Level::Debug);
    logger.increase_indentation();

    logger.info_indent(3, "deep");
    assert_eq!(logger.indentation_depth(), 1);
    logger.info("regular");

    let lines = buffer.lines();
    assert!(lines[0].contains(":       deep"), "{}", lines[0]);
    assert!(lines[1].contains(":   regular"), "{}", lines[1]);
}

#[test]
fn test_indentation_is_per_logger() {
    let (first, first_out) = buffered_logger("same", Level::Debug);
    let (second, second_out) = buffered_logger("same", Level::Debug);

    first.increase_indentation();
    first.info("first");
    second.info("second");

    assert!(first_out.contents().contains(":   first"));
    assert!(second_out.contents().contains(": second"));
}

#[test]
fn test_formatted_variants() {
    let (logger, buffer) = buffered_logger("fmt", Level::Debug);

    logger.debug_fmt(format_args!("{} + {} = {}", 1, 2, 3));
    log_info!(logger, "took {}ms", 42);
    log_warn!(logger, "retry {}/{}", 1, 5);

    let out = buffer.contents();
    assert!(out.contains("1 + 2 = 3"));
    assert!(out.contains("took 42ms"));
    assert!(out.contains("retry 1/5"));
}

#[test]
fn test_file_output_appends() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("app.log");

    {
        let logger = Logger::with_context("file", path.clone(), "info").unwrap();
        logger.info("first run");
    }
    {
        let logger = Logger::with_context("file", path.to_str().unwrap(), Level::Info).unwrap();
        logger.debug("filtered");
        logger.info("second run");
    }

    let contents = fs::read_to_string(&path).unwrap();
    assert!(contents.contains("first run"));
    assert!(contents.contains("second run"));
    assert!(!contents.contains("filtered"));
    assert!(!contents.contains('\u{1b}'), "file output must not contain color codes");
}

#[test]
fn test_unopenable_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("no-such-dir").join("app.log");

    let result = Logger::new(path, "info");
    assert!(matches!(result, Err(LoggerError::OpenFile { .. })));
}

#[test]
fn test_discard_output_keeps_context() {
    let logger = Logger::with_context("quiet", "NONE", "debug").unwrap();
    logger.crit("nobody hears this");
    assert_eq!(logger.context(), "quiet");
}

#[test]
fn test_compact_format_without_targets() {
    let buffer = SharedBuffer::new();
    let config = LogConfig::new()
        .with_format(LogFormat::Compact)
        .with_timestamps(false)
        .with_targets(false);
    let logger = Logger::with_config("compact", buffer.clone(), "info", &config).unwrap();

    logger.info("hello");

    let out = buffer.contents();
    assert!(out.contains("hello"));
    assert!(!out.contains("ctxlog"));
}

#[test]
fn test_logger_is_shareable_across_threads() {
    let (logger, buffer) = buffered_logger("threads", Level::Info);
    let logger = std::sync::Arc::new(logger);

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let logger = logger.clone();
            std::thread::spawn(move || {
                let _nested = logger.indent();
                logger.info_indent(1, format!("worker {}", i));
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(logger.indentation_depth(), 0);
    assert_eq!(buffer.lines().len(), 4);
}
