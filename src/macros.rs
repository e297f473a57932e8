//! Formatting shorthands for the `*_fmt` methods of [`Logger`](crate::Logger).

/// Logs a formatted debug message.
///
/// # Example
///
/// ```ignore
/// log_debug!(logger, "cache miss for {}", key);
/// ```
#[macro_export]
macro_rules! log_debug {
    ($logger:expr, $($arg:tt)+) => {
        $logger.debug_fmt(::std::format_args!($($arg)+))
    };
}

#[macro_export]
macro_rules! log_info {
    ($logger:expr, $($arg:tt)+) => {
        $logger.info_fmt(::std::format_args!($($arg)+))
    };
}

#[macro_export]
macro_rules! log_warn {
    ($logger:expr, $($arg:tt)+) => {
        $logger.warn_fmt(::std::format_args!($($arg)+))
    };
}

#[macro_export]
macro_rules! log_error {
    ($logger:expr, $($arg:tt)+) => {
        $logger.error_fmt(::std::format_args!($($arg)+))
    };
}

/// Logs a formatted critical message.
#[macro_export]
macro_rules! log_crit {
    ($logger:expr, $($arg:tt)+) => {
        $logger.crit_fmt(::std::format_args!($($arg)+))
    };
}
