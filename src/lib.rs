#![cfg_attr(docsrs, feature(doc_cfg))]

#![doc = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/README.md"))]
//! <br><br>
//!
//! ## You're probably looking for:
//! * [`Logger`](Logger)
//! * [`Entry`](Entry)
//! * [`Output`](Output)

pub mod prelude;
pub mod error;
pub mod config;
pub mod handler;
pub mod macros;
pub(crate) mod levels;
pub(crate) mod sync;
#[cfg(feature = "singleton")]
#[cfg_attr(docsrs, doc(cfg(feature = "singleton")))]
pub mod global;

pub use prelude::{
    Entry, Fields, IndentGuard, IntoLevel, Level, LogConfig, LogFormat, Logger, LoggerError,
    Output, Payload, SharedBuffer, indentation, TAB_WIDTH
};

#[cfg(feature = "singleton")]
pub use global::{default_logger, initialize};
