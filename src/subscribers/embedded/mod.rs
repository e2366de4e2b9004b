//! # Built-in subscribers
//!
//! - [`LogWriter`]: logs events through `tracing` (attached when `Config::debug` is set).

mod log;

pub use log::LogWriter;
