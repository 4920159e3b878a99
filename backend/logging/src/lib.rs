//! Structured logging setup for signd.

pub mod logger;

pub use logger::init_logger;
