//! Tracing-subscriber initialization shared by the connector binary and any
//! service embedding the connector library.

pub mod logging;

pub use logging::{init, LogConfig, LogFormat, LogOutput};
