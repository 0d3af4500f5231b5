//! Utility functions and helpers for cloudlingo.
//!
//! - `logging`: Tracing initialization and secret redaction for log output.
//!
//! Author: kelexine (<https://github.com/kelexine>)

pub mod logging;
