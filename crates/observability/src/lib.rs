//! Tracing/logging setup shared by both service binaries.

pub mod tracing_init;

pub use tracing_init::init;
