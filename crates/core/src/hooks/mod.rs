//! Host hook handlers
//!
//! Rust handlers for hooks the host calls through the FFI layer.

pub mod idle;

pub use idle::{idle_count, last_drain_time_ns, on_idle, run_idle, IdleReport};
