//! idlesync Plugin - FFI Layer
//!
//! This crate provides the FFI boundary between the host-side C++ shim and
//! the Rust core logic. It compiles to a cdylib (.so/.dll/.aex).
//!
//! The shim calls [`ffi::exports::rust_plugin_load`] from the plugin entry
//! point, registers [`ffi::exports::rust_on_idle`] as the host idle hook and
//! calls [`ffi::exports::rust_plugin_unload`] on shutdown.

pub mod ffi;

pub use idlesync_core::shutdown;
