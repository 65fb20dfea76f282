//! idlesync Host - Entry Point Storage and Thread Identity
//!
//! This crate handles:
//! - Storing the host entry points handed to the plugin at load time
//! - Recording the host's main thread for runtime checks
//! - Calling the host's idle trigger
//!
//! # Thread Safety
//!
//! Host entry points are valid for the plugin's lifetime. The thread that
//! loads the plugin is the host's main thread; it is stored for checks via
//! [`is_main_thread()`].

pub mod error;
pub mod globals;

pub use error::HostError;
pub use globals::{init_host, is_main_thread, try_host, HostGlobals};
