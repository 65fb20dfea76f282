//! idlesync SDK - Host Plugin Type Definitions
//!
//! This crate contains the C-compatible types shared with the host
//! application. It has no dependencies and compiles quickly, allowing
//! parallel compilation of dependent crates.
//!
//! # Modules
//!
//! - [`types`] - Host error codes and scalar types
//! - [`idle`] - Idle routine entry points

pub mod idle;
pub mod types;

pub use idle::*;
pub use types::*;
