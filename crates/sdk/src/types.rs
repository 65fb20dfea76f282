//! Host scalar types and error codes
//!
//! These mirror the host SDK's C typedefs so the FFI layer can pass them
//! through unchanged.

use std::ffi::c_int;

/// Host error code. Zero means success.
#[allow(non_camel_case_types)]
pub type A_Err = c_int;

/// Host long integer
#[allow(non_camel_case_types)]
pub type A_long = c_int;

/// Operation succeeded
pub const A_ERR_NONE: A_Err = 0;

/// Generic failure
pub const A_ERR_GENERIC: A_Err = 1;

/// Host ran out of memory
pub const A_ERR_ALLOC: A_Err = 2;

/// A parameter passed to the host was invalid
pub const A_ERR_PARAMETER: A_Err = 5;

/// Returns a short description for a host error code
pub fn describe_err(err: A_Err) -> &'static str {
    match err {
        A_ERR_NONE => "none",
        A_ERR_GENERIC => "generic",
        A_ERR_ALLOC => "out of memory",
        A_ERR_PARAMETER => "bad parameter",
        _ => "unknown",
    }
}
