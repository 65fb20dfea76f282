//! Error types for host entry point handling

use idlesync_sdk::A_Err;

/// Error type for host globals and host calls
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    /// Host returned a null entry point
    #[error("Host entry point is null: {0}")]
    NullEntryPoint(&'static str),

    /// Host call returned a non-zero error code
    #[error("Host call {call} failed with error {code} ({description})")]
    CallFailed {
        /// Name of the host function
        call: &'static str,
        /// Raw error code
        code: A_Err,
        /// Short description of the code
        description: &'static str,
    },

    /// Host globals already initialized
    #[error("Host already initialized")]
    AlreadyInitialized,
}
