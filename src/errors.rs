use thiserror::Error;

/// Error taxonomy exposed to UI collaborators. Raw transport errors never
/// cross a component boundary unwrapped; they are converted to one of these
/// variants first.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// No current location fix. The caller should re-prompt for location
    /// permission instead of retrying blindly.
    #[error("current location unavailable")]
    LocationUnavailable,

    /// The remote side refused the operation (e.g. order already claimed).
    /// The message is the server's, verbatim.
    #[error("{0}")]
    RemoteRejection(String),

    /// Transient transport failure. Safe to retry.
    #[error("network error: {0}")]
    NetworkTransient(String),

    /// A bounded operation ran out of time. Not an application error: the
    /// remote operation is presumed still pending.
    #[error("operation still pending after timeout")]
    Timeout,

    /// Programming-contract failure (e.g. accepting a second order while one
    /// is active). Never shown as a user-facing error, never swallowed.
    #[error("invariant violation: {0}")]
    InvariantViolation(String),
}
