use thiserror::Error;

/// Failure taxonomy for the simulation core.
///
/// `NoRoute` is deliberately absent: per the forwarding design, a missing
/// route is always handled locally (protocol-specific discovery, or a
/// silent drop reflected only in the delivery ratio) and never propagates
/// as an `Err` out of the scheduler.
#[derive(Debug, Error)]
pub enum SimError {
    /// The scheduler was stepped with an empty event queue.
    #[error("no events remain in the schedule")]
    NoEvents,

    /// Cooperative cancellation was observed; the caller should stop
    /// driving the scheduler and let the run controller finalize.
    #[error("stop requested")]
    StopRequested,

    /// A configuration parameter failed validation before any process was
    /// spawned.
    #[error("invalid configuration: {reason}")]
    InvalidConfig {
        /// Human-readable description of what failed validation.
        reason: String,
    },

    /// An unexpected internal error; surfaced to the caller as a terminal
    /// error record.
    #[error("internal simulator error: {0}")]
    Internal(String),
}
