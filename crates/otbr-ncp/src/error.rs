//! Error types for the NCP adapter.

use thiserror::Error;

use crate::reset::ResetState;

/// Errors reported by the underlying Thread stack or its platform binding.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StackError {
    /// Operation is not valid in the stack's current state.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Requested item does not exist (e.g. no active dataset).
    #[error("Not found: {0}")]
    NotFound(String),

    /// The item was already registered.
    #[error("Already registered: {0}")]
    Already(String),

    /// Radio or platform layer failure.
    #[error("Platform failure: {0}")]
    Platform(String),
}

/// Errors that can occur in the mainloop adapter.
#[derive(Debug, Error)]
pub enum NcpError {
    /// The platform failed to bring up a stack instance.
    #[error("Failed to initialize Thread stack: {0}")]
    Init(#[source] StackError),

    /// The state change callback could not be installed.
    #[error("Failed to set state change callback: {0}")]
    StateCallback(#[source] StackError),

    /// The stack rejected the configured log level.
    #[error("Failed to set stack log level: {0}")]
    LogLevel(#[source] StackError),

    /// Host debug level outside the syslog range.
    #[error("Invalid debug level: {0}")]
    InvalidDebugLevel(i32),

    /// Stack restart failed; the adapter is left without a stack.
    #[error("Failed to reinitialize Thread stack after reset: {0}")]
    Reinitialize(#[source] Box<NcpError>),

    /// Event id outside the recognized set.
    #[error("Unknown event id: {0}")]
    UnknownEvent(u8),

    /// No live stack instance.
    #[error("Thread stack is not initialized")]
    NotInitialized,

    /// Invalid reset state transition.
    #[error("Invalid reset state transition from {from} to {to}")]
    InvalidStateTransition { from: ResetState, to: ResetState },
}

/// Result type for adapter operations.
pub type NcpResult<T> = Result<T, NcpError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_stack_error_display() {
        let err = StackError::NotFound("active dataset".to_string());
        assert_eq!(err.to_string(), "Not found: active dataset");
    }

    #[test]
    fn test_init_error_keeps_source() {
        let err = NcpError::Init(StackError::Platform("radio timeout".to_string()));
        assert!(err.to_string().contains("radio timeout"));
        assert!(err.source().is_some());
    }

    #[test]
    fn test_reinitialize_wraps_cause() {
        let err = NcpError::Reinitialize(Box::new(NcpError::StateCallback(
            StackError::Already("callback".to_string()),
        )));
        let msg = err.to_string();
        assert!(msg.contains("after reset"));
        assert!(msg.contains("state change callback"));
    }

    #[test]
    fn test_invalid_transition_display() {
        let err = NcpError::InvalidStateTransition {
            from: ResetState::Running,
            to: ResetState::Reinitializing,
        };
        let msg = err.to_string();
        assert!(msg.contains("running"));
        assert!(msg.contains("reinitializing"));
    }
}
