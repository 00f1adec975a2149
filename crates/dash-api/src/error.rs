//! Collaborator errors
//!
//! [`DispatchError`] means the call was never accepted; [`CollaboratorError`]
//! means it was accepted and later failed. Only the second kind arrives
//! through a completion.

/// Call not accepted by the collaborator
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DispatchError {
    /// Backend not reachable
    #[error("collaborator unavailable: {0}")]
    Unavailable(String),

    /// Application id not served by this backend
    #[error("unknown application: {0}")]
    UnknownApp(String),

    /// Payload rejected before dispatch
    #[error("invalid payload: {0}")]
    InvalidPayload(String),
}

/// Accepted call that failed remotely
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CollaboratorError {
    /// Requested record absent
    #[error("not found: {0}")]
    NotFound(String),

    /// Backend refused the operation
    #[error("rejected: {0}")]
    Rejected(String),

    /// Backend failure
    #[error("backend error: {0}")]
    Backend(String),

    /// Completion channel dropped before a result arrived
    #[error("completion dropped before delivery")]
    Dropped,
}

impl CollaboratorError {
    /// Whether retrying the same call may succeed
    #[inline]
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Backend(_) | Self::Dropped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_classification() {
        assert!(CollaboratorError::Backend("io".into()).is_transient());
        assert!(CollaboratorError::Dropped.is_transient());
        assert!(!CollaboratorError::NotFound("ws".into()).is_transient());
        assert_eq!(
            DispatchError::UnknownApp("x".into()).to_string(),
            "unknown application: x"
        );
    }
}
