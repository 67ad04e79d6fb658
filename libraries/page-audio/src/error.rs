//! Error types for page audio

use thiserror::Error;

/// Page audio errors
#[derive(Debug, Error)]
pub enum AutoplayError {
    /// The host refused to start playback (autoplay policy, missing gesture)
    #[error("Playback rejected: {0}")]
    PlaybackRejected(String),

    /// Persistent preference storage is unavailable or full
    #[error("Storage error: {0}")]
    Storage(String),

    /// A page element could not be bound
    #[error("DOM error: {0}")]
    Dom(String),

    /// Configuration could not be used
    #[error("Invalid config: {0}")]
    InvalidConfig(String),
}

impl AutoplayError {
    /// True for the failure class the controller always recovers from silently
    pub fn is_policy_rejection(&self) -> bool {
        matches!(self, Self::PlaybackRejected(_))
    }
}

/// Result type for page audio operations
pub type Result<T> = std::result::Result<T, AutoplayError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_carry_context() {
        let err = AutoplayError::PlaybackRejected("NotAllowedError".to_string());
        assert_eq!(err.to_string(), "Playback rejected: NotAllowedError");
        assert!(err.is_policy_rejection());

        let err = AutoplayError::Storage("quota exceeded".to_string());
        assert!(!err.is_policy_rejection());
    }
}
