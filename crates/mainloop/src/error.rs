//! Submission error types.

/// Reasons a task could not be handed to the main loop, or could not report
/// back from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ScheduleError {
    /// No loop is running on this dispatcher
    #[error("main loop is not running")]
    NotRunning,

    /// The loop thread dropped its queue while the task was being sent
    /// (it unwound from a panicking task)
    #[error("main loop queue was disconnected")]
    Disconnected,

    /// The task was accepted but never reported completion
    #[error("task was dropped before it completed")]
    TaskAborted,
}

/// Result of a submission to the main loop
pub type ScheduleResult<T> = Result<T, ScheduleError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(ScheduleError::NotRunning.to_string(), "main loop is not running");
        assert_eq!(
            ScheduleError::Disconnected.to_string(),
            "main loop queue was disconnected"
        );
        assert_eq!(
            ScheduleError::TaskAborted.to_string(),
            "task was dropped before it completed"
        );
    }
}
