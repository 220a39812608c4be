use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    NotInitialized,
    TaskNotFound,
    AmbiguousRef,
    ValidationError,
    InvalidReorderRequest,
    InvalidState,
    AlreadyCompleted,
    StorageUnavailable,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotInitialized => "NOT_INITIALIZED",
            Self::TaskNotFound => "TASK_NOT_FOUND",
            Self::AmbiguousRef => "AMBIGUOUS_REF",
            Self::ValidationError => "VALIDATION_ERROR",
            Self::InvalidReorderRequest => "INVALID_REORDER_REQUEST",
            Self::InvalidState => "INVALID_STATE",
            Self::AlreadyCompleted => "ALREADY_COMPLETED",
            Self::StorageUnavailable => "STORAGE_UNAVAILABLE",
        }
    }
}

#[derive(Debug, Error)]
#[error("{message}")]
pub struct FocusError {
    pub code: ErrorCode,
    pub message: String,
}

impl FocusError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn not_initialized() -> Self {
        Self::new(
            ErrorCode::NotInitialized,
            "taskfocus is not initialized. Run `taskfocus init` first.",
        )
    }

    pub fn task_not_found(reference: &str) -> Self {
        Self::new(
            ErrorCode::TaskNotFound,
            format!("Task not found: {reference}"),
        )
    }

    pub fn ambiguous_ref(reference: &str, candidates: &[String]) -> Self {
        Self::new(
            ErrorCode::AmbiguousRef,
            format!(
                "Ambiguous reference '{}'. Candidates: {}",
                reference,
                candidates.join(", ")
            ),
        )
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ValidationError, message)
    }

    pub fn invalid_reorder(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidReorderRequest, message)
    }

    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidState, message)
    }

    pub fn already_completed(task_id: &str) -> Self {
        Self::new(
            ErrorCode::AlreadyCompleted,
            format!("Task {task_id} is already completed"),
        )
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::StorageUnavailable, message)
    }
}

impl From<rusqlite::Error> for FocusError {
    fn from(e: rusqlite::Error) -> Self {
        Self::storage(e.to_string())
    }
}

impl From<std::io::Error> for FocusError {
    fn from(e: std::io::Error) -> Self {
        Self::storage(e.to_string())
    }
}
