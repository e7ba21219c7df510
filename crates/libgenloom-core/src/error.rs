use thiserror::Error;

/// Rejection of a project mutation. Raised before anything is rewritten.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("invalid name: '{0}'")]
    InvalidName(String),

    #[error("item already exists: {0}")]
    ItemExists(String),

    #[error("no such item: {0}")]
    NotFound(String),

    #[error("path is both a file and a directory: {0}")]
    Conflict(String),
}

impl ValidationError {
    /// Stable code used by the UI string tables
    pub fn code(&self) -> &'static str {
        match self {
            ValidationError::InvalidName(_) => "invalidName",
            ValidationError::ItemExists(_) => "itemExists",
            ValidationError::NotFound(_) => "notFound",
            ValidationError::Conflict(_) => "pathConflict",
        }
    }
}

/// Main error type for genloom operations
#[derive(Debug, Error)]
pub enum GenloomError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("invalid arguments: {0}")]
    InvalidArgs(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("update stream failed: {0}")]
    Stream(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl GenloomError {
    /// Get the error code for JSON output
    pub fn error_code(&self) -> &'static str {
        match self {
            GenloomError::Validation(e) => e.code(),
            GenloomError::InvalidArgs(_) => "invalid_args",
            GenloomError::NotFound(_) => "not_found",
            GenloomError::Stream(_) => "stream_error",
            GenloomError::Io(_) => "io_error",
            GenloomError::Json(_) => "invalid_json",
            GenloomError::TomlParse(_) => "invalid_args",
            GenloomError::TomlSerialize(_) => "internal_error",
            GenloomError::Internal(_) => "internal_error",
        }
    }

    /// Get the exit code for the CLI
    pub fn exit_code(&self) -> i32 {
        match self {
            GenloomError::InvalidArgs(_) => 2,
            GenloomError::TomlParse(_) => 2,
            GenloomError::Validation(ValidationError::NotFound(_)) => 3,
            GenloomError::NotFound(_) => 3,
            GenloomError::Validation(_) => 4,
            GenloomError::Io(_) => 5,
            GenloomError::Json(_) => 5,
            GenloomError::Stream(_) => 6,
            _ => 1,
        }
    }

    /// Get actionable suggestions for fixing the error
    pub fn suggestions(&self) -> Vec<&'static str> {
        match self {
            GenloomError::Validation(ValidationError::InvalidName(_)) => vec![
                "Names must not be empty, contain '/', or contain '..'",
            ],
            GenloomError::Validation(ValidationError::ItemExists(_)) => vec![
                "Pick a different name, or remove the existing item first",
                "Run 'genloom tree' to see what already exists",
            ],
            GenloomError::Validation(ValidationError::NotFound(_)) | GenloomError::NotFound(_) => {
                vec!["Run 'genloom tree' to see available paths"]
            }
            GenloomError::Validation(ValidationError::Conflict(_)) => vec![
                "The project map has a file and a directory at the same path",
                "Fix the project file by hand or re-import it from disk",
            ],
            GenloomError::Json(_) => vec![
                "Check that the project file is a JSON object of path to string",
            ],
            GenloomError::Stream(_) => vec![
                "Start the job again; failed jobs are never resumed",
            ],
            _ => vec![],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_codes() {
        assert_eq!(ValidationError::InvalidName("a/b".into()).code(), "invalidName");
        assert_eq!(ValidationError::ItemExists("a".into()).code(), "itemExists");
        let err: GenloomError = ValidationError::ItemExists("a".into()).into();
        assert_eq!(err.error_code(), "itemExists");
        assert_eq!(err.exit_code(), 4);
        assert!(!err.suggestions().is_empty());
    }

    #[test]
    fn test_not_found_exit_code() {
        let err: GenloomError = ValidationError::NotFound("src".into()).into();
        assert_eq!(err.exit_code(), 3);
        assert_eq!(GenloomError::NotFound("x".into()).exit_code(), 3);
    }
}
