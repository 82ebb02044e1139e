use thiserror::Error;

/// Unified error type for git-release operations
#[derive(Error, Debug)]
pub enum ReleaseError {
    #[error("Git operation failed: {0}")]
    Git(#[from] git2::Error),

    #[error("Failed to read manifest: {0}")]
    ManifestRead(String),

    #[error("Failed to write manifest: {0}")]
    ManifestWrite(String),

    #[error("Prompt error: {0}")]
    Prompt(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for Results in git-release
pub type Result<T> = std::result::Result<T, ReleaseError>;

impl ReleaseError {
    /// Create a manifest read error with context
    pub fn manifest_read(msg: impl Into<String>) -> Self {
        ReleaseError::ManifestRead(msg.into())
    }

    /// Create a manifest write error with context
    pub fn manifest_write(msg: impl Into<String>) -> Self {
        ReleaseError::ManifestWrite(msg.into())
    }

    /// Create a prompt error with context
    pub fn prompt(msg: impl Into<String>) -> Self {
        ReleaseError::Prompt(msg.into())
    }

    /// Create a configuration error with context
    pub fn config(msg: impl Into<String>) -> Self {
        ReleaseError::Config(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ReleaseError::manifest_read("package.json not found");
        assert_eq!(
            err.to_string(),
            "Failed to read manifest: package.json not found"
        );
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: ReleaseError = io_err.into();
        assert!(err.to_string().contains("I/O error"));
    }

    #[test]
    fn test_error_from_git2() {
        let git_err = git2::Error::from_str("merge conflict");
        let err: ReleaseError = git_err.into();
        assert!(err.to_string().contains("Git operation failed"));
        assert!(err.to_string().contains("merge conflict"));
    }

    #[test]
    fn test_error_constructors() {
        let error_pairs = vec![
            (ReleaseError::manifest_read("x"), "Failed to read manifest"),
            (ReleaseError::manifest_write("x"), "Failed to write manifest"),
            (ReleaseError::prompt("x"), "Prompt error"),
            (ReleaseError::config("x"), "Configuration error"),
        ];

        for (err, expected_prefix) in error_pairs {
            let msg = err.to_string();
            assert!(
                msg.starts_with(expected_prefix),
                "Error message should start with '{}', but got '{}'",
                expected_prefix,
                msg
            );
        }
    }
}
