//! Facade error types

use azdev_cloud::CloudError;
use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AzCliError {
    #[error("secret not found")]
    SecretNotFound,

    #[error("cli is not logged in. Try running \"az login\" to fix")]
    NotLoggedIn,

    #[error("refresh token has expired. Try running \"az login\" to fix")]
    RefreshTokenExpired,

    #[error("artifact {path} does not exist: {source}")]
    ArtifactNotFound {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{context}: {source}")]
    Context {
        context: String,
        #[source]
        source: CloudError,
    },

    #[error(transparent)]
    Cloud(#[from] CloudError),
}

impl AzCliError {
    /// HTTP status of the underlying failed response, if any
    pub fn status_code(&self) -> Option<StatusCode> {
        match self {
            AzCliError::Context { source, .. } | AzCliError::Cloud(source) => source.status_code(),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, AzCliError::SecretNotFound)
            || self.status_code() == Some(StatusCode::NOT_FOUND)
    }
}

pub type Result<T> = std::result::Result<T, AzCliError>;

/// Attach a message to a lower-level failure
pub(crate) trait ResultExt<T> {
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T, E: Into<CloudError>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| AzCliError::Context {
            context: context.into(),
            source: e.into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use azdev_cloud::ResponseError;

    #[test]
    fn test_context_keeps_status() {
        let result: std::result::Result<(), CloudError> = Err(ResponseError::from_body(
            StatusCode::FORBIDDEN,
            "GET",
            "https://management.azure.com/x",
            b"",
        )
        .into());

        let err = result.context("getting key vault").unwrap_err();
        assert_eq!(err.status_code(), Some(StatusCode::FORBIDDEN));
        assert!(err.to_string().starts_with("getting key vault: GET"));
    }

    #[test]
    fn test_io_errors_become_cloud_errors() {
        let result: std::result::Result<(), std::io::Error> =
            Err(std::io::Error::other("disk on fire"));
        let err = result.context("reading artifact file app.jar").unwrap_err();
        assert_eq!(
            err.to_string(),
            "reading artifact file app.jar: IO error: disk on fire"
        );
        assert_eq!(err.status_code(), None);
    }

    #[test]
    fn test_is_not_found() {
        assert!(AzCliError::SecretNotFound.is_not_found());
        let err: AzCliError = CloudError::from(ResponseError::from_body(
            StatusCode::NOT_FOUND,
            "GET",
            "u",
            b"",
        ))
        .into();
        assert!(err.is_not_found());
        assert!(!AzCliError::NotLoggedIn.is_not_found());
    }
}
