//! Tool failure types.

use docsmith_upload::UploadError;

/// Why a tool invocation did not produce a download link.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    /// The incoming request carried no usable bearer token.
    #[error("Not authenticated: no Bearer token found in the request")]
    MissingAuth,

    #[error("{0}")]
    UploadFailed(UploadError),

    #[error("{0:#}")]
    BuildFailed(anyhow::Error),
}

impl ToolError {
    /// True when the failure is about credentials, missing or rejected.
    pub fn is_auth(&self) -> bool {
        match self {
            Self::MissingAuth => true,
            Self::UploadFailed(e) => e.is_auth(),
            Self::BuildFailed(_) => false,
        }
    }
}

impl From<UploadError> for ToolError {
    fn from(err: UploadError) -> Self {
        match err {
            UploadError::MissingToken => Self::MissingAuth,
            other => Self::UploadFailed(other),
        }
    }
}
