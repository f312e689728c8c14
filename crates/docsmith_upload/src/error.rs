//! Upload error types.

/// Errors returned by [`crate::FileStorageClient`].
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    /// No bearer token was available from the incoming request.
    #[error("No Bearer token found in request; the upload needs an authenticated request context")]
    MissingToken,

    /// The storage endpoint rejected the token.
    #[error("Upload failed: not authenticated")]
    NotAuthenticated,

    /// Any other non-success status from the storage endpoint.
    #[error("Upload failed with HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// The request never got a response (connect, timeout, TLS).
    #[error("Network error: {0}")]
    Network(String),

    /// The response body was not the expected JSON.
    #[error("Invalid upload response: {0}")]
    InvalidResponse(String),

    #[error("Invalid storage base URL {0}")]
    InvalidBaseUrl(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Upload error: {0}")]
    Other(String),
}

impl UploadError {
    /// True for failures caused by missing or rejected credentials.
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::MissingToken | Self::NotAuthenticated)
    }
}
