//! Host-side plumbing for the document tools: the request adapter, progress
//! events, and the file-storage upload client.

pub mod client;
pub mod error;
pub mod events;
pub mod host;

pub use client::{DEFAULT_TIMEOUT, FileStorageClient, download_path};
pub use error::UploadError;
pub use events::{EventEmitter, RecordingEmitter, ToolEvent, TracingEmitter};
pub use host::{HostRequest, StaticRequest, bearer_token};
