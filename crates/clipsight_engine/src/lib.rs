//! Clipsight engine: status-channel transports and retrieval execution.
mod channel;
mod disposition;
mod download;
mod engine;
mod error;
mod persist;
mod poll;
mod stream;
mod types;

pub use channel::{ChannelSettings, EventSink, StatusSource};
pub use tokio_util::sync::CancellationToken;
pub use disposition::filename_from_content_disposition;
pub use download::{DownloadSettings, Downloader, FallbackOpener, NoFallbackOpener};
pub use engine::{EngineConfig, EngineEvent, EngineHandle, TransportKind};
pub use error::{ChannelError, RetrievalError};
pub use persist::{ensure_output_dir, AtomicFileWriter, PersistError};
pub use poll::PollingSource;
pub use stream::StreamingSource;
pub use types::{
    ChannelEvent, DownloadOutcome, JobId, JobStatus, Manifest, SavedDownload, StatusUpdate,
};
