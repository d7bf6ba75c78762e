use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer};

pub type JobId = u64;

/// Job status as serialized by the backend. Older deployments report
/// terminal failure as `error`, current ones as `failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    Processing,
    Done,
    Failed,
    Error,
}

impl JobStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Done | JobStatus::Failed | JobStatus::Error)
    }
}

/// Asset key -> server-relative path, in the order the backend wrote the
/// JSON object. Order matters downstream, so this is not a `HashMap`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Manifest(pub Vec<(String, String)>);

impl<'de> Deserialize<'de> for Manifest {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct ManifestVisitor;

        impl<'de> Visitor<'de> for ManifestVisitor {
            type Value = Manifest;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of asset key to relative path")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((key, path)) = map.next_entry::<String, String>()? {
                    entries.push((key, path));
                }
                Ok(Manifest(entries))
            }
        }

        deserializer.deserialize_map(ManifestVisitor)
    }
}

/// One status snapshot, as delivered by either transport.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StatusUpdate {
    pub status: JobStatus,
    #[serde(default)]
    pub progress: Option<u8>,
    #[serde(default)]
    pub outputs: Option<Manifest>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Normalized event sequence a status channel emits, regardless of whether
/// the transport pulls or pushes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelEvent {
    /// Connection established, or re-established after a loss.
    Opened,
    Update(StatusUpdate),
    /// Transport dropped; the channel keeps retrying within its budget.
    Lost { detail: String },
    /// Retry budget exhausted; the channel is dead.
    Failed { detail: String },
}

/// A payload persisted to disk by the downloader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedDownload {
    pub path: std::path::PathBuf,
    pub filename: String,
    pub byte_len: u64,
}

/// How a retrieval concluded on the success path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadOutcome {
    Saved(SavedDownload),
    /// The direct fetch failed and the URL was handed to the fallback opener.
    OpenedExternally { url: String },
}
