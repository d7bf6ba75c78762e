use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::{ChannelError, ChannelEvent, JobId};

/// Retry discipline shared by both transports. The channel owns its own
/// reconnection budget; the state machine only sees `Lost`/`Failed` events.
#[derive(Debug, Clone)]
pub struct ChannelSettings {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    /// Gap between polls (ignored by the streaming transport).
    pub poll_interval: Duration,
    pub max_retries: u32,
    pub retry_delay: Duration,
}

impl Default for ChannelSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            poll_interval: Duration::from_millis(1500),
            max_retries: 5,
            retry_delay: Duration::from_millis(500),
        }
    }
}

impl ChannelSettings {
    /// Linear backoff; attempt counting starts at 1.
    pub(crate) fn delay_for_attempt(&self, attempt: u32) -> Duration {
        self.retry_delay * attempt.max(1)
    }
}

pub trait EventSink: Send + Sync {
    fn emit(&self, event: ChannelEvent);
}

/// One observation session over a job's status, poll or push.
///
/// `run` emits `Opened`, then `Update`s in arrival order, interleaving
/// `Lost` on recoverable drops. It returns `Ok` once a terminal status has
/// been forwarded or `cancel` fires; after cancellation nothing further is
/// emitted. Exhausting the retry budget returns an error; the caller
/// surfaces it as `ChannelEvent::Failed`.
#[async_trait::async_trait]
pub trait StatusSource: Send + Sync {
    async fn run(
        &self,
        job_id: JobId,
        sink: &dyn EventSink,
        cancel: CancellationToken,
    ) -> Result<(), ChannelError>;
}
