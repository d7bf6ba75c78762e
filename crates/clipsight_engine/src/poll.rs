use clipsight_logging::clip_debug;
use reqwest::Url;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

use crate::channel::{ChannelSettings, EventSink, StatusSource};
use crate::{ChannelError, ChannelEvent, JobId, StatusUpdate};

/// Pull transport: periodic GET against the job status endpoint.
#[derive(Debug, Clone)]
pub struct PollingSource {
    api_base: Url,
    settings: ChannelSettings,
}

impl PollingSource {
    pub fn new(api_base: Url, settings: ChannelSettings) -> Self {
        Self { api_base, settings }
    }

    fn build_client(&self) -> Result<reqwest::Client, ChannelError> {
        reqwest::Client::builder()
            .connect_timeout(self.settings.connect_timeout)
            .timeout(self.settings.request_timeout)
            .build()
            .map_err(|err| ChannelError::Network(err.to_string()))
    }

    fn status_url(&self, job_id: JobId) -> Result<Url, ChannelError> {
        self.api_base
            .join(&format!("api/jobs/{job_id}/"))
            .map_err(|err| ChannelError::InvalidUrl(err.to_string()))
    }
}

async fn poll_once(client: &reqwest::Client, url: &Url) -> Result<StatusUpdate, ChannelError> {
    let response = client
        .get(url.clone())
        .send()
        .await
        .map_err(ChannelError::from_reqwest)?;

    let status = response.status();
    if !status.is_success() {
        return Err(ChannelError::HttpStatus(status.as_u16()));
    }

    let body = response
        .bytes()
        .await
        .map_err(ChannelError::from_reqwest)?;
    serde_json::from_slice(&body).map_err(|err| ChannelError::Decode(err.to_string()))
}

#[async_trait::async_trait]
impl StatusSource for PollingSource {
    async fn run(
        &self,
        job_id: JobId,
        sink: &dyn EventSink,
        cancel: CancellationToken,
    ) -> Result<(), ChannelError> {
        let url = self.status_url(job_id)?;
        let client = self.build_client()?;
        let mut connected = false;
        let mut attempts: u32 = 0;

        loop {
            if cancel.is_cancelled() {
                return Ok(());
            }

            let outcome = tokio::select! {
                _ = cancel.cancelled() => return Ok(()),
                result = poll_once(&client, &url) => result,
            };

            match outcome {
                Ok(update) => {
                    attempts = 0;
                    if !connected {
                        connected = true;
                        sink.emit(ChannelEvent::Opened);
                    }
                    let terminal = update.status.is_terminal();
                    sink.emit(ChannelEvent::Update(update));
                    if terminal {
                        return Ok(());
                    }
                    tokio::select! {
                        _ = cancel.cancelled() => return Ok(()),
                        _ = sleep(self.settings.poll_interval) => {}
                    }
                }
                Err(err) => {
                    attempts += 1;
                    if attempts > self.settings.max_retries {
                        return Err(ChannelError::RetriesExhausted {
                            attempts,
                            detail: err.to_string(),
                        });
                    }
                    connected = false;
                    clip_debug!("poll for job {} failed (attempt {}): {}", job_id, attempts, err);
                    sink.emit(ChannelEvent::Lost {
                        detail: err.to_string(),
                    });
                    tokio::select! {
                        _ = cancel.cancelled() => return Ok(()),
                        _ = sleep(self.settings.delay_for_attempt(attempts)) => {}
                    }
                }
            }
        }
    }
}
