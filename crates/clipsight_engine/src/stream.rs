use bytes::BytesMut;
use clipsight_logging::{clip_debug, clip_warn};
use futures_util::StreamExt;
use reqwest::Url;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

use crate::channel::{ChannelSettings, EventSink, StatusSource};
use crate::{ChannelError, ChannelEvent, JobId, StatusUpdate};

/// Push transport: one long-lived GET whose body is a stream of
/// newline-delimited JSON status records.
#[derive(Debug, Clone)]
pub struct StreamingSource {
    api_base: Url,
    settings: ChannelSettings,
}

enum StreamEnd {
    /// A terminal status was forwarded; the observation is over.
    Terminal,
    /// The server closed the stream early; reconnect within the budget.
    Dropped,
}

impl StreamingSource {
    pub fn new(api_base: Url, settings: ChannelSettings) -> Self {
        Self { api_base, settings }
    }

    fn build_client(&self) -> Result<reqwest::Client, ChannelError> {
        // No request timeout: the stream stays open for the job's lifetime.
        reqwest::Client::builder()
            .connect_timeout(self.settings.connect_timeout)
            .build()
            .map_err(|err| ChannelError::Network(err.to_string()))
    }

    fn events_url(&self, job_id: JobId) -> Result<Url, ChannelError> {
        self.api_base
            .join(&format!("api/jobs/{job_id}/events/"))
            .map_err(|err| ChannelError::InvalidUrl(err.to_string()))
    }

    async fn attempt(
        &self,
        client: &reqwest::Client,
        url: &Url,
        sink: &dyn EventSink,
    ) -> Result<StreamEnd, ChannelError> {
        let response = client
            .get(url.clone())
            .send()
            .await
            .map_err(ChannelError::from_reqwest)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ChannelError::HttpStatus(status.as_u16()));
        }

        sink.emit(ChannelEvent::Opened);

        let mut stream = response.bytes_stream();
        let mut buf = BytesMut::new();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(ChannelError::from_reqwest)?;
            buf.extend_from_slice(&chunk);

            while let Some(pos) = buf.iter().position(|&b| b == b'\n') {
                let line = buf.split_to(pos + 1);
                if forward_line(&line[..pos], sink) {
                    return Ok(StreamEnd::Terminal);
                }
            }
        }

        // The server may omit the final newline before closing the stream.
        if !buf.is_empty() && forward_line(&buf, sink) {
            return Ok(StreamEnd::Terminal);
        }
        Ok(StreamEnd::Dropped)
    }
}

/// Decodes and forwards one framed line; returns true on a terminal status.
fn forward_line(line: &[u8], sink: &dyn EventSink) -> bool {
    let trimmed: &[u8] = match std::str::from_utf8(line) {
        Ok(text) => text.trim().as_bytes(),
        Err(_) => line,
    };
    if trimmed.is_empty() {
        return false;
    }
    match serde_json::from_slice::<StatusUpdate>(trimmed) {
        Ok(update) => {
            let terminal = update.status.is_terminal();
            sink.emit(ChannelEvent::Update(update));
            terminal
        }
        Err(err) => {
            clip_warn!("skipping undecodable status record: {}", err);
            false
        }
    }
}

#[async_trait::async_trait]
impl StatusSource for StreamingSource {
    async fn run(
        &self,
        job_id: JobId,
        sink: &dyn EventSink,
        cancel: CancellationToken,
    ) -> Result<(), ChannelError> {
        let url = self.events_url(job_id)?;
        let client = self.build_client()?;
        let mut attempts: u32 = 0;

        loop {
            if cancel.is_cancelled() {
                return Ok(());
            }

            let outcome = tokio::select! {
                _ = cancel.cancelled() => return Ok(()),
                result = self.attempt(&client, &url, sink) => result,
            };

            let detail = match outcome {
                Ok(StreamEnd::Terminal) => return Ok(()),
                Ok(StreamEnd::Dropped) => "stream ended before a terminal status".to_string(),
                Err(err) => err.to_string(),
            };

            attempts += 1;
            if attempts > self.settings.max_retries {
                return Err(ChannelError::RetriesExhausted { attempts, detail });
            }
            clip_debug!("stream for job {} dropped (attempt {}): {}", job_id, attempts, detail);
            sink.emit(ChannelEvent::Lost { detail });
            tokio::select! {
                _ = cancel.cancelled() => return Ok(()),
                _ = sleep(self.settings.delay_for_attempt(attempts)) => {}
            }
        }
    }
}
