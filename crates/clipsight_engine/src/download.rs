use std::path::PathBuf;
use std::time::Duration;

use clipsight_logging::{clip_info, clip_warn};
use futures_util::StreamExt;
use reqwest::header::CONTENT_DISPOSITION;
use reqwest::Url;

use crate::disposition::filename_from_content_disposition;
use crate::persist::AtomicFileWriter;
use crate::{DownloadOutcome, JobId, RetrievalError, SavedDownload};

#[derive(Debug, Clone)]
pub struct DownloadSettings {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl Default for DownloadSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(120),
        }
    }
}

/// Last-resort hand-off when the direct fetch fails: open the retrieval URL
/// in whatever external viewer the shell provides. Returns false when that
/// is blocked or unavailable, which is the terminal failure mode.
pub trait FallbackOpener: Send + Sync {
    fn open(&self, url: &Url) -> bool;
}

/// Opener for shells with nothing to open a URL with.
pub struct NoFallbackOpener;

impl FallbackOpener for NoFallbackOpener {
    fn open(&self, _url: &Url) -> bool {
        false
    }
}

/// Executes one retrieval per invocation: a single request parameterized by
/// the job id and the ordered selected keys, saved under a name resolved
/// from the response metadata or the caller's fallback.
pub struct Downloader {
    settings: DownloadSettings,
    api_base: Url,
    writer: AtomicFileWriter,
}

impl Downloader {
    pub fn new(settings: DownloadSettings, api_base: Url, output_dir: PathBuf) -> Self {
        Self {
            settings,
            api_base,
            writer: AtomicFileWriter::new(output_dir),
        }
    }

    /// The retrieval URL: `api/jobs/{id}/download/?which=k1,k2,…` with keys
    /// comma-joined in selection order.
    pub fn download_url(&self, job_id: JobId, keys: &[String]) -> Result<Url, RetrievalError> {
        let mut url = self
            .api_base
            .join(&format!("api/jobs/{job_id}/download/"))
            .map_err(|err| RetrievalError::InvalidUrl(err.to_string()))?;
        url.set_query(Some(&format!("which={}", keys.join(","))));
        Ok(url)
    }

    pub async fn download(
        &self,
        job_id: JobId,
        keys: &[String],
        fallback_name: &str,
        opener: &dyn FallbackOpener,
    ) -> Result<DownloadOutcome, RetrievalError> {
        let url = self.download_url(job_id, keys)?;
        let client = reqwest::Client::builder()
            .connect_timeout(self.settings.connect_timeout)
            .timeout(self.settings.request_timeout)
            .build()
            .map_err(RetrievalError::from_reqwest)?;

        let (payload, header_name) = match self.fetch_payload(&client, &url).await {
            Ok(fetched) => fetched,
            Err(err) => {
                // Failover: hand the same URL to an external opener. Not
                // retried; a blocked fallback is the final error.
                clip_warn!("direct download failed ({}), trying external open", err);
                return if opener.open(&url) {
                    Ok(DownloadOutcome::OpenedExternally {
                        url: url.to_string(),
                    })
                } else {
                    Err(RetrievalError::FallbackBlocked {
                        url: url.to_string(),
                    })
                };
            }
        };

        let filename = header_name.unwrap_or_else(|| fallback_name.to_string());
        let path = self.writer.write(&filename, &payload)?;
        // The writer may have stripped the name down to a safe component.
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or(filename);
        clip_info!("saved {} ({} bytes) to {:?}", filename, payload.len(), path);
        Ok(DownloadOutcome::Saved(SavedDownload {
            path,
            byte_len: payload.len() as u64,
            filename,
        }))
    }

    async fn fetch_payload(
        &self,
        client: &reqwest::Client,
        url: &Url,
    ) -> Result<(Vec<u8>, Option<String>), RetrievalError> {
        let response = client
            .get(url.clone())
            .send()
            .await
            .map_err(RetrievalError::from_reqwest)?;

        let status = response.status();
        if !status.is_success() {
            return Err(RetrievalError::HttpStatus(status.as_u16()));
        }

        let header_name = response
            .headers()
            .get(CONTENT_DISPOSITION)
            .and_then(|value| value.to_str().ok())
            .and_then(filename_from_content_disposition);

        let mut payload = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(RetrievalError::from_reqwest)?;
            payload.extend_from_slice(&chunk);
        }

        Ok((payload, header_name))
    }
}
