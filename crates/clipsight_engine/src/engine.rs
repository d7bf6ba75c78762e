use std::path::PathBuf;
use std::sync::{mpsc, Arc};
use std::thread;

use clipsight_logging::clip_debug;
use reqwest::Url;
use tokio_util::sync::CancellationToken;

use crate::channel::{ChannelSettings, EventSink, StatusSource};
use crate::download::{DownloadSettings, Downloader, FallbackOpener, NoFallbackOpener};
use crate::poll::PollingSource;
use crate::stream::StreamingSource;
use crate::{ChannelEvent, DownloadOutcome, JobId, RetrievalError};

/// Which status-channel discipline to run. Both deliver the same normalized
/// event sequence; this is configuration, not page logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportKind {
    Poll,
    Stream,
}

pub struct EngineConfig {
    pub api_base: Url,
    pub transport: TransportKind,
    pub channel: ChannelSettings,
    pub download: DownloadSettings,
    pub output_dir: PathBuf,
    pub opener: Arc<dyn FallbackOpener>,
}

impl EngineConfig {
    pub fn new(api_base: Url, output_dir: PathBuf) -> Self {
        Self {
            api_base,
            transport: TransportKind::Poll,
            channel: ChannelSettings::default(),
            download: DownloadSettings::default(),
            output_dir,
            opener: Arc::new(NoFallbackOpener),
        }
    }
}

#[derive(Debug)]
pub enum EngineEvent {
    Channel(ChannelEvent),
    DownloadFinished(Result<DownloadOutcome, RetrievalError>),
}

enum EngineCommand {
    OpenChannel {
        job_id: JobId,
    },
    CloseChannel,
    Download {
        job_id: JobId,
        keys: Vec<String>,
        fallback_name: String,
    },
}

struct EngineEventSink {
    tx: mpsc::Sender<EngineEvent>,
    cancel: CancellationToken,
}

impl EventSink for EngineEventSink {
    fn emit(&self, event: ChannelEvent) {
        // A cancelled session must not leak events past its lifetime.
        if !self.cancel.is_cancelled() {
            let _ = self.tx.send(EngineEvent::Channel(event));
        }
    }
}

pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
}

impl EngineHandle {
    pub fn new(config: EngineConfig) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();

        thread::spawn(move || {
            let runtime = tokio::runtime::Runtime::new().expect("tokio runtime");
            let source: Arc<dyn StatusSource> = match config.transport {
                TransportKind::Poll => Arc::new(PollingSource::new(
                    config.api_base.clone(),
                    config.channel.clone(),
                )),
                TransportKind::Stream => Arc::new(StreamingSource::new(
                    config.api_base.clone(),
                    config.channel.clone(),
                )),
            };
            let downloader = Arc::new(Downloader::new(
                config.download.clone(),
                config.api_base.clone(),
                config.output_dir.clone(),
            ));
            let opener = config.opener.clone();

            // At most one live channel; opening a new one closes the old.
            let mut live: Option<CancellationToken> = None;

            while let Ok(command) = cmd_rx.recv() {
                match command {
                    EngineCommand::OpenChannel { job_id } => {
                        if let Some(previous) = live.take() {
                            previous.cancel();
                        }
                        let cancel = CancellationToken::new();
                        live = Some(cancel.clone());

                        let source = source.clone();
                        let event_tx = event_tx.clone();
                        runtime.spawn(async move {
                            let sink = EngineEventSink {
                                tx: event_tx.clone(),
                                cancel: cancel.clone(),
                            };
                            if let Err(err) = source.run(job_id, &sink, cancel.clone()).await {
                                if !cancel.is_cancelled() {
                                    let _ = event_tx.send(EngineEvent::Channel(
                                        ChannelEvent::Failed {
                                            detail: err.to_string(),
                                        },
                                    ));
                                }
                            }
                        });
                    }
                    EngineCommand::CloseChannel => {
                        if let Some(token) = live.take() {
                            clip_debug!("closing status channel");
                            token.cancel();
                        }
                    }
                    EngineCommand::Download {
                        job_id,
                        keys,
                        fallback_name,
                    } => {
                        let downloader = downloader.clone();
                        let opener = opener.clone();
                        let event_tx = event_tx.clone();
                        runtime.spawn(async move {
                            let result = downloader
                                .download(job_id, &keys, &fallback_name, opener.as_ref())
                                .await;
                            let _ = event_tx.send(EngineEvent::DownloadFinished(result));
                        });
                    }
                }
            }
        });

        Self { cmd_tx, event_rx }
    }

    pub fn open_channel(&self, job_id: JobId) {
        let _ = self.cmd_tx.send(EngineCommand::OpenChannel { job_id });
    }

    pub fn close_channel(&self) {
        let _ = self.cmd_tx.send(EngineCommand::CloseChannel);
    }

    pub fn download(&self, job_id: JobId, keys: Vec<String>, fallback_name: impl Into<String>) {
        let _ = self.cmd_tx.send(EngineCommand::Download {
            job_id,
            keys,
            fallback_name: fallback_name.into(),
        });
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }
}
