use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use clipsight_core::{Effect, Msg};
use clipsight_engine::{ChannelEvent, DownloadOutcome, EngineEvent, EngineHandle};
use clipsight_logging::{clip_info, clip_warn};

/// Executes core effects against the engine and feeds engine events back as
/// messages. Owns the settle timer, including its cancellation.
pub struct EffectRunner {
    engine: EngineHandle,
    msg_tx: mpsc::Sender<Msg>,
    /// Bumped on every arm/cancel; a timer only fires if its generation is
    /// still current, so a cancelled settle can never hand off.
    settle_generation: Arc<AtomicU64>,
}

impl EffectRunner {
    pub fn new(engine: EngineHandle, msg_tx: mpsc::Sender<Msg>) -> Self {
        Self {
            engine,
            msg_tx,
            settle_generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Applies one effect. Returns true when the shell should leave the flow
    /// and hand control back to the upload stage.
    pub fn apply(&self, effect: Effect) -> bool {
        match effect {
            Effect::OpenChannel { job_id } => {
                clip_info!("opening status channel for job {}", job_id);
                self.engine.open_channel(job_id);
            }
            Effect::CloseChannel => self.engine.close_channel(),
            Effect::ScheduleSettle { delay_ms } => self.arm_settle(delay_ms),
            Effect::CancelSettle => {
                self.settle_generation.fetch_add(1, Ordering::SeqCst);
            }
            Effect::FetchSelection {
                job_id,
                keys,
                fallback_name,
            } => {
                clip_info!("retrieving {} asset(s) for job {}", keys.len(), job_id);
                self.engine.download(job_id, keys, fallback_name);
            }
            Effect::Notify { message } => {
                clip_warn!("{}", message);
                eprintln!("{message}");
            }
            Effect::RedirectToUpload => return true,
        }
        false
    }

    fn arm_settle(&self, delay_ms: u64) {
        let armed = self.settle_generation.fetch_add(1, Ordering::SeqCst) + 1;
        let generation = self.settle_generation.clone();
        let msg_tx = self.msg_tx.clone();
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(delay_ms));
            if generation.load(Ordering::SeqCst) == armed {
                let _ = msg_tx.send(Msg::SettleElapsed);
            }
        });
    }

    /// Drains pending engine events into core messages.
    pub fn drain_engine(&self) -> Vec<Msg> {
        let mut msgs = Vec::new();
        while let Some(event) = self.engine.try_recv() {
            msgs.push(map_event(event));
        }
        msgs
    }
}

fn map_event(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::Channel(ChannelEvent::Opened) => Msg::ChannelOpened,
        EngineEvent::Channel(ChannelEvent::Update(update)) => {
            Msg::StatusReceived(map_update(update))
        }
        EngineEvent::Channel(ChannelEvent::Lost { detail }) => Msg::ChannelLost { detail },
        EngineEvent::Channel(ChannelEvent::Failed { detail }) => Msg::ChannelFailed { detail },
        EngineEvent::DownloadFinished(Ok(DownloadOutcome::Saved(saved))) => Msg::DownloadSaved {
            filename: saved.filename,
        },
        EngineEvent::DownloadFinished(Ok(DownloadOutcome::OpenedExternally { url })) => {
            Msg::DownloadOpenedExternally { url }
        }
        EngineEvent::DownloadFinished(Err(err)) => Msg::DownloadFailed {
            message: err.to_string(),
        },
    }
}

fn map_update(update: clipsight_engine::StatusUpdate) -> clipsight_core::StatusUpdate {
    clipsight_core::StatusUpdate {
        status: map_status(update.status),
        progress: update.progress,
        outputs: update.outputs.map(|manifest| manifest.0),
        error: update.error,
    }
}

fn map_status(status: clipsight_engine::JobStatus) -> clipsight_core::JobStatus {
    match status {
        clipsight_engine::JobStatus::Pending => clipsight_core::JobStatus::Pending,
        clipsight_engine::JobStatus::Processing => clipsight_core::JobStatus::Processing,
        clipsight_engine::JobStatus::Done => clipsight_core::JobStatus::Done,
        clipsight_engine::JobStatus::Failed => clipsight_core::JobStatus::Failed,
        clipsight_engine::JobStatus::Error => clipsight_core::JobStatus::Error,
    }
}
