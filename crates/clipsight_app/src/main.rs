mod config;
mod effects;
mod logging;
mod render;

use std::collections::VecDeque;
use std::path::Path;
use std::process::ExitCode;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use clipsight_core::{update, AppState, JobHandle, Msg, Phase};
use clipsight_engine::{EngineHandle, FallbackOpener};
use clipsight_logging::{clip_error, clip_info};

use config::CONFIG_FILENAME;
use effects::EffectRunner;
use logging::LogDestination;

/// Hands a failed retrieval to the user by printing the URL to open by hand.
struct PrintOpener;

impl FallbackOpener for PrintOpener {
    fn open(&self, url: &url::Url) -> bool {
        println!("Direct download failed; open this URL in a browser:");
        println!("  {url}");
        true
    }
}

fn main() -> ExitCode {
    logging::initialize(LogDestination::Both);

    let config = config::load(Path::new(CONFIG_FILENAME));
    let job = parse_args(std::env::args().skip(1).collect());

    let engine_config = match config.engine_config(std::sync::Arc::new(PrintOpener)) {
        Ok(cfg) => cfg,
        Err(err) => {
            clip_error!("invalid api_base in {}: {}", CONFIG_FILENAME, err);
            eprintln!("Invalid api_base in {CONFIG_FILENAME}: {err}");
            return ExitCode::FAILURE;
        }
    };

    let engine = EngineHandle::new(engine_config);
    let (msg_tx, msg_rx) = mpsc::channel::<Msg>();
    let runner = EffectRunner::new(engine, msg_tx);

    let mut state = AppState::new(config.media_root.clone());
    let mut pending: VecDeque<Msg> = VecDeque::new();
    pending.push_back(Msg::JobAccepted(job));

    // A single automatic retrieval once the results are published.
    let mut auto_download_done = false;
    let mut retrieval_outcome: Option<bool> = None;

    loop {
        for msg in runner.drain_engine() {
            if let Some(succeeded) = retrieval_result(&msg) {
                retrieval_outcome = Some(succeeded);
            }
            pending.push_back(msg);
        }
        while let Ok(msg) = msg_rx.try_recv() {
            pending.push_back(msg);
        }

        let mut redirected = false;
        while let Some(msg) = pending.pop_front() {
            let (next, effects) = update(state, msg);
            state = next;
            for effect in effects {
                if runner.apply(effect) {
                    redirected = true;
                }
            }
        }

        if state.consume_dirty() {
            render::render(&state.view());
        }

        if redirected {
            clip_info!("leaving the analysis flow");
            return ExitCode::FAILURE;
        }

        let view = state.view();
        if view.phase == Phase::Completed {
            if !auto_download_done {
                auto_download_done = true;
                pending.push_back(Msg::DownloadRequested);
                continue;
            }
            // Wait for the retrieval outcome, then exit.
            match retrieval_outcome {
                Some(true) => return ExitCode::SUCCESS,
                Some(false) => return ExitCode::FAILURE,
                None => {}
            }
        }

        thread::sleep(Duration::from_millis(20));
    }
}

/// Success or failure of a finished retrieval, if `msg` reports one.
/// An external open counts as success: the payload is out of our hands.
fn retrieval_result(msg: &Msg) -> Option<bool> {
    match msg {
        Msg::DownloadSaved { .. } | Msg::DownloadOpenedExternally { .. } => Some(true),
        Msg::DownloadFailed { .. } => Some(false),
        _ => None,
    }
}

/// `clipsight <job-id> [original-file-name] [match] [competition]`
///
/// A missing or unparsable job id yields no handle, which the state machine
/// treats as an immediate redirect back to the upload stage.
fn parse_args(args: Vec<String>) -> Option<JobHandle> {
    let id: u64 = args.first()?.parse().ok()?;
    let original_file_name = args
        .get(1)
        .cloned()
        .unwrap_or_else(|| "clip.mp4".to_string());
    Some(JobHandle {
        id,
        original_file_name,
        match_label: args.get(2).cloned(),
        competition: args.get(3).cloned(),
    })
}
