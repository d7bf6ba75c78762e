use crate::state::{AppState, JobResult, Phase, StatusUpdate, SETTLE_DELAY_MS};
use crate::{Effect, Msg};

const EMPTY_SELECTION_MESSAGE: &str = "Please select at least one file to download.";
const GENERIC_FAILURE_MESSAGE: &str = "Analysis failed. Please try again.";

/// Pure update function: applies a message to state and returns any effects.
///
/// Exactly one terminal transition occurs per job lifecycle, and nothing is
/// processed after teardown has been requested.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    if state.torn_down() {
        return (state, Vec::new());
    }

    let effects = match msg {
        Msg::JobAccepted(None) => {
            if state.phase() != Phase::Entry {
                return (state, Vec::new());
            }
            // Precondition violation: nothing to observe.
            state.set_phase(Phase::Aborted);
            vec![Effect::RedirectToUpload]
        }
        Msg::JobAccepted(Some(job)) => {
            if state.phase() != Phase::Entry {
                return (state, Vec::new());
            }
            let job_id = job.id;
            state.accept_job(job);
            state.set_phase(Phase::Connecting);
            state.set_status_line("Connecting\u{2026}");
            vec![Effect::OpenChannel { job_id }]
        }
        Msg::ChannelOpened => {
            match state.phase() {
                Phase::Connecting => {
                    state.set_phase(Phase::Observing);
                    state.set_status_line(phrase_for(state.progress()));
                }
                // Re-established after a loss mid-observation.
                Phase::Observing => state.set_status_line(phrase_for(state.progress())),
                _ => {}
            }
            Vec::new()
        }
        Msg::ChannelLost { .. } => {
            // Recoverable: the transport owns the retry budget.
            if matches!(state.phase(), Phase::Connecting | Phase::Observing) {
                state.set_status_line("Connection lost, reconnecting\u{2026}");
            }
            Vec::new()
        }
        Msg::ChannelFailed { detail } => {
            if !matches!(state.phase(), Phase::Connecting | Phase::Observing) {
                return (state, Vec::new());
            }
            state.set_phase(Phase::Aborted);
            state.set_status_line("Connection failed.");
            vec![
                Effect::Notify {
                    message: detail.clone(),
                },
                Effect::RedirectToUpload,
            ]
        }
        Msg::StatusReceived(update) => apply_status(&mut state, update),
        Msg::SettleElapsed => {
            if !state.settle_pending() || state.phase() != Phase::Observing {
                return (state, Vec::new());
            }
            if state.publish_result() {
                state.set_phase(Phase::Completed);
                state.set_status_line("Your visualizations are ready.");
                vec![Effect::CloseChannel]
            } else {
                Vec::new()
            }
        }
        Msg::AssetToggled { key } => {
            if state.phase() == Phase::Completed {
                state.clear_banner();
                state.selection_mut().toggle_one(&key);
            }
            Vec::new()
        }
        Msg::AllToggled => {
            if state.phase() == Phase::Completed {
                state.clear_banner();
                let keys = catalog_keys(&state);
                state.selection_mut().toggle_all(&keys);
            }
            Vec::new()
        }
        Msg::DownloadRequested => request_download(&mut state),
        Msg::DownloadSaved { filename } => {
            state.clear_banner();
            state.set_status_line(format!("Saved {filename}."));
            Vec::new()
        }
        Msg::DownloadOpenedExternally { url } => {
            state.clear_banner();
            state.set_status_line(format!("Download opened externally: {url}"));
            Vec::new()
        }
        Msg::DownloadFailed { message } => {
            // Terminal for this attempt only; the results view stays up and
            // the selection is untouched.
            state.set_banner(message);
            Vec::new()
        }
        Msg::TornDown => {
            state.tear_down();
            vec![Effect::CloseChannel, Effect::CancelSettle]
        }
    };

    (state, effects)
}

fn apply_status(state: &mut AppState, update: StatusUpdate) -> Vec<Effect> {
    // A stashed result means the terminal decision is already made; late
    // duplicates must not re-trigger it.
    if state.phase() != Phase::Observing || state.settle_pending() {
        return Vec::new();
    }

    if let Some(progress) = update.progress {
        state.raise_progress(progress);
        state.set_status_line(phrase_for(state.progress()));
    }

    if update.status.is_failure() {
        state.set_phase(Phase::Aborted);
        let message = update
            .error
            .filter(|text| !text.is_empty())
            .unwrap_or_else(|| GENERIC_FAILURE_MESSAGE.to_string());
        state.set_status_line("Analysis failed.");
        return vec![
            Effect::Notify { message },
            Effect::CloseChannel,
            Effect::RedirectToUpload,
        ];
    }

    if update.status == crate::JobStatus::Done {
        // Show 100% before handing off; the actual transition waits for the
        // settling timer.
        state.force_progress_complete();
        state.set_status_line("Analysis complete.");
        let id = state.job().map(|job| job.id).unwrap_or_default();
        state.stash_result(JobResult {
            id,
            outputs: update.outputs.unwrap_or_default(),
        });
        return vec![Effect::ScheduleSettle {
            delay_ms: SETTLE_DELAY_MS,
        }];
    }

    Vec::new()
}

fn request_download(state: &mut AppState) -> Vec<Effect> {
    if state.phase() != Phase::Completed {
        return Vec::new();
    }
    let Some(job_id) = state.result().map(|result| result.id) else {
        state.set_banner("No results available to download.");
        return Vec::new();
    };
    if state.selection().is_empty() {
        state.set_banner(EMPTY_SELECTION_MESSAGE);
        return Vec::new();
    }
    state.clear_banner();

    let keys = state.selection().ordered_keys(&catalog_keys(state));
    let fallback_name = if keys.len() == 1 {
        state
            .items()
            .iter()
            .find(|item| item.key == keys[0])
            .map(|item| item.filename.clone())
            .unwrap_or_else(|| "download.mp4".to_string())
    } else {
        format!("job_{job_id}_assets.zip")
    };

    vec![Effect::FetchSelection {
        job_id,
        keys,
        fallback_name,
    }]
}

/// Human status phrase for a progress value. Presentation only.
fn phrase_for(progress: u8) -> &'static str {
    match progress {
        0..=29 => "Reading frames\u{2026}",
        30..=59 => "Detecting players and ball\u{2026}",
        60..=79 => "Assigning teams\u{2026}",
        _ => "Generating visualizations\u{2026}",
    }
}

fn catalog_keys(state: &AppState) -> Vec<String> {
    state.items().iter().map(|item| item.key.clone()).collect()
}
