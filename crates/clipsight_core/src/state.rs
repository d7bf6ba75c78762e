use crate::catalog::{derive_items, AssetItem};
use crate::selection::SelectionSet;
use crate::view_model::{AppViewModel, AssetRowView};

pub type JobId = u64;

/// Pause after reaching 100% before handing off to the results stage.
pub const SETTLE_DELAY_MS: u64 = 800;

/// Everything the upload stage knows about the job it created.
///
/// Passed by value into the state machine; never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobHandle {
    pub id: JobId,
    pub original_file_name: String,
    pub match_label: Option<String>,
    pub competition: Option<String>,
}

/// Backend job status as reported over the status channel.
///
/// The backend has been observed emitting both `failed` and `error` for a
/// terminal failure; both are treated identically.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    Pending,
    Processing,
    Done,
    Failed,
    Error,
}

impl JobStatus {
    pub fn is_failure(self) -> bool {
        matches!(self, JobStatus::Failed | JobStatus::Error)
    }
}

/// One snapshot from the status channel. Each update supersedes the previous
/// one; nothing here is persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusUpdate {
    pub status: JobStatus,
    pub progress: Option<u8>,
    /// Asset key -> server-relative path, in manifest insertion order.
    /// Present only when `status` is `Done`.
    pub outputs: Option<Vec<(String, String)>>,
    pub error: Option<String>,
}

/// The completed job's output manifest. Created exactly once, at the
/// transition into `Done`, and immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobResult {
    pub id: JobId,
    pub outputs: Vec<(String, String)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Entry,
    Connecting,
    Observing,
    Completed,
    Aborted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    media_root: String,
    phase: Phase,
    job: Option<JobHandle>,
    progress: u8,
    status_line: String,
    banner: Option<String>,
    settle_pending: bool,
    pending_result: Option<JobResult>,
    result: Option<JobResult>,
    items: Vec<AssetItem>,
    selection: SelectionSet,
    torn_down: bool,
    dirty: bool,
}

impl AppState {
    /// `media_root` is the fixed base used to resolve manifest-relative
    /// output paths into fetchable URLs.
    pub fn new(media_root: impl Into<String>) -> Self {
        Self {
            media_root: media_root.into(),
            phase: Phase::Entry,
            job: None,
            progress: 0,
            status_line: String::new(),
            banner: None,
            settle_pending: false,
            pending_result: None,
            result: None,
            items: Vec::new(),
            selection: SelectionSet::default(),
            torn_down: false,
            dirty: false,
        }
    }

    pub fn view(&self) -> AppViewModel {
        let assets = self
            .items
            .iter()
            .map(|item| AssetRowView {
                key: item.key.clone(),
                friendly_name: crate::catalog::friendly_name(&item.key),
                filename: item.filename.clone(),
                url: item.url.clone(),
                selected: self.selection.contains(&item.key),
            })
            .collect();
        AppViewModel {
            phase: self.phase,
            percent: self.progress,
            status_line: self.status_line.clone(),
            banner: self.banner.clone(),
            job: self.job.clone(),
            assets,
            selected_count: self.selection.len(),
            all_selected: self.selection.is_all_selected(self.items.len()),
            dirty: self.dirty,
        }
    }

    /// Returns whether a render is due and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn phase(&self) -> Phase {
        self.phase
    }

    pub(crate) fn set_phase(&mut self, phase: Phase) {
        self.phase = phase;
        self.mark_dirty();
    }

    pub(crate) fn job(&self) -> Option<&JobHandle> {
        self.job.as_ref()
    }

    pub(crate) fn accept_job(&mut self, job: JobHandle) {
        self.job = Some(job);
        self.mark_dirty();
    }

    pub(crate) fn progress(&self) -> u8 {
        self.progress
    }

    /// Displayed progress never regresses, even if the transport delivers an
    /// out-of-order duplicate.
    pub(crate) fn raise_progress(&mut self, reported: u8) {
        let capped = reported.min(100);
        if capped > self.progress {
            self.progress = capped;
            self.mark_dirty();
        }
    }

    pub(crate) fn force_progress_complete(&mut self) {
        if self.progress != 100 {
            self.progress = 100;
            self.mark_dirty();
        }
    }

    pub(crate) fn set_status_line(&mut self, line: impl Into<String>) {
        let line = line.into();
        if line != self.status_line {
            self.status_line = line;
            self.mark_dirty();
        }
    }

    pub(crate) fn set_banner(&mut self, message: impl Into<String>) {
        self.banner = Some(message.into());
        self.mark_dirty();
    }

    pub(crate) fn clear_banner(&mut self) {
        if self.banner.take().is_some() {
            self.mark_dirty();
        }
    }

    pub(crate) fn settle_pending(&self) -> bool {
        self.settle_pending
    }

    pub(crate) fn stash_result(&mut self, result: JobResult) {
        self.pending_result = Some(result);
        self.settle_pending = true;
    }

    /// Publishes the stashed result: derives the asset catalog and resets the
    /// selection against it ("everything selected" by default).
    pub(crate) fn publish_result(&mut self) -> bool {
        let Some(result) = self.pending_result.take() else {
            return false;
        };
        self.settle_pending = false;
        self.items = derive_items(&result.outputs, &self.media_root);
        self.result = Some(result);
        let keys: Vec<String> = self.items.iter().map(|item| item.key.clone()).collect();
        self.selection.resync(&keys);
        self.mark_dirty();
        true
    }

    pub(crate) fn result(&self) -> Option<&JobResult> {
        self.result.as_ref()
    }

    pub(crate) fn items(&self) -> &[AssetItem] {
        &self.items
    }

    pub(crate) fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    pub(crate) fn selection_mut(&mut self) -> &mut SelectionSet {
        self.mark_dirty();
        &mut self.selection
    }

    pub(crate) fn torn_down(&self) -> bool {
        self.torn_down
    }

    pub(crate) fn tear_down(&mut self) {
        self.torn_down = true;
    }
}
