//! Clipsight core: pure state machine for the job-progress and results flow.
mod catalog;
mod effect;
mod msg;
mod selection;
mod state;
mod update;
mod view_model;

pub use catalog::{derive_items, friendly_name, AssetItem};
pub use effect::Effect;
pub use msg::Msg;
pub use selection::SelectionSet;
pub use state::{
    AppState, JobHandle, JobId, JobResult, JobStatus, Phase, StatusUpdate, SETTLE_DELAY_MS,
};
pub use update::update;
pub use view_model::{AppViewModel, AssetRowView};
