use crate::state::{JobHandle, StatusUpdate};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// The upload stage handed over a job, or `None` when the user reached
    /// the progress stage without one.
    JobAccepted(Option<JobHandle>),
    /// The status channel established (or re-established) its connection.
    ChannelOpened,
    /// The status channel dropped; the transport is retrying on its own.
    ChannelLost { detail: String },
    /// The status channel gave up after exhausting its retry budget.
    ChannelFailed { detail: String },
    /// One status snapshot arrived over the channel.
    StatusReceived(StatusUpdate),
    /// The settling delay after reaching 100% elapsed.
    SettleElapsed,
    /// User toggled one asset checkbox in the results view.
    AssetToggled { key: String },
    /// User toggled the select-all control.
    AllToggled,
    /// User asked to download the current selection.
    DownloadRequested,
    /// The engine saved a downloaded payload under `filename`.
    DownloadSaved { filename: String },
    /// The direct fetch failed and the retrieval URL was opened externally.
    DownloadOpenedExternally { url: String },
    /// Retrieval failed, including the open-URL fallback.
    DownloadFailed { message: String },
    /// The observing context is being destroyed (navigation away).
    TornDown,
}
