use crate::state::JobId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Open the status channel for `job_id`, closing any predecessor first.
    OpenChannel { job_id: JobId },
    /// Close the live status channel, if any.
    CloseChannel,
    /// Arm the one-shot settling timer; fires `Msg::SettleElapsed`.
    ScheduleSettle { delay_ms: u64 },
    /// Disarm a pending settling timer so it cannot fire after teardown.
    CancelSettle,
    /// Execute one retrieval for the selected keys, in catalog order.
    /// `fallback_name` is used when the response carries no filename hint.
    FetchSelection {
        job_id: JobId,
        keys: Vec<String>,
        fallback_name: String,
    },
    /// Surface a message through whatever notification mechanism the shell
    /// provides.
    Notify { message: String },
    /// Leave the flow and return to the upload stage.
    RedirectToUpload,
}
