use crate::state::{JobHandle, Phase};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppViewModel {
    pub phase: Phase,
    pub percent: u8,
    pub status_line: String,
    pub banner: Option<String>,
    pub job: Option<JobHandle>,
    pub assets: Vec<AssetRowView>,
    pub selected_count: usize,
    pub all_selected: bool,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetRowView {
    pub key: String,
    pub friendly_name: String,
    pub filename: String,
    pub url: String,
    pub selected: bool,
}
