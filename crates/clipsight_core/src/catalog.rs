/// One entry of the completed job's catalog, derived from the manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetItem {
    /// Stable identity; filenames are derived and may collide.
    pub key: String,
    pub filename: String,
    pub url: String,
}

/// Derives the asset catalog from a manifest, preserving insertion order.
pub fn derive_items(outputs: &[(String, String)], media_root: &str) -> Vec<AssetItem> {
    outputs
        .iter()
        .map(|(key, path)| AssetItem {
            key: key.clone(),
            filename: basename(path),
            url: asset_url(media_root, path),
        })
        .collect()
}

/// Display name for an asset key: underscores become spaces, each word is
/// title-cased. Presentation only; defined for any key.
pub fn friendly_name(key: &str) -> String {
    let spaced = key.replace('_', " ");
    let mut out = String::with_capacity(spaced.len());
    let mut at_word_start = true;
    for c in spaced.chars() {
        if at_word_start {
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
        at_word_start = c == ' ';
    }
    out
}

fn basename(path: &str) -> String {
    path.rsplit('/').next().unwrap_or(path).to_string()
}

/// Joins a manifest-relative path onto the media root. Manifests have been
/// observed both with and without the media prefix; when the path already
/// starts with the root's last segment, that segment is not duplicated.
fn asset_url(media_root: &str, rel_path: &str) -> String {
    let root = media_root.trim_end_matches('/');
    let rel = rel_path.trim_start_matches('/');
    if let Some(segment) = root.rsplit('/').next() {
        if !segment.is_empty() {
            if let Some(rest) = rel.strip_prefix(segment).and_then(|r| r.strip_prefix('/')) {
                return format!("{root}/{rest}");
            }
        }
    }
    format!("{root}/{rel}")
}
