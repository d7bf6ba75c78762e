use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use clipsight_engine::{EngineConfig, FallbackOpener, TransportKind};
use clipsight_logging::clip_warn;
use serde::{Deserialize, Serialize};
use url::Url;

pub const CONFIG_FILENAME: &str = "clipsight.ron";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransportChoice {
    Poll,
    Stream,
}

/// Shell configuration, read from `clipsight.ron` next to the binary.
/// Every field has a default, so a partial (or absent) file is fine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellConfig {
    pub api_base: String,
    pub media_root: String,
    pub output_dir: PathBuf,
    pub transport: TransportChoice,
    pub poll_interval_ms: u64,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            api_base: "http://127.0.0.1:8000/".to_string(),
            media_root: "http://127.0.0.1:8000/media".to_string(),
            output_dir: PathBuf::from("downloads"),
            transport: TransportChoice::Poll,
            poll_interval_ms: 1500,
        }
    }
}

impl ShellConfig {
    pub fn engine_config(
        &self,
        opener: Arc<dyn FallbackOpener>,
    ) -> Result<EngineConfig, url::ParseError> {
        let api_base = Url::parse(&self.api_base)?;
        let mut config = EngineConfig::new(api_base, self.output_dir.clone());
        config.transport = match self.transport {
            TransportChoice::Poll => TransportKind::Poll,
            TransportChoice::Stream => TransportKind::Stream,
        };
        config.channel.poll_interval = Duration::from_millis(self.poll_interval_ms);
        config.opener = opener;
        Ok(config)
    }
}

pub fn load(path: &Path) -> ShellConfig {
    let content = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return ShellConfig::default();
        }
        Err(err) => {
            clip_warn!("Failed to read config from {:?}: {}", path, err);
            return ShellConfig::default();
        }
    };

    match ron::from_str(&content) {
        Ok(config) => config,
        Err(err) => {
            clip_warn!("Failed to parse config from {:?}: {}", path, err);
            ShellConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = load(&dir.path().join("nope.ron"));
        assert_eq!(config, ShellConfig::default());
    }

    #[test]
    fn partial_file_keeps_remaining_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(CONFIG_FILENAME);
        std::fs::write(
            &path,
            r#"(api_base: "http://analysis.local:9000/", transport: Stream)"#,
        )
        .unwrap();

        let config = load(&path);
        assert_eq!(config.api_base, "http://analysis.local:9000/");
        assert_eq!(config.transport, TransportChoice::Stream);
        assert_eq!(config.poll_interval_ms, 1500);
    }

    #[test]
    fn unparsable_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(CONFIG_FILENAME);
        std::fs::write(&path, "not ron at all").unwrap();
        assert_eq!(load(&path), ShellConfig::default());
    }

    #[test]
    fn engine_config_maps_the_transport_choice() {
        let config = ShellConfig {
            transport: TransportChoice::Stream,
            poll_interval_ms: 250,
            ..ShellConfig::default()
        };
        let engine = config
            .engine_config(Arc::new(clipsight_engine::NoFallbackOpener))
            .expect("engine config");
        assert_eq!(engine.transport, TransportKind::Stream);
        assert_eq!(engine.channel.poll_interval, Duration::from_millis(250));
    }

    #[test]
    fn a_bad_api_base_is_rejected() {
        let config = ShellConfig {
            api_base: "not a url".to_string(),
            ..ShellConfig::default()
        };
        assert!(config
            .engine_config(Arc::new(clipsight_engine::NoFallbackOpener))
            .is_err());
    }
}
