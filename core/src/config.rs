use crate::{
    clock::{DEFAULT_PLAYBACK_SPEED_MS, DEFAULT_POLL_INTERVAL_MS},
    error::ObserverResult,
    interpolation::DEFAULT_TRANSITION_MS,
    types::Millis,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Viewer timings and defaults. Every field may be omitted from a
/// config file; missing fields take the built-in defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// How long each frame stays on screen during playback.
    pub playback_speed_ms:      u64,
    /// Length of a smooth seek/step transition.
    pub transition_duration_ms: Millis,
    /// Cadence at which hosts poll the playback clock.
    pub poll_interval_ms:       u64,
    pub interpolation_enabled:  bool,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            playback_speed_ms:      DEFAULT_PLAYBACK_SPEED_MS,
            transition_duration_ms: DEFAULT_TRANSITION_MS,
            poll_interval_ms:       DEFAULT_POLL_INTERVAL_MS,
            interpolation_enabled:  true,
        }
    }
}

impl ViewerConfig {
    /// Load from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> ObserverResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {}: {e}", path.display()))?;
        Self::from_json(&content)
    }

    pub fn from_json(json: &str) -> ObserverResult<Self> {
        let config: ViewerConfig = serde_json::from_str(json)?;
        if config.playback_speed_ms == 0 {
            log::warn!("playback_speed_ms of 0 in config; using {DEFAULT_PLAYBACK_SPEED_MS}");
            return Ok(Self { playback_speed_ms: DEFAULT_PLAYBACK_SPEED_MS, ..config });
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let config = ViewerConfig::from_json(r#"{ "playback_speed_ms": 250 }"#).unwrap();
        assert_eq!(config.playback_speed_ms, 250);
        assert_eq!(config.transition_duration_ms, 500.0);
        assert_eq!(config.poll_interval_ms, 16);
        assert!(config.interpolation_enabled);
    }

    #[test]
    fn zero_speed_falls_back_to_default() {
        let config = ViewerConfig::from_json(r#"{ "playback_speed_ms": 0 }"#).unwrap();
        assert_eq!(config.playback_speed_ms, 1000);
    }

    #[test]
    fn unreadable_file_is_an_error() {
        assert!(ViewerConfig::load("/definitely/not/here/viewer.json").is_err());
    }
}
