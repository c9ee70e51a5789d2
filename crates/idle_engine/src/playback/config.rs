use serde::Deserialize;

use crate::catalog::{DEFAULT_SPECIAL_CLIP, MOVE_CLIP};
use crate::schedule::DEFAULT_ACTIVE_LEVEL;

pub const DEFAULT_GLOBAL_MIX_SECONDS: f32 = 0.2;
pub const DEFAULT_REFILL_THRESHOLD: usize = 32;
pub const DEFAULT_REFILL_BATCH: usize = 64;
pub const DEFAULT_STARTUP_CLIP: &str = "Interact";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    pub active_level: i32,
    pub default_clip: String,
    pub special_clip: String,
    pub global_mix_seconds: f32,
    pub refill_threshold: usize,
    pub refill_batch: usize,
    pub prefix_window: usize,
    pub startup_clip: Option<String>,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            active_level: DEFAULT_ACTIVE_LEVEL,
            default_clip: MOVE_CLIP.to_string(),
            special_clip: DEFAULT_SPECIAL_CLIP.to_string(),
            global_mix_seconds: DEFAULT_GLOBAL_MIX_SECONDS,
            refill_threshold: DEFAULT_REFILL_THRESHOLD,
            refill_batch: DEFAULT_REFILL_BATCH,
            prefix_window: DEFAULT_REFILL_THRESHOLD,
            startup_clip: Some(DEFAULT_STARTUP_CLIP.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn omitted_fields_fall_back_to_defaults() {
        let config: PlaybackConfig =
            serde_json::from_str(r#"{"active_level": 5, "startup_clip": null}"#).expect("config");

        assert_eq!(config.active_level, 5);
        assert_eq!(config.startup_clip, None);
        assert_eq!(config.refill_threshold, 32);
        assert_eq!(config.refill_batch, 64);
        assert_eq!(config.default_clip, "Move");
    }
}
