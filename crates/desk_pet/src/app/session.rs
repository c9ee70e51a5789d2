use std::collections::BTreeMap;
use std::fmt::Display;
use std::fs;
use std::path::{Path, PathBuf};

use idle_engine::{PlaybackConfig, ACTIVE_LEVEL_MAX, ACTIVE_LEVEL_MIN};
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub(crate) enum SessionError {
    #[error("read session '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parse session json: {message}")]
    Parse { message: String },
    #[error("parse session json at {path}: {message}")]
    ParseAt { path: String, message: String },
    #[error("validation failed at {path}: expected {expected}, got {actual}")]
    Invalid {
        path: String,
        expected: String,
        actual: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum InteractionAction {
    Interact,
    Sit,
    Sleep,
    Walk,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct ScriptedInteraction {
    pub(crate) at_seconds: f64,
    pub(crate) action: InteractionAction,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct SessionFile {
    pub(crate) seed: Option<u64>,
    pub(crate) sim_seconds: Option<f64>,
    // Wins over `catalog_path` when both are set.
    pub(crate) clips: Option<BTreeMap<String, f32>>,
    pub(crate) catalog_path: Option<PathBuf>,
    pub(crate) playback: PlaybackConfig,
    pub(crate) interactions: Vec<ScriptedInteraction>,
}

#[derive(Debug, Clone)]
pub(crate) struct LoadedSession {
    pub(crate) path: PathBuf,
    pub(crate) file: SessionFile,
}

impl LoadedSession {
    pub(crate) fn resolved_catalog_path(&self) -> Option<PathBuf> {
        let catalog_path = self.file.catalog_path.as_ref()?;
        if catalog_path.is_absolute() {
            return Some(catalog_path.clone());
        }
        let base = self.path.parent().unwrap_or_else(|| Path::new("."));
        Some(base.join(catalog_path))
    }
}

pub(crate) fn load_session_file(path: &Path) -> Result<LoadedSession, SessionError> {
    let raw = fs::read_to_string(path).map_err(|source| SessionError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;
    let file = parse_session_json(&raw)?;
    validate_session(&file)?;
    Ok(LoadedSession {
        path: path.to_path_buf(),
        file,
    })
}

pub(crate) fn parse_session_json(raw: &str) -> Result<SessionFile, SessionError> {
    let mut deserializer = serde_json::Deserializer::from_str(raw);
    match serde_path_to_error::deserialize::<_, SessionFile>(&mut deserializer) {
        Ok(session) => Ok(session),
        Err(error) => {
            let path = error.path().to_string();
            let message = error.into_inner().to_string();
            if path.is_empty() || path == "." {
                Err(SessionError::Parse { message })
            } else {
                Err(SessionError::ParseAt { path, message })
            }
        }
    }
}

fn expected_actual(
    path: impl Into<String>,
    expected: impl Display,
    actual: impl Display,
) -> SessionError {
    SessionError::Invalid {
        path: path.into(),
        expected: expected.to_string(),
        actual: actual.to_string(),
    }
}

pub(crate) fn validate_session(session: &SessionFile) -> Result<(), SessionError> {
    if let Some(seconds) = session.sim_seconds {
        if !seconds.is_finite() || seconds <= 0.0 {
            return Err(expected_actual(
                "sim_seconds",
                "finite number > 0",
                seconds,
            ));
        }
    }

    let playback = &session.playback;
    if !(ACTIVE_LEVEL_MIN..=ACTIVE_LEVEL_MAX).contains(&playback.active_level) {
        return Err(expected_actual(
            "playback.active_level",
            format!("{ACTIVE_LEVEL_MIN}..={ACTIVE_LEVEL_MAX}"),
            playback.active_level,
        ));
    }
    if !playback.global_mix_seconds.is_finite() || playback.global_mix_seconds < 0.0 {
        return Err(expected_actual(
            "playback.global_mix_seconds",
            "finite number >= 0",
            playback.global_mix_seconds,
        ));
    }
    if playback.refill_batch == 0 {
        return Err(expected_actual("playback.refill_batch", "at least 1", 0));
    }
    if playback.refill_threshold >= playback.refill_batch {
        return Err(expected_actual(
            "playback.refill_threshold",
            format!("less than refill_batch ({})", playback.refill_batch),
            playback.refill_threshold,
        ));
    }

    if let Some(clips) = &session.clips {
        for (clip, duration) in clips {
            if !duration.is_finite() || *duration < 0.0 {
                return Err(expected_actual(
                    format!("clips.{clip}"),
                    "finite number >= 0",
                    duration,
                ));
            }
        }
    }

    for (index, interaction) in session.interactions.iter().enumerate() {
        if !interaction.at_seconds.is_finite() || interaction.at_seconds < 0.0 {
            return Err(expected_actual(
                format!("interactions[{index}].at_seconds"),
                "finite number >= 0",
                interaction.at_seconds,
            ));
        }
    }

    Ok(())
}
