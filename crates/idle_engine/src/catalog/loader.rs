use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use super::types::{AnimationCatalog, RigData, MOVE_CLIP, RELAX_CLIP};

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog file {path}: {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("catalog at {path} is not valid json: {message}")]
    InvalidJson { path: PathBuf, message: String },
    #[error("clip '{clip}' in {path} has invalid duration {duration}; expected a finite value >= 0")]
    InvalidDuration {
        path: PathBuf,
        clip: String,
        duration: f32,
    },
    #[error("catalog at {path} is missing required clip '{clip}'")]
    MissingClip { path: PathBuf, clip: &'static str },
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    clips: BTreeMap<String, f32>,
}

pub fn load_catalog_file(path: &Path) -> Result<AnimationCatalog, CatalogError> {
    let raw = fs::read_to_string(path).map_err(|source| CatalogError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;
    parse_catalog_json(&raw, path)
}

pub fn parse_catalog_json(raw: &str, path: &Path) -> Result<AnimationCatalog, CatalogError> {
    let parsed =
        serde_json::from_str::<CatalogFile>(raw).map_err(|error| CatalogError::InvalidJson {
            path: path.to_path_buf(),
            message: error.to_string(),
        })?;

    for (clip, duration) in &parsed.clips {
        if !duration.is_finite() || *duration < 0.0 {
            return Err(CatalogError::InvalidDuration {
                path: path.to_path_buf(),
                clip: clip.clone(),
                duration: *duration,
            });
        }
    }

    Ok(parsed.clips.into_iter().collect())
}

pub fn load_rig(path: &Path) -> Result<RigData, CatalogError> {
    let catalog = load_catalog_file(path)?;
    rig_from_catalog(catalog, path)
}

pub fn rig_from_catalog(
    catalog: AnimationCatalog,
    source: &Path,
) -> Result<RigData, CatalogError> {
    for clip in [MOVE_CLIP, RELAX_CLIP] {
        if !catalog.contains(clip) {
            return Err(CatalogError::MissingClip {
                path: source.to_path_buf(),
                clip,
            });
        }
    }
    Ok(RigData { catalog })
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn parses_clip_durations() {
        let raw = r#"{"clips": {"Move": 1.0, "Relax": 2.66667, "Special": 12.0}}"#;
        let catalog = parse_catalog_json(raw, Path::new("inline.json")).expect("catalog");

        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog.duration("Special"), Some(12.0));
        assert!(catalog.has_required_clips());
    }

    #[test]
    fn rejects_negative_duration() {
        let raw = r#"{"clips": {"Move": -1.0}}"#;
        let error = parse_catalog_json(raw, Path::new("inline.json")).expect_err("must fail");

        assert!(matches!(
            error,
            CatalogError::InvalidDuration { ref clip, .. } if clip == "Move"
        ));
    }

    #[test]
    fn rejects_malformed_json() {
        let error = parse_catalog_json("{\"clips\": [", Path::new("inline.json"))
            .expect_err("must fail");
        assert!(matches!(error, CatalogError::InvalidJson { .. }));
    }

    #[test]
    fn load_rig_requires_relax() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("rig.json");
        fs::write(&path, r#"{"clips": {"Move": 1.0}}"#).expect("write");

        let error = load_rig(&path).expect_err("must fail");
        assert!(matches!(
            error,
            CatalogError::MissingClip { clip: "Relax", .. }
        ));
    }

    #[test]
    fn load_rig_reads_file_from_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("rig.json");
        fs::write(&path, r#"{"clips": {"Move": 1.0, "Relax": 2.0}}"#).expect("write");

        let rig = load_rig(&path).expect("rig");
        assert_eq!(rig.catalog.duration("Relax"), Some(2.0));
    }

    #[test]
    fn missing_file_reports_read_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let error = load_catalog_file(&dir.path().join("absent.json")).expect_err("must fail");
        assert!(matches!(error, CatalogError::ReadFile { .. }));
    }
}
