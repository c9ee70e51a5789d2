use std::collections::BTreeMap;

use super::loader::CatalogError;

pub const MOVE_CLIP: &str = "Move";
pub const RELAX_CLIP: &str = "Relax";
pub const DEFAULT_SPECIAL_CLIP: &str = "Special";

/// Clip name to duration in seconds, as reported by the animation runtime.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnimationCatalog {
    durations: BTreeMap<String, f32>,
}

impl AnimationCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_clip(mut self, name: impl Into<String>, duration_seconds: f32) -> Self {
        self.insert(name, duration_seconds);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, duration_seconds: f32) {
        self.durations.insert(name.into(), duration_seconds);
    }

    pub fn duration(&self, name: &str) -> Option<f32> {
        self.durations.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.durations.contains_key(name)
    }

    pub fn has_required_clips(&self) -> bool {
        self.contains(MOVE_CLIP) && self.contains(RELAX_CLIP)
    }

    pub fn clip_names(&self) -> impl Iterator<Item = &str> {
        self.durations.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.durations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.durations.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, f32)> for AnimationCatalog {
    fn from_iter<T: IntoIterator<Item = (K, f32)>>(iter: T) -> Self {
        let mut catalog = Self::new();
        for (name, duration) in iter {
            catalog.insert(name, duration);
        }
        catalog
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RigData {
    pub catalog: AnimationCatalog,
}

pub type RigLoad = Result<RigData, CatalogError>;
