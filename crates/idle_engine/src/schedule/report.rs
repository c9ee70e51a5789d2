use std::collections::BTreeMap;

use crate::catalog::AnimationCatalog;

use super::item::ScheduleItem;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScheduleReport {
    seconds_by_clip: BTreeMap<String, f64>,
    draws_by_clip: BTreeMap<String, usize>,
    turn_count: usize,
    clip_count: usize,
}

impl ScheduleReport {
    pub fn from_items(items: &[ScheduleItem], catalog: &AnimationCatalog) -> Self {
        let mut report = Self::default();
        for item in items {
            report.record(item, catalog);
        }
        report
    }

    pub fn record(&mut self, item: &ScheduleItem, catalog: &AnimationCatalog) {
        match item {
            ScheduleItem::Turn => self.turn_count += 1,
            ScheduleItem::Clip(name) => {
                self.clip_count += 1;
                *self.draws_by_clip.entry(name.clone()).or_default() += 1;
                let seconds = catalog.duration(name).unwrap_or(0.0) as f64;
                *self.seconds_by_clip.entry(name.clone()).or_default() += seconds;
            }
        }
    }

    pub fn seconds_for(&self, clip: &str) -> f64 {
        self.seconds_by_clip.get(clip).copied().unwrap_or(0.0)
    }

    pub fn draws_for(&self, clip: &str) -> usize {
        self.draws_by_clip.get(clip).copied().unwrap_or(0)
    }

    pub fn total_seconds(&self) -> f64 {
        self.seconds_by_clip
            .values()
            .fold(0.0, |total, seconds| total + seconds)
    }

    pub fn time_share(&self, clip: &str) -> f64 {
        let total = self.total_seconds();
        if total <= 0.0 {
            return 0.0;
        }
        self.seconds_for(clip) / total
    }

    pub fn turn_count(&self) -> usize {
        self.turn_count
    }

    pub fn clip_count(&self) -> usize {
        self.clip_count
    }

    pub fn render_human_readable(&self) -> String {
        let mut output = format!(
            "clips={} turns={} total_seconds={:.2}",
            self.clip_count,
            self.turn_count,
            self.total_seconds()
        );
        for (clip, seconds) in &self.seconds_by_clip {
            output.push('\n');
            output.push_str(&format!(
                "clip={} draws={} seconds={:.2} share={:.3}",
                clip,
                self.draws_for(clip),
                seconds,
                self.time_share(clip)
            ));
        }
        output
    }
}
