use tracing::debug;

use crate::catalog::AnimationCatalog;
use crate::schedule::ScheduleItem;

use super::sink::{Facing, PlaybackSink, SinkEvent};

#[derive(Debug, Clone, PartialEq)]
pub struct PlayRecord {
    pub clip: String,
    pub looping: bool,
    pub mix_seconds: Option<f32>,
}

#[derive(Debug, Clone)]
struct Track {
    clip: String,
    looping: bool,
    duration: f32,
    time: f32,
    completion_reported: bool,
}

impl Track {
    fn finished(&self) -> bool {
        !self.looping && self.time >= self.duration
    }
}

#[derive(Debug)]
pub struct SimulatedHost {
    catalog: AnimationCatalog,
    track: Option<Track>,
    pending: Vec<SinkEvent>,
    facing: Facing,
    default_mix: f32,
    elapsed_seconds: f64,
    plays: Vec<PlayRecord>,
    flips: usize,
    history: Vec<ScheduleItem>,
}

impl SimulatedHost {
    pub fn new(catalog: AnimationCatalog) -> Self {
        Self {
            catalog,
            track: None,
            pending: Vec::new(),
            facing: Facing::default(),
            default_mix: 0.0,
            elapsed_seconds: 0.0,
            plays: Vec::new(),
            flips: 0,
            history: Vec::new(),
        }
    }

    pub fn catalog(&self) -> &AnimationCatalog {
        &self.catalog
    }

    pub fn facing(&self) -> Facing {
        self.facing
    }

    pub fn default_mix(&self) -> f32 {
        self.default_mix
    }

    pub fn elapsed_seconds(&self) -> f64 {
        self.elapsed_seconds
    }

    pub fn plays(&self) -> &[PlayRecord] {
        &self.plays
    }

    pub fn flip_count(&self) -> usize {
        self.flips
    }

    pub fn history(&self) -> &[ScheduleItem] {
        &self.history
    }

    pub fn is_looping(&self) -> bool {
        self.track.as_ref().is_some_and(|track| track.looping)
    }
}

impl PlaybackSink for SimulatedHost {
    fn play_clip(&mut self, clip: &str, looping: bool, mix_seconds: Option<f32>) -> bool {
        let Some(duration) = self.catalog.duration(clip) else {
            debug!(clip, "sim_host_unknown_clip");
            return false;
        };

        self.plays.push(PlayRecord {
            clip: clip.to_string(),
            looping,
            mix_seconds,
        });
        self.history.push(ScheduleItem::clip(clip));
        self.track = Some(Track {
            clip: clip.to_string(),
            looping,
            duration,
            time: 0.0,
            completion_reported: false,
        });
        self.pending.push(SinkEvent::Started {
            clip: clip.to_string(),
        });
        true
    }

    fn current_clip(&self) -> Option<&str> {
        self.track.as_ref().map(|track| track.clip.as_str())
    }

    fn advance(&mut self, dt_seconds: f32) -> Vec<SinkEvent> {
        let dt_seconds = dt_seconds.max(0.0);
        self.elapsed_seconds += f64::from(dt_seconds);
        let mut events = std::mem::take(&mut self.pending);

        let Some(track) = self.track.as_mut() else {
            return events;
        };
        track.time += dt_seconds;

        if track.looping {
            if track.duration <= 0.0 {
                events.push(SinkEvent::Completed {
                    clip: track.clip.clone(),
                });
                track.time = 0.0;
            } else {
                while track.time >= track.duration {
                    track.time -= track.duration;
                    events.push(SinkEvent::Completed {
                        clip: track.clip.clone(),
                    });
                }
            }
        } else if track.finished() && !track.completion_reported {
            track.completion_reported = true;
            events.push(SinkEvent::Completed {
                clip: track.clip.clone(),
            });
        }

        events
    }

    fn track_finished(&self) -> bool {
        self.track.as_ref().is_some_and(Track::finished)
    }

    fn flip_facing(&mut self, facing: Facing) {
        self.facing = facing;
        self.flips += 1;
        self.history.push(ScheduleItem::Turn);
    }

    fn set_default_mix(&mut self, mix_seconds: f32) {
        self.default_mix = mix_seconds;
    }
}
