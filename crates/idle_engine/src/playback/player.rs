use std::collections::VecDeque;

use tracing::{debug, info, warn};

use crate::catalog::{AnimationCatalog, RigData, RigLoad};
use crate::schedule::{active_params, clamp_active_level, ScheduleItem, Scheduler};

use super::config::PlaybackConfig;
use super::sink::{Facing, PlaybackSink, SinkEvent};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PlaybackState {
    #[default]
    Idle,
    PlayingQueueClip,
    PlayingTempOnce,
    PlayingTempLoop,
    PlayingDefaultLoop,
}

#[derive(Debug, Clone, PartialEq)]
pub struct QueuedClip {
    pub item: ScheduleItem,
    pub mix_override: Option<f32>,
}

impl QueuedClip {
    pub fn new(item: ScheduleItem) -> Self {
        Self {
            item,
            mix_override: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct TempClip {
    name: String,
    looping: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlaybackStats {
    pub clips_started: u64,
    pub turns_consumed: u64,
    pub refills: u64,
    pub temp_clips_started: u64,
    pub default_fallbacks: u64,
}

#[derive(Debug)]
pub struct IdlePlayer {
    config: PlaybackConfig,
    scheduler: Scheduler,
    catalog: AnimationCatalog,
    queue: VecDeque<QueuedClip>,
    state: PlaybackState,
    temp: Option<TempClip>,
    facing: Facing,
    stats: PlaybackStats,
}

impl IdlePlayer {
    pub fn new(mut config: PlaybackConfig, scheduler: Scheduler) -> Self {
        config.active_level = clamp_active_level(config.active_level);
        config.refill_batch = config.refill_batch.max(1);
        // A threshold at or past the batch size appends more than a completion pops.
        if config.refill_threshold >= config.refill_batch {
            warn!(
                refill_threshold = config.refill_threshold,
                refill_batch = config.refill_batch,
                "refill_threshold_clamped"
            );
            config.refill_threshold = config.refill_batch - 1;
        }
        Self {
            config,
            scheduler,
            catalog: AnimationCatalog::default(),
            queue: VecDeque::new(),
            state: PlaybackState::Idle,
            temp: None,
            facing: Facing::default(),
            stats: PlaybackStats::default(),
        }
    }

    pub fn config(&self) -> &PlaybackConfig {
        &self.config
    }

    pub fn catalog(&self) -> &AnimationCatalog {
        &self.catalog
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn is_playing_temp(&self) -> bool {
        self.temp.is_some()
    }

    pub fn facing(&self) -> Facing {
        self.facing
    }

    pub fn stats(&self) -> PlaybackStats {
        self.stats
    }

    pub fn turn_miss_count(&self) -> u32 {
        self.scheduler.turn_miss_count()
    }

    pub fn active_level(&self) -> i32 {
        self.config.active_level
    }

    pub fn set_active_level(&mut self, level: i32) {
        let clamped = clamp_active_level(level);
        if clamped != self.config.active_level {
            info!(
                requested = level,
                active_level = clamped,
                "active_level_changed"
            );
        }
        self.config.active_level = clamped;
    }

    pub fn set_default_clip(&mut self, clip: impl Into<String>) {
        self.config.default_clip = clip.into();
    }

    pub fn set_global_mix(&mut self, sink: &mut dyn PlaybackSink, mix_seconds: f32) {
        self.config.global_mix_seconds = mix_seconds;
        sink.set_default_mix(mix_seconds);
    }

    pub fn apply(&mut self, load: &RigLoad, active_level: i32) -> bool {
        match load {
            Ok(rig) => {
                self.apply_rig(rig, active_level);
                true
            }
            Err(error) => {
                warn!(error = %error, "rig_apply_skipped_invalid_load");
                false
            }
        }
    }

    pub fn apply_rig(&mut self, rig: &RigData, active_level: i32) {
        self.catalog = rig.catalog.clone();
        self.queue.clear();
        self.temp = None;
        self.state = PlaybackState::Idle;
        self.config.active_level = clamp_active_level(active_level);
        info!(
            clip_count = self.catalog.len(),
            schedulable = self.catalog.has_required_clips(),
            active_level = self.config.active_level,
            "rig_applied"
        );
    }

    pub fn start(&mut self, sink: &mut dyn PlaybackSink) {
        sink.set_default_mix(self.config.global_mix_seconds);

        let params = active_params(self.config.active_level);
        let batch = self
            .scheduler
            .warm_up_batch(params, &self.catalog, &self.config.special_clip);
        if batch.is_empty() {
            warn!(
                default_clip = %self.config.default_clip,
                "schedule_unavailable_using_default_clip"
            );
        }
        self.queue.extend(batch.into_iter().map(QueuedClip::new));

        let startup = self
            .config
            .startup_clip
            .clone()
            .filter(|clip| self.catalog.contains(clip));
        let opened_with_temp = match startup {
            Some(clip) => self.play_temp(sink, &clip, false, None),
            None => false,
        };
        if !opened_with_temp {
            self.advance_queue(sink);
        }

        info!(
            queue_len = self.queue.len(),
            turn_misses = self.scheduler.turn_miss_count(),
            active_level = self.config.active_level,
            "session_started"
        );
    }

    pub fn play_temp(
        &mut self,
        sink: &mut dyn PlaybackSink,
        clip: &str,
        looping: bool,
        mix_seconds: Option<f32>,
    ) -> bool {
        if !sink.play_clip(clip, looping, mix_seconds) {
            warn!(clip, "temp_clip_rejected");
            return false;
        }
        self.temp = Some(TempClip {
            name: clip.to_string(),
            looping,
        });
        self.state = if looping {
            PlaybackState::PlayingTempLoop
        } else {
            PlaybackState::PlayingTempOnce
        };
        self.stats.temp_clips_started = self.stats.temp_clips_started.saturating_add(1);
        debug!(clip, looping, "temp_clip_started");
        true
    }

    pub fn enqueue(&mut self, clip: impl Into<String>, mix_override: Option<f32>) {
        self.queue.push_back(QueuedClip {
            item: ScheduleItem::from_name(clip),
            mix_override,
        });
    }

    pub fn remove_clip(&mut self, clip: &str) {
        self.queue.retain(|entry| entry.item.as_str() != clip);
    }

    pub fn clear_queue(&mut self) {
        self.queue.clear();
    }

    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    pub fn queue_snapshot(&self) -> Vec<ScheduleItem> {
        self.queue.iter().map(|entry| entry.item.clone()).collect()
    }

    pub fn current_clip<'a>(&self, sink: &'a dyn PlaybackSink) -> Option<&'a str> {
        sink.current_clip()
    }

    pub fn update(&mut self, sink: &mut dyn PlaybackSink, dt_seconds: f32) {
        for event in sink.advance(dt_seconds) {
            self.handle_event(sink, event);
        }

        // Some runtimes report completion a frame late; catch one-shot temp
        // clips that already ran out.
        let temp_once = self.temp.as_ref().is_some_and(|temp| !temp.looping);
        if temp_once && sink.track_finished() {
            self.temp = None;
            self.state = PlaybackState::Idle;
            debug!("temp_clip_finished");
        }
    }

    pub fn handle_event(&mut self, sink: &mut dyn PlaybackSink, event: SinkEvent) {
        match event {
            SinkEvent::Started { clip } => debug!(clip = %clip, "clip_started"),
            SinkEvent::Completed { clip } => {
                debug!(clip = %clip, "clip_completed");
                self.on_clip_complete(sink);
            }
        }
    }

    pub fn on_clip_complete(&mut self, sink: &mut dyn PlaybackSink) {
        if let Some(temp) = &self.temp {
            if temp.looping {
                // Relaunched one-shot each cycle so the blend applies again.
                let clip = temp.name.clone();
                sink.play_clip(&clip, false, Some(self.config.global_mix_seconds));
                return;
            }
            self.temp = None;
        }

        self.refill_if_low();
        self.advance_queue(sink);
    }

    fn refill_if_low(&mut self) {
        if self.queue.len() > self.config.refill_threshold {
            return;
        }

        let prefix = self
            .queue
            .iter()
            .take(self.config.prefix_window)
            .map(|entry| entry.item.clone())
            .collect::<Vec<_>>();
        let params = active_params(self.config.active_level);
        let batch = self.scheduler.generate_with_prefix(
            &prefix,
            params.relax_to_move_ratio,
            params.special_ratio,
            self.config.refill_batch,
            &self.catalog,
            &self.config.special_clip,
        );
        if batch.is_empty() {
            return;
        }

        let added = batch.len();
        self.queue.extend(batch.into_iter().map(QueuedClip::new));
        self.stats.refills = self.stats.refills.saturating_add(1);
        info!(
            added,
            queue_len = self.queue.len(),
            turn_misses = self.scheduler.turn_miss_count(),
            "queue_refilled"
        );
    }

    fn advance_queue(&mut self, sink: &mut dyn PlaybackSink) {
        while let Some(entry) = self.queue.pop_front() {
            match entry.item {
                ScheduleItem::Turn => {
                    self.facing = self.facing.flipped();
                    sink.flip_facing(self.facing);
                    self.stats.turns_consumed = self.stats.turns_consumed.saturating_add(1);
                    debug!(facing = ?self.facing, "turn_consumed");
                }
                ScheduleItem::Clip(clip) => {
                    if sink.play_clip(&clip, false, entry.mix_override) {
                        self.state = PlaybackState::PlayingQueueClip;
                        self.stats.clips_started = self.stats.clips_started.saturating_add(1);
                        return;
                    }
                    warn!(clip = %clip, "queued_clip_rejected");
                }
            }
        }

        self.fall_back_to_default(sink);
    }

    fn fall_back_to_default(&mut self, sink: &mut dyn PlaybackSink) {
        let default_clip = self.config.default_clip.as_str();
        if default_clip.is_empty() {
            return;
        }
        let already_looping = self.state == PlaybackState::PlayingDefaultLoop
            && sink.current_clip() == Some(default_clip);
        if already_looping {
            return;
        }
        if sink.play_clip(default_clip, true, None) {
            self.state = PlaybackState::PlayingDefaultLoop;
            self.stats.default_fallbacks = self.stats.default_fallbacks.saturating_add(1);
            debug!(clip = default_clip, "default_clip_looping");
        } else {
            warn!(clip = default_clip, "default_clip_rejected");
        }
    }
}
