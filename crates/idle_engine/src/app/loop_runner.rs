use std::thread;
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::{info, warn};

use crate::catalog::{CatalogError, RigLoad};
use crate::playback::{IdlePlayer, PlaybackConfig, PlaybackSink, PlaybackStats, SimulatedHost};
use crate::schedule::Scheduler;

use super::metrics::MetricsAccumulator;
use super::{IdleScene, MetricsHandle};

#[derive(Debug, Clone)]
pub struct LoopConfig {
    pub target_tps: u32,
    pub frame_dt: Duration,
    pub max_frame_delta: Duration,
    pub max_ticks_per_frame: u32,
    pub metrics_log_interval: Duration,
    pub sim_duration: Duration,
    pub realtime: bool,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            target_tps: 60,
            frame_dt: Duration::from_secs_f64(1.0 / 60.0),
            max_frame_delta: Duration::from_millis(250),
            max_ticks_per_frame: 5,
            metrics_log_interval: Duration::from_secs(10),
            sim_duration: Duration::from_secs(300),
            realtime: false,
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("failed to load rig: {0}")]
    RigLoad(#[from] CatalogError),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionSummary {
    pub sim_seconds: f64,
    pub frames: u64,
    pub ticks: u64,
    pub stats: PlaybackStats,
    pub turn_misses: u32,
    pub queue_len: usize,
}

#[derive(Debug)]
pub struct SimulatedSession {
    pub summary: SessionSummary,
    pub player: IdlePlayer,
    pub host: SimulatedHost,
}

pub fn run_simulated_session(
    config: &LoopConfig,
    rig: RigLoad,
    playback: PlaybackConfig,
    scheduler: Scheduler,
    scene: &mut dyn IdleScene,
    metrics_handle: &MetricsHandle,
) -> Result<SimulatedSession, AppError> {
    let rig = rig?;
    let active_level = playback.active_level;
    let mut player = IdlePlayer::new(playback, scheduler);
    player.apply_rig(&rig, active_level);
    let mut host = SimulatedHost::new(rig.catalog);

    let summary = run_headless(config, scene, &mut player, &mut host, metrics_handle);
    Ok(SimulatedSession {
        summary,
        player,
        host,
    })
}

pub fn run_headless(
    config: &LoopConfig,
    scene: &mut dyn IdleScene,
    player: &mut IdlePlayer,
    sink: &mut dyn PlaybackSink,
    metrics_handle: &MetricsHandle,
) -> SessionSummary {
    let target_tps = config.target_tps.max(1);
    let fixed_dt = Duration::from_secs_f64(1.0 / target_tps as f64);
    let fixed_dt_seconds = fixed_dt.as_secs_f32();
    let frame_dt = normalize_non_zero_duration(config.frame_dt, fixed_dt);
    let max_frame_delta =
        normalize_non_zero_duration(config.max_frame_delta, Duration::from_millis(250));
    let max_ticks_per_frame = config.max_ticks_per_frame.max(1);
    let metrics_log_interval =
        normalize_non_zero_duration(config.metrics_log_interval, Duration::from_secs(10));

    info!(
        target_tps,
        frame_dt_ms = frame_dt.as_secs_f64() * 1000.0,
        max_frame_delta_ms = max_frame_delta.as_millis() as u64,
        max_ticks_per_frame,
        metrics_log_interval_ms = metrics_log_interval.as_millis() as u64,
        sim_duration_s = config.sim_duration.as_secs_f64(),
        realtime = config.realtime,
        "loop_config"
    );

    player.start(sink);
    scene.load(player, sink);

    let mut accumulator = Duration::ZERO;
    let mut frame_clock = Duration::ZERO;
    let mut sim_time = Duration::ZERO;
    let mut frames = 0u64;
    let mut ticks = 0u64;
    let mut metrics_accumulator = MetricsAccumulator::new(metrics_log_interval);

    while frame_clock < config.sim_duration {
        let frame_started = Instant::now();
        frame_clock = frame_clock.saturating_add(frame_dt);
        frames = frames.saturating_add(1);

        let clamped_frame_dt = clamp_frame_delta(frame_dt, max_frame_delta);
        accumulator = accumulator.saturating_add(clamped_frame_dt);

        let step_plan = plan_sim_steps(accumulator, fixed_dt, max_ticks_per_frame);
        for _ in 0..step_plan.ticks_to_run {
            sim_time = sim_time.saturating_add(fixed_dt);
            scene.update(sim_time, player, sink);
            player.update(sink, fixed_dt_seconds);
            metrics_accumulator.record_tick();
            ticks = ticks.saturating_add(1);
        }
        accumulator = step_plan.remaining_accumulator;

        if step_plan.dropped_backlog > Duration::ZERO {
            warn!(
                dropped_backlog_ms = step_plan.dropped_backlog.as_millis() as u64,
                max_ticks_per_frame, "sim_clamp_triggered"
            );
        }

        if let Some(snapshot) =
            metrics_accumulator.maybe_snapshot(sim_time, player.stats(), player.queue_len())
        {
            metrics_handle.publish(snapshot);
            info!(
                sim_seconds = snapshot.sim_seconds,
                tps = snapshot.tps,
                clips_started = snapshot.clips_started,
                turns_consumed = snapshot.turns_consumed,
                refills = snapshot.refills,
                queue_len = snapshot.queue_len,
                state = ?player.state(),
                "loop_metrics"
            );
        }

        if config.realtime {
            let cap_sleep = compute_cap_sleep(frame_started.elapsed(), Some(frame_dt));
            if cap_sleep > Duration::ZERO {
                thread::sleep(cap_sleep);
            }
        }
    }

    scene.unload(player);
    let summary = SessionSummary {
        sim_seconds: sim_time.as_secs_f64(),
        frames,
        ticks,
        stats: player.stats(),
        turn_misses: player.turn_miss_count(),
        queue_len: player.queue_len(),
    };
    info!(
        sim_seconds = summary.sim_seconds,
        frames,
        ticks,
        clips_started = summary.stats.clips_started,
        turns_consumed = summary.stats.turns_consumed,
        refills = summary.stats.refills,
        temp_clips_started = summary.stats.temp_clips_started,
        default_fallbacks = summary.stats.default_fallbacks,
        "shutdown"
    );
    summary
}

#[derive(Debug, Clone, Copy)]
struct StepPlan {
    ticks_to_run: u32,
    remaining_accumulator: Duration,
    dropped_backlog: Duration,
}

fn plan_sim_steps(
    mut accumulator: Duration,
    fixed_dt: Duration,
    max_ticks_per_frame: u32,
) -> StepPlan {
    let mut ticks_to_run = 0u32;

    while accumulator >= fixed_dt && ticks_to_run < max_ticks_per_frame {
        accumulator = accumulator.saturating_sub(fixed_dt);
        ticks_to_run = ticks_to_run.saturating_add(1);
    }

    if accumulator >= fixed_dt {
        StepPlan {
            ticks_to_run,
            remaining_accumulator: Duration::ZERO,
            dropped_backlog: accumulator,
        }
    } else {
        StepPlan {
            ticks_to_run,
            remaining_accumulator: accumulator,
            dropped_backlog: Duration::ZERO,
        }
    }
}

fn clamp_frame_delta(frame_dt: Duration, max_frame_delta: Duration) -> Duration {
    frame_dt.min(max_frame_delta)
}

fn normalize_non_zero_duration(value: Duration, fallback: Duration) -> Duration {
    if value.is_zero() {
        fallback
    } else {
        value
    }
}

fn compute_cap_sleep(elapsed: Duration, target: Option<Duration>) -> Duration {
    match target {
        Some(frame_target) if elapsed < frame_target => frame_target - elapsed,
        _ => Duration::ZERO,
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::app::PassiveScene;
    use crate::catalog::{AnimationCatalog, RigData};
    use crate::playback::PlaybackState;
    use crate::schedule::ScheduleReport;

    fn default_rig() -> RigLoad {
        Ok(RigData {
            catalog: AnimationCatalog::new()
                .with_clip("Default", 0.0)
                .with_clip("Interact", 1.33333)
                .with_clip("Move", 1.0)
                .with_clip("Relax", 2.66667)
                .with_clip("Sit", 4.0)
                .with_clip("Special", 12.0),
        })
    }

    fn short_config(seconds: u64) -> LoopConfig {
        LoopConfig {
            sim_duration: Duration::from_secs(seconds),
            ..LoopConfig::default()
        }
    }

    struct SitAfter {
        at: Duration,
        fired: bool,
    }

    impl IdleScene for SitAfter {
        fn update(
            &mut self,
            sim_time: Duration,
            player: &mut IdlePlayer,
            sink: &mut dyn PlaybackSink,
        ) {
            if !self.fired && sim_time >= self.at {
                self.fired = true;
                player.play_temp(sink, "Sit", true, None);
            }
        }
    }

    #[test]
    fn clamp_frame_delta_caps_large_frame() {
        let max_frame_delta = Duration::from_millis(250);
        let raw_frame_dt = Duration::from_millis(600);

        assert_eq!(
            clamp_frame_delta(raw_frame_dt, max_frame_delta),
            max_frame_delta
        );
    }

    #[test]
    fn plan_sim_steps_runs_expected_ticks_without_drop() {
        let fixed_dt = Duration::from_millis(16);
        let result = plan_sim_steps(Duration::from_millis(48), fixed_dt, 5);

        assert_eq!(result.ticks_to_run, 3);
        assert_eq!(result.remaining_accumulator, Duration::ZERO);
        assert_eq!(result.dropped_backlog, Duration::ZERO);
    }

    #[test]
    fn plan_sim_steps_drops_backlog_when_tick_cap_hit() {
        let fixed_dt = Duration::from_millis(16);
        let result = plan_sim_steps(Duration::from_millis(120), fixed_dt, 3);

        assert_eq!(result.ticks_to_run, 3);
        assert_eq!(result.remaining_accumulator, Duration::ZERO);
        assert_eq!(result.dropped_backlog, Duration::from_millis(72));
    }

    #[test]
    fn cap_sleep_only_fills_remaining_frame_time() {
        let target = Some(Duration::from_millis(16));

        assert_eq!(
            compute_cap_sleep(Duration::from_millis(10), target),
            Duration::from_millis(6)
        );
        assert_eq!(
            compute_cap_sleep(Duration::from_millis(20), target),
            Duration::ZERO
        );
        assert_eq!(
            compute_cap_sleep(Duration::from_millis(1), None),
            Duration::ZERO
        );
    }

    #[test]
    fn zero_durations_fall_back_to_defaults() {
        assert_eq!(
            normalize_non_zero_duration(Duration::ZERO, Duration::from_secs(1)),
            Duration::from_secs(1)
        );
        assert_eq!(
            normalize_non_zero_duration(Duration::from_millis(5), Duration::from_secs(1)),
            Duration::from_millis(5)
        );
    }

    #[test]
    fn failed_rig_load_is_a_startup_error() {
        let failed: RigLoad = Err(CatalogError::MissingClip {
            path: PathBuf::from("rig.json"),
            clip: "Move",
        });

        let result = run_simulated_session(
            &short_config(1),
            failed,
            PlaybackConfig::default(),
            Scheduler::from_seed(1),
            &mut PassiveScene,
            &MetricsHandle::default(),
        );

        assert!(matches!(result, Err(AppError::RigLoad(_))));
    }

    #[test]
    fn headless_session_plays_the_schedule() {
        let metrics = MetricsHandle::default();
        let session = run_simulated_session(
            &short_config(120),
            default_rig(),
            PlaybackConfig::default(),
            Scheduler::from_seed(9),
            &mut PassiveScene,
            &metrics,
        )
        .expect("session");

        let summary = session.summary;
        assert!((7200..=7201).contains(&summary.ticks));
        assert_eq!(summary.ticks, summary.frames);
        assert!(summary.stats.clips_started > 20);
        assert_eq!(summary.stats.temp_clips_started, 1);
        assert_eq!(summary.stats.default_fallbacks, 0);
        assert_eq!(session.host.plays()[0].clip, "Interact");
        assert_eq!(session.player.state(), PlaybackState::PlayingQueueClip);
        assert!(session.player.queue_len() > 0);
        assert!(metrics.snapshot().sim_seconds >= 110.0);

        let report = ScheduleReport::from_items(session.host.history(), session.host.catalog());
        assert_eq!(report.turn_count() as u64, summary.stats.turns_consumed);
        assert_eq!(session.host.flip_count() as u64, summary.stats.turns_consumed);
    }

    #[test]
    fn tick_cap_drops_backlog_from_long_frames() {
        let config = LoopConfig {
            frame_dt: Duration::from_millis(200),
            sim_duration: Duration::from_secs(1),
            ..LoopConfig::default()
        };

        let session = run_simulated_session(
            &config,
            default_rig(),
            PlaybackConfig::default(),
            Scheduler::from_seed(3),
            &mut PassiveScene,
            &MetricsHandle::default(),
        )
        .expect("session");

        assert_eq!(session.summary.frames, 5);
        assert_eq!(session.summary.ticks, 25);
    }

    #[test]
    fn scene_interrupts_schedule_with_temp_loop() {
        let mut scene = SitAfter {
            at: Duration::from_secs(5),
            fired: false,
        };

        let session = run_simulated_session(
            &short_config(30),
            default_rig(),
            PlaybackConfig::default(),
            Scheduler::from_seed(5),
            &mut scene,
            &MetricsHandle::default(),
        )
        .expect("session");

        assert!(scene.fired);
        assert!(session.player.is_playing_temp());
        assert_eq!(session.player.state(), PlaybackState::PlayingTempLoop);
        let sit_plays = session
            .host
            .plays()
            .iter()
            .filter(|play| play.clip == "Sit")
            .count();
        // Started at 5s; 4s cycles relaunch until 30s.
        assert!(sit_plays >= 6);
        assert_eq!(session.host.current_clip(), Some("Sit"));
    }
}
