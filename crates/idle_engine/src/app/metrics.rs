use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use tracing::warn;

use crate::playback::PlaybackStats;

static METRICS_LOCK_POISON_WARNED: AtomicBool = AtomicBool::new(false);

fn warn_metrics_lock_poison_once(operation: &'static str) {
    if METRICS_LOCK_POISON_WARNED
        .compare_exchange(false, true, Ordering::Relaxed, Ordering::Relaxed)
        .is_ok()
    {
        warn!(operation, "metrics lock poisoned; recovered inner value");
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LoopMetricsSnapshot {
    pub sim_seconds: f32,
    pub tps: f32,
    pub clips_started: u64,
    pub turns_consumed: u64,
    pub refills: u64,
    pub queue_len: usize,
}

#[derive(Clone, Debug)]
pub struct MetricsHandle {
    snapshot: Arc<RwLock<LoopMetricsSnapshot>>,
}

impl Default for MetricsHandle {
    fn default() -> Self {
        Self {
            snapshot: Arc::new(RwLock::new(LoopMetricsSnapshot::default())),
        }
    }
}

impl MetricsHandle {
    pub fn snapshot(&self) -> LoopMetricsSnapshot {
        match self.snapshot.read() {
            Ok(guard) => *guard,
            Err(poisoned) => {
                warn_metrics_lock_poison_once("read");
                *poisoned.into_inner()
            }
        }
    }

    pub(crate) fn publish(&self, snapshot: LoopMetricsSnapshot) {
        match self.snapshot.write() {
            Ok(mut guard) => *guard = snapshot,
            Err(poisoned) => {
                warn_metrics_lock_poison_once("write");
                let mut guard = poisoned.into_inner();
                *guard = snapshot;
            }
        }
    }
}

#[derive(Debug)]
pub(crate) struct MetricsAccumulator {
    interval_start: Duration,
    interval: Duration,
    ticks: u32,
    stats_at_start: PlaybackStats,
}

impl MetricsAccumulator {
    pub(crate) fn new(interval: Duration) -> Self {
        Self {
            interval_start: Duration::ZERO,
            interval,
            ticks: 0,
            stats_at_start: PlaybackStats::default(),
        }
    }

    pub(crate) fn record_tick(&mut self) {
        self.ticks = self.ticks.saturating_add(1);
    }

    pub(crate) fn maybe_snapshot(
        &mut self,
        sim_time: Duration,
        stats: PlaybackStats,
        queue_len: usize,
    ) -> Option<LoopMetricsSnapshot> {
        let elapsed = sim_time.saturating_sub(self.interval_start);
        if elapsed < self.interval {
            return None;
        }

        let elapsed_seconds = elapsed.as_secs_f32().max(f32::EPSILON);
        let snapshot = LoopMetricsSnapshot {
            sim_seconds: sim_time.as_secs_f32(),
            tps: self.ticks as f32 / elapsed_seconds,
            clips_started: stats
                .clips_started
                .saturating_sub(self.stats_at_start.clips_started),
            turns_consumed: stats
                .turns_consumed
                .saturating_sub(self.stats_at_start.turns_consumed),
            refills: stats.refills.saturating_sub(self.stats_at_start.refills),
            queue_len,
        };

        self.interval_start = sim_time;
        self.ticks = 0;
        self.stats_at_start = stats;

        Some(snapshot)
    }
}
