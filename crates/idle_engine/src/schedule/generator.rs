use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::catalog::{AnimationCatalog, MOVE_CLIP, RELAX_CLIP};

use super::item::ScheduleItem;
use super::ratios::{ActiveParams, TargetShares};
use super::turn::{TurnMissState, TurnOdds};

const MOVE_CONTINUITY_BIAS: f32 = 0.67;
const NEGLIGIBLE_TOTAL_WEIGHT: f32 = 1e-3;

pub const WARM_UP_BATCH: usize = 128;
pub const WARM_UP_SKIP: usize = 33;
pub const WARM_UP_TAKE: usize = 64;

/// Lottery order. At equal cumulative weight Move wins over Relax, and Relax
/// over Special; convergence behavior depends on this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Category {
    Movement,
    Relax,
    Special,
}

#[derive(Debug, Clone, Copy, Default)]
struct CategoryValues {
    movement: f32,
    relax: f32,
    special: f32,
}

impl CategoryValues {
    fn total(&self) -> f32 {
        self.movement + self.relax + self.special
    }

    fn add(&mut self, category: Category, seconds: f32) {
        match category {
            Category::Movement => self.movement += seconds,
            Category::Relax => self.relax += seconds,
            Category::Special => self.special += seconds,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct ClipDurations<'a> {
    movement: f32,
    relax: f32,
    special: Option<(&'a str, f32)>,
}

impl<'a> ClipDurations<'a> {
    fn resolve(catalog: &AnimationCatalog, special_name: &'a str) -> Option<Self> {
        let movement = catalog.duration(MOVE_CLIP)?;
        let relax = catalog.duration(RELAX_CLIP)?;
        let special = if special_name.is_empty() {
            None
        } else {
            catalog
                .duration(special_name)
                .map(|seconds| (special_name, seconds))
        };
        Some(Self {
            movement,
            relax,
            special,
        })
    }

    fn seconds(&self, category: Category) -> f32 {
        match category {
            Category::Movement => self.movement,
            Category::Relax => self.relax,
            Category::Special => self.special.map_or(0.0, |(_, seconds)| seconds),
        }
    }

    fn clip_name(&self, category: Category) -> &'a str {
        match category {
            Category::Movement => MOVE_CLIP,
            Category::Relax => RELAX_CLIP,
            Category::Special => self.special.map_or(MOVE_CLIP, |(name, _)| name),
        }
    }
}

#[derive(Debug)]
pub struct Scheduler<R = StdRng> {
    rng: R,
    turn_misses: TurnMissState,
}

impl Scheduler<StdRng> {
    pub fn from_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    pub fn from_os_rng() -> Self {
        Self::with_rng(StdRng::from_os_rng())
    }
}

impl<R: Rng> Scheduler<R> {
    pub fn with_rng(rng: R) -> Self {
        Self {
            rng,
            turn_misses: TurnMissState::default(),
        }
    }

    pub fn turn_miss_count(&self) -> u32 {
        self.turn_misses.count()
    }

    pub fn set_turn_miss_count(&mut self, misses: u32) {
        self.turn_misses.set(misses);
    }

    pub fn turn_miss_state(&self) -> TurnMissState {
        self.turn_misses
    }

    // Empty when the catalog lacks Move or Relax.
    pub fn generate(
        &mut self,
        relax_to_move_ratio: f32,
        special_ratio: f32,
        total_count: usize,
        catalog: &AnimationCatalog,
        special_name: &str,
    ) -> Vec<ScheduleItem> {
        let Some(durations) = ClipDurations::resolve(catalog, special_name) else {
            debug!(
                clip_count = catalog.len(),
                "schedule_unavailable_missing_required_clips"
            );
            return Vec::new();
        };

        let targets = TargetShares::new(relax_to_move_ratio, special_ratio);
        let mut played = CategoryValues::default();
        let mut special_cooldown = 0.0f32;
        let mut odds = TurnOdds::resume(self.turn_misses);
        let mut items = Vec::with_capacity(total_count + total_count / 16 + 1);

        for _ in 0..total_count {
            let elapsed = played.total();
            let gaps = CategoryValues {
                movement: targets.movement * elapsed - played.movement,
                relax: targets.relax * elapsed - played.relax,
                special: if durations.special.is_some() {
                    targets.special * elapsed - played.special
                } else {
                    0.0
                },
            };
            let special_ready = durations.special.is_some() && special_cooldown <= 0.0;

            let mut weights = CategoryValues {
                movement: gaps.movement.max(0.0),
                relax: gaps.relax.max(0.0),
                special: if special_ready {
                    gaps.special.max(0.0)
                } else {
                    0.0
                },
            };
            // A Turn between two Moves breaks the run.
            let follows_move = matches!(
                items.last(),
                Some(ScheduleItem::Clip(name)) if name == MOVE_CLIP
            );
            if follows_move {
                weights.movement += MOVE_CONTINUITY_BIAS * weights.total();
            }

            let category = self
                .draw_by_weight(weights)
                .unwrap_or_else(|| largest_gap(gaps, durations.special.is_some()));
            let seconds = durations.seconds(category);

            items.push(ScheduleItem::Clip(durations.clip_name(category).to_string()));
            played.add(category, seconds);
            if category == Category::Special {
                special_cooldown = seconds / 2.0;
            }

            if self.rng.random::<f32>() < odds.probability() {
                items.push(ScheduleItem::Turn);
                odds.record_turn();
            } else {
                odds.record_miss();
            }

            if special_cooldown > 0.0 {
                special_cooldown -= seconds;
            }
        }

        self.turn_misses = odds.state();
        debug!(
            requested = total_count,
            emitted = items.len(),
            turn_misses = self.turn_misses.count(),
            "schedule_generated"
        );
        items
    }

    pub fn generate_for(
        &mut self,
        params: ActiveParams,
        total_count: usize,
        catalog: &AnimationCatalog,
        special_name: &str,
    ) -> Vec<ScheduleItem> {
        self.generate(
            params.relax_to_move_ratio,
            params.special_ratio,
            total_count,
            catalog,
            special_name,
        )
    }

    pub fn generate_with_prefix(
        &mut self,
        prefix: &[ScheduleItem],
        relax_to_move_ratio: f32,
        special_ratio: f32,
        count: usize,
        catalog: &AnimationCatalog,
        special_name: &str,
    ) -> Vec<ScheduleItem> {
        self.turn_misses = TurnMissState::from_prefix(prefix);
        self.generate(
            relax_to_move_ratio,
            special_ratio,
            count,
            catalog,
            special_name,
        )
    }

    // The head of a cold schedule is skipped: every gap starts at zero there.
    pub fn warm_up_batch(
        &mut self,
        params: ActiveParams,
        catalog: &AnimationCatalog,
        special_name: &str,
    ) -> Vec<ScheduleItem> {
        let schedule = self.generate_for(params, WARM_UP_BATCH, catalog, special_name);
        let end = schedule.len().min(WARM_UP_SKIP + WARM_UP_TAKE);
        let batch = schedule
            .get(WARM_UP_SKIP..end)
            .map(<[ScheduleItem]>::to_vec)
            .unwrap_or_default();
        self.turn_misses = TurnMissState::from_prefix(&batch);
        batch
    }

    fn draw_by_weight(&mut self, weights: CategoryValues) -> Option<Category> {
        let total = weights.total();
        let range = if total.is_finite() && total >= NEGLIGIBLE_TOTAL_WEIGHT {
            total
        } else {
            1.0
        };
        let r = self.rng.random_range(0.0..range);

        if weights.movement > 0.0 && weights.movement >= r {
            Some(Category::Movement)
        } else if weights.relax > 0.0 && weights.movement + weights.relax >= r {
            Some(Category::Relax)
        } else if weights.special > 0.0 {
            Some(Category::Special)
        } else {
            None
        }
    }
}

fn largest_gap(gaps: CategoryValues, special_available: bool) -> Category {
    let special_gap = if special_available {
        gaps.special
    } else {
        f32::NEG_INFINITY
    };
    if gaps.movement >= gaps.relax && gaps.movement >= special_gap {
        Category::Movement
    } else if gaps.relax >= special_gap {
        Category::Relax
    } else {
        Category::Special
    }
}
