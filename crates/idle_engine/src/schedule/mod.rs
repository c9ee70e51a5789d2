mod generator;
mod item;
mod ratios;
mod report;
mod turn;

pub use generator::{Scheduler, WARM_UP_BATCH, WARM_UP_SKIP, WARM_UP_TAKE};
pub use item::{items_from_names, ScheduleItem, TURN_TOKEN};
pub use ratios::{
    active_params, clamp_active_level, ActiveParams, TargetShares, ACTIVE_LEVEL_MAX,
    ACTIVE_LEVEL_MIN, DEFAULT_ACTIVE_LEVEL,
};
pub use report::ScheduleReport;
pub use turn::{
    escalated_turn_probability, TurnMissState, TURN_BASE_PROBABILITY,
    TURN_ESCALATION_AFTER_MISSES, TURN_PROBABILITY_STEP,
};
