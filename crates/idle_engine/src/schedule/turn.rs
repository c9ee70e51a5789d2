use super::item::ScheduleItem;

pub const TURN_BASE_PROBABILITY: f32 = 0.02;
pub const TURN_PROBABILITY_STEP: f32 = 0.02;
pub const TURN_ESCALATION_AFTER_MISSES: u32 = 50;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TurnMissState {
    misses: u32,
}

impl TurnMissState {
    pub fn new(misses: u32) -> Self {
        Self { misses }
    }

    pub fn count(&self) -> u32 {
        self.misses
    }

    pub fn set(&mut self, misses: u32) {
        self.misses = misses;
    }

    pub fn from_prefix(prefix: &[ScheduleItem]) -> Self {
        let misses = prefix
            .iter()
            .rev()
            .take_while(|item| !item.is_turn())
            .count();
        Self::new(u32::try_from(misses).unwrap_or(u32::MAX))
    }
}

pub fn escalated_turn_probability(misses: u32) -> f32 {
    if misses <= TURN_ESCALATION_AFTER_MISSES {
        return TURN_BASE_PROBABILITY;
    }
    let over = (misses - TURN_ESCALATION_AFTER_MISSES) as f32;
    (TURN_BASE_PROBABILITY + over * TURN_PROBABILITY_STEP).min(1.0)
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct TurnOdds {
    misses: u32,
    probability: f32,
}

impl TurnOdds {
    pub(crate) fn resume(state: TurnMissState) -> Self {
        Self {
            misses: state.count(),
            probability: TURN_BASE_PROBABILITY,
        }
    }

    pub(crate) fn probability(&self) -> f32 {
        self.probability
    }

    pub(crate) fn record_turn(&mut self) {
        self.misses = 0;
        self.probability = TURN_BASE_PROBABILITY;
    }

    pub(crate) fn record_miss(&mut self) {
        self.misses = self.misses.saturating_add(1);
        if self.misses > TURN_ESCALATION_AFTER_MISSES {
            self.probability = escalated_turn_probability(self.misses);
        }
    }

    pub(crate) fn state(&self) -> TurnMissState {
        TurnMissState::new(self.misses)
    }
}
