pub const ACTIVE_LEVEL_MIN: i32 = 0;
pub const ACTIVE_LEVEL_MAX: i32 = 6;
pub const DEFAULT_ACTIVE_LEVEL: i32 = 2;

// Special share of total play time, log-smoothed across levels.
const SPECIAL_RATIO_TABLE: [f32; 7] = [
    0.0,
    1.0 / 9.0,
    1.0 / 7.7,
    1.0 / 6.5,
    1.0 / 5.5,
    1.0 / 4.7,
    1.0 / 4.0,
];

// Relax:Move time ratio.
const RELAX_TO_MOVE_TABLE: [f32; 7] = [3.0, 2.0, 1.5, 1.0, 0.67, 0.5, 0.33];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActiveParams {
    pub special_ratio: f32,
    pub relax_to_move_ratio: f32,
}

pub fn clamp_active_level(level: i32) -> i32 {
    level.clamp(ACTIVE_LEVEL_MIN, ACTIVE_LEVEL_MAX)
}

pub fn active_params(level: i32) -> ActiveParams {
    let index = clamp_active_level(level) as usize;
    ActiveParams {
        special_ratio: SPECIAL_RATIO_TABLE[index],
        relax_to_move_ratio: RELAX_TO_MOVE_TABLE[index],
    }
}

// The three shares sum to 1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetShares {
    pub movement: f32,
    pub relax: f32,
    pub special: f32,
}

impl TargetShares {
    pub fn new(relax_to_move_ratio: f32, special_ratio: f32) -> Self {
        let movement = (1.0 - special_ratio) / (1.0 + relax_to_move_ratio);
        Self {
            movement,
            relax: relax_to_move_ratio * movement,
            special: special_ratio,
        }
    }
}

impl From<ActiveParams> for TargetShares {
    fn from(params: ActiveParams) -> Self {
        Self::new(params.relax_to_move_ratio, params.special_ratio)
    }
}
