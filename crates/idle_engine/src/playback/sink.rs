#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkEvent {
    Started { clip: String },
    Completed { clip: String },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Facing {
    Left,
    #[default]
    Right,
}

impl Facing {
    pub fn flipped(self) -> Self {
        match self {
            Facing::Left => Facing::Right,
            Facing::Right => Facing::Left,
        }
    }
}

pub trait PlaybackSink {
    // `false` means the clip is unknown and the track was left untouched.
    fn play_clip(&mut self, clip: &str, looping: bool, mix_seconds: Option<f32>) -> bool;

    fn current_clip(&self) -> Option<&str>;

    fn advance(&mut self, dt_seconds: f32) -> Vec<SinkEvent>;

    fn track_finished(&self) -> bool;

    fn flip_facing(&mut self, facing: Facing);

    fn set_default_mix(&mut self, _mix_seconds: f32) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn facing_flip_alternates() {
        assert_eq!(Facing::default(), Facing::Right);
        assert_eq!(Facing::Right.flipped(), Facing::Left);
        assert_eq!(Facing::Right.flipped().flipped(), Facing::Right);
    }
}
