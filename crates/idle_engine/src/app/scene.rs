use std::time::Duration;

use crate::playback::{IdlePlayer, PlaybackSink};

pub trait IdleScene {
    fn load(&mut self, _player: &mut IdlePlayer, _sink: &mut dyn PlaybackSink) {}
    /// Runs once per fixed tick, before the player advances the track.
    fn update(&mut self, sim_time: Duration, player: &mut IdlePlayer, sink: &mut dyn PlaybackSink);
    fn unload(&mut self, _player: &IdlePlayer) {}
}

#[derive(Debug, Default, Clone, Copy)]
pub struct PassiveScene;

impl IdleScene for PassiveScene {
    fn update(
        &mut self,
        _sim_time: Duration,
        _player: &mut IdlePlayer,
        _sink: &mut dyn PlaybackSink,
    ) {
    }
}
