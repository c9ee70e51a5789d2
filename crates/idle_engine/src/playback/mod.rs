mod config;
mod player;
mod sim_host;
mod sink;

pub use config::{
    PlaybackConfig, DEFAULT_GLOBAL_MIX_SECONDS, DEFAULT_REFILL_BATCH, DEFAULT_REFILL_THRESHOLD,
    DEFAULT_STARTUP_CLIP,
};
pub use player::{IdlePlayer, PlaybackState, PlaybackStats, QueuedClip};
pub use sim_host::{PlayRecord, SimulatedHost};
pub use sink::{Facing, PlaybackSink, SinkEvent};
