pub mod app;
pub mod catalog;
pub mod playback;
pub mod schedule;

pub use app::{
    run_headless, run_simulated_session, AppError, IdleScene, LoopConfig, LoopMetricsSnapshot,
    MetricsHandle, PassiveScene, SessionSummary, SimulatedSession,
};
pub use catalog::{
    load_catalog_file, load_rig, parse_catalog_json, rig_from_catalog, AnimationCatalog,
    CatalogError, RigData, RigLoad, DEFAULT_SPECIAL_CLIP, MOVE_CLIP, RELAX_CLIP,
};
pub use playback::{
    Facing, IdlePlayer, PlayRecord, PlaybackConfig, PlaybackSink, PlaybackState, PlaybackStats,
    QueuedClip, SimulatedHost, SinkEvent,
};
pub use schedule::{
    active_params, clamp_active_level, items_from_names, ActiveParams, ScheduleItem,
    ScheduleReport, Scheduler, TargetShares, TurnMissState, ACTIVE_LEVEL_MAX, ACTIVE_LEVEL_MIN,
    DEFAULT_ACTIVE_LEVEL,
};
