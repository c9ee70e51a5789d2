mod loop_runner;
mod metrics;
mod scene;

pub use loop_runner::{
    run_headless, run_simulated_session, AppError, LoopConfig, SessionSummary, SimulatedSession,
};
pub use metrics::{LoopMetricsSnapshot, MetricsHandle};
pub use scene::{IdleScene, PassiveScene};
