use std::process::ExitCode;

use idle_engine::{
    active_params, run_simulated_session, AppError, CatalogError, LoopMetricsSnapshot,
    MetricsHandle, PlaybackConfig, RigLoad, ScheduleReport, Scheduler, SessionSummary,
};
use tracing::{error, info};

use super::bootstrap::{AppWiring, RunMode};

const REPORT_ITEM_COUNT: usize = 128;

pub(crate) fn run(app: AppWiring) -> ExitCode {
    match app.mode {
        RunMode::Simulate => run_simulation(app),
        RunMode::Report => run_report(app),
    }
}

struct SimulationOutcome {
    report: ScheduleReport,
    summary: SessionSummary,
    last_interval: LoopMetricsSnapshot,
    interactions_fired: usize,
    interactions_accepted: usize,
}

fn run_simulation(app: AppWiring) -> ExitCode {
    let outcome = match simulate(app) {
        Ok(outcome) => outcome,
        Err(err) => {
            error!(error = %err, "startup_failed");
            return ExitCode::FAILURE;
        }
    };

    log_report("played", &outcome.report);
    info!(
        turn_misses = outcome.summary.turn_misses,
        queue_len = outcome.summary.queue_len,
        last_interval_tps = outcome.last_interval.tps,
        last_interval_clips = outcome.last_interval.clips_started,
        last_interval_refills = outcome.last_interval.refills,
        interactions_fired = outcome.interactions_fired,
        interactions_accepted = outcome.interactions_accepted,
        "simulation_finished"
    );
    ExitCode::SUCCESS
}

fn simulate(mut app: AppWiring) -> Result<SimulationOutcome, AppError> {
    let scheduler = scheduler_for(app.seed);
    let metrics_handle = MetricsHandle::default();
    let session = run_simulated_session(
        &app.loop_config,
        app.rig,
        app.playback,
        scheduler,
        &mut app.scene,
        &metrics_handle,
    )?;

    Ok(SimulationOutcome {
        report: ScheduleReport::from_items(session.host.history(), session.host.catalog()),
        summary: session.summary,
        last_interval: metrics_handle.snapshot(),
        interactions_fired: app.scene.fired(),
        interactions_accepted: app.scene.accepted(),
    })
}

fn run_report(app: AppWiring) -> ExitCode {
    match schedule_report(app.rig, &app.playback, app.seed) {
        Ok(report) => {
            log_report("generated", &report);
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!(error = %err, "startup_failed");
            ExitCode::FAILURE
        }
    }
}

fn schedule_report(
    rig: RigLoad,
    playback: &PlaybackConfig,
    seed: Option<u64>,
) -> Result<ScheduleReport, CatalogError> {
    let rig = rig?;
    let mut scheduler = scheduler_for(seed);
    let items = scheduler.generate_for(
        active_params(playback.active_level),
        REPORT_ITEM_COUNT,
        &rig.catalog,
        &playback.special_clip,
    );
    Ok(ScheduleReport::from_items(&items, &rig.catalog))
}

fn scheduler_for(seed: Option<u64>) -> Scheduler {
    match seed {
        Some(seed) => {
            info!(seed, "scheduler_seeded");
            Scheduler::from_seed(seed)
        }
        None => Scheduler::from_os_rng(),
    }
}

fn log_report(source: &'static str, report: &ScheduleReport) {
    for line in report.render_human_readable().lines() {
        info!(source, "{line}");
    }
}
