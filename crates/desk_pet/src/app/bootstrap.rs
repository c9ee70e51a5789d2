use std::env;
use std::fmt::Display;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use idle_engine::{
    load_rig, rig_from_catalog, AnimationCatalog, LoopConfig, PlaybackConfig, RigLoad,
    ACTIVE_LEVEL_MAX, ACTIVE_LEVEL_MIN,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use super::interactions::ScriptedInteractions;
use super::session::{load_session_file, LoadedSession, SessionError};

const ACTIVE_LEVEL_ENV_VAR: &str = "DESKPET_ACTIVE_LEVEL";
const SEED_ENV_VAR: &str = "DESKPET_SEED";
const SIM_SECONDS_ENV_VAR: &str = "DESKPET_SIM_SECONDS";
const SESSION_ENV_VAR: &str = "DESKPET_SESSION";
const MODE_ENV_VAR: &str = "DESKPET_MODE";

const BUILT_IN_CATALOG_LABEL: &str = "<built-in catalog>";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) enum RunMode {
    #[default]
    Simulate,
    Report,
}

impl FromStr for RunMode {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "simulate" => Ok(RunMode::Simulate),
            "report" => Ok(RunMode::Report),
            other => Err(format!("unknown mode '{other}'; expected simulate or report")),
        }
    }
}

pub(crate) struct AppWiring {
    pub(crate) mode: RunMode,
    pub(crate) loop_config: LoopConfig,
    pub(crate) playback: PlaybackConfig,
    pub(crate) seed: Option<u64>,
    pub(crate) rig: RigLoad,
    pub(crate) scene: ScriptedInteractions,
}

#[derive(Debug, Default)]
struct EnvOverrides {
    mode: Option<RunMode>,
    active_level: Option<i32>,
    seed: Option<u64>,
    sim_seconds: Option<f64>,
}

impl EnvOverrides {
    fn from_env() -> Self {
        Self {
            mode: parse_env_var(MODE_ENV_VAR),
            active_level: parse_env_var(ACTIVE_LEVEL_ENV_VAR),
            seed: parse_env_var(SEED_ENV_VAR),
            sim_seconds: parse_env_var(SIM_SECONDS_ENV_VAR),
        }
    }
}

pub(crate) fn build_app() -> Result<AppWiring, SessionError> {
    init_tracing();
    info!("=== Desk Pet Startup ===");

    let session = match read_env_var(SESSION_ENV_VAR) {
        Some(path) => {
            let session = load_session_file(Path::new(&path))?;
            info!(
                path = %session.path.display(),
                interactions = session.file.interactions.len(),
                "session_loaded"
            );
            Some(session)
        }
        None => None,
    };

    Ok(wire_app(session, EnvOverrides::from_env()))
}

fn wire_app(session: Option<LoadedSession>, overrides: EnvOverrides) -> AppWiring {
    let rig = resolve_rig(session.as_ref());
    let file = session.map(|session| session.file).unwrap_or_default();

    let mut playback = file.playback;
    if let Some(level) = overrides.active_level {
        if (ACTIVE_LEVEL_MIN..=ACTIVE_LEVEL_MAX).contains(&level) {
            playback.active_level = level;
        } else {
            warn!(
                env_var = ACTIVE_LEVEL_ENV_VAR,
                value = level,
                "active level out of range; keeping configured level"
            );
        }
    }

    let mut loop_config = LoopConfig::default();
    let sim_seconds = overrides.sim_seconds.or(file.sim_seconds);
    if let Some(seconds) = sim_seconds {
        match Duration::try_from_secs_f64(seconds) {
            Ok(duration) if !duration.is_zero() => loop_config.sim_duration = duration,
            _ => warn!(
                sim_seconds = seconds,
                "invalid simulation length; keeping default"
            ),
        }
    }

    AppWiring {
        mode: overrides.mode.unwrap_or_default(),
        loop_config,
        playback,
        seed: overrides.seed.or(file.seed),
        rig,
        scene: ScriptedInteractions::new(file.interactions),
    }
}

fn resolve_rig(session: Option<&LoadedSession>) -> RigLoad {
    let Some(session) = session else {
        return rig_from_catalog(default_catalog(), Path::new(BUILT_IN_CATALOG_LABEL));
    };

    if let Some(clips) = &session.file.clips {
        let catalog = clips
            .iter()
            .map(|(name, duration)| (name.as_str(), *duration))
            .collect::<AnimationCatalog>();
        return rig_from_catalog(catalog, &session.path);
    }

    match session.resolved_catalog_path() {
        Some(path) => load_rig(&path),
        None => rig_from_catalog(default_catalog(), Path::new(BUILT_IN_CATALOG_LABEL)),
    }
}

fn default_catalog() -> AnimationCatalog {
    AnimationCatalog::new()
        .with_clip("Default", 0.0)
        .with_clip("Interact", 1.33333)
        .with_clip("Move", 1.0)
        .with_clip("Relax", 2.66667)
        .with_clip("Sit", 4.0)
        .with_clip("Sleep", 3.0)
        .with_clip("Special", 12.0)
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}

fn read_env_var(var: &'static str) -> Option<String> {
    match env::var(var) {
        Ok(value) if value.trim().is_empty() => None,
        Ok(value) => Some(value),
        Err(env::VarError::NotPresent) => None,
        Err(err) => {
            warn!(env_var = var, error = %err, "unable to read env var; ignoring");
            None
        }
    }
}

fn parse_env_var<T>(var: &'static str) -> Option<T>
where
    T: FromStr,
    T::Err: Display,
{
    read_env_var(var).and_then(|raw| parse_override(var, &raw))
}

fn parse_override<T>(var: &'static str, raw: &str) -> Option<T>
where
    T: FromStr,
    T::Err: Display,
{
    match raw.trim().parse::<T>() {
        Ok(value) => Some(value),
        Err(err) => {
            warn!(
                env_var = var,
                value = raw,
                error = %err,
                "invalid env var value; falling back to config"
            );
            None
        }
    }
}
