use std::time::Duration;

use idle_engine::{IdlePlayer, IdleScene, PlaybackSink, MOVE_CLIP};
use tracing::info;

use super::session::{InteractionAction, ScriptedInteraction};

const INTERACT_CLIP: &str = "Interact";
const SIT_CLIP: &str = "Sit";
const SLEEP_CLIP: &str = "Sleep";

impl InteractionAction {
    fn clip(self) -> &'static str {
        match self {
            InteractionAction::Interact => INTERACT_CLIP,
            InteractionAction::Sit => SIT_CLIP,
            InteractionAction::Sleep => SLEEP_CLIP,
            InteractionAction::Walk => MOVE_CLIP,
        }
    }

    fn looping(self) -> bool {
        matches!(self, InteractionAction::Sit | InteractionAction::Sleep)
    }
}

#[derive(Debug, Default)]
pub(crate) struct ScriptedInteractions {
    script: Vec<ScriptedInteraction>,
    next: usize,
    accepted: usize,
}

impl ScriptedInteractions {
    pub(crate) fn new(mut script: Vec<ScriptedInteraction>) -> Self {
        script.sort_by(|a, b| a.at_seconds.total_cmp(&b.at_seconds));
        Self {
            script,
            next: 0,
            accepted: 0,
        }
    }

    pub(crate) fn fired(&self) -> usize {
        self.next
    }

    pub(crate) fn accepted(&self) -> usize {
        self.accepted
    }
}

impl IdleScene for ScriptedInteractions {
    fn load(&mut self, _player: &mut IdlePlayer, _sink: &mut dyn PlaybackSink) {
        info!(scripted = self.script.len(), "interactions_loaded");
    }

    fn update(
        &mut self,
        sim_time: Duration,
        player: &mut IdlePlayer,
        sink: &mut dyn PlaybackSink,
    ) {
        let now = sim_time.as_secs_f64();
        while let Some(interaction) = self.script.get(self.next) {
            if interaction.at_seconds > now {
                break;
            }
            let action = interaction.action;
            let accepted = player.play_temp(sink, action.clip(), action.looping(), None);
            if accepted {
                self.accepted += 1;
            }
            info!(
                action = ?action,
                at_seconds = interaction.at_seconds,
                sim_seconds = now,
                accepted,
                "interaction_fired"
            );
            self.next += 1;
        }
    }

    fn unload(&mut self, _player: &IdlePlayer) {
        info!(
            fired = self.next,
            accepted = self.accepted,
            pending = self.script.len() - self.next,
            "interactions_unloaded"
        );
    }
}

#[cfg(test)]
mod tests {
    use idle_engine::{
        AnimationCatalog, PlaybackConfig, PlaybackState, RigData, Scheduler, SimulatedHost,
    };

    use super::*;

    fn catalog() -> AnimationCatalog {
        AnimationCatalog::new()
            .with_clip("Move", 1.0)
            .with_clip("Relax", 2.0)
            .with_clip("Interact", 1.0)
            .with_clip("Sit", 4.0)
    }

    fn player() -> IdlePlayer {
        let mut player = IdlePlayer::new(PlaybackConfig::default(), Scheduler::from_seed(4));
        player.apply_rig(&RigData { catalog: catalog() }, 2);
        player
    }

    fn at(at_seconds: f64, action: InteractionAction) -> ScriptedInteraction {
        ScriptedInteraction { at_seconds, action }
    }

    #[test]
    fn fires_each_interaction_once_in_time_order() {
        let mut scene = ScriptedInteractions::new(vec![
            at(2.0, InteractionAction::Sit),
            at(1.0, InteractionAction::Interact),
        ]);
        let mut player = player();
        let mut host = SimulatedHost::new(catalog());

        scene.update(Duration::from_millis(500), &mut player, &mut host);
        assert_eq!(scene.fired(), 0);

        scene.update(Duration::from_secs(1), &mut player, &mut host);
        assert_eq!(scene.fired(), 1);
        assert_eq!(host.current_clip(), Some("Interact"));
        assert_eq!(player.state(), PlaybackState::PlayingTempOnce);

        scene.update(Duration::from_secs(3), &mut player, &mut host);
        scene.update(Duration::from_secs(4), &mut player, &mut host);
        assert_eq!(scene.fired(), 2);
        assert_eq!(host.plays().len(), 2);
        assert_eq!(player.state(), PlaybackState::PlayingTempLoop);
    }

    #[test]
    fn unknown_clip_counts_as_fired_but_not_accepted() {
        let mut scene = ScriptedInteractions::new(vec![at(0.0, InteractionAction::Sleep)]);
        let mut player = player();
        let mut host = SimulatedHost::new(catalog());

        scene.update(Duration::from_millis(16), &mut player, &mut host);

        assert_eq!(scene.fired(), 1);
        assert_eq!(scene.accepted(), 0);
        assert!(!player.is_playing_temp());
    }

    #[test]
    fn walk_is_a_one_shot_move() {
        assert_eq!(InteractionAction::Walk.clip(), "Move");
        assert!(!InteractionAction::Walk.looping());
        assert!(InteractionAction::Sleep.looping());
    }
}
