//! Dialogue listener on the director bus.
//!
//! A dialogue book maps bus channels to lines. One-shot lines remember that
//! they fired; repeatable lines reset themselves. Two channels only show
//! their line on a chance roll. The active line is held in a timed resource
//! the HUD renders.

use bevy::prelude::*;
use rand::Rng;

use crate::common::rng::GameRng;
use crate::common::state::GameState;
use crate::plugins::director::DirectorEvent;

const DISPLAY_SECS: f32 = 3.0;

pub fn plugin(app: &mut App) {
    app.insert_resource(DialogueBook::default());
    app.insert_resource(ActiveDialogue::default());
    app.add_systems(OnEnter(GameState::InGame), reset_dialogue);
    app.add_systems(Update, (dialogue_listener, dialogue_timeout));
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogueTrigger {
    FirstKill,
    FirstWaveCleared,
    MoreEnemies,
    SecondWave,
    FastClear,
    FireballLaunched,
    PlayerDamaged,
    MidStage,
    FinalForm,
    NpcHelp,
}

#[derive(Debug, Clone)]
pub struct DialogueLine {
    pub trigger: DialogueTrigger,
    pub text: &'static str,
    pub repeatable: bool,
    pub triggered: bool,
}

impl DialogueLine {
    fn new(trigger: DialogueTrigger, text: &'static str, repeatable: bool) -> Self {
        Self { trigger, text, repeatable, triggered: false }
    }
}

#[derive(Resource, Debug, Clone)]
pub struct DialogueBook {
    pub lines: Vec<DialogueLine>,
}

impl Default for DialogueBook {
    fn default() -> Self {
        use DialogueTrigger::*;
        Self {
            lines: vec![
                DialogueLine::new(FirstKill, "First one down. They won't stop coming.", false),
                DialogueLine::new(FirstWaveCleared, "Arena's clear... for now. Catch your breath.", false),
                DialogueLine::new(MoreEnemies, "More rifts opening. Stay sharp!", true),
                DialogueLine::new(SecondWave, "Second wave! They're getting bolder.", false),
                DialogueLine::new(FastClear, "Five that fast? Impressive work.", true),
                DialogueLine::new(FireballLaunched, "Incoming fire, watch the glowing ground!", true),
                DialogueLine::new(PlayerDamaged, "You're hurt! Keep moving, don't let them swarm you.", true),
                DialogueLine::new(MidStage, "That one's grown too big. Put it down before it's too late.", false),
                DialogueLine::new(FinalForm, "It's reached its final form. It can't be hurt anymore!", false),
                DialogueLine::new(NpcHelp, "Hold on, I'm coming to help!", false),
            ],
        }
    }
}

impl DialogueBook {
    /// Fetch the line for a trigger, honoring one-shot bookkeeping.
    pub fn take(&mut self, trigger: DialogueTrigger) -> Option<&'static str> {
        let line = self
            .lines
            .iter_mut()
            .find(|l| l.trigger == trigger && (!l.triggered || l.repeatable))?;
        line.triggered = true;
        Some(line.text)
    }

    pub fn reset(&mut self) {
        for line in &mut self.lines {
            line.triggered = false;
        }
    }
}

/// The line currently on screen, if any.
#[derive(Resource, Debug, Default)]
pub struct ActiveDialogue {
    pub text: Option<&'static str>,
    pub timer: Timer,
}

fn reset_dialogue(mut book: ResMut<DialogueBook>, mut active: ResMut<ActiveDialogue>) {
    book.reset();
    active.text = None;
}

/// Map bus traffic to dialogue lines.
pub fn dialogue_listener(
    mut bus: MessageReader<DirectorEvent>,
    mut rng: ResMut<GameRng>,
    mut book: ResMut<DialogueBook>,
    mut active: ResMut<ActiveDialogue>,
) {
    for msg in bus.read() {
        let trigger = match msg {
            DirectorEvent::EnemyKilled { kill_count: 1 } => Some(DialogueTrigger::FirstKill),
            DirectorEvent::EnemyKilled { .. } => None,
            DirectorEvent::WaveCleared { wave: 1 } => Some(DialogueTrigger::FirstWaveCleared),
            DirectorEvent::WaveCleared { .. } => None,
            DirectorEvent::MoreEnemies => Some(DialogueTrigger::MoreEnemies),
            DirectorEvent::SecondWave => Some(DialogueTrigger::SecondWave),
            DirectorEvent::FastClear => Some(DialogueTrigger::FastClear),
            // Commentary on routine events only some of the time.
            DirectorEvent::FireballLaunched => {
                (rng.0.gen_range(0..2) == 0).then_some(DialogueTrigger::FireballLaunched)
            }
            DirectorEvent::PlayerDamaged => {
                (rng.0.gen_range(0..3) == 0).then_some(DialogueTrigger::PlayerDamaged)
            }
            DirectorEvent::MidStageAppeared => Some(DialogueTrigger::MidStage),
            DirectorEvent::FinalFormAppeared => Some(DialogueTrigger::FinalForm),
            DirectorEvent::NpcHelp => Some(DialogueTrigger::NpcHelp),
        };

        let Some(trigger) = trigger else { continue };
        if let Some(text) = book.take(trigger) {
            info!(text, "dialogue");
            active.text = Some(text);
            active.timer = Timer::from_seconds(DISPLAY_SECS, TimerMode::Once);
        }
    }
}

pub fn dialogue_timeout(time: Res<Time>, mut active: ResMut<ActiveDialogue>) {
    if active.text.is_none() {
        return;
    }
    active.timer.tick(time.delta());
    if active.timer.is_finished() {
        active.text = None;
    }
}
