//! Director plugin: game clock, wave spawner, scoring, end conditions and the
//! session event bus.
//!
//! A session runs between `OnEnter(InGame)` (reset + first wave) and the
//! single `end_session` call that records the outcome and moves to `Results`.
//! Everything the director spawns carries `SessionSpawned`; results cleanup
//! despawns all of it except final forms that have permanently arrived, and
//! the next session start clears even those.
//!
//! The bus is one message enum. It carries no per-channel state: listeners
//! that only care about a first occurrence keep their own bookkeeping.

use std::collections::VecDeque;

use bevy::prelude::*;
use rand::Rng;

use crate::common::rng::GameRng;
use crate::common::state::GameState;
use crate::common::tunables::{DirectorTunables, Tunables};
use crate::plugins::enemies::fsm::Fsm;
use crate::plugins::enemies::growth::FinalForm;
use crate::plugins::enemies::Enemy;
use crate::plugins::health::{DamageSource, Damaged, Died};
use crate::plugins::player::Player;

pub mod spawn;

pub fn plugin(app: &mut App) {
    let director = app.world().resource::<Tunables>().director.clone();

    app.add_message::<DirectorEvent>();
    app.insert_resource(Session::new(&director));
    app.insert_resource(FinalSlots::new(director.final_slots));

    app.add_systems(OnEnter(GameState::InGame), start_session);
    app.add_systems(OnEnter(GameState::Results), finish_session);
    app.add_systems(Update, staging_input.run_if(in_state(GameState::Staging)));
    app.add_systems(Update, results_input.run_if(in_state(GameState::Results)));

    app.add_systems(
        Update,
        (session_clock, spawn::black_hole_tick, wave_watch, help_watch, overrun_watch)
            .chain()
            .run_if(in_state(GameState::InGame)),
    );

    app.add_systems(
        Update,
        (scoring, relay_player_damage)
            .after(crate::plugins::health::apply_damage)
            .run_if(in_state(GameState::InGame)),
    );
}

/// Session bus. Fan-out to whoever reads it (dialogue, NPC helper, HUD).
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectorEvent {
    EnemyKilled { kill_count: u32 },
    WaveCleared { wave: u32 },
    MoreEnemies,
    SecondWave,
    FastClear,
    FireballLaunched,
    PlayerDamaged,
    MidStageAppeared,
    FinalFormAppeared,
    NpcHelp,
}

/// Everything the director spawned this session. Cleared on results (except
/// parked final forms) and again on the next session start.
#[derive(Component, Debug, Clone, Copy)]
pub struct SessionSpawned;

/// Loss marker spawned at the arena center after a defeat.
#[derive(Component, Debug, Clone, Copy)]
pub struct RestartBeacon;

/// Orchestrator state for one session.
#[derive(Resource, Debug)]
pub struct Session {
    pub score: u32,
    pub target: u32,
    pub kills: u32,
    pub wave: u32,
    pub clock: Timer,
    pub elapsed: f32,
    /// Timestamps of recent unassisted kills, pruned to the fast-clear window.
    pub recent_kills: VecDeque<f32>,
    /// `Some(win)` once the session has ended. Set exactly once.
    pub outcome: Option<bool>,
    pub npc_help_sent: bool,
    pub next_checkpoint: usize,
    /// Shooter positions not yet used this session.
    pub shooter_pool: Vec<Vec2>,
    /// Pending wave respawn, armed when the arena is cleared.
    pub respawn: Option<Timer>,
}

impl Session {
    pub fn new(t: &DirectorTunables) -> Self {
        Self {
            score: 0,
            target: t.score_target,
            kills: 0,
            wave: 1,
            clock: Timer::from_seconds(t.session_duration, TimerMode::Once),
            elapsed: 0.0,
            recent_kills: VecDeque::new(),
            outcome: None,
            npc_help_sent: false,
            next_checkpoint: 0,
            shooter_pool: t.shooter_positions.clone(),
            respawn: None,
        }
    }

    #[inline]
    pub fn active(&self) -> bool {
        self.outcome.is_none()
    }

    pub fn remaining_secs(&self) -> f32 {
        self.clock.remaining_secs()
    }

    /// Record a kill. Assisted kills still score but never feed the
    /// fast-clear window. Returns `true` when this kill completes a fast
    /// clear; the window is cleared so it cannot re-trigger until another
    /// full streak accumulates.
    pub fn record_kill(&mut self, assisted: bool, window: f32, needed: usize) -> bool {
        self.score += 1;
        self.kills += 1;
        if assisted {
            return false;
        }

        let now = self.elapsed;
        self.recent_kills.push_back(now);
        while let Some(&oldest) = self.recent_kills.front() {
            if now - oldest > window {
                self.recent_kills.pop_front();
            } else {
                break;
            }
        }

        if self.recent_kills.len() >= needed {
            self.recent_kills.clear();
            true
        } else {
            false
        }
    }
}

/// Reservation table for final-form parking positions.
///
/// A claim takes the first free slot and is permanent for the session; the
/// claimed count is the overrun-loss counter.
#[derive(Resource, Debug, Default)]
pub struct FinalSlots {
    positions: Vec<Vec2>,
    claims: Vec<Option<Entity>>,
}

impl FinalSlots {
    pub fn new(positions: Vec<Vec2>) -> Self {
        let claims = vec![None; positions.len()];
        Self { positions, claims }
    }

    pub fn reset(&mut self, positions: Vec<Vec2>) {
        *self = Self::new(positions);
    }

    /// Claim the first unoccupied slot, or fail if the table is full.
    pub fn claim(&mut self, holder: Entity) -> Option<(usize, Vec2)> {
        let index = self.claims.iter().position(Option::is_none)?;
        self.claims[index] = Some(holder);
        Some((index, self.positions[index]))
    }

    pub fn holder(&self, index: usize) -> Option<Entity> {
        self.claims.get(index).copied().flatten()
    }

    pub fn claimed_count(&self) -> usize {
        self.claims.iter().filter(|c| c.is_some()).count()
    }

    pub fn total(&self) -> usize {
        self.positions.len()
    }
}

fn end_session(session: &mut Session, next: &mut NextState<GameState>, win: bool) {
    if session.outcome.is_some() {
        return;
    }
    session.outcome = Some(win);
    info!(win, score = session.score, "session over");
    next.set(GameState::Results);
}

/// Reset orchestrator state and open the first wave.
pub fn start_session(
    tunables: Res<Tunables>,
    mut commands: Commands,
    mut rng: ResMut<GameRng>,
    mut session: ResMut<Session>,
    mut slots: ResMut<FinalSlots>,
    q_leftovers: Query<Entity, With<SessionSpawned>>,
) {
    for e in &q_leftovers {
        commands.entity(e).despawn();
    }
    *session = Session::new(&tunables.director);
    slots.reset(tunables.director.final_slots.clone());
    spawn::spawn_wave(&mut commands, &mut rng.0, &tunables);
    info!("session started");
}

/// Countdown, elapsed time and interference checkpoints.
pub fn session_clock(
    time: Res<Time>,
    tunables: Res<Tunables>,
    mut commands: Commands,
    mut rng: ResMut<GameRng>,
    mut session: ResMut<Session>,
    mut next: ResMut<NextState<GameState>>,
) {
    if !session.active() {
        return;
    }

    session.elapsed += time.delta_secs();

    let checkpoints = &tunables.director.interference_checkpoints;
    while session.next_checkpoint < checkpoints.len()
        && session.elapsed >= checkpoints[session.next_checkpoint]
    {
        session.next_checkpoint += 1;
        if session.shooter_pool.is_empty() {
            warn!("interference checkpoint hit with no positions left");
            continue;
        }
        let i = rng.0.gen_range(0..session.shooter_pool.len());
        let pos = session.shooter_pool.swap_remove(i);
        crate::plugins::shooter::spawn_shooter(&mut commands, &mut rng.0, &tunables, pos);
    }

    session.clock.tick(time.delta());
    if session.clock.is_finished() {
        let win = session.score >= session.target;
        end_session(&mut session, &mut next, win);
    }
}

/// Once the arena is empty of combat enemies and spawners, schedule and then
/// open the next wave.
pub fn wave_watch(
    time: Res<Time>,
    tunables: Res<Tunables>,
    mut commands: Commands,
    mut rng: ResMut<GameRng>,
    mut session: ResMut<Session>,
    mut bus: MessageWriter<DirectorEvent>,
    q_enemies: Query<(), With<Enemy>>,
    q_holes: Query<(), With<spawn::BlackHole>>,
) {
    if !session.active() {
        return;
    }

    let cleared = q_enemies.is_empty() && q_holes.is_empty();
    if session.respawn.is_none() {
        if cleared {
            bus.write(DirectorEvent::WaveCleared { wave: session.wave });
            session.respawn = Some(Timer::from_seconds(
                tunables.director.respawn_delay,
                TimerMode::Once,
            ));
        }
        return;
    }

    let timer = session.respawn.as_mut().unwrap();
    timer.tick(time.delta());
    if timer.is_finished() {
        session.respawn = None;
        session.wave += 1;
        spawn::spawn_wave(&mut commands, &mut rng.0, &tunables);
        bus.write(DirectorEvent::MoreEnemies);
        if session.wave == 2 {
            bus.write(DirectorEvent::SecondWave);
        }
    }
}

/// Score enemy deaths and evaluate the score-target win.
pub fn scoring(
    tunables: Res<Tunables>,
    mut died: MessageReader<Died>,
    q_enemy_like: Query<(), With<Fsm>>,
    mut session: ResMut<Session>,
    mut bus: MessageWriter<DirectorEvent>,
    mut next: ResMut<NextState<GameState>>,
) {
    for msg in died.read() {
        if !session.active() {
            break;
        }
        // Only combat enemies score; the player has no FSM.
        if !q_enemy_like.contains(msg.entity) {
            continue;
        }

        let assisted = msg.source == DamageSource::NpcHelper;
        let fast = session.record_kill(
            assisted,
            tunables.director.fast_clear_window,
            tunables.director.fast_clear_kills,
        );
        bus.write(DirectorEvent::EnemyKilled { kill_count: session.kills });
        if fast {
            bus.write(DirectorEvent::FastClear);
        }

        if session.score >= session.target {
            end_session(&mut session, &mut next, true);
        }
    }
}

/// Loss by overrun: every parking slot claimed.
pub fn overrun_watch(
    slots: Res<FinalSlots>,
    mut session: ResMut<Session>,
    mut next: ResMut<NextState<GameState>>,
) {
    if !session.active() {
        return;
    }
    if slots.total() > 0 && slots.claimed_count() == slots.total() {
        end_session(&mut session, &mut next, false);
    }
}

/// Summon the helper once the live enemy count crosses the threshold.
pub fn help_watch(
    tunables: Res<Tunables>,
    q_enemies: Query<(), With<Enemy>>,
    mut session: ResMut<Session>,
    mut bus: MessageWriter<DirectorEvent>,
) {
    if !session.active() || session.npc_help_sent {
        return;
    }
    if q_enemies.iter().count() >= tunables.director.npc_help_threshold {
        session.npc_help_sent = true;
        bus.write(DirectorEvent::NpcHelp);
    }
}

/// Re-broadcast hits on the player as a bus channel.
pub fn relay_player_damage(
    mut damaged: MessageReader<Damaged>,
    q_player: Query<(), With<Player>>,
    mut bus: MessageWriter<DirectorEvent>,
) {
    for msg in damaged.read() {
        if q_player.contains(msg.entity) {
            bus.write(DirectorEvent::PlayerDamaged);
        }
    }
}

/// Results cleanup: everything session-tracked goes, except final forms that
/// made it to their slot. A loss leaves a restart beacon behind.
pub fn finish_session(
    mut commands: Commands,
    session: Res<Session>,
    q_tracked: Query<(Entity, Option<&FinalForm>), With<SessionSpawned>>,
) {
    for (entity, form) in &q_tracked {
        let parked = form.is_some_and(|f| f.arrived);
        if !parked {
            commands.entity(entity).despawn();
        }
    }

    if session.outcome == Some(false) {
        commands.spawn((
            Name::new("RestartBeacon"),
            RestartBeacon,
            SessionSpawned,
            Sprite {
                color: Color::srgb(0.9, 0.8, 0.2),
                custom_size: Some(Vec2::splat(24.0)),
                ..default()
            },
            Transform::from_xyz(0.0, 0.0, 1.0),
        ));
    }
}

pub fn staging_input(keys: Res<ButtonInput<KeyCode>>, mut next: ResMut<NextState<GameState>>) {
    if keys.just_pressed(KeyCode::Enter) {
        next.set(GameState::InGame);
    }
}

pub fn results_input(keys: Res<ButtonInput<KeyCode>>, mut next: ResMut<NextState<GameState>>) {
    if keys.just_pressed(KeyCode::Enter) {
        next.set(GameState::InGame);
    }
}
