//! Enemy behavior state machine.
//!
//! States: Idle, Patrol, Chase, Attack, Hit, Die. Distances are measured on
//! the world plane. Exactly one state is active; `Die` is terminal.
//!
//! The attack runs as a two-phase task component (`ActiveAttack`): a wind-up
//! that tracks the player, then a short animation-sync delay before the hit
//! lands. Leaving Attack while the task is pre-strike cancels it and restores
//! `can_attack` in the same tick. A resolved swing converts into a separate
//! `AttackCooldown` that survives state changes, so `can_attack` is never
//! left permanently false and never skips its cooldown.

use std::f32::consts::{PI, TAU};

use avian2d::prelude::*;
use bevy::prelude::*;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::common::layers::Layer;
use crate::common::rng::GameRng;
use crate::common::tunables::{EnemyTunables, Tunables};
use crate::plugins::health::{DamageRequest, DamageSource, Damaged, Died, Health};
use crate::plugins::player::Player;

use super::{BaseTint, Enemy};
use super::growth::Growth;

const HIT_TINT: Color = Color::srgb(1.0, 0.45, 0.4);
const CORPSE_TINT: Color = Color::srgb(0.8, 0.8, 0.8);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnemyState {
    #[default]
    Idle,
    Patrol,
    Chase,
    Attack,
    Hit,
    Die,
}

#[derive(Component, Debug)]
pub struct Fsm {
    pub state: EnemyState,
    /// Idle countdown, attack-window countdown, or corpse delay, depending on state.
    pub state_timer: f32,
    /// Unit heading; mirrored into the transform rotation.
    pub facing: Vec2,
    pub patrol_distance: f32,
    pub distance_traveled: f32,
    pub can_attack: bool,
    /// Current melee reach; growth stages update this.
    pub attack_range: f32,
    pub move_speed: f32,
}

impl Fsm {
    pub fn new(t: &EnemyTunables, attack_range: f32, move_speed: f32) -> Self {
        Self {
            state: EnemyState::Idle,
            state_timer: t.idle_time,
            facing: Vec2::Y,
            patrol_distance: 0.0,
            distance_traveled: 0.0,
            can_attack: true,
            attack_range,
            move_speed,
        }
    }
}

/// Cancellable attack task: wind-up, then a short strike delay.
#[derive(Component, Debug)]
pub struct ActiveAttack {
    pub phase: AttackPhase,
}

#[derive(Debug)]
pub enum AttackPhase {
    Windup(Timer),
    Strike(Timer),
}

/// Post-swing cooldown. Not cancelled by state changes; re-enables
/// `can_attack` when it elapses.
#[derive(Component, Debug)]
pub struct AttackCooldown(pub Timer);

/// Hit-stun task. Re-inserting restarts the stun.
#[derive(Component, Debug)]
pub struct HitStun(pub Timer);

/// Collision intent for a live combatant.
pub fn enemy_layers() -> CollisionLayers {
    CollisionLayers::new(Layer::Enemy, [Layer::World, Layer::Player])
}

/// Neutral, non-interacting layers for corpses and final forms.
pub fn neutral_layers() -> CollisionLayers {
    CollisionLayers::new(Layer::Default, [] as [Layer; 0])
}

/// Rotate `current` toward `target` by at most `max_step` radians.
pub fn rotate_towards(current: Vec2, target: Vec2, max_step: f32) -> Vec2 {
    if target.length_squared() <= f32::EPSILON {
        return current;
    }
    let cur = current.to_angle();
    let mut diff = target.to_angle() - cur;
    while diff > PI {
        diff -= TAU;
    }
    while diff < -PI {
        diff += TAU;
    }
    Vec2::from_angle(cur + diff.clamp(-max_step, max_step))
}

/// Roll a fresh patrol leg: uniform heading, uniform distance.
pub fn enter_patrol(fsm: &mut Fsm, rng: &mut ChaCha8Rng, t: &EnemyTunables) {
    fsm.state = EnemyState::Patrol;
    let angle = rng.gen_range(0.0f32..360.0).to_radians();
    fsm.facing = Vec2::from_angle(angle);
    fsm.patrol_distance = rng.gen_range(t.min_patrol_distance..t.max_patrol_distance);
    fsm.distance_traveled = 0.0;
}

/// Switch states, running exit actions for the old state and entry actions
/// for the new one.
///
/// `attack_task_active` must reflect whether an `ActiveAttack` is currently
/// attached; leaving Attack with a pre-strike task cancels it and restores
/// `can_attack` immediately.
pub fn change_state(
    entity: Entity,
    fsm: &mut Fsm,
    new_state: EnemyState,
    attack_task_active: bool,
    commands: &mut Commands,
    rng: &mut ChaCha8Rng,
    t: &EnemyTunables,
) {
    if fsm.state == EnemyState::Attack && attack_task_active {
        commands.entity(entity).remove::<ActiveAttack>();
        fsm.can_attack = true;
    }

    fsm.state = new_state;
    match new_state {
        EnemyState::Idle => {
            fsm.state_timer = t.idle_time;
        }
        EnemyState::Patrol => {
            enter_patrol(fsm, rng, t);
        }
        EnemyState::Chase => {}
        EnemyState::Attack => {
            fsm.state_timer = t.attack_duration;
            fsm.can_attack = false;
            commands.entity(entity).insert(ActiveAttack {
                phase: AttackPhase::Windup(Timer::from_seconds(t.attack_windup, TimerMode::Once)),
            });
        }
        EnemyState::Hit => {
            commands
                .entity(entity)
                .insert(HitStun(Timer::from_seconds(t.hit_stun, TimerMode::Once)));
        }
        EnemyState::Die => {
            fsm.state_timer = t.corpse_delay;
        }
    }
}

fn out_of_bounds(pos: Vec2, t: &EnemyTunables) -> bool {
    pos.x < t.bounds_min.x || pos.x > t.bounds_max.x || pos.y < t.bounds_min.y || pos.y > t.bounds_max.y
}

/// Pick the state to resume once an attack window or hit stun ends.
///
/// `None` means hold the current state (a strike is still pending).
fn reengage(
    player_pos: Option<Vec2>,
    pos: Vec2,
    fsm: &Fsm,
    windup_active: bool,
    t: &EnemyTunables,
) -> Option<EnemyState> {
    let Some(target) = player_pos else {
        return Some(EnemyState::Patrol);
    };
    let dist = pos.distance(target);
    if dist > t.detection_range {
        return Some(EnemyState::Patrol);
    }
    if dist > fsm.attack_range {
        return Some(EnemyState::Chase);
    }
    if fsm.can_attack {
        return Some(EnemyState::Attack);
    }
    if windup_active {
        // The swing is mid-flight; let it land.
        None
    } else {
        // Cooling down; shadow the player until the next swing is available.
        Some(EnemyState::Chase)
    }
}

/// Main per-tick state update, followed by the detection check.
pub fn fsm_tick(
    time: Res<Time>,
    tunables: Res<Tunables>,
    mut rng: ResMut<GameRng>,
    mut commands: Commands,
    q_player: Query<&Transform, (With<Player>, Without<Enemy>)>,
    mut q: Query<(Entity, &mut Fsm, &mut Transform, Option<&ActiveAttack>), With<Enemy>>,
) {
    let dt = time.delta_secs();
    let t = &tunables.enemy;
    let rng = &mut rng.0;
    let player_pos = q_player.single().ok().map(|tf| tf.translation.truncate());

    for (entity, mut fsm, mut tf, attack_task) in &mut q {
        if fsm.state == EnemyState::Die {
            continue;
        }
        let task_active = attack_task.is_some();

        // Player gone mid-chase: fall back to patrol.
        if player_pos.is_none() && fsm.state == EnemyState::Chase {
            change_state(entity, &mut fsm, EnemyState::Patrol, task_active, &mut commands, rng, t);
            continue;
        }

        match fsm.state {
            EnemyState::Idle => {
                fsm.state_timer -= dt;
                if fsm.state_timer <= 0.0 {
                    change_state(entity, &mut fsm, EnemyState::Patrol, task_active, &mut commands, rng, t);
                }
            }
            EnemyState::Patrol => {
                let step = fsm.move_speed * dt;
                let dir = fsm.facing;
                tf.translation += (dir * step).extend(0.0);
                tf.rotation = Quat::from_rotation_z(dir.to_angle());
                fsm.distance_traveled += step;

                let pos = tf.translation.truncate();
                if fsm.distance_traveled >= fsm.patrol_distance || out_of_bounds(pos, t) {
                    change_state(entity, &mut fsm, EnemyState::Idle, task_active, &mut commands, rng, t);
                }
            }
            EnemyState::Chase => {
                let Some(target) = player_pos else { continue };
                let pos = tf.translation.truncate();
                let to_player = target - pos;

                if to_player.length_squared() > f32::EPSILON {
                    let max_step = t.rotation_speed.to_radians() * dt;
                    fsm.facing = rotate_towards(fsm.facing, to_player, max_step);
                    tf.rotation = Quat::from_rotation_z(fsm.facing.to_angle());
                }

                let dist = to_player.length();
                if dist > fsm.attack_range {
                    let step = fsm.move_speed * dt;
                    tf.translation += (fsm.facing * step).extend(0.0);
                }

                if dist <= fsm.attack_range && fsm.can_attack {
                    change_state(entity, &mut fsm, EnemyState::Attack, task_active, &mut commands, rng, t);
                } else if dist > t.detection_range * t.chase_release_factor {
                    change_state(entity, &mut fsm, EnemyState::Patrol, task_active, &mut commands, rng, t);
                }
            }
            EnemyState::Attack => {
                fsm.state_timer -= dt;
                if fsm.state_timer <= 0.0 {
                    let pos = tf.translation.truncate();
                    if let Some(next) = reengage(player_pos, pos, &fsm, task_active, t) {
                        change_state(entity, &mut fsm, next, task_active, &mut commands, rng, t);
                    }
                }
            }
            EnemyState::Hit | EnemyState::Die => {}
        }

        // Detection runs after the state's own update and can fire from Idle
        // or Patrol, never while stunned or dead.
        if matches!(fsm.state, EnemyState::Idle | EnemyState::Patrol) {
            if let Some(target) = player_pos {
                let dist = tf.translation.truncate().distance(target);
                if dist <= t.detection_range {
                    change_state(entity, &mut fsm, EnemyState::Chase, task_active, &mut commands, rng, t);
                }
            }
        }
    }
}

/// Advance attack tasks: track the player through the wind-up, then land the
/// hit after the animation-sync delay, then convert into a cooldown.
pub fn attack_task_tick(
    time: Res<Time>,
    tunables: Res<Tunables>,
    mut commands: Commands,
    q_player: Query<(Entity, &Transform), (With<Player>, Without<Enemy>)>,
    mut q: Query<(Entity, &mut Fsm, &mut Transform, &mut ActiveAttack), With<Enemy>>,
    mut damage: MessageWriter<DamageRequest>,
) {
    let t = &tunables.enemy;
    let player = q_player.single().ok().map(|(e, tf)| (e, tf.translation.truncate()));

    for (entity, mut fsm, mut tf, mut task) in &mut q {
        if fsm.state != EnemyState::Attack {
            // Cancelled this tick; removal is already queued.
            continue;
        }

        match &mut task.phase {
            AttackPhase::Windup(timer) => {
                if let Some((_, target)) = player {
                    let to_player = target - tf.translation.truncate();
                    if to_player.length_squared() > f32::EPSILON {
                        fsm.facing = to_player.normalize();
                        tf.rotation = Quat::from_rotation_z(fsm.facing.to_angle());
                    }
                }

                timer.tick(time.delta());
                if timer.is_finished() {
                    let in_range = player.is_some_and(|(_, target)| {
                        tf.translation.truncate().distance(target) <= fsm.attack_range
                    });
                    if in_range {
                        task.phase = AttackPhase::Strike(Timer::from_seconds(
                            t.attack_duration * 0.5,
                            TimerMode::Once,
                        ));
                    } else {
                        // Whiffed; the swing still costs the full cooldown.
                        commands.entity(entity).remove::<ActiveAttack>();
                        commands.entity(entity).insert(AttackCooldown(Timer::from_seconds(
                            t.attack_cooldown,
                            TimerMode::Once,
                        )));
                    }
                }
            }
            AttackPhase::Strike(timer) => {
                timer.tick(time.delta());
                if timer.is_finished() {
                    if let Some((player_entity, _)) = player {
                        damage.write(DamageRequest {
                            target: player_entity,
                            amount: t.attack_damage,
                            source: DamageSource::Enemy,
                        });
                    }
                    commands.entity(entity).remove::<ActiveAttack>();
                    commands.entity(entity).insert(AttackCooldown(Timer::from_seconds(
                        t.attack_cooldown,
                        TimerMode::Once,
                    )));
                }
            }
        }
    }
}

pub fn attack_cooldown_tick(
    time: Res<Time>,
    mut commands: Commands,
    mut q: Query<(Entity, &mut Fsm, &mut AttackCooldown)>,
) {
    for (entity, mut fsm, mut cooldown) in &mut q {
        cooldown.0.tick(time.delta());
        if cooldown.0.is_finished() {
            fsm.can_attack = true;
            commands.entity(entity).remove::<AttackCooldown>();
        }
    }
}

/// Start (or restart) a hit stun whenever a live enemy takes a non-lethal hit.
pub fn enemy_hit_reactions(
    tunables: Res<Tunables>,
    mut rng: ResMut<GameRng>,
    mut commands: Commands,
    mut damaged: MessageReader<Damaged>,
    mut q: Query<(&mut Fsm, &mut Sprite, Option<&ActiveAttack>), With<Enemy>>,
) {
    for msg in damaged.read() {
        let Ok((mut fsm, mut sprite, task)) = q.get_mut(msg.entity) else {
            continue;
        };
        if fsm.state == EnemyState::Die || msg.remaining <= 0 {
            // Lethal hits are handled by the death reaction.
            continue;
        }
        change_state(
            msg.entity,
            &mut fsm,
            EnemyState::Hit,
            task.is_some(),
            &mut commands,
            &mut rng.0,
            &tunables.enemy,
        );
        sprite.color = HIT_TINT;
    }
}

/// Tick hit stuns; when one ends, resume the distance-appropriate state.
pub fn hit_stun_tick(
    time: Res<Time>,
    tunables: Res<Tunables>,
    mut rng: ResMut<GameRng>,
    mut commands: Commands,
    q_player: Query<&Transform, (With<Player>, Without<Enemy>)>,
    mut q: Query<
        (Entity, &mut Fsm, &Transform, &Health, &mut Sprite, &BaseTint, &mut HitStun),
        With<Enemy>,
    >,
) {
    let t = &tunables.enemy;
    let player_pos = q_player.single().ok().map(|tf| tf.translation.truncate());

    for (entity, mut fsm, tf, health, mut sprite, tint, mut stun) in &mut q {
        stun.0.tick(time.delta());
        if !stun.0.is_finished() {
            continue;
        }

        commands.entity(entity).remove::<HitStun>();
        sprite.color = tint.0;

        // Death during the stun wins; the death reaction owns the transition.
        if fsm.state != EnemyState::Hit || health.is_dead() {
            continue;
        }

        let pos = tf.translation.truncate();
        let next = reengage(player_pos, pos, &fsm, false, t).unwrap_or(EnemyState::Chase);
        change_state(entity, &mut fsm, next, false, &mut commands, &mut rng.0, t);
    }
}

/// Terminal transition: clear collision, detach growth, leave the roster,
/// keep the corpse around for a fixed delay.
pub fn enemy_death(
    tunables: Res<Tunables>,
    mut rng: ResMut<GameRng>,
    mut commands: Commands,
    mut died: MessageReader<Died>,
    mut q: Query<(&mut Fsm, &mut Sprite, &mut CollisionLayers, Option<&ActiveAttack>), With<Enemy>>,
) {
    for msg in died.read() {
        let Ok((mut fsm, mut sprite, mut layers, task)) = q.get_mut(msg.entity) else {
            continue;
        };
        if fsm.state == EnemyState::Die {
            continue;
        }

        change_state(
            msg.entity,
            &mut fsm,
            EnemyState::Die,
            task.is_some(),
            &mut commands,
            &mut rng.0,
            &tunables.enemy,
        );
        *layers = neutral_layers();
        sprite.color = CORPSE_TINT;
        commands
            .entity(msg.entity)
            .remove::<(Growth, HitStun, AttackCooldown, Enemy)>();
    }
}

/// Despawn corpses once the death delay elapses.
pub fn corpse_cleanup(time: Res<Time>, mut commands: Commands, mut q: Query<(Entity, &mut Fsm)>) {
    let dt = time.delta_secs();
    for (entity, mut fsm) in &mut q {
        if fsm.state != EnemyState::Die {
            continue;
        }
        fsm.state_timer -= dt;
        if fsm.state_timer <= 0.0 {
            commands.entity(entity).despawn();
        }
    }
}
