//! NPC helper: a scripted ally summoned once per session by the `NpcHelp`
//! bus channel.
//!
//! The routine is a phase component stepped by one system: walk to the
//! staging point, walk to the help point, settle, then repeatedly pick the
//! nearest live enemy, close to melee range and finish it with a lethal
//! strike tagged `NpcHelper` (so the kill scores but never feeds the
//! fast-clear streak), up to three kills. Running out of targets ends the
//! loop early; either way the helper walks back to the staging point.

use bevy::prelude::*;

use crate::common::state::GameState;
use crate::common::tunables::{NpcTunables, Tunables};
use crate::plugins::director::DirectorEvent;
use crate::plugins::enemies::Enemy;
use crate::plugins::health::{DamageRequest, DamageSource, Health};
use crate::plugins::player::Player;

pub mod dialogue;

pub fn plugin(app: &mut App) {
    app.add_systems(OnEnter(GameState::InGame), spawn_npc);
    app.add_systems(
        Update,
        (npc_face_player, npc_help_trigger, npc_help_tick)
            .chain()
            .before(crate::plugins::health::apply_damage)
            .run_if(in_state(GameState::InGame)),
    );

    dialogue::plugin(app);
}

#[derive(Component, Debug)]
pub struct NpcHelper;

/// Active help routine. Present only while the helper is working.
#[derive(Component, Debug)]
pub struct HelpRoutine {
    pub kills: u8,
    pub phase: HelpPhase,
}

#[derive(Debug)]
pub enum HelpPhase {
    ToStaging,
    ToHelpPoint,
    Settle(Timer),
    Seek,
    Approach { target: Entity },
    Strike { target: Entity, delay: Timer },
    Recover(Timer),
    Return,
}

fn spawn_npc(tunables: Res<Tunables>, mut commands: Commands) {
    commands.spawn((
        Name::new("NpcHelper"),
        NpcHelper,
        crate::plugins::director::SessionSpawned,
        Sprite {
            color: Color::srgb(0.35, 0.6, 0.95),
            custom_size: Some(Vec2::splat(24.0)),
            ..default()
        },
        Transform::from_translation(tunables.npc.staging_pos.extend(1.0)),
    ));
}

/// Move straight toward `dest`, facing travel. Returns true on arrival.
fn move_towards(tf: &mut Transform, dest: Vec2, step: f32) -> bool {
    let pos = tf.translation.truncate();
    let to_dest = dest - pos;
    let dist = to_dest.length();

    if dist <= step.max(0.5) {
        tf.translation.x = dest.x;
        tf.translation.y = dest.y;
        return true;
    }

    let dir = to_dest / dist;
    tf.translation += (dir * step).extend(0.0);
    tf.rotation = Quat::from_rotation_z(dir.to_angle());
    false
}

/// Idle helpers keep an eye on the player.
pub fn npc_face_player(
    time: Res<Time>,
    q_player: Query<&Transform, (With<Player>, Without<NpcHelper>)>,
    mut q: Query<&mut Transform, (With<NpcHelper>, Without<HelpRoutine>, Without<Player>)>,
) {
    let Ok(player_tf) = q_player.single() else {
        return;
    };
    let target = player_tf.translation.truncate();

    for mut tf in &mut q {
        let to_player = target - tf.translation.truncate();
        if to_player.length_squared() > f32::EPSILON {
            let desired = Quat::from_rotation_z(to_player.to_angle());
            let alpha = (5.0 * time.delta_secs()).min(1.0);
            tf.rotation = tf.rotation.slerp(desired, alpha);
        }
    }
}

/// Start the routine on the first `NpcHelp` bus event.
pub fn npc_help_trigger(
    mut bus: MessageReader<DirectorEvent>,
    mut commands: Commands,
    q: Query<Entity, (With<NpcHelper>, Without<HelpRoutine>)>,
) {
    for msg in bus.read() {
        if *msg != DirectorEvent::NpcHelp {
            continue;
        }
        for entity in &q {
            commands
                .entity(entity)
                .insert(HelpRoutine { kills: 0, phase: HelpPhase::ToStaging });
        }
    }
}

fn nearest_enemy(pos: Vec2, enemies: &Query<(Entity, &Transform), With<Enemy>>) -> Option<Entity> {
    enemies
        .iter()
        .min_by(|(_, a), (_, b)| {
            let da = a.translation.truncate().distance_squared(pos);
            let db = b.translation.truncate().distance_squared(pos);
            da.total_cmp(&db)
        })
        .map(|(e, _)| e)
}

fn enemy_pos(
    target: Entity,
    enemies: &Query<(Entity, &Transform), With<Enemy>>,
) -> Option<Vec2> {
    enemies.get(target).ok().map(|(_, tf)| tf.translation.truncate())
}

fn seek_next(routine: &mut HelpRoutine, pos: Vec2, t: &NpcTunables, enemies: &Query<(Entity, &Transform), With<Enemy>>) {
    if routine.kills >= t.max_kills {
        routine.phase = HelpPhase::Return;
        return;
    }
    match nearest_enemy(pos, enemies) {
        Some(target) => routine.phase = HelpPhase::Approach { target },
        // Nobody left to fight; head home early.
        None => routine.phase = HelpPhase::Return,
    }
}

/// Step the help routine.
pub fn npc_help_tick(
    time: Res<Time>,
    tunables: Res<Tunables>,
    mut commands: Commands,
    q_enemies: Query<(Entity, &Transform), With<Enemy>>,
    q_health: Query<&Health>,
    mut q: Query<(Entity, &mut Transform, &mut HelpRoutine), (With<NpcHelper>, Without<Enemy>)>,
    mut damage: MessageWriter<DamageRequest>,
) {
    let t = &tunables.npc;
    let dt = time.delta_secs();
    let step = t.move_speed * dt;

    for (entity, mut tf, mut routine) in &mut q {
        let pos = tf.translation.truncate();
        match &mut routine.phase {
            HelpPhase::ToStaging => {
                if move_towards(&mut tf, t.staging_pos, step) {
                    routine.phase = HelpPhase::ToHelpPoint;
                }
            }
            HelpPhase::ToHelpPoint => {
                if move_towards(&mut tf, t.help_pos, step) {
                    routine.phase =
                        HelpPhase::Settle(Timer::from_seconds(t.settle_delay, TimerMode::Once));
                }
            }
            HelpPhase::Settle(timer) => {
                timer.tick(time.delta());
                if timer.is_finished() {
                    seek_next(&mut routine, pos, t, &q_enemies);
                }
            }
            HelpPhase::Seek => {
                seek_next(&mut routine, pos, t, &q_enemies);
            }
            HelpPhase::Approach { target } => {
                let target = *target;
                let Some(target_pos) = enemy_pos(target, &q_enemies) else {
                    // Target died on the way; pick another.
                    routine.phase = HelpPhase::Seek;
                    continue;
                };
                let melee_spot = target_pos + Vec2::X * t.melee_range;
                if move_towards(&mut tf, melee_spot, step) {
                    routine.phase = HelpPhase::Strike {
                        target,
                        delay: Timer::from_seconds(t.strike_delay, TimerMode::Once),
                    };
                }
            }
            HelpPhase::Strike { target, delay } => {
                let target = *target;
                delay.tick(time.delta());
                if !delay.is_finished() {
                    continue;
                }
                if let Ok(health) = q_health.get(target) {
                    // Lethal by construction: damage equals remaining health.
                    damage.write(DamageRequest {
                        target,
                        amount: health.current(),
                        source: DamageSource::NpcHelper,
                    });
                    routine.kills += 1;
                }
                routine.phase =
                    HelpPhase::Recover(Timer::from_seconds(t.settle_delay * 2.0, TimerMode::Once));
            }
            HelpPhase::Recover(timer) => {
                timer.tick(time.delta());
                if timer.is_finished() {
                    routine.phase = HelpPhase::Seek;
                }
            }
            HelpPhase::Return => {
                if move_towards(&mut tf, t.staging_pos, step) {
                    commands.entity(entity).remove::<HelpRoutine>();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests;
