//! Staged enemy growth.
//!
//! Each stage except the last waits a uniform-random duration, then advances:
//! bigger scale, new tint, higher max health (current resets to full), longer
//! reach. Reaching the last stage is permanent: the enemy stops being a
//! combatant (FSM, health and roster marker are detached, collision cleared),
//! claims a final slot from the director's reservation table, walks there,
//! and parks facing the player.

use avian2d::prelude::*;
use bevy::prelude::*;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::common::rng::GameRng;
use crate::common::tunables::{GrowthStage, Tunables};
use crate::plugins::director::{DirectorEvent, FinalSlots};
use crate::plugins::health::Health;
use crate::plugins::player::Player;

use super::fsm::{neutral_layers, ActiveAttack, AttackCooldown, Fsm, HitStun};
use super::{BaseTint, Enemy};

/// Index of the stage whose first appearance is announced on the bus.
const MID_STAGE: usize = 2;

#[derive(Component, Debug)]
pub struct Growth {
    pub stage: usize,
    pub timer: Timer,
}

impl Growth {
    /// Start at stage 0 with a rolled duration.
    pub fn new(rng: &mut ChaCha8Rng, stages: &[GrowthStage]) -> Self {
        let (lo, hi) = stages.first().map(|s| s.duration).unwrap_or((1.0, 1.0));
        Self {
            stage: 0,
            timer: Timer::from_seconds(rng.gen_range(lo..=hi), TimerMode::Once),
        }
    }
}

/// Terminal-form record. `arrived` flips once and never back.
#[derive(Component, Debug)]
pub struct FinalForm {
    pub slot: Option<usize>,
    pub target: Option<Vec2>,
    pub arrived: bool,
}

/// Advance growth timers; stage index only ever increases.
pub fn growth_tick(
    time: Res<Time>,
    tunables: Res<Tunables>,
    mut rng: ResMut<GameRng>,
    mut commands: Commands,
    mut slots: ResMut<FinalSlots>,
    mut bus: MessageWriter<DirectorEvent>,
    mut q: Query<
        (
            Entity,
            &mut Growth,
            &mut Transform,
            &mut Sprite,
            &mut BaseTint,
            &mut Health,
            &mut Fsm,
            &mut CollisionLayers,
        ),
        With<Enemy>,
    >,
) {
    let stages = &tunables.growth.stages;

    for (entity, mut growth, mut tf, mut sprite, mut tint, mut health, mut fsm, mut layers) in &mut q {
        growth.timer.tick(time.delta());
        if !growth.timer.is_finished() {
            continue;
        }

        let next = growth.stage + 1;
        if next >= stages.len() {
            continue;
        }
        growth.stage = next;

        let stage = &stages[next];
        tf.scale = Vec3::splat(stage.scale);
        sprite.color = stage.tint;
        tint.0 = stage.tint;

        if next + 1 == stages.len() {
            enter_final_stage(entity, &mut commands, &mut slots, &mut bus, &mut layers);
        } else {
            health.set_max(stage.max_health);
            fsm.attack_range = stage.attack_range;
            let (lo, hi) = stage.duration;
            growth.timer = Timer::from_seconds(rng.0.gen_range(lo..=hi), TimerMode::Once);

            if next == MID_STAGE {
                bus.write(DirectorEvent::MidStageAppeared);
            }
        }
    }
}

/// Retire the enemy from combat and claim a parking slot.
fn enter_final_stage(
    entity: Entity,
    commands: &mut Commands,
    slots: &mut FinalSlots,
    bus: &mut MessageWriter<DirectorEvent>,
    layers: &mut CollisionLayers,
) {
    bus.write(DirectorEvent::FinalFormAppeared);
    *layers = neutral_layers();
    commands
        .entity(entity)
        .remove::<(Fsm, Health, Enemy, Growth, ActiveAttack, AttackCooldown, HitStun)>();

    match slots.claim(entity) {
        Some((slot, pos)) => {
            commands.entity(entity).insert(FinalForm {
                slot: Some(slot),
                target: Some(pos),
                arrived: false,
            });
        }
        None => {
            warn!("final form has no free slot; parking in place");
            commands.entity(entity).insert(FinalForm { slot: None, target: None, arrived: false });
        }
    }
}

/// Walk claimed finalists to their slot; parked ones track the player.
pub fn final_approach(
    time: Res<Time>,
    tunables: Res<Tunables>,
    q_player: Query<&Transform, (With<Player>, Without<FinalForm>)>,
    mut q: Query<(&mut Transform, &mut FinalForm), Without<Player>>,
) {
    let dt = time.delta_secs();
    let g = &tunables.growth;
    let player_pos = q_player.single().ok().map(|tf| tf.translation.truncate());

    for (mut tf, mut form) in &mut q {
        if !form.arrived {
            let Some(target) = form.target else { continue };

            let pos = tf.translation.truncate();
            let to_target = target - pos;
            let dist = to_target.length();

            if dist < g.arrive_epsilon {
                tf.translation.x = target.x;
                tf.translation.y = target.y;
                form.arrived = true;
                continue;
            }

            let dir = to_target / dist;
            let step = (g.approach_speed * dt).min(dist);
            tf.translation += (dir * step).extend(0.0);
            tf.rotation = Quat::from_rotation_z(dir.to_angle());
        } else if let Some(target) = player_pos {
            let to_player = target - tf.translation.truncate();
            if to_player.length_squared() > f32::EPSILON {
                let desired = Quat::from_rotation_z(to_player.to_angle());
                let alpha = (g.face_player_rate * dt).min(1.0);
                tf.rotation = tf.rotation.slerp(desired, alpha);
            }
        }
    }
}
