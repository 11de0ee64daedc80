//! Black holes and the enemies they emit.

use avian2d::prelude::*;
use bevy::prelude::*;
use bevy_firefly::prelude::Occluder2d;
use rand::seq::SliceRandom;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::common::rng::GameRng;
use crate::common::tunables::Tunables;
use crate::plugins::enemies::fsm::{enemy_layers, enter_patrol, Fsm};
use crate::plugins::enemies::growth::Growth;
use crate::plugins::enemies::{BaseTint, Enemy};
use crate::plugins::health::Health;

use super::SessionSpawned;

/// Transient spawn point. Emits its quota at a fixed interval, lingers
/// briefly, then closes.
#[derive(Component, Debug)]
pub struct BlackHole {
    pub spawns_left: u32,
    pub interval: Timer,
    pub linger: Timer,
}

/// Open 2-3 black holes at random positions inside the spawn rectangle.
pub fn spawn_wave(commands: &mut Commands, rng: &mut ChaCha8Rng, tunables: &Tunables) {
    let d = &tunables.director;
    let holes = rng.gen_range(d.holes_per_wave.0..=d.holes_per_wave.1);

    for _ in 0..holes {
        let pos = Vec2::new(
            rng.gen_range(d.spawn_min.x..=d.spawn_max.x),
            rng.gen_range(d.spawn_min.y..=d.spawn_max.y),
        );
        let quota = rng.gen_range(d.enemies_per_hole.0..=d.enemies_per_hole.1);

        commands.spawn((
            Name::new("BlackHole"),
            BlackHole {
                spawns_left: quota,
                interval: Timer::from_seconds(d.spawn_interval, TimerMode::Repeating),
                linger: Timer::from_seconds(d.hole_linger, TimerMode::Once),
            },
            SessionSpawned,
            Sprite {
                color: Color::srgba(0.12, 0.05, 0.22, 0.9),
                custom_size: Some(Vec2::splat(48.0)),
                ..default()
            },
            Transform::from_translation(pos.extend(0.5)),
        ));
    }
    info!(holes, "wave opened");
}

/// Step each hole: emit enemies on the interval, then linger and close.
pub fn black_hole_tick(
    time: Res<Time>,
    tunables: Res<Tunables>,
    mut commands: Commands,
    mut rng: ResMut<GameRng>,
    mut q: Query<(Entity, &Transform, &mut BlackHole)>,
) {
    for (entity, tf, mut hole) in &mut q {
        if hole.spawns_left > 0 {
            hole.interval.tick(time.delta());
            if hole.interval.just_finished() {
                hole.spawns_left -= 1;
                spawn_enemy(&mut commands, &mut rng.0, &tunables, tf.translation.truncate());
            }
        } else {
            hole.linger.tick(time.delta());
            if hole.linger.is_finished() {
                commands.entity(entity).despawn();
            }
        }
    }
}

/// Spawn one enemy of a uniformly-chosen archetype. Hole spawns skip Idle
/// and patrol away immediately.
pub fn spawn_enemy(
    commands: &mut Commands,
    rng: &mut ChaCha8Rng,
    tunables: &Tunables,
    pos: Vec2,
) -> Entity {
    let d = &tunables.director;
    let archetype = d
        .archetypes
        .choose(rng)
        .expect("tunables must configure at least one enemy archetype");
    let stage0 = &tunables.growth.stages[0];

    let mut fsm = Fsm::new(
        &tunables.enemy,
        stage0.attack_range,
        tunables.enemy.move_speed * archetype.speed_factor,
    );
    enter_patrol(&mut fsm, rng, &tunables.enemy);

    commands
        .spawn((
            Name::new(archetype.name),
            Enemy,
            SessionSpawned,
            fsm,
            Health::new(stage0.max_health),
            Growth::new(rng, &tunables.growth.stages),
            BaseTint(stage0.tint),
            Sprite {
                color: stage0.tint,
                custom_size: Some(Vec2::splat(archetype.radius * 2.0)),
                ..default()
            },
            Transform::from_translation(pos.extend(1.0)),
            RigidBody::Kinematic,
            Collider::circle(archetype.radius),
            enemy_layers(),
            Occluder2d::circle(archetype.radius),
        ))
        .id()
}
