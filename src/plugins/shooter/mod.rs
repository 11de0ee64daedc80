//! Interference enemy: a stationary ranged attacker deployed at scripted
//! time checkpoints.
//!
//! It faces the player and, on a randomized interval, launches a fireball at
//! the player's current position. The projectile crosses the chord at a
//! fixed speed while its height descends linearly from the launch height to
//! the ground; a ground impact marker at the target point scales up with
//! travel progress. Passing close enough to the player while low enough
//! applies damage and ends the flight early.
//!
//! The shooter is session-tracked but not a combat-roster enemy and carries
//! no health; it cannot be attacked.

use bevy::prelude::*;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::common::rng::GameRng;
use crate::common::state::GameState;
use crate::common::tunables::Tunables;
use crate::plugins::director::{DirectorEvent, SessionSpawned};
use crate::plugins::health::{DamageRequest, DamageSource};
use crate::plugins::player::Player;

pub fn plugin(app: &mut App) {
    app.add_systems(
        Update,
        (shooter_tick, fireball_flight)
            .chain()
            .before(crate::plugins::health::apply_damage)
            .run_if(in_state(GameState::InGame)),
    );
}

#[derive(Component, Debug)]
pub struct FireballShooter {
    pub fire: Timer,
}

/// In-flight projectile. `height` is the scalar vertical offset above the
/// world plane; the flight ends at `total` traveled distance.
#[derive(Component, Debug)]
pub struct Fireball {
    pub dir: Vec2,
    pub traveled: f32,
    pub total: f32,
    pub height: f32,
    pub marker: Entity,
}

/// Ground marker at the predicted impact point.
#[derive(Component, Debug)]
pub struct ImpactMarker;

fn roll_interval(rng: &mut ChaCha8Rng, tunables: &Tunables) -> Timer {
    let s = &tunables.shooter;
    Timer::from_seconds(
        rng.gen_range(s.min_fire_interval..=s.max_fire_interval),
        TimerMode::Once,
    )
}

pub fn spawn_shooter(
    commands: &mut Commands,
    rng: &mut ChaCha8Rng,
    tunables: &Tunables,
    pos: Vec2,
) -> Entity {
    let e = commands
        .spawn((
            Name::new("FireballShooter"),
            FireballShooter { fire: roll_interval(rng, tunables) },
            SessionSpawned,
            Sprite {
                color: Color::srgb(0.9, 0.5, 0.2),
                custom_size: Some(Vec2::new(22.0, 34.0)),
                ..default()
            },
            Transform::from_translation(pos.extend(1.0)),
        ))
        .id();
    info!(x = pos.x, y = pos.y, "interference shooter deployed");
    e
}

/// Face the player; launch when the interval elapses.
pub fn shooter_tick(
    time: Res<Time>,
    tunables: Res<Tunables>,
    mut commands: Commands,
    mut rng: ResMut<GameRng>,
    q_player: Query<&Transform, (With<Player>, Without<FireballShooter>)>,
    mut q: Query<(&mut Transform, &mut FireballShooter), Without<Player>>,
    mut bus: MessageWriter<DirectorEvent>,
) {
    let s = &tunables.shooter;
    let Ok(player_tf) = q_player.single() else {
        // No target; hold fire.
        return;
    };
    let target = player_tf.translation.truncate();

    for (mut tf, mut shooter) in &mut q {
        let origin = tf.translation.truncate();
        let to_target = target - origin;
        if to_target.length_squared() > f32::EPSILON {
            tf.rotation = Quat::from_rotation_z(to_target.to_angle());
        }

        shooter.fire.tick(time.delta());
        if !shooter.fire.is_finished() {
            continue;
        }
        shooter.fire = roll_interval(&mut rng.0, &tunables);

        let total = to_target.length();
        if total <= f32::EPSILON {
            continue;
        }
        let dir = to_target / total;

        let marker = commands
            .spawn((
                Name::new("ImpactMarker"),
                ImpactMarker,
                SessionSpawned,
                Sprite {
                    color: Color::srgba(0.95, 0.4, 0.1, 0.5),
                    custom_size: Some(Vec2::splat(28.0)),
                    ..default()
                },
                Transform::from_translation(target.extend(0.2))
                    .with_scale(Vec3::splat(s.marker_min_scale)),
            ))
            .id();

        commands.spawn((
            Name::new("Fireball"),
            Fireball { dir, traveled: 0.0, total, height: s.launch_height, marker },
            SessionSpawned,
            Sprite {
                color: Color::srgb(1.0, 0.55, 0.15),
                custom_size: Some(Vec2::splat(12.0)),
                ..default()
            },
            Transform::from_translation(origin.extend(2.0)),
        ));

        bus.write(DirectorEvent::FireballLaunched);
    }
}

/// Advance fireballs, grow their impact markers, and resolve hits.
pub fn fireball_flight(
    time: Res<Time>,
    tunables: Res<Tunables>,
    mut commands: Commands,
    q_player: Query<(Entity, &Transform), (With<Player>, Without<Fireball>)>,
    mut q: Query<(Entity, &mut Transform, &mut Fireball), Without<Player>>,
    mut q_markers: Query<
        &mut Transform,
        (With<ImpactMarker>, Without<Fireball>, Without<Player>),
    >,
    mut damage: MessageWriter<DamageRequest>,
) {
    let s = &tunables.shooter;
    let dt = time.delta_secs();
    let player = q_player.single().ok().map(|(e, tf)| (e, tf.translation.truncate()));

    for (entity, mut tf, mut ball) in &mut q {
        let step = s.projectile_speed * dt;
        ball.traveled += step;
        tf.translation += (ball.dir * step).extend(0.0);

        let progress = (ball.traveled / ball.total).clamp(0.0, 1.0);
        ball.height = s.launch_height * (1.0 - progress);

        if let Ok(mut marker_tf) = q_markers.get_mut(ball.marker) {
            let scale = s.marker_min_scale + (s.marker_max_scale - s.marker_min_scale) * progress;
            marker_tf.scale = Vec3::splat(scale);
        }

        if let Some((player_entity, player_pos)) = player {
            let close = tf.translation.truncate().distance(player_pos) <= s.hit_radius;
            if close && ball.height <= s.player_height {
                damage.write(DamageRequest {
                    target: player_entity,
                    amount: s.damage,
                    source: DamageSource::Fireball,
                });
                commands.entity(entity).despawn();
                commands.entity(ball.marker).despawn();
                continue;
            }
        }

        if ball.traveled >= ball.total {
            commands.entity(entity).despawn();
            commands.entity(ball.marker).despawn();
        }
    }
}

#[cfg(test)]
mod tests;
