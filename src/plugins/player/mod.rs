//! Player plugin.
//!
//! Pipeline:
//! - Update: sample input, write PlayerInput resource
//! - FixedUpdate: apply velocity to kinematic rigid body
//!
//! The avatar carries a `Health`; hits against it flow through the shared
//! damage pipeline like any combatant's.

use avian2d::prelude::*;
use bevy::prelude::*;
use bevy::state::state_scoped::DespawnOnExit;

use crate::common::{layers::Layer, state::GameState, tunables::Tunables};
use crate::plugins::enemies::Enemy;
use crate::plugins::health::{DamageRequest, DamageSource, Health};

#[derive(Component)]
pub struct Player;

#[derive(Resource, Default, Debug)]
pub struct PlayerInput {
    pub move_axis: Vec2,
    pub attack: bool,
}

/// Cooldown gate for the melee sweep.
#[derive(Resource, Debug)]
pub struct MeleeState {
    pub cooldown: Timer,
}

impl Default for MeleeState {
    fn default() -> Self {
        let mut cooldown = Timer::from_seconds(0.1, TimerMode::Once);
        cooldown.tick(std::time::Duration::from_secs(1));
        Self { cooldown }
    }
}

pub fn plugin(app: &mut App) {
    app.insert_resource(PlayerInput::default())
        .insert_resource(MeleeState::default())
        .add_systems(OnEnter(GameState::InGame), spawn)
        .add_systems(Update, gather_input)
        .add_systems(
            Update,
            melee_sweep
                .after(gather_input)
                .before(crate::plugins::health::apply_damage)
                .run_if(in_state(GameState::InGame)),
        )
        .add_systems(FixedUpdate, apply_movement);
}

fn spawn(tunables: Res<Tunables>, mut commands: Commands) {
    let layers = CollisionLayers::new(
        Layer::Player,
        [Layer::World, Layer::Enemy, Layer::Fireball],
    );

    commands.spawn((
        Name::new("Player"),
        Player,
        Health::new(tunables.player_max_health),
        Sprite {
            color: Color::srgb(0.2, 0.75, 0.9),
            custom_size: Some(Vec2::splat(26.0)),
            ..default()
        },
        Transform::from_xyz(0.0, 0.0, 1.0),
        RigidBody::Kinematic,
        Collider::circle(13.0),
        layers,
        LinearVelocity::ZERO,
        DespawnOnExit(GameState::InGame),
    ));
}

fn gather_input(keys: Res<ButtonInput<KeyCode>>, mut input: ResMut<PlayerInput>) {
    let mut axis = Vec2::ZERO;

    if keys.pressed(KeyCode::KeyW) {
        axis.y += 1.0;
    }
    if keys.pressed(KeyCode::KeyS) {
        axis.y -= 1.0;
    }
    if keys.pressed(KeyCode::KeyA) {
        axis.x -= 1.0;
    }
    if keys.pressed(KeyCode::KeyD) {
        axis.x += 1.0;
    }

    input.move_axis = if axis.length_squared() > 0.0 {
        axis.normalize()
    } else {
        Vec2::ZERO
    };
    input.attack = keys.just_pressed(KeyCode::Space);
}

/// Damage every live enemy within reach, tagged as player-sourced.
pub fn melee_sweep(
    time: Res<Time>,
    tunables: Res<Tunables>,
    input: Res<PlayerInput>,
    mut melee: ResMut<MeleeState>,
    q_player: Query<&Transform, (With<Player>, Without<Enemy>)>,
    q_enemies: Query<(Entity, &Transform), With<Enemy>>,
    mut damage: MessageWriter<DamageRequest>,
) {
    melee.cooldown.tick(time.delta());
    if !input.attack || !melee.cooldown.is_finished() {
        return;
    }
    let Ok(player_tf) = q_player.single() else {
        return;
    };
    let origin = player_tf.translation.truncate();

    for (enemy, tf) in &q_enemies {
        if origin.distance(tf.translation.truncate()) <= tunables.player_attack_range {
            damage.write(DamageRequest {
                target: enemy,
                amount: tunables.player_attack_damage,
                source: DamageSource::Player,
            });
        }
    }

    melee.cooldown = Timer::from_seconds(tunables.player_attack_cooldown, TimerMode::Once);
}

fn apply_movement(
    tunables: Res<Tunables>,
    input: Res<PlayerInput>,
    mut q_player: Query<&mut LinearVelocity, With<Player>>,
) {
    let Ok(mut vel) = q_player.single_mut() else {
        return;
    };
    vel.0 = input.move_axis * tunables.player_speed;
}

#[cfg(test)]
mod tests;
