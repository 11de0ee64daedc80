//! Lighting plugin (Firefly) (render-only).
//!
//! The player carries a following light; black holes and fireballs get small
//! lights attached when they appear.

use bevy::prelude::*;
use bevy::state::state_scoped::DespawnOnExit;
use bevy_firefly::prelude::*;

use crate::common::state::GameState;
use crate::plugins::director::spawn::BlackHole;
use crate::plugins::player::Player;
use crate::plugins::shooter::Fireball;

#[derive(Component)]
pub struct PlayerLight;

pub fn plugin(app: &mut App) {
    if !app.is_plugin_added::<FireflyPlugin>() {
        app.add_plugins(FireflyPlugin);
    }

    app.add_systems(OnEnter(GameState::InGame), setup)
        .add_systems(Update, (follow_player_light, light_new_spawns));
}

fn setup(mut commands: Commands) {
    commands.spawn((
        Name::new("PlayerLight"),
        PlayerLight,
        PointLight2d {
            color: Color::srgb(1.0, 0.9, 0.75),
            radius: 450.0,
            ..default()
        },
        Transform::from_xyz(0.0, 0.0, 10.0),
        DespawnOnExit(GameState::InGame),
    ));
}

fn follow_player_light(
    q_player: Query<&Transform, (With<Player>, Without<PlayerLight>)>,
    mut q_light: Query<&mut Transform, (With<PlayerLight>, Without<Player>)>,
) {
    let Ok(tf_player) = q_player.single() else {
        return;
    };
    let Ok(mut tf_light) = q_light.single_mut() else {
        return;
    };

    tf_light.translation.x = tf_player.translation.x;
    tf_light.translation.y = tf_player.translation.y;
}

fn light_new_spawns(
    mut commands: Commands,
    q_holes: Query<Entity, Added<BlackHole>>,
    q_fireballs: Query<Entity, Added<Fireball>>,
) {
    for e in &q_holes {
        commands.entity(e).insert(PointLight2d {
            color: Color::srgb(0.55, 0.35, 1.0),
            radius: 140.0,
            ..default()
        });
    }
    for e in &q_fireballs {
        commands.entity(e).insert(PointLight2d {
            color: Color::srgb(1.0, 0.55, 0.2),
            radius: 90.0,
            ..default()
        });
    }
}
