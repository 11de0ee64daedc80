#![cfg(test)]

use super::*;
use bevy::ecs::message::Messages;

use crate::common::test_utils::{insert_sim_resources, run_system_once, set_time_delta};

fn sim_world() -> World {
    let mut world = World::new();
    insert_sim_resources(&mut world);
    set_time_delta(&mut world, 0.1);
    world.init_resource::<Messages<DamageRequest>>();
    world.init_resource::<Messages<DirectorEvent>>();
    world
}

fn spawn_player(world: &mut World, pos: Vec2) -> Entity {
    world
        .spawn((Player, Transform::from_translation(pos.extend(1.0))))
        .id()
}

/// Shooter whose first shot is imminent.
fn spawn_ready_shooter(world: &mut World, pos: Vec2) -> Entity {
    world
        .spawn((
            FireballShooter { fire: Timer::from_seconds(0.01, TimerMode::Once) },
            Transform::from_translation(pos.extend(1.0)),
        ))
        .id()
}

fn drain_damage(world: &mut World) -> Vec<DamageRequest> {
    world.resource_mut::<Messages<DamageRequest>>().drain().collect()
}

fn drain_bus(world: &mut World) -> Vec<DirectorEvent> {
    world.resource_mut::<Messages<DirectorEvent>>().drain().collect()
}

#[test]
fn rolled_intervals_stay_inside_the_configured_band() {
    let mut world = sim_world();
    let tunables = world.resource::<Tunables>().clone();
    let mut rng = world.resource_mut::<crate::common::rng::GameRng>();

    for _ in 0..200 {
        let timer = roll_interval(&mut rng.0, &tunables);
        let secs = timer.duration().as_secs_f32();
        assert!(secs >= tunables.shooter.min_fire_interval);
        assert!(secs <= tunables.shooter.max_fire_interval);
    }
}

#[test]
fn shooter_faces_player_and_launches_at_it() {
    let mut world = sim_world();
    let shooter = spawn_ready_shooter(&mut world, Vec2::ZERO);
    spawn_player(&mut world, Vec2::new(100.0, 0.0));

    run_system_once(&mut world, shooter_tick);

    // Launch announced, interval re-rolled.
    assert_eq!(drain_bus(&mut world), vec![DirectorEvent::FireballLaunched]);
    let fire = &world.get::<FireballShooter>(shooter).unwrap().fire;
    assert!(fire.duration().as_secs_f32() >= 10.0);

    // Facing the target.
    let rot = world.get::<Transform>(shooter).unwrap().rotation;
    assert!(rot.angle_between(Quat::from_rotation_z(0.0)) < 1e-4);

    // One projectile headed along +X with a matching impact marker.
    let mut q = world.query::<(&Fireball, &Transform)>();
    let (ball, tf) = q.iter(&world).next().expect("fireball spawned");
    assert!((ball.dir - Vec2::X).length() < 1e-4);
    assert!((ball.total - 100.0).abs() < 1e-3);
    assert_eq!(ball.height, world.resource::<Tunables>().shooter.launch_height);
    assert_eq!(tf.translation.truncate(), Vec2::ZERO);

    let marker_tf = world.get::<Transform>(ball.marker).unwrap();
    assert_eq!(marker_tf.translation.truncate(), Vec2::new(100.0, 0.0));
    let min = world.resource::<Tunables>().shooter.marker_min_scale;
    assert!((marker_tf.scale.x - min).abs() < 1e-4);
}

#[test]
fn shooter_holds_fire_without_a_player() {
    let mut world = sim_world();
    spawn_ready_shooter(&mut world, Vec2::ZERO);

    run_system_once(&mut world, shooter_tick);

    assert!(drain_bus(&mut world).is_empty());
    assert_eq!(world.query::<&Fireball>().iter(&world).count(), 0);
}

#[test]
fn descending_fireball_clips_the_player() {
    let mut world = sim_world();
    let player = spawn_player(&mut world, Vec2::new(60.0, 0.0));
    let s = world.resource::<Tunables>().shooter.clone();

    let marker = world
        .spawn((ImpactMarker, Transform::from_xyz(100.0, 0.0, 0.2)))
        .id();
    let ball = world
        .spawn((
            Fireball { dir: Vec2::X, traveled: 0.0, total: 100.0, height: s.launch_height, marker },
            Transform::from_xyz(0.0, 0.0, 2.0),
        ))
        .id();

    // 200 px/s * 0.1 s = 20 px per tick: 20, 40, then 60 where the player stands.
    run_system_once(&mut world, fireball_flight);
    run_system_once(&mut world, fireball_flight);
    assert!(drain_damage(&mut world).is_empty());

    // Marker grows with progress.
    let scale = world.get::<Transform>(marker).unwrap().scale.x;
    assert!(scale > s.marker_min_scale && scale < s.marker_max_scale);

    run_system_once(&mut world, fireball_flight);

    let hits = drain_damage(&mut world);
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].target, player);
    assert_eq!(hits[0].amount, s.damage);
    assert_eq!(hits[0].source, DamageSource::Fireball);

    // Early hit removes both projectile and marker.
    assert!(world.get_entity(ball).is_err());
    assert!(world.get_entity(marker).is_err());
}

#[test]
fn fireball_expires_at_the_impact_point() {
    let mut world = sim_world();
    spawn_player(&mut world, Vec2::new(1_000.0, 1_000.0));

    let marker = world
        .spawn((ImpactMarker, Transform::from_xyz(100.0, 0.0, 0.2)))
        .id();
    let ball = world
        .spawn((
            Fireball { dir: Vec2::X, traveled: 0.0, total: 100.0, height: 30.0, marker },
            Transform::from_xyz(0.0, 0.0, 2.0),
        ))
        .id();

    for _ in 0..6 {
        run_system_once(&mut world, fireball_flight);
    }

    assert!(drain_damage(&mut world).is_empty());
    assert!(world.get_entity(ball).is_err());
    assert!(world.get_entity(marker).is_err());
}
