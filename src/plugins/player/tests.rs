use avian2d::prelude::*;
use bevy::prelude::*;

use crate::common::test_utils::run_system_once;
use crate::common::tunables::Tunables;
use crate::plugins::health::Health;

#[test]
fn spawn_creates_player_with_health() {
    let mut world = World::new();
    world.insert_resource(Tunables::default());
    run_system_once(&mut world, super::spawn);

    let (_, health) = world
        .query::<(&super::Player, &Health)>()
        .iter(&world)
        .next()
        .expect("player spawned");
    assert_eq!(health.current(), Tunables::default().player_max_health);
}

#[test]
fn melee_sweep_hits_everything_in_reach() {
    use bevy::ecs::message::Messages;
    use crate::common::test_utils::set_time_delta;
    use crate::plugins::enemies::Enemy;
    use crate::plugins::health::{DamageRequest, DamageSource};

    let mut world = World::new();
    world.insert_resource(Tunables::default());
    world.insert_resource(super::MeleeState::default());
    world.insert_resource(super::PlayerInput { move_axis: Vec2::ZERO, attack: true });
    world.init_resource::<Messages<DamageRequest>>();
    set_time_delta(&mut world, 0.1);

    world.spawn((super::Player, Transform::from_xyz(0.0, 0.0, 1.0)));
    let near = world.spawn((Enemy, Transform::from_xyz(40.0, 0.0, 1.0))).id();
    world.spawn((Enemy, Transform::from_xyz(200.0, 0.0, 1.0)));

    run_system_once(&mut world, super::melee_sweep);

    let hits: Vec<DamageRequest> =
        world.resource_mut::<Messages<DamageRequest>>().drain().collect();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].target, near);
    assert_eq!(hits[0].source, DamageSource::Player);

    // Cooldown blocks an immediate second sweep.
    run_system_once(&mut world, super::melee_sweep);
    assert!(world.resource_mut::<Messages<DamageRequest>>().drain().next().is_none());
}

#[test]
fn apply_movement_sets_velocity() {
    let mut world = World::new();
    let mut tunables = Tunables::default();
    tunables.player_speed = 100.0;
    world.insert_resource(tunables);
    world.insert_resource(super::PlayerInput { move_axis: Vec2::new(1.0, 0.0) });
    world.spawn((super::Player, LinearVelocity::ZERO));

    run_system_once(&mut world, super::apply_movement);

    let v = world.query::<&LinearVelocity>().iter(&world).next().unwrap();
    assert_eq!(v.0, Vec2::new(100.0, 0.0));
}
