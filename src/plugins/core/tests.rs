use crate::common::rng::GameRng;
use crate::common::tunables::Tunables;
use crate::plugins::core;
use bevy::prelude::*;

#[test]
fn inserts_resources() {
    let mut app = App::new();
    core::plugin(&mut app);
    assert!(app.world().get_resource::<Tunables>().is_some());
    assert!(app.world().get_resource::<GameRng>().is_some());
    assert!(app.world().get_resource::<ClearColor>().is_some());
}

#[test]
fn default_tunables_are_coherent() {
    let t = Tunables::default();

    assert!(t.enemy.min_patrol_distance < t.enemy.max_patrol_distance);
    assert!(t.enemy.attack_range < t.enemy.detection_range);
    assert!(t.enemy.chase_release_factor > 1.0);
    assert!(t.enemy.bounds_min.x < t.enemy.bounds_max.x);

    // Growth stages must end in a terminal stage and never shrink.
    assert!(t.growth.stages.len() >= 2);
    for pair in t.growth.stages.windows(2) {
        assert!(pair[0].scale <= pair[1].scale);
        assert!(pair[0].max_health <= pair[1].max_health);
    }

    assert!(t.director.holes_per_wave.0 <= t.director.holes_per_wave.1);
    assert!(t.director.enemies_per_hole.0 <= t.director.enemies_per_hole.1);
    assert!(!t.director.archetypes.is_empty());
    // Every checkpoint needs a shooter position available.
    assert!(t.director.shooter_positions.len() >= t.director.interference_checkpoints.len());
}

#[test]
fn game_rng_is_deterministic_per_seed() {
    use rand::Rng;

    let mut a = GameRng::seeded(42);
    let mut b = GameRng::seeded(42);
    for _ in 0..100 {
        assert_eq!(a.0.gen_range(0..1_000_000), b.0.gen_range(0..1_000_000));
    }
}
