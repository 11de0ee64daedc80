//! End-to-end session scenarios: win by score, loss by timeout, loss by
//! final-form overrun.

mod common;

use bevy::prelude::*;

use rift_arena::common::state::GameState;
use rift_arena::common::tunables::Tunables;
use rift_arena::plugins::director::{FinalSlots, Session};
use rift_arena::plugins::enemies::Enemy;
use rift_arena::plugins::health::{DamageRequest, DamageSource};

#[test]
fn reaching_the_score_target_wins_exactly_once() {
    let mut app = common::app_headless();
    app.world_mut().resource_mut::<Tunables>().director.score_target = 3;
    common::enter_in_game(&mut app);

    // Keep nuking whatever is alive until the target is reached.
    for _ in 0..2_000 {
        let world = app.world_mut();
        let enemies: Vec<Entity> = world.query_filtered::<Entity, With<Enemy>>().iter(world).collect();
        for target in enemies {
            world.write_message(DamageRequest {
                target,
                amount: 100_000,
                source: DamageSource::Player,
            });
        }
        app.update();

        if !app.world().resource::<Session>().active() {
            break;
        }
    }

    let session = app.world().resource::<Session>();
    assert_eq!(session.outcome, Some(true));
    assert!(session.score >= 3);
    assert_eq!(common::current_state(&app), GameState::Results);
}

#[test]
fn countdown_expiry_without_score_is_a_loss() {
    let mut app = common::app_headless();
    app.world_mut().resource_mut::<Tunables>().director.session_duration = 1.0;
    common::enter_in_game(&mut app);

    common::run_secs(&mut app, 2.0);

    let session = app.world().resource::<Session>();
    assert_eq!(session.outcome, Some(false));
    assert_eq!(common::current_state(&app), GameState::Results);
}

#[test]
fn full_final_slot_table_is_a_loss_by_overrun() {
    let mut app = common::app_headless();
    {
        let mut tunables = app.world_mut().resource_mut::<Tunables>();
        // Grow almost instantly and shrink the parking lot to two slots.
        tunables.director.final_slots.truncate(2);
        for stage in &mut tunables.growth.stages {
            stage.duration = (0.05, 0.06);
        }
    }
    common::enter_in_game(&mut app);

    // Enemies appear at 3 s and hit terminal form fractions of a second later.
    for _ in 0..1_000 {
        app.update();
        if !app.world().resource::<Session>().active() {
            break;
        }
    }

    let session = app.world().resource::<Session>();
    assert_eq!(session.outcome, Some(false));

    let slots = app.world().resource::<FinalSlots>();
    assert_eq!(slots.claimed_count(), slots.total());
    assert_eq!(common::current_state(&app), GameState::Results);
}
