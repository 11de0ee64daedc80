//! Integration test harness.
//!
//! Keep integration tests headless:
//! - `MinimalPlugins` provides the core ECS runtime.
//! - `StatesPlugin` enables the session state machine.
//! - `TimeUpdateStrategy::ManualDuration` makes every `app.update()` advance
//!   virtual time by a fixed step, so sessions can be fast-forwarded
//!   deterministically.

use std::time::Duration;

use bevy::prelude::*;
use bevy::state::app::StatesPlugin;
use bevy::time::TimeUpdateStrategy;

use rift_arena::common::state::GameState;

/// Simulated seconds per `app.update()`.
pub const TICK: f32 = 0.05;

pub fn app_headless() -> App {
    let mut app = App::new();
    app.add_plugins((MinimalPlugins, StatesPlugin));
    app.insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs_f32(TICK)));
    rift_arena::game::configure_headless(&mut app);
    app
}

/// Flip into the active session and apply the transition.
pub fn enter_in_game(app: &mut App) {
    app.world_mut()
        .resource_mut::<NextState<GameState>>()
        .set(GameState::InGame);
    app.update();
}

/// Step roughly `secs` of simulated time.
pub fn run_secs(app: &mut App, secs: f32) {
    let steps = (secs / TICK).ceil() as u32;
    for _ in 0..steps {
        app.update();
    }
}

pub fn current_state(app: &App) -> GameState {
    *app.world().resource::<State<GameState>>().get()
}
