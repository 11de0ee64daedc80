//! Global state machine.
//!
//! A session is inactive in `Staging`, active in `InGame`, and finished in
//! `Results`. Entering `InGame` is the single "start game" transition; the
//! director records the outcome exactly once before moving to `Results`.

use bevy::prelude::*;

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, States, Default)]
pub enum GameState {
    #[default]
    Staging,
    InGame,
    Results,
}
