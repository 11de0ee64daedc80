//! Enemies plugin: the per-enemy behavior state machine and staged growth.
//!
//! An enemy is `Enemy` (combat-roster marker) + `Fsm` + `Health` + `Growth`.
//! The FSM runs distance-threshold behavior against the player; suspending
//! sub-routines (attack wind-up, hit stun, cooldown) are components holding
//! timers, inserted on entry and removed on completion or cancellation.
//! Growth independently mutates the enemy over time and eventually retires it
//! from combat entirely (see `growth`).
//!
//! Ordering within one tick: behavior systems run chained and before the
//! damage consumer, so a strike started this tick lands this tick; reaction
//! systems (hit stun, death) run after it, so damage results are visible in
//! the same tick they were applied.

use bevy::prelude::*;

use crate::common::state::GameState;

pub mod fsm;
pub mod growth;

/// Combat-roster marker. Removed on death and on entering the final form, so
/// roster queries (wave clearing, NPC targeting, help threshold) only ever
/// see live combatants.
#[derive(Component, Debug, Clone, Copy)]
pub struct Enemy;

/// The sprite tint to restore after hit flashes and stage changes.
#[derive(Component, Debug, Clone, Copy)]
pub struct BaseTint(pub Color);

pub fn plugin(app: &mut App) {
    app.add_systems(
        Update,
        (
            fsm::fsm_tick,
            fsm::attack_task_tick,
            fsm::attack_cooldown_tick,
            fsm::hit_stun_tick,
            growth::growth_tick,
            growth::final_approach,
        )
            .chain()
            .before(crate::plugins::health::apply_damage)
            .run_if(in_state(GameState::InGame)),
    );

    app.add_systems(
        Update,
        (fsm::enemy_hit_reactions, fsm::enemy_death, fsm::corpse_cleanup)
            .chain()
            .after(crate::plugins::health::apply_damage)
            .run_if(in_state(GameState::InGame)),
    );
}
