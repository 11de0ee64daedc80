#![cfg(test)]

use super::dialogue::{dialogue_listener, ActiveDialogue, DialogueBook, DialogueTrigger};
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

/// Collapse travel so phases advance within a few ticks.
fn shrink_npc_distances(world: &mut World) {
    let mut tunables = world.resource_mut::<Tunables>();
    tunables.npc.staging_pos = Vec2::ZERO;
    tunables.npc.help_pos = Vec2::ZERO;
    tunables.npc.move_speed = 1_000.0;
}

fn spawn_helper(world: &mut World, pos: Vec2) -> Entity {
    world
        .spawn((NpcHelper, Transform::from_translation(pos.extend(1.0))))
        .id()
}

fn spawn_enemy(world: &mut World, pos: Vec2, health: i32) -> Entity {
    world
        .spawn((Enemy, Health::new(health), Transform::from_translation(pos.extend(1.0))))
        .id()
}

fn drain_damage(world: &mut World) -> Vec<DamageRequest> {
    world.resource_mut::<Messages<DamageRequest>>().drain().collect()
}

// -----------------------------------------------------------------------------
// Trigger and routine
// -----------------------------------------------------------------------------

#[test]
fn help_event_starts_the_routine() {
    let mut world = sim_world();
    let npc = spawn_helper(&mut world, Vec2::ZERO);

    world.write_message(DirectorEvent::NpcHelp);
    run_system_once(&mut world, npc_help_trigger);

    let routine = world.get::<HelpRoutine>(npc).expect("routine starts");
    assert!(matches!(routine.phase, HelpPhase::ToStaging));
    assert_eq!(routine.kills, 0);

    // Unrelated traffic does not restart anything.
    world.write_message(DirectorEvent::MoreEnemies);
    run_system_once(&mut world, npc_help_trigger);
    assert!(world.get::<HelpRoutine>(npc).is_some());
}

#[test]
fn routine_kills_up_to_three_with_lethal_tagged_strikes() {
    let mut world = sim_world();
    shrink_npc_distances(&mut world);
    let npc = spawn_helper(&mut world, Vec2::ZERO);
    spawn_enemy(&mut world, Vec2::new(10.0, 0.0), 30);
    spawn_enemy(&mut world, Vec2::new(50.0, 0.0), 60);
    world.entity_mut(npc).insert(HelpRoutine { kills: 0, phase: HelpPhase::ToStaging });

    let mut strikes = Vec::new();
    for _ in 0..200 {
        run_system_once(&mut world, npc_help_tick);
        strikes.extend(drain_damage(&mut world));
        if world.get::<HelpRoutine>(npc).is_none() {
            break;
        }
    }

    // Routine finished and returned home.
    assert!(world.get::<HelpRoutine>(npc).is_none());
    assert_eq!(
        world.get::<Transform>(npc).unwrap().translation.truncate(),
        Vec2::ZERO
    );

    // Exactly three strikes, each lethal by construction and NPC-tagged.
    assert_eq!(strikes.len(), 3);
    for hit in &strikes {
        assert_eq!(hit.source, DamageSource::NpcHelper);
        assert!(hit.amount == 30 || hit.amount == 60);
    }
}

#[test]
fn routine_ends_early_with_no_targets() {
    let mut world = sim_world();
    shrink_npc_distances(&mut world);
    let npc = spawn_helper(&mut world, Vec2::ZERO);
    world.entity_mut(npc).insert(HelpRoutine { kills: 0, phase: HelpPhase::Seek });

    for _ in 0..10 {
        run_system_once(&mut world, npc_help_tick);
        if world.get::<HelpRoutine>(npc).is_none() {
            break;
        }
    }

    assert!(world.get::<HelpRoutine>(npc).is_none());
    assert!(drain_damage(&mut world).is_empty());
}

#[test]
fn approach_retargets_when_the_victim_disappears() {
    let mut world = sim_world();
    shrink_npc_distances(&mut world);
    let npc = spawn_helper(&mut world, Vec2::ZERO);
    let gone = spawn_enemy(&mut world, Vec2::new(10.0, 0.0), 30);
    world
        .entity_mut(npc)
        .insert(HelpRoutine { kills: 0, phase: HelpPhase::Approach { target: gone } });
    world.despawn(gone);

    run_system_once(&mut world, npc_help_tick);
    let routine = world.get::<HelpRoutine>(npc).unwrap();
    assert!(matches!(routine.phase, HelpPhase::Seek));
}

// -----------------------------------------------------------------------------
// Dialogue
// -----------------------------------------------------------------------------

#[test]
fn one_shot_lines_fire_once_repeatable_lines_again() {
    let mut book = DialogueBook::default();

    assert!(book.take(DialogueTrigger::FirstKill).is_some());
    assert!(book.take(DialogueTrigger::FirstKill).is_none());

    assert!(book.take(DialogueTrigger::FastClear).is_some());
    assert!(book.take(DialogueTrigger::FastClear).is_some());

    book.reset();
    assert!(book.take(DialogueTrigger::FirstKill).is_some());
}

#[test]
fn listener_maps_first_kill_only() {
    let mut world = sim_world();
    world.insert_resource(DialogueBook::default());
    world.insert_resource(ActiveDialogue::default());

    world.write_message(DirectorEvent::EnemyKilled { kill_count: 1 });
    run_system_once(&mut world, dialogue_listener);
    assert!(world.resource::<ActiveDialogue>().text.is_some());

    // Clear and feed a later kill: no new line.
    world.resource_mut::<Messages<DirectorEvent>>().clear();
    world.resource_mut::<ActiveDialogue>().text = None;

    world.write_message(DirectorEvent::EnemyKilled { kill_count: 2 });
    run_system_once(&mut world, dialogue_listener);
    assert!(world.resource::<ActiveDialogue>().text.is_none());
}

#[test]
fn active_dialogue_times_out() {
    let mut world = sim_world();
    world.insert_resource(ActiveDialogue {
        text: Some("hello"),
        timer: Timer::from_seconds(0.5, TimerMode::Once),
    });

    run_system_once(&mut world, super::dialogue::dialogue_timeout);
    assert!(world.resource::<ActiveDialogue>().text.is_some());

    set_time_delta(&mut world, 1.0);
    run_system_once(&mut world, super::dialogue::dialogue_timeout);
    assert!(world.resource::<ActiveDialogue>().text.is_none());
}
