//! HUD plugin (render-only): score/time readout, dialogue box, state banners.

use bevy::prelude::*;
use bevy::state::state_scoped::DespawnOnExit;

use crate::common::state::GameState;
use crate::plugins::director::Session;
use crate::plugins::npc::dialogue::ActiveDialogue;

#[derive(Component)]
struct ScoreReadout;

#[derive(Component)]
struct ClockReadout;

#[derive(Component)]
struct DialogueReadout;

pub fn plugin(app: &mut App) {
    app.add_systems(OnEnter(GameState::Staging), staging_banner);
    app.add_systems(OnEnter(GameState::InGame), spawn_readouts);
    app.add_systems(OnEnter(GameState::Results), results_banner);
    app.add_systems(
        Update,
        (update_readouts, update_dialogue).run_if(in_state(GameState::InGame)),
    );
}

fn text_style() -> (TextFont, TextColor) {
    (TextFont { font_size: 18.0, ..default() }, TextColor(Color::WHITE))
}

fn staging_banner(mut commands: Commands) {
    let (font, color) = text_style();
    commands.spawn((
        Text::new("Press Enter to start"),
        font,
        color,
        Node {
            position_type: PositionType::Absolute,
            top: Val::Percent(45.0),
            left: Val::Percent(40.0),
            ..default()
        },
        DespawnOnExit(GameState::Staging),
    ));
}

fn spawn_readouts(mut commands: Commands) {
    let (font, color) = text_style();
    commands.spawn((
        ScoreReadout,
        Text::new("Score: 0"),
        font,
        color,
        Node {
            position_type: PositionType::Absolute,
            top: Val::Px(8.0),
            left: Val::Px(8.0),
            ..default()
        },
        DespawnOnExit(GameState::InGame),
    ));
    let (font, color) = text_style();
    commands.spawn((
        ClockReadout,
        Text::new("Time: 0"),
        font,
        color,
        Node {
            position_type: PositionType::Absolute,
            top: Val::Px(8.0),
            right: Val::Px(8.0),
            ..default()
        },
        DespawnOnExit(GameState::InGame),
    ));
    let (font, color) = text_style();
    commands.spawn((
        DialogueReadout,
        Text::new(""),
        font,
        color,
        Node {
            position_type: PositionType::Absolute,
            bottom: Val::Px(24.0),
            left: Val::Percent(25.0),
            ..default()
        },
        DespawnOnExit(GameState::InGame),
    ));
}

fn update_readouts(
    session: Res<Session>,
    mut q_score: Query<&mut Text, (With<ScoreReadout>, Without<ClockReadout>)>,
    mut q_clock: Query<&mut Text, (With<ClockReadout>, Without<ScoreReadout>)>,
) {
    if let Ok(mut text) = q_score.single_mut() {
        *text = Text::new(format!("Score: {} / {}", session.score, session.target));
    }
    if let Ok(mut text) = q_clock.single_mut() {
        *text = Text::new(format!("Time: {:.0}", session.remaining_secs()));
    }
}

fn update_dialogue(
    active: Res<ActiveDialogue>,
    mut q: Query<&mut Text, (With<DialogueReadout>, Without<ScoreReadout>, Without<ClockReadout>)>,
) {
    let Ok(mut text) = q.single_mut() else {
        return;
    };
    *text = Text::new(active.text.unwrap_or(""));
}

fn results_banner(session: Res<Session>, mut commands: Commands) {
    let line = match session.outcome {
        Some(true) => "Victory! Press Enter to play again",
        Some(false) => "Overrun... Press Enter to retry",
        None => "Press Enter to play again",
    };
    let (font, color) = text_style();
    commands.spawn((
        Text::new(line),
        font,
        color,
        Node {
            position_type: PositionType::Absolute,
            top: Val::Percent(45.0),
            left: Val::Percent(35.0),
            ..default()
        },
        DespawnOnExit(GameState::Results),
    ));
}
