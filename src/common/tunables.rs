//! Tunable gameplay constants.
//!
//! Everything a designer would reach for lives here: ranges, speeds, timers,
//! wave cadence, growth stages. Distances are in world pixels; the original
//! metric values are scaled by `pixels_per_meter`.

use bevy::prelude::*;

#[derive(Resource, Debug, Clone)]
pub struct Tunables {
    pub pixels_per_meter: f32,
    pub player_speed: f32,
    pub player_max_health: i32,
    /// Reach of the player's melee sweep.
    pub player_attack_range: f32,
    pub player_attack_damage: i32,
    pub player_attack_cooldown: f32,
    pub enemy: EnemyTunables,
    pub growth: GrowthTunables,
    pub shooter: ShooterTunables,
    pub director: DirectorTunables,
    pub npc: NpcTunables,
}

/// Per-enemy state machine tunables.
#[derive(Debug, Clone)]
pub struct EnemyTunables {
    /// Seconds spent in Idle before rolling a new patrol leg.
    pub idle_time: f32,
    pub move_speed: f32,
    /// Turn rate in degrees per second while chasing.
    pub rotation_speed: f32,
    pub min_patrol_distance: f32,
    pub max_patrol_distance: f32,
    /// Axis-aligned movement bounds; leaving them ends the patrol leg.
    pub bounds_min: Vec2,
    pub bounds_max: Vec2,
    pub detection_range: f32,
    pub attack_range: f32,
    /// Chase is dropped beyond `detection_range * chase_release_factor`.
    pub chase_release_factor: f32,
    pub attack_damage: i32,
    pub attack_cooldown: f32,
    pub attack_duration: f32,
    pub attack_windup: f32,
    pub hit_stun: f32,
    /// Delay between death and despawn.
    pub corpse_delay: f32,
}

/// One growth stage. The last configured stage is the terminal "final form".
#[derive(Debug, Clone)]
pub struct GrowthStage {
    pub scale: f32,
    pub max_health: i32,
    pub attack_range: f32,
    /// Uniform-random stage duration range in seconds. Unused on the last stage.
    pub duration: (f32, f32),
    pub tint: Color,
}

#[derive(Debug, Clone)]
pub struct GrowthTunables {
    pub stages: Vec<GrowthStage>,
    /// Straight-line speed toward a claimed final slot.
    pub approach_speed: f32,
    pub arrive_epsilon: f32,
    /// Smoothing factor for facing the player after arrival.
    pub face_player_rate: f32,
}

#[derive(Debug, Clone)]
pub struct ShooterTunables {
    pub min_fire_interval: f32,
    pub max_fire_interval: f32,
    pub projectile_speed: f32,
    pub damage: i32,
    /// Planar distance at which a descending fireball can clip the player.
    pub hit_radius: f32,
    pub launch_height: f32,
    pub player_height: f32,
    pub marker_min_scale: f32,
    pub marker_max_scale: f32,
}

/// One entry in the configured enemy-type set. Wave spawns pick uniformly.
#[derive(Debug, Clone)]
pub struct EnemyArchetype {
    pub name: &'static str,
    pub radius: f32,
    pub speed_factor: f32,
}

#[derive(Debug, Clone)]
pub struct DirectorTunables {
    pub session_duration: f32,
    pub score_target: u32,
    /// Rectangle black holes may open in.
    pub spawn_min: Vec2,
    pub spawn_max: Vec2,
    /// Inclusive range of black holes per wave.
    pub holes_per_wave: (u32, u32),
    /// Inclusive range of enemies each black hole emits.
    pub enemies_per_hole: (u32, u32),
    /// Seconds between enemies emitted by one hole.
    pub spawn_interval: f32,
    /// Seconds a hole lingers after its last spawn.
    pub hole_linger: f32,
    /// Delay between a cleared wave and the next one.
    pub respawn_delay: f32,
    /// Elapsed-time marks at which one interference shooter appears.
    pub interference_checkpoints: Vec<f32>,
    /// Designated shooter positions, drawn without replacement.
    pub shooter_positions: Vec<Vec2>,
    /// Designated final-form parking positions.
    pub final_slots: Vec<Vec2>,
    pub fast_clear_window: f32,
    pub fast_clear_kills: usize,
    /// Live combat-enemy count that summons the NPC helper.
    pub npc_help_threshold: usize,
    pub archetypes: Vec<EnemyArchetype>,
}

#[derive(Debug, Clone)]
pub struct NpcTunables {
    pub staging_pos: Vec2,
    pub help_pos: Vec2,
    pub move_speed: f32,
    pub melee_range: f32,
    /// Wind-up before the helper's lethal strike lands.
    pub strike_delay: f32,
    /// Pause after arriving at the help point and after each kill.
    pub settle_delay: f32,
    pub max_kills: u8,
}

impl Default for Tunables {
    fn default() -> Self {
        Self {
            pixels_per_meter: 20.0,
            player_speed: 200.0,
            player_max_health: 100,
            player_attack_range: 60.0,
            player_attack_damage: 10,
            player_attack_cooldown: 0.4,
            enemy: EnemyTunables {
                idle_time: 2.0,
                move_speed: 40.0,
                rotation_speed: 120.0,
                min_patrol_distance: 60.0,
                max_patrol_distance: 160.0,
                bounds_min: Vec2::splat(-400.0),
                bounds_max: Vec2::splat(400.0),
                detection_range: 160.0,
                attack_range: 40.0,
                chase_release_factor: 1.2,
                attack_damage: 10,
                attack_cooldown: 1.5,
                attack_duration: 0.5,
                attack_windup: 1.0,
                hit_stun: 0.5,
                corpse_delay: 3.0,
            },
            growth: GrowthTunables {
                stages: vec![
                    GrowthStage {
                        scale: 1.0,
                        max_health: 30,
                        attack_range: 40.0,
                        duration: (10.0, 15.0),
                        tint: Color::srgb(0.45, 0.75, 0.45),
                    },
                    GrowthStage {
                        scale: 1.5,
                        max_health: 60,
                        attack_range: 50.0,
                        duration: (20.0, 25.0),
                        tint: Color::srgb(0.85, 0.65, 0.3),
                    },
                    GrowthStage {
                        scale: 2.2,
                        max_health: 100,
                        attack_range: 60.0,
                        duration: (20.0, 25.0),
                        tint: Color::srgb(0.85, 0.35, 0.3),
                    },
                    GrowthStage {
                        scale: 3.0,
                        max_health: 150,
                        attack_range: 60.0,
                        duration: (0.0, 0.0),
                        tint: Color::srgb(0.55, 0.3, 0.75),
                    },
                ],
                approach_speed: 100.0,
                arrive_epsilon: 2.0,
                face_player_rate: 5.0,
            },
            shooter: ShooterTunables {
                min_fire_interval: 10.0,
                max_fire_interval: 15.0,
                projectile_speed: 200.0,
                damage: 20,
                hit_radius: 10.0,
                launch_height: 30.0,
                player_height: 30.0,
                marker_min_scale: 0.3,
                marker_max_scale: 2.0,
            },
            director: DirectorTunables {
                session_duration: 180.0,
                score_target: 50,
                spawn_min: Vec2::splat(-360.0),
                spawn_max: Vec2::splat(360.0),
                holes_per_wave: (2, 3),
                enemies_per_hole: (2, 3),
                spawn_interval: 3.0,
                hole_linger: 2.0,
                respawn_delay: 5.0,
                interference_checkpoints: vec![30.0, 90.0, 150.0],
                shooter_positions: vec![
                    Vec2::new(-350.0, -350.0),
                    Vec2::new(350.0, -350.0),
                    Vec2::new(-350.0, 350.0),
                    Vec2::new(350.0, 350.0),
                ],
                final_slots: vec![
                    Vec2::new(-320.0, 420.0),
                    Vec2::new(-160.0, 420.0),
                    Vec2::new(0.0, 420.0),
                    Vec2::new(160.0, 420.0),
                    Vec2::new(320.0, 420.0),
                ],
                fast_clear_window: 10.0,
                fast_clear_kills: 5,
                npc_help_threshold: 6,
                archetypes: vec![
                    EnemyArchetype { name: "Creeper", radius: 13.0, speed_factor: 1.0 },
                    EnemyArchetype { name: "Prowler", radius: 10.0, speed_factor: 1.25 },
                ],
            },
            npc: NpcTunables {
                staging_pos: Vec2::new(-420.0, -420.0),
                help_pos: Vec2::new(0.0, -200.0),
                move_speed: 100.0,
                melee_range: 40.0,
                strike_delay: 1.0,
                settle_delay: 0.5,
                max_kills: 3,
            },
        }
    }
}
