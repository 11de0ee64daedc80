//! Health plugin: generic damage/death tracking for any combatant.
//!
//! Damage is a producer → queue → single-consumer pipeline:
//! - producers (melee strikes, fireballs, the NPC helper) enqueue
//!   `DamageRequest` messages and never touch `Health` directly;
//! - `apply_damage` is the only writer. It clamps, records the hit source,
//!   and re-broadcasts the applied facts as `Damaged` / `Died` messages.
//!
//! `Died` is published at most once per entity: a request against an entity
//! whose health already reached zero is dropped.

use bevy::prelude::*;

pub fn plugin(app: &mut App) {
    app.add_message::<DamageRequest>();
    app.add_message::<Damaged>();
    app.add_message::<Died>();
    app.add_systems(Update, apply_damage);
}

/// Where a hit came from. `NpcHelper` is the sentinel excluded from the
/// fast-clear streak.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageSource {
    Player,
    Enemy,
    Fireball,
    NpcHelper,
}

/// Intent to damage an entity. Consumed by `apply_damage`.
#[derive(Message, Debug, Clone, Copy)]
pub struct DamageRequest {
    pub target: Entity,
    pub amount: i32,
    pub source: DamageSource,
}

/// A hit that was actually applied.
#[derive(Message, Debug, Clone, Copy)]
pub struct Damaged {
    pub entity: Entity,
    pub amount: i32,
    pub source: DamageSource,
    pub remaining: i32,
}

/// Health crossed to zero. Fires exactly once per entity.
#[derive(Message, Debug, Clone, Copy)]
pub struct Died {
    pub entity: Entity,
    pub source: DamageSource,
}

/// Hit points with an enforced `0 <= current <= max` invariant.
#[derive(Component, Debug, Clone)]
pub struct Health {
    current: i32,
    max: i32,
    pub invincible: bool,
    last_hit: Option<DamageSource>,
}

impl Health {
    pub fn new(max: i32) -> Self {
        let max = max.max(1);
        Self { current: max, max, invincible: false, last_hit: None }
    }

    #[inline]
    pub fn current(&self) -> i32 {
        self.current
    }

    #[inline]
    pub fn max(&self) -> i32 {
        self.max
    }

    #[inline]
    pub fn is_dead(&self) -> bool {
        self.current == 0
    }

    /// Source of the most recent applied hit.
    pub fn last_hit(&self) -> Option<DamageSource> {
        self.last_hit
    }

    pub fn heal(&mut self, amount: i32) {
        self.current = (self.current + amount.max(0)).min(self.max);
    }

    /// Growth stage changes reset current to the new maximum.
    pub fn set_max(&mut self, max: i32) {
        self.max = max.max(1);
        self.current = self.max;
    }

    /// Apply a hit. Returns `true` when this hit is lethal.
    fn apply(&mut self, amount: i32, source: DamageSource) -> bool {
        self.last_hit = Some(source);
        self.current = (self.current - amount.max(0)).max(0);
        self.current == 0
    }
}

/// Single writer for all health mutation.
pub fn apply_damage(
    mut requests: MessageReader<DamageRequest>,
    mut q: Query<&mut Health>,
    mut damaged: MessageWriter<Damaged>,
    mut died: MessageWriter<Died>,
) {
    for req in requests.read() {
        let Ok(mut health) = q.get_mut(req.target) else {
            // Target despawned or never a combatant; nothing to do.
            continue;
        };

        if health.invincible || health.is_dead() {
            continue;
        }

        let lethal = health.apply(req.amount, req.source);
        damaged.write(Damaged {
            entity: req.target,
            amount: req.amount,
            source: req.source,
            remaining: health.current(),
        });

        if lethal {
            died.write(Died { entity: req.target, source: req.source });
        }
    }
}
