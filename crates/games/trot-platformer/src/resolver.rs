//! Per-frame movement and collision resolution for the player.
//!
//! Axes are handled separately. Horizontal motion is decided by a
//! non-committing probe ahead of the player; vertical motion is committed
//! and then snapped against whatever solid it ran into. Triggers (runes,
//! the goal) and enemies are classified after both axes settle.

use trot_core::geom::{Bounds, Shape};
use trot_core::input::MoveIntent;

use crate::config::PhysicsConfig;
use crate::enemy::Enemy;
use crate::entity::{EntityKind, HitOutcome};
use crate::objects::LevelObject;
use crate::player::Player;
use crate::tilemap::TileMap;

/// Damage dealt by every hazard and enemy contact.
const CONTACT_DAMAGE: u8 = 1;

/// Read-only level geometry the player collides with.
#[derive(Clone, Copy)]
pub struct World<'a> {
    pub map: &'a TileMap,
    pub objects: &'a [LevelObject],
}

/// Something the player touched this frame. `index` points into
/// `TileMap::tiles` for tiles and into the level's objects otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Contact {
    pub kind: EntityKind,
    pub index: usize,
}

/// How an enemy contact was decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnemyContact {
    /// The player came down on the enemy's head.
    Stomp { enemy: usize, outcome: HitOutcome },
    /// The enemy got the player.
    Struck { enemy: usize, outcome: HitOutcome },
}

/// Everything the resolver decided this frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameReport {
    pub blocked_left: bool,
    pub blocked_right: bool,
    pub landed: bool,
    pub hit_ceiling: bool,
    /// Solids met during the vertical resolve, in test order.
    pub solid_contacts: Vec<Contact>,
    /// Non-solid objects overlapping the player after movement.
    pub triggers: Vec<Contact>,
    /// Strongest hit the player took from a hazard.
    pub hazard_hit: Option<HitOutcome>,
    pub reached_goal: bool,
    pub enemy_contacts: Vec<EnemyContact>,
}

impl<'a> World<'a> {
    pub fn new(map: &'a TileMap, objects: &'a [LevelObject]) -> Self {
        Self { map, objects }
    }

    /// Every solid whose shape overlaps `shape`: blocks first, then tiles.
    fn solids_overlapping(&self, shape: &Shape) -> Vec<(Contact, Bounds)> {
        let mut found = Vec::new();
        for (index, obj) in self.objects.iter().enumerate() {
            if obj.is_solid() && obj.shape.overlaps(shape) {
                found.push((
                    Contact {
                        kind: obj.kind,
                        index,
                    },
                    obj.shape.bounds,
                ));
            }
        }
        for index in self.map.tile_indices_overlapping(&shape.bounds) {
            found.push((
                Contact {
                    kind: EntityKind::Tile,
                    index,
                },
                self.map.tiles()[index].bounds,
            ));
        }
        found
    }

    fn any_solid_overlapping(&self, shape: &Shape) -> bool {
        !self.solids_overlapping(shape).is_empty()
    }

    fn triggers_overlapping(&self, shape: &Shape) -> Vec<Contact> {
        self.objects
            .iter()
            .enumerate()
            .filter(|(_, obj)| !obj.is_solid() && obj.shape.overlaps(shape))
            .map(|(index, obj)| Contact {
                kind: obj.kind,
                index,
            })
            .collect()
    }
}

fn shifted(shape: &Shape, dx: f32, dy: f32) -> Shape {
    Shape {
        bounds: shape.bounds.offset(dx, dy),
        mask: shape.mask.clone(),
    }
}

/// Whether moving the player by `dx` would put it inside a solid. Never
/// moves the player.
pub fn probe_horizontal(player: &Player, world: &World<'_>, dx: f32) -> bool {
    world.any_solid_overlapping(&shifted(&player.state.shape, dx, 0.0))
}

/// Decide this frame's horizontal velocity. Held keys commit a step only if
/// the probe in that direction is clear. A locked player gets no input
/// velocity here; knockback is applied by `take_hit` after this runs.
pub fn commit_horizontal(
    player: &mut Player,
    intent: &MoveIntent,
    world: &World<'_>,
    physics: &PhysicsConfig,
    report: &mut FrameReport,
) {
    player.state.vx = 0.0;
    if !player.state.can_move {
        return;
    }

    let lookahead = physics.probe_distance();
    report.blocked_left = probe_horizontal(player, world, -lookahead);
    report.blocked_right = probe_horizontal(player, world, lookahead);

    if intent.left && !report.blocked_left {
        player.move_left(physics.player_vel);
    }
    if intent.right && !report.blocked_right {
        player.move_right(physics.player_vel);
    }
}

/// Commit vertical motion and snap against solids.
///
/// A contact only counts when the horizontal overlap exceeds
/// `landing_overlap_tolerance`; thinner overlaps are corner clips and are
/// left alone. Falling snaps the feet to the solid's top and lands; rising
/// snaps the head to its bottom and bounces.
pub fn resolve_vertical(
    player: &mut Player,
    world: &World<'_>,
    physics: &PhysicsConfig,
    report: &mut FrameReport,
) {
    let dy = player.state.vy;
    player.bounds_mut().y += dy;

    for (contact, other) in world.solids_overlapping(&player.state.shape) {
        // Earlier snaps in this loop may have moved the player clear.
        if !player.bounds().intersects(&other) {
            continue;
        }
        report.solid_contacts.push(contact);

        if player.bounds().horizontal_overlap(&other) <= physics.landing_overlap_tolerance {
            continue;
        }
        if dy > 0.0 {
            player.bounds_mut().set_bottom(other.top());
            player.land();
            report.landed = true;
        } else if dy < 0.0 {
            player.bounds_mut().set_top(other.bottom());
            player.bounce_off_ceiling();
            report.hit_ceiling = true;
        }
    }

    if player.grounded && !report.landed && dy >= 0.0 && !has_support(player, world, physics) {
        player.leave_ground();
    }
}

/// Whether something solid sits directly under the player's feet.
fn has_support(player: &Player, world: &World<'_>, physics: &PhysicsConfig) -> bool {
    let feet = shifted(&player.state.shape, 0.0, 1.0);
    world
        .solids_overlapping(&feet)
        .iter()
        .any(|(_, other)| feet.bounds.horizontal_overlap(other) > physics.landing_overlap_tolerance)
}

/// Cancel a knockback that would shove the player into a solid.
fn guard_knockback(player: &mut Player, world: &World<'_>) {
    let knock = player.state.vx;
    if knock != 0.0 && probe_horizontal(player, world, knock) {
        player.state.vx = 0.0;
    }
}

/// Apply the effects of every non-solid object the player overlaps after
/// movement. Solids never deal damage and never appear here.
pub fn apply_triggers(
    player: &mut Player,
    world: &World<'_>,
    physics: &PhysicsConfig,
    report: &mut FrameReport,
) {
    if !player.is_alive() {
        return;
    }

    report.triggers = world.triggers_overlapping(&player.state.shape);
    for contact in report.triggers.clone() {
        match contact.kind {
            EntityKind::Hazard => {
                let outcome = player.take_hit(CONTACT_DAMAGE, physics.knockback);
                if outcome != HitOutcome::Ignored {
                    guard_knockback(player, world);
                    report.hazard_hit = Some(outcome);
                }
            },
            EntityKind::Goal => report.reached_goal = true,
            EntityKind::Tile | EntityKind::Block | EntityKind::Player | EntityKind::Enemy => {},
        }
    }
}

/// Player-vs-enemy contact using per-pixel overlap.
///
/// Coming down on an enemy's head (feet within `stomp_tolerance` of its top
/// while moving down) hurts the enemy and bounces the player off its head.
/// Any other contact hurts the player.
pub fn resolve_enemy_contacts(
    player: &mut Player,
    enemies: &mut [Enemy],
    world: &World<'_>,
    physics: &PhysicsConfig,
    report: &mut FrameReport,
) {
    for (index, enemy) in enemies.iter_mut().enumerate() {
        if !player.is_alive() {
            return;
        }
        if !enemy.is_alive() || !player.state.shape.overlaps(&enemy.state.shape) {
            continue;
        }

        let feet_to_head = (player.bounds().bottom() - enemy.bounds().top()).abs();
        if feet_to_head < physics.stomp_tolerance && player.state.vy > 0.0 {
            let outcome = enemy.take_hit(CONTACT_DAMAGE);
            player.bounds_mut().set_bottom(enemy.bounds().top());
            player.state.vy = physics.stomp_bounce;
            player.grounded = false;
            tracing::debug!(enemy = index, ?outcome, "Enemy stomped");
            report.enemy_contacts.push(EnemyContact::Stomp {
                enemy: index,
                outcome,
            });
        } else {
            let outcome = player.take_hit(CONTACT_DAMAGE, physics.knockback);
            if outcome != HitOutcome::Ignored {
                guard_knockback(player, world);
            }
            report.enemy_contacts.push(EnemyContact::Struck {
                enemy: index,
                outcome,
            });
        }
    }
}

/// Run the full resolution pass for one frame, after every entity has
/// ticked.
pub fn resolve_frame(
    player: &mut Player,
    enemies: &mut [Enemy],
    intent: &MoveIntent,
    world: &World<'_>,
    physics: &PhysicsConfig,
) -> FrameReport {
    let mut report = FrameReport::default();
    commit_horizontal(player, intent, world, physics, &mut report);
    resolve_vertical(player, world, physics, &mut report);
    apply_triggers(player, world, physics, &mut report);
    resolve_enemy_contacts(player, enemies, world, physics, &mut report);
    report
}
