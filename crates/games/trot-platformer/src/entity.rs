use serde::{Deserialize, Serialize};

use trot_core::geom::Shape;

/// Tag for everything the resolver can meet. Dispatch is a `match` on this,
/// not a trait object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Player,
    Enemy,
    /// Map terrain.
    Tile,
    /// Free-standing solid object.
    Block,
    /// Rune trap. Damages on touch, never blocks.
    Hazard,
    /// Level exit marker.
    Goal,
}

impl EntityKind {
    /// Whether this kind blocks movement.
    pub fn is_solid(self) -> bool {
        matches!(self, EntityKind::Tile | EntityKind::Block)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Facing {
    Left,
    Right,
}

impl Facing {
    pub fn sign(self) -> f32 {
        match self {
            Facing::Left => -1.0,
            Facing::Right => 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Health {
    pub current: u8,
    pub max: u8,
}

impl Health {
    pub fn new(max: u8) -> Self {
        Self { current: max, max }
    }

    pub fn is_alive(&self) -> bool {
        self.current > 0
    }

    /// Subtract `damage`, flooring at zero. Returns true if this emptied the pool.
    pub fn take_damage(&mut self, damage: u8) -> bool {
        self.current = self.current.saturating_sub(damage);
        self.current == 0
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HitState {
    pub is_hit: bool,
    pub hit_timer: u32,
}

/// What a call to `take_hit` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitOutcome {
    /// Already dead.
    Ignored,
    Damaged,
    Killed,
}

/// State shared by every moving actor.
#[derive(Debug, Clone)]
pub struct EntityState {
    pub shape: Shape,
    pub vx: f32,
    pub vy: f32,
    pub facing: Facing,
    pub health: Health,
    pub hit: HitState,
    pub can_move: bool,
    /// Frames since the current animation started.
    pub anim_frame: u32,
}

impl EntityState {
    pub fn new(shape: Shape, max_health: u8) -> Self {
        Self {
            shape,
            vx: 0.0,
            vy: 0.0,
            facing: Facing::Left,
            health: Health::new(max_health),
            hit: HitState::default(),
            can_move: true,
            anim_frame: 0,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.health.is_alive()
    }

    pub fn is_hit(&self) -> bool {
        self.hit.is_hit
    }

    /// Turn to `facing`, restarting the animation if that is a change.
    pub fn face(&mut self, facing: Facing) {
        if self.facing != facing {
            self.facing = facing;
            self.anim_frame = 0;
        }
    }

    /// Apply damage and (re)enter the hit state. A hit while already locked
    /// still lands and restarts the lock. Only the dead ignore hits.
    pub fn take_hit(&mut self, damage: u8) -> HitOutcome {
        if !self.is_alive() {
            return HitOutcome::Ignored;
        }

        self.hit = HitState {
            is_hit: true,
            hit_timer: 0,
        };
        self.can_move = false;
        self.anim_frame = 0;

        if self.health.take_damage(damage) {
            HitOutcome::Killed
        } else {
            HitOutcome::Damaged
        }
    }

    /// Count one frame of hit-lock. The lock clears after `duration` frames;
    /// a dead entity stays unable to move.
    pub fn tick_hit_timer(&mut self, duration: u32) {
        if self.hit.is_hit {
            self.hit.hit_timer += 1;
            if self.hit.hit_timer >= duration {
                self.hit = HitState::default();
                self.can_move = self.is_alive();
            }
        }
        if !self.is_alive() {
            self.can_move = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trot_core::geom::Bounds;

    fn entity(max_health: u8) -> EntityState {
        EntityState::new(Shape::boxed(Bounds::new(0.0, 0.0, 50.0, 50.0)), max_health)
    }

    #[test]
    fn only_tiles_and_blocks_are_solid() {
        assert!(EntityKind::Tile.is_solid());
        assert!(EntityKind::Block.is_solid());
        assert!(!EntityKind::Hazard.is_solid());
        assert!(!EntityKind::Goal.is_solid());
        assert!(!EntityKind::Enemy.is_solid());
        assert!(!EntityKind::Player.is_solid());
    }

    #[test]
    fn hit_locks_movement_until_timer_expires() {
        let mut e = entity(3);
        assert_eq!(e.take_hit(1), HitOutcome::Damaged);
        assert!(e.is_hit());
        assert!(!e.can_move);
        assert_eq!(e.health.current, 2);

        for _ in 0..59 {
            e.tick_hit_timer(60);
        }
        assert!(e.is_hit());
        assert!(!e.can_move);

        e.tick_hit_timer(60);
        assert!(!e.is_hit());
        assert!(e.can_move);
    }

    #[test]
    fn hit_while_locked_still_damages_and_restarts_lock() {
        let mut e = entity(3);
        e.take_hit(1);
        for _ in 0..40 {
            e.tick_hit_timer(60);
        }
        assert_eq!(e.hit.hit_timer, 40);

        assert_eq!(e.take_hit(1), HitOutcome::Damaged);
        assert_eq!(e.health.current, 1);
        assert_eq!(e.hit.hit_timer, 0);

        // The lock runs a full duration from the second hit.
        for _ in 0..59 {
            e.tick_hit_timer(60);
        }
        assert!(!e.can_move);
        e.tick_hit_timer(60);
        assert!(e.can_move);
    }

    #[test]
    fn death_is_terminal() {
        let mut e = entity(1);
        assert_eq!(e.take_hit(1), HitOutcome::Killed);
        assert!(!e.is_alive());

        for _ in 0..200 {
            e.tick_hit_timer(60);
        }
        assert!(!e.can_move, "dead entities never regain movement");
        assert_eq!(e.take_hit(1), HitOutcome::Ignored);
        assert_eq!(e.health.current, 0);
    }

    #[test]
    fn damage_floors_at_zero() {
        let mut h = Health::new(2);
        assert!(h.take_damage(5));
        assert_eq!(h.current, 0);
    }

    #[test]
    fn facing_change_restarts_animation() {
        let mut e = entity(3);
        e.anim_frame = 12;
        e.face(Facing::Left);
        assert_eq!(e.anim_frame, 12);
        e.face(Facing::Right);
        assert_eq!(e.anim_frame, 0);
        assert_eq!(e.facing.sign(), 1.0);
    }
}
