use serde::{Deserialize, Serialize};

use trot_core::geom::{Bounds, Shape};

use crate::config::PhysicsConfig;
use crate::entity::{EntityState, Facing, HitOutcome};
use crate::presentation::AnimationState;

/// The x-coordinates an enemy walks back and forth between.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PatrolBounds {
    pub left: f32,
    pub right: f32,
}

/// A patrolling enemy.
#[derive(Debug, Clone)]
pub struct Enemy {
    pub state: EntityState,
    pub patrol: PatrolBounds,
}

impl Enemy {
    /// Place an enemy at its patrol start. It patrols rightward for
    /// `patrol_distance` pixels from there.
    pub fn new(shape: Shape, patrol_distance: f32, speed: f32, max_health: u8) -> Self {
        let start_x = shape.bounds.x;
        let mut state = EntityState::new(shape, max_health);
        state.vx = speed;
        Self {
            state,
            patrol: PatrolBounds {
                left: start_x,
                right: start_x + patrol_distance,
            },
        }
    }

    pub fn bounds(&self) -> &Bounds {
        &self.state.shape.bounds
    }

    pub fn is_alive(&self) -> bool {
        self.state.is_alive()
    }

    /// Turn around at either patrol bound; otherwise keep going.
    pub fn patrol(&mut self) {
        let x = self.state.shape.bounds.x;
        if x >= self.patrol.right {
            self.state.face(Facing::Left);
            self.state.vx = -self.state.vx.abs();
        } else if x <= self.patrol.left {
            self.state.face(Facing::Right);
            self.state.vx = self.state.vx.abs();
        }
    }

    pub fn tick(&mut self, physics: &PhysicsConfig) {
        if self.state.is_alive() && self.state.can_move {
            self.patrol();
            self.state.shape.bounds.x += self.state.vx;
        }
        self.state.tick_hit_timer(physics.hit_duration_frames);
        self.state.anim_frame = self.state.anim_frame.wrapping_add(1);
    }

    pub fn animation_state(&self) -> AnimationState {
        if !self.is_alive() {
            AnimationState::Dead
        } else if self.state.is_hit() {
            AnimationState::Hit
        } else if self.state.can_move && self.state.vx != 0.0 {
            AnimationState::Run
        } else {
            AnimationState::Idle
        }
    }

    /// Take damage. Enemies are not knocked back; they just stop.
    pub fn take_hit(&mut self, damage: u8) -> HitOutcome {
        self.state.take_hit(damage)
    }
}
