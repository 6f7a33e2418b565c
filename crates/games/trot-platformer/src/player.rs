use trot_core::geom::{Bounds, Shape};

use crate::config::PhysicsConfig;
use crate::entity::{EntityState, Facing, HitOutcome};
use crate::presentation::AnimationState;

/// Jumps allowed before the player has to touch ground again.
pub const MAX_JUMPS: u8 = 2;

/// The player character.
#[derive(Debug, Clone)]
pub struct Player {
    pub state: EntityState,
    /// Frames spent airborne; drives the gravity ramp.
    pub fall_count: u32,
    pub jump_count: u8,
    /// Standing on something solid. Gravity is suspended while true.
    pub grounded: bool,
}

impl Player {
    pub fn new(x: f32, y: f32, width: f32, height: f32, max_health: u8) -> Self {
        Self {
            state: EntityState::new(Shape::boxed(Bounds::new(x, y, width, height)), max_health),
            fall_count: 0,
            jump_count: 0,
            grounded: false,
        }
    }

    pub fn bounds(&self) -> &Bounds {
        &self.state.shape.bounds
    }

    pub fn bounds_mut(&mut self) -> &mut Bounds {
        &mut self.state.shape.bounds
    }

    pub fn is_alive(&self) -> bool {
        self.state.is_alive()
    }

    pub fn move_left(&mut self, speed: f32) {
        if !self.state.can_move {
            return;
        }
        self.state.vx = -speed;
        self.state.face(Facing::Left);
    }

    pub fn move_right(&mut self, speed: f32) {
        if !self.state.can_move {
            return;
        }
        self.state.vx = speed;
        self.state.face(Facing::Right);
    }

    /// Start a jump, or the second half of a double jump.
    pub fn jump(&mut self, jump_velocity: f32) {
        if !self.state.can_move || self.jump_count >= MAX_JUMPS {
            return;
        }
        self.state.vy = jump_velocity;
        self.state.anim_frame = 0;
        self.jump_count += 1;
        self.grounded = false;
    }

    /// Per-frame integration: move by the current velocity, ramp gravity
    /// while airborne, and count down the hit lock. The resolver applies
    /// `vy` once more when it checks the vertical step against solids.
    pub fn tick_physics(&mut self, physics: &PhysicsConfig) {
        self.state.shape.bounds.x += self.state.vx;
        self.state.shape.bounds.y += self.state.vy;

        if !self.grounded {
            let ramp = self.fall_count as f32 / physics.fps as f32 * physics.gravity;
            self.state.vy += ramp.min(1.0);
            self.fall_count += 1;
        }

        self.state.tick_hit_timer(physics.hit_duration_frames);
        self.state.anim_frame = self.state.anim_frame.wrapping_add(1);
    }

    /// Called by the resolver when the player's feet meet a solid top.
    pub fn land(&mut self) {
        self.fall_count = 0;
        self.state.vy = 0.0;
        self.jump_count = 0;
        self.grounded = true;
    }

    /// Called by the resolver when the player's head meets a solid bottom.
    pub fn bounce_off_ceiling(&mut self) {
        self.state.vy *= -1.0;
    }

    /// Stepped off an edge: start falling from rest.
    pub fn leave_ground(&mut self) {
        self.grounded = false;
        self.fall_count = 0;
    }

    /// Take damage and get knocked back away from the facing direction.
    pub fn take_hit(&mut self, damage: u8, knockback: f32) -> HitOutcome {
        let outcome = self.state.take_hit(damage);
        if outcome != HitOutcome::Ignored {
            self.state.vx = -self.state.facing.sign() * knockback;
            tracing::debug!(
                health = self.state.health.current,
                killed = outcome == HitOutcome::Killed,
                "Player hit"
            );
        }
        outcome
    }

    /// Which animation this frame calls for. Small downward drift does not
    /// count as falling.
    pub fn animation_state(&self) -> AnimationState {
        let s = &self.state;
        if !s.is_alive() {
            AnimationState::Dead
        } else if s.is_hit() {
            AnimationState::Hit
        } else if s.vy < 0.0 {
            AnimationState::Jump
        } else if s.vy > 1.0 {
            AnimationState::Fall
        } else if s.vx != 0.0 {
            AnimationState::Run
        } else {
            AnimationState::Idle
        }
    }

    /// Instant death, used when falling out of the world.
    pub fn kill(&mut self) {
        self.state.health.current = 0;
        self.state.can_move = false;
        self.state.vx = 0.0;
    }
}
