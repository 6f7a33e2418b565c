use serde::{Deserialize, Serialize};

use trot_core::geom::Bounds;

use crate::enemy::Enemy;
use crate::entity::{EntityState, Facing, Health};
use crate::player::Player;

/// Which animation a renderer should play for an actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnimationState {
    Idle,
    Run,
    Jump,
    Fall,
    Hit,
    Dead,
}

/// Render-facing view of one actor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityView {
    pub bounds: Bounds,
    pub animation: AnimationState,
    pub facing: Facing,
    pub health: Health,
    pub anim_frame: u32,
}

/// Everything a renderer needs for one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameSnapshot {
    pub tick: u64,
    pub player: EntityView,
    pub enemies: Vec<EntityView>,
    pub hazards: Vec<Bounds>,
    pub blocks: Vec<Bounds>,
    pub goal: Option<Bounds>,
    pub map_width: f32,
    pub map_height: f32,
    pub level_complete: bool,
}

fn view(state: &EntityState, animation: AnimationState) -> EntityView {
    EntityView {
        bounds: state.shape.bounds,
        animation,
        facing: state.facing,
        health: state.health,
        anim_frame: state.anim_frame,
    }
}

impl EntityView {
    pub fn of_player(player: &Player) -> Self {
        view(&player.state, player.animation_state())
    }

    pub fn of_enemy(enemy: &Enemy) -> Self {
        view(&enemy.state, enemy.animation_state())
    }
}
