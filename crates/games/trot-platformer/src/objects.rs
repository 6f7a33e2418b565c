use trot_core::geom::Shape;

use crate::entity::EntityKind;

/// A discrete, stationary level object: a solid block, a rune trap, or the
/// exit marker.
#[derive(Debug, Clone)]
pub struct LevelObject {
    pub kind: EntityKind,
    pub shape: Shape,
}

impl LevelObject {
    pub fn block(shape: Shape) -> Self {
        Self {
            kind: EntityKind::Block,
            shape,
        }
    }

    pub fn rune(shape: Shape) -> Self {
        Self {
            kind: EntityKind::Hazard,
            shape,
        }
    }

    pub fn goal(shape: Shape) -> Self {
        Self {
            kind: EntityKind::Goal,
            shape,
        }
    }

    pub fn is_solid(&self) -> bool {
        self.kind.is_solid()
    }
}
