use serde::{Deserialize, Serialize};

/// Normalized movement intent sampled once per tick by the input layer.
///
/// `left` and `right` are level-triggered (held); `jump` is edge-triggered
/// and must only be true on the tick the key went down.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveIntent {
    pub left: bool,
    pub right: bool,
    pub jump: bool,
}

impl MoveIntent {
    pub const IDLE: MoveIntent = MoveIntent {
        left: false,
        right: false,
        jump: false,
    };

    pub fn right() -> Self {
        Self {
            right: true,
            ..Self::IDLE
        }
    }

    pub fn left() -> Self {
        Self {
            left: true,
            ..Self::IDLE
        }
    }

    pub fn jump() -> Self {
        Self {
            jump: true,
            ..Self::IDLE
        }
    }

    /// Horizontal sign of the held keys: -1, 0 or +1. Right wins a tie,
    /// matching the order the resolver commits them in.
    pub fn horizontal(&self) -> i8 {
        match (self.left, self.right) {
            (_, true) => 1,
            (true, false) => -1,
            (false, false) => 0,
        }
    }
}
