use serde::{Deserialize, Serialize};

use crate::input::MoveIntent;

/// Core trait for a game driven by a fixed-timestep host loop.
///
/// The host owns pacing, input sampling, and presentation; the game only
/// advances its simulation one tick at a time.
pub trait FixedStepGame: Send + Sync {
    /// Name and description for the host's startup banner.
    fn metadata(&self) -> GameMetadata;

    /// Advance exactly one tick. Returns the events raised during it.
    fn update(&mut self, intent: &MoveIntent) -> Vec<GameEvent>;

    /// Encode the presentation snapshot for the current tick.
    fn serialize_state(&self) -> Vec<u8>;

    /// Simulation tick rate in Hz.
    fn tick_rate(&self) -> f32 {
        60.0
    }

    fn pause(&mut self);

    fn resume(&mut self);

    /// Whether the session has reached a terminal state.
    fn is_round_complete(&self) -> bool;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameMetadata {
    pub name: String,
    pub description: String,
}

/// Events emitted by a game during update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    PlayerHit { health: u8 },
    PlayerDied,
    EnemyHit { enemy: usize, health: u8 },
    EnemyDefeated { enemy: usize },
    LevelComplete,
    RoundComplete,
}
