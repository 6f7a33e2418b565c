pub mod game_trait;
pub mod geom;
pub mod input;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers {
    use crate::game_trait::{FixedStepGame, GameEvent};
    use crate::input::MoveIntent;

    /// Run N ticks holding the same intent, returning all accumulated events.
    pub fn run_game_ticks(
        game: &mut dyn FixedStepGame,
        n: usize,
        intent: MoveIntent,
    ) -> Vec<GameEvent> {
        let mut all_events = Vec::new();
        for _ in 0..n {
            all_events.extend(game.update(&intent));
        }
        all_events
    }

    // ================================================================
    // Game Trait Contract Tests
    // ================================================================
    // Every FixedStepGame implementation must pass these. Game crates call
    // them from their own #[cfg(test)] modules with a fresh instance.

    /// serialize_state() must return non-empty bytes before the first tick.
    pub fn contract_initial_state_nonempty(game: &dyn FixedStepGame) {
        assert!(
            !game.serialize_state().is_empty(),
            "serialize_state() must return non-empty bytes"
        );
    }

    /// update() must advance the encoded state (at least the tick counter).
    pub fn contract_update_advances_state(game: &mut dyn FixedStepGame) {
        let before = game.serialize_state();
        game.update(&MoveIntent::IDLE);
        let after = game.serialize_state();
        assert_ne!(before, after, "update() must advance game state");
    }

    /// pause() must freeze the simulation, resume() must unfreeze it.
    pub fn contract_pause_stops_updates(game: &mut dyn FixedStepGame) {
        game.pause();
        let before = game.serialize_state();
        game.update(&MoveIntent::right());
        let during_pause = game.serialize_state();
        assert_eq!(before, during_pause, "State must not change while paused");

        game.resume();
        game.update(&MoveIntent::right());
        let after_resume = game.serialize_state();
        assert_ne!(during_pause, after_resume, "State must change after resume");
    }

    /// tick_rate() must be a usable positive frequency.
    pub fn contract_tick_rate_positive(game: &dyn FixedStepGame) {
        let rate = game.tick_rate();
        assert!(
            rate.is_finite() && rate > 0.0,
            "tick_rate() must be positive, got {rate}"
        );
    }
}
