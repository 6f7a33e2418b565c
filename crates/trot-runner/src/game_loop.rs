use std::future::Future;
use std::time::Duration;

use tokio::time::{Interval, MissedTickBehavior};

use trot_core::game_trait::{FixedStepGame, GameEvent};

use crate::input::InputSource;
use crate::presenter::Presenter;

const DEFAULT_TICK_RATE: f32 = 60.0;

/// How a session is driven.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionOptions {
    pub max_ticks: Option<u64>,
    /// Hold ticks to the game's tick rate.
    pub paced: bool,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            max_ticks: None,
            paced: true,
        }
    }
}

/// Why a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOutcome {
    RoundComplete,
    TickLimit,
    InputExhausted,
    Shutdown,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionSummary {
    pub ticks: u64,
    pub outcome: SessionOutcome,
    pub events: Vec<GameEvent>,
    /// Frames the presenter failed to show.
    pub presenter_errors: u64,
}

async fn next_tick(interval: &mut Option<Interval>) {
    match interval {
        Some(interval) => {
            interval.tick().await;
        },
        // Unpaced: still yield so the shutdown branch gets polled.
        None => tokio::task::yield_now().await,
    }
}

/// The fixed-timestep host loop. Samples one intent, advances the game one
/// tick, and hands the encoded state to the presenter. Presenter failures
/// are logged and the frame is dropped.
pub async fn run_session(
    game: &mut dyn FixedStepGame,
    input: &mut dyn InputSource,
    presenter: &mut dyn Presenter,
    options: SessionOptions,
    shutdown: impl Future<Output = ()>,
) -> SessionSummary {
    let tick_rate = match game.tick_rate() {
        rate if rate.is_finite() && rate > 0.0 => rate,
        rate => {
            tracing::warn!("Unusable tick rate {rate}, pacing at {DEFAULT_TICK_RATE} Hz");
            DEFAULT_TICK_RATE
        },
    };
    let mut interval = options.paced.then(|| {
        let mut interval = tokio::time::interval(Duration::from_secs_f32(1.0 / tick_rate));
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        interval
    });
    tokio::pin!(shutdown);

    let meta = game.metadata();
    tracing::info!(game = %meta.name, tick_rate, paced = options.paced, "Session starting");

    let mut ticks: u64 = 0;
    let mut events = Vec::new();
    let mut presenter_errors: u64 = 0;

    let outcome = loop {
        if options.max_ticks.is_some_and(|max| ticks >= max) {
            break SessionOutcome::TickLimit;
        }
        if input.is_exhausted() {
            break SessionOutcome::InputExhausted;
        }

        tokio::select! {
            biased;
            _ = &mut shutdown => break SessionOutcome::Shutdown,
            _ = next_tick(&mut interval) => {},
        }

        let intent = input.next_intent();
        tracing::trace!(tick = ticks + 1, dir = intent.horizontal(), jump = intent.jump, "Input");

        let tick_events = game.update(&intent);
        ticks += 1;

        let frame = game.serialize_state();
        if let Err(e) = presenter.present(ticks, &frame) {
            presenter_errors += 1;
            tracing::warn!(tick = ticks, "Dropped frame: {e}");
        }

        for event in &tick_events {
            tracing::debug!(tick = ticks, ?event, "Game event");
        }
        let round_complete =
            tick_events.iter().any(|e| matches!(e, GameEvent::RoundComplete)) || game.is_round_complete();
        events.extend(tick_events);

        if round_complete {
            break SessionOutcome::RoundComplete;
        }
    };

    if let Err(e) = presenter.finish() {
        presenter_errors += 1;
        tracing::warn!("Presenter failed to finish: {e}");
    }

    tracing::info!(ticks, ?outcome, events = events.len(), "Session ended");
    SessionSummary {
        ticks,
        outcome,
        events,
        presenter_errors,
    }
}
