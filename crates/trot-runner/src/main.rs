use std::process::ExitCode;

use tracing_subscriber::EnvFilter;

use trot_core::game_trait::FixedStepGame;
use trot_platformer::config::PlatformerConfig;
use trot_runner::config::RunnerConfig;
use trot_runner::game_loop::{SessionOptions, run_session};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = std::env::var("TROT_LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json"));
    if json {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    init_tracing();
    tracing::info!("Goblin Trot starting");

    let config = RunnerConfig::load();
    if let Err(e) = config.validate() {
        tracing::error!("{e}");
        return ExitCode::FAILURE;
    }

    let setup = trot_runner::load_game(&config, PlatformerConfig::load()).and_then(|game| {
        let input = trot_runner::input_source(&config)?;
        let presenter = trot_runner::presenter(&config)?;
        Ok((game, input, presenter))
    });
    let (mut game, mut input, mut presenter) = match setup {
        Ok(parts) => parts,
        Err(e) => {
            tracing::error!("Startup failed: {e}");
            return ExitCode::FAILURE;
        },
    };

    let options = SessionOptions {
        max_ticks: config.max_ticks,
        paced: config.paced,
    };
    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {e}");
            std::future::pending::<()>().await;
        }
        tracing::info!("Shutdown requested");
    };

    let summary = run_session(
        &mut game,
        input.as_mut(),
        presenter.as_mut(),
        options,
        shutdown,
    )
    .await;

    tracing::info!(
        ticks = summary.ticks,
        outcome = ?summary.outcome,
        level_complete = game.is_level_complete(),
        player_alive = game.level().player.is_alive(),
        dropped_frames = summary.presenter_errors,
        round_complete = game.is_round_complete(),
        "Goblin Trot finished"
    );
    ExitCode::SUCCESS
}
