pub mod config;
pub mod game_loop;
pub mod input;
pub mod presenter;

use trot_platformer::GoblinTrot;
use trot_platformer::assets::{AssetLoadError, AssetTable};
use trot_platformer::config::PlatformerConfig;
use trot_platformer::level::{Level, LevelError};

use config::RunnerConfig;
use input::{IdleInput, InputSource, ScriptError, ScriptedInput};
use presenter::{JsonLinesPresenter, PresentError, Presenter, TracePresenter};

/// Anything that stops the runner before the first tick.
#[derive(Debug)]
pub enum StartupError {
    Assets(AssetLoadError),
    Level(LevelError),
    Script(ScriptError),
    Output(PresentError),
}

impl std::fmt::Display for StartupError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Assets(e) => write!(f, "{e}"),
            Self::Level(e) => write!(f, "{e}"),
            Self::Script(e) => write!(f, "{e}"),
            Self::Output(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for StartupError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Assets(e) => Some(e),
            Self::Level(e) => Some(e),
            Self::Script(e) => Some(e),
            Self::Output(e) => Some(e),
        }
    }
}

/// Load the asset table. Failures fall back to placeholders unless
/// `strict_assets` is set.
pub fn load_assets(config: &RunnerConfig) -> Result<AssetTable, StartupError> {
    match AssetTable::load(&config.assets_dir) {
        Ok(assets) => Ok(assets),
        Err(e) if config.strict_assets => Err(StartupError::Assets(e)),
        Err(e) => {
            tracing::warn!(
                "Failed to load assets from {}: {e}, using placeholder shapes",
                config.assets_dir
            );
            Ok(AssetTable::placeholder())
        },
    }
}

/// Build the game for the configured level.
pub fn load_game(
    config: &RunnerConfig,
    platformer: PlatformerConfig,
) -> Result<GoblinTrot, StartupError> {
    let assets = load_assets(config)?;
    let level = match &config.level {
        Some(path) => Level::load(path, &assets, &platformer),
        None => {
            tracing::info!("No level configured, using the built-in meadow");
            Level::goblin_trot(&assets, &platformer)
        },
    }
    .map_err(StartupError::Level)?;
    Ok(GoblinTrot::new(level, platformer))
}

pub fn input_source(config: &RunnerConfig) -> Result<Box<dyn InputSource>, StartupError> {
    match &config.input_script {
        Some(path) => Ok(Box::new(
            ScriptedInput::load(path).map_err(StartupError::Script)?,
        )),
        None => Ok(Box::new(IdleInput)),
    }
}

pub fn presenter(config: &RunnerConfig) -> Result<Box<dyn Presenter>, StartupError> {
    match &config.frames_out {
        Some(path) => Ok(Box::new(
            JsonLinesPresenter::create(path).map_err(StartupError::Output)?,
        )),
        None => Ok(Box::new(TracePresenter::new(config.log_every))),
    }
}
