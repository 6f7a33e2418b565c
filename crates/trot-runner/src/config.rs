use serde::Deserialize;

/// Default config file, looked up in the working directory.
pub const CONFIG_FILE: &str = "trot.toml";

/// Runner configuration, loaded from `trot.toml`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// Level layout file. The built-in meadow level is used when unset.
    pub level: Option<String>,
    pub assets_dir: String,
    /// Refuse to start without a valid asset table instead of falling back
    /// to placeholder shapes.
    pub strict_assets: bool,
    /// Stop after this many ticks. Runs until the round ends when unset.
    pub max_ticks: Option<u64>,
    /// Hold ticks to the game's tick rate. Unpaced runs as fast as possible.
    pub paced: bool,
    /// JSON input script. Idle input when unset.
    pub input_script: Option<String>,
    /// Write every frame as a JSON line to this file instead of logging.
    pub frames_out: Option<String>,
    /// Log a frame summary every N ticks.
    pub log_every: u64,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            level: None,
            assets_dir: "assets".to_string(),
            strict_assets: false,
            max_ticks: None,
            paced: true,
            input_script: None,
            frames_out: None,
            log_every: 60,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    pub field: &'static str,
    pub reason: String,
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid config field '{}': {}", self.field, self.reason)
    }
}

impl std::error::Error for ConfigError {}

fn parse_flag(val: &str) -> Option<bool> {
    match val.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

impl RunnerConfig {
    /// Load config from `TROT_CONFIG` (or `trot.toml`) if it exists, then
    /// apply env var overrides.
    pub fn load() -> Self {
        let path = std::env::var("TROT_CONFIG").unwrap_or_else(|_| CONFIG_FILE.to_string());
        let mut config = Self::from_file(&path);
        config.apply_env(|key| std::env::var(key).ok());
        config
    }

    /// Read a config file, falling back to defaults if it is missing or
    /// unparseable.
    pub fn from_file(path: &str) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => match toml::from_str::<RunnerConfig>(&content) {
                Ok(cfg) => {
                    tracing::info!("Loaded configuration from {path}");
                    cfg
                },
                Err(e) => {
                    tracing::warn!("Failed to parse {path}: {e}, using defaults");
                    RunnerConfig::default()
                },
            },
            Err(_) => {
                tracing::info!("No {path} found, using defaults");
                RunnerConfig::default()
            },
        }
    }

    /// Apply `TROT_*` overrides. `lookup` is `std::env::var` outside tests.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(level) = lookup("TROT_LEVEL")
            && !level.is_empty()
        {
            self.level = Some(level);
        }
        if let Some(dir) = lookup("TROT_ASSETS_DIR")
            && !dir.is_empty()
        {
            self.assets_dir = dir;
        }
        if let Some(script) = lookup("TROT_INPUT_SCRIPT")
            && !script.is_empty()
        {
            self.input_script = Some(script);
        }
        if let Some(out) = lookup("TROT_FRAMES_OUT")
            && !out.is_empty()
        {
            self.frames_out = Some(out);
        }
        if let Some(val) = lookup("TROT_STRICT_ASSETS")
            && let Some(flag) = parse_flag(&val)
        {
            self.strict_assets = flag;
        }
        if let Some(val) = lookup("TROT_PACED")
            && let Some(flag) = parse_flag(&val)
        {
            self.paced = flag;
        }
        if let Some(val) = lookup("TROT_MAX_TICKS")
            && let Ok(n) = val.parse::<u64>()
        {
            self.max_ticks = Some(n);
        }
        if let Some(val) = lookup("TROT_LOG_EVERY")
            && let Ok(n) = val.parse::<u64>()
        {
            self.log_every = n;
        }
    }

    /// Reject settings the runner cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_ticks == Some(0) {
            return Err(ConfigError {
                field: "max_ticks",
                reason: "must be > 0 when set".to_string(),
            });
        }
        if self.log_every == 0 {
            return Err(ConfigError {
                field: "log_every",
                reason: "must be > 0".to_string(),
            });
        }
        if self.assets_dir.is_empty() {
            return Err(ConfigError {
                field: "assets_dir",
                reason: "must not be empty".to_string(),
            });
        }
        if !self.paced && self.max_ticks.is_none() && self.input_script.is_none() {
            tracing::warn!(
                "Unpaced run with idle input and no max_ticks only ends on death, the goal, or Ctrl-C"
            );
        }
        Ok(())
    }
}
