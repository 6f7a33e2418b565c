use serde::{Deserialize, Serialize};

/// Simulation rate. Every timer in the game is counted in frames of this rate.
pub const FPS: u32 = 60;
/// Gravity ramp ceiling (px/frame^2 once fully ramped).
pub const GRAVITY: f32 = 1.0;
/// Horizontal walk speed (px/frame).
pub const PLAYER_VEL: f32 = 5.0;
/// Initial jump velocity. Negative is upward.
pub const JUMP_VELOCITY: f32 = -6.0;
/// Horizontal impulse applied away from the facing direction on a hit.
pub const KNOCKBACK: f32 = 30.0;
/// Horizontal probe distance as a multiple of `PLAYER_VEL`.
pub const PROBE_FACTOR: f32 = 2.0;
/// Minimum horizontal overlap before a vertical contact counts as a landing
/// or ceiling bump. Smaller overlaps are corner clips.
pub const LANDING_OVERLAP_TOLERANCE: f32 = 10.0;
/// Maximum distance between the player's feet and an enemy's head for a stomp.
pub const STOMP_TOLERANCE: f32 = 30.0;
/// Upward velocity given to the player after a stomp.
pub const STOMP_BOUNCE: f32 = -10.0;
/// Tile edge length in pixels.
pub const TILE_SIZE: f32 = 96.0;

/// Tunable physics parameters, loadable from TOML.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    pub fps: u32,
    pub gravity: f32,
    pub player_vel: f32,
    pub jump_velocity: f32,
    pub knockback: f32,
    pub probe_factor: f32,
    pub landing_overlap_tolerance: f32,
    pub stomp_tolerance: f32,
    pub stomp_bounce: f32,
    /// Frames a hit keeps an entity locked. Defaults to one second.
    pub hit_duration_frames: u32,
    /// How far below the map's bottom edge the player may fall before dying.
    pub kill_margin: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            fps: FPS,
            gravity: GRAVITY,
            player_vel: PLAYER_VEL,
            jump_velocity: JUMP_VELOCITY,
            knockback: KNOCKBACK,
            probe_factor: PROBE_FACTOR,
            landing_overlap_tolerance: LANDING_OVERLAP_TOLERANCE,
            stomp_tolerance: STOMP_TOLERANCE,
            stomp_bounce: STOMP_BOUNCE,
            hit_duration_frames: FPS,
            kill_margin: 5.0 * TILE_SIZE,
        }
    }
}

impl PhysicsConfig {
    /// Horizontal lookahead used by the probe.
    pub fn probe_distance(&self) -> f32 {
        self.player_vel * self.probe_factor
    }
}

/// Sizes and health pools for the level's actors.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ActorConfig {
    pub player_width: f32,
    pub player_height: f32,
    pub player_max_health: u8,
    pub enemy_max_health: u8,
    pub enemy_speed: f32,
}

impl Default for ActorConfig {
    fn default() -> Self {
        Self {
            player_width: 50.0,
            player_height: 50.0,
            player_max_health: 3,
            enemy_max_health: 3,
            enemy_speed: 2.0,
        }
    }
}

/// Top-level platformer configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformerConfig {
    pub physics: PhysicsConfig,
    pub actors: ActorConfig,
}

impl PlatformerConfig {
    /// Load config from a TOML file. Falls back to defaults if the file is
    /// missing or unparseable.
    pub fn load() -> Self {
        let path = std::env::var("TROT_PLATFORMER_CONFIG")
            .unwrap_or_else(|_| "config/platformer.toml".to_string());
        match std::fs::read_to_string(&path) {
            Ok(content) => match toml::from_str::<PlatformerConfig>(&content) {
                Ok(cfg) => {
                    tracing::info!(path = %path, "Loaded platformer config");
                    cfg
                },
                Err(e) => {
                    tracing::warn!("Failed to parse {path}: {e}, using defaults");
                    PlatformerConfig::default()
                },
            },
            Err(_) => PlatformerConfig::default(),
        }
    }
}
