use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::assets::{AssetTable, SpriteKind};
use crate::config::{PlatformerConfig, TILE_SIZE};
use crate::enemy::Enemy;
use crate::objects::LevelObject;
use crate::player::Player;
use crate::tilemap::{MapError, TileMap};

/// Grid for the built-in meadow level.
const MEADOW_MAP: &str = include_str!("../levels/meadow.csv");

/// A top-left spawn position in world pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Spawn {
    pub x: f32,
    pub y: f32,
}

impl Spawn {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnemySpawn {
    pub x: f32,
    pub y: f32,
    /// How far right of its spawn the enemy walks before turning.
    pub patrol: f32,
}

/// Where everything in a level starts. Stored as TOML next to the map grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelLayout {
    /// Map grid file, relative to the layout file.
    pub map: PathBuf,
    #[serde(default = "default_tile_size")]
    pub tile_size: f32,
    pub player: Spawn,
    #[serde(default)]
    pub enemies: Vec<EnemySpawn>,
    #[serde(default)]
    pub runes: Vec<Spawn>,
    pub goal: Spawn,
    #[serde(default)]
    pub blocks: Vec<Spawn>,
}

fn default_tile_size() -> f32 {
    TILE_SIZE
}

#[derive(Debug)]
pub enum LevelError {
    Io { path: PathBuf, source: std::io::Error },
    Layout { path: PathBuf, reason: String },
    Map { path: PathBuf, source: MapError },
}

impl std::fmt::Display for LevelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read level {}: {source}", path.display())
            },
            Self::Layout { path, reason } => {
                write!(f, "invalid level layout {}: {reason}", path.display())
            },
            Self::Map { path, source } => write!(f, "bad map {}: {source}", path.display()),
        }
    }
}

impl std::error::Error for LevelError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Map { source, .. } => Some(source),
            Self::Layout { .. } => None,
        }
    }
}

impl LevelLayout {
    /// The meadow level that ships with the game.
    pub fn goblin_trot() -> Self {
        Self {
            map: PathBuf::from("meadow.csv"),
            tile_size: TILE_SIZE,
            player: Spawn::new(100.0, 910.0),
            enemies: vec![
                EnemySpawn {
                    x: 384.0,
                    y: 896.0,
                    patrol: 384.0,
                },
                EnemySpawn {
                    x: 1728.0,
                    y: 896.0,
                    patrol: 288.0,
                },
            ],
            runes: vec![
                Spawn::new(1100.0, 896.0),
                Spawn::new(2220.0, 896.0),
                Spawn::new(1500.0, 512.0),
            ],
            goal: Spawn::new(2720.0, 928.0),
            blocks: Vec::new(),
        }
    }

    pub fn parse(text: &str, path: &Path) -> Result<Self, LevelError> {
        let layout: Self = toml::from_str(text).map_err(|e| LevelError::Layout {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        if layout.tile_size.is_nan() || layout.tile_size <= 0.0 {
            return Err(LevelError::Layout {
                path: path.to_path_buf(),
                reason: format!("tile_size must be positive, got {}", layout.tile_size),
            });
        }
        Ok(layout)
    }

    /// Read a layout file and the map grid it points at.
    pub fn load(path: impl AsRef<Path>) -> Result<(Self, TileMap), LevelError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| LevelError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let layout = Self::parse(&text, path)?;

        let map_path = path.parent().unwrap_or(Path::new(".")).join(&layout.map);
        let map = TileMap::load(&map_path, layout.tile_size).map_err(|source| LevelError::Map {
            path: map_path.clone(),
            source,
        })?;
        Ok((layout, map))
    }
}

/// Everything placed in a level, ready to simulate.
#[derive(Debug, Clone)]
pub struct Level {
    pub map: TileMap,
    pub player: Player,
    pub enemies: Vec<Enemy>,
    /// Blocks, runes, and the goal, in that order.
    pub objects: Vec<LevelObject>,
}

impl Level {
    /// Position every entity of `layout` on `map`.
    pub fn build(
        layout: &LevelLayout,
        map: TileMap,
        assets: &AssetTable,
        config: &PlatformerConfig,
    ) -> Self {
        let actors = &config.actors;

        let mut player = Player::new(
            layout.player.x,
            layout.player.y,
            actors.player_width,
            actors.player_height,
            actors.player_max_health,
        );
        player.state.shape.mask = assets.sprite(SpriteKind::Player).mask.clone();

        let enemies = layout
            .enemies
            .iter()
            .map(|spawn| {
                Enemy::new(
                    assets.shape_at(SpriteKind::Enemy, spawn.x, spawn.y),
                    spawn.patrol,
                    actors.enemy_speed,
                    actors.enemy_max_health,
                )
            })
            .collect::<Vec<_>>();

        let mut objects = Vec::with_capacity(layout.blocks.len() + layout.runes.len() + 1);
        objects.extend(
            layout
                .blocks
                .iter()
                .map(|s| LevelObject::block(assets.shape_at(SpriteKind::Block, s.x, s.y))),
        );
        objects.extend(
            layout
                .runes
                .iter()
                .map(|s| LevelObject::rune(assets.shape_at(SpriteKind::Rune, s.x, s.y))),
        );
        objects.push(LevelObject::goal(assets.shape_at(
            SpriteKind::Goal,
            layout.goal.x,
            layout.goal.y,
        )));

        tracing::info!(
            tiles = map.tiles().len(),
            enemies = enemies.len(),
            objects = objects.len(),
            "Level built"
        );

        Self {
            map,
            player,
            enemies,
            objects,
        }
    }

    /// The built-in meadow level.
    pub fn goblin_trot(assets: &AssetTable, config: &PlatformerConfig) -> Result<Self, LevelError> {
        let layout = LevelLayout::goblin_trot();
        let map = TileMap::parse(MEADOW_MAP, layout.tile_size).map_err(|source| LevelError::Map {
            path: layout.map.clone(),
            source,
        })?;
        Ok(Self::build(&layout, map, assets, config))
    }

    /// Load a layout file and build it.
    pub fn load(
        path: impl AsRef<Path>,
        assets: &AssetTable,
        config: &PlatformerConfig,
    ) -> Result<Self, LevelError> {
        let (layout, map) = LevelLayout::load(path)?;
        Ok(Self::build(&layout, map, assets, config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::EntityKind;

    const MEADOW_LAYOUT: &str = include_str!("../levels/meadow.toml");

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("trot-level-{name}-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn shipped_layout_file_matches_builtin() {
        let layout = LevelLayout::parse(MEADOW_LAYOUT, Path::new("meadow.toml")).unwrap();
        assert_eq!(layout, LevelLayout::goblin_trot());
    }

    #[test]
    fn builtin_level_fits_its_map() {
        let level =
            Level::goblin_trot(&AssetTable::placeholder(), &PlatformerConfig::default()).unwrap();
        assert_eq!(level.map.columns(), 30);
        assert_eq!(level.map.rows(), 12);
        assert_eq!(level.enemies.len(), 2);
        let goal = level.objects.last().unwrap();
        assert_eq!(goal.kind, EntityKind::Goal);
        assert!(goal.shape.bounds.right() <= level.map.map_width());

        // Every ground-level actor stands on the ground row.
        let ground = 10.0 * TILE_SIZE;
        assert_eq!(level.player.bounds().bottom(), ground);
        for enemy in &level.enemies {
            assert_eq!(enemy.bounds().bottom(), ground);
        }
        assert_eq!(goal.shape.bounds.bottom(), ground);
    }

    #[test]
    fn build_orders_objects_and_applies_config() {
        let layout = LevelLayout {
            map: PathBuf::from("unused.csv"),
            tile_size: 96.0,
            player: Spawn::new(10.0, 20.0),
            enemies: vec![EnemySpawn {
                x: 200.0,
                y: 32.0,
                patrol: 50.0,
            }],
            runes: vec![Spawn::new(300.0, 32.0)],
            goal: Spawn::new(400.0, 64.0),
            blocks: vec![Spawn::new(500.0, 0.0)],
        };
        let map = TileMap::parse("-1,-1,-1,-1,-1,-1\n0,1,1,1,1,2", 96.0).unwrap();
        let mut config = PlatformerConfig::default();
        config.actors.player_width = 40.0;
        config.actors.enemy_speed = 3.0;

        let level = Level::build(&layout, map, &AssetTable::placeholder(), &config);

        assert_eq!(level.player.bounds().width, 40.0);
        assert_eq!(level.player.state.health.max, 3);
        assert_eq!(level.enemies[0].state.vx, 3.0);
        assert_eq!(level.enemies[0].patrol.right, 250.0);
        let kinds: Vec<_> = level.objects.iter().map(|o| o.kind).collect();
        assert_eq!(kinds, vec![EntityKind::Block, EntityKind::Hazard, EntityKind::Goal]);
        assert_eq!(level.objects[1].shape.bounds.height, 64.0);
    }

    #[test]
    fn load_resolves_map_next_to_layout() {
        let dir = scratch_dir("load");
        std::fs::write(dir.join("tiny.csv"), "-1,-1\n0,0\n").unwrap();
        std::fs::write(
            dir.join("tiny.toml"),
            r#"
map = "tiny.csv"
player = { x = 10.0, y = 46.0 }
goal = { x = 150.0, y = 64.0 }
"#,
        )
        .unwrap();

        let level = Level::load(
            dir.join("tiny.toml"),
            &AssetTable::placeholder(),
            &PlatformerConfig::default(),
        )
        .unwrap();
        assert_eq!(level.map.tiles().len(), 2);
        assert!(level.enemies.is_empty());
        assert_eq!(level.objects.len(), 1);
    }

    #[test]
    fn missing_map_is_a_map_error() {
        let dir = scratch_dir("missing-map");
        std::fs::write(
            dir.join("broken.toml"),
            "map = \"gone.csv\"\nplayer = { x = 0.0, y = 0.0 }\ngoal = { x = 0.0, y = 0.0 }\n",
        )
        .unwrap();
        let err = LevelLayout::load(dir.join("broken.toml")).unwrap_err();
        assert!(matches!(err, LevelError::Map { source: MapError::Io(_), .. }));
    }

    #[test]
    fn missing_goal_is_a_layout_error() {
        let err = LevelLayout::parse("map = \"x.csv\"\nplayer = { x = 0.0, y = 0.0 }\n", Path::new("x.toml"))
            .unwrap_err();
        assert!(matches!(err, LevelError::Layout { .. }));
    }

    #[test]
    fn non_positive_tile_size_is_rejected() {
        let text = "map = \"x.csv\"\ntile_size = 0.0\nplayer = { x = 0.0, y = 0.0 }\ngoal = { x = 0.0, y = 0.0 }\n";
        let err = LevelLayout::parse(text, Path::new("x.toml")).unwrap_err();
        assert!(err.to_string().contains("tile_size"));
    }

    #[test]
    fn missing_layout_is_io_error() {
        let err = LevelLayout::load("/definitely/not/here.toml").unwrap_err();
        assert!(matches!(err, LevelError::Io { .. }));
    }
}
