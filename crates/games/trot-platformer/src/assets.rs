use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Deserialize;

use trot_core::geom::{Bounds, Mask, MaskError, Shape};

use crate::config::TILE_SIZE;

/// Manifest file name inside an asset directory.
pub const MANIFEST_FILE: &str = "assets.toml";

/// Every sprite the level places.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpriteKind {
    Player,
    Enemy,
    Rune,
    Goal,
    Block,
}

impl SpriteKind {
    pub fn name(self) -> &'static str {
        match self {
            SpriteKind::Player => "player",
            SpriteKind::Enemy => "enemy",
            SpriteKind::Rune => "rune",
            SpriteKind::Goal => "goal",
            SpriteKind::Block => "block",
        }
    }
}

/// Size and collision silhouette of one sprite.
#[derive(Debug, Clone)]
pub struct SpriteInfo {
    pub width: f32,
    pub height: f32,
    pub mask: Option<Arc<Mask>>,
}

impl SpriteInfo {
    fn boxed(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            mask: None,
        }
    }
}

#[derive(Debug)]
pub enum AssetLoadError {
    Io { path: PathBuf, source: std::io::Error },
    MissingFile(PathBuf),
    InvalidManifest(String),
    InvalidMask { sprite: &'static str, source: MaskError },
}

impl std::fmt::Display for AssetLoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "failed to read {}: {source}", path.display()),
            Self::MissingFile(path) => write!(f, "missing asset file: {}", path.display()),
            Self::InvalidManifest(reason) => write!(f, "invalid asset manifest: {reason}"),
            Self::InvalidMask { sprite, source } => {
                write!(f, "invalid mask for sprite '{sprite}': {source}")
            },
        }
    }
}

impl std::error::Error for AssetLoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::InvalidMask { source, .. } => Some(source),
            Self::MissingFile(_) | Self::InvalidManifest(_) => None,
        }
    }
}

// On-disk manifest layout.

#[derive(Debug, Deserialize)]
struct Manifest {
    terrain_atlas: PathBuf,
    #[serde(default = "default_scale")]
    scale: u32,
    #[serde(default)]
    sprites: SpriteSections,
}

fn default_scale() -> u32 {
    1
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SpriteSections {
    player: Option<SpriteEntry>,
    enemy: Option<SpriteEntry>,
    rune: Option<SpriteEntry>,
    goal: Option<SpriteEntry>,
    block: Option<SpriteEntry>,
}

/// Sizes are in source pixels and get multiplied by the manifest scale.
#[derive(Debug, Deserialize)]
struct SpriteEntry {
    width: Option<u32>,
    height: Option<u32>,
    file: Option<PathBuf>,
    #[serde(default)]
    mask: Vec<String>,
}

/// Sprite sizes, masks, and the terrain atlas location for one level.
///
/// Built once at level load and handed to `Level::build`. The player's box
/// comes from `ActorConfig`; only its mask is taken from here.
#[derive(Debug, Clone)]
pub struct AssetTable {
    pub terrain_atlas: Option<PathBuf>,
    player: SpriteInfo,
    enemy: SpriteInfo,
    rune: SpriteInfo,
    goal: SpriteInfo,
    block: SpriteInfo,
}

impl AssetTable {
    /// Box-shaped sprites with the stock sizes and no masks.
    pub fn placeholder() -> Self {
        Self {
            terrain_atlas: None,
            player: SpriteInfo::boxed(50.0, 50.0),
            enemy: SpriteInfo::boxed(64.0, 64.0),
            rune: SpriteInfo::boxed(32.0, 64.0),
            goal: SpriteInfo::boxed(32.0, 32.0),
            block: SpriteInfo::boxed(TILE_SIZE, TILE_SIZE),
        }
    }

    /// Read `assets.toml` from `dir` and verify every file it names exists.
    pub fn load(dir: impl AsRef<Path>) -> Result<Self, AssetLoadError> {
        let dir = dir.as_ref();
        let manifest_path = dir.join(MANIFEST_FILE);
        if !manifest_path.is_file() {
            return Err(AssetLoadError::MissingFile(manifest_path));
        }
        let text = std::fs::read_to_string(&manifest_path).map_err(|source| AssetLoadError::Io {
            path: manifest_path.clone(),
            source,
        })?;
        let table = Self::from_manifest(&text, dir)?;
        tracing::info!(dir = %dir.display(), "Loaded asset table");
        Ok(table)
    }

    /// Build a table from manifest text. Relative file paths resolve
    /// against `dir`.
    pub fn from_manifest(text: &str, dir: &Path) -> Result<Self, AssetLoadError> {
        let manifest: Manifest =
            toml::from_str(text).map_err(|e| AssetLoadError::InvalidManifest(e.to_string()))?;
        if manifest.scale == 0 {
            return Err(AssetLoadError::InvalidManifest("scale must be at least 1".into()));
        }

        let atlas = dir.join(&manifest.terrain_atlas);
        require_file(&atlas)?;

        let defaults = Self::placeholder();
        let scale = manifest.scale;
        let sections = manifest.sprites;
        Ok(Self {
            terrain_atlas: Some(atlas),
            player: sprite_info(SpriteKind::Player, sections.player, defaults.player, scale, dir)?,
            enemy: sprite_info(SpriteKind::Enemy, sections.enemy, defaults.enemy, scale, dir)?,
            rune: sprite_info(SpriteKind::Rune, sections.rune, defaults.rune, scale, dir)?,
            goal: sprite_info(SpriteKind::Goal, sections.goal, defaults.goal, scale, dir)?,
            block: sprite_info(SpriteKind::Block, sections.block, defaults.block, scale, dir)?,
        })
    }

    pub fn sprite(&self, kind: SpriteKind) -> &SpriteInfo {
        match kind {
            SpriteKind::Player => &self.player,
            SpriteKind::Enemy => &self.enemy,
            SpriteKind::Rune => &self.rune,
            SpriteKind::Goal => &self.goal,
            SpriteKind::Block => &self.block,
        }
    }

    /// The collision shape of `kind` with its top-left corner at (x, y).
    pub fn shape_at(&self, kind: SpriteKind, x: f32, y: f32) -> Shape {
        let info = self.sprite(kind);
        Shape::with_mask(Bounds::new(x, y, info.width, info.height), info.mask.clone())
    }
}

fn require_file(path: &Path) -> Result<(), AssetLoadError> {
    if path.is_file() {
        Ok(())
    } else {
        Err(AssetLoadError::MissingFile(path.to_path_buf()))
    }
}

fn sprite_info(
    kind: SpriteKind,
    entry: Option<SpriteEntry>,
    fallback: SpriteInfo,
    scale: u32,
    dir: &Path,
) -> Result<SpriteInfo, AssetLoadError> {
    let Some(entry) = entry else {
        return Ok(fallback);
    };
    if let Some(file) = &entry.file {
        require_file(&dir.join(file))?;
    }

    let mask = if entry.mask.is_empty() {
        None
    } else {
        let mask = Mask::from_rows(&entry.mask)
            .map_err(|source| AssetLoadError::InvalidMask {
                sprite: kind.name(),
                source,
            })?
            .scaled(scale);
        Some(mask)
    };

    let (width, height) = match (&mask, entry.width, entry.height) {
        (Some(mask), w, h) => {
            let (mw, mh) = (mask.width(), mask.height());
            if w.is_some_and(|w| w * scale != mw) || h.is_some_and(|h| h * scale != mh) {
                return Err(AssetLoadError::InvalidManifest(format!(
                    "sprite '{}' size does not match its mask",
                    kind.name()
                )));
            }
            (mw as f32, mh as f32)
        },
        (None, Some(w), Some(h)) => ((w * scale) as f32, (h * scale) as f32),
        (None, None, None) => (fallback.width, fallback.height),
        (None, _, _) => {
            return Err(AssetLoadError::InvalidManifest(format!(
                "sprite '{}' needs both width and height",
                kind.name()
            )));
        },
    };

    Ok(SpriteInfo {
        width,
        height,
        mask: mask.map(Arc::new),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Fresh scratch directory under the system temp dir.
    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("trot-assets-{name}-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn placeholder_sizes() {
        let assets = AssetTable::placeholder();
        let enemy = assets.sprite(SpriteKind::Enemy);
        assert_eq!((enemy.width, enemy.height), (64.0, 64.0));
        assert!(enemy.mask.is_none());
        let rune = assets.shape_at(SpriteKind::Rune, 10.0, 20.0);
        assert_eq!(rune.bounds, Bounds::new(10.0, 20.0, 32.0, 64.0));
        assert_eq!(assets.sprite(SpriteKind::Block).width, TILE_SIZE);
    }

    #[test]
    fn manifest_scales_masks_and_sizes() {
        let dir = scratch_dir("scale");
        std::fs::write(dir.join("terrain.png"), b"").unwrap();
        let text = r#####"
terrain_atlas = "terrain.png"
scale = 2

[sprites.enemy]
mask = [".##.", "####"]

[sprites.rune]
width = 16
height = 32
"#####;
        let assets = AssetTable::from_manifest(text, &dir).unwrap();
        let enemy = assets.sprite(SpriteKind::Enemy);
        assert_eq!((enemy.width, enemy.height), (8.0, 4.0));
        let mask = enemy.mask.as_ref().unwrap();
        assert!(!mask.get(0, 0));
        assert!(mask.get(2, 0));
        assert_eq!(mask.count_solid(), 6 * 4);

        let rune = assets.sprite(SpriteKind::Rune);
        assert_eq!((rune.width, rune.height), (32.0, 64.0));
        // Untouched sections keep placeholder sizes.
        assert_eq!(assets.sprite(SpriteKind::Goal).width, 32.0);
        assert_eq!(assets.terrain_atlas, Some(dir.join("terrain.png")));
    }

    #[test]
    fn missing_atlas_is_rejected() {
        let dir = scratch_dir("atlas");
        let err = AssetTable::from_manifest("terrain_atlas = \"nope.png\"", &dir).unwrap_err();
        assert!(matches!(err, AssetLoadError::MissingFile(p) if p.ends_with("nope.png")));
    }

    #[test]
    fn missing_sprite_file_is_rejected() {
        let dir = scratch_dir("sprite-file");
        std::fs::write(dir.join("terrain.png"), b"").unwrap();
        let text = r#"
terrain_atlas = "terrain.png"

[sprites.goal]
file = "goal.png"
"#;
        let err = AssetTable::from_manifest(text, &dir).unwrap_err();
        assert!(matches!(err, AssetLoadError::MissingFile(p) if p.ends_with("goal.png")));
    }

    #[test]
    fn malformed_mask_names_sprite() {
        let dir = scratch_dir("mask");
        std::fs::write(dir.join("terrain.png"), b"").unwrap();
        let text = r#####"
terrain_atlas = "terrain.png"

[sprites.enemy]
mask = ["##", "#"]
"#####;
        let err = AssetTable::from_manifest(text, &dir).unwrap_err();
        assert!(matches!(
            err,
            AssetLoadError::InvalidMask {
                sprite: "enemy",
                source: MaskError::Ragged { .. }
            }
        ));
        assert!(err.to_string().contains("enemy"));
    }

    #[test]
    fn size_must_match_mask() {
        let dir = scratch_dir("mismatch");
        std::fs::write(dir.join("terrain.png"), b"").unwrap();
        let text = r#####"
terrain_atlas = "terrain.png"

[sprites.enemy]
width = 3
height = 1
mask = ["##"]
"#####;
        let err = AssetTable::from_manifest(text, &dir).unwrap_err();
        assert!(matches!(err, AssetLoadError::InvalidManifest(_)));
    }

    #[test]
    fn bad_toml_is_invalid_manifest() {
        let err = AssetTable::from_manifest("terrain_atlas = ", Path::new(".")).unwrap_err();
        assert!(matches!(err, AssetLoadError::InvalidManifest(_)));
    }

    #[test]
    fn load_requires_manifest() {
        let dir = scratch_dir("no-manifest");
        let err = AssetTable::load(&dir).unwrap_err();
        assert!(matches!(err, AssetLoadError::MissingFile(p) if p.ends_with(MANIFEST_FILE)));
    }

    #[test]
    fn load_reads_manifest_from_dir() {
        let dir = scratch_dir("load");
        std::fs::write(dir.join("terrain.png"), b"").unwrap();
        std::fs::write(dir.join(MANIFEST_FILE), "terrain_atlas = \"terrain.png\"\n").unwrap();
        let assets = AssetTable::load(&dir).unwrap();
        assert_eq!(assets.sprite(SpriteKind::Enemy).height, 64.0);
    }
}
