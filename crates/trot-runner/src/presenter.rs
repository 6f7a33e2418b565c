use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use trot_platformer::presentation::FrameSnapshot;

/// A frame the presenter could not show. The loop logs it and moves on.
#[derive(Debug)]
pub enum PresentError {
    Decode(rmp_serde::decode::Error),
    Encode(serde_json::Error),
    Io(std::io::Error),
}

impl std::fmt::Display for PresentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Decode(e) => write!(f, "failed to decode frame: {e}"),
            Self::Encode(e) => write!(f, "failed to encode frame: {e}"),
            Self::Io(e) => write!(f, "failed to write frame: {e}"),
        }
    }
}

impl std::error::Error for PresentError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Decode(e) => Some(e),
            Self::Encode(e) => Some(e),
            Self::Io(e) => Some(e),
        }
    }
}

/// Consumes the encoded state of each tick.
pub trait Presenter: Send {
    fn present(&mut self, tick: u64, frame: &[u8]) -> Result<(), PresentError>;

    /// Called once after the last frame.
    fn finish(&mut self) -> Result<(), PresentError> {
        Ok(())
    }
}

fn decode(frame: &[u8]) -> Result<FrameSnapshot, PresentError> {
    rmp_serde::from_slice(frame).map_err(PresentError::Decode)
}

/// Logs a one-line frame summary every `every` ticks.
#[derive(Debug)]
pub struct TracePresenter {
    every: u64,
}

impl TracePresenter {
    pub fn new(every: u64) -> Self {
        Self {
            every: every.max(1),
        }
    }
}

impl Presenter for TracePresenter {
    fn present(&mut self, tick: u64, frame: &[u8]) -> Result<(), PresentError> {
        if tick % self.every != 0 {
            return Ok(());
        }
        let snap = decode(frame)?;
        let alive_enemies = snap
            .enemies
            .iter()
            .filter(|e| e.health.current > 0)
            .count();
        tracing::info!(
            tick,
            x = snap.player.bounds.x,
            y = snap.player.bounds.y,
            health = snap.player.health.current,
            animation = ?snap.player.animation,
            enemies = alive_enemies,
            "Frame"
        );
        Ok(())
    }
}

/// Writes every frame as one JSON object per line.
pub struct JsonLinesPresenter<W: Write + Send> {
    out: W,
}

impl<W: Write + Send> JsonLinesPresenter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl JsonLinesPresenter<BufWriter<File>> {
    pub fn create(path: impl AsRef<Path>) -> Result<Self, PresentError> {
        let file = File::create(path).map_err(PresentError::Io)?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write + Send> Presenter for JsonLinesPresenter<W> {
    fn present(&mut self, _tick: u64, frame: &[u8]) -> Result<(), PresentError> {
        let snap = decode(frame)?;
        serde_json::to_writer(&mut self.out, &snap).map_err(PresentError::Encode)?;
        self.out.write_all(b"\n").map_err(PresentError::Io)
    }

    fn finish(&mut self) -> Result<(), PresentError> {
        self.out.flush().map_err(PresentError::Io)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trot_core::game_trait::FixedStepGame;
    use trot_core::input::MoveIntent;
    use trot_platformer::GoblinTrot;
    use trot_platformer::assets::AssetTable;
    use trot_platformer::config::PlatformerConfig;
    use trot_platformer::level::Level;

    fn meadow() -> GoblinTrot {
        let config = PlatformerConfig::default();
        let level = Level::goblin_trot(&AssetTable::placeholder(), &config).unwrap();
        GoblinTrot::new(level, config)
    }

    #[test]
    fn json_lines_writes_one_line_per_frame() {
        let mut game = meadow();
        let mut presenter = JsonLinesPresenter::new(Vec::new());
        for tick in 1..=3 {
            game.update(&MoveIntent::right());
            presenter.present(tick, &game.serialize_state()).unwrap();
        }
        presenter.finish().unwrap();

        let text = String::from_utf8(presenter.into_inner()).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        let last: serde_json::Value = serde_json::from_str(lines[2]).unwrap();
        assert_eq!(last["tick"], 3);
        assert_eq!(last["enemies"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn garbage_frame_is_a_decode_error() {
        let mut presenter = TracePresenter::new(1);
        let err = presenter.present(1, &[0xc1]).unwrap_err();
        assert!(matches!(err, PresentError::Decode(_)));
    }

    #[test]
    fn trace_presenter_skips_off_interval_frames() {
        let mut presenter = TracePresenter::new(10);
        // Off-interval frames are never decoded, so garbage is fine.
        assert!(presenter.present(3, &[0xc1]).is_ok());
        assert!(presenter.present(10, &meadow().serialize_state()).is_ok());
    }
}
