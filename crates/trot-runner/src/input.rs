use std::path::Path;

use serde::Deserialize;

use trot_core::input::MoveIntent;

/// Supplies one intent per tick.
pub trait InputSource: Send {
    fn next_intent(&mut self) -> MoveIntent;

    /// Whether this source has nothing more to say. Sessions stop once it
    /// returns true.
    fn is_exhausted(&self) -> bool {
        false
    }
}

/// Never presses anything.
#[derive(Debug, Default, Clone, Copy)]
pub struct IdleInput;

impl InputSource for IdleInput {
    fn next_intent(&mut self) -> MoveIntent {
        MoveIntent::IDLE
    }
}

/// Hold a set of keys for `ticks` ticks. `jump` fires on the segment's
/// first tick only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct InputSegment {
    pub ticks: u32,
    #[serde(default)]
    pub left: bool,
    #[serde(default)]
    pub right: bool,
    #[serde(default)]
    pub jump: bool,
}

#[derive(Debug)]
pub enum ScriptError {
    Io(std::io::Error),
    Parse(serde_json::Error),
}

impl std::fmt::Display for ScriptError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "failed to read input script: {e}"),
            Self::Parse(e) => write!(f, "invalid input script: {e}"),
        }
    }
}

impl std::error::Error for ScriptError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Parse(e) => Some(e),
        }
    }
}

/// Replays a fixed list of segments, then goes idle.
#[derive(Debug, Clone)]
pub struct ScriptedInput {
    segments: Vec<InputSegment>,
    segment: usize,
    /// Ticks already spent in the current segment.
    elapsed: u32,
}

impl ScriptedInput {
    pub fn new(segments: Vec<InputSegment>) -> Self {
        let mut script = Self {
            segments,
            segment: 0,
            elapsed: 0,
        };
        script.skip_empty();
        script
    }

    /// Parse a JSON array of segments.
    pub fn from_json(text: &str) -> Result<Self, ScriptError> {
        let segments: Vec<InputSegment> = serde_json::from_str(text).map_err(ScriptError::Parse)?;
        Ok(Self::new(segments))
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ScriptError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(ScriptError::Io)?;
        let script = Self::from_json(&text)?;
        tracing::info!(
            path = %path.display(),
            segments = script.segments.len(),
            "Loaded input script"
        );
        Ok(script)
    }

    /// Total ticks covered by the script.
    pub fn len_ticks(&self) -> u64 {
        self.segments.iter().map(|s| u64::from(s.ticks)).sum()
    }

    fn skip_empty(&mut self) {
        while self
            .segments
            .get(self.segment)
            .is_some_and(|s| self.elapsed >= s.ticks)
        {
            self.segment += 1;
            self.elapsed = 0;
        }
    }
}

impl InputSource for ScriptedInput {
    fn next_intent(&mut self) -> MoveIntent {
        let Some(seg) = self.segments.get(self.segment).copied() else {
            return MoveIntent::IDLE;
        };
        let intent = MoveIntent {
            left: seg.left,
            right: seg.right,
            jump: seg.jump && self.elapsed == 0,
        };
        self.elapsed += 1;
        self.skip_empty();
        intent
    }

    fn is_exhausted(&self) -> bool {
        self.segment >= self.segments.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_never_exhausts() {
        let mut input = IdleInput;
        for _ in 0..10 {
            assert_eq!(input.next_intent(), MoveIntent::IDLE);
        }
        assert!(!input.is_exhausted());
    }

    #[test]
    fn jump_fires_on_first_tick_only() {
        let mut input = ScriptedInput::from_json(
            r#"[{"ticks": 3, "right": true, "jump": true}, {"ticks": 1, "jump": true}]"#,
        )
        .unwrap();
        assert_eq!(input.len_ticks(), 4);

        let intents: Vec<_> = (0..4).map(|_| input.next_intent()).collect();
        assert_eq!(
            intents,
            vec![
                MoveIntent {
                    left: false,
                    right: true,
                    jump: true
                },
                MoveIntent::right(),
                MoveIntent::right(),
                MoveIntent::jump(),
            ]
        );
        assert!(input.is_exhausted());
        assert_eq!(input.next_intent(), MoveIntent::IDLE);
    }

    #[test]
    fn zero_tick_segments_are_skipped() {
        let mut input =
            ScriptedInput::from_json(r#"[{"ticks": 0, "left": true}, {"ticks": 1, "right": true}]"#)
                .unwrap();
        assert!(!input.is_exhausted());
        assert_eq!(input.next_intent(), MoveIntent::right());
        assert!(input.is_exhausted());
    }

    #[test]
    fn empty_script_is_exhausted_immediately() {
        let input = ScriptedInput::from_json("[]").unwrap();
        assert!(input.is_exhausted());
    }

    #[test]
    fn malformed_script_is_a_parse_error() {
        let err = ScriptedInput::from_json(r#"[{"right": true}]"#).unwrap_err();
        assert!(matches!(err, ScriptError::Parse(_)));
    }

    #[test]
    fn missing_script_is_io_error() {
        let err = ScriptedInput::load("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, ScriptError::Io(_)));
    }
}
