use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Axis-aligned box in world pixels. Y grows downward.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn left(&self) -> f32 {
        self.x
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn top(&self) -> f32 {
        self.y
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Move so the bottom edge sits at `y`.
    pub fn set_bottom(&mut self, y: f32) {
        self.y = y - self.height;
    }

    /// Move so the top edge sits at `y`.
    pub fn set_top(&mut self, y: f32) {
        self.y = y;
    }

    /// Copy of this box shifted by `(dx, dy)`.
    pub fn offset(&self, dx: f32, dy: f32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            ..*self
        }
    }

    /// Strict intersection: boxes that only share an edge do not intersect.
    pub fn intersects(&self, other: &Bounds) -> bool {
        self.left() < other.right()
            && self.right() > other.left()
            && self.top() < other.bottom()
            && self.bottom() > other.top()
    }

    /// Width of the shared horizontal span, measured from whichever side
    /// penetrates less. Negative when the boxes are horizontally apart.
    pub fn horizontal_overlap(&self, other: &Bounds) -> f32 {
        (self.right() - other.left()).min(other.right() - self.left())
    }
}

/// Errors produced while building a [`Mask`] from text rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MaskError {
    Empty,
    Ragged {
        row: usize,
        expected: usize,
        found: usize,
    },
    InvalidCell {
        row: usize,
        col: usize,
        cell: char,
    },
}

impl std::fmt::Display for MaskError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "mask has no rows"),
            Self::Ragged {
                row,
                expected,
                found,
            } => write!(
                f,
                "mask row {row} has {found} cells, expected {expected}"
            ),
            Self::InvalidCell { row, col, cell } => {
                write!(f, "mask cell {cell:?} at row {row}, column {col} is not '#' or '.'")
            },
        }
    }
}

impl std::error::Error for MaskError {}

/// Per-pixel occupancy, stored row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mask {
    width: u32,
    height: u32,
    bits: Vec<bool>,
}

impl Mask {
    /// A mask with every pixel set.
    pub fn full(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            bits: vec![true; width as usize * height as usize],
        }
    }

    /// Parse rows of `#` (solid) and `.` (empty).
    pub fn from_rows<S: AsRef<str>>(rows: &[S]) -> Result<Self, MaskError> {
        let Some(first) = rows.first() else {
            return Err(MaskError::Empty);
        };
        let width = first.as_ref().chars().count();
        if width == 0 {
            return Err(MaskError::Empty);
        }

        let mut bits = Vec::with_capacity(width * rows.len());
        for (row, line) in rows.iter().enumerate() {
            let line = line.as_ref();
            let found = line.chars().count();
            if found != width {
                return Err(MaskError::Ragged {
                    row,
                    expected: width,
                    found,
                });
            }
            for (col, cell) in line.chars().enumerate() {
                match cell {
                    '#' => bits.push(true),
                    '.' => bits.push(false),
                    _ => return Err(MaskError::InvalidCell { row, col, cell }),
                }
            }
        }

        Ok(Self {
            width: width as u32,
            height: rows.len() as u32,
            bits,
        })
    }

    /// Nearest-neighbour upscale by an integer factor.
    pub fn scaled(&self, factor: u32) -> Self {
        if factor <= 1 {
            return self.clone();
        }
        let width = self.width * factor;
        let height = self.height * factor;
        let mut bits = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                bits.push(self.get((x / factor) as i64, (y / factor) as i64));
            }
        }
        Self {
            width,
            height,
            bits,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Occupancy at a local pixel. Anything outside the mask is empty.
    pub fn get(&self, x: i64, y: i64) -> bool {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return false;
        }
        self.bits[y as usize * self.width as usize + x as usize]
    }

    pub fn count_solid(&self) -> usize {
        self.bits.iter().filter(|&&b| b).count()
    }
}

/// Collision shape: a box plus an optional silhouette shared between
/// entities of the same sprite kind.
#[derive(Debug, Clone)]
pub struct Shape {
    pub bounds: Bounds,
    pub mask: Option<Arc<Mask>>,
}

impl Shape {
    pub fn boxed(bounds: Bounds) -> Self {
        Self { bounds, mask: None }
    }

    pub fn with_mask(bounds: Bounds, mask: Option<Arc<Mask>>) -> Self {
        Self { bounds, mask }
    }

    fn solid_at(&self, local_x: i64, local_y: i64) -> bool {
        match &self.mask {
            Some(mask) => mask.get(local_x, local_y),
            None => true,
        }
    }

    /// Box test first, then a per-pixel test over the shared region when
    /// either side carries a mask.
    pub fn overlaps(&self, other: &Shape) -> bool {
        if !self.bounds.intersects(&other.bounds) {
            return false;
        }
        if self.mask.is_none() && other.mask.is_none() {
            return true;
        }

        let (ax, ay) = pixel_origin(&self.bounds);
        let (bx, by) = pixel_origin(&other.bounds);
        let left = ax.max(bx);
        let right = (ax + self.bounds.width.round() as i64).min(bx + other.bounds.width.round() as i64);
        let top = ay.max(by);
        let bottom =
            (ay + self.bounds.height.round() as i64).min(by + other.bounds.height.round() as i64);

        for py in top..bottom {
            for px in left..right {
                if self.solid_at(px - ax, py - ay) && other.solid_at(px - bx, py - by) {
                    return true;
                }
            }
        }
        false
    }
}

fn pixel_origin(bounds: &Bounds) -> (i64, i64) {
    (bounds.x.round() as i64, bounds.y.round() as i64)
}
