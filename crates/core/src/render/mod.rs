use serde::{Deserialize, Serialize};

use crate::{FxError, Result};

/// Straight-alpha color. Channels are 8-bit, alpha is a `[0, 1]` factor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Rgba {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Parses `#RRGGBB` (the leading `#` is optional).
    pub fn from_hex(hex: &str) -> Result<Self> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(FxError::InvalidColor(hex.to_string()));
        }

        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&digits[range], 16)
                .map_err(|_| FxError::InvalidColor(hex.to_string()))
        };

        Ok(Self::rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }

    /// Returns the same color with alpha clamped into `[0, 1]`.
    pub fn with_alpha(self, alpha: f32) -> Self {
        Self {
            a: alpha.clamp(0.0, 1.0),
            ..self
        }
    }
}

/// Pixel dimensions of a drawing surface or viewport.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SurfaceSize {
    pub width: f32,
    pub height: f32,
}

impl SurfaceSize {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// The drawing primitives the effect loops need from the host.
pub trait Surface {
    fn size(&self) -> SurfaceSize;

    fn resize(&mut self, size: SurfaceSize);

    /// Clears the whole surface.
    fn clear(&mut self);

    fn fill_circle(&mut self, x: f32, y: f32, radius: f32, color: Rgba);

    /// Fills a `width` x `height` rectangle centered on `(x, y)` and rotated
    /// by `rotation` radians around its center.
    fn fill_rotated_rect(&mut self, x: f32, y: f32, width: f32, height: f32, rotation: f32, color: Rgba);
}

/// A single primitive recorded by [`RecordingSurface`].
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Circle {
        x: f32,
        y: f32,
        radius: f32,
        color: Rgba,
    },
    RotatedRect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        rotation: f32,
        color: Rgba,
    },
}

/// Headless surface that keeps the commands issued since the last clear.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    size: SurfaceSize,
    commands: Vec<DrawCommand>,
    clears: usize,
}

impl RecordingSurface {
    pub fn new(size: SurfaceSize) -> Self {
        Self {
            size,
            ..Default::default()
        }
    }

    /// Commands drawn since the most recent clear.
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Number of times the surface has been cleared.
    pub fn clears(&self) -> usize {
        self.clears
    }

    pub fn is_blank(&self) -> bool {
        self.commands.is_empty()
    }
}

impl Surface for RecordingSurface {
    fn size(&self) -> SurfaceSize {
        self.size
    }

    fn resize(&mut self, size: SurfaceSize) {
        // Resizing a canvas drops its contents.
        self.size = size;
        self.commands.clear();
    }

    fn clear(&mut self) {
        self.commands.clear();
        self.clears += 1;
    }

    fn fill_circle(&mut self, x: f32, y: f32, radius: f32, color: Rgba) {
        self.commands.push(DrawCommand::Circle {
            x,
            y,
            radius,
            color,
        });
    }

    fn fill_rotated_rect(&mut self, x: f32, y: f32, width: f32, height: f32, rotation: f32, color: Rgba) {
        self.commands.push(DrawCommand::RotatedRect {
            x,
            y,
            width,
            height,
            rotation,
            color,
        });
    }
}
