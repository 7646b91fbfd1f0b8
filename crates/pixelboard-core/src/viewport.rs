//! Viewport pan/zoom state for the renderer.
//!
//! Converts between screen coordinates and grid cells. Scale is the edge
//! length of one cell in screen pixels.

use kurbo::{Point, Size};
use serde::{Deserialize, Serialize};

pub const MIN_SCALE: f64 = 1.0;
pub const MAX_SCALE: f64 = 64.0;
pub const DEFAULT_SCALE: f64 = 8.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Viewport {
    pub scale: f64,
    pub offset_x: f64,
    pub offset_y: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            scale: DEFAULT_SCALE,
            offset_x: 0.0,
            offset_y: 0.0,
        }
    }
}

impl Viewport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pan by a delta in screen pixels.
    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        self.offset_x += dx;
        self.offset_y += dy;
    }

    /// Set the zoom level, clamped to [1, 64]. When an anchor screen point
    /// is given, the cell under it stays put.
    pub fn set_scale(&mut self, scale: f64, anchor: Option<Point>) {
        let next = scale.clamp(MIN_SCALE, MAX_SCALE);
        if let Some(a) = anchor {
            let wx = (a.x - self.offset_x) / self.scale;
            let wy = (a.y - self.offset_y) / self.scale;
            self.offset_x = a.x - wx * next;
            self.offset_y = a.y - wy * next;
        }
        self.scale = next;
    }

    /// Center the view on a cell, given the renderer's canvas size.
    pub fn center_on(&mut self, x: f64, y: f64, canvas: Size) {
        self.offset_x = canvas.width / 2.0 - x * self.scale;
        self.offset_y = canvas.height / 2.0 - y * self.scale;
    }

    /// Grid cell under a screen point (may be out of bounds).
    pub fn screen_to_cell(&self, p: Point) -> (i32, i32) {
        let x = ((p.x - self.offset_x) / self.scale).floor() as i32;
        let y = ((p.y - self.offset_y) / self.scale).floor() as i32;
        (x, y)
    }

    /// Screen position of a cell's top-left corner.
    pub fn cell_to_screen(&self, x: i32, y: i32) -> Point {
        Point::new(
            x as f64 * self.scale + self.offset_x,
            y as f64 * self.scale + self.offset_y,
        )
    }
}
