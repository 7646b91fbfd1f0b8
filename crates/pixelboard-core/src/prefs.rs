//! Renderer-facing view preferences.
//!
//! These never touch the pixel buffer; they exist so share links can carry
//! the grid-overlay and cursor settings between sessions.

use serde::{Deserialize, Serialize};

pub const MIN_GRID_SCALE: u32 = 1;
pub const MAX_GRID_SCALE: u32 = 64;

const DEFAULT_GRID_COLOR: &str = "#ffffff";
const DEFAULT_CURSOR_COLOR: &str = "#ffffff";
const DEFAULT_COOLDOWN_COLOR: &str = "#f97316";
const DEFAULT_PIPETTE_COLOR: &str = "#38bdf8";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CursorStyle {
    #[default]
    Outline,
    Crosshair,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UiPrefs {
    pub show_grid: bool,
    pub grid_color: String,
    pub grid_alpha: f64,
    pub grid_min_scale: u32,
    pub cursor_style: CursorStyle,
    pub cursor_color: String,
    pub cursor_cooldown_color: String,
    pub cursor_pipette_color: String,
    pub show_cursor_hints: bool,
}

impl Default for UiPrefs {
    fn default() -> Self {
        Self {
            show_grid: false,
            grid_color: DEFAULT_GRID_COLOR.to_string(),
            grid_alpha: 0.08,
            grid_min_scale: 8,
            cursor_style: CursorStyle::Outline,
            cursor_color: DEFAULT_CURSOR_COLOR.to_string(),
            cursor_cooldown_color: DEFAULT_COOLDOWN_COLOR.to_string(),
            cursor_pipette_color: DEFAULT_PIPETTE_COLOR.to_string(),
            show_cursor_hints: true,
        }
    }
}

impl UiPrefs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_grid_color(&mut self, color: &str) {
        self.grid_color = if color.is_empty() {
            DEFAULT_GRID_COLOR.to_string()
        } else {
            color.to_string()
        };
    }

    pub fn set_grid_alpha(&mut self, alpha: f64) {
        self.grid_alpha = alpha.clamp(0.0, 1.0);
    }

    pub fn set_grid_min_scale(&mut self, scale: u32) {
        self.grid_min_scale = scale.clamp(MIN_GRID_SCALE, MAX_GRID_SCALE);
    }
}
