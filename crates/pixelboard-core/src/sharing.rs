//! Snapshot, export/import, and share-link codecs.
//!
//! Everything here decodes untrusted input: failures come back as `None` or
//! `false` with a log line, never a panic, and nothing is applied partially.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

use crate::grid::GridStore;
use crate::palette::Rgb;
use crate::prefs::CursorStyle;
use crate::storage::PixelSnapshot;
use crate::viewport::Viewport;

/// Key snapshots are persisted under.
pub const SNAPSHOT_KEY: &str = "pixel-board-v1";

/// Prefix marking a share-state URL fragment.
pub const HASH_PREFIX: &str = "#pb=";

const SHARE_VERSION: u32 = 1;

pub fn encode_pixels(pixels: &[u8]) -> String {
    STANDARD.encode(pixels)
}

pub fn decode_pixels(b64: &str) -> Option<Vec<u8>> {
    STANDARD.decode(b64).ok()
}

/// JSON export shape: `{w, h, b64, palette}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardExport {
    pub w: usize,
    pub h: usize,
    pub b64: String,
    #[serde(default)]
    pub palette: Vec<String>,
}

/// Cursor settings carried by a share link. Every field is optional so old
/// links keep decoding as the shape grows.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CursorShare {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<CursorStyle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cooldown: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pipette: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hints: Option<bool>,
}

/// Versioned view state encoded into a URL fragment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShareState {
    pub v: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vp: Option<Viewport>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub s: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub g: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gc: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ga: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gs: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cursor: Option<CursorShare>,
}

impl ShareState {
    pub fn new() -> Self {
        Self {
            v: SHARE_VERSION,
            vp: None,
            s: None,
            g: None,
            gc: None,
            ga: None,
            gs: None,
            cursor: None,
        }
    }
}

impl Default for ShareState {
    fn default() -> Self {
        Self::new()
    }
}

/// Encode view state as a `#pb=`-prefixed base64 fragment.
pub fn encode_share(state: &ShareState) -> String {
    match serde_json::to_string(state) {
        Ok(json) => format!("{}{}", HASH_PREFIX, STANDARD.encode(json.as_bytes())),
        Err(err) => {
            log::warn!("failed to encode share state: {}", err);
            String::new()
        }
    }
}

/// Decode a share fragment. Rejects a missing prefix, undecodable payload,
/// or unknown version; unknown fields inside the payload are ignored.
pub fn decode_share(hash: &str) -> Option<ShareState> {
    let b64 = hash.strip_prefix(HASH_PREFIX)?;
    let bytes = STANDARD.decode(b64).ok()?;
    let json = String::from_utf8(bytes).ok()?;
    let state: ShareState = match serde_json::from_str(&json) {
        Ok(state) => state,
        Err(err) => {
            log::warn!("failed to parse share state: {}", err);
            return None;
        }
    };
    if state.v != SHARE_VERSION {
        log::warn!("rejecting share state with unknown version {}", state.v);
        return None;
    }
    Some(state)
}

/// Capture the grid as a persistable snapshot.
pub fn snapshot(grid: &GridStore) -> PixelSnapshot {
    PixelSnapshot {
        w: grid.width(),
        h: grid.height(),
        b64: encode_pixels(grid.pixels()),
        s: Some(grid.selected()),
    }
}

/// Apply a snapshot onto the grid. Dimensions and decoded buffer length
/// must match the live grid; nothing is touched otherwise.
pub fn apply_snapshot(grid: &mut GridStore, snap: &PixelSnapshot) -> bool {
    if snap.w != grid.width() || snap.h != grid.height() {
        log::warn!(
            "snapshot is {}x{}, grid is {}x{}; not applying",
            snap.w,
            snap.h,
            grid.width(),
            grid.height()
        );
        return false;
    }
    let Some(data) = decode_pixels(&snap.b64) else {
        log::warn!("snapshot buffer is not valid base64");
        return false;
    };
    if !grid.overwrite_pixels(&data) {
        log::warn!("snapshot buffer length does not match grid");
        return false;
    }
    if let Some(s) = snap.s {
        grid.set_selected(s);
    }
    true
}

/// Encode the grid as an RGB8 PNG through the palette.
pub fn export_png(grid: &GridStore) -> Option<Vec<u8>> {
    let mut rgb = vec![0u8; grid.pixels().len() * 3];
    let palette = grid.palette();
    for (i, &p) in grid.pixels().iter().enumerate() {
        let color = palette.get(p as usize).copied().unwrap_or(Rgb::BLACK);
        rgb[i * 3] = color.r;
        rgb[i * 3 + 1] = color.g;
        rgb[i * 3 + 2] = color.b;
    }

    let mut out = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut out, grid.width() as u32, grid.height() as u32);
        encoder.set_color(png::ColorType::Rgb);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = match encoder.write_header() {
            Ok(writer) => writer,
            Err(err) => {
                log::warn!("png header failed: {}", err);
                return None;
            }
        };
        if let Err(err) = writer.write_image_data(&rgb) {
            log::warn!("png encode failed: {}", err);
            return None;
        }
    }
    Some(out)
}
