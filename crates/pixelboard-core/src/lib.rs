//! Pixelboard Core Library
//!
//! Client-side engine for a shared, grid-based pixel canvas: the pixel
//! buffer with dirty/full-redraw change tracking, a bounded undo log,
//! rectangular-selection fill, and a reconnecting WebSocket sync layer with
//! optimistic-write rollback. Rendering and input handling live elsewhere;
//! this crate only exposes the state they observe and mutate.

pub mod board;
pub mod collaboration;
pub mod grid;
pub mod history;
pub mod palette;
pub mod prefs;
pub mod selection;
pub mod sharing;
pub mod storage;
pub mod sync;
pub mod viewport;

pub use board::{NetStatus, PixelBoard, Tool};
pub use collaboration::{Applied, PendingOp, Reconciler};
pub use grid::{DirtyRegion, GridStore};
pub use history::{HistoryEntry, HistoryLog};
pub use palette::Rgb;
pub use prefs::{CursorStyle, UiPrefs};
pub use selection::Selection;
pub use sharing::{BoardExport, ShareState};
pub use storage::{MemoryStorage, PixelSnapshot, SnapshotStore, StorageError};
pub use sync::{
    ClientEvent, ConnectionState, PixelUpdate, SocketEvent, SocketTransport, TransportClient,
    WireMessage,
};
pub use viewport::Viewport;

#[cfg(not(target_arch = "wasm32"))]
pub use storage::FileStorage;

#[cfg(not(target_arch = "wasm32"))]
pub use sync::WebSocketTransport;
