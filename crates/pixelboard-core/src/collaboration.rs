//! Remote update reconciliation and optimistic-write rollback.
//!
//! Inbound messages mutate the grid through [`GridStore::write`] only, never
//! by direct buffer access. In authoritative mode, locally-originated writes
//! are provisional until the remote confirms them; a remote `error` or
//! `denied` rolls every outstanding one back.

use crate::grid::GridStore;
use crate::sync::{PixelUpdate, WireMessage};

/// Outstanding pending operations tracked before new ones are dropped.
pub const PENDING_CAP: usize = 10_000;

/// Pre-write value of an optimistic local edit awaiting confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingOp {
    pub index: usize,
    pub previous: u8,
}

/// What applying one inbound message did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Applied {
    /// Cell updates were applied; `changed` counts real changes.
    Pixels { changed: usize },
    /// A heartbeat-shaped message confirmed the connection.
    Heartbeat,
    /// The remote rejected us; `rolled_back` counts restored pending ops.
    Rejected { message: String, rolled_back: usize },
    /// The message carried nothing for the grid.
    Ignored,
}

#[derive(Debug, Default)]
pub struct Reconciler {
    authoritative: bool,
    pending: Vec<PendingOp>,
}

impl Reconciler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn authoritative(&self) -> bool {
        self.authoritative
    }

    /// Toggle authoritative mode. Disabling discards the pending list so a
    /// later re-enable cannot roll back edits recorded under the old policy.
    pub fn set_authoritative(&mut self, enabled: bool) {
        self.authoritative = enabled;
        if !enabled {
            self.pending.clear();
        }
    }

    pub fn pending(&self) -> &[PendingOp] {
        &self.pending
    }

    /// Record the pre-write value of a local write that was just sent.
    /// The caller gates this on being connected in authoritative mode.
    pub fn record_local_write(&mut self, index: usize, previous: u8) {
        if self.authoritative && self.pending.len() < PENDING_CAP {
            self.pending.push(PendingOp { index, previous });
        }
    }

    /// Apply one inbound message to the grid.
    pub fn apply(&mut self, msg: &WireMessage, grid: &mut GridStore) -> Applied {
        match msg {
            WireMessage::Place { x, y, c } => {
                self.apply_updates(&[PixelUpdate { x: *x, y: *y, c: *c }], grid)
            }
            WireMessage::Multi { list } => self.apply_updates(list, grid),
            WireMessage::FillRect { x0, y0, x1, y1, c } => {
                self.apply_fill(*x0, *y0, *x1, *y1, *c, grid)
            }
            WireMessage::Pong => Applied::Heartbeat,
            WireMessage::Error { message } => self.reject(
                message.clone().unwrap_or_else(|| "server error".to_string()),
                grid,
            ),
            WireMessage::Denied { message, reason } => self.reject(
                message
                    .clone()
                    .or_else(|| reason.clone())
                    .unwrap_or_else(|| "permission denied".to_string()),
                grid,
            ),
            // Ping is answered at the transport layer.
            WireMessage::Ping => Applied::Ignored,
            WireMessage::Unknown => {
                log::debug!("ignoring unrecognized message type");
                Applied::Ignored
            }
        }
    }

    fn apply_updates(&mut self, list: &[PixelUpdate], grid: &mut GridStore) -> Applied {
        let mut changed = 0;
        for update in list {
            // Remote peers may assume different bounds; skip silently.
            if let Some(idx) = grid.index(update.x, update.y) {
                if grid.write(idx, update.c) {
                    changed += 1;
                }
            }
        }

        if self.authoritative && !self.pending.is_empty() {
            // A pending op is confirmed once an inbound update produced the
            // same final value at its index. Matching is by (index, value),
            // not operation identity.
            self.pending.retain(|op| {
                !list.iter().any(|update| {
                    grid.index(update.x, update.y) == Some(op.index)
                        && grid.pixels()[op.index] == update.c
                })
            });
        }

        Applied::Pixels { changed }
    }

    fn apply_fill(
        &mut self,
        x0: i32,
        y0: i32,
        x1: i32,
        y1: i32,
        c: u8,
        grid: &mut GridStore,
    ) -> Applied {
        // Sweep the in-bounds portion only, so a hostile rectangle cannot
        // turn into unbounded work.
        let fx0 = x0.max(0);
        let fy0 = y0.max(0);
        let fx1 = x1.min(grid.width() as i32 - 1);
        let fy1 = y1.min(grid.height() as i32 - 1);

        let mut changed = 0;
        for y in fy0..=fy1 {
            for x in fx0..=fx1 {
                if let Some(idx) = grid.index(x, y) {
                    if grid.write(idx, c) {
                        changed += 1;
                    }
                }
            }
        }

        if self.authoritative && !self.pending.is_empty() {
            let width = grid.width() as i32;
            self.pending.retain(|op| {
                let x = op.index as i32 % width;
                let y = op.index as i32 / width;
                let in_rect = x >= x0 && x <= x1 && y >= y0 && y <= y1;
                !(in_rect && grid.pixels()[op.index] == c)
            });
        }

        Applied::Pixels { changed }
    }

    fn reject(&mut self, message: String, grid: &mut GridStore) -> Applied {
        log::error!("remote rejected session: {}", message);
        let mut rolled_back = 0;
        if self.authoritative {
            // Rollback is a pure replay of recorded previous values; order
            // does not matter.
            for op in self.pending.drain(..) {
                grid.write(op.index, op.previous);
                rolled_back += 1;
            }
        }
        Applied::Rejected { message, rolled_back }
    }
}
