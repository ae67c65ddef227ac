//! Undo/redo core for the vellum editing engine.
//!
//! Batches arriving on the document's change stream are recorded together
//! with a selection capture on two [`HistoryStack`]s. A step reverses a
//! recorded batch's deltas, rebases them over everything that happened
//! since, applies them as one kind-tagged batch, and restores the selection
//! as it logically stood before the original change — the change stream then
//! routes the emitted batch to the opposite stack, closing the undo/redo
//! cycle.

mod controller;
mod error;
mod reversion;
mod stack;

pub use controller::{HistoryKind, UndoController, UndoHost};
pub use error::{Result, UndoError};
pub use reversion::revert;
pub use stack::{HistoryItem, HistoryStack};
