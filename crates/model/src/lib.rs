//! Tree document model for the vellum editing engine.
//!
//! The document is a forest of named roots holding elements and character
//! nodes. Edits are expressed as primitive [`Operation`]s grouped into
//! [`Delta`]s, shipped in [`Batch`]es through the single change scope of
//! [`Document::enqueue_change`], and logged in an append-only [`History`]
//! whose rebase engine transforms old deltas onto the current tip. Positions
//! and ranges carry the transformation primitives everything else builds on.

mod batch;
mod delta;
mod document;
mod error;
mod history;
mod node;
mod operation;
mod position;
mod range;
mod selection;

pub use batch::{Batch, BatchId, BatchKind};
pub use delta::{Delta, DeltaId};
pub use document::{ChangeEvent, ChangeWriter, Document};
pub use error::{ModelError, Result};
pub use history::{History, HistoryEntry};
pub use node::{Element, Node};
pub use operation::{MoveOp, Operation};
pub use position::{Path, Position, RootId};
pub use range::Range;
pub use selection::{DocumentSelection, SelectionSnapshot};
