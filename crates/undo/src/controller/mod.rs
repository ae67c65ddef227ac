//! The undo controller: change-stream routing and revert steps.
//!
//! ```text
//! UndoController                    Document
//! ┌───────────────────┐            ┌──────────────────────────┐
//! │ undo_side         │◄─observe───│ change stream (batches)  │
//! │ redo_side         │            │ enqueue_change(kind)     │
//! │                   │──revert───►│ history rebase + apply   │
//! │ undo() / redo()   │            └──────────────────────────┘
//! └───────────────────┘
//! ```
//!
//! Incoming batches are routed by their kind tag: user batches are recorded
//! on the undo side and clear the redo side; batches emitted by an undo step
//! land on the redo side and vice versa. A step reverts an item inside one
//! change scope, so the applied operations ship as a single batch carrying
//! the step's kind — the change stream then re-enters the controller and
//! records that batch on the opposite side. Reverting the emitted batches in
//! turn gives redo-of-undo and undo-of-redo without extra machinery.


use tracing::{trace, warn};
use vellum_model::{Batch, BatchId, BatchKind, ChangeEvent, Document};

use crate::error::Result;
use crate::reversion;
use crate::stack::HistoryStack;

/// Kind of revert step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryKind {
	Undo,
	Redo,
}

impl HistoryKind {
	/// The tag carried by the batch this step emits.
	fn batch_kind(self) -> BatchKind {
		match self {
			HistoryKind::Undo => BatchKind::Undo,
			HistoryKind::Redo => BatchKind::Redo,
		}
	}
}

/// Host-side notifications for undo activity.
///
/// Implemented by the surrounding editor to refresh command enablement and
/// react to completed steps. All methods default to no-ops so headless use
/// can pass `&mut ()`.
pub trait UndoHost {
	/// A step completed; `batch` is the original recorded batch that was
	/// reverted and `kind` the tag of the emitted reversion batch.
	fn on_reverted(&mut self, batch: &Batch, kind: BatchKind) {
		let _ = (batch, kind);
	}

	/// A stack changed; enabled state may need refreshing.
	fn on_stack_change(&mut self) {}
}

impl UndoHost for () {}

/// Records user batches and drives undo/redo steps over them.
#[derive(Debug, Default)]
pub struct UndoController {
	undo_side: HistoryStack,
	redo_side: HistoryStack,
}

impl UndoController {
	/// Creates a controller with empty stacks.
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns `true` if there is something to undo.
	pub fn can_undo(&self) -> bool {
		!self.undo_side.is_empty()
	}

	/// Returns `true` if there is something to redo.
	pub fn can_redo(&self) -> bool {
		!self.redo_side.is_empty()
	}

	/// Returns the number of undoable items.
	pub fn undo_len(&self) -> usize {
		self.undo_side.len()
	}

	/// Returns the number of redoable items.
	pub fn redo_len(&self) -> usize {
		self.redo_side.len()
	}

	/// Returns the undo-side stack.
	pub fn undo_side(&self) -> &HistoryStack {
		&self.undo_side
	}

	/// Returns the redo-side stack.
	pub fn redo_side(&self) -> &HistoryStack {
		&self.redo_side
	}

	/// Drains the document's pending change events through the classifier.
	///
	/// Call after every change scope; steps call it themselves to route the
	/// batch they emitted.
	pub fn observe(&mut self, document: &mut Document, host: &mut impl UndoHost) {
		while let Some(event) = document.poll_change() {
			self.handle_change(document, event, host);
		}
	}

	/// Routes one change event to the appropriate stack.
	fn handle_change(&mut self, document: &Document, event: ChangeEvent, host: &mut impl UndoHost) {
		let ChangeEvent {
			batch,
			selection_before,
		} = event;
		if batch.is_empty() || !batch.affects_document(document) {
			trace!(batch = ?batch.id(), "ignoring non-document batch");
			return;
		}
		let changed = match batch.kind() {
			BatchKind::User => {
				let recorded = self.undo_side.record(batch, selection_before);
				let cleared = self.redo_side.clear();
				recorded || cleared
			}
			BatchKind::Undo => self.redo_side.record(batch, selection_before),
			BatchKind::Redo => self.undo_side.record(batch, selection_before),
		};
		if changed {
			host.on_stack_change();
		}
	}

	/// Reverts the targeted batch (or the newest item) from the undo side.
	///
	/// The emitted batch is tagged [`BatchKind::Undo`] and lands on the redo
	/// side via the change stream.
	pub fn undo(
		&mut self,
		document: &mut Document,
		host: &mut impl UndoHost,
		target: Option<BatchId>,
	) -> Result<()> {
		self.step(document, host, target, HistoryKind::Undo)
	}

	/// Reverts the targeted batch (or the newest item) from the redo side.
	///
	/// The emitted batch is tagged [`BatchKind::Redo`] and lands on the undo
	/// side via the change stream.
	pub fn redo(
		&mut self,
		document: &mut Document,
		host: &mut impl UndoHost,
		target: Option<BatchId>,
	) -> Result<()> {
		self.step(document, host, target, HistoryKind::Redo)
	}

	fn step(
		&mut self,
		document: &mut Document,
		host: &mut impl UndoHost,
		target: Option<BatchId>,
		kind: HistoryKind,
	) -> Result<()> {
		let stack = match kind {
			HistoryKind::Undo => &mut self.undo_side,
			HistoryKind::Redo => &mut self.redo_side,
		};
		let item = match stack.peek(target) {
			Ok(item) => item.clone(),
			Err(error) => {
				warn!(?kind, %error, "step is a no-op");
				return Err(error);
			}
		};

		// The item is consumed only after the scope succeeds; a failure rolls
		// the document back and leaves the stack as it was.
		let (emitted, ()) = document.enqueue_change(kind.batch_kind(), |writer| {
			let selection = reversion::revert(writer, &item)?;
			if let Some(snapshot) = selection {
				writer.set_selection(snapshot.ranges, snapshot.is_backward);
			}
			Ok(())
		})?;

		let _ = stack.pop_item(Some(item.batch.id()))?;
		trace!(
			batch = ?item.batch.id(),
			emitted = ?emitted.id(),
			?kind,
			"revert step applied"
		);
		host.on_stack_change();
		host.on_reverted(&item.batch, kind.batch_kind());
		self.observe(document, host);
		Ok(())
	}
}
