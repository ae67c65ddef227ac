//! Stacks of recorded batches with their selection captures.


use rustc_hash::FxHashSet;
use tracing::trace;
use vellum_model::{Batch, BatchId, SelectionSnapshot};

use crate::error::{Result, UndoError};

/// A recorded batch together with the selection captured when it was
/// recorded. Created on record, destroyed when reverted or cleared.
#[derive(Debug, Clone)]
pub struct HistoryItem {
	/// The recorded batch.
	pub batch: Batch,
	/// Selection as it stood before the batch applied.
	pub selection: SelectionSnapshot,
}

/// An ordered stack of [`HistoryItem`]s with identity deduplication.
///
/// The companion identity set guarantees a batch is present at most once;
/// popping releases the identity so the same batch may be recorded again
/// later, which the undo/redo cycle relies on.
#[derive(Debug, Default)]
pub struct HistoryStack {
	items: Vec<HistoryItem>,
	present: FxHashSet<BatchId>,
}

impl HistoryStack {
	/// Creates an empty stack.
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns `true` if there is nothing to revert.
	pub fn is_empty(&self) -> bool {
		self.items.is_empty()
	}

	/// Returns the number of recorded items.
	pub fn len(&self) -> usize {
		self.items.len()
	}

	/// Returns the most recently recorded item, if any.
	pub fn last_item(&self) -> Option<&HistoryItem> {
		self.items.last()
	}

	/// Records a batch with its selection capture.
	///
	/// Idempotent by batch identity: recording a batch that is already
	/// present is a no-op and does not refresh the stored selection. Empty
	/// batches never enter. Returns whether the stack changed.
	pub fn record(&mut self, batch: Batch, selection: SelectionSnapshot) -> bool {
		if batch.is_empty() {
			return false;
		}
		if !self.present.insert(batch.id()) {
			trace!(batch = ?batch.id(), "batch already recorded, ignoring");
			return false;
		}
		trace!(batch = ?batch.id(), kind = ?batch.kind(), len = self.items.len() + 1, "batch recorded");
		self.items.push(HistoryItem { batch, selection });
		true
	}

	/// Drops all items and identities. Returns whether the stack changed.
	pub fn clear(&mut self) -> bool {
		if self.items.is_empty() {
			return false;
		}
		trace!(cleared = self.items.len(), "stack cleared");
		self.items.clear();
		self.present.clear();
		true
	}

	/// Returns the item for `target`, or the top item when `target` is
	/// `None`, without removing it.
	pub fn peek(&self, target: Option<BatchId>) -> Result<&HistoryItem> {
		match target {
			Some(id) => self
				.items
				.iter()
				.find(|item| item.batch.id() == id)
				.ok_or(UndoError::NotFound(id)),
			None => self.items.last().ok_or(UndoError::EmptyStack),
		}
	}

	/// Removes and returns the item for `target`, or the top item when
	/// `target` is `None`, releasing its identity for later re-recording.
	pub fn pop_item(&mut self, target: Option<BatchId>) -> Result<HistoryItem> {
		let item = match target {
			Some(id) => {
				let index = self
					.items
					.iter()
					.position(|item| item.batch.id() == id)
					.ok_or(UndoError::NotFound(id))?;
				self.items.remove(index)
			}
			None => self.items.pop().ok_or(UndoError::EmptyStack)?,
		};
		self.present.remove(&item.batch.id());
		trace!(batch = ?item.batch.id(), len = self.items.len(), "batch popped");
		Ok(item)
	}
}
