//! Batches: atomic units of change on the change stream.

use crate::delta::Delta;
use crate::document::Document;

/// Document-unique identity of a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BatchId(pub(crate) u64);

/// Provenance tag of a batch.
///
/// Externally created batches default to [`User`](BatchKind::User); the undo
/// core tags the batches it emits so the change stream can route them to the
/// opposite stack without re-entering the cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BatchKind {
	/// A user-originated edit.
	#[default]
	User,
	/// A batch emitted by an undo step.
	Undo,
	/// A batch emitted by a redo step.
	Redo,
}

/// An ordered sequence of deltas applied as one unit.
#[derive(Debug, Clone)]
pub struct Batch {
	pub(crate) id: BatchId,
	pub(crate) kind: BatchKind,
	pub(crate) deltas: Vec<Delta>,
}

impl Batch {
	/// Returns the batch identity.
	pub fn id(&self) -> BatchId {
		self.id
	}

	/// Returns the provenance tag.
	pub fn kind(&self) -> BatchKind {
		self.kind
	}

	/// Returns the deltas in application order.
	pub fn deltas(&self) -> &[Delta] {
		&self.deltas
	}

	/// Returns `true` if the batch carries no deltas.
	pub fn is_empty(&self) -> bool {
		self.deltas.is_empty()
	}

	/// Returns `true` if any operation touches an attached root.
	pub fn affects_document(&self, document: &Document) -> bool {
		self.deltas
			.iter()
			.flat_map(|delta| delta.operations())
			.any(|op| op.affects_document(document))
	}
}
