//! Deltas: semantically meaningful edits composed of primitive operations.

use crate::operation::Operation;

/// Document-unique identity of a delta.
///
/// Identities are stamped by the document when a delta is applied or rebased;
/// a freshly built or reversed delta is detached until then.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DeltaId(pub(crate) u64);

impl DeltaId {
	pub(crate) const DETACHED: DeltaId = DeltaId(0);

	/// Returns `true` if this delta has not been stamped by a document yet.
	pub fn is_detached(self) -> bool {
		self == Self::DETACHED
	}
}

/// An ordered sequence of operations produced against one history version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delta {
	pub(crate) id: DeltaId,
	pub(crate) base_version: u64,
	/// The operations, in application order.
	pub operations: Vec<Operation>,
}

impl Delta {
	pub(crate) fn new(base_version: u64, operations: Vec<Operation>) -> Self {
		Self {
			id: DeltaId::DETACHED,
			base_version,
			operations,
		}
	}

	/// Returns the delta identity.
	pub fn id(&self) -> DeltaId {
		self.id
	}

	/// Returns the history version this delta was produced against.
	pub fn base_version(&self) -> u64 {
		self.base_version
	}

	/// Returns the operations in application order.
	pub fn operations(&self) -> &[Operation] {
		&self.operations
	}

	/// Returns the single move-family operation, if this delta is one move.
	pub fn as_single_move(&self) -> Option<&crate::operation::MoveOp> {
		match self.operations.as_slice() {
			[op] => op.as_move(),
			_ => None,
		}
	}

	/// Returns a delta that semantically undoes this one.
	///
	/// Operations are reversed individually, in reverse order, and the result
	/// is based one version later: it is valid in the document state right
	/// after this delta was applied and must be rebased over anything newer.
	pub fn get_reversed(&self) -> Delta {
		let operations = self
			.operations
			.iter()
			.rev()
			.map(Operation::get_reversed)
			.collect();
		Delta::new(self.base_version + 1, operations)
	}
}
