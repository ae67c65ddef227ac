//! Primitive tree operations.
//!
//! Four operations mutate the document: insertion of new nodes, and the move
//! family — [`Move`](Operation::Move), [`Remove`](Operation::Remove) and
//! [`Reinsert`](Operation::Reinsert) — which share one geometric signature.
//! A removal is a move into the graveyard root and a reinsertion is a move
//! out of it, so every destructive edit stays reversible and every transform
//! reduces to insertion and move handling.

use crate::document::Document;
use crate::node::Node;
use crate::position::{Position, RootId};

/// Shared geometry of the move family.
///
/// `target` is expressed in post-removal coordinates: applying the operation
/// removes `how_many` nodes at `source` and then inserts them at `target` in
/// the document as it stands after the removal. This makes the reverse of a
/// move the move with source and target swapped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveOp {
	/// First moved node.
	pub source: Position,
	/// Destination, in post-removal coordinates.
	pub target: Position,
	/// Number of consecutive nodes moved.
	pub how_many: usize,
}

/// A primitive edit to the document tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
	/// Insert nodes at a position.
	Insert {
		/// Where the first node lands.
		position: Position,
		/// The nodes to insert.
		nodes: Vec<Node>,
	},
	/// Move nodes between document positions.
	Move(MoveOp),
	/// Move nodes into the graveyard.
	Remove(MoveOp),
	/// Move nodes out of the graveyard.
	Reinsert(MoveOp),
}

impl Operation {
	/// Builds a move-family operation, tagged by the roots involved.
	pub fn from_move(op: MoveOp) -> Operation {
		if op.target.root() == RootId::GRAVEYARD {
			Operation::Remove(op)
		} else if op.source.root() == RootId::GRAVEYARD {
			Operation::Reinsert(op)
		} else {
			Operation::Move(op)
		}
	}

	/// Builds the removal of `how_many` nodes at `source`.
	///
	/// Removed content is prepended at the graveyard front; later removals
	/// shift it right and the history rebase keeps older reinsertion sources
	/// pointing at the right nodes.
	pub fn remove(source: Position, how_many: usize) -> Operation {
		Operation::Remove(MoveOp {
			source,
			target: Position::new(RootId::GRAVEYARD, [0]),
			how_many,
		})
	}

	/// Returns the move geometry if this is a move-family operation.
	pub fn as_move(&self) -> Option<&MoveOp> {
		match self {
			Operation::Move(op) | Operation::Remove(op) | Operation::Reinsert(op) => Some(op),
			Operation::Insert { .. } => None,
		}
	}

	/// Mutable access to the move geometry, for conflict post-fixing.
	pub fn as_move_mut(&mut self) -> Option<&mut MoveOp> {
		match self {
			Operation::Move(op) | Operation::Remove(op) | Operation::Reinsert(op) => Some(op),
			Operation::Insert { .. } => None,
		}
	}

	/// Returns the operation that semantically undoes this one, valid in the
	/// document state right after this operation was applied.
	pub fn get_reversed(&self) -> Operation {
		match self {
			Operation::Insert { position, nodes } => {
				Operation::remove(position.clone(), nodes.len())
			}
			Operation::Move(op) | Operation::Remove(op) | Operation::Reinsert(op) => {
				Operation::from_move(MoveOp {
					source: op.target.clone(),
					target: op.source.clone(),
					how_many: op.how_many,
				})
			}
		}
	}

	/// Positions this operation touches, used for document-root checks.
	pub fn positions(&self) -> impl Iterator<Item = &Position> {
		let (first, second) = match self {
			Operation::Insert { position, .. } => (position, None),
			Operation::Move(op) | Operation::Remove(op) | Operation::Reinsert(op) => {
				(&op.source, Some(&op.target))
			}
		};
		std::iter::once(first).chain(second)
	}

	/// Returns `true` if any touched root is attached to the document.
	///
	/// Operations confined to detached fragments do not enter history and
	/// must not be recorded for undo.
	pub fn affects_document(&self, document: &Document) -> bool {
		self.positions()
			.any(|position| document.is_attached(position.root()))
	}
}
