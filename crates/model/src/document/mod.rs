//! The document: roots, history, selection and the change scope.
//!
//! All mutation happens inside [`Document::enqueue_change`], which bundles
//! every applied delta into one [`Batch`] tagged with the scope's kind and
//! delivers it on the change stream only after the scope succeeds. On error
//! the document is rolled back to the scope entry state, so partial
//! application is never observable.

#[cfg(test)]
mod tests;

use std::collections::VecDeque;

use tracing::trace;

use crate::batch::{Batch, BatchId, BatchKind};
use crate::delta::{Delta, DeltaId};
use crate::error::{ModelError, Result};
use crate::history::{self, History, HistoryEntry};
use crate::node::{Element, Node};
use crate::operation::{MoveOp, Operation};
use crate::position::{Position, RootId};
use crate::range::Range;
use crate::selection::{DocumentSelection, SelectionSnapshot};

/// A change delivered on the document's change stream.
#[derive(Debug, Clone)]
pub struct ChangeEvent {
	/// The applied batch.
	pub batch: Batch,
	/// The live selection as it stood when the change scope opened.
	///
	/// Events are delivered after the scope exits, so the pre-change capture
	/// rides on the event for consumers that need it (undo recording does).
	pub selection_before: SelectionSnapshot,
}

#[derive(Debug, Clone)]
struct RootSlot {
	element: Element,
	attached: bool,
}

/// A tree-structured document with history and a change stream.
///
/// The graveyard root for logically deleted content is created up front and
/// is always [`RootId::GRAVEYARD`]. Further roots are attached with
/// [`create_root`](Self::create_root); [`create_fragment`](Self::create_fragment)
/// makes a detached root whose edits never reach history.
#[derive(Debug)]
pub struct Document {
	roots: Vec<RootSlot>,
	history: History,
	selection: DocumentSelection,
	pending: VecDeque<ChangeEvent>,
	next_delta_id: u64,
	next_batch_id: u64,
}

impl Default for Document {
	fn default() -> Self {
		Self::new()
	}
}

impl Document {
	/// Creates an empty document holding only the graveyard root.
	pub fn new() -> Self {
		Self {
			roots: vec![RootSlot {
				element: Element::new("$graveyard"),
				attached: true,
			}],
			history: History::default(),
			selection: DocumentSelection::default(),
			pending: VecDeque::new(),
			next_delta_id: 1,
			next_batch_id: 1,
		}
	}

	/// Creates and attaches a new document root.
	pub fn create_root(&mut self, name: impl Into<String>) -> RootId {
		self.roots.push(RootSlot {
			element: Element::new(name),
			attached: true,
		});
		RootId(self.roots.len() as u32 - 1)
	}

	/// Creates a detached fragment root.
	///
	/// Operations confined to a fragment are applied to its tree but are not
	/// versioned, logged or recorded for undo.
	pub fn create_fragment(&mut self) -> RootId {
		self.roots.push(RootSlot {
			element: Element::new("$fragment"),
			attached: false,
		});
		RootId(self.roots.len() as u32 - 1)
	}

	/// Returns the graveyard root id.
	pub fn graveyard(&self) -> RootId {
		RootId::GRAVEYARD
	}

	/// Returns `true` if the root exists and is attached to the document.
	pub fn is_attached(&self, root: RootId) -> bool {
		self.roots
			.get(root.0 as usize)
			.is_some_and(|slot| slot.attached)
	}

	/// Returns the root element.
	pub fn root(&self, root: RootId) -> Result<&Element> {
		self.roots
			.get(root.0 as usize)
			.map(|slot| &slot.element)
			.ok_or(ModelError::UnknownRoot(root))
	}

	/// Returns the concatenated character content of a root, in order.
	pub fn text_of(&self, root: RootId) -> Result<String> {
		let mut out = String::new();
		self.root(root)?.collect_text(&mut out);
		Ok(out)
	}

	/// Returns the history log.
	pub fn history(&self) -> &History {
		&self.history
	}

	/// Returns the current document version.
	pub fn version(&self) -> u64 {
		self.history.version()
	}

	/// Returns the live selection.
	pub fn selection(&self) -> &DocumentSelection {
		&self.selection
	}

	/// Replaces the live selection.
	pub fn set_selection(&mut self, ranges: Vec<Range>, is_backward: bool) {
		self.selection.set_ranges(ranges, is_backward);
	}

	/// Takes the next pending change event, in application order.
	pub fn poll_change(&mut self) -> Option<ChangeEvent> {
		self.pending.pop_front()
	}

	/// Rebases a delta onto the current history tip.
	///
	/// Returns `None` when the rebase leaves no operations; the delta is
	/// then fully obsoleted by later history.
	pub fn rebase_onto_tip(&mut self, delta: &Delta) -> Option<Delta> {
		let operations = history::rebase_operations(&self.history, delta);
		if operations.is_empty() {
			trace!(delta = ?delta.id(), "rebase produced no operations");
			return None;
		}
		let mut rebased = Delta::new(self.history.version(), operations);
		rebased.id = self.next_delta_id();
		Some(rebased)
	}

	/// Runs `scope` with exclusive mutation access and ships everything it
	/// applied as one batch of the given kind.
	///
	/// The change event is enqueued only when the scope returns `Ok` and the
	/// batch is non-empty. On `Err` the roots, history, version and selection
	/// are restored to the scope entry state. The writer's exclusive borrow
	/// rules out nested scopes.
	pub fn enqueue_change<T>(
		&mut self,
		kind: BatchKind,
		scope: impl FnOnce(&mut ChangeWriter<'_>) -> Result<T>,
	) -> Result<(Batch, T)> {
		let saved_roots = self.roots.clone();
		let saved_history = self.history.entries().len();
		let saved_selection = self.selection.clone();
		let selection_before = self.selection.snapshot();
		let batch = Batch {
			id: self.next_batch_id(),
			kind,
			deltas: Vec::new(),
		};
		let mut writer = ChangeWriter { doc: self, batch };
		let result = scope(&mut writer);
		let batch = writer.batch;
		match result {
			Ok(value) => {
				trace!(batch = ?batch.id(), kind = ?batch.kind(), deltas = batch.deltas().len(), "change scope committed");
				if !batch.is_empty() {
					self.pending.push_back(ChangeEvent {
						batch: batch.clone(),
						selection_before,
					});
				}
				Ok((batch, value))
			}
			Err(error) => {
				trace!(batch = ?batch.id(), %error, "change scope rolled back");
				self.roots = saved_roots;
				self.history.truncate(saved_history);
				self.selection = saved_selection;
				Err(error)
			}
		}
	}

	fn next_delta_id(&mut self) -> DeltaId {
		let id = DeltaId(self.next_delta_id);
		self.next_delta_id += 1;
		id
	}

	fn next_batch_id(&mut self) -> BatchId {
		let id = BatchId(self.next_batch_id);
		self.next_batch_id += 1;
		id
	}

	fn element_at_mut(&mut self, root: RootId, path: &[usize]) -> Result<&mut Element> {
		let slot = self
			.roots
			.get_mut(root.0 as usize)
			.ok_or(ModelError::UnknownRoot(root))?;
		let mut element = &mut slot.element;
		for &step in path {
			element = element
				.child_mut(step)
				.and_then(Node::as_element_mut)
				.ok_or_else(|| ModelError::InvalidPath {
					root,
					path: path.to_vec(),
				})?;
		}
		Ok(element)
	}

	/// Applies one operation to the live tree.
	///
	/// A failure can leave a move half-applied; the surrounding change scope
	/// restores the pre-scope state in that case.
	pub(crate) fn apply_operation(&mut self, op: &Operation) -> Result<()> {
		match op {
			Operation::Insert { position, nodes } => {
				if nodes.is_empty() {
					return Err(ModelError::EmptyOperation);
				}
				let parent = self.element_at_mut(position.root(), position.parent_path())?;
				let len = parent.child_count();
				let offset = position.offset();
				if offset > len {
					return Err(ModelError::SpanOutOfBounds {
						offset,
						how_many: 0,
						len,
					});
				}
				parent.insert_children(offset, nodes.clone());
			}
			Operation::Move(m) | Operation::Remove(m) | Operation::Reinsert(m) => {
				if m.how_many == 0 {
					return Err(ModelError::EmptyOperation);
				}
				let parent = self.element_at_mut(m.source.root(), m.source.parent_path())?;
				let len = parent.child_count();
				let offset = m.source.offset();
				if offset + m.how_many > len {
					return Err(ModelError::SpanOutOfBounds {
						offset,
						how_many: m.how_many,
						len,
					});
				}
				let nodes = parent.remove_children(offset, m.how_many);
				let target = self.element_at_mut(m.target.root(), m.target.parent_path())?;
				let target_len = target.child_count();
				let target_offset = m.target.offset();
				if target_offset > target_len {
					return Err(ModelError::SpanOutOfBounds {
						offset: target_offset,
						how_many: m.how_many,
						len: target_len,
					});
				}
				target.insert_children(target_offset, nodes);
			}
		}
		Ok(())
	}
}

/// Write access to the document inside a change scope.
///
/// Each edit call produces one delta, applies its operations and logs it;
/// the scope's batch collects every delta for the change stream.
pub struct ChangeWriter<'a> {
	doc: &'a mut Document,
	batch: Batch,
}

impl ChangeWriter<'_> {
	/// Returns the document being edited.
	pub fn document(&self) -> &Document {
		self.doc
	}

	/// Returns the history log.
	pub fn history(&self) -> &History {
		&self.doc.history
	}

	/// Returns the kind the scope's batch will carry.
	pub fn kind(&self) -> BatchKind {
		self.batch.kind()
	}

	/// Inserts nodes at a position.
	pub fn insert(&mut self, position: Position, nodes: Vec<Node>) -> Result<()> {
		let version = self.doc.version();
		self.commit_delta(Delta::new(
			version,
			vec![Operation::Insert { position, nodes }],
		))
	}

	/// Moves `how_many` nodes from `source` to `target` (post-removal
	/// coordinates).
	pub fn move_nodes(&mut self, source: Position, target: Position, how_many: usize) -> Result<()> {
		let version = self.doc.version();
		self.commit_delta(Delta::new(
			version,
			vec![Operation::from_move(MoveOp {
				source,
				target,
				how_many,
			})],
		))
	}

	/// Removes `how_many` nodes at `source` into the graveyard.
	pub fn remove(&mut self, source: Position, how_many: usize) -> Result<()> {
		let version = self.doc.version();
		self.commit_delta(Delta::new(version, vec![Operation::remove(source, how_many)]))
	}

	/// Moves `how_many` nodes out of the graveyard back to `target`.
	pub fn reinsert(&mut self, source: Position, how_many: usize, target: Position) -> Result<()> {
		let version = self.doc.version();
		self.commit_delta(Delta::new(
			version,
			vec![Operation::from_move(MoveOp {
				source,
				target,
				how_many,
			})],
		))
	}

	/// Applies an already-rebased delta produced by
	/// [`transform_onto_tip`](Self::transform_onto_tip).
	pub fn apply_reversion_delta(&mut self, delta: Delta) -> Result<()> {
		self.commit_delta(delta)
	}

	/// Rebases a delta onto the current history tip; see
	/// [`Document::rebase_onto_tip`].
	pub fn transform_onto_tip(&mut self, delta: &Delta) -> Option<Delta> {
		self.doc.rebase_onto_tip(delta)
	}

	/// Replaces the live selection.
	pub fn set_selection(&mut self, ranges: Vec<Range>, is_backward: bool) {
		self.doc.selection.set_ranges(ranges, is_backward);
	}

	fn commit_delta(&mut self, mut delta: Delta) -> Result<()> {
		if delta.id().is_detached() {
			delta.id = self.doc.next_delta_id();
		}
		delta.base_version = self.doc.version();
		let affects = delta
			.operations
			.iter()
			.any(|op| op.affects_document(self.doc));
		for op in &delta.operations {
			self.doc.apply_operation(op)?;
		}
		if affects {
			self.doc.history.push(HistoryEntry {
				delta: delta.clone(),
				kind: self.batch.kind(),
				batch: self.batch.id(),
			});
		}
		self.batch.deltas.push(delta);
		Ok(())
	}
}
