//! The append-only history log and the delta rebase engine.
//!
//! Every document delta is logged with the kind of the batch that carried
//! it. The document version is the entry count, so a delta's `base_version`
//! doubles as its index into the log. Rebasing transforms a delta's
//! operations over every entry logged after its base version, in log order.
//!
//! Transform conventions:
//!
//! * Insert positions and move targets do **not** shift past content
//!   inserted at the exact same spot; when two edits contend for one
//!   position the earlier-applied content stays in front. Ordering that
//!   case from provenance is the undo core's move-conflict post-fix, not
//!   the rebase's.
//! * Move source spans stick to their content: insertions at their start
//!   shift them, overlapping moves split them and carry pieces along, and
//!   contiguous pieces are re-merged afterwards.


use tracing::trace;

use crate::batch::{BatchId, BatchKind};
use crate::delta::Delta;
use crate::operation::{MoveOp, Operation};
use crate::position::Position;

/// One logged delta together with its provenance.
#[derive(Debug, Clone)]
pub struct HistoryEntry {
	/// The delta as it was applied.
	pub delta: Delta,
	/// Kind of the batch that carried the delta.
	pub kind: BatchKind,
	/// Identity of the carrying batch.
	pub batch: BatchId,
}

/// Monotonically growing log of applied document deltas.
#[derive(Debug, Default)]
pub struct History {
	entries: Vec<HistoryEntry>,
}

impl History {
	/// Returns the current history version (the number of logged deltas).
	pub fn version(&self) -> u64 {
		self.entries.len() as u64
	}

	/// Returns all logged entries in application order.
	pub fn entries(&self) -> &[HistoryEntry] {
		&self.entries
	}

	/// Returns the entries whose base version is at least `version`.
	pub fn entries_since(&self, version: u64) -> &[HistoryEntry] {
		let start = (version as usize).min(self.entries.len());
		&self.entries[start..]
	}

	pub(crate) fn push(&mut self, entry: HistoryEntry) {
		self.entries.push(entry);
	}

	pub(crate) fn truncate(&mut self, len: usize) {
		self.entries.truncate(len);
	}
}

/// Transforms `delta`'s operations over everything logged after its base
/// version. The result may be empty for a degenerate input.
pub(crate) fn rebase_operations(history: &History, delta: &Delta) -> Vec<Operation> {
	let entries = history.entries_since(delta.base_version());
	let mut ops = Vec::with_capacity(delta.operations.len());
	for op in &delta.operations {
		ops.extend(rebase_op(op, entries));
	}
	if ops.len() != delta.operations.len() {
		trace!(
			before = delta.operations.len(),
			after = ops.len(),
			"rebase changed operation count"
		);
	}
	ops
}

/// Transforms one operation over a slice of history entries.
///
/// A move's source is tracked as a set of content spans across the whole
/// scan, so a span torn apart by one entry re-merges when a later entry
/// brings the pieces back together. Operations are materialized only at the
/// end.
fn rebase_op(op: &Operation, entries: &[HistoryEntry]) -> Vec<Operation> {
	match op {
		Operation::Insert { position, nodes } => {
			let mut position = position.clone();
			for h_op in history_ops(entries) {
				position = transform_position(&position, h_op, false);
			}
			vec![Operation::Insert {
				position,
				nodes: nodes.clone(),
			}]
		}
		Operation::Move(m) | Operation::Remove(m) | Operation::Reinsert(m) => {
			let mut spans = vec![(m.source.clone(), m.how_many)];
			let mut target = m.target.clone();
			for h_op in history_ops(entries) {
				let mut next = Vec::with_capacity(spans.len());
				for (start, len) in &spans {
					next.extend(match h_op {
						Operation::Insert { position, nodes } => {
							transform_span_by_insertion(start, *len, position, nodes.len())
						}
						Operation::Move(h) | Operation::Remove(h) | Operation::Reinsert(h) => {
							transform_span_by_move(start, *len, &h.source, &h.target, h.how_many)
						}
					});
				}
				spans = merge_spans(next);
				target = transform_position(&target, h_op, false);
			}
			spans.sort_by(|a, b| a.0.cmp(&b.0));
			if let [(source, how_many)] = spans.as_slice() {
				return vec![Operation::from_move(MoveOp {
					source: source.clone(),
					target,
					how_many: *how_many,
				})];
			}
			// The span stayed torn: emit sequential moves, compensating each
			// source for the pieces already taken out and advancing the
			// target past the pieces already put back in.
			let mut out: Vec<Operation> = Vec::new();
			let mut tgt = target;
			for (start, len) in spans {
				let mut source = start;
				for prev in &out {
					if let Some(p) = prev.as_move() {
						source = source.transformed_by_move(&p.source, &p.target, p.how_many, true);
					}
				}
				out.push(Operation::from_move(MoveOp {
					source,
					target: tgt.clone(),
					how_many: len,
				}));
				tgt.set_offset(tgt.offset() + len);
			}
			out
		}
	}
}

fn history_ops(entries: &[HistoryEntry]) -> impl Iterator<Item = &Operation> {
	entries.iter().flat_map(|entry| entry.delta.operations())
}

fn transform_position(position: &Position, by: &Operation, insert_before: bool) -> Position {
	match by {
		Operation::Insert {
			position: at,
			nodes,
		} => position.transformed_by_insertion(at, nodes.len(), insert_before),
		Operation::Move(h) | Operation::Remove(h) | Operation::Reinsert(h) => {
			position.transformed_by_move(&h.source, &h.target, h.how_many, insert_before)
		}
	}
}

/// A span of `len` consecutive nodes starting at a position, tracked through
/// a later insertion. Content-sticky: an insertion at the span start shifts
/// it, one strictly inside splits it.
fn transform_span_by_insertion(
	start: &Position,
	len: usize,
	at: &Position,
	how_many: usize,
) -> Vec<(Position, usize)> {
	if at.root() != start.root() {
		return vec![(start.clone(), len)];
	}
	let level = at.path().len() - 1;
	if start.path().len() != level + 1 || start.path()[..level] != at.path()[..level] {
		return vec![(start.transformed_by_insertion(at, how_many, true), len)];
	}
	let s = start.offset();
	let e = s + len;
	let i = at.offset();
	if i <= s {
		vec![(start.with_offset(s + how_many), len)]
	} else if i >= e {
		vec![(start.clone(), len)]
	} else {
		vec![
			(start.clone(), i - s),
			(start.with_offset(i + how_many), e - i),
		]
	}
}

/// A span tracked through a later move. The overlap travels to the move's
/// target; the remainder is transformed by the removal and the insertion.
fn transform_span_by_move(
	start: &Position,
	len: usize,
	src: &Position,
	tgt: &Position,
	how_many: usize,
) -> Vec<(Position, usize)> {
	let flat = src.root() == start.root()
		&& src.path().len() == start.path().len()
		&& src.parent_path() == start.parent_path();
	if !flat {
		// The removal happens elsewhere: it either carries the whole span
		// (an ancestor moved) or leaves its offsets alone. The insertion at
		// the target can still land inside the span and split it.
		let level = src.path().len() - 1;
		let traveled = src.root() == start.root()
			&& start.path().len() > level
			&& start.path()[..level] == src.path()[..level]
			&& {
				let here = start.path()[level];
				let s0 = src.path()[level];
				here >= s0 && here < s0 + how_many
			};
		if traveled {
			return vec![(start.transformed_by_move(src, tgt, how_many, true), len)];
		}
		let after_removal = start
			.transformed_by_deletion(src, how_many)
			.unwrap_or_else(|| start.clone());
		return transform_span_by_insertion(&after_removal, len, tgt, how_many);
	}
	let s = start.offset();
	let e = s + len;
	let sr = src.offset();
	let er = sr + how_many;

	let mut out: Vec<(Position, usize)> = Vec::new();
	let mut stays: Vec<(usize, usize)> = Vec::new();

	if s < sr.min(e) {
		stays.push((s, e.min(sr)));
	}
	let lo = s.max(sr);
	let hi = e.min(er);
	if lo < hi {
		out.push((tgt.with_offset(tgt.offset() + (lo - sr)), hi - lo));
	}
	if e > er.max(s) {
		stays.push((s.max(er) - how_many, e - how_many));
	}
	for (from, to) in stays {
		let piece = src.with_offset(from);
		out.extend(transform_span_by_insertion(&piece, to - from, tgt, how_many));
	}
	out
}

/// Re-joins spans that are adjacent in the same parent.
fn merge_spans(mut spans: Vec<(Position, usize)>) -> Vec<(Position, usize)> {
	loop {
		let mut merged = false;
		'scan: for i in 0..spans.len() {
			for j in 0..spans.len() {
				if i == j {
					continue;
				}
				let adjacent = {
					let (a, a_len) = &spans[i];
					let (b, _) = &spans[j];
					a.root() == b.root()
						&& a.parent_path() == b.parent_path()
						&& a.offset() + a_len == b.offset()
				};
				if adjacent {
					let (_, b_len) = spans.remove(j);
					let i = if j < i { i - 1 } else { i };
					spans[i].1 += b_len;
					merged = true;
					break 'scan;
				}
			}
		}
		if !merged {
			return spans;
		}
	}
}
