//! Producing reversion batches for recorded history items.
//!
//! Reverting an item runs inside the controller's change scope and proceeds
//! in three stages:
//!
//! 1. the item's deltas, in reverse order, are reversed and rebased onto the
//!    current history tip, then applied to the document;
//! 2. rebased single-move deltas get the move-conflict post-fix, which uses
//!    delta provenance to order content that the rebase had to leave tied at
//!    one target position;
//! 3. the item's selection capture is transformed through everything that
//!    happened since the item's first delta, including the reversion just
//!    applied, to find where the selection logically lives now.

use rustc_hash::FxHashMap;
use tracing::trace;
use vellum_model::{
	BatchKind, ChangeWriter, Delta, DeltaId, Operation, Position, Range, Result, RootId,
	SelectionSnapshot,
};

use crate::stack::HistoryItem;

/// Mapping from each rebased delta back to the reversed delta it came from.
/// Scoped to a single revert call.
type OriginalDeltaMap = FxHashMap<DeltaId, Delta>;

/// Reverts `item` by applying history-rebased inverses of its deltas inside
/// the current change scope.
///
/// Returns the transformed selection to restore, or `None` when every saved
/// range ended up in the graveyard (the current selection is then left
/// alone). Reversed deltas that the rebase fully obsoletes are skipped; the
/// item is consumed by the caller regardless.
pub fn revert(writer: &mut ChangeWriter<'_>, item: &HistoryItem) -> Result<Option<SelectionSnapshot>> {
	let mut original: OriginalDeltaMap = OriginalDeltaMap::default();

	for delta in item.batch.deltas().iter().rev() {
		let reversed = delta.get_reversed();
		let Some(mut rebased) = writer.transform_onto_tip(&reversed) else {
			trace!(delta = ?delta.id(), "reversed delta fully obsoleted by later history");
			continue;
		};
		original.insert(rebased.id(), reversed.clone());
		fix_move_conflicts(writer, &mut rebased, &original, reversed.base_version());
		writer.apply_reversion_delta(rebased)?;
	}

	Ok(transform_selection(writer, item))
}

/// The move-conflict post-fix.
///
/// When a rebased move and an earlier reversion move land at the same target
/// position, the rebase alone cannot tell which content belongs in front.
/// Provenance can: if `u`'s origin placed its content after `h`'s origin did,
/// `u`'s target is shifted past `h`'s block. Only `undo`/`redo`-kinded
/// history deltas are consulted; for those the delta's own target is a
/// meaningful home even when it predates this call's map.
fn fix_move_conflicts(
	writer: &ChangeWriter<'_>,
	rebased: &mut Delta,
	original: &OriginalDeltaMap,
	since_version: u64,
) {
	let Some(bare_target) = rebased.as_single_move().map(|m| m.target.clone()) else {
		return;
	};
	let Some(home) = original
		.get(&rebased.id())
		.and_then(placement_position)
	else {
		return;
	};

	let mut shift = 0usize;
	for entry in writer.history().entries_since(since_version) {
		if !matches!(entry.kind, BatchKind::Undo | BatchKind::Redo) {
			continue;
		}
		let Some(conflicting) = entry.delta.as_single_move() else {
			continue;
		};
		if conflicting.target != bare_target {
			continue;
		}
		let conflicting_home = original
			.get(&entry.delta.id())
			.and_then(placement_position)
			.unwrap_or_else(|| conflicting.target.clone());
		if home.is_after(&conflicting_home) {
			trace!(
				delta = ?rebased.id(),
				conflicting = ?entry.delta.id(),
				by = conflicting.how_many,
				"move conflict resolved from provenance"
			);
			shift += conflicting.how_many;
		}
	}

	if shift > 0
		&& let Some(op) = rebased.operations.first_mut()
		&& let Some(m) = op.as_move_mut()
	{
		m.target.set_offset(m.target.offset() + shift);
	}
}

/// The position where a delta places content: a move's target, an insert's
/// position. `None` for multi-operation deltas.
fn placement_position(delta: &Delta) -> Option<Position> {
	match delta.operations() {
		[Operation::Insert { position, .. }] => Some(position.clone()),
		[op] => op.as_move().map(|m| m.target.clone()),
		_ => None,
	}
}

/// Transforms the item's selection capture through every operation logged
/// since the item's first delta, then coalesces the pieces and keeps the
/// first survivor per range that is not in the graveyard.
fn transform_selection(writer: &ChangeWriter<'_>, item: &HistoryItem) -> Option<SelectionSnapshot> {
	let first = item.batch.deltas().first()?;
	let since = first.base_version();
	let mut restored: Vec<Range> = Vec::new();

	for range in &item.selection.ranges {
		let mut transformed = vec![range.clone()];
		for entry in writer.history().entries_since(since) {
			for op in entry.delta.operations() {
				let mut index = 0;
				while index < transformed.len() {
					let result = match op {
						Operation::Insert { position, nodes } => {
							transformed[index].get_transformed_by_insertion(position, nodes.len(), true)
						}
						Operation::Move(m) | Operation::Remove(m) | Operation::Reinsert(m) => {
							transformed[index].get_transformed_by_move(&m.source, &m.target, m.how_many, true)
						}
					};
					let produced = result.len();
					transformed.splice(index..index + 1, result);
					// Skip the freshly spliced pieces so this operation does
					// not transform its own output; an annihilated range
					// leaves the index on whatever slid into its place.
					index += produced;
				}
			}
		}
		transformed.sort_by(|a, b| a.start.cmp(&b.start));
		let coalesced = coalesce_touching(transformed);
		if let Some(survivor) = coalesced
			.into_iter()
			.find(|r| r.start.root() != RootId::GRAVEYARD)
		{
			restored.push(survivor);
		}
	}

	if restored.is_empty() {
		None
	} else {
		Some(SelectionSnapshot {
			ranges: restored,
			is_backward: item.selection.is_backward,
		})
	}
}

/// Merges consecutive ranges whose boundaries touch, so a range split by a
/// delete-then-reinsert survives as one piece. Runs before the graveyard
/// filter.
fn coalesce_touching(ranges: Vec<Range>) -> Vec<Range> {
	let mut merged: Vec<Range> = Vec::new();
	for range in ranges {
		match merged.last_mut() {
			Some(last) if last.end.is_touching(&range.start) => {
				last.end = range.end;
			}
			_ => merged.push(range),
		}
	}
	merged
}
