//! Ranges between two positions and their vec-valued transformations.
//!
//! Transforming a range by an intervening edit can split it, shift it, or
//! relocate pieces of it into another root (notably the graveyard), so the
//! transformation results are lists of ranges. Consumers sort and coalesce
//! the pieces afterwards.


use crate::position::Position;

/// A closed-open range between two positions in one root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Range {
	/// Start of the range (inclusive).
	pub start: Position,
	/// End of the range (exclusive).
	pub end: Position,
}

impl Range {
	/// Creates a range between two positions.
	///
	/// # Panics
	///
	/// Panics if the positions are in different roots or out of order.
	pub fn new(start: Position, end: Position) -> Self {
		assert!(start.root() == end.root(), "range spans a single root");
		assert!(start <= end, "range start must not be after its end");
		Self { start, end }
	}

	/// Creates a collapsed range at the given position.
	pub fn collapsed(at: Position) -> Self {
		Self {
			start: at.clone(),
			end: at,
		}
	}

	/// Returns `true` if start and end coincide.
	pub fn is_collapsed(&self) -> bool {
		self.start == self.end
	}

	/// Returns `true` if `position` lies strictly inside the range.
	pub fn contains_position(&self, position: &Position) -> bool {
		self.start < *position && *position < self.end
	}

	/// Returns `true` if both endpoints sit in the same parent element.
	fn is_flat(&self) -> bool {
		self.start.parent_path() == self.end.parent_path()
	}

	/// Transforms this range by an insertion of `how_many` nodes at `at`.
	///
	/// With `spread`, an insertion strictly inside the range splits it in
	/// two around the inserted content. Otherwise both endpoints shift, and
	/// an insertion exactly at an endpoint shifts it too, so a collapsed
	/// range (a caret) follows content inserted at its position.
	pub fn get_transformed_by_insertion(
		&self,
		at: &Position,
		how_many: usize,
		spread: bool,
	) -> Vec<Range> {
		if spread && self.contains_position(at) {
			let second_start = at.with_offset(at.offset() + how_many);
			let second_end = self.end.transformed_by_insertion(at, how_many, true);
			return vec![
				Range::new(self.start.clone(), at.clone()),
				Range::new(second_start, second_end),
			];
		}
		vec![Range::new(
			self.start.transformed_by_insertion(at, how_many, true),
			self.end.transformed_by_insertion(at, how_many, true),
		)]
	}

	/// Transforms this range by a move of `how_many` nodes from `source` to
	/// `target` (post-removal coordinates).
	///
	/// The overlap with the moved span travels to the target; the remainder
	/// is transformed by the removal and then by the insertion at the
	/// target, which may split it again when it lands strictly inside. The
	/// result pieces are returned in source order, not document order.
	pub fn get_transformed_by_move(
		&self,
		source: &Position,
		target: &Position,
		how_many: usize,
		spread: bool,
	) -> Vec<Range> {
		if self.is_collapsed() {
			let moved = self.start.transformed_by_move(source, target, how_many, true);
			return vec![Range::collapsed(moved)];
		}
		if self.is_flat()
			&& source.root() == self.start.root()
			&& source.parent_path() == self.start.parent_path()
		{
			return self.flat_transformed_by_move(source, target, how_many, spread);
		}
		// Nested or disjoint geometry: the move cannot cut the range at this
		// level, so endpoint transformation is exact.
		let start = self.start.transformed_by_move(source, target, how_many, true);
		let end = self.end.transformed_by_move(source, target, how_many, true);
		if start.root() == end.root() && start <= end {
			vec![Range::new(start, end)]
		} else {
			// The endpoints were torn across roots; keep the start piece.
			vec![Range::collapsed(start)]
		}
	}

	/// Flat-case move transformation: range and moved span share a parent.
	fn flat_transformed_by_move(
		&self,
		source: &Position,
		target: &Position,
		how_many: usize,
		spread: bool,
	) -> Vec<Range> {
		let a = self.start.offset();
		let b = self.end.offset();
		let src = source.offset();
		let end_src = src + how_many;

		let mut stays: Vec<(usize, usize)> = Vec::new();
		let mut pieces: Vec<Range> = Vec::new();

		// Part before the removed span, in post-removal coordinates.
		if a < src.min(b) {
			stays.push((a, b.min(src)));
		}
		// Overlap travels with the moved content; target offsets are final.
		let overlap_start = a.max(src);
		let overlap_end = b.min(end_src);
		if overlap_start < overlap_end {
			let from = target.offset() + (overlap_start - src);
			let to = target.offset() + (overlap_end - src);
			pieces.push(Range::new(target.with_offset(from), target.with_offset(to)));
		}
		// Part after the removed span shifts down by the removal.
		if b > end_src.max(a) {
			stays.push((a.max(end_src) - how_many, b - how_many));
		}

		let same_parent_target =
			target.root() == self.start.root() && target.parent_path() == self.start.parent_path();
		for (from, to) in stays {
			if same_parent_target {
				let ins = target.offset();
				if ins > from && ins < to {
					if spread {
						pieces.push(Range::new(
							self.start.with_offset(from),
							self.start.with_offset(ins),
						));
						pieces.push(Range::new(
							self.start.with_offset(ins + how_many),
							self.start.with_offset(to + how_many),
						));
					} else {
						pieces.push(Range::new(
							self.start.with_offset(from),
							self.start.with_offset(to + how_many),
						));
					}
					continue;
				}
				if ins <= from {
					pieces.push(Range::new(
						self.start.with_offset(from + how_many),
						self.start.with_offset(to + how_many),
					));
					continue;
				}
			}
			pieces.push(Range::new(
				self.start.with_offset(from),
				self.start.with_offset(to),
			));
		}
		pieces
	}
}
