//! Tree positions and their transformation primitives.
//!
//! A [`Position`] is a path of child offsets from a document root. Positions
//! sit *between* nodes: the final path entry is an offset into a child list,
//! the entries before it identify the ancestor elements. All higher-level
//! transformations (ranges, operation rebasing, selection restoration) reduce
//! to the three primitives defined here: transformation by an insertion, by a
//! deletion, and by a move.


use smallvec::SmallVec;

/// Identity of a document root.
///
/// Roots are created by the document and never destroyed. The graveyard is
/// always the first root of a document, so its id is a well-known constant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RootId(pub(crate) u32);

impl RootId {
	/// The graveyard root holding logically deleted content.
	pub const GRAVEYARD: RootId = RootId(0);
}

/// A path of child offsets from a root. Kept inline for the common shallow case.
pub type Path = SmallVec<[usize; 4]>;

/// A position in the document tree: a root plus a path of child offsets.
///
/// Positions are totally ordered by root identity first, then by
/// lexicographic path comparison; comparisons across roots are meaningful
/// only as a stable tie-break.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
	root: RootId,
	path: Path,
}

impl Position {
	/// Creates a position from a root and a path.
	///
	/// # Panics
	///
	/// Panics if `path` is empty; a position always carries at least the
	/// offset into its root.
	pub fn new(root: RootId, path: impl IntoIterator<Item = usize>) -> Self {
		let path: Path = path.into_iter().collect();
		assert!(!path.is_empty(), "position path is never empty");
		Self { root, path }
	}

	/// Returns the root this position points into.
	pub fn root(&self) -> RootId {
		self.root
	}

	/// Returns the full path.
	pub fn path(&self) -> &[usize] {
		&self.path
	}

	/// Returns the offset in the parent element (the last path entry).
	pub fn offset(&self) -> usize {
		*self.path.last().expect("position path is never empty")
	}

	/// Returns the path of the parent element.
	pub fn parent_path(&self) -> &[usize] {
		&self.path[..self.path.len() - 1]
	}

	/// Replaces the offset in the parent element.
	pub fn set_offset(&mut self, offset: usize) {
		*self.path.last_mut().expect("position path is never empty") = offset;
	}

	/// Returns a copy with the offset replaced.
	pub fn with_offset(&self, offset: usize) -> Position {
		let mut out = self.clone();
		out.set_offset(offset);
		out
	}

	/// Returns `true` if this position is before `other` in document order.
	pub fn is_before(&self, other: &Position) -> bool {
		self < other
	}

	/// Returns `true` if this position is after `other` in document order.
	pub fn is_after(&self, other: &Position) -> bool {
		self > other
	}

	/// Returns `true` if both positions are the same spot in the tree.
	pub fn is_equal(&self, other: &Position) -> bool {
		self == other
	}

	/// Returns `true` if the positions denote the same spot, possibly
	/// expressed at different depths.
	///
	/// Besides plain equality this covers the boundary case where one path
	/// descends into the node at the other's offset through leading children
	/// only (`[2]` touches `[2, 0]` and `[2, 0, 0]`).
	pub fn is_touching(&self, other: &Position) -> bool {
		if self.root != other.root {
			return false;
		}
		if self.path == other.path {
			return true;
		}
		let (short, long) = if self.path.len() < other.path.len() {
			(&self.path, &other.path)
		} else {
			(&other.path, &self.path)
		};
		long[..short.len()] == short[..] && long[short.len()..].iter().all(|&step| step == 0)
	}

	/// Transforms this position by an insertion of `how_many` nodes at `at`.
	///
	/// `insert_before` decides the equal-offset case: when the insertion
	/// lands exactly at this position, `true` keeps this position after the
	/// inserted nodes. Positions whose path passes *through* a node at the
	/// insertion level always shift, because the node itself was displaced.
	pub fn transformed_by_insertion(
		&self,
		at: &Position,
		how_many: usize,
		insert_before: bool,
	) -> Position {
		if at.root != self.root {
			return self.clone();
		}
		let level = at.path.len() - 1;
		if self.path.len() <= level || self.path[..level] != at.path[..level] {
			return self.clone();
		}
		let here = self.path[level];
		let ins = at.path[level];
		let shifted = if self.path.len() == level + 1 {
			here > ins || (here == ins && insert_before)
		} else {
			here >= ins
		};
		let mut out = self.clone();
		if shifted {
			out.path[level] = here + how_many;
		}
		out
	}

	/// Transforms this position by a deletion of `how_many` nodes at `at`.
	///
	/// Returns `None` when the path passes through a deleted node. A
	/// same-level position inside the deleted span clamps to the deletion
	/// point instead.
	pub fn transformed_by_deletion(&self, at: &Position, how_many: usize) -> Option<Position> {
		if at.root != self.root {
			return Some(self.clone());
		}
		let level = at.path.len() - 1;
		if self.path.len() <= level || self.path[..level] != at.path[..level] {
			return Some(self.clone());
		}
		let here = self.path[level];
		let del = at.path[level];
		let mut out = self.clone();
		if self.path.len() == level + 1 {
			if here > del + how_many {
				out.path[level] = here - how_many;
			} else if here > del {
				out.path[level] = del;
			}
			Some(out)
		} else if here >= del + how_many {
			out.path[level] = here - how_many;
			Some(out)
		} else if here >= del {
			None
		} else {
			Some(out)
		}
	}

	/// Transforms this position by a move of `how_many` nodes from `source`
	/// to `target`, where `target` is expressed in post-removal coordinates.
	///
	/// Positions inside the moved span travel with the content; all others
	/// are transformed by the removal and then by the insertion at the
	/// target, with `insert_before` deciding equal-offset insertions.
	pub fn transformed_by_move(
		&self,
		source: &Position,
		target: &Position,
		how_many: usize,
		insert_before: bool,
	) -> Position {
		let level = source.path.len() - 1;
		let traveled = source.root == self.root
			&& self.path.len() > level
			&& self.path[..level] == source.path[..level]
			&& {
				let here = self.path[level];
				let src = source.path[level];
				if self.path.len() == level + 1 {
					here > src && here < src + how_many
				} else {
					here >= src && here < src + how_many
				}
			};
		if traveled {
			let mut path: Path = target.path.clone();
			let last = path.len() - 1;
			path[last] = target.offset() + (self.path[level] - source.path[level]);
			path.extend(self.path[level + 1..].iter().copied());
			return Position {
				root: target.root,
				path,
			};
		}
		let after_removal = self
			.transformed_by_deletion(source, how_many)
			.expect("non-traveling position survives the removal");
		after_removal.transformed_by_insertion(target, how_many, insert_before)
	}
}
