//! Error types for document model operations.

use thiserror::Error;

use crate::position::RootId;

/// Errors that can occur while mutating or inspecting the document.
#[derive(Debug, Error)]
pub enum ModelError {
	/// A position's parent path does not lead to an element.
	#[error("no element at path {path:?} in root {root:?}")]
	InvalidPath {
		/// Root the path was resolved against.
		root: RootId,
		/// The offending parent path.
		path: Vec<usize>,
	},

	/// An offset or span falls outside an element's child list.
	#[error("span {offset}..{offset}+{how_many} out of bounds for element with {len} children")]
	SpanOutOfBounds {
		/// Start offset of the span.
		offset: usize,
		/// Number of nodes addressed.
		how_many: usize,
		/// Child count of the addressed element.
		len: usize,
	},

	/// An operation that addresses no nodes at all.
	#[error("operation touches no nodes")]
	EmptyOperation,

	/// A root id that was never created on this document.
	#[error("root {0:?} does not exist")]
	UnknownRoot(RootId),
}

/// Result type for model operations.
pub type Result<T> = std::result::Result<T, ModelError>;
