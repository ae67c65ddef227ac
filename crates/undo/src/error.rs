//! Error types for undo/redo steps.

use thiserror::Error;
use vellum_model::{BatchId, ModelError};

/// Errors that can occur while recording or reverting batches.
#[derive(Debug, Error)]
pub enum UndoError {
	/// A step was triggered with nothing to revert.
	#[error("nothing to revert: the stack is empty")]
	EmptyStack,

	/// A step targeted a batch that is not on the stack.
	#[error("batch {0:?} is not present on the stack")]
	NotFound(BatchId),

	/// The document rejected an operation; the change scope was rolled back
	/// and the stack left untouched.
	#[error(transparent)]
	Model(#[from] ModelError),
}

/// Result type for undo operations.
pub type Result<T> = std::result::Result<T, UndoError>;
