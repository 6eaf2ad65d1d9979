//! Error types for ludics-engine.

use ludics_commitments::CommitmentError;
use ludics_design::{CompileError, DesignError};
use ludics_interaction::UniformityError;
use thiserror::Error;

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the engine. Verdicts such as `DIVERGENT` or `ONGOING`
/// are results, never errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A move log failed to compile; nothing was stored.
    #[error(transparent)]
    Compile(#[from] CompileError),

    /// A design operation broke a design invariant.
    #[error(transparent)]
    Design(#[from] DesignError),

    /// A commitment operation was rejected; the store is unchanged.
    #[error(transparent)]
    Commitment(#[from] CommitmentError),

    /// The loci handed to a uniformity check are unrelated.
    #[error(transparent)]
    Uniformity(#[from] UniformityError),

    /// No design with this id is held by the engine.
    #[error("design {id} not found")]
    DesignNotFound { id: String },

    /// A design does not belong to the dialogue named in the request.
    #[error("design {design} belongs to dialogue {actual}, not {expected}")]
    DialogueMismatch {
        design: String,
        expected: String,
        actual: String,
    },
}
