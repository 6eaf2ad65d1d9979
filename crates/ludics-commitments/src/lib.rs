//! Ludics Commitments
//!
//! Per-owner commitment sets and the forward chainer that derives new facts
//! from them.
//!
//! # Elements
//!
//! Each owner holds labelled elements. A `pos` element is a fact; a `neg`
//! element is a rule whose text (its expression, else its label) follows the
//! grammar in [`Rule`]. Labels are unique per owner and fact labels are
//! stored in canonical literal form, so `¬B`, `!B` and `not B` are one fact.
//!
//! # Chaining
//!
//! [`CommitmentStore::interact_ce`] recomputes the derived set from the
//! entitled base on each call, pass by pass, until no rule fires or the
//! iteration cap is reached. Asserted elements are never modified. Afterwards
//! every pair `X` / `not X`, and every pair registered with
//! [`CommitmentStore::register_contradiction`], is reported.

mod rule;
mod store;

use thiserror::Error;

pub use rule::{Literal, Rule, RuleError};
pub use store::{
    ApplyOps, ApplyOutcome, BasePolarity, CandidateAct, ChainOutcome, CommitmentListing,
    CommitmentStore, Contradiction, DerivedFact, Element, ElementDraft, Fixpoint,
};

/// Result type for commitment operations.
pub type Result<T> = std::result::Result<T, CommitmentError>;

/// Commitment store errors. A failed call changes nothing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommitmentError {
    /// A rule element's text does not parse.
    #[error("owner {owner}: rule {label:?} is invalid: {source}")]
    RuleValidation {
        owner: String,
        label: String,
        source: RuleError,
    },

    /// A fact label, or a contradiction operand, is not a literal.
    #[error("{label:?} is not a valid fact label: {source}")]
    InvalidLabel { label: String, source: RuleError },

    #[error("owner {owner}: element label is empty")]
    EmptyLabel { owner: String },

    #[error("owner id is empty")]
    EmptyOwner,

    #[error("owner {owner} has no element {label:?}")]
    UnknownLabel { owner: String, label: String },

    /// A label was registered as contradicting itself.
    #[error("{label:?} cannot contradict itself")]
    SelfContradiction { label: String },
}
