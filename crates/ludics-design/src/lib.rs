//! Ludics Designs
//!
//! Acts, designs, and the operations that produce them.
//!
//! # Model
//!
//! An [`Act`] is a polarized move at a locus: positive (proponent), negative
//! (opponent) or the daimon (terminal acceptance). It carries a
//! ramification, the set of child loci it opens for continuation.
//!
//! A [`Design`] is one participant's strategy: an ordered, append-only
//! sequence of acts under a base locus. Designs are immutable values; every
//! update (a judge intervention, a relocation) yields a new design.
//!
//! # Producers
//!
//! - [`compile`] turns an external move log into one design per participant.
//! - [`delocate`] copies a design under a new base prefix.
//! - [`force_concession`] and [`close_branch`] append audited judge acts.

mod act;
mod compile;
mod delocate;
mod design;
mod ids;
mod judge;

use thiserror::Error;

pub use act::{Act, ActDraft, ActOrigin, Audit, InterventionKind, Polarity};
pub use compile::{
    compile, ChallengeBasis, CompileError, CompileOptions, Move, MoveKind, Target, TargetKind,
};
pub use delocate::delocate;
pub use design::{participant_acts, Design, DesignBuilder};
pub use ids::{ActId, DesignId, DialogueId, ParticipantId};
pub use judge::{close_branch, force_concession};

/// Violations of the design invariants.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DesignError {
    /// An act was placed outside the design's base locus.
    #[error("locus {locus} lies outside design base {base}")]
    OutsideBase { locus: String, base: String },

    /// A daimon tried to open children.
    #[error("daimon at {locus} must have an empty ramification")]
    DaimonRamification { locus: String },

    /// A child locus was opened twice in the same design.
    #[error("design {design} already opened {child}")]
    RamificationConflict { design: String, child: String },

    /// A loaded act's id or order disagrees with its design and slot.
    #[error("design {design}: act in slot {slot} is misnumbered")]
    MisnumberedAct { design: String, slot: usize },

    /// A judge intervention was submitted without an issuer.
    #[error("judge intervention at {locus} has no issuer")]
    UnauditedIntervention { locus: String },

    /// The act arena exceeded `u32::MAX` entries.
    #[error("design has too many acts")]
    TooManyActs,

    /// Locus arithmetic failed.
    #[error(transparent)]
    Locus(#[from] ludics_locus::LocusError),
}
