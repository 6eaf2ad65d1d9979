//! Acts: atomic polarized moves anchored at a locus.

use std::collections::BTreeSet;

use ludics_locus::Locus;
use serde::{Deserialize, Serialize};

use crate::ids::{ActId, DesignId};

/// Polarity of an act.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Polarity {
    /// Proponent-style move: asserts and opens continuations.
    Positive,
    /// Opponent-style move: receives and selects continuations.
    Negative,
    /// Terminal acceptance. Absorbing in any interaction.
    Daimon,
}

impl Polarity {
    pub fn is_daimon(self) -> bool {
        matches!(self, Polarity::Daimon)
    }

    /// Swap positive and negative; the daimon is self-dual.
    pub fn dual(self) -> Self {
        match self {
            Polarity::Positive => Polarity::Negative,
            Polarity::Negative => Polarity::Positive,
            Polarity::Daimon => Polarity::Daimon,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Polarity::Positive => "+",
            Polarity::Negative => "-",
            Polarity::Daimon => "†",
        }
    }
}

/// Who issued an intervention and why.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Audit {
    pub issuer: String,
    pub reason: String,
}

impl Audit {
    pub fn new(issuer: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            issuer: issuer.into(),
            reason: reason.into(),
        }
    }
}

/// Kinds of out-of-band judge intervention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum InterventionKind {
    /// Positive act with daimon-equivalent finality.
    ForcedConcession,
    /// Literal daimon closing a branch.
    BranchClosure,
}

/// Provenance of an act.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(tag = "source", rename_all = "camelCase")]
pub enum ActOrigin {
    /// Produced by the compiler from a participant's move.
    #[default]
    Participant,
    /// Injected by a judge outside normal alternation.
    Judge { kind: InterventionKind, audit: Audit },
}

/// An atomic move in a design.
///
/// Acts are append-only: created by the compiler or a judge intervention and
/// never mutated afterward.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Act {
    pub id: ActId,
    pub polarity: Polarity,
    pub locus: Locus,
    /// Child suffixes this act opens under its locus.
    pub ramification: BTreeSet<u32>,
    pub expression: String,
    pub order_in_design: u32,
    #[serde(default)]
    pub origin: ActOrigin,
}

impl Act {
    pub fn design_id(&self) -> DesignId {
        self.id.design
    }

    /// Daimons and forced concessions both end their branch.
    pub fn is_terminal(&self) -> bool {
        self.polarity.is_daimon()
            || matches!(
                self.origin,
                ActOrigin::Judge {
                    kind: InterventionKind::ForcedConcession,
                    ..
                }
            )
    }

    pub fn is_judge_issued(&self) -> bool {
        matches!(self.origin, ActOrigin::Judge { .. })
    }

    /// The child loci this act opens.
    pub fn opened_loci(&self) -> impl Iterator<Item = Locus> + '_ {
        self.ramification.iter().map(|i| self.locus.child(*i))
    }
}

/// An act before it is placed in a design.
///
/// The design assigns the id and order on append.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActDraft {
    pub polarity: Polarity,
    pub locus: Locus,
    pub ramification: BTreeSet<u32>,
    pub expression: String,
    pub origin: ActOrigin,
}

impl ActDraft {
    pub fn new(polarity: Polarity, locus: Locus) -> Self {
        Self {
            polarity,
            locus,
            ramification: BTreeSet::new(),
            expression: String::new(),
            origin: ActOrigin::Participant,
        }
    }

    pub fn positive(locus: Locus, ramification: impl IntoIterator<Item = u32>) -> Self {
        Self::new(Polarity::Positive, locus).opening(ramification)
    }

    pub fn negative(locus: Locus, ramification: impl IntoIterator<Item = u32>) -> Self {
        Self::new(Polarity::Negative, locus).opening(ramification)
    }

    pub fn daimon(locus: Locus) -> Self {
        Self::new(Polarity::Daimon, locus)
    }

    #[must_use]
    pub fn opening(mut self, ramification: impl IntoIterator<Item = u32>) -> Self {
        self.ramification.extend(ramification);
        self
    }

    #[must_use]
    pub fn with_expression(mut self, expression: impl Into<String>) -> Self {
        self.expression = expression.into();
        self
    }

    #[must_use]
    pub fn with_origin(mut self, origin: ActOrigin) -> Self {
        self.origin = origin;
        self
    }
}
