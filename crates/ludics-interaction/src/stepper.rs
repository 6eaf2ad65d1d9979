//! The interaction stepper: plays a positive design against a negative one.
//!
//! # Step rule
//!
//! Starting at the positive design's base, repeatedly:
//!
//! 1. Take the positive design's act at the current locus (positive, or
//!    terminal). None: `STUCK`.
//! 2. Take the negative design's act at the same locus (negative, or
//!    terminal). None: `STUCK`.
//! 3. Either act terminal: record the pair, `CONVERGENT`.
//! 4. Focus the smallest child present in both ramifications. None: record
//!    the pair, `DIVERGENT`.
//! 5. Out of fuel: `ONGOING` without recording the pair, so a resumed run
//!    picks up at exactly this locus.
//! 6. Record the pair, spend one unit of fuel, move to the focus.
//!
//! Only step 6 spends fuel. Terminal and diverging pairs are decided even
//! with zero fuel left, which keeps `STUCK` (nothing to play) and `ONGOING`
//! (more to play, no budget) distinct.
//!
//! # Determinism
//!
//! The stepper reads nothing but its arguments. Lookups go through the
//! design's locus index and ramifications are ordered sets, so the same
//! designs, fuel and virtual paths always yield the same trace.

use ludics_design::{Act, ActId, Design, Polarity};
use ludics_locus::Locus;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// Fuel used when the caller does not choose one.
pub const DEFAULT_FUEL: u32 = 2048;

/// Per-run settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepOptions {
    /// Maximum number of pairs consumed before the run reports `ONGOING`.
    pub fuel: u32,
    /// Loci to force-focus. When the current locus is the parent of one of
    /// these, the negative side is treated as selecting exactly that child.
    pub virtual_neg_paths: Vec<Locus>,
}

impl Default for StepOptions {
    fn default() -> Self {
        Self {
            fuel: DEFAULT_FUEL,
            virtual_neg_paths: Vec::new(),
        }
    }
}

impl StepOptions {
    pub fn with_fuel(fuel: u32) -> Self {
        Self {
            fuel,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_virtual_neg_path(mut self, path: Locus) -> Self {
        self.virtual_neg_paths.push(path);
        self
    }
}

/// Outcome of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    Convergent,
    Divergent,
    Ongoing,
    Stuck,
}

impl Status {
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Convergent => "CONVERGENT",
            Status::Divergent => "DIVERGENT",
            Status::Ongoing => "ONGOING",
            Status::Stuck => "STUCK",
        }
    }
}

/// Which side of the interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Side {
    Positive,
    Negative,
}

/// Why a run stopped where it did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Reason {
    /// A daimon or forced concession ended the branch.
    Terminal { locus: Locus, by: Side },
    /// The two ramifications share no child.
    NoSharedChild { locus: Locus },
    /// The given side has no eligible act at the locus.
    NoAct { locus: Locus, side: Side },
    /// The budget ran out with a continuation still available.
    FuelExhausted { locus: Locus },
}

/// One consumed pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TracePair {
    #[serde(rename = "posActId")]
    pub pos: ActId,
    #[serde(rename = "negActId")]
    pub neg: ActId,
    pub locus: Locus,
}

/// The record of one stepper run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trace {
    pub status: Status,
    pub pairs: Vec<TracePair>,
    /// Pair indices at which the outcome was decided.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub decisive_indices: Vec<usize>,
    pub reason: Reason,
    /// Locus the run stopped at; `resume` continues from here.
    pub focus: Locus,
    /// Fuel spent, summed over resumed runs.
    pub fuel_used: u32,
}

impl Trace {
    pub fn is_convergent(&self) -> bool {
        self.status == Status::Convergent
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// Run `pos` against `neg` from the positive design's base.
pub fn step(pos: &Design, neg: &Design, options: &StepOptions) -> Trace {
    Stepper { pos, neg, options }.run(pos.base().clone(), Vec::new(), 0)
}

/// Continue an `ONGOING` run with fresh fuel.
///
/// The result extends `previous`: its pairs are kept verbatim and new pairs
/// are appended. Finished runs are returned unchanged.
pub fn resume(pos: &Design, neg: &Design, previous: &Trace, options: &StepOptions) -> Trace {
    if previous.status != Status::Ongoing {
        return previous.clone();
    }
    Stepper { pos, neg, options }.run(
        previous.focus.clone(),
        previous.pairs.clone(),
        previous.fuel_used,
    )
}

struct Stepper<'a> {
    pos: &'a Design,
    neg: &'a Design,
    options: &'a StepOptions,
}

impl<'a> Stepper<'a> {
    fn run(&self, mut locus: Locus, mut pairs: Vec<TracePair>, mut fuel_used: u32) -> Trace {
        let mut fuel = self.options.fuel;

        loop {
            let Some(p) = self
                .pos
                .act_at(&locus, |a| a.polarity == Polarity::Positive || a.is_terminal())
            else {
                let reason = Reason::NoAct {
                    locus: locus.clone(),
                    side: Side::Positive,
                };
                return self.finish(Status::Stuck, pairs, reason, locus, fuel_used);
            };
            let Some(n) = self
                .neg
                .act_at(&locus, |a| a.polarity == Polarity::Negative || a.is_terminal())
            else {
                let reason = Reason::NoAct {
                    locus: locus.clone(),
                    side: Side::Negative,
                };
                return self.finish(Status::Stuck, pairs, reason, locus, fuel_used);
            };

            let pair = TracePair {
                pos: p.id,
                neg: n.id,
                locus: locus.clone(),
            };

            if p.is_terminal() || n.is_terminal() {
                let by = if p.is_terminal() {
                    Side::Positive
                } else {
                    Side::Negative
                };
                pairs.push(pair);
                let reason = Reason::Terminal {
                    locus: locus.clone(),
                    by,
                };
                return self.finish(Status::Convergent, pairs, reason, locus, fuel_used);
            }

            let Some(child) = self.focus_child(&locus, p, n) else {
                pairs.push(pair);
                let reason = Reason::NoSharedChild {
                    locus: locus.clone(),
                };
                return self.finish(Status::Divergent, pairs, reason, locus, fuel_used);
            };

            if fuel == 0 {
                let reason = Reason::FuelExhausted {
                    locus: locus.clone(),
                };
                return self.finish(Status::Ongoing, pairs, reason, locus, fuel_used);
            }

            trace!(%locus, pos = %p.id, neg = %n.id, child, "pair");
            pairs.push(pair);
            fuel -= 1;
            fuel_used = fuel_used.saturating_add(1);
            locus = locus.child(child);
        }
    }

    /// Smallest shared child, or the forced child when a virtual path
    /// targets this locus.
    fn focus_child(&self, locus: &Locus, p: &Act, n: &Act) -> Option<u32> {
        let forced = self
            .options
            .virtual_neg_paths
            .iter()
            .find(|v| v.parent().ok().as_ref() == Some(locus));
        match forced {
            Some(path) => {
                let child = path.last_segment();
                p.ramification.contains(&child).then_some(child)
            }
            None => p.ramification.intersection(&n.ramification).next().copied(),
        }
    }

    fn finish(
        &self,
        status: Status,
        pairs: Vec<TracePair>,
        reason: Reason,
        focus: Locus,
        fuel_used: u32,
    ) -> Trace {
        let decisive_indices = match status {
            Status::Convergent | Status::Divergent => vec![pairs.len() - 1],
            Status::Ongoing | Status::Stuck => Vec::new(),
        };
        debug!(
            pos = %self.pos.id(),
            neg = %self.neg.id(),
            status = status.as_str(),
            pairs = pairs.len(),
            %focus,
            "interaction finished"
        );
        Trace {
            status,
            pairs,
            decisive_indices,
            reason,
            focus,
            fuel_used,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ludics_design::{close_branch, force_concession, ActDraft, Audit, DesignBuilder};
    use proptest::prelude::*;

    fn l(s: &str) -> Locus {
        Locus::parse(s).unwrap()
    }

    fn design(participant: &str, drafts: Vec<ActDraft>) -> Design {
        let mut builder = DesignBuilder::new("dlg".into(), participant.into(), Locus::root());
        for draft in drafts {
            builder.push(draft).unwrap();
        }
        builder.build()
    }

    /// A chain of `depth` alternations along child 0, ending in daimons.
    fn chain(depth: usize) -> (Design, Design) {
        let mut pos = Vec::new();
        let mut neg = Vec::new();
        let mut locus = l("0");
        for _ in 0..depth {
            pos.push(ActDraft::positive(locus.clone(), [0]));
            neg.push(ActDraft::negative(locus.clone(), [0]));
            locus = locus.child(0);
        }
        pos.push(ActDraft::daimon(locus.clone()));
        neg.push(ActDraft::daimon(locus));
        (design("P", pos), design("O", neg))
    }

    #[test]
    fn converges_on_shared_daimon() {
        let (pos, neg) = chain(1);
        let trace = step(&pos, &neg, &StepOptions::default());

        assert_eq!(trace.status, Status::Convergent);
        assert_eq!(trace.len(), 2);
        assert_eq!(trace.decisive_indices, vec![1]);
        assert_eq!(trace.pairs[1].locus, l("0.0"));
        assert_eq!(trace.fuel_used, 1);
    }

    #[test]
    fn diverges_without_shared_child() {
        let pos = design(
            "P",
            vec![ActDraft::positive(l("0"), [0]), ActDraft::daimon(l("0.0"))],
        );
        let neg = design(
            "O",
            vec![ActDraft::negative(l("0"), [1]), ActDraft::daimon(l("0.1"))],
        );

        let trace = step(&pos, &neg, &StepOptions::default());
        assert_eq!(trace.status, Status::Divergent);
        assert_eq!(trace.len(), 1);
        assert_eq!(trace.reason, Reason::NoSharedChild { locus: l("0") });
    }

    #[test]
    fn smallest_shared_child_is_focused() {
        let pos = design(
            "P",
            vec![
                ActDraft::positive(l("0"), [2, 10, 3]),
                ActDraft::daimon(l("0.3")),
                ActDraft::daimon(l("0.10")),
            ],
        );
        let neg = design(
            "O",
            vec![
                ActDraft::negative(l("0"), [10, 3]),
                ActDraft::daimon(l("0.3")),
                ActDraft::daimon(l("0.10")),
            ],
        );

        let trace = step(&pos, &neg, &StepOptions::default());
        assert_eq!(trace.pairs[1].locus, l("0.3"));
    }

    #[test]
    fn missing_acts_are_stuck() {
        let pos = design("P", vec![ActDraft::positive(l("0"), [0])]);
        let neg = design("O", vec![ActDraft::negative(l("0"), [0])]);
        let trace = step(&pos, &neg, &StepOptions::default());
        assert_eq!(trace.status, Status::Stuck);
        assert_eq!(
            trace.reason,
            Reason::NoAct {
                locus: l("0.0"),
                side: Side::Positive
            }
        );
        assert!(trace.decisive_indices.is_empty());

        let empty = design("O", vec![]);
        let trace = step(&pos, &empty, &StepOptions::default());
        assert_eq!(trace.status, Status::Stuck);
        assert!(trace.is_empty());
    }

    #[test]
    fn negative_act_on_positive_side_does_not_count() {
        let pos = design("P", vec![ActDraft::negative(l("0"), [0])]);
        let neg = design("O", vec![ActDraft::negative(l("0"), [0])]);
        assert_eq!(step(&pos, &neg, &StepOptions::default()).status, Status::Stuck);
    }

    #[test]
    fn daimon_absorbs_even_without_fuel() {
        let (pos, neg) = chain(0);
        let trace = step(&pos, &neg, &StepOptions::with_fuel(0));
        assert_eq!(trace.status, Status::Convergent);
        assert_eq!(trace.len(), 1);
        assert_eq!(trace.fuel_used, 0);
    }

    #[test]
    fn fuel_bound_reports_ongoing() {
        let (pos, neg) = chain(2);

        let partial = step(&pos, &neg, &StepOptions::with_fuel(1));
        assert_eq!(partial.status, Status::Ongoing);
        assert_eq!(partial.len(), 1);
        assert_eq!(partial.focus, l("0.0"));

        let full = step(&pos, &neg, &StepOptions::with_fuel(10));
        assert_eq!(full.status, Status::Convergent);
        assert_eq!(full.len(), 3);
        assert_eq!(full.pairs[0], partial.pairs[0]);
    }

    #[test]
    fn resume_extends_partial_trace() {
        let (pos, neg) = chain(4);
        let partial = step(&pos, &neg, &StepOptions::with_fuel(2));
        let resumed = resume(&pos, &neg, &partial, &StepOptions::with_fuel(10));

        assert_eq!(resumed, step(&pos, &neg, &StepOptions::with_fuel(12)));
        assert_eq!(&resumed.pairs[..2], &partial.pairs[..]);
        assert_eq!(resumed.fuel_used, 4);

        // Finished runs are returned as-is.
        assert_eq!(resume(&pos, &neg, &resumed, &StepOptions::default()), resumed);
    }

    #[test]
    fn virtual_path_forces_focus() {
        let pos = design(
            "P",
            vec![
                ActDraft::positive(l("0"), [1, 2]),
                ActDraft::daimon(l("0.1")),
                ActDraft::positive(l("0.2"), []),
            ],
        );
        let neg = design(
            "O",
            vec![
                ActDraft::negative(l("0"), [1, 2]),
                ActDraft::negative(l("0.1"), []),
                ActDraft::daimon(l("0.2")),
            ],
        );

        let canonical = step(&pos, &neg, &StepOptions::default());
        assert_eq!(canonical.status, Status::Convergent);
        assert_eq!(canonical.pairs[1].locus, l("0.1"));

        let explore = StepOptions::default().with_virtual_neg_path(l("0.2"));
        let forced = step(&pos, &neg, &explore);
        assert_eq!(forced.pairs[1].locus, l("0.2"));
        assert_eq!(forced.status, Status::Convergent);

        let unopened = StepOptions::default().with_virtual_neg_path(l("0.7"));
        assert_eq!(step(&pos, &neg, &unopened).status, Status::Divergent);
    }

    #[test]
    fn judge_acts_terminate_like_daimons() {
        let pos = design("P", vec![ActDraft::positive(l("0"), [1])]);
        let neg = design("O", vec![ActDraft::negative(l("0"), [1])]);
        assert_eq!(step(&pos, &neg, &StepOptions::default()).status, Status::Stuck);

        let (conceded, _) =
            force_concession(&pos, &l("0.1"), "conceded", Audit::new("judge", "stalled")).unwrap();
        let (closed, _) = close_branch(&neg, &l("0.1"), Audit::new("judge", "stalled")).unwrap();

        let trace = step(&conceded, &closed, &StepOptions::default());
        assert_eq!(trace.status, Status::Convergent);
        assert_eq!(
            trace.reason,
            Reason::Terminal {
                locus: l("0.1"),
                by: Side::Positive
            }
        );
    }

    #[test]
    fn trace_serializes_with_wire_names() {
        let (pos, neg) = chain(0);
        let json = serde_json::to_value(step(&pos, &neg, &StepOptions::default())).unwrap();
        assert_eq!(json["status"], "CONVERGENT");
        assert_eq!(json["decisiveIndices"], serde_json::json!([0]));
        assert_eq!(json["pairs"][0]["locus"], "0");
        assert!(json["pairs"][0]["posActId"].is_object());
        assert_eq!(json["reason"]["kind"], "terminal");
    }

    proptest! {
        #[test]
        fn stepping_is_deterministic(depth in 0usize..12, fuel in 0u32..16) {
            let (pos, neg) = chain(depth);
            let options = StepOptions::with_fuel(fuel);
            prop_assert_eq!(step(&pos, &neg, &options), step(&pos, &neg, &options));
        }

        #[test]
        fn more_fuel_extends_the_trace(depth in 0usize..12, fuel in 0u32..16, extra in 1u32..16) {
            let (pos, neg) = chain(depth);
            let short = step(&pos, &neg, &StepOptions::with_fuel(fuel));
            let long = step(&pos, &neg, &StepOptions::with_fuel(fuel + extra));

            prop_assert!(long.len() >= short.len());
            prop_assert_eq!(&long.pairs[..short.len()], &short.pairs[..]);
            if short.status == Status::Ongoing {
                let resumed = resume(&pos, &neg, &short, &StepOptions::with_fuel(extra));
                prop_assert_eq!(resumed, long);
            } else {
                prop_assert_eq!(short, long);
            }
        }
    }
}
