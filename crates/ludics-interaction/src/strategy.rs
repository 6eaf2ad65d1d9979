//! Strategy analysis over a single design.
//!
//! A design read as a strategy is innocent when it is
//!
//! - deterministic: at most one participant act per locus, and
//! - view-stable: every act whose parent locus carries an act of the same
//!   design is justified by that act's ramification.
//!
//! Propagation holds when no child locus is opened by two different acts.
//! Judge-issued acts are left out of the analysis and only counted.

use std::collections::{BTreeMap, BTreeSet};

use ludics_design::{participant_acts, Act, ActId, Design, DesignId, ParticipantId};
use ludics_locus::Locus;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A root-to-leaf chain of acts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Play {
    pub leaf: Locus,
    pub acts: Vec<ActId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ViolationKind {
    Determinism,
    ViewStability,
    Propagation,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Violation {
    pub kind: ViolationKind,
    pub locus: Locus,
    pub acts: Vec<ActId>,
}

/// Derived analysis artifact; recompute rather than edit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Strategy {
    pub design_id: DesignId,
    pub player: ParticipantId,
    pub is_innocent: bool,
    pub is_deterministic: bool,
    pub is_view_stable: bool,
    pub satisfies_propagation: bool,
    pub plays: Vec<Play>,
    /// Locus → justification chain ending at the act there.
    pub view_cache: BTreeMap<Locus, Vec<ActId>>,
    pub violations: Vec<Violation>,
    /// Judge-issued acts skipped by the analysis.
    pub judge_acts: usize,
}

impl Strategy {
    pub fn analyze(design: &Design) -> Self {
        let mut by_locus: BTreeMap<&Locus, Vec<&Act>> = BTreeMap::new();
        for act in participant_acts(design) {
            by_locus.entry(&act.locus).or_default().push(act);
        }
        let analysed: usize = by_locus.values().map(Vec::len).sum();
        let mut violations = Vec::new();

        for (locus, acts) in &by_locus {
            if acts.len() > 1 {
                violations.push(Violation {
                    kind: ViolationKind::Determinism,
                    locus: (*locus).clone(),
                    acts: acts.iter().map(|a| a.id).collect(),
                });
            }
        }

        for (locus, acts) in &by_locus {
            let Ok(parent) = locus.parent() else {
                continue;
            };
            let Some(justifier) = by_locus.get(&parent).and_then(|acts| acts.first()) else {
                continue;
            };
            if !justifier.ramification.contains(&locus.last_segment()) {
                violations.push(Violation {
                    kind: ViolationKind::ViewStability,
                    locus: (*locus).clone(),
                    acts: acts.iter().map(|a| a.id).collect(),
                });
            }
        }

        let mut openers: BTreeMap<Locus, Vec<ActId>> = BTreeMap::new();
        for act in by_locus.values().flatten() {
            for child in act.opened_loci() {
                openers.entry(child).or_default().push(act.id);
            }
        }
        for (child, acts) in openers {
            if acts.len() > 1 {
                violations.push(Violation {
                    kind: ViolationKind::Propagation,
                    locus: child,
                    acts,
                });
            }
        }

        let view_cache: BTreeMap<Locus, Vec<ActId>> = by_locus
            .keys()
            .map(|locus| ((*locus).clone(), view(&by_locus, locus)))
            .collect();

        let parents: BTreeSet<Locus> = by_locus.keys().filter_map(|l| l.parent().ok()).collect();
        let plays: Vec<Play> = view_cache
            .iter()
            .filter(|(locus, _)| !parents.contains(*locus))
            .map(|(leaf, acts)| Play {
                leaf: leaf.clone(),
                acts: acts.clone(),
            })
            .collect();

        let has = |kind| violations.iter().any(|v: &Violation| v.kind == kind);
        let is_deterministic = !has(ViolationKind::Determinism);
        let is_view_stable = !has(ViolationKind::ViewStability);
        let satisfies_propagation = !has(ViolationKind::Propagation);

        debug!(
            design = %design.id(),
            plays = plays.len(),
            violations = violations.len(),
            "analysed strategy"
        );
        Self {
            design_id: design.id(),
            player: design.participant().clone(),
            is_innocent: is_deterministic && is_view_stable,
            is_deterministic,
            is_view_stable,
            satisfies_propagation,
            plays,
            view_cache,
            violations,
            judge_acts: design.len() - analysed,
        }
    }
}

/// Walk up from `locus` while the design has an act at each ancestor.
fn view(by_locus: &BTreeMap<&Locus, Vec<&Act>>, locus: &Locus) -> Vec<ActId> {
    let mut chain = Vec::new();
    let mut current = Some(locus.clone());
    while let Some(at) = current {
        let Some(act) = by_locus.get(&at).and_then(|acts| acts.first()) else {
            break;
        };
        chain.push(act.id);
        current = at.parent().ok();
    }
    chain.reverse();
    chain
}
