//! Saturation: does every branch under a locus converge?

use ludics_design::{Design, Polarity};
use ludics_locus::Locus;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::stepper::{step, Reason, Status, StepOptions};

/// Verdict for one explored child.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChildVerdict {
    pub locus: Locus,
    pub status: Status,
    pub reason: Reason,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Saturation {
    pub parent: Locus,
    pub children: Vec<ChildVerdict>,
    /// True when there is at least one child and all of them converge.
    pub saturated: bool,
}

/// Explore every child the positive design opens at `parent`, one stepper run
/// per child. The runs share nothing, so callers may fan them out.
pub fn saturation(pos: &Design, neg: &Design, parent: &Locus, fuel: u32) -> Saturation {
    let children: Vec<Locus> = pos
        .act_at(parent, |a| a.polarity == Polarity::Positive || a.is_terminal())
        .map(|act| act.opened_loci().collect())
        .unwrap_or_default();

    let verdicts: Vec<ChildVerdict> = children
        .into_iter()
        .map(|child| {
            let options = StepOptions {
                fuel,
                virtual_neg_paths: vec![child.clone()],
            };
            let trace = step(pos, neg, &options);
            ChildVerdict {
                locus: child,
                status: trace.status,
                reason: trace.reason,
            }
        })
        .collect();

    let saturated =
        !verdicts.is_empty() && verdicts.iter().all(|v| v.status == Status::Convergent);
    debug!(%parent, children = verdicts.len(), saturated, "saturation");
    Saturation {
        parent: parent.clone(),
        children: verdicts,
        saturated,
    }
}
