//! Uniformity: does a strategy behave alike on sibling branches?
//!
//! Each sibling is run against a virtual negative path, the resulting
//! traces are rewritten relative to the explored child, and the two rewritten
//! traces are compared up to a consistent renaming of child indices.

use std::collections::HashMap;

use ludics_design::{Act, Design};
use ludics_locus::Locus;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::stepper::{step, Status, StepOptions, Trace};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UniformityError {
    /// The two loci are neither equal nor children of one parent.
    #[error("loci {left} and {right} are not siblings")]
    NotSiblings { left: String, right: String },
}

/// Result of a uniformity check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Uniformity {
    pub uniform: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub counterexample: Option<Counterexample>,
    pub left: Trace,
    pub right: Trace,
}

/// First point at which the two normalized traces disagree.
///
/// Paths are relative to the explored child and rendered as `*` for the child
/// itself, `*.1.0` below it; `end:STATUS` marks where a trace stopped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counterexample {
    pub left: String,
    pub right: String,
}

/// Explore `left` and `right` (siblings, or the same locus) and compare.
pub fn check_uniformity(
    pos: &Design,
    neg: &Design,
    left: &Locus,
    right: &Locus,
    fuel: u32,
) -> Result<Uniformity, UniformityError> {
    if left != right && !left.is_sibling_of(right) {
        return Err(UniformityError::NotSiblings {
            left: left.to_string(),
            right: right.to_string(),
        });
    }

    let explore = |child: &Locus| {
        let options = StepOptions {
            fuel,
            virtual_neg_paths: vec![child.clone()],
        };
        step(pos, neg, &options)
    };
    let left_trace = explore(left);
    let right_trace = explore(right);

    let a = normalize(pos, neg, &left_trace, left);
    let b = normalize(pos, neg, &right_trace, right);
    let counterexample = compare(&a, &b, left_trace.status, right_trace.status);

    debug!(%left, %right, uniform = counterexample.is_none(), "uniformity check");
    Ok(Uniformity {
        uniform: counterexample.is_none(),
        counterexample,
        left: left_trace,
        right: right_trace,
    })
}

/// One trace pair with the explored prefix removed. A shape is `None` when
/// the pair names an act its design does not hold.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Step {
    path: Vec<u32>,
    pos: Option<Shape>,
    neg: Option<Shape>,
}

impl Step {
    fn resolved(&self) -> bool {
        self.pos.is_some() && self.neg.is_some()
    }
}

/// What the comparison sees of an act; ids and absolute loci are left out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Shape {
    polarity: ludics_design::Polarity,
    terminal: bool,
    judge: bool,
    width: usize,
}

impl Shape {
    fn of(act: Option<&Act>) -> Option<Self> {
        act.map(|a| Self {
            polarity: a.polarity,
            terminal: a.is_terminal(),
            judge: a.is_judge_issued(),
            width: a.ramification.len(),
        })
    }
}

/// Drop pairs above `child`; rewrite the rest relative to it.
fn normalize(pos: &Design, neg: &Design, trace: &Trace, child: &Locus) -> Vec<Step> {
    trace
        .pairs
        .iter()
        .filter_map(|pair| {
            let path = pair.locus.strip_prefix(child)?.to_vec();
            Some(Step {
                path,
                pos: Shape::of(pos.act(pair.pos)),
                neg: Shape::of(neg.act(pair.neg)),
            })
        })
        .collect()
}

fn render(path: &[u32]) -> String {
    let mut out = String::from("*");
    for segment in path {
        out.push('.');
        out.push_str(&segment.to_string());
    }
    out
}

fn compare(a: &[Step], b: &[Step], a_status: Status, b_status: Status) -> Option<Counterexample> {
    let mut forward: HashMap<&[u32], &[u32]> = HashMap::new();
    let mut back: HashMap<&[u32], &[u32]> = HashMap::new();

    for (x, y) in a.iter().zip(b) {
        let mismatch = || {
            Some(Counterexample {
                left: render(&x.path),
                right: render(&y.path),
            })
        };

        if !x.resolved()
            || !y.resolved()
            || x.path.len() != y.path.len()
            || x.pos != y.pos
            || x.neg != y.neg
        {
            return mismatch();
        }
        if let (Some((_, px)), Some((_, py))) = (x.path.split_last(), y.path.split_last()) {
            // Parents must already correspond under the renaming.
            if !px.is_empty() && forward.get(px) != Some(&py) {
                return mismatch();
            }
        }
        match (forward.get(x.path.as_slice()), back.get(y.path.as_slice())) {
            (None, None) => {
                forward.insert(x.path.as_slice(), y.path.as_slice());
                back.insert(y.path.as_slice(), x.path.as_slice());
            }
            (Some(&fy), Some(&bx)) if fy == y.path.as_slice() && bx == x.path.as_slice() => {}
            _ => return mismatch(),
        }
    }

    if a.len() != b.len() || a_status != b_status {
        let shared = a.len().min(b.len());
        let end = |steps: &[Step], status: Status| match steps.get(shared) {
            Some(s) => render(&s.path),
            None => format!("end:{}", status.as_str()),
        };
        return Some(Counterexample {
            left: end(a, a_status),
            right: end(b, b_status),
        });
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use ludics_design::{close_branch, ActDraft, Audit, DesignBuilder};

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

    /// Proponent answers both challenges at 0.1 and 0.2 the same way, with
    /// differently numbered sub-premises.
    fn symmetric() -> (Design, Design) {
        let pos = design(
            "P",
            vec![
                ActDraft::positive(l("0"), [1, 2]),
                ActDraft::positive(l("0.1"), [5]),
                ActDraft::positive(l("0.1.5"), []),
                ActDraft::positive(l("0.2"), [9]),
                ActDraft::positive(l("0.2.9"), []),
            ],
        );
        let neg = design(
            "O",
            vec![
                ActDraft::negative(l("0"), [1, 2]),
                ActDraft::negative(l("0.1"), [5]),
                ActDraft::daimon(l("0.1.5")),
                ActDraft::negative(l("0.2"), [9]),
                ActDraft::daimon(l("0.2.9")),
            ],
        );
        (pos, neg)
    }

    #[test]
    fn renamed_branches_are_uniform() {
        let (pos, neg) = symmetric();
        let result = check_uniformity(&pos, &neg, &l("0.1"), &l("0.2"), 64).unwrap();
        assert!(result.uniform, "{:?}", result.counterexample);
        assert_eq!(result.left.status, Status::Convergent);
        assert_eq!(result.right.len(), 3);
    }

    #[test]
    fn comparing_a_branch_with_itself_is_uniform() {
        let (pos, neg) = symmetric();
        for child in ["0.1", "0.2", "0.7"] {
            let result = check_uniformity(&pos, &neg, &l(child), &l(child), 64).unwrap();
            assert!(result.uniform);
        }
    }

    #[test]
    fn different_shapes_yield_counterexample() {
        let (pos, neg) = symmetric();
        let (neg, _) = close_branch(&neg, &l("0.2"), Audit::new("judge", "closed")).unwrap();
        // 0.2 now ends on a judge daimon one level up.
        let result = check_uniformity(&pos, &neg, &l("0.1"), &l("0.2"), 64).unwrap();
        assert!(!result.uniform);
        assert_eq!(
            result.counterexample,
            Some(Counterexample {
                left: "*".into(),
                right: "*".into(),
            })
        );
    }

    #[test]
    fn shorter_branch_reports_end_marker() {
        let pos = design(
            "P",
            vec![
                ActDraft::positive(l("0"), [1, 2]),
                ActDraft::positive(l("0.1"), [1]),
                ActDraft::positive(l("0.1.1"), []),
                ActDraft::positive(l("0.2"), [1]),
            ],
        );
        let neg = design(
            "O",
            vec![
                ActDraft::negative(l("0"), [1, 2]),
                ActDraft::negative(l("0.1"), [1]),
                ActDraft::daimon(l("0.1.1")),
                ActDraft::negative(l("0.2"), [1]),
            ],
        );
        let result = check_uniformity(&pos, &neg, &l("0.1"), &l("0.2"), 64).unwrap();
        assert!(!result.uniform);
        assert_eq!(
            result.counterexample,
            Some(Counterexample {
                left: "*.1".into(),
                right: "end:STUCK".into(),
            })
        );
    }

    #[test]
    fn non_siblings_are_rejected() {
        let (pos, neg) = symmetric();
        let err = check_uniformity(&pos, &neg, &l("0.1"), &l("0.2.9"), 64).unwrap_err();
        assert!(matches!(err, UniformityError::NotSiblings { .. }));
    }

    #[test]
    fn alpha_renaming_must_be_consistent() {
        let x = |path: Vec<u32>| Step {
            path,
            pos: Some(Shape {
                polarity: ludics_design::Polarity::Positive,
                terminal: false,
                judge: false,
                width: 1,
            }),
            neg: Some(Shape {
                polarity: ludics_design::Polarity::Negative,
                terminal: false,
                judge: false,
                width: 1,
            }),
        };
        let a = vec![x(vec![]), x(vec![3]), x(vec![3, 1])];
        let good = vec![x(vec![]), x(vec![8]), x(vec![8, 4])];
        let bad = vec![x(vec![]), x(vec![8]), x(vec![2, 4])];

        assert_eq!(compare(&a, &good, Status::Stuck, Status::Stuck), None);
        assert_eq!(
            compare(&a, &bad, Status::Stuck, Status::Stuck),
            Some(Counterexample {
                left: "*.3.1".into(),
                right: "*.2.4".into(),
            })
        );
    }

    #[test]
    fn unresolved_acts_never_match() {
        let (pos, neg) = symmetric();
        let left = step(&pos, &neg, &StepOptions::default().with_virtual_neg_path(l("0.1")));
        let right = step(&pos, &neg, &StepOptions::default().with_virtual_neg_path(l("0.2")));

        // Resolve the right-hand trace against designs that do not hold its acts.
        let strangers = design("X", vec![ActDraft::positive(l("0"), [1, 2])]);
        let a = normalize(&pos, &neg, &left, &l("0.1"));
        let b = normalize(&strangers, &strangers, &right, &l("0.2"));
        assert!(b.iter().all(|s| !s.resolved()));
        assert_eq!(
            compare(&a, &b, left.status, right.status),
            Some(Counterexample {
                left: "*".into(),
                right: "*".into(),
            })
        );

        // Even two unresolved traces are not alike.
        assert!(compare(&b, &b, right.status, right.status).is_some());
    }
}
