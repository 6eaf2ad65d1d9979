//! Judge interventions.
//!
//! A judge may end a stalled branch outside normal alternation. Both
//! interventions append an act carrying its issuer and reason; the source
//! design is left untouched.

use ludics_locus::Locus;
use tracing::info;

use crate::act::{ActDraft, ActOrigin, Audit, InterventionKind, Polarity};
use crate::design::Design;
use crate::ids::ActId;
use crate::DesignError;

/// Append a positive act that ends the branch at `locus` as if conceded.
pub fn force_concession(
    design: &Design,
    locus: &Locus,
    expression: impl Into<String>,
    audit: Audit,
) -> Result<(Design, ActId), DesignError> {
    intervene(
        design,
        ActDraft::new(Polarity::Positive, locus.clone()).with_expression(expression),
        InterventionKind::ForcedConcession,
        audit,
    )
}

/// Append a daimon closing the branch at `locus`.
pub fn close_branch(
    design: &Design,
    locus: &Locus,
    audit: Audit,
) -> Result<(Design, ActId), DesignError> {
    intervene(
        design,
        ActDraft::daimon(locus.clone()).with_expression("CLOSED"),
        InterventionKind::BranchClosure,
        audit,
    )
}

fn intervene(
    design: &Design,
    draft: ActDraft,
    kind: InterventionKind,
    audit: Audit,
) -> Result<(Design, ActId), DesignError> {
    if audit.issuer.trim().is_empty() {
        return Err(DesignError::UnauditedIntervention {
            locus: draft.locus.to_string(),
        });
    }
    let locus = draft.locus.clone();
    let issuer = audit.issuer.clone();
    let (updated, act) = design.with_act(draft.with_origin(ActOrigin::Judge { kind, audit }))?;
    info!(design = %design.id(), %locus, %act, %issuer, ?kind, "judge intervention");
    Ok((updated, act))
}
