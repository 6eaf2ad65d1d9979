//! Delocation: relocate a design under a fresh base prefix.

use ludics_locus::Locus;
use tracing::debug;

use crate::act::ActDraft;
use crate::design::{Design, DesignBuilder};
use crate::ids::DesignId;
use crate::DesignError;

/// Copy `source` so that every locus sits under `new_base`.
///
/// Each act keeps its polarity, ramification, expression, origin and
/// order; only the locus prefix changes. The copy gets its own id so it can
/// coexist with the source in the same store. Delocating onto an unrelated
/// base is how two designs are separated before they are combined.
pub fn delocate(source: &Design, new_base: &Locus) -> Result<Design, DesignError> {
    let id = DesignId::derive(&["delocate", &source.id().to_hex(), &new_base.to_string()]);

    let mut builder = DesignBuilder::new(
        source.dialogue_id().clone(),
        source.participant().clone(),
        new_base.clone(),
    );
    if let Some(scope) = source.scope() {
        builder = builder.scope(scope);
    }
    let mut builder = builder.id(id);

    for act in source.acts() {
        let locus = act.locus.rebase(source.base(), new_base)?;
        builder.push(ActDraft {
            polarity: act.polarity,
            locus,
            ramification: act.ramification.clone(),
            expression: act.expression.clone(),
            origin: act.origin.clone(),
        })?;
    }

    debug!(source = %source.id(), copy = %id, base = %new_base, "delocated design");
    Ok(builder.build())
}
