//! The engine store.
//!
//! One [`Engine`] is created by the host at startup and handed to request
//! handlers by reference. It owns every design it has compiled or been given,
//! the commitment store, and the log of judge interventions. Nothing is
//! global; two engines never share state.

use std::collections::BTreeMap;

use ludics_commitments::{
    ApplyOps, CandidateAct, ChainOutcome, CommitmentListing, CommitmentStore,
};
use ludics_design::{
    compile, ActId, Audit, CompileOptions, Design, DesignId, DialogueId, InterventionKind, Move,
};
use ludics_interaction::{
    check_uniformity, resume, saturation, step, Saturation, StepOptions, Strategy, Trace,
    Uniformity,
};
use ludics_locus::Locus;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::EngineConfig;
use crate::error::{Error, Result};

/// A stepper invocation as it arrives from a request handler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepRequest {
    pub dialogue_id: DialogueId,
    pub pos_design_id: DesignId,
    pub neg_design_id: DesignId,
    /// Falls back to [`EngineConfig::default_fuel`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fuel: Option<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub virtual_neg_paths: Vec<Locus>,
}

impl StepRequest {
    pub fn new(dialogue_id: impl Into<DialogueId>, pos: DesignId, neg: DesignId) -> Self {
        Self {
            dialogue_id: dialogue_id.into(),
            pos_design_id: pos,
            neg_design_id: neg,
            fuel: None,
            virtual_neg_paths: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_fuel(mut self, fuel: u32) -> Self {
        self.fuel = Some(fuel);
        self
    }

    #[must_use]
    pub fn with_virtual_neg_path(mut self, path: Locus) -> Self {
        self.virtual_neg_paths.push(path);
        self
    }
}

/// Emitted after designs were created or replaced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesignsUpdated {
    pub dialogue_id: DialogueId,
    pub design_ids: Vec<DesignId>,
}

/// Emitted after an owner's commitment set changed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitmentsUpdated {
    pub owner_id: String,
    pub added: Vec<String>,
    pub removed: Vec<String>,
    /// Labels whose entitlement was set.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub entitlement: Vec<String>,
}

/// Result of a delocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Delocated {
    pub design_id: DesignId,
    pub base: Locus,
    pub update: DesignsUpdated,
}

/// One judge intervention as recorded by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditRecord {
    pub design_id: DesignId,
    pub act: ActId,
    pub locus: Locus,
    pub kind: InterventionKind,
    pub audit: Audit,
}

#[derive(Debug, Clone, Default)]
pub struct Engine {
    config: EngineConfig,
    designs: BTreeMap<DesignId, Design>,
    commitments: CommitmentStore,
    audit_log: Vec<AuditRecord>,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // ---- Designs ----

    /// Compile a dialogue's move log and store the resulting designs,
    /// replacing earlier compilations of the same dialogue and scope.
    /// Nothing is stored when compilation fails.
    pub fn compile(
        &mut self,
        dialogue_id: impl Into<DialogueId>,
        moves: &[Move],
        scope: Option<&str>,
    ) -> Result<DesignsUpdated> {
        let dialogue_id = dialogue_id.into();
        let mut options =
            CompileOptions::new(dialogue_id.clone()).with_root(self.config.root.clone());
        if let Some(scope) = scope {
            options = options.with_scope(scope);
        }

        let designs = compile(moves, &options)?;
        let design_ids: Vec<DesignId> = designs.iter().map(Design::id).collect();
        for design in designs {
            self.designs.insert(design.id(), design);
        }
        info!(dialogue = %dialogue_id, designs = design_ids.len(), "stored compiled designs");
        Ok(DesignsUpdated {
            dialogue_id,
            design_ids,
        })
    }

    /// Store a design loaded from persistence.
    pub fn insert_design(&mut self, design: Design) -> DesignsUpdated {
        let update = DesignsUpdated {
            dialogue_id: design.dialogue_id().clone(),
            design_ids: vec![design.id()],
        };
        self.designs.insert(design.id(), design);
        update
    }

    pub fn design(&self, id: DesignId) -> Result<&Design> {
        self.designs.get(&id).ok_or_else(|| Error::DesignNotFound {
            id: id.to_hex(),
        })
    }

    /// Designs of one dialogue, in id order.
    pub fn designs_of<'a>(&'a self, dialogue: &'a DialogueId) -> impl Iterator<Item = &'a Design> {
        self.designs
            .values()
            .filter(move |d| d.dialogue_id() == dialogue)
    }

    fn design_in(&self, id: DesignId, dialogue: &DialogueId) -> Result<&Design> {
        let design = self.design(id)?;
        if design.dialogue_id() != dialogue {
            return Err(Error::DialogueMismatch {
                design: id.to_hex(),
                expected: dialogue.to_string(),
                actual: design.dialogue_id().to_string(),
            });
        }
        Ok(design)
    }

    /// Clone `source` under `new_base` and store the clone.
    pub fn delocate(&mut self, source: DesignId, new_base: &Locus) -> Result<Delocated> {
        let design = ludics_design::delocate(self.design(source)?, new_base)?;
        let design_id = design.id();
        let base = design.base().clone();
        let update = self.insert_design(design);
        debug!(%source, design = %design_id, %base, "delocated design");
        Ok(Delocated {
            design_id,
            base,
            update,
        })
    }

    pub fn analyze_strategy(&self, design: DesignId) -> Result<Strategy> {
        Ok(Strategy::analyze(self.design(design)?))
    }

    // ---- Judge ----

    /// Append a forced concession to a stored design.
    pub fn force_concession(
        &mut self,
        design: DesignId,
        locus: &Locus,
        expression: impl Into<String>,
        audit: Audit,
    ) -> Result<DesignsUpdated> {
        let (updated, act) =
            ludics_design::force_concession(self.design(design)?, locus, expression, audit.clone())?;
        Ok(self.record_intervention(updated, act, locus, InterventionKind::ForcedConcession, audit))
    }

    /// Append a daimon closing a branch of a stored design.
    pub fn close_branch(
        &mut self,
        design: DesignId,
        locus: &Locus,
        audit: Audit,
    ) -> Result<DesignsUpdated> {
        let (updated, act) = ludics_design::close_branch(self.design(design)?, locus, audit.clone())?;
        Ok(self.record_intervention(updated, act, locus, InterventionKind::BranchClosure, audit))
    }

    fn record_intervention(
        &mut self,
        updated: Design,
        act: ActId,
        locus: &Locus,
        kind: InterventionKind,
        audit: Audit,
    ) -> DesignsUpdated {
        self.audit_log.push(AuditRecord {
            design_id: updated.id(),
            act,
            locus: locus.clone(),
            kind,
            audit,
        });
        self.insert_design(updated)
    }

    /// Judge interventions in the order they were made.
    pub fn audit_log(&self) -> &[AuditRecord] {
        &self.audit_log
    }

    // ---- Interaction ----

    fn step_options(&self, fuel: Option<u32>, virtual_neg_paths: Vec<Locus>) -> StepOptions {
        StepOptions {
            fuel: fuel.unwrap_or(self.config.default_fuel),
            virtual_neg_paths,
        }
    }

    fn pair(&self, request: &StepRequest) -> Result<(&Design, &Design)> {
        let pos = self.design_in(request.pos_design_id, &request.dialogue_id)?;
        let neg = self.design_in(request.neg_design_id, &request.dialogue_id)?;
        Ok((pos, neg))
    }

    pub fn step(&self, request: &StepRequest) -> Result<Trace> {
        let (pos, neg) = self.pair(request)?;
        let options = self.step_options(request.fuel, request.virtual_neg_paths.clone());
        Ok(step(pos, neg, &options))
    }

    /// Continue an `ONGOING` trace with the request's fuel.
    pub fn resume(&self, request: &StepRequest, previous: &Trace) -> Result<Trace> {
        let (pos, neg) = self.pair(request)?;
        let options = self.step_options(request.fuel, request.virtual_neg_paths.clone());
        Ok(resume(pos, neg, previous, &options))
    }

    pub fn check_uniformity(
        &self,
        pos: DesignId,
        neg: DesignId,
        left: &Locus,
        right: &Locus,
        fuel: Option<u32>,
    ) -> Result<Uniformity> {
        let fuel = fuel.unwrap_or(self.config.default_fuel);
        Ok(check_uniformity(
            self.design(pos)?,
            self.design(neg)?,
            left,
            right,
            fuel,
        )?)
    }

    pub fn saturation(
        &self,
        pos: DesignId,
        neg: DesignId,
        parent: &Locus,
        fuel: Option<u32>,
    ) -> Result<Saturation> {
        let fuel = fuel.unwrap_or(self.config.default_fuel);
        Ok(saturation(self.design(pos)?, self.design(neg)?, parent, fuel))
    }

    // ---- Commitments ----

    pub fn apply_to_cs(&mut self, owner: &str, ops: ApplyOps) -> Result<CommitmentsUpdated> {
        let outcome = self.commitments.apply_to_cs(owner, ops)?;
        Ok(CommitmentsUpdated {
            owner_id: owner.to_string(),
            added: outcome.added,
            removed: outcome.removed,
            entitlement: Vec::new(),
        })
    }

    pub fn set_entitlement(
        &mut self,
        owner: &str,
        label: &str,
        entitled: bool,
    ) -> Result<CommitmentsUpdated> {
        self.commitments.set_entitlement(owner, label, entitled)?;
        Ok(CommitmentsUpdated {
            owner_id: owner.to_string(),
            entitlement: vec![label.to_string()],
            ..CommitmentsUpdated::default()
        })
    }

    pub fn register_contradiction(&mut self, a: &str, b: &str) -> Result<()> {
        Ok(self.commitments.register_contradiction(a, b)?)
    }

    /// Forward-chain `owner`'s set, capped by the configured iteration cap.
    pub fn interact_ce(&mut self, owner: &str) -> ChainOutcome {
        self.commitments
            .interact_ce(owner, self.config.chain_iteration_cap)
    }

    pub fn list_cs(&self, owner: &str) -> CommitmentListing {
        self.commitments.list_cs(owner)
    }

    pub fn candidate_acts(&self, owner: &str) -> Vec<CandidateAct> {
        self.commitments.candidate_acts(owner)
    }
}
