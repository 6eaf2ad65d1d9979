//! Designs: one participant's strategy as an ordered sequence of acts.

use std::collections::{BTreeMap, BTreeSet};

use ludics_locus::Locus;
use serde::{Deserialize, Serialize};

use crate::act::{Act, ActDraft, ActOrigin};
use crate::ids::{ActId, DesignId, DialogueId, ParticipantId};
use crate::DesignError;

/// A participant's strategy tree.
///
/// Acts live in an arena ordered by `order_in_design`; a locus index maps
/// each locus to the arena slots occupying it. A design is never partially
/// mutated: [`Design::with_act`] returns a new design.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "DesignRecord", rename_all = "camelCase")]
pub struct Design {
    id: DesignId,
    dialogue_id: DialogueId,
    participant: ParticipantId,
    scope: Option<String>,
    base: Locus,
    acts: Vec<Act>,
    #[serde(skip)]
    index: BTreeMap<Locus, Vec<usize>>,
}

/// Wire shape of a design; the locus index is rebuilt on load.
///
/// Loading checks act numbering, the base and daimon ramifications. A child
/// opened twice is accepted so that strategy analysis can report it.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DesignRecord {
    id: DesignId,
    dialogue_id: DialogueId,
    participant: ParticipantId,
    #[serde(default)]
    scope: Option<String>,
    base: Locus,
    acts: Vec<Act>,
}

impl TryFrom<DesignRecord> for Design {
    type Error = DesignError;

    fn try_from(record: DesignRecord) -> Result<Self, Self::Error> {
        for (slot, act) in record.acts.iter().enumerate() {
            let numbered = act.id.design == record.id
                && act.id.index as usize == slot
                && act.order_in_design as usize == slot;
            if !numbered {
                return Err(DesignError::MisnumberedAct {
                    design: record.id.to_hex(),
                    slot,
                });
            }
            if !record.base.is_prefix_of(&act.locus) {
                return Err(DesignError::OutsideBase {
                    locus: act.locus.to_string(),
                    base: record.base.to_string(),
                });
            }
            if act.polarity.is_daimon() && !act.ramification.is_empty() {
                return Err(DesignError::DaimonRamification {
                    locus: act.locus.to_string(),
                });
            }
        }

        let index = index_acts(&record.acts);
        Ok(Self {
            id: record.id,
            dialogue_id: record.dialogue_id,
            participant: record.participant,
            scope: record.scope,
            base: record.base,
            acts: record.acts,
            index,
        })
    }
}

fn index_acts(acts: &[Act]) -> BTreeMap<Locus, Vec<usize>> {
    let mut index: BTreeMap<Locus, Vec<usize>> = BTreeMap::new();
    for (slot, act) in acts.iter().enumerate() {
        index.entry(act.locus.clone()).or_default().push(slot);
    }
    index
}

impl Design {
    pub fn id(&self) -> DesignId {
        self.id
    }

    pub fn dialogue_id(&self) -> &DialogueId {
        &self.dialogue_id
    }

    pub fn participant(&self) -> &ParticipantId {
        &self.participant
    }

    pub fn scope(&self) -> Option<&str> {
        self.scope.as_deref()
    }

    /// Root of this design's address space.
    pub fn base(&self) -> &Locus {
        &self.base
    }

    /// All acts in design order.
    pub fn acts(&self) -> &[Act] {
        &self.acts
    }

    pub fn len(&self) -> usize {
        self.acts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.acts.is_empty()
    }

    /// Look up an act by id.
    pub fn act(&self, id: ActId) -> Option<&Act> {
        if id.design != self.id {
            return None;
        }
        self.acts.get(id.index as usize)
    }

    /// Every act placed at `locus`, in design order.
    pub fn acts_at<'a>(&'a self, locus: &Locus) -> impl Iterator<Item = &'a Act> + 'a {
        self.index
            .get(locus)
            .into_iter()
            .flat_map(move |slots| slots.iter().map(move |&slot| &self.acts[slot]))
    }

    /// The latest act at `locus` accepted by `accepts`.
    ///
    /// Later acts win, so a judge intervention appended after a participant
    /// act at the same locus takes precedence.
    pub fn act_at(&self, locus: &Locus, accepts: impl Fn(&Act) -> bool) -> Option<&Act> {
        self.index
            .get(locus)?
            .iter()
            .rev()
            .map(|&slot| &self.acts[slot])
            .find(|act| accepts(act))
    }

    /// Loci that have at least one act.
    pub fn occupied_loci(&self) -> impl Iterator<Item = &Locus> {
        self.index.keys()
    }

    /// Every child locus opened by some act of this design.
    pub fn opened_loci(&self) -> BTreeSet<Locus> {
        self.acts.iter().flat_map(|a| a.opened_loci()).collect()
    }

    /// A new design equal to this one plus `draft` appended.
    pub fn with_act(&self, draft: ActDraft) -> Result<(Design, ActId), DesignError> {
        let mut builder = DesignBuilder::from_design(self.clone());
        let id = builder.push(draft)?;
        Ok((builder.build(), id))
    }
}

/// Incrementally assembles a [`Design`], validating each act as it lands.
#[derive(Debug, Clone)]
pub struct DesignBuilder {
    design: Design,
    opened: BTreeSet<Locus>,
}

impl DesignBuilder {
    /// Start a design; its id is derived from dialogue, participant and base.
    pub fn new(dialogue_id: DialogueId, participant: ParticipantId, base: Locus) -> Self {
        let id = DesignId::derive(&[
            "design",
            dialogue_id.as_str(),
            participant.as_str(),
            "",
            &base.to_string(),
        ]);
        Self {
            design: Design {
                id,
                dialogue_id,
                participant,
                scope: None,
                base,
                acts: Vec::new(),
                index: BTreeMap::new(),
            },
            opened: BTreeSet::new(),
        }
    }

    /// Resume building from an existing design.
    pub fn from_design(design: Design) -> Self {
        let opened = design.opened_loci();
        Self { design, opened }
    }

    /// Set the scope; re-derives the id so scoped designs never collide.
    #[must_use]
    pub fn scope(mut self, scope: impl Into<String>) -> Self {
        let scope = scope.into();
        self.design.id = DesignId::derive(&[
            "design",
            self.design.dialogue_id.as_str(),
            self.design.participant.as_str(),
            &scope,
            &self.design.base.to_string(),
        ]);
        self.design.scope = Some(scope);
        self
    }

    /// Override the derived id. Existing acts are re-keyed.
    #[must_use]
    pub fn id(mut self, id: DesignId) -> Self {
        self.design.id = id;
        for act in &mut self.design.acts {
            act.id.design = id;
        }
        self
    }

    pub fn design_id(&self) -> DesignId {
        self.design.id
    }

    /// Append an act, enforcing the design invariants.
    pub fn push(&mut self, draft: ActDraft) -> Result<ActId, DesignError> {
        if !self.design.base.is_prefix_of(&draft.locus) {
            return Err(DesignError::OutsideBase {
                locus: draft.locus.to_string(),
                base: self.design.base.to_string(),
            });
        }
        if draft.polarity.is_daimon() && !draft.ramification.is_empty() {
            return Err(DesignError::DaimonRamification {
                locus: draft.locus.to_string(),
            });
        }
        for i in &draft.ramification {
            let child = draft.locus.child(*i);
            if self.opened.contains(&child) {
                return Err(DesignError::RamificationConflict {
                    design: self.design.id.to_hex(),
                    child: child.to_string(),
                });
            }
        }

        let order = u32::try_from(self.design.acts.len()).map_err(|_| DesignError::TooManyActs)?;
        let id = ActId::new(self.design.id, order);
        self.opened.extend(draft.ramification.iter().map(|i| draft.locus.child(*i)));
        self.design
            .index
            .entry(draft.locus.clone())
            .or_default()
            .push(self.design.acts.len());
        self.design.acts.push(Act {
            id,
            polarity: draft.polarity,
            locus: draft.locus,
            ramification: draft.ramification,
            expression: draft.expression,
            order_in_design: order,
            origin: draft.origin,
        });
        Ok(id)
    }

    /// Chaining form of [`DesignBuilder::push`].
    pub fn act(mut self, draft: ActDraft) -> Result<Self, DesignError> {
        self.push(draft)?;
        Ok(self)
    }

    pub fn build(self) -> Design {
        self.design
    }
}

/// Participant acts only, for analyses that must not mistake judge
/// interventions for ordinary moves.
pub fn participant_acts(design: &Design) -> impl Iterator<Item = &Act> {
    design
        .acts()
        .iter()
        .filter(|a| matches!(a.origin, ActOrigin::Participant))
}
