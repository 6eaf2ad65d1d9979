//! Design compiler: external move log → one design per participant.
//!
//! # Placement rules
//!
//! Moves are walked in `created_at` order (the move id breaks ties):
//!
//! - **Assert** places a positive act at its locus (explicit, the target's
//!   anchor, the root, or a fresh child of the root) and anchors the target
//!   there.
//! - **Challenge** places a negative act at the targeted locus opening a
//!   fresh child `ξ.k`. Repeated challenges at the same locus by the same
//!   participant widen that act's ramification. The challenged child is also
//!   exposed in every other participant's positive act at `ξ`, so the two
//!   designs share a continuation.
//! - **Answer** places a positive act at the challenged child, optionally
//!   opening sub-premise children.
//! - **Close** places a daimon.
//!
//! A locus is open for a participant once some act has opened it (the root
//! is open from the start) and that participant has not yet played there.
//!
//! Compilation is two-pass: placements are collected first and
//! materialised into designs at the end, so every act is created exactly
//! once with its final ramification. Identical logs compile to identical
//! designs.

use std::collections::{BTreeSet, HashMap, HashSet};

use ludics_locus::Locus;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, trace};

use crate::act::{ActDraft, Polarity};
use crate::design::{Design, DesignBuilder};
use crate::ids::{DialogueId, ParticipantId};
use crate::DesignError;

/// What a move is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetKind {
    Claim,
    Argument,
    Card,
}

/// The claim/argument a move addresses.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Target {
    #[serde(rename = "targetType")]
    pub kind: TargetKind,
    #[serde(rename = "targetId")]
    pub id: String,
}

impl Target {
    pub fn claim(id: impl Into<String>) -> Self {
        Self {
            kind: TargetKind::Claim,
            id: id.into(),
        }
    }

    pub fn argument(id: impl Into<String>) -> Self {
        Self {
            kind: TargetKind::Argument,
            id: id.into(),
        }
    }
}

/// Grounds on which a challenge is raised.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum ChallengeBasis {
    /// A critical question of an argumentation scheme.
    CriticalQuestion(String),
    /// A scheme as a whole.
    Scheme(String),
    #[default]
    Default,
}

impl ChallengeBasis {
    fn label(&self) -> String {
        match self {
            ChallengeBasis::CriticalQuestion(id) => format!("WHY[cq:{}]", id),
            ChallengeBasis::Scheme(key) => format!("WHY[scheme:{}]", key),
            ChallengeBasis::Default => "WHY".to_string(),
        }
    }
}

/// The kind-specific part of a move.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum MoveKind {
    #[serde(rename = "ASSERT")]
    Assert {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        locus: Option<Locus>,
        #[serde(default)]
        expression: String,
        /// Children opened up front.
        #[serde(default)]
        openings: Vec<u32>,
    },
    #[serde(rename = "WHY")]
    Challenge {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        locus: Option<Locus>,
        /// Explicit child suffix; a fresh one is allocated when absent.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        child: Option<u32>,
        #[serde(default)]
        expression: String,
        #[serde(default)]
        basis: ChallengeBasis,
    },
    #[serde(rename = "GROUNDS")]
    Answer {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        locus: Option<Locus>,
        #[serde(default)]
        expression: String,
        /// Sub-premise children opened by the answer.
        #[serde(default)]
        premises: Vec<u32>,
    },
    #[serde(rename = "CLOSE")]
    Close {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        locus: Option<Locus>,
        #[serde(default)]
        expression: String,
    },
}

impl MoveKind {
    fn explicit_locus(&self) -> Option<&Locus> {
        match self {
            MoveKind::Assert { locus, .. }
            | MoveKind::Challenge { locus, .. }
            | MoveKind::Answer { locus, .. }
            | MoveKind::Close { locus, .. } => locus.as_ref(),
        }
    }
}

/// One record of the external move log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Move {
    pub id: String,
    #[serde(rename = "actorId")]
    pub actor: ParticipantId,
    #[serde(flatten)]
    pub target: Option<Target>,
    #[serde(default)]
    pub created_at: u64,
    #[serde(flatten)]
    pub kind: MoveKind,
}

impl Move {
    pub fn new(id: impl Into<String>, actor: impl Into<ParticipantId>, kind: MoveKind) -> Self {
        Self {
            id: id.into(),
            actor: actor.into(),
            target: None,
            created_at: 0,
            kind,
        }
    }

    #[must_use]
    pub fn on(mut self, target: Target) -> Self {
        self.target = Some(target);
        self
    }

    #[must_use]
    pub fn at_time(mut self, created_at: u64) -> Self {
        self.created_at = created_at;
        self
    }
}

/// Compilation settings.
#[derive(Debug, Clone)]
pub struct CompileOptions {
    pub dialogue_id: DialogueId,
    pub scope: Option<String>,
    pub root: Locus,
}

impl CompileOptions {
    pub fn new(dialogue_id: impl Into<DialogueId>) -> Self {
        Self {
            dialogue_id: dialogue_id.into(),
            scope: None,
            root: Locus::root(),
        }
    }

    #[must_use]
    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    #[must_use]
    pub fn with_root(mut self, root: Locus) -> Self {
        self.root = root;
        self
    }
}

/// Compilation failures. Nothing is produced when any move fails.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    /// A move targets a locus its actor may not play at.
    #[error("dialogue {dialogue}: move {move_id} by {participant} references locus {locus}, which is not open for them")]
    LocusNotOpen {
        dialogue: String,
        move_id: String,
        participant: String,
        locus: String,
    },

    /// A move failed boundary validation.
    #[error("dialogue {dialogue}: move {move_id:?} is invalid: {reason}")]
    InvalidMove {
        dialogue: String,
        move_id: String,
        reason: &'static str,
    },

    /// Materialising a design broke a design invariant.
    #[error("dialogue {dialogue}: design for {participant} rejected an act: {source}")]
    Design {
        dialogue: String,
        participant: String,
        source: DesignError,
    },
}

/// Compile a move log into one design per participant, in order of first
/// appearance.
pub fn compile(moves: &[Move], options: &CompileOptions) -> Result<Vec<Design>, CompileError> {
    validate(moves, options)?;

    let mut ordered: Vec<&Move> = moves.iter().collect();
    ordered.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));

    let mut compiler = Compiler::new(options);
    for mv in ordered {
        compiler.apply(mv)?;
    }
    let designs = compiler.materialise()?;

    debug!(
        dialogue = %options.dialogue_id,
        moves = moves.len(),
        designs = designs.len(),
        acts = designs.iter().map(Design::len).sum::<usize>(),
        "compiled move log"
    );
    Ok(designs)
}

fn validate(moves: &[Move], options: &CompileOptions) -> Result<(), CompileError> {
    let invalid = |mv: &Move, reason| CompileError::InvalidMove {
        dialogue: options.dialogue_id.to_string(),
        move_id: mv.id.clone(),
        reason,
    };

    let mut seen = HashSet::new();
    for mv in moves {
        if mv.id.trim().is_empty() {
            return Err(invalid(mv, "empty move id"));
        }
        if mv.actor.as_str().trim().is_empty() {
            return Err(invalid(mv, "empty actor"));
        }
        if !seen.insert(mv.id.as_str()) {
            return Err(invalid(mv, "duplicate move id"));
        }
        if let Some(locus) = mv.kind.explicit_locus() {
            if !options.root.is_prefix_of(locus) {
                return Err(CompileError::LocusNotOpen {
                    dialogue: options.dialogue_id.to_string(),
                    move_id: mv.id.clone(),
                    participant: mv.actor.to_string(),
                    locus: locus.to_string(),
                });
            }
        }
    }
    Ok(())
}

/// A placement awaiting materialisation.
struct Placement {
    participant: usize,
    polarity: Polarity,
    locus: Locus,
    ramification: BTreeSet<u32>,
    expression: String,
}

struct Compiler<'a> {
    options: &'a CompileOptions,
    participants: Vec<ParticipantId>,
    placements: Vec<Placement>,
    slots: HashMap<(usize, Locus), usize>,
    opened: BTreeSet<Locus>,
    anchors: HashMap<Target, Locus>,
    last_assert: Option<Locus>,
    next_child: HashMap<Locus, u32>,
}

impl<'a> Compiler<'a> {
    fn new(options: &'a CompileOptions) -> Self {
        let mut opened = BTreeSet::new();
        opened.insert(options.root.clone());
        Self {
            options,
            participants: Vec::new(),
            placements: Vec::new(),
            slots: HashMap::new(),
            opened,
            anchors: HashMap::new(),
            last_assert: None,
            next_child: HashMap::new(),
        }
    }

    fn participant_index(&mut self, participant: &ParticipantId) -> usize {
        match self.participants.iter().position(|p| p == participant) {
            Some(i) => i,
            None => {
                self.participants.push(participant.clone());
                self.participants.len() - 1
            }
        }
    }

    fn is_open_for(&self, actor: usize, locus: &Locus) -> bool {
        self.opened.contains(locus) && !self.slots.contains_key(&(actor, locus.clone()))
    }

    fn not_open(&self, mv: &Move, locus: &Locus) -> CompileError {
        CompileError::LocusNotOpen {
            dialogue: self.options.dialogue_id.to_string(),
            move_id: mv.id.clone(),
            participant: mv.actor.to_string(),
            locus: locus.to_string(),
        }
    }

    /// Explicit locus, then the target's anchor, then the last assertion, then the root.
    fn resolve(&self, mv: &Move) -> Locus {
        mv.kind
            .explicit_locus()
            .cloned()
            .or_else(|| mv.target.as_ref().and_then(|t| self.anchors.get(t).cloned()))
            .or_else(|| self.last_assert.clone())
            .unwrap_or_else(|| self.options.root.clone())
    }

    /// Smallest unopened child index of `parent`, counting from 1.
    fn fresh_child(&mut self, parent: &Locus) -> u32 {
        let counter = self.next_child.entry(parent.clone()).or_insert(1);
        loop {
            let k = *counter;
            *counter += 1;
            if !self.opened.contains(&parent.child(k)) {
                return k;
            }
        }
    }

    fn anchor(&mut self, mv: &Move, locus: &Locus) {
        if let Some(target) = &mv.target {
            self.anchors.insert(target.clone(), locus.clone());
        }
    }

    fn place(
        &mut self,
        actor: usize,
        polarity: Polarity,
        locus: Locus,
        mut ramification: BTreeSet<u32>,
        expression: String,
    ) {
        if polarity == Polarity::Positive {
            // Pick up challenges already raised here by others.
            for (other, slot) in self.slots_at(&locus) {
                if other != actor && self.placements[slot].polarity == Polarity::Negative {
                    ramification.extend(self.placements[slot].ramification.iter().copied());
                }
            }
        }
        self.opened
            .extend(ramification.iter().map(|i| locus.child(*i)));
        trace!(participant = %self.participants[actor], %locus, polarity = polarity.symbol(), "placed act");
        self.slots
            .insert((actor, locus.clone()), self.placements.len());
        self.placements.push(Placement {
            participant: actor,
            polarity,
            locus,
            ramification,
            expression,
        });
    }

    fn slots_at(&self, locus: &Locus) -> Vec<(usize, usize)> {
        (0..self.participants.len())
            .filter_map(|p| self.slots.get(&(p, locus.clone())).map(|&s| (p, s)))
            .collect()
    }

    fn apply(&mut self, mv: &Move) -> Result<(), CompileError> {
        let actor = self.participant_index(&mv.actor);
        match &mv.kind {
            MoveKind::Assert {
                locus,
                expression,
                openings,
            } => {
                let at = match locus {
                    Some(explicit) => explicit.clone(),
                    None => self.assertion_locus(actor, mv),
                };
                if !self.is_open_for(actor, &at) {
                    return Err(self.not_open(mv, &at));
                }
                let text = non_empty(expression, "ASSERT");
                self.place(
                    actor,
                    Polarity::Positive,
                    at.clone(),
                    openings.iter().copied().collect(),
                    text,
                );
                self.anchor(mv, &at);
                self.last_assert = Some(at);
            }
            MoveKind::Challenge {
                child,
                expression,
                basis,
                ..
            } => {
                let parent = self.resolve(mv);
                if !self.opened.contains(&parent) {
                    return Err(self.not_open(mv, &parent));
                }
                let existing = self.slots.get(&(actor, parent.clone())).copied();
                if let Some(slot) = existing {
                    if self.placements[slot].polarity != Polarity::Negative {
                        return Err(self.not_open(mv, &parent));
                    }
                }

                let k = match child {
                    Some(k) => *k,
                    None => self.fresh_child(&parent),
                };
                let text = if expression.trim().is_empty() {
                    basis.label()
                } else {
                    expression.clone()
                };

                match existing {
                    Some(slot) => {
                        let placement = &mut self.placements[slot];
                        placement.ramification.insert(k);
                        placement.expression.push_str(" | ");
                        placement.expression.push_str(&text);
                        self.opened.insert(parent.child(k));
                    }
                    None => {
                        self.place(actor, Polarity::Negative, parent.clone(), [k].into(), text);
                    }
                }

                // Expose the challenged assertion.
                for (other, slot) in self.slots_at(&parent) {
                    if other != actor && self.placements[slot].polarity == Polarity::Positive {
                        self.placements[slot].ramification.insert(k);
                    }
                }
                self.anchor(mv, &parent.child(k));
            }
            MoveKind::Answer {
                expression,
                premises,
                ..
            } => {
                let at = self.resolve(mv);
                if !self.is_open_for(actor, &at) {
                    return Err(self.not_open(mv, &at));
                }
                let text = non_empty(expression, "GROUNDS");
                self.place(
                    actor,
                    Polarity::Positive,
                    at.clone(),
                    premises.iter().copied().collect(),
                    text,
                );
                self.anchor(mv, &at);
            }
            MoveKind::Close { expression, .. } => {
                let at = self.resolve(mv);
                if !self.is_open_for(actor, &at) {
                    return Err(self.not_open(mv, &at));
                }
                let text = non_empty(expression, "END");
                self.place(actor, Polarity::Daimon, at, BTreeSet::new(), text);
            }
        }
        Ok(())
    }

    /// Target anchor if still free, else the root while nobody has played
    /// there, else a fresh child of the root. The fresh child is added to
    /// the actor's own root act only when that act is positive.
    fn assertion_locus(&mut self, actor: usize, mv: &Move) -> Locus {
        if let Some(anchor) = mv.target.as_ref().and_then(|t| self.anchors.get(t)) {
            if self.is_open_for(actor, anchor) {
                return anchor.clone();
            }
        }
        let root = self.options.root.clone();
        if self.slots_at(&root).is_empty() {
            return root;
        }
        let k = self.fresh_child(&root);
        if let Some(&slot) = self.slots.get(&(actor, root.clone())) {
            if self.placements[slot].polarity == Polarity::Positive {
                self.placements[slot].ramification.insert(k);
            }
        }
        let child = root.child(k);
        self.opened.insert(child.clone());
        child
    }

    fn materialise(self) -> Result<Vec<Design>, CompileError> {
        let dialogue = self.options.dialogue_id.clone();
        let mut builders: Vec<DesignBuilder> = self
            .participants
            .iter()
            .map(|p| {
                let builder =
                    DesignBuilder::new(dialogue.clone(), p.clone(), self.options.root.clone());
                match &self.options.scope {
                    Some(scope) => builder.scope(scope.clone()),
                    None => builder,
                }
            })
            .collect();

        for placement in self.placements {
            let draft = ActDraft {
                polarity: placement.polarity,
                locus: placement.locus,
                ramification: placement.ramification,
                expression: placement.expression,
                origin: Default::default(),
            };
            builders[placement.participant]
                .push(draft)
                .map_err(|source| CompileError::Design {
                    dialogue: dialogue.to_string(),
                    participant: self.participants[placement.participant].to_string(),
                    source,
                })?;
        }

        Ok(builders.into_iter().map(DesignBuilder::build).collect())
    }
}

fn non_empty(expression: &str, fallback: &str) -> String {
    if expression.trim().is_empty() {
        fallback.to_string()
    } else {
        expression.to_string()
    }
}
