//! Commitment store and forward chainer.

use std::collections::{BTreeMap, BTreeSet};

use ludics_locus::Locus;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::rule::{normalize, Literal, Rule};
use crate::{CommitmentError, Result};

/// Whether an element is a fact or a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BasePolarity {
    /// A fact.
    Pos,
    /// A rule.
    Neg,
}

/// A labelled proposition held by one owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Element {
    pub owner_id: String,
    pub label: String,
    pub base_polarity: BasePolarity,
    pub base_locus: Locus,
    /// Rule text when it differs from the label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expression: Option<String>,
    pub entitled: bool,
    pub derived: bool,
}

/// An element to add.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementDraft {
    pub label: String,
    pub base_polarity: BasePolarity,
    #[serde(default)]
    pub base_locus: Option<Locus>,
    #[serde(default)]
    pub expression: Option<String>,
    #[serde(default)]
    pub entitled: Option<bool>,
}

impl ElementDraft {
    pub fn fact(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            base_polarity: BasePolarity::Pos,
            base_locus: None,
            expression: None,
            entitled: None,
        }
    }

    pub fn rule(label: impl Into<String>) -> Self {
        Self {
            base_polarity: BasePolarity::Neg,
            ..Self::fact(label)
        }
    }

    #[must_use]
    pub fn at(mut self, locus: Locus) -> Self {
        self.base_locus = Some(locus);
        self
    }

    #[must_use]
    pub fn with_expression(mut self, expression: impl Into<String>) -> Self {
        self.expression = Some(expression.into());
        self
    }

    #[must_use]
    pub fn entitled(mut self, entitled: bool) -> Self {
        self.entitled = Some(entitled);
        self
    }
}

/// Additions and removals applied together.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyOps {
    #[serde(default)]
    pub add: Vec<ElementDraft>,
    #[serde(default)]
    pub remove: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyOutcome {
    /// Labels actually added; re-added labels are absent.
    pub added: Vec<String>,
    pub removed: Vec<String>,
}

/// A fact produced by chaining.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DerivedFact {
    pub label: String,
    /// Label of the rule that first produced it.
    pub rule: String,
    pub base_locus: Locus,
}

/// Two facts that cannot both hold.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Contradiction {
    pub a: String,
    pub b: String,
}

/// How chaining ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum Fixpoint {
    /// No rule produced a new fact on the last pass.
    Reached { iterations: usize },
    /// Passes ran out while rules were still firing.
    CapExceeded { cap: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainOutcome {
    pub owner_id: String,
    /// Every derived fact, in derivation order.
    pub derived_facts: Vec<DerivedFact>,
    /// Labels not derived by the previous run.
    pub new_facts: Vec<String>,
    pub contradictions: Vec<Contradiction>,
    pub fixpoint: Fixpoint,
}

/// Facts and rules of one owner.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitmentListing {
    pub facts: Vec<Element>,
    pub rules: Vec<Element>,
}

/// A positive act suggested by a derived fact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateAct {
    pub locus: Locus,
    pub expression: String,
}

#[derive(Debug, Clone, Default)]
struct Owner {
    /// Asserted elements in insertion order.
    elements: Vec<Element>,
    rules: BTreeMap<String, Rule>,
    derived: Vec<DerivedFact>,
}

impl Owner {
    /// Find an element by label, accepting any spelling of a fact literal.
    fn position(&self, label: &str) -> Option<usize> {
        let plain = normalize(label);
        let literal = Literal::parse(label).ok().map(|l| l.to_string());
        self.elements
            .iter()
            .position(|e| e.label == plain || literal.as_deref() == Some(e.label.as_str()))
    }
}

/// Per-owner commitment sets plus the shared contradiction table.
#[derive(Debug, Clone, Default)]
pub struct CommitmentStore {
    owners: BTreeMap<String, Owner>,
    exclusions: BTreeSet<(String, String)>,
}

impl CommitmentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply `ops` to `owner`'s set. Everything is validated before
    /// anything changes, so a failed apply leaves the store untouched.
    pub fn apply_to_cs(&mut self, owner: &str, ops: ApplyOps) -> Result<ApplyOutcome> {
        if owner.trim().is_empty() {
            return Err(CommitmentError::EmptyOwner);
        }

        let mut staged: Vec<(Element, Option<Rule>)> = Vec::new();
        for draft in ops.add {
            staged.push(prepare(owner, draft)?);
        }

        let state = self.owners.entry(owner.to_string()).or_default();
        let mut outcome = ApplyOutcome::default();

        for label in ops.remove {
            if let Some(i) = state.position(&label) {
                let removed = state.elements.remove(i);
                state.rules.remove(&removed.label);
                outcome.removed.push(removed.label);
            }
        }
        for (element, rule) in staged {
            if state.position(&element.label).is_some() {
                continue;
            }
            if let Some(rule) = rule {
                state.rules.insert(element.label.clone(), rule);
            }
            outcome.added.push(element.label.clone());
            state.elements.push(element);
        }

        debug!(owner, added = outcome.added.len(), removed = outcome.removed.len(), "applied commitments");
        Ok(outcome)
    }

    /// Suspend or reinstate an element. Suspended elements do not chain.
    pub fn set_entitlement(&mut self, owner: &str, label: &str, entitled: bool) -> Result<()> {
        let unknown = || CommitmentError::UnknownLabel {
            owner: owner.to_string(),
            label: label.to_string(),
        };
        let state = self.owners.get_mut(owner).ok_or_else(unknown)?;
        let i = state.position(label).ok_or_else(unknown)?;
        state.elements[i].entitled = entitled;
        debug!(owner, label = %state.elements[i].label, entitled, "entitlement changed");
        Ok(())
    }

    /// Record that `a` and `b` cannot both hold, for every owner.
    pub fn register_contradiction(&mut self, a: &str, b: &str) -> Result<()> {
        let a = Literal::parse(a)
            .map_err(|source| CommitmentError::InvalidLabel {
                label: a.to_string(),
                source,
            })?
            .to_string();
        let b = Literal::parse(b)
            .map_err(|source| CommitmentError::InvalidLabel {
                label: b.to_string(),
                source,
            })?
            .to_string();
        if a == b {
            return Err(CommitmentError::SelfContradiction { label: a });
        }
        self.exclusions.insert(ordered(a, b));
        Ok(())
    }

    /// Forward-chain `owner`'s entitled facts and rules to a fixpoint.
    ///
    /// The derived set is recomputed from the asserted base on every call;
    /// asserted elements are never touched. An unknown owner yields an
    /// empty outcome and is not added to the store.
    pub fn interact_ce(&mut self, owner: &str, iteration_cap: usize) -> ChainOutcome {
        let Some(state) = self.owners.get_mut(owner) else {
            return ChainOutcome {
                owner_id: owner.to_string(),
                derived_facts: Vec::new(),
                new_facts: Vec::new(),
                contradictions: Vec::new(),
                fixpoint: Fixpoint::Reached { iterations: 0 },
            };
        };

        let mut facts: BTreeSet<Literal> = state
            .elements
            .iter()
            .filter(|e| e.entitled && e.base_polarity == BasePolarity::Pos)
            .filter_map(|e| Literal::parse(&e.label).ok())
            .collect();
        let rules: Vec<(&Element, &Rule)> = state
            .elements
            .iter()
            .filter(|e| e.entitled && e.base_polarity == BasePolarity::Neg)
            .filter_map(|e| state.rules.get(&e.label).map(|r| (e, r)))
            .collect();

        let mut derived: Vec<DerivedFact> = Vec::new();
        let mut fixpoint = Fixpoint::CapExceeded { cap: iteration_cap };
        for pass in 1..=iteration_cap {
            let mut fresh: Vec<(Literal, &Element)> = Vec::new();
            for (element, rule) in &rules {
                if rule.fires(|l| facts.contains(l))
                    && !facts.contains(&rule.consequent)
                    && !fresh.iter().any(|(l, _)| *l == rule.consequent)
                {
                    fresh.push((rule.consequent.clone(), *element));
                }
            }
            if fresh.is_empty() {
                fixpoint = Fixpoint::Reached { iterations: pass };
                break;
            }
            for (literal, element) in fresh {
                derived.push(DerivedFact {
                    label: literal.to_string(),
                    rule: element.label.clone(),
                    base_locus: element.base_locus.clone(),
                });
                facts.insert(literal);
            }
        }
        if matches!(fixpoint, Fixpoint::CapExceeded { .. })
            && !rules
                .iter()
                .any(|(_, rule)| rule.fires(|l| facts.contains(l)) && !facts.contains(&rule.consequent))
        {
            // The cap was spent exactly, or was zero with nothing to fire.
            fixpoint = Fixpoint::Reached { iterations: iteration_cap };
        }
        if let Fixpoint::CapExceeded { cap } = fixpoint {
            warn!(owner, cap, derived = derived.len(), "forward chaining hit its iteration cap");
        }

        let contradictions = find_contradictions(&facts, &self.exclusions);

        let previous: BTreeSet<&str> = state.derived.iter().map(|d| d.label.as_str()).collect();
        let new_facts: Vec<String> = derived
            .iter()
            .filter(|d| !previous.contains(d.label.as_str()))
            .map(|d| d.label.clone())
            .collect();
        state.derived = derived.clone();

        debug!(
            owner,
            derived = derived.len(),
            new = new_facts.len(),
            contradictions = contradictions.len(),
            "chained commitments"
        );
        ChainOutcome {
            owner_id: owner.to_string(),
            derived_facts: derived,
            new_facts,
            contradictions,
            fixpoint,
        }
    }

    /// Asserted facts then derived facts, and rules, for `owner`.
    pub fn list_cs(&self, owner: &str) -> CommitmentListing {
        let Some(state) = self.owners.get(owner) else {
            return CommitmentListing::default();
        };
        let (mut facts, rules): (Vec<Element>, Vec<Element>) = state
            .elements
            .iter()
            .cloned()
            .partition(|e| e.base_polarity == BasePolarity::Pos);
        facts.extend(state.derived.iter().map(|d| Element {
            owner_id: owner.to_string(),
            label: d.label.clone(),
            base_polarity: BasePolarity::Pos,
            base_locus: d.base_locus.clone(),
            expression: None,
            entitled: true,
            derived: true,
        }));
        CommitmentListing { facts, rules }
    }

    /// Positive acts suggested by the last chaining run, one per derived
    /// fact, at the firing rule's base locus.
    pub fn candidate_acts(&self, owner: &str) -> Vec<CandidateAct> {
        self.owners
            .get(owner)
            .map(|state| {
                state
                    .derived
                    .iter()
                    .map(|d| CandidateAct {
                        locus: d.base_locus.clone(),
                        expression: d.label.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Validate a draft into an element, parsing its rule if it is one.
fn prepare(owner: &str, draft: ElementDraft) -> Result<(Element, Option<Rule>)> {
    let label = normalize(&draft.label);
    if label.is_empty() {
        return Err(CommitmentError::EmptyLabel {
            owner: owner.to_string(),
        });
    }

    let rule = match draft.base_polarity {
        BasePolarity::Neg => {
            let text = draft.expression.as_deref().unwrap_or(&label);
            let rule = Rule::parse(text).map_err(|source| CommitmentError::RuleValidation {
                owner: owner.to_string(),
                label: label.clone(),
                source,
            })?;
            Some(rule)
        }
        BasePolarity::Pos => None,
    };

    let label = match draft.base_polarity {
        BasePolarity::Pos => Literal::parse(&label)
            .map_err(|source| CommitmentError::InvalidLabel {
                label: label.clone(),
                source,
            })?
            .to_string(),
        BasePolarity::Neg => label,
    };

    Ok((
        Element {
            owner_id: owner.to_string(),
            label,
            base_polarity: draft.base_polarity,
            base_locus: draft.base_locus.unwrap_or_default(),
            expression: draft.expression,
            entitled: draft.entitled.unwrap_or(true),
            derived: false,
        },
        rule,
    ))
}

fn ordered(a: String, b: String) -> (String, String) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

fn find_contradictions(
    facts: &BTreeSet<Literal>,
    exclusions: &BTreeSet<(String, String)>,
) -> Vec<Contradiction> {
    let mut found = BTreeSet::new();
    for fact in facts.iter().filter(|f| !f.negated) {
        if facts.contains(&fact.negate()) {
            found.insert(Contradiction {
                a: fact.to_string(),
                b: fact.negate().to_string(),
            });
        }
    }

    let labels: BTreeSet<String> = facts.iter().map(Literal::to_string).collect();
    for (a, b) in exclusions {
        if labels.contains(a) && labels.contains(b) {
            found.insert(Contradiction {
                a: a.clone(),
                b: b.clone(),
            });
        }
    }
    found.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const CAP: usize = 64;
    const P: &str = "Proponent";

    fn add(store: &mut CommitmentStore, drafts: Vec<ElementDraft>) -> ApplyOutcome {
        store
            .apply_to_cs(
                P,
                ApplyOps {
                    add: drafts,
                    remove: vec![],
                },
            )
            .unwrap()
    }

    fn labels(outcome: &ChainOutcome) -> Vec<String> {
        let mut out: Vec<String> = outcome.derived_facts.iter().map(|d| d.label.clone()).collect();
        out.sort();
        out
    }

    #[test]
    fn quoted_conjunctive_rule_fires() {
        let mut store = CommitmentStore::new();
        add(
            &mut store,
            vec![
                ElementDraft::rule(r#"if "contract" and "delivered" then "owes_payment""#),
                ElementDraft::fact("contract"),
                ElementDraft::fact("delivered"),
            ],
        );

        let outcome = store.interact_ce(P, CAP);
        assert_eq!(labels(&outcome), vec!["owes_payment"]);
        assert!(outcome.contradictions.is_empty());
        assert_eq!(outcome.fixpoint, Fixpoint::Reached { iterations: 2 });
    }

    #[test]
    fn registered_exclusion_is_reported() {
        let mut store = CommitmentStore::new();
        store
            .register_contradiction("owes_payment", "not_owes_payment")
            .unwrap();
        add(
            &mut store,
            vec![
                ElementDraft::rule("contract & delivered -> owes_payment"),
                ElementDraft::fact("contract"),
                ElementDraft::fact("delivered"),
                ElementDraft::fact("not_owes_payment"),
            ],
        );

        let outcome = store.interact_ce(P, CAP);
        assert_eq!(
            outcome.contradictions,
            vec![Contradiction {
                a: "not_owes_payment".into(),
                b: "owes_payment".into(),
            }]
        );
    }

    #[test]
    fn chains_through_several_rules() {
        let mut store = CommitmentStore::new();
        add(
            &mut store,
            vec![
                ElementDraft::fact("A"),
                ElementDraft::rule("A -> B"),
                ElementDraft::rule("B -> C"),
                ElementDraft::rule("C -> D"),
                ElementDraft::rule("D -> E"),
            ],
        );
        let outcome = store.interact_ce(P, CAP);
        assert_eq!(labels(&outcome), vec!["B", "C", "D", "E"]);
        assert_eq!(outcome.fixpoint, Fixpoint::Reached { iterations: 5 });
    }

    #[test]
    fn missing_antecedent_blocks_rule() {
        let mut store = CommitmentStore::new();
        add(
            &mut store,
            vec![ElementDraft::fact("A"), ElementDraft::rule("A & B -> C")],
        );
        assert!(store.interact_ce(P, CAP).derived_facts.is_empty());
    }

    #[test]
    fn negated_literals_match_across_spellings() {
        let mut store = CommitmentStore::new();
        add(
            &mut store,
            vec![
                ElementDraft::fact("A"),
                ElementDraft::fact("¬B"),
                ElementDraft::rule("A & not B -> C"),
                ElementDraft::rule("A -> !D"),
            ],
        );
        assert_eq!(labels(&store.interact_ce(P, CAP)), vec!["C", "not D"]);
    }

    #[test]
    fn literal_negation_is_a_contradiction() {
        let mut store = CommitmentStore::new();
        add(
            &mut store,
            vec![
                ElementDraft::fact("congestion_high"),
                ElementDraft::fact("traffic_good"),
                ElementDraft::rule("congestion_high -> not traffic_good"),
            ],
        );
        let outcome = store.interact_ce(P, CAP);
        assert_eq!(labels(&outcome), vec!["not traffic_good"]);
        assert_eq!(outcome.contradictions.len(), 1);
        assert_eq!(outcome.contradictions[0].a, "traffic_good");
    }

    #[test]
    fn suspended_facts_do_not_chain() {
        let mut store = CommitmentStore::new();
        add(
            &mut store,
            vec![ElementDraft::fact("A"), ElementDraft::rule("A -> B")],
        );
        assert_eq!(store.interact_ce(P, CAP).derived_facts.len(), 1);

        store.set_entitlement(P, "A", false).unwrap();
        assert!(store.interact_ce(P, CAP).derived_facts.is_empty());

        store.set_entitlement(P, "A", true).unwrap();
        assert_eq!(store.interact_ce(P, CAP).new_facts, vec!["B"]);

        assert!(matches!(
            store.set_entitlement(P, "Z", false),
            Err(CommitmentError::UnknownLabel { .. })
        ));
    }

    #[test]
    fn second_run_derives_nothing_new() {
        let mut store = CommitmentStore::new();
        add(
            &mut store,
            vec![
                ElementDraft::fact("A"),
                ElementDraft::rule("A -> B"),
                ElementDraft::rule("B -> A"),
            ],
        );
        let first = store.interact_ce(P, CAP);
        let second = store.interact_ce(P, CAP);

        assert_eq!(labels(&first), vec!["B"]);
        assert_eq!(first.new_facts, vec!["B"]);
        assert_eq!(second.derived_facts, first.derived_facts);
        assert!(second.new_facts.is_empty());
    }

    #[test]
    fn cap_overrun_is_reported() {
        let mut store = CommitmentStore::new();
        add(
            &mut store,
            vec![
                ElementDraft::fact("A"),
                ElementDraft::rule("A -> B"),
                ElementDraft::rule("B -> C"),
                ElementDraft::rule("C -> D"),
            ],
        );
        let outcome = store.interact_ce(P, 2);
        assert_eq!(outcome.fixpoint, Fixpoint::CapExceeded { cap: 2 });
        assert_eq!(labels(&outcome), vec!["B", "C"]);
    }

    #[test]
    fn invalid_rule_leaves_store_untouched() {
        let mut store = CommitmentStore::new();
        add(&mut store, vec![ElementDraft::fact("A")]);

        let err = store
            .apply_to_cs(
                P,
                ApplyOps {
                    add: vec![ElementDraft::fact("B"), ElementDraft::rule("A B C")],
                    remove: vec!["A".into()],
                },
            )
            .unwrap_err();
        assert!(matches!(err, CommitmentError::RuleValidation { ref label, .. } if label == "A B C"));

        let listing = store.list_cs(P);
        assert_eq!(listing.facts.len(), 1);
        assert_eq!(listing.facts[0].label, "A");
    }

    #[test]
    fn re_adding_is_a_no_op_and_labels_normalise() {
        let mut store = CommitmentStore::new();
        let first = add(&mut store, vec![ElementDraft::fact("  congestion_high  ")]);
        let again = add(&mut store, vec![ElementDraft::fact("congestion_high")]);
        assert_eq!(first.added, vec!["congestion_high"]);
        assert!(again.added.is_empty());

        add(&mut store, vec![ElementDraft::rule("congestion_high -> impact")]);
        assert_eq!(store.interact_ce(P, CAP).derived_facts.len(), 1);
    }

    #[test]
    fn removal_drops_element() {
        let mut store = CommitmentStore::new();
        add(&mut store, vec![ElementDraft::fact("A"), ElementDraft::rule("A -> B")]);
        let outcome = store
            .apply_to_cs(
                P,
                ApplyOps {
                    add: vec![],
                    remove: vec!["A -> B".into(), "missing".into()],
                },
            )
            .unwrap();
        assert_eq!(outcome.removed, vec!["A -> B"]);
        assert!(store.list_cs(P).rules.is_empty());
    }

    #[test]
    fn rule_text_may_live_in_expression() {
        let mut store = CommitmentStore::new();
        add(
            &mut store,
            vec![
                ElementDraft::fact("rain"),
                ElementDraft::rule("r1")
                    .with_expression("rain -> wet")
                    .at(Locus::parse("0.2").unwrap()),
            ],
        );
        store.interact_ce(P, CAP);

        assert_eq!(
            store.candidate_acts(P),
            vec![CandidateAct {
                locus: Locus::parse("0.2").unwrap(),
                expression: "wet".into(),
            }]
        );
        let listing = store.list_cs(P);
        assert_eq!(listing.rules[0].label, "r1");
        assert!(listing.facts.iter().any(|f| f.derived && f.label == "wet"));
    }

    #[test]
    fn owners_are_isolated() {
        let mut store = CommitmentStore::new();
        add(&mut store, vec![ElementDraft::fact("A"), ElementDraft::rule("A -> B")]);
        assert!(store.interact_ce("Opponent", CAP).derived_facts.is_empty());
        assert!(store.list_cs("Opponent").facts.is_empty());
    }

    #[test]
    fn self_contradiction_is_rejected() {
        let mut store = CommitmentStore::new();
        assert!(matches!(
            store.register_contradiction("A", " A "),
            Err(CommitmentError::SelfContradiction { .. })
        ));
    }
    #[test]
    fn chaining_an_unknown_owner_leaves_the_store_alone() {
        let mut store = CommitmentStore::new();
        let outcome = store.interact_ce("Stranger", CAP);
        assert_eq!(outcome.owner_id, "Stranger");
        assert!(outcome.derived_facts.is_empty());
        assert_eq!(outcome.fixpoint, Fixpoint::Reached { iterations: 0 });
        assert!(store.owners.is_empty());
    }

    #[test]
    fn zero_cap_with_nothing_to_fire_is_a_fixpoint() {
        let mut store = CommitmentStore::new();
        add(&mut store, vec![ElementDraft::fact("A")]);
        assert_eq!(store.interact_ce(P, 0).fixpoint, Fixpoint::Reached { iterations: 0 });

        add(&mut store, vec![ElementDraft::rule("r1").with_expression("A -> B")]);
        assert_eq!(store.interact_ce(P, 0).fixpoint, Fixpoint::CapExceeded { cap: 0 });
        // One pass derives B and nothing else can fire.
        assert_eq!(store.interact_ce(P, 1).fixpoint, Fixpoint::Reached { iterations: 1 });
    }

    #[test]
    fn outcomes_serialize_in_camel_case() {
        let mut store = CommitmentStore::new();
        let applied = add(
            &mut store,
            vec![
                ElementDraft::fact("A"),
                ElementDraft::rule("r1")
                    .with_expression("A -> B")
                    .at(Locus::parse("0.2").unwrap()),
            ],
        );
        assert_eq!(
            serde_json::to_value(&applied).unwrap(),
            serde_json::json!({ "added": ["A", "r1"], "removed": [] })
        );

        store.register_contradiction("A", "B").unwrap();
        let chained = serde_json::to_value(store.interact_ce(P, CAP)).unwrap();
        assert_eq!(
            chained,
            serde_json::json!({
                "ownerId": P,
                "derivedFacts": [{ "label": "B", "rule": "r1", "baseLocus": "0.2" }],
                "newFacts": ["B"],
                "contradictions": [{ "a": "A", "b": "B" }],
                "fixpoint": { "outcome": "reached", "iterations": 2 },
            })
        );
    }
}
