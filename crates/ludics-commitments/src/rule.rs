//! Rule grammar.
//!
//! ```text
//! rule        := antecedents arrow literal
//!              | "if" antecedents "then" literal
//! arrow       := "->" | "=>"
//! antecedents := literal (("&" | "," | "and") literal)*
//! literal     := ("not" | "¬" | "!")? atom
//! ```
//!
//! Atoms may be quoted. Whitespace is normalised and keywords are
//! case-insensitive. A negated literal always renders as `not X`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleError {
    #[error("empty rule")]
    Empty,

    #[error("rule {text:?} has no `->`, `=>` or `if .. then`")]
    MissingArrow { text: String },

    #[error("rule {text:?} has no antecedents")]
    EmptyAntecedent { text: String },

    #[error("rule {text:?} has no consequent")]
    EmptyConsequent { text: String },

    /// A literal is empty or contains rule syntax.
    #[error("{literal:?} is not a valid literal")]
    InvalidLiteral { literal: String },
}

/// A possibly negated atom.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Literal {
    pub atom: String,
    pub negated: bool,
}

impl Literal {
    pub fn positive(atom: impl Into<String>) -> Self {
        Self {
            atom: atom.into(),
            negated: false,
        }
    }

    pub fn negative(atom: impl Into<String>) -> Self {
        Self {
            atom: atom.into(),
            negated: true,
        }
    }

    #[must_use]
    pub fn negate(&self) -> Self {
        Self {
            atom: self.atom.clone(),
            negated: !self.negated,
        }
    }

    pub fn parse(text: &str) -> Result<Self, RuleError> {
        let invalid = || RuleError::InvalidLiteral {
            literal: text.to_string(),
        };

        let mut rest = normalize(text);
        let mut negated = false;
        loop {
            let trimmed = strip_quotes(&rest).to_string();
            if let Some(inner) = trimmed
                .strip_prefix('¬')
                .or_else(|| trimmed.strip_prefix('!'))
            {
                negated = !negated;
                rest = inner.trim().to_string();
            } else if trimmed
                .get(..4)
                .is_some_and(|head| head.eq_ignore_ascii_case("not "))
            {
                negated = !negated;
                rest = trimmed[4..].trim().to_string();
            } else {
                rest = trimmed;
                break;
            }
        }

        let forbidden = ["->", "=>", "&", ","];
        if rest.is_empty()
            || rest.eq_ignore_ascii_case("not")
            || forbidden.iter().any(|f| rest.contains(f))
        {
            return Err(invalid());
        }
        Ok(Self {
            atom: rest,
            negated,
        })
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negated {
            write!(f, "not {}", self.atom)
        } else {
            f.write_str(&self.atom)
        }
    }
}

impl FromStr for Literal {
    type Err = RuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// A Horn-style rule: all antecedents together entail the consequent.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rule {
    pub antecedents: Vec<Literal>,
    pub consequent: Literal,
}

impl Rule {
    pub fn parse(text: &str) -> Result<Self, RuleError> {
        let text = normalize(text);
        if text.is_empty() {
            return Err(RuleError::Empty);
        }

        let (lhs, rhs) = split_rule(&text).ok_or_else(|| RuleError::MissingArrow {
            text: text.clone(),
        })?;
        if lhs.trim().is_empty() {
            return Err(RuleError::EmptyAntecedent { text: text.clone() });
        }
        if rhs.trim().is_empty() {
            return Err(RuleError::EmptyConsequent { text: text.clone() });
        }

        let antecedents = split_antecedents(lhs)
            .iter()
            .map(|part| Literal::parse(part))
            .collect::<Result<Vec<_>, _>>()?;
        if antecedents.is_empty() {
            return Err(RuleError::EmptyAntecedent { text });
        }
        let consequent = Literal::parse(rhs)?;
        Ok(Self {
            antecedents,
            consequent,
        })
    }

    /// True when `holds` accepts every antecedent.
    pub fn fires(&self, holds: impl Fn(&Literal) -> bool) -> bool {
        self.antecedents.iter().all(holds)
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, literal) in self.antecedents.iter().enumerate() {
            if i > 0 {
                f.write_str(" & ")?;
            }
            write!(f, "{}", literal)?;
        }
        write!(f, " -> {}", self.consequent)
    }
}

impl FromStr for Rule {
    type Err = RuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Collapse runs of whitespace to single spaces and trim.
pub(crate) fn normalize(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn strip_quotes(text: &str) -> &str {
    text.trim()
        .trim_matches(|c| matches!(c, '"' | '\'' | '“' | '”'))
        .trim()
}

fn split_rule(text: &str) -> Option<(&str, &str)> {
    // `to_ascii_lowercase` keeps byte offsets valid for slicing `text`.
    let lower = text.to_ascii_lowercase();
    if lower.starts_with("if ") {
        if let Some(then) = lower.find(" then ") {
            return Some((&text[3..then], &text[then + 6..]));
        }
    }
    let arrow = [lower.find("->"), lower.find("=>")]
        .into_iter()
        .flatten()
        .min()?;
    Some((&text[..arrow], &text[arrow + 2..]))
}

fn split_antecedents(lhs: &str) -> Vec<String> {
    let mut parts = Vec::new();
    for chunk in lhs.split(['&', ',']) {
        let mut current: Vec<&str> = Vec::new();
        for word in chunk.split_whitespace() {
            if word.eq_ignore_ascii_case("and") {
                parts.push(current.join(" "));
                current.clear();
            } else {
                current.push(word);
            }
        }
        parts.push(current.join(" "));
    }
    parts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn atoms(rule: &Rule) -> Vec<String> {
        rule.antecedents.iter().map(|l| l.to_string()).collect()
    }

    #[test]
    fn accepts_every_arrow_form() {
        for text in [
            "A & B -> C",
            "A, B => C",
            "A and B -> C",
            "if A and B then C",
            "A&B->C",
            "IF A AND B THEN C",
        ] {
            let rule = Rule::parse(text).unwrap();
            assert_eq!(atoms(&rule), vec!["A", "B"], "{}", text);
            assert_eq!(rule.consequent, Literal::positive("C"), "{}", text);
        }
    }

    #[test]
    fn quoted_atoms_are_unwrapped() {
        let rule = Rule::parse(r#"if "contract" and "delivered" then "owes_payment""#).unwrap();
        assert_eq!(atoms(&rule), vec!["contract", "delivered"]);
        assert_eq!(rule.consequent.to_string(), "owes_payment");
    }

    #[test]
    fn negation_forms_are_canonical() {
        for text in ["not B", "¬B", "!B", "NOT   B", "not \"B\"", "¬ B"] {
            assert_eq!(Literal::parse(text).unwrap().to_string(), "not B", "{}", text);
        }
        assert_eq!(Literal::parse("not not B").unwrap(), Literal::positive("B"));

        let rule = Rule::parse("A & ¬B -> not C").unwrap();
        assert_eq!(rule.to_string(), "A & not B -> not C");
    }

    #[test]
    fn multi_word_atoms_survive() {
        let rule = Rule::parse("  traffic   is high ->  road closed ").unwrap();
        assert_eq!(atoms(&rule), vec!["traffic is high"]);
        assert_eq!(rule.consequent.atom, "road closed");
    }

    #[test]
    fn malformed_rules_are_rejected() {
        assert_eq!(Rule::parse("   "), Err(RuleError::Empty));
        assert!(matches!(Rule::parse("A B C"), Err(RuleError::MissingArrow { .. })));
        assert!(matches!(Rule::parse("-> C"), Err(RuleError::EmptyAntecedent { .. })));
        assert!(matches!(Rule::parse("A ->"), Err(RuleError::EmptyConsequent { .. })));
        assert!(matches!(Rule::parse("A & & B -> C"), Err(RuleError::InvalidLiteral { .. })));
        assert!(matches!(Rule::parse("A -> B -> C"), Err(RuleError::InvalidLiteral { .. })));
        assert!(matches!(Rule::parse("A -> B & C"), Err(RuleError::InvalidLiteral { .. })));
        assert!(matches!(Literal::parse("not"), Err(RuleError::InvalidLiteral { .. })));
    }
}
