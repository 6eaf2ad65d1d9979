//! Ludics Locus Addressing
//!
//! Hierarchical path identifiers for positions in a dialogue tree.
//!
//! # Addresses
//!
//! A locus is a dot-path of non-negative integers: `"0"`, `"0.1"`, `"0.1.2"`.
//! Every locus other than a root has a parent obtained by dropping its last
//! segment. Loci are scoped to one dialogue and never mutated; moving a
//! subtree produces new loci via [`Locus::rebase`].
//!
//! # Ordering
//!
//! Loci compare lexicographically on their integer segments, with a shorter
//! locus sorting before any locus it prefixes. This is the order the
//! interaction stepper uses to break ties between shared children, so it
//! must never fall back to string comparison.

mod locus;

use std::cmp::Ordering;

use thiserror::Error;

pub use locus::{Locus, ROOT_SEGMENT};

/// Errors from locus construction and navigation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocusError {
    /// The input is not a dot-path of non-negative integers.
    #[error("malformed locus {input:?}: {reason}")]
    Malformed { input: String, reason: &'static str },

    /// `parent` was asked of a root locus.
    #[error("locus {locus} is a root and has no parent")]
    NoParent { locus: String },

    /// The second locus is not a direct child of the first.
    #[error("locus {child} is not a direct child of {parent}")]
    NotAChild { parent: String, child: String },

    /// A rebase was attempted on a locus outside the old base.
    #[error("locus {locus} does not lie under base {base}")]
    NotUnderBase { locus: String, base: String },
}

/// Parent of `locus`; fails with [`LocusError::NoParent`] on a root.
pub fn parent_of(locus: &Locus) -> Result<Locus, LocusError> {
    locus.parent()
}

/// Index of `child` under `parent`.
pub fn child_suffix(parent: &Locus, child: &Locus) -> Result<u32, LocusError> {
    parent.child_suffix(child)
}

/// True when `a` is a proper ancestor of `b`.
pub fn is_ancestor(a: &Locus, b: &Locus) -> bool {
    a.is_ancestor_of(b)
}

/// Lexicographic order on decoded segments, shorter-is-smaller on a shared prefix.
pub fn compare(a: &Locus, b: &Locus) -> Ordering {
    a.cmp(b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn free_functions_agree_with_methods() {
        let root = Locus::root();
        let child = root.child(3);

        assert_eq!(parent_of(&child).unwrap(), root);
        assert_eq!(child_suffix(&root, &child).unwrap(), 3);
        assert!(is_ancestor(&root, &child));
        assert!(!is_ancestor(&child, &root));
        assert_eq!(compare(&root, &child), Ordering::Less);
    }

    #[test]
    fn root_has_no_parent() {
        let err = parent_of(&Locus::root()).unwrap_err();
        assert_eq!(err, LocusError::NoParent { locus: "0".into() });
        assert_eq!(err.to_string(), "locus 0 is a root and has no parent");
    }
}
