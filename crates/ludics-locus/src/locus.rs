//! Loci: dot-separated addresses in a dialogue tree.
//!
//! A locus is a non-empty sequence of non-negative integers written as
//! `"0"`, `"0.1"`, `"0.1.3"`. Every locus other than a root has a parent
//! obtained by dropping its last segment.
//!
//! Ordering is lexicographic on the decoded integer sequence, so `"0.2"`
//! sorts before `"0.10"` (string order would disagree), and a shorter locus
//! sorts before any longer locus it prefixes.

use std::fmt;
use std::str::FromStr;

use crate::LocusError;

/// Segment of the canonical root locus `"0"`.
pub const ROOT_SEGMENT: u32 = 0;

/// A position in a dialogue tree.
///
/// Immutable once created. The derived `Ord` on the segment vector is
/// exactly the lexicographic, shorter-is-smaller order loci require.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Locus(Vec<u32>);

impl Locus {
    /// The canonical root locus `"0"`.
    pub fn root() -> Self {
        Self(vec![ROOT_SEGMENT])
    }

    /// Build a locus from raw segments.
    pub fn from_segments(segments: Vec<u32>) -> Result<Self, LocusError> {
        if segments.is_empty() {
            return Err(LocusError::Malformed {
                input: String::new(),
                reason: "a locus needs at least one segment",
            });
        }
        Ok(Self(segments))
    }

    /// Parse a dot-separated path such as `"0.1.2"`.
    pub fn parse(input: &str) -> Result<Self, LocusError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(LocusError::Malformed {
                input: input.to_string(),
                reason: "empty path",
            });
        }

        let mut segments = Vec::new();
        for part in trimmed.split('.') {
            if part.is_empty() {
                return Err(LocusError::Malformed {
                    input: input.to_string(),
                    reason: "empty segment",
                });
            }
            if !part.bytes().all(|b| b.is_ascii_digit()) {
                return Err(LocusError::Malformed {
                    input: input.to_string(),
                    reason: "segments must be non-negative integers",
                });
            }
            let value = part.parse::<u32>().map_err(|_| LocusError::Malformed {
                input: input.to_string(),
                reason: "segment out of range",
            })?;
            segments.push(value);
        }
        Ok(Self(segments))
    }

    /// The decoded integer segments.
    pub fn segments(&self) -> &[u32] {
        &self.0
    }

    /// Number of segments (`"0"` has depth 1).
    pub fn depth(&self) -> usize {
        self.0.len()
    }

    /// True for single-segment loci, which have no parent.
    pub fn is_root(&self) -> bool {
        self.0.len() == 1
    }

    /// The final segment, i.e. this locus's index under its parent.
    pub fn last_segment(&self) -> u32 {
        // Non-empty by construction.
        self.0[self.0.len() - 1]
    }

    /// Drop the last segment.
    pub fn parent(&self) -> Result<Self, LocusError> {
        if self.is_root() {
            return Err(LocusError::NoParent {
                locus: self.to_string(),
            });
        }
        Ok(Self(self.0[..self.0.len() - 1].to_vec()))
    }

    /// The child at index `i`.
    pub fn child(&self, i: u32) -> Self {
        let mut segments = Vec::with_capacity(self.0.len() + 1);
        segments.extend_from_slice(&self.0);
        segments.push(i);
        Self(segments)
    }

    /// Descend through a relative path of child indices.
    pub fn descend(&self, relative: &[u32]) -> Self {
        let mut segments = Vec::with_capacity(self.0.len() + relative.len());
        segments.extend_from_slice(&self.0);
        segments.extend_from_slice(relative);
        Self(segments)
    }

    /// Index of `child` under `self`, if `child` is a direct child.
    pub fn child_suffix(&self, child: &Self) -> Result<u32, LocusError> {
        if child.0.len() == self.0.len() + 1 && child.0.starts_with(&self.0) {
            Ok(child.last_segment())
        } else {
            Err(LocusError::NotAChild {
                parent: self.to_string(),
                child: child.to_string(),
            })
        }
    }

    /// Reflexive prefix test: `"0.1"` prefixes both `"0.1"` and `"0.1.4"`.
    pub fn is_prefix_of(&self, other: &Self) -> bool {
        other.0.starts_with(&self.0)
    }

    /// Strict ancestry: `self` is a proper prefix of `other`.
    pub fn is_ancestor_of(&self, other: &Self) -> bool {
        self.0.len() < other.0.len() && self.is_prefix_of(other)
    }

    /// Distinct loci sharing a parent.
    pub fn is_sibling_of(&self, other: &Self) -> bool {
        self != other
            && self.0.len() == other.0.len()
            && !self.is_root()
            && self.0[..self.0.len() - 1] == other.0[..other.0.len() - 1]
    }

    /// Segments below `base`, or `None` when `self` is not under `base`.
    pub fn strip_prefix(&self, base: &Self) -> Option<&[u32]> {
        self.0.strip_prefix(base.0.as_slice())
    }

    /// Replace the prefix `old_base` with `new_base`, keeping the suffix.
    pub fn rebase(&self, old_base: &Self, new_base: &Self) -> Result<Self, LocusError> {
        let suffix = self.strip_prefix(old_base).ok_or_else(|| LocusError::NotUnderBase {
            locus: self.to_string(),
            base: old_base.to_string(),
        })?;
        Ok(new_base.descend(suffix))
    }

    /// Longest common prefix, if the two loci share one.
    pub fn common_ancestor(&self, other: &Self) -> Option<Self> {
        let shared: Vec<u32> = self
            .0
            .iter()
            .zip(other.0.iter())
            .take_while(|(a, b)| a == b)
            .map(|(a, _)| *a)
            .collect();
        if shared.is_empty() {
            None
        } else {
            Some(Self(shared))
        }
    }
}

impl Default for Locus {
    fn default() -> Self {
        Self::root()
    }
}

impl FromStr for Locus {
    type Err = LocusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Locus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for segment in &self.0 {
            if !first {
                f.write_str(".")?;
            }
            write!(f, "{}", segment)?;
            first = false;
        }
        Ok(())
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Locus {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Locus {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}
