//! Conflict Policies
//!
//! Named strategies choosing one provider when a lookup has several
//! candidates. Every policy is total: it returns exactly one candidate or a
//! [`Error::Conflict`] listing all candidates.
//!
//! | Policy | Picks |
//! |--------|-------|
//! | `DirectMatch` | the only candidate declaring exactly the query type; fails on 0 or >1 |
//! | `FirstDirectMatch` | the lowest-order direct match; fails on 0 |
//! | `BestMatch` | direct matches first, then lowest order |
//! | `First` | lowest order regardless of exactness |
//! | `None` | never picks; always fails |
//!
//! Ties on order fall back to registration sequence.

use std::fmt;

use serde::{Deserialize, Serialize};
use weave_domain::error::{Error, Result};
use weave_domain::ports::{Candidate, ConflictResolver};
use weave_domain::value_objects::TypeKey;

/// Built-in conflict resolution strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictPolicy {
    /// Exactly one direct match or fail
    DirectMatch,
    /// First direct match by order
    FirstDirectMatch,
    /// Direct matches first, then by order
    #[default]
    BestMatch,
    /// First by order
    First,
    /// Always fail
    None,
}

impl ConflictPolicy {
    /// Every policy, in declaration order
    pub const ALL: [ConflictPolicy; 5] = [
        Self::DirectMatch,
        Self::FirstDirectMatch,
        Self::BestMatch,
        Self::First,
        Self::None,
    ];

    /// Policy name as reported in diagnostics
    pub fn as_str(self) -> &'static str {
        match self {
            Self::DirectMatch => "DirectMatch",
            Self::FirstDirectMatch => "FirstDirectMatch",
            Self::BestMatch => "BestMatch",
            Self::First => "First",
            Self::None => "None",
        }
    }

    fn fail(self, query: &TypeKey, matched: usize, candidates: &[Candidate]) -> Error {
        Error::conflict(
            query.clone(),
            self.as_str(),
            matched,
            candidates.iter().map(Candidate::describe).collect(),
        )
    }
}

fn by_order(candidate: &&Candidate) -> (i32, usize) {
    (candidate.order(), candidate.sequence)
}

impl ConflictResolver for ConflictPolicy {
    fn name(&self) -> &str {
        self.as_str()
    }

    fn select(&self, query: &TypeKey, candidates: &[Candidate]) -> Result<Candidate> {
        let policy = *self;
        let direct: Vec<&Candidate> = candidates
            .iter()
            .filter(|candidate| candidate.is_direct_match(query))
            .collect();

        let chosen = match policy {
            Self::DirectMatch => match direct.as_slice() {
                [only] => Some(*only),
                _ => return Err(policy.fail(query, direct.len(), candidates)),
            },
            Self::FirstDirectMatch => direct.iter().copied().min_by_key(by_order),
            Self::BestMatch => candidates.iter().min_by_key(|candidate| {
                (
                    !candidate.is_direct_match(query),
                    candidate.order(),
                    candidate.sequence,
                )
            }),
            Self::First => candidates.iter().min_by_key(by_order),
            Self::None => None,
        };

        chosen.cloned().ok_or_else(|| {
            let matched = match policy {
                Self::FirstDirectMatch => direct.len(),
                _ => 0,
            };
            policy.fail(query, matched, candidates)
        })
    }
}

impl fmt::Display for ConflictPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
