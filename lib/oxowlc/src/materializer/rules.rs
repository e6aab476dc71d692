//! The entailment rules applied during materialization.

use std::fmt;

/// Rule identifier.
///
/// Names follow the OWL 2 RL/RDF rule table; they show up in logs and in the
/// per-rule counters of [`Materialization`](super::Materialization).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Rule {
    /// `(a subClassOf b) (b subClassOf c) => (a subClassOf c)`
    SubclassTransitivity,
    /// `(a p b) (b p c) => (a p c)` for transitive `p`
    PropertyTransitivity,
    /// `(a p b) => (b p a)` for symmetric `p`
    PropertySymmetry,
    /// `(a p b) => (b q a)` for `p owl:inverseOf q`
    PropertyInverse,
}

impl Rule {
    /// All rules, in the order they are applied inside one iteration.
    pub const ALL: [Self; 4] = [
        Self::SubclassTransitivity,
        Self::PropertyTransitivity,
        Self::PropertySymmetry,
        Self::PropertyInverse,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::SubclassTransitivity => "scm-sco",
            Self::PropertyTransitivity => "prp-trp",
            Self::PropertySymmetry => "prp-symp",
            Self::PropertyInverse => "prp-inv",
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
