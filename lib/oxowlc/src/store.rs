//! In-memory fact store.
//!
//! Terms are interned into dense [`TermId`]s so that the materializer joins
//! on integers. Facts keep their insertion order, which makes every pass over
//! the store reproducible from one run to the next.
//!
//! ```
//! use oxowlc::FactStore;
//! use oxrdf::NamedNode;
//!
//! let mut store = FactStore::new();
//! let ex = NamedNode::new("http://example.com/a")?;
//! assert!(store.insert_terms(ex.clone(), ex.clone(), ex.clone()));
//! assert!(!store.insert_terms(ex.clone(), ex.clone(), ex));
//! assert_eq!(store.len(), 1);
//! # Result::<_, Box<dyn std::error::Error>>::Ok(())
//! ```

use oxrdf::{NamedNodeRef, Term};
use rustc_hash::{FxHashMap, FxHashSet};
use std::fmt;

/// Identifier of an interned term, only meaningful for the [`FactStore`] that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TermId(usize);

/// A (subject, predicate, object) triple of interned terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fact {
    pub subject: TermId,
    pub predicate: TermId,
    pub object: TermId,
}

impl Fact {
    #[inline]
    pub fn new(subject: TermId, predicate: TermId, object: TermId) -> Self {
        Self {
            subject,
            predicate,
            object,
        }
    }
}

/// A deduplicated set of facts.
///
/// The store does not check RDF positional constraints: a rule is free to
/// produce a fact with a literal subject, it is stored like any other.
#[derive(Debug, Default, Clone)]
pub struct FactStore {
    terms: Vec<Term>,
    term_ids: FxHashMap<Term, TermId>,
    facts: Vec<Fact>,
    fact_set: FxHashSet<Fact>,
    by_predicate: FxHashMap<TermId, Vec<(TermId, TermId)>>,
}

impl FactStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the identifier of `term`, interning it if it is new.
    pub fn intern(&mut self, term: impl Into<Term>) -> TermId {
        let term = term.into();
        if let Some(id) = self.term_ids.get(&term) {
            return *id;
        }
        let id = TermId(self.terms.len());
        self.terms.push(term.clone());
        self.term_ids.insert(term, id);
        id
    }

    /// Returns the identifier of `term` if it has already been interned.
    pub fn lookup(&self, term: &Term) -> Option<TermId> {
        self.term_ids.get(term).copied()
    }

    /// Returns the identifier of an IRI if it has already been interned.
    pub fn lookup_named_node(&self, node: NamedNodeRef<'_>) -> Option<TermId> {
        self.lookup(&Term::NamedNode(node.into_owned()))
    }

    /// Returns the term behind an identifier.
    ///
    /// Identifiers come from this store, so the lookup cannot miss.
    #[inline]
    pub fn term(&self, id: TermId) -> &Term {
        &self.terms[id.0]
    }

    /// Returns the IRI behind an identifier, if it is a named node.
    pub fn iri(&self, id: TermId) -> Option<&str> {
        match self.term(id) {
            Term::NamedNode(node) => Some(node.as_str()),
            _ => None,
        }
    }

    pub fn is_blank_node(&self, id: TermId) -> bool {
        matches!(self.term(id), Term::BlankNode(_))
    }

    pub fn is_literal(&self, id: TermId) -> bool {
        matches!(self.term(id), Term::Literal(_))
    }

    /// Adds a fact, returns `true` if it was not already present.
    pub fn insert(&mut self, fact: Fact) -> bool {
        if !self.fact_set.insert(fact) {
            return false;
        }
        self.facts.push(fact);
        self.by_predicate
            .entry(fact.predicate)
            .or_default()
            .push((fact.subject, fact.object));
        true
    }

    /// Interns the three terms and adds the resulting fact.
    pub fn insert_terms(
        &mut self,
        subject: impl Into<Term>,
        predicate: impl Into<Term>,
        object: impl Into<Term>,
    ) -> bool {
        let fact = Fact::new(
            self.intern(subject),
            self.intern(predicate),
            self.intern(object),
        );
        self.insert(fact)
    }

    pub fn contains(&self, fact: Fact) -> bool {
        self.fact_set.contains(&fact)
    }

    /// Checks for a fact without interning anything.
    pub fn contains_terms(&self, subject: &Term, predicate: &Term, object: &Term) -> bool {
        match (
            self.lookup(subject),
            self.lookup(predicate),
            self.lookup(object),
        ) {
            (Some(s), Some(p), Some(o)) => self.contains(Fact::new(s, p, o)),
            _ => false,
        }
    }

    /// Number of facts.
    pub fn len(&self) -> usize {
        self.facts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }

    /// Iterates over all facts in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = Fact> + '_ {
        self.facts.iter().copied()
    }

    /// Returns the (subject, object) pairs of every fact using `predicate`, in insertion order.
    pub fn pairs_for_predicate(&self, predicate: TermId) -> &[(TermId, TermId)] {
        self.by_predicate
            .get(&predicate)
            .map_or(&[], Vec::as_slice)
    }

    /// Iterates over the subjects `s` of every `(s, predicate, object)` fact.
    pub fn subjects_for_predicate_object(
        &self,
        predicate: TermId,
        object: TermId,
    ) -> impl Iterator<Item = TermId> + '_ {
        self.pairs_for_predicate(predicate)
            .iter()
            .filter(move |(_, o)| *o == object)
            .map(|(s, _)| *s)
    }

    /// Iterates over the distinct predicates, in order of first use.
    pub fn predicates(&self) -> impl Iterator<Item = TermId> + '_ {
        let mut seen = FxHashSet::default();
        self.facts
            .iter()
            .map(|fact| fact.predicate)
            .filter(move |p| seen.insert(*p))
    }

    /// Formats a fact with the full terms, mostly for logs and test failures.
    pub fn display(&self, fact: Fact) -> impl fmt::Display + '_ {
        DisplayFact { store: self, fact }
    }
}

struct DisplayFact<'a> {
    store: &'a FactStore,
    fact: Fact,
}

impl fmt::Display for DisplayFact<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} .",
            self.store.term(self.fact.subject),
            self.store.term(self.fact.predicate),
            self.store.term(self.fact.object)
        )
    }
}
