//! Axiom extraction.
//!
//! The four axiom shapes the materializer understands are read once from the
//! asserted facts. The resulting [`AxiomSet`] is immutable: facts inferred
//! later that happen to look like axioms (e.g. a derived
//! `p rdf:type owl:TransitiveProperty`) are not picked up.

use crate::store::{FactStore, TermId};
use crate::vocab::{owl, rdf, rdfs};
use rustc_hash::FxHashSet;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// An axiom used as an inference rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axiom {
    /// `sub rdfs:subClassOf sup`, both sides named.
    Subclass { sub: TermId, sup: TermId },
    /// `p rdf:type owl:TransitiveProperty`
    TransitiveProperty(TermId),
    /// `p rdf:type owl:SymmetricProperty`
    SymmetricProperty(TermId),
    /// `p owl:inverseOf q`
    InverseProperties(TermId, TermId),
}

/// The axiom collections extracted from an ontology.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AxiomSet {
    subclass_rules: Vec<(TermId, TermId)>,
    transitive: BTreeSet<TermId>,
    symmetric: BTreeSet<TermId>,
    /// Both directions of every `owl:inverseOf` declaration.
    inverses: BTreeMap<TermId, BTreeSet<TermId>>,
}

impl AxiomSet {
    /// Scans the store for the four axiom shapes. The store is not modified.
    pub fn extract(store: &FactStore) -> Self {
        let mut axioms = Self::default();

        if let Some(sub_class_of) = store.lookup_named_node(rdfs::SUB_CLASS_OF) {
            let mut seen = FxHashSet::default();
            let mut skipped = 0_usize;
            for &(sub, sup) in store.pairs_for_predicate(sub_class_of) {
                // Class expressions are blank nodes, they are not modeled
                if !is_named(store, sub) || !is_named(store, sup) {
                    skipped += 1;
                    continue;
                }
                if seen.insert((sub, sup)) {
                    axioms.subclass_rules.push((sub, sup));
                }
            }
            if skipped > 0 {
                debug!(skipped, "ignored subclass axioms on anonymous class expressions");
            }
        }

        if let Some(rdf_type) = store.lookup_named_node(rdf::TYPE) {
            if let Some(transitive) = store.lookup_named_node(owl::TRANSITIVE_PROPERTY) {
                axioms.transitive.extend(
                    store
                        .subjects_for_predicate_object(rdf_type, transitive)
                        .filter(|p| is_named(store, *p)),
                );
            }
            if let Some(symmetric) = store.lookup_named_node(owl::SYMMETRIC_PROPERTY) {
                axioms.symmetric.extend(
                    store
                        .subjects_for_predicate_object(rdf_type, symmetric)
                        .filter(|p| is_named(store, *p)),
                );
            }
        }

        if let Some(inverse_of) = store.lookup_named_node(owl::INVERSE_OF) {
            for &(p, q) in store.pairs_for_predicate(inverse_of) {
                if !is_named(store, p) || !is_named(store, q) {
                    continue;
                }
                axioms.inverses.entry(p).or_default().insert(q);
                axioms.inverses.entry(q).or_default().insert(p);
            }
        }

        debug!(
            subclass = axioms.subclass_rules.len(),
            transitive = axioms.transitive.len(),
            symmetric = axioms.symmetric.len(),
            inverse = axioms.inverses.len(),
            "axioms extracted"
        );
        axioms
    }

    /// `(sub, sup)` pairs of the asserted named subclass axioms, in assertion order.
    pub fn subclass_rules(&self) -> &[(TermId, TermId)] {
        &self.subclass_rules
    }

    pub fn transitive_properties(&self) -> impl Iterator<Item = TermId> + '_ {
        self.transitive.iter().copied()
    }

    pub fn symmetric_properties(&self) -> impl Iterator<Item = TermId> + '_ {
        self.symmetric.iter().copied()
    }

    /// Directed `(p, q)` inverse pairs: `(a p b)` entails `(b q a)`.
    pub fn inverse_pairs(&self) -> impl Iterator<Item = (TermId, TermId)> + '_ {
        self.inverses
            .iter()
            .flat_map(|(p, qs)| qs.iter().map(move |q| (*p, *q)))
    }

    pub fn inverses_of(&self, property: TermId) -> impl Iterator<Item = TermId> + '_ {
        self.inverses.get(&property).into_iter().flatten().copied()
    }

    pub fn is_transitive(&self, property: TermId) -> bool {
        self.transitive.contains(&property)
    }

    pub fn is_symmetric(&self, property: TermId) -> bool {
        self.symmetric.contains(&property)
    }

    /// Properties carrying at least one characteristic, sorted by term identifier.
    pub fn characterized_properties(&self) -> BTreeSet<TermId> {
        self.transitive
            .iter()
            .chain(&self.symmetric)
            .chain(self.inverses.keys())
            .copied()
            .collect()
    }

    /// Lists every axiom, inverse declarations once per direction.
    pub fn iter(&self) -> impl Iterator<Item = Axiom> + '_ {
        self.subclass_rules
            .iter()
            .map(|&(sub, sup)| Axiom::Subclass { sub, sup })
            .chain(self.transitive.iter().map(|p| Axiom::TransitiveProperty(*p)))
            .chain(self.symmetric.iter().map(|p| Axiom::SymmetricProperty(*p)))
            .chain(
                self.inverse_pairs()
                    .map(|(p, q)| Axiom::InverseProperties(p, q)),
            )
    }

    pub fn len(&self) -> usize {
        self.subclass_rules.len()
            + self.transitive.len()
            + self.symmetric.len()
            + self.inverses.values().map(BTreeSet::len).sum::<usize>()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn is_named(store: &FactStore, id: TermId) -> bool {
    store.iri(id).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxrdf::{BlankNode, Literal, NamedNode, NamedNodeRef};

    fn ex(name: &str) -> NamedNode {
        NamedNode::new_unchecked(format!("http://example.com/{name}"))
    }

    fn id(store: &FactStore, node: NamedNodeRef<'_>) -> TermId {
        store.lookup_named_node(node).unwrap()
    }

    #[test]
    fn subclass_rules_skip_anonymous_classes() {
        let mut store = FactStore::new();
        store.insert_terms(ex("A"), rdfs::SUB_CLASS_OF.into_owned(), ex("B"));
        store.insert_terms(ex("A"), rdfs::SUB_CLASS_OF.into_owned(), BlankNode::new_unchecked("r"));
        store.insert_terms(BlankNode::new_unchecked("u"), rdfs::SUB_CLASS_OF.into_owned(), ex("B"));
        store.insert_terms(
            ex("A"),
            rdfs::SUB_CLASS_OF.into_owned(),
            Literal::new_simple_literal("B"),
        );
        let axioms = AxiomSet::extract(&store);
        assert_eq!(
            axioms.subclass_rules(),
            [(id(&store, ex("A").as_ref()), id(&store, ex("B").as_ref()))]
        );
    }

    #[test]
    fn property_characteristics() {
        let mut store = FactStore::new();
        store.insert_terms(
            ex("ancestor"),
            rdf::TYPE.into_owned(),
            owl::TRANSITIVE_PROPERTY.into_owned(),
        );
        store.insert_terms(
            ex("knows"),
            rdf::TYPE.into_owned(),
            owl::SYMMETRIC_PROPERTY.into_owned(),
        );
        store.insert_terms(
            ex("knows"),
            rdf::TYPE.into_owned(),
            owl::TRANSITIVE_PROPERTY.into_owned(),
        );
        store.insert_terms(ex("parent"), owl::INVERSE_OF.into_owned(), ex("child"));
        let axioms = AxiomSet::extract(&store);

        let ancestor = id(&store, ex("ancestor").as_ref());
        let knows = id(&store, ex("knows").as_ref());
        let parent = id(&store, ex("parent").as_ref());
        let child = id(&store, ex("child").as_ref());

        assert!(axioms.is_transitive(ancestor));
        assert!(axioms.is_transitive(knows));
        assert!(axioms.is_symmetric(knows));
        assert!(!axioms.is_symmetric(ancestor));
        assert_eq!(axioms.inverses_of(parent).collect::<Vec<_>>(), [child]);
        assert_eq!(axioms.inverses_of(child).collect::<Vec<_>>(), [parent]);
        assert_eq!(axioms.inverse_pairs().count(), 2);
        assert_eq!(axioms.len(), 5);
        assert_eq!(axioms.characterized_properties().len(), 4);
    }

    #[test]
    fn extraction_does_not_touch_the_store() {
        let mut store = FactStore::new();
        store.insert_terms(ex("A"), rdfs::SUB_CLASS_OF.into_owned(), ex("B"));
        store.insert_terms(ex("B"), rdfs::SUB_CLASS_OF.into_owned(), ex("C"));
        let before = store.clone();
        let axioms = AxiomSet::extract(&store);
        assert_eq!(axioms.subclass_rules().len(), 2);
        assert_eq!(store.len(), before.len());
        assert!(before.iter().eq(store.iter()));
    }

    #[test]
    fn empty_store_has_no_axioms() {
        let axioms = AxiomSet::extract(&FactStore::new());
        assert!(axioms.is_empty());
        assert_eq!(axioms.iter().count(), 0);
    }
}
