//! Fixed-point materialization.
//!
//! Each iteration applies the four rules of [`Rule::ALL`] in order and the
//! loop stops when an iteration adds nothing or when the iteration cap is hit.
//!
//! Chaining rules (subclass transitivity and property transitivity) join
//! every current edge with the *base* edges of the same predicate, the edges
//! that were not themselves produced by chaining. Paths thus grow by one hop
//! per iteration and the fixed point is the transitive closure of the
//! predicate, the same closure a pairwise scan of all edges would reach.

mod rules;

pub use self::rules::Rule;
use crate::axiom::AxiomSet;
use crate::store::{Fact, FactStore, TermId};
use crate::vocab::rdfs;
use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// Default value of [`MaterializerConfig::max_iterations`].
pub const DEFAULT_MAX_ITERATIONS: usize = 100;

/// Configuration for the materializer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaterializerConfig {
    /// Maximum number of rule passes over the store.
    pub max_iterations: usize,
    /// Maximum number of facts to infer (None = unlimited).
    pub max_inferred: Option<usize>,
}

impl Default for MaterializerConfig {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            max_inferred: None,
        }
    }
}

/// Outcome of a materialization run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Materialization {
    /// Number of rule passes executed.
    pub iterations: usize,
    /// Number of facts added to the store.
    pub inferred: usize,
    /// `false` if a cap stopped the run before a fixed point was observed.
    ///
    /// A fixed point is only observed by a pass that infers nothing, so with
    /// `max_iterations = 0` this is always `false`, even on a store that is
    /// already closed.
    pub complete: bool,
    /// New facts per rule. Rules that inferred nothing are absent.
    pub inferred_by_rule: BTreeMap<Rule, usize>,
}

impl Materialization {
    pub fn inferred_by(&self, rule: Rule) -> usize {
        self.inferred_by_rule.get(&rule).copied().unwrap_or(0)
    }
}

/// Applies the rules of an [`AxiomSet`] to a [`FactStore`] until closure.
#[derive(Debug, Clone)]
pub struct Materializer<'a> {
    axioms: &'a AxiomSet,
    config: MaterializerConfig,
}

impl<'a> Materializer<'a> {
    pub fn new(axioms: &'a AxiomSet, config: MaterializerConfig) -> Self {
        Self { axioms, config }
    }

    /// Runs the fixed-point loop, adding inferred facts to `store`.
    ///
    /// Hitting a cap is not an error: the facts inferred so far stay in the
    /// store and [`Materialization::complete`] is `false`.
    pub fn run(&self, store: &mut FactStore) -> Materialization {
        let sub_class_of = store.intern(rdfs::SUB_CLASS_OF.into_owned());
        let mut run = Run {
            store,
            chained: FxHashSet::default(),
            inferred: 0,
            by_rule: BTreeMap::new(),
            max_inferred: self.config.max_inferred,
        };

        let mut iteration = 0;
        let mut changed = true;
        while changed && iteration < self.config.max_iterations && !run.saturated() {
            iteration += 1;
            let before = run.inferred;

            run.chain(sub_class_of, Rule::SubclassTransitivity);
            for p in self.axioms.transitive_properties() {
                run.chain(p, Rule::PropertyTransitivity);
            }
            for p in self.axioms.symmetric_properties() {
                run.mirror(p, p, Rule::PropertySymmetry);
            }
            for (p, q) in self.axioms.inverse_pairs() {
                run.mirror(p, q, Rule::PropertyInverse);
            }

            let added = run.inferred - before;
            changed = added > 0;
            debug!(iteration, added, total = run.store.len(), "materialization pass");
        }

        let complete = !changed;
        if !complete {
            warn!(
                iterations = iteration,
                max_iterations = self.config.max_iterations,
                inferred = run.inferred,
                saturated = run.saturated(),
                "materialization stopped before reaching a fixed point, closure may be incomplete"
            );
        }
        info!(
            iterations = iteration,
            inferred = run.inferred,
            facts = run.store.len(),
            complete,
            "materialization finished"
        );
        Materialization {
            iterations: iteration,
            inferred: run.inferred,
            complete,
            inferred_by_rule: run.by_rule,
        }
    }
}

/// Mutable state of one materialization run.
struct Run<'s> {
    store: &'s mut FactStore,
    /// Facts produced by a chaining rule, excluded from the base edges.
    chained: FxHashSet<Fact>,
    inferred: usize,
    by_rule: BTreeMap<Rule, usize>,
    max_inferred: Option<usize>,
}

impl Run<'_> {
    fn saturated(&self) -> bool {
        self.max_inferred
            .is_some_and(|limit| self.inferred >= limit)
    }

    fn derive(&mut self, fact: Fact, rule: Rule) -> bool {
        if !self.store.insert(fact) {
            return false;
        }
        self.inferred += 1;
        *self.by_rule.entry(rule).or_default() += 1;
        true
    }

    /// `(a p b) (b p c) => (a p c)` where `(b p c)` is a base edge.
    fn chain(&mut self, predicate: TermId, rule: Rule) {
        let edges = self.store.pairs_for_predicate(predicate).to_vec();
        let mut base: FxHashMap<TermId, Vec<TermId>> = FxHashMap::default();
        for &(b, c) in &edges {
            if !self.chained.contains(&Fact::new(b, predicate, c)) {
                base.entry(b).or_default().push(c);
            }
        }
        for (a, b) in edges {
            let Some(successors) = base.get(&b) else {
                continue;
            };
            for &c in successors {
                if self.saturated() {
                    return;
                }
                let fact = Fact::new(a, predicate, c);
                if self.derive(fact, rule) {
                    self.chained.insert(fact);
                }
            }
        }
    }

    /// `(a from b) => (b to a)`
    fn mirror(&mut self, from: TermId, to: TermId, rule: Rule) {
        let edges = self.store.pairs_for_predicate(from).to_vec();
        for (a, b) in edges {
            if self.saturated() {
                return;
            }
            self.derive(Fact::new(b, to, a), rule);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vocab::{owl, rdf};
    use oxrdf::{Literal, NamedNode, Term};

    fn ex(name: &str) -> NamedNode {
        NamedNode::new_unchecked(format!("http://example.com/{name}"))
    }

    fn has(store: &FactStore, s: &str, p: impl Into<Term>, o: &str) -> bool {
        store.contains_terms(&ex(s).into(), &p.into(), &ex(o).into())
    }

    fn materialize(store: &mut FactStore, config: MaterializerConfig) -> Materialization {
        let axioms = AxiomSet::extract(store);
        Materializer::new(&axioms, config).run(store)
    }

    fn subclass_chain(store: &mut FactStore, depth: usize) {
        for i in 0..depth {
            store.insert_terms(
                ex(&format!("C{i}")),
                rdfs::SUB_CLASS_OF.into_owned(),
                ex(&format!("C{}", i + 1)),
            );
        }
    }

    #[test]
    fn subclass_transitivity() {
        let mut store = FactStore::new();
        store.insert_terms(ex("A"), rdfs::SUB_CLASS_OF.into_owned(), ex("B"));
        store.insert_terms(ex("B"), rdfs::SUB_CLASS_OF.into_owned(), ex("C"));
        let result = materialize(&mut store, MaterializerConfig::default());
        assert!(has(&store, "A", rdfs::SUB_CLASS_OF.into_owned(), "C"));
        assert_eq!(result.inferred, 1);
        assert_eq!(result.inferred_by(Rule::SubclassTransitivity), 1);
        assert_eq!(result.iterations, 2);
        assert!(result.complete);
    }

    #[test]
    fn transitive_property() {
        let mut store = FactStore::new();
        store.insert_terms(
            ex("knows"),
            rdf::TYPE.into_owned(),
            owl::TRANSITIVE_PROPERTY.into_owned(),
        );
        store.insert_terms(ex("x"), ex("knows"), ex("y"));
        store.insert_terms(ex("y"), ex("knows"), ex("z"));
        store.insert_terms(ex("z"), ex("knows"), ex("w"));
        let result = materialize(&mut store, MaterializerConfig::default());
        assert!(has(&store, "x", ex("knows"), "z"));
        assert!(has(&store, "y", ex("knows"), "w"));
        assert!(has(&store, "x", ex("knows"), "w"));
        assert_eq!(result.inferred_by(Rule::PropertyTransitivity), 3);
        assert!(result.complete);
    }

    #[test]
    fn undeclared_properties_are_not_chained() {
        let mut store = FactStore::new();
        store.insert_terms(ex("x"), ex("likes"), ex("y"));
        store.insert_terms(ex("y"), ex("likes"), ex("z"));
        let result = materialize(&mut store, MaterializerConfig::default());
        assert!(!has(&store, "x", ex("likes"), "z"));
        assert_eq!(result.inferred, 0);
        assert_eq!(result.iterations, 1);
        assert!(result.complete);
    }

    #[test]
    fn symmetric_property() {
        let mut store = FactStore::new();
        store.insert_terms(
            ex("spouse"),
            rdf::TYPE.into_owned(),
            owl::SYMMETRIC_PROPERTY.into_owned(),
        );
        store.insert_terms(ex("a"), ex("spouse"), ex("b"));
        let result = materialize(&mut store, MaterializerConfig::default());
        assert!(has(&store, "b", ex("spouse"), "a"));
        assert_eq!(result.inferred_by(Rule::PropertySymmetry), 1);
    }

    #[test]
    fn inverse_properties_work_both_ways() {
        let mut store = FactStore::new();
        store.insert_terms(ex("parentOf"), owl::INVERSE_OF.into_owned(), ex("childOf"));
        store.insert_terms(ex("a"), ex("parentOf"), ex("b"));
        store.insert_terms(ex("d"), ex("childOf"), ex("c"));
        let result = materialize(&mut store, MaterializerConfig::default());
        assert!(has(&store, "b", ex("childOf"), "a"));
        assert!(has(&store, "c", ex("parentOf"), "d"));
        assert_eq!(result.inferred_by(Rule::PropertyInverse), 2);
    }

    #[test]
    fn symmetric_and_transitive_together() {
        let mut store = FactStore::new();
        store.insert_terms(
            ex("near"),
            rdf::TYPE.into_owned(),
            owl::SYMMETRIC_PROPERTY.into_owned(),
        );
        store.insert_terms(
            ex("near"),
            rdf::TYPE.into_owned(),
            owl::TRANSITIVE_PROPERTY.into_owned(),
        );
        store.insert_terms(ex("a"), ex("near"), ex("b"));
        store.insert_terms(ex("b"), ex("near"), ex("c"));
        let result = materialize(&mut store, MaterializerConfig::default());
        assert!(result.complete);
        for s in ["a", "b", "c"] {
            for o in ["a", "b", "c"] {
                assert!(has(&store, s, ex("near"), o), "missing {s} near {o}");
            }
        }
    }

    #[test]
    fn literal_objects_are_mirrored_as_is() {
        let mut store = FactStore::new();
        store.insert_terms(
            ex("label"),
            rdf::TYPE.into_owned(),
            owl::SYMMETRIC_PROPERTY.into_owned(),
        );
        store.insert_terms(ex("a"), ex("label"), Literal::new_simple_literal("x"));
        materialize(&mut store, MaterializerConfig::default());
        assert!(store.contains_terms(
            &Literal::new_simple_literal("x").into(),
            &ex("label").into(),
            &ex("a").into()
        ));
    }

    #[test]
    fn second_run_is_a_no_op() {
        let mut store = FactStore::new();
        subclass_chain(&mut store, 10);
        store.insert_terms(
            ex("knows"),
            rdf::TYPE.into_owned(),
            owl::TRANSITIVE_PROPERTY.into_owned(),
        );
        store.insert_terms(ex("x"), ex("knows"), ex("y"));
        store.insert_terms(ex("y"), ex("knows"), ex("z"));
        let first = materialize(&mut store, MaterializerConfig::default());
        assert!(first.complete);
        let len = store.len();
        let second = materialize(&mut store, MaterializerConfig::default());
        assert_eq!(second.inferred, 0);
        assert_eq!(second.iterations, 1);
        assert_eq!(store.len(), len);
    }

    #[test]
    fn chain_closure_is_complete() {
        let mut store = FactStore::new();
        subclass_chain(&mut store, 20);
        let result = materialize(&mut store, MaterializerConfig::default());
        assert!(result.complete);
        // 21 classes, every ordered pair (i < j)
        assert_eq!(store.len(), 21 * 20 / 2);
    }

    #[test]
    fn zero_iterations_never_reports_complete() {
        let mut store = FactStore::new();
        store.insert_terms(ex("A"), rdfs::SUB_CLASS_OF.into_owned(), ex("B"));
        let result = materialize(
            &mut store,
            MaterializerConfig {
                max_iterations: 0,
                max_inferred: None,
            },
        );
        assert_eq!(result.iterations, 0);
        assert_eq!(result.inferred, 0);
        assert!(!result.complete);
    }

    #[test]
    fn iteration_cap_leaves_a_partial_closure() {
        let mut store = FactStore::new();
        subclass_chain(&mut store, 10);
        let result = materialize(
            &mut store,
            MaterializerConfig {
                max_iterations: 2,
                max_inferred: None,
            },
        );
        assert_eq!(result.iterations, 2);
        assert!(!result.complete);
        assert!(has(&store, "C0", rdfs::SUB_CLASS_OF.into_owned(), "C3"));
        assert!(!has(&store, "C0", rdfs::SUB_CLASS_OF.into_owned(), "C10"));
    }

    #[test]
    fn inferred_cap_stops_early() {
        let mut store = FactStore::new();
        subclass_chain(&mut store, 30);
        let result = materialize(
            &mut store,
            MaterializerConfig {
                max_iterations: DEFAULT_MAX_ITERATIONS,
                max_inferred: Some(5),
            },
        );
        assert_eq!(result.inferred, 5);
        assert_eq!(store.len(), 35);
        assert!(!result.complete);
    }
}
