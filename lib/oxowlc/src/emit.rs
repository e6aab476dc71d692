//! C header generation.
//!
//! Three headers are produced from a closed store:
//!
//! - [`IDS_HEADER`]: the entity identifier table,
//! - [`RULES_HEADER`]: inline predicates replacing runtime subsumption and
//!   property reasoning, built on the runtime's `ask_pattern` lookup,
//! - [`FACTS_HEADER`]: every closed fact expressible with identifiers.
//!
//! Rendering is a pure function of the closed store: no timestamps, no paths,
//! every list sorted.

use crate::axiom::AxiomSet;
use crate::error::{CompileError, Result};
use crate::ids::{
    local_name, EntityId, EntityIds, CLASS_ID_BASE, INSTANCE_ID_BASE, PROPERTY_ID_BASE,
};
use crate::store::FactStore;
use crate::vocab::{rdf, rdfs};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// File name of the identifier table.
pub const IDS_HEADER: &str = "ontology_ids.h";
/// File name of the inference predicates.
pub const RULES_HEADER: &str = "ontology_rules.h";
/// File name of the materialized fact table.
pub const FACTS_HEADER: &str = "materialized_triples.h";

/// Counts describing the emitted artifacts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ArtifactSummary {
    pub classes: usize,
    pub properties: usize,
    /// Number of `is_<Class>` predicates.
    pub class_predicates: usize,
    /// Number of `has_<property>` predicates.
    pub property_predicates: usize,
    pub facts_emitted: usize,
    /// Closed facts left out because a term has no identifier.
    pub facts_skipped: usize,
}

/// A generated predicate, chosen once at generation time.
#[derive(Debug, Clone, PartialEq, Eq)]
enum RuleKind<'a> {
    /// `is_<class>`: the entity is typed with the class or one of its subclasses.
    Subsumption {
        class: &'a str,
        subclasses: BTreeSet<&'a str>,
    },
    /// `has_<property>`: a direct lookup, the closure already holds the derived edges.
    Characterized {
        property: &'a str,
        transitive: bool,
        symmetric: bool,
        inverses: BTreeSet<&'a str>,
    },
}

/// Renders and writes the C headers of one compilation.
#[derive(Debug, Clone)]
pub struct ArtifactEmitter<'a> {
    ids: &'a EntityIds,
    classes: SymbolTable<'a>,
    properties: SymbolTable<'a>,
    rules: Vec<RuleKind<'a>>,
    facts: BTreeSet<[EntityId; 3]>,
    facts_skipped: usize,
}

impl<'a> ArtifactEmitter<'a> {
    /// Prepares the artifacts of a closed store.
    pub fn new(ids: &'a EntityIds, axioms: &'a AxiomSet, store: &'a FactStore) -> Self {
        let classes = SymbolTable::new(ids.classes().map(|(name, _)| name));
        let properties = SymbolTable::new(ids.properties().map(|(name, _)| name));

        let mut rules = subsumption_rules(ids, store);
        rules.extend(characterized_properties(ids, axioms, store));

        let mut facts = BTreeSet::new();
        let mut facts_skipped = 0;
        for fact in store.iter() {
            let row = (
                ids.term_entity_id(store, fact.subject),
                ids.term_entity_id(store, fact.predicate),
                ids.term_entity_id(store, fact.object),
            );
            match row {
                (Some(s), Some(p), Some(o)) => {
                    facts.insert([s, p, o]);
                }
                _ => facts_skipped += 1,
            }
        }

        Self {
            ids,
            classes,
            properties,
            rules,
            facts,
            facts_skipped,
        }
    }

    pub fn summary(&self) -> ArtifactSummary {
        let class_predicates = self
            .rules
            .iter()
            .filter(|rule| matches!(rule, RuleKind::Subsumption { .. }))
            .count();
        ArtifactSummary {
            classes: self.ids.classes().len(),
            properties: self.ids.properties().len(),
            class_predicates,
            property_predicates: self.rules.len() - class_predicates,
            facts_emitted: self.facts.len(),
            facts_skipped: self.facts_skipped,
        }
    }

    /// Renders [`IDS_HEADER`].
    pub fn render_ids(&self) -> String {
        Header::new(self, HeaderKind::Ids).to_string()
    }

    /// Renders [`RULES_HEADER`].
    pub fn render_rules(&self) -> String {
        Header::new(self, HeaderKind::Rules).to_string()
    }

    /// Renders [`FACTS_HEADER`].
    pub fn render_facts(&self) -> String {
        Header::new(self, HeaderKind::Facts).to_string()
    }

    fn write_ids(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "#include <stdint.h>")?;
        writeln!(f)?;
        writeln!(f, "#define ONTOLOGY_CLASS_BASE {}", Hex(CLASS_ID_BASE))?;
        writeln!(f, "#define ONTOLOGY_PROPERTY_BASE {}", Hex(PROPERTY_ID_BASE))?;
        writeln!(f, "#define ONTOLOGY_INSTANCE_BASE {}", Hex(INSTANCE_ID_BASE))?;
        writeln!(f)?;

        writeln!(f, "/* Classes */")?;
        for (name, id) in self.ids.classes() {
            writeln!(f, "#define CLASS_{} {}", self.classes.symbol(name), Hex(id))?;
        }
        writeln!(f, "#define ONTOLOGY_CLASS_COUNT {}u", self.ids.classes().len())?;
        writeln!(f)?;

        writeln!(f, "/* Properties */")?;
        for (name, id) in self.ids.properties() {
            writeln!(f, "#define PROP_{} {}", self.properties.symbol(name), Hex(id))?;
        }
        writeln!(
            f,
            "#define ONTOLOGY_PROPERTY_COUNT {}u",
            self.ids.properties().len()
        )
    }

    fn write_rules(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "#include <stdbool.h>")?;
        writeln!(f, "#include <stdint.h>")?;
        writeln!(f, "#include \"{IDS_HEADER}\"")?;
        writeln!(f)?;
        writeln!(f, "/* Provided by the runtime. */")?;
        writeln!(
            f,
            "extern bool ask_pattern(uint32_t subject, uint32_t predicate, uint32_t object);"
        )?;

        let type_symbol = self.properties.symbol(local_name(rdf::TYPE.as_str()));
        for rule in &self.rules {
            writeln!(f)?;
            match rule {
                RuleKind::Subsumption { class, subclasses } => {
                    writeln!(
                        f,
                        "static inline bool is_{}(uint32_t entity) {{",
                        self.classes.symbol(class)
                    )?;
                    // The class itself first, then its subclasses
                    for (i, name) in std::iter::once(*class)
                        .chain(subclasses.iter().copied())
                        .enumerate()
                    {
                        let lead = if i == 0 { "    return" } else { "\n        ||" };
                        write!(
                            f,
                            "{lead} ask_pattern(entity, PROP_{type_symbol}, CLASS_{})",
                            self.classes.symbol(name)
                        )?;
                    }
                    writeln!(f, ";")?;
                    writeln!(f, "}}")?;
                }
                RuleKind::Characterized {
                    property,
                    transitive,
                    symmetric,
                    inverses,
                } => {
                    let mut traits = Vec::new();
                    if *transitive {
                        traits.push("transitive".to_owned());
                    }
                    if *symmetric {
                        traits.push("symmetric".to_owned());
                    }
                    traits.extend(inverses.iter().map(|q| format!("inverse of {q}")));
                    let symbol = self.properties.symbol(property);
                    writeln!(
                        f,
                        "/* {}: {} */",
                        comment_safe(property),
                        comment_safe(&traits.join(", "))
                    )?;
                    writeln!(
                        f,
                        "static inline bool has_{symbol}(uint32_t subject, uint32_t object) {{"
                    )?;
                    writeln!(f, "    return ask_pattern(subject, PROP_{symbol}, object);")?;
                    writeln!(f, "}}")?;
                }
            }
        }
        Ok(())
    }

    fn write_facts(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "#include <stdint.h>")?;
        writeln!(f)?;
        writeln!(f, "typedef struct {{")?;
        writeln!(f, "    uint32_t subject;")?;
        writeln!(f, "    uint32_t predicate;")?;
        writeln!(f, "    uint32_t object;")?;
        writeln!(f, "}} materialized_triple_t;")?;
        writeln!(f)?;
        writeln!(f, "#define MATERIALIZED_TRIPLE_COUNT {}u", self.facts.len())?;
        writeln!(f)?;
        if self.facts.is_empty() {
            // C has no zero-length arrays
            return writeln!(
                f,
                "static const materialized_triple_t MATERIALIZED_TRIPLES[1] = {{{{0u, 0u, 0u}}}};"
            );
        }
        writeln!(
            f,
            "static const materialized_triple_t MATERIALIZED_TRIPLES[] = {{"
        )?;
        for [s, p, o] in &self.facts {
            writeln!(f, "    {{{}, {}, {}}},", Hex(*s), Hex(*p), Hex(*o))?;
        }
        writeln!(f, "}};")
    }

    /// Writes the three headers into `dir`, creating it if needed.
    pub fn write_to(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        fs::create_dir_all(dir).map_err(|source| CompileError::Io {
            path: dir.to_owned(),
            source,
        })?;
        let artifacts = [
            (IDS_HEADER, self.render_ids()),
            (RULES_HEADER, self.render_rules()),
            (FACTS_HEADER, self.render_facts()),
        ];
        let mut written = Vec::with_capacity(artifacts.len());
        for (file_name, content) in artifacts {
            let path = dir.join(file_name);
            fs::write(&path, content).map_err(|source| CompileError::Io {
                path: path.clone(),
                source,
            })?;
            debug!(path = %path.display(), "artifact written");
            written.push(path);
        }
        let summary = self.summary();
        info!(
            dir = %dir.display(),
            classes = summary.classes,
            properties = summary.properties,
            predicates = summary.class_predicates + summary.property_predicates,
            facts = summary.facts_emitted,
            skipped = summary.facts_skipped,
            "artifacts written"
        );
        Ok(written)
    }
}

/// One `is_<class>` predicate per class with at least one named subclass in the closure.
fn subsumption_rules<'a>(ids: &EntityIds, store: &'a FactStore) -> Vec<RuleKind<'a>> {
    let Some(sub_class_of) = store.lookup_named_node(rdfs::SUB_CLASS_OF) else {
        return Vec::new();
    };
    let mut targets: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
    for &(sub, sup) in store.pairs_for_predicate(sub_class_of) {
        let (Some(sub), Some(sup)) = (store.iri(sub), store.iri(sup)) else {
            continue;
        };
        let (sub, sup) = (local_name(sub), local_name(sup));
        if ids.class_id(sub).is_none() || ids.class_id(sup).is_none() {
            continue;
        }
        let subclasses = targets.entry(sup).or_default();
        if sub != sup {
            subclasses.insert(sub);
        }
    }
    if !targets.is_empty() && ids.property_id(local_name(rdf::TYPE.as_str())).is_none() {
        warn!("\"type\" is used as a class name, subsumption predicates are not generated");
        return Vec::new();
    }
    targets
        .into_iter()
        .map(|(class, subclasses)| RuleKind::Subsumption { class, subclasses })
        .collect()
}

/// One `has_<property>` predicate per transitive, symmetric or inverse property.
fn characterized_properties<'a>(
    ids: &EntityIds,
    axioms: &AxiomSet,
    store: &'a FactStore,
) -> Vec<RuleKind<'a>> {
    let mut by_name: BTreeMap<&str, RuleKind<'a>> = BTreeMap::new();
    for p in axioms.characterized_properties() {
        let Some(name) = store.iri(p).map(local_name) else {
            continue;
        };
        if ids.property_id(name).is_none() {
            continue;
        }
        let rule = by_name.entry(name).or_insert(RuleKind::Characterized {
            property: name,
            transitive: false,
            symmetric: false,
            inverses: BTreeSet::new(),
        });
        if let RuleKind::Characterized {
            transitive,
            symmetric,
            inverses,
            ..
        } = rule
        {
            *transitive |= axioms.is_transitive(p);
            *symmetric |= axioms.is_symmetric(p);
            inverses.extend(
                axioms
                    .inverses_of(p)
                    .filter_map(|q| store.iri(q))
                    .map(local_name),
            );
        }
    }
    by_name.into_values().collect()
}

/// Maps entity names to unique C identifiers.
#[derive(Debug, Clone, Default)]
struct SymbolTable<'a> {
    symbols: BTreeMap<&'a str, String>,
}

impl<'a> SymbolTable<'a> {
    /// `names` must be sorted, collisions are resolved in that order.
    fn new(names: impl IntoIterator<Item = &'a str>) -> Self {
        let mut used = BTreeSet::new();
        let mut symbols = BTreeMap::new();
        for name in names {
            let base = c_identifier(name);
            let mut symbol = base.clone();
            let mut suffix = 2;
            while used.contains(&symbol) {
                symbol = format!("{base}_{suffix}");
                suffix += 1;
            }
            used.insert(symbol.clone());
            symbols.insert(name, symbol);
        }
        Self { symbols }
    }

    /// Only called with names from the same [`EntityIds`].
    fn symbol<'n>(&'n self, name: &'n str) -> &'n str {
        self.symbols.get(name).map_or(name, String::as_str)
    }
}

/// Replaces anything outside `[A-Za-z0-9_]` and guards against a leading digit.
fn c_identifier(name: &str) -> String {
    let mut identifier = String::with_capacity(name.len() + 1);
    if name.starts_with(|c: char| c.is_ascii_digit()) {
        identifier.push('_');
    }
    identifier.extend(name.chars().map(|c| {
        if c.is_ascii_alphanumeric() || c == '_' {
            c
        } else {
            '_'
        }
    }));
    identifier
}

/// Local names may contain `*/`.
fn comment_safe(text: &str) -> String {
    text.replace("*/", "* /")
}

#[derive(Debug, Clone, Copy)]
enum HeaderKind {
    Ids,
    Rules,
    Facts,
}

/// One header wrapped in its include guard.
struct Header<'e, 'a> {
    emitter: &'e ArtifactEmitter<'a>,
    kind: HeaderKind,
}

impl<'e, 'a> Header<'e, 'a> {
    fn new(emitter: &'e ArtifactEmitter<'a>, kind: HeaderKind) -> Self {
        Self { emitter, kind }
    }
}

impl fmt::Display for Header<'_, '_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (guard, description) = match self.kind {
            HeaderKind::Ids => ("ONTOLOGY_IDS_H", "Entity identifiers."),
            HeaderKind::Rules => ("ONTOLOGY_RULES_H", "Inference predicates."),
            HeaderKind::Facts => ("MATERIALIZED_TRIPLES_H", "Materialized facts."),
        };
        writeln!(f, "/* {description} Generated by oxowlc, do not edit. */")?;
        writeln!(f, "#ifndef {guard}")?;
        writeln!(f, "#define {guard}")?;
        writeln!(f)?;
        match self.kind {
            HeaderKind::Ids => self.emitter.write_ids(f)?,
            HeaderKind::Rules => self.emitter.write_rules(f)?,
            HeaderKind::Facts => self.emitter.write_facts(f)?,
        }
        writeln!(f)?;
        writeln!(f, "#endif /* {guard} */")
    }
}

/// Formats an identifier as a C unsigned hexadecimal literal.
struct Hex(EntityId);

impl fmt::Display for Hex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:05X}u", self.0)
    }
}
