//! Entity identifier allocation.
//!
//! Classes and properties get numeric identifiers from disjoint ranges. An
//! entity is named by the local name of its IRI and identifiers follow the
//! lexicographic order of these names, so the table only depends on the set
//! of names and never on the order in which triples were read.

use crate::axiom::AxiomSet;
use crate::error::{CompileError, Result};
use crate::store::{FactStore, TermId};
use crate::vocab::{rdf, CLASS_TYPES, PROPERTY_TYPES};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use tracing::debug;

/// A numeric entity identifier.
pub type EntityId = u32;

/// First class identifier.
pub const CLASS_ID_BASE: EntityId = 0x1_0000;
/// First property identifier.
pub const PROPERTY_ID_BASE: EntityId = 0x2_0000;
/// Start of the range reserved for instances. Nothing is allocated there yet.
pub const INSTANCE_ID_BASE: EntityId = 0x3_0000;

const RANGE_CAPACITY: usize = 0x1_0000;

/// The kinds of entities that receive an identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityKind {
    Class,
    Property,
}

impl EntityKind {
    fn base(self) -> EntityId {
        match self {
            Self::Class => CLASS_ID_BASE,
            Self::Property => PROPERTY_ID_BASE,
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Class => "class",
            Self::Property => "property",
        })
    }
}

/// Returns the local name of an IRI.
///
/// That is the part after the last `#`, or else after the last `/`, or else
/// after the last `:`. The whole IRI is returned when there is no such
/// separator or when nothing follows it.
///
/// ```
/// use oxowlc::local_name;
///
/// assert_eq!(local_name("http://example.com/onto#Person"), "Person");
/// assert_eq!(local_name("http://example.com/onto/knows"), "knows");
/// assert_eq!(local_name("urn:isbn"), "isbn");
/// assert_eq!(local_name("http://example.com/"), "http://example.com/");
/// ```
pub fn local_name(iri: &str) -> &str {
    let separator = iri
        .rfind('#')
        .or_else(|| iri.rfind('/'))
        .or_else(|| iri.rfind(':'));
    match separator {
        Some(i) if i + 1 < iri.len() => &iri[i + 1..],
        _ => iri,
    }
}

/// The identifier table of one compilation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntityIds {
    classes: BTreeMap<String, EntityId>,
    properties: BTreeMap<String, EntityId>,
}

impl EntityIds {
    /// Collects the class and property names of the store and numbers them.
    ///
    /// A name used both as a class and as a property is a class. Any
    /// predicate that is not a class is a property, declared or not.
    pub fn allocate(store: &FactStore, axioms: &AxiomSet) -> Result<Self> {
        let mut class_names = BTreeSet::new();
        for &(sub, sup) in axioms.subclass_rules() {
            class_names.extend(store.iri(sub).map(local_name));
            class_names.extend(store.iri(sup).map(local_name));
        }
        for class_type in CLASS_TYPES {
            class_names.extend(typed_names(store, class_type));
        }

        let mut property_names = BTreeSet::from([local_name(rdf::TYPE.as_str())]);
        property_names.extend(
            store
                .predicates()
                .filter_map(|p| store.iri(p))
                .map(local_name),
        );
        for property_type in PROPERTY_TYPES {
            property_names.extend(typed_names(store, property_type));
        }
        for (p, q) in axioms.inverse_pairs() {
            property_names.extend(store.iri(p).map(local_name));
            property_names.extend(store.iri(q).map(local_name));
        }
        property_names.retain(|name| !class_names.contains(name));

        let ids = Self {
            classes: number(EntityKind::Class, class_names)?,
            properties: number(EntityKind::Property, property_names)?,
        };
        debug!(
            classes = ids.classes.len(),
            properties = ids.properties.len(),
            "entity identifiers allocated"
        );
        Ok(ids)
    }

    pub fn class_id(&self, name: &str) -> Option<EntityId> {
        self.classes.get(name).copied()
    }

    pub fn property_id(&self, name: &str) -> Option<EntityId> {
        self.properties.get(name).copied()
    }

    /// Looks a name up among the classes, then among the properties.
    pub fn entity_id(&self, name: &str) -> Option<EntityId> {
        self.class_id(name).or_else(|| self.property_id(name))
    }

    /// Identifier of an interned term. Only IRIs have one.
    pub fn term_entity_id(&self, store: &FactStore, term: TermId) -> Option<EntityId> {
        self.entity_id(local_name(store.iri(term)?))
    }

    /// Classes in identifier order.
    pub fn classes(&self) -> impl ExactSizeIterator<Item = (&str, EntityId)> + '_ {
        self.classes.iter().map(|(name, id)| (name.as_str(), *id))
    }

    /// Properties in identifier order.
    pub fn properties(&self) -> impl ExactSizeIterator<Item = (&str, EntityId)> + '_ {
        self.properties.iter().map(|(name, id)| (name.as_str(), *id))
    }

    /// The kind of entity an identifier range belongs to.
    pub fn kind_of(id: EntityId) -> Option<EntityKind> {
        match id {
            CLASS_ID_BASE..PROPERTY_ID_BASE => Some(EntityKind::Class),
            PROPERTY_ID_BASE..INSTANCE_ID_BASE => Some(EntityKind::Property),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.classes.len() + self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty() && self.properties.is_empty()
    }
}

/// Local names of the IRIs `s` such that `(s rdf:type of_type)` is in the store.
fn typed_names<'a>(
    store: &'a FactStore,
    of_type: oxrdf::NamedNodeRef<'static>,
) -> impl Iterator<Item = &'a str> + 'a {
    let subjects = store
        .lookup_named_node(rdf::TYPE)
        .zip(store.lookup_named_node(of_type))
        .into_iter()
        .flat_map(move |(rdf_type, of_type)| {
            store.subjects_for_predicate_object(rdf_type, of_type)
        });
    subjects.filter_map(|s| store.iri(s)).map(local_name)
}

fn number(kind: EntityKind, names: BTreeSet<&str>) -> Result<BTreeMap<String, EntityId>> {
    if names.len() > RANGE_CAPACITY {
        return Err(CompileError::IdRangeExhausted {
            kind,
            count: names.len(),
            capacity: RANGE_CAPACITY,
        });
    }
    Ok(names
        .into_iter()
        .zip(kind.base()..)
        .map(|(name, id)| (name.to_owned(), id))
        .collect())
}
