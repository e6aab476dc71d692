#![doc = include_str!("../README.md")]
#![doc(test(attr(deny(warnings))))]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

mod axiom;
mod compiler;
mod emit;
mod error;
mod ids;
mod loader;
mod materializer;
mod store;
pub mod vocab;

pub use axiom::{Axiom, AxiomSet};
pub use compiler::{Compilation, CompileReport, Compiler, CompilerConfig, DEFAULT_OUTPUT_DIR};
pub use emit::{ArtifactEmitter, ArtifactSummary, FACTS_HEADER, IDS_HEADER, RULES_HEADER};
pub use error::{CompileError, Result};
pub use ids::{
    local_name, EntityId, EntityIds, EntityKind, CLASS_ID_BASE, INSTANCE_ID_BASE,
    PROPERTY_ID_BASE,
};
pub use loader::{format_from_extension, LoaderConfig, OntologyLoader};
pub use materializer::{
    Materialization, Materializer, MaterializerConfig, Rule, DEFAULT_MAX_ITERATIONS,
};
pub use oxrdfio::RdfFormat;
pub use store::{Fact, FactStore, TermId};
