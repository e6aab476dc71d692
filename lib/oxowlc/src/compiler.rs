//! The compilation pipeline: load, extract, materialize, allocate, emit.

use crate::axiom::AxiomSet;
use crate::emit::{ArtifactEmitter, ArtifactSummary};
use crate::error::Result;
use crate::ids::EntityIds;
use crate::loader::{LoaderConfig, OntologyLoader};
use crate::materializer::{Materialization, Materializer, MaterializerConfig};
use crate::store::FactStore;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::info_span;

/// Default value of [`CompilerConfig::output_dir`].
pub const DEFAULT_OUTPUT_DIR: &str = "generated";

/// Configuration for the compiler.
#[derive(Debug, Clone)]
pub struct CompilerConfig {
    /// Directory receiving the generated headers.
    pub output_dir: PathBuf,
    pub loader: LoaderConfig,
    pub materializer: MaterializerConfig,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            loader: LoaderConfig::default(),
            materializer: MaterializerConfig::default(),
        }
    }
}

/// Compiles ontologies into C headers.
///
/// ```no_run
/// use oxowlc::{Compiler, CompilerConfig};
///
/// let report = Compiler::new(CompilerConfig::default()).compile(&["ontology.ttl"])?;
/// if !report.materialization.complete {
///     eprintln!("warning: closure may be incomplete");
/// }
/// # oxowlc::Result::<()>::Ok(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Compiler {
    config: CompilerConfig,
}

impl Compiler {
    pub fn new(config: CompilerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    /// Runs everything but the emission and returns the closed ontology.
    pub fn analyze<P: AsRef<Path>>(&self, paths: &[P]) -> Result<Compilation> {
        let mut store = FactStore::new();
        OntologyLoader::with_config(self.config.loader.clone())
            .load_all(&mut store, paths.iter().map(AsRef::as_ref))?;
        let asserted = store.len();
        let axioms = AxiomSet::extract(&store);
        let materialization =
            Materializer::new(&axioms, self.config.materializer.clone()).run(&mut store);
        let ids = EntityIds::allocate(&store, &axioms)?;
        Ok(Compilation {
            store,
            axioms,
            ids,
            asserted,
            materialization,
        })
    }

    /// Compiles `paths` and writes the headers into the output directory.
    pub fn compile<P: AsRef<Path>>(&self, paths: &[P]) -> Result<CompileReport> {
        let _span = info_span!("compile", output = %self.config.output_dir.display()).entered();
        let compilation = self.analyze(paths)?;
        let emitter = compilation.emitter();
        let written = emitter.write_to(&self.config.output_dir)?;
        Ok(CompileReport {
            asserted: compilation.asserted,
            closed: compilation.store.len(),
            materialization: compilation.materialization.clone(),
            artifacts: emitter.summary(),
            written,
        })
    }
}

/// A loaded and closed ontology with its identifier table.
#[derive(Debug, Clone)]
pub struct Compilation {
    store: FactStore,
    axioms: AxiomSet,
    ids: EntityIds,
    asserted: usize,
    materialization: Materialization,
}

impl Compilation {
    /// The closed store.
    pub fn store(&self) -> &FactStore {
        &self.store
    }

    pub fn axioms(&self) -> &AxiomSet {
        &self.axioms
    }

    pub fn ids(&self) -> &EntityIds {
        &self.ids
    }

    /// Number of facts before materialization.
    pub fn asserted(&self) -> usize {
        self.asserted
    }

    pub fn materialization(&self) -> &Materialization {
        &self.materialization
    }

    pub fn emitter(&self) -> ArtifactEmitter<'_> {
        ArtifactEmitter::new(&self.ids, &self.axioms, &self.store)
    }
}

/// What a compilation did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileReport {
    /// Facts read from the inputs, duplicates removed.
    pub asserted: usize,
    /// Facts after materialization.
    pub closed: usize,
    pub materialization: Materialization,
    pub artifacts: ArtifactSummary,
    /// The written headers.
    pub written: Vec<PathBuf>,
}

impl fmt::Display for CompileReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} asserted facts, {} inferred in {} iterations, {} classes, {} properties, {} predicates, {} facts emitted",
            self.asserted,
            self.materialization.inferred,
            self.materialization.iterations,
            self.artifacts.classes,
            self.artifacts.properties,
            self.artifacts.class_predicates + self.artifacts.property_predicates,
            self.artifacts.facts_emitted
        )
    }
}
