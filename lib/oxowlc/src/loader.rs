//! Ontology ingestion.
//!
//! Syntax parsing is delegated to [`oxrdfio`]; this module only routes the
//! parsed quads into a [`FactStore`]. Graph names are dropped: all graphs of
//! a dataset file end up in the same fact set.

use crate::error::{CompileError, Result};
use crate::store::FactStore;
use oxrdfio::{RdfFormat, RdfParser};
use std::ffi::OsStr;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::{debug, info};

/// Loader configuration.
#[derive(Debug, Clone, Default)]
pub struct LoaderConfig {
    /// Serialization of every input file. Guessed from the file extension when `None`.
    pub format: Option<RdfFormat>,
    /// Base IRI used to resolve relative IRIs.
    pub base_iri: Option<String>,
}

/// Parses ontology files into a [`FactStore`].
#[derive(Debug, Clone, Default)]
pub struct OntologyLoader {
    config: LoaderConfig,
}

impl OntologyLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: LoaderConfig) -> Self {
        Self { config }
    }

    /// Loads every file in order and returns the number of triples read.
    ///
    /// Stops at the first file that cannot be read or parsed.
    pub fn load_all<P: AsRef<Path>>(
        &self,
        store: &mut FactStore,
        paths: impl IntoIterator<Item = P>,
    ) -> Result<usize> {
        let before = store.len();
        let mut read = 0;
        let mut files = 0;
        for path in paths {
            read += self.load(store, path.as_ref())?;
            files += 1;
        }
        info!(
            files,
            triples = read,
            new_facts = store.len() - before,
            "ontology loaded"
        );
        Ok(read)
    }

    /// Loads one file and returns the number of triples read.
    ///
    /// Triples already in the store are deduplicated, so loading a file twice is harmless.
    pub fn load(&self, store: &mut FactStore, path: &Path) -> Result<usize> {
        if !path.exists() {
            return Err(CompileError::NotFound {
                path: path.to_owned(),
            });
        }
        let format = match self.config.format {
            Some(format) => format,
            None => format_from_path(path).ok_or_else(|| CompileError::UnknownFormat {
                path: path.to_owned(),
            })?,
        };
        let file = File::open(path).map_err(|e| CompileError::input(path, e))?;
        debug!(path = %path.display(), ?format, "parsing ontology file");
        self.load_from_reader(store, BufReader::new(file), format, path)
    }

    /// Loads triples from a reader, `origin` is only used in error messages.
    pub fn load_from_reader(
        &self,
        store: &mut FactStore,
        reader: impl Read,
        format: RdfFormat,
        origin: &Path,
    ) -> Result<usize> {
        let mut parser = RdfParser::from_format(format);
        if let Some(base_iri) = &self.config.base_iri {
            parser = parser
                .with_base_iri(base_iri.as_str())
                .map_err(|source| CompileError::InvalidBaseIri {
                    iri: base_iri.clone(),
                    source,
                })?;
        }
        let mut count = 0;
        for quad in parser.for_reader(reader) {
            let quad = quad.map_err(|source| CompileError::Parse {
                path: origin.to_owned(),
                source,
            })?;
            store.insert_terms(quad.subject, quad.predicate, quad.object);
            count += 1;
        }
        debug!(path = %origin.display(), triples = count, "ontology file parsed");
        Ok(count)
    }
}

/// Guesses a serialization from a file extension.
///
/// Knows everything [`RdfFormat::from_extension`] knows plus `.owl`, the
/// customary extension of RDF/XML ontologies.
pub fn format_from_extension(extension: &str) -> Option<RdfFormat> {
    if extension.eq_ignore_ascii_case("owl") {
        return Some(RdfFormat::RdfXml);
    }
    RdfFormat::from_extension(extension)
}

fn format_from_path(path: &Path) -> Option<RdfFormat> {
    path.extension()
        .and_then(OsStr::to_str)
        .and_then(format_from_extension)
}
