//! Error types for ontology compilation.

use oxrdf::IriParseError;
use oxrdfio::RdfParseError;
use std::io;
use std::path::PathBuf;

use crate::ids::EntityKind;

/// Errors that can abort a compilation run.
///
/// Hitting the materialization iteration cap is not an error: it is reported
/// through [`Materialization::complete`](crate::Materialization::complete).
#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    /// The ontology file does not exist.
    #[error("ontology file {} not found", path.display())]
    NotFound { path: PathBuf },

    /// The ontology file is not valid in its serialization format.
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: RdfParseError,
    },

    /// No serialization format was given and none can be guessed from the file name.
    #[error("unable to guess the RDF format of {}, set it explicitly", path.display())]
    UnknownFormat { path: PathBuf },

    /// The configured base IRI is not a valid IRI.
    #[error("invalid base IRI {iri}: {source}")]
    InvalidBaseIri {
        iri: String,
        #[source]
        source: IriParseError,
    },

    /// More entities of one kind than the ID range can hold.
    #[error("too many {kind} names: {count} found, the identifier range holds {capacity}")]
    IdRangeExhausted {
        kind: EntityKind,
        count: usize,
        capacity: usize,
    },

    /// Reading an input or writing an artifact failed.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl CompileError {
    /// Maps an error raised while opening an input file.
    pub(crate) fn input(path: impl Into<PathBuf>, source: io::Error) -> Self {
        let path = path.into();
        if source.kind() == io::ErrorKind::NotFound {
            Self::NotFound { path }
        } else {
            Self::Io { path, source }
        }
    }
}

/// Result type for compilation operations.
pub type Result<T, E = CompileError> = std::result::Result<T, E>;
