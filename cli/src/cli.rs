use clap::{Parser, Subcommand, ValueHint};
use std::path::PathBuf;

#[derive(Parser)]
#[command(about, version, name = "oxowlc")]
/// Ahead-of-time OWL reasoner compiling ontologies into C inference tables
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Close an ontology under the supported entailment rules and write the C headers
    ///
    /// Three files are written in the output directory: ontology_ids.h,
    /// ontology_rules.h and materialized_triples.h.
    /// Compiling the same ontology twice produces byte-identical files.
    Compile {
        /// Ontology file(s) to compile
        ///
        /// All files are merged into a single ontology.
        #[arg(required = true, num_args = 1.., value_hint = ValueHint::FilePath)]
        files: Vec<PathBuf>,
        /// Directory in which the headers are written
        ///
        /// It is created if it does not exist.
        #[arg(
            short,
            long,
            default_value = oxowlc::DEFAULT_OUTPUT_DIR,
            value_hint = ValueHint::DirPath
        )]
        output: PathBuf,
        /// The format of the ontology file(s)
        ///
        /// It can be an extension like "ttl" or a MIME type like "text/turtle".
        ///
        /// By default, the format is guessed from each file extension.
        #[arg(long)]
        format: Option<String>,
        /// Base IRI of the ontology file(s)
        #[arg(long, value_hint = ValueHint::Url)]
        base: Option<String>,
        /// Maximum number of materialization passes
        ///
        /// When reached, the headers are still written but the closure may be incomplete.
        #[arg(long, default_value_t = oxowlc::DEFAULT_MAX_ITERATIONS)]
        max_iterations: usize,
        /// Maximum number of facts to infer
        ///
        /// By default, there is no limit.
        #[arg(long)]
        max_inferred: Option<usize>,
        /// Print debug logs
        ///
        /// Ignored if the RUST_LOG environment variable is set.
        #[arg(short, long)]
        verbose: bool,
    },
}
