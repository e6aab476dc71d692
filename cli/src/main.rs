#![expect(clippy::print_stderr, clippy::print_stdout)]
use anyhow::{bail, Context};
use clap::Parser;
use cli::{Args, Command};
use oxowlc::{Compiler, CompilerConfig, LoaderConfig, MaterializerConfig, RdfFormat};
use tracing_subscriber::EnvFilter;

mod cli;

pub fn main() -> anyhow::Result<()> {
    let matches = Args::parse();
    match matches.command {
        Command::Compile {
            files,
            output,
            format,
            base,
            max_iterations,
            max_inferred,
            verbose,
        } => {
            init_tracing(verbose);
            let format = format.as_deref().map(rdf_format_from_name).transpose()?;
            let config = CompilerConfig {
                output_dir: output,
                loader: LoaderConfig {
                    format,
                    base_iri: base,
                },
                materializer: MaterializerConfig {
                    max_iterations,
                    max_inferred,
                },
            };
            let report = Compiler::new(config.clone())
                .compile(&files)
                .with_context(|| {
                    format!(
                        "Failed to compile the ontology into {}",
                        config.output_dir.display()
                    )
                })?;
            println!("{report}");
            if !report.materialization.complete {
                eprintln!(
                    "warning: materialization stopped after {} iterations and {} inferred facts, \
                     the closure may be incomplete",
                    report.materialization.iterations, report.materialization.inferred
                );
            }
            Ok(())
        }
    }
}

/// Logs go to stderr, `RUST_LOG` takes precedence over `--verbose`.
fn init_tracing(verbose: bool) {
    let default = if verbose { "oxowlc=debug" } else { "oxowlc=info" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .init();
}

fn rdf_format_from_name(name: &str) -> anyhow::Result<RdfFormat> {
    if let Some(t) = oxowlc::format_from_extension(name) {
        return Ok(t);
    }
    if let Some(t) = RdfFormat::from_media_type(name) {
        return Ok(t);
    }
    bail!("The file format '{name}' is unknown")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_names() {
        assert_eq!(rdf_format_from_name("ttl").unwrap(), RdfFormat::Turtle);
        assert_eq!(rdf_format_from_name("owl").unwrap(), RdfFormat::RdfXml);
        assert_eq!(
            rdf_format_from_name("application/n-triples").unwrap(),
            RdfFormat::NTriples
        );
        assert!(rdf_format_from_name("foo").is_err());
    }

    #[test]
    fn arguments() {
        let args =
            Args::try_parse_from(["oxowlc", "compile", "a.ttl", "b.owl", "-o", "out"]).unwrap();
        let Command::Compile {
            files,
            output,
            max_iterations,
            max_inferred,
            ..
        } = args.command;
        assert_eq!(files.len(), 2);
        assert_eq!(output.to_str(), Some("out"));
        assert_eq!(max_iterations, oxowlc::DEFAULT_MAX_ITERATIONS);
        assert_eq!(max_inferred, None);
        assert!(Args::try_parse_from(["oxowlc", "compile"]).is_err());
    }

    #[test]
    fn defaults_follow_the_library() {
        let Command::Compile {
            output,
            max_iterations,
            ..
        } = Args::try_parse_from(["oxowlc", "compile", "a.ttl"]).unwrap().command;
        let config = oxowlc::CompilerConfig::default();
        assert_eq!(output, config.output_dir);
        assert_eq!(max_iterations, config.materializer.max_iterations);
    }
}
