#![allow(clippy::panic_in_result_fn)]

use anyhow::Result;
use assert_cmd::Command;
use assert_fs::prelude::*;
use assert_fs::TempDir;
use predicates::prelude::*;
use std::fs::read_to_string;

const ONTOLOGY: &str = "@prefix ex: <http://example.com/> .
@prefix rdf: <http://www.w3.org/1999/02/22-rdf-syntax-ns#> .
@prefix rdfs: <http://www.w3.org/2000/01/rdf-schema#> .
@prefix owl: <http://www.w3.org/2002/07/owl#> .
ex:A rdfs:subClassOf ex:B .
ex:B rdfs:subClassOf ex:C .
ex:knows rdf:type owl:TransitiveProperty .
ex:x ex:knows ex:y .
ex:y ex:knows ex:z .
";

fn cli_command() -> Result<Command> {
    Ok(Command::cargo_bin("oxowlc")?)
}

#[test]
fn cli_help() -> Result<()> {
    cli_command()?
        .assert()
        .failure()
        .stderr(predicate::str::contains("oxowlc"));
    Ok(())
}

#[test]
fn cli_compile() -> Result<()> {
    let dir = TempDir::new()?;
    let input = dir.child("ontology.ttl");
    input.write_str(ONTOLOGY)?;
    let output = dir.child("generated");

    cli_command()?
        .arg("compile")
        .arg(input.path())
        .arg("--output")
        .arg(output.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("5 asserted facts, 2 inferred"))
        .stderr(predicate::str::contains("warning:").not());

    output
        .child("ontology_ids.h")
        .assert(predicate::str::contains("#define CLASS_C 0x10002u"));
    output.child("ontology_rules.h").assert(predicate::str::contains(
        "return ask_pattern(entity, PROP_type, CLASS_C)\n        || ask_pattern(entity, PROP_type, CLASS_A)\n        || ask_pattern(entity, PROP_type, CLASS_B);",
    ));
    output
        .child("ontology_rules.h")
        .assert(predicate::str::contains("static inline bool has_knows("));
    output
        .child("materialized_triples.h")
        .assert(predicate::str::contains("#define MATERIALIZED_TRIPLE_COUNT 3u"));
    Ok(())
}

#[test]
fn cli_compile_is_reproducible() -> Result<()> {
    let dir = TempDir::new()?;
    let input = dir.child("ontology.ttl");
    input.write_str(ONTOLOGY)?;
    for output in ["first", "second"] {
        cli_command()?
            .arg("compile")
            .arg(input.path())
            .arg("-o")
            .arg(dir.child(output).path())
            .assert()
            .success();
    }
    for file in [
        "ontology_ids.h",
        "ontology_rules.h",
        "materialized_triples.h",
    ] {
        assert_eq!(
            read_to_string(dir.child("first").child(file).path())?,
            read_to_string(dir.child("second").child(file).path())?,
            "{file} differs"
        );
    }
    Ok(())
}

#[test]
fn cli_compile_iteration_cap_warns() -> Result<()> {
    let dir = TempDir::new()?;
    let mut ontology =
        String::from("@prefix rdfs: <http://www.w3.org/2000/01/rdf-schema#> .\n");
    for i in 0..150 {
        ontology.push_str(&format!(
            "<http://example.com/C{i}> rdfs:subClassOf <http://example.com/C{}> .\n",
            i + 1
        ));
    }
    let input = dir.child("chain.ttl");
    input.write_str(&ontology)?;
    let output = dir.child("generated");

    cli_command()?
        .arg("compile")
        .arg(input.path())
        .arg("--output")
        .arg(output.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("warning: materialization stopped after 100 iterations"));
    output
        .child("materialized_triples.h")
        .assert(predicate::path::exists());
    Ok(())
}

#[test]
fn cli_compile_explicit_format() -> Result<()> {
    let dir = TempDir::new()?;
    let input = dir.child("ontology.data");
    input.write_str(ONTOLOGY)?;

    cli_command()?
        .arg("compile")
        .arg(input.path())
        .arg("-o")
        .arg(dir.child("generated").path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("unable to guess the RDF format"));

    cli_command()?
        .arg("compile")
        .arg(input.path())
        .arg("--format")
        .arg("text/turtle")
        .arg("-o")
        .arg(dir.child("generated").path())
        .assert()
        .success();
    Ok(())
}

#[test]
fn cli_compile_missing_file() -> Result<()> {
    let dir = TempDir::new()?;
    cli_command()?
        .arg("compile")
        .arg(dir.child("missing.ttl").path())
        .arg("-o")
        .arg(dir.child("generated").path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
    dir.child("generated").assert(predicate::path::missing());
    Ok(())
}

#[test]
fn cli_compile_invalid_file() -> Result<()> {
    let dir = TempDir::new()?;
    let input = dir.child("broken.ttl");
    input.write_str("@prefix ex: <http://example.com/> .\nex:a ex:b .\n")?;
    cli_command()?
        .arg("compile")
        .arg(input.path())
        .arg("-o")
        .arg(dir.child("generated").path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to parse"));
    Ok(())
}

#[test]
fn cli_compile_unknown_format_name() -> Result<()> {
    let dir = TempDir::new()?;
    let input = dir.child("ontology.ttl");
    input.write_str(ONTOLOGY)?;
    cli_command()?
        .arg("compile")
        .arg(input.path())
        .arg("--format")
        .arg("foo")
        .assert()
        .failure()
        .stderr(predicate::str::contains("The file format 'foo' is unknown"));
    Ok(())
}
