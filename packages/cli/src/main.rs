#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for toponym resolution.
//!
//! Reads documents carrying named-entity tagged mentions as JSON, resolves
//! their location mentions against a `GeoNames` gazetteer, and writes the
//! toponyms as JSON.
//!
//! Uses `indicatif-log-bridge` (via [`geotag_cli_utils::init_logger`]) to
//! route `log` output through `indicatif::MultiProgress` so that log lines
//! and the batch progress bar never fight for the terminal.

mod args;
mod batch;

use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::PathBuf;
use std::time::Instant;

use clap::{Parser, Subcommand};
use geotag_cli_utils::DocumentProgress;
use geotag_resolution::build_resolver;
use geotag_resolution_models::{Document, ResolverKind};

use crate::args::{GazetteerArgs, ResolverArgs};

#[derive(Parser)]
#[command(name = "geotag", about = "Toponym resolution over tagged documents")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a single JSON document
    Resolve {
        #[command(flatten)]
        gazetteer: GazetteerArgs,
        #[command(flatten)]
        resolver: ResolverArgs,
        /// Document file. Read from stdin when absent.
        input: Option<PathBuf>,
        /// Pretty-print the result
        #[arg(long)]
        pretty: bool,
    },
    /// Resolve JSON lines, one document per line
    Batch {
        #[command(flatten)]
        gazetteer: GazetteerArgs,
        #[command(flatten)]
        resolver: ResolverArgs,
        /// Input file. Read from stdin when absent.
        input: Option<PathBuf>,
        /// Output file. Written to stdout when absent.
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// List the available resolvers
    Resolvers,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = geotag_cli_utils::init_logger();
    let cli = Cli::parse();

    match cli.command {
        Commands::Resolvers => {
            println!("{:<28} DESCRIPTION", "NAME");
            println!("{}", "-".repeat(80));
            for kind in ResolverKind::all() {
                println!("{:<28} {}", kind.as_ref(), kind.description());
            }
        }
        Commands::Resolve {
            gazetteer,
            resolver,
            input,
            pretty,
        } => {
            let resolver = build_resolver(&resolver.config()?, gazetteer.load()?);

            let document: Document = match input {
                Some(path) => serde_json::from_reader(BufReader::new(File::open(path)?))?,
                None => serde_json::from_reader(io::stdin().lock())?,
            };
            let resolved = batch::resolve_document(resolver.as_ref(), &document);

            let mut stdout = io::stdout().lock();
            if pretty {
                serde_json::to_writer_pretty(&mut stdout, &resolved)?;
            } else {
                serde_json::to_writer(&mut stdout, &resolved)?;
            }
            writeln!(stdout)?;
        }
        Commands::Batch {
            gazetteer,
            resolver,
            input,
            output,
        } => {
            let resolver = build_resolver(&resolver.config()?, gazetteer.load()?);

            let (reader, progress) = match input {
                Some(path) => {
                    let total = batch::count_documents(BufReader::new(File::open(&path)?))?;
                    let reader: Box<dyn BufRead> = Box::new(BufReader::new(File::open(path)?));
                    (reader, DocumentProgress::bar(&multi, "Resolving", total))
                }
                None => {
                    let reader: Box<dyn BufRead> = Box::new(io::stdin().lock());
                    (reader, DocumentProgress::spinner(&multi, "Resolving"))
                }
            };
            let writer: Box<dyn Write> = match output {
                Some(path) => Box::new(BufWriter::new(File::create(path)?)),
                None => Box::new(BufWriter::new(io::stdout().lock())),
            };

            let start = Instant::now();
            let summary = batch::run_batch(resolver.as_ref(), reader, writer, Some(&progress))?;
            progress.finish(format!("{} documents", summary.documents));

            log::info!(
                "{} resolved {} toponyms in {} documents ({} skipped) in {:.1}s",
                resolver.name(),
                summary.toponyms,
                summary.documents,
                summary.skipped,
                start.elapsed().as_secs_f64()
            );
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn command_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_resolver_flags() {
        let cli = Cli::try_parse_from([
            "geotag",
            "batch",
            "--dump",
            "allCountries.txt",
            "--tables",
            "tables",
            "--resolver",
            "context_bound_nearness",
            "--threshold",
            "0.7",
            "docs.jsonl",
        ])
        .unwrap();
        let Commands::Batch {
            resolver, input, ..
        } = cli.command
        else {
            panic!("expected batch");
        };
        assert_eq!(resolver.resolver, Some(ResolverKind::ContextBoundNearness));
        assert!(resolver.threshold.is_some_and(|t| (t - 0.7).abs() < f64::EPSILON));
        assert_eq!(input, Some(PathBuf::from("docs.jsonl")));
    }

    #[test]
    fn unknown_resolver_is_rejected() {
        let result = Cli::try_parse_from([
            "geotag", "resolve", "--dump", "d", "--tables", "t", "--resolver", "nearest",
        ]);
        assert!(result.is_err());
    }
}
