// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Verdict CLI entrypoint.
//!
//! Developer-facing commands over the Verdict core:
//!
//! - `verdict hash <ARGS.json>` prints the arguments hash of a JSON argument list.
//! - `verdict check <DATASET.json>` ingests a dataset through the validating store.
//! - `verdict stats <DATASET.json> [--launch N] [--distinct] [--json]` prints
//!   status statistics for an ingested dataset.
//!
//! Settings (title limit, status taxonomy, default log filter) load from the
//! platform config directory, or from `--config-dir`. Logs go to stderr;
//! `RUST_LOG` overrides the configured filter.
//!
//! The CLI exits with code `0` on success and non-zero on error.

mod dataset;

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;
use verdict_app_core::{load_settings, ConfigService, Settings};
use verdict_config_fs::FsConfigStore;
use verdict_core::{
    hash_arguments, total_count, Argument, EntityKind, LaunchId, MemoryStore, StatisticsRow,
    StatisticsScope, StatusTaxonomy,
};

use crate::dataset::Dataset;

#[derive(Parser, Debug)]
#[command(author, version, about = "Verdict test identity and statistics tools")]
struct Args {
    /// Directory holding `settings.json` (defaults to the platform config dir)
    #[arg(long, global = true)]
    config_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the arguments hash of a JSON array of arguments
    Hash {
        /// File containing `[{"name": .., "type": .., "value": ..}, ..]`
        file: PathBuf,
    },
    /// Ingest a dataset and report whether every row was accepted
    Check {
        /// Dataset file
        dataset: PathBuf,
    },
    /// Ingest a dataset and print status statistics
    Stats {
        /// Dataset file
        dataset: PathBuf,
        /// Restrict to one launch
        #[arg(long)]
        launch: Option<u64>,
        /// Count each logical test once, using its latest run
        #[arg(long)]
        distinct: bool,
        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();
    let settings = settings(args.config_dir.as_deref())?;

    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&settings.log_filter)
            .with_context(|| format!("invalid log filter {:?}", settings.log_filter))?,
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let mut out = std::io::stdout().lock();
    match args.command {
        Command::Hash { file } => run_hash(&file, &mut out),
        Command::Check { dataset } => run_check(&dataset, &settings, &mut out),
        Command::Stats {
            dataset,
            launch,
            distinct,
            json,
        } => run_stats(&dataset, &settings, launch.map(LaunchId), distinct, json, &mut out),
    }
}

fn settings(config_dir: Option<&Path>) -> Result<Settings> {
    let store = match config_dir {
        Some(dir) => FsConfigStore::at(dir),
        None => FsConfigStore::new(),
    }
    .context("open config store")?;
    let location = store.base().display().to_string();
    load_settings(&ConfigService::new(store)).with_context(|| format!("load settings from {location}"))
}

fn ingest(path: &Path, settings: &Settings) -> Result<MemoryStore> {
    let store = MemoryStore::with_config(settings.store_config());
    let ingested = Dataset::read(path)?
        .ingest(&store)
        .with_context(|| format!("ingest {}", path.display()))?;
    info!(
        launches = ingested.launches,
        contexts = ingested.contexts,
        entities = ingested.entities,
        "dataset ingested"
    );
    Ok(store)
}

fn run_hash(file: &Path, out: &mut impl Write) -> Result<()> {
    let bytes = std::fs::read(file).with_context(|| format!("read {}", file.display()))?;
    let args: Vec<Argument> =
        serde_json::from_slice(&bytes).with_context(|| format!("parse {}", file.display()))?;
    writeln!(out, "{}", hash_arguments(&args))?;
    Ok(())
}

fn run_check(dataset: &Path, settings: &Settings, out: &mut impl Write) -> Result<()> {
    let store = ingest(dataset, settings)?;
    let entities: usize = EntityKind::ALL
        .into_iter()
        .map(|kind| store.entity_count(kind))
        .sum();
    writeln!(
        out,
        "ok: {} contexts, {entities} entities",
        store.context_count()
    )?;
    Ok(())
}

fn run_stats(
    dataset: &Path,
    settings: &Settings,
    launch_id: Option<LaunchId>,
    distinct: bool,
    json: bool,
    out: &mut impl Write,
) -> Result<()> {
    let store = ingest(dataset, settings)?;
    let rows = store.statistics(StatisticsScope { launch_id }, distinct);
    if json {
        serde_json::to_writer_pretty(&mut *out, &rows)?;
        writeln!(out)?;
    } else {
        write_table(&rows, &settings.taxonomy, out)?;
    }
    Ok(())
}

fn write_table(
    rows: &[StatisticsRow],
    taxonomy: &StatusTaxonomy,
    out: &mut impl Write,
) -> Result<()> {
    writeln!(out, "{:<11} {:<10} {:<10} {:>7}", "TYPE", "GROUP", "STATUS", "COUNT")?;
    for row in rows {
        let group = row
            .status_group_id
            .and_then(|g| taxonomy.group(g))
            .map_or("-", |g| g.name.as_str());
        let status = match row.status_id {
            Some(id) => taxonomy
                .status(id)
                .map_or_else(|| id.to_string(), |s| s.name.clone()),
            None => "-".to_owned(),
        };
        writeln!(
            out,
            "{:<11} {:<10} {:<10} {:>7}",
            row.entity_type.as_str(),
            group,
            status,
            row.count
        )?;
    }
    writeln!(out, "{:<11} {:<10} {:<10} {:>7}", "total", "", "", total_count(rows))?;
    Ok(())
}
