#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! `gazetteer` command line entry point.
//!
//! Resolves place IDs, processes provenance files into a label cache, line
//! geometry, and label tally, and exposes the ID/URI codec. Logging goes
//! through [`gazetteer_cli_utils::init_logger`] so diagnostics and the
//! ingestion progress bar share the terminal.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use clap::{Parser, Subcommand};
use gazetteer_cli_utils::IndicatifProgress;
use gazetteer_provenance::{ProvenanceProcessor, load_data, validate, write_json};
use gazetteer_resolver::label_cache::LabelCache;
use gazetteer_resolver::service::{GazetteerService, service_from_env};
use gazetteer_resolver::{LookupOptions, Resolver, codec, paths};

#[derive(Parser)]
#[command(name = "gazetteer", about = "Who's On First place resolution tool")]
struct Cli {
    /// Re-download records even when a raw copy is cached on disk
    #[arg(long, global = true)]
    force: bool,
    /// Delay after each network fetch in milliseconds (default from the
    /// service configuration)
    #[arg(long, global = true)]
    sleep_ms: Option<u64>,
    /// Directory for raw `.geojson` records
    #[arg(long, global = true)]
    output_dir: Option<PathBuf>,
    /// Log a diagnostic for every lookup that degrades
    #[arg(long, short, global = true)]
    verbose: bool,
    /// Resolved label cache to consult before the network
    #[arg(long, global = true)]
    cache: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the canonical label, coordinates, and country of place IDs
    Resolve {
        /// Place IDs (e.g., "101751119")
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// Validate, ingest, and export a provenance file
    Process {
        /// JSON array of provenance records
        #[arg(long)]
        input: PathBuf,
        /// Where to write the `MultiLineString` (stdout if omitted)
        #[arg(long)]
        geometry_out: Option<PathBuf>,
        /// Where to write the per-place label tally
        #[arg(long)]
        tally_out: Option<PathBuf>,
        /// Where to save the label cache afterwards
        #[arg(long, default_value = paths::DEFAULT_LABEL_CACHE_PATH)]
        save_cache: PathBuf,
    },
    /// Check that every place reference has a URI and appears in its text
    Validate {
        /// JSON array of provenance records
        #[arg(long)]
        input: PathBuf,
    },
    /// Print the record URI of a place ID
    Uri {
        /// Place ID
        id: String,
    },
    /// Print the place ID of a record URI
    Id {
        /// Record URI
        uri: String,
    },
}

impl Cli {
    fn lookup_options(&self, service: &GazetteerService) -> LookupOptions {
        let mut options = service.lookup_options();
        options.force = self.force;
        options.verbose = self.verbose;
        if let Some(sleep_ms) = self.sleep_ms {
            options.sleep = Duration::from_millis(sleep_ms);
        }
        if let Some(output_dir) = &self.output_dir {
            options.output_dir.clone_from(output_dir);
        }
        options
    }
}

fn format_coordinate(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}

#[allow(clippy::too_many_lines)]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = gazetteer_cli_utils::init_logger();
    let cli = Cli::parse();
    let service = service_from_env();
    let options = cli.lookup_options(&service);

    match &cli.command {
        Commands::Resolve { ids } => {
            let cache = LabelCache::load(cli.cache.as_deref())?;
            let mut processor = ProvenanceProcessor::new(Resolver::from_service(&service)?, cache);

            for id in ids {
                let entry = match processor.cache().get(id) {
                    Some(entry) => entry.clone(),
                    None => processor.entry_for(id, &options).await,
                };
                println!(
                    "{id}\t{}\t{},{}\t{}",
                    entry.label.as_deref().unwrap_or("-"),
                    format_coordinate(entry.lng),
                    format_coordinate(entry.lat),
                    entry.country.as_deref().unwrap_or("-"),
                );
            }

            log::debug!(
                "{} network fetches",
                processor.resolver().fetcher().network_fetches()
            );
        }
        Commands::Process {
            input,
            geometry_out,
            tally_out,
            save_cache,
        } => {
            let start = Instant::now();
            let data = load_data(input)?;
            let cache_path = cli.cache.as_deref().unwrap_or(save_cache);
            let cache = LabelCache::load(Some(cache_path))?;
            let mut processor = ProvenanceProcessor::new(Resolver::from_service(&service)?, cache);

            let failures = validate::validate_all(&data, &options);
            if !failures.is_empty() {
                log::warn!(
                    "{} of {} records have invalid place references",
                    failures.len(),
                    data.len()
                );
            }

            let progress = IndicatifProgress::records_bar(&multi, "Ingesting provenance records");
            let stats = processor
                .ingest_all(&data, &options, progress.as_ref())
                .await;

            let geometry = processor.line_geometry(&data, &options).await;
            match geometry_out {
                Some(path) => write_json(path, &geometry)?,
                None => println!("{}", serde_json::to_string_pretty(&geometry)?),
            }
            if let Some(path) = tally_out {
                write_json(path, processor.tally())?;
            }
            processor.save_cache(save_cache)?;

            log::info!(
                "Processed {} records in {:.1}s: {} references, {} cache misses, {} fetches",
                data.len(),
                start.elapsed().as_secs_f64(),
                stats.references,
                stats.cache_misses,
                processor.resolver().fetcher().network_fetches()
            );
        }
        Commands::Validate { input } => {
            let data = load_data(input)?;
            let failures = validate::validate_all(&data, &LookupOptions {
                verbose: false,
                ..options
            });

            for report in &failures {
                print!("{report}");
            }
            if !failures.is_empty() {
                eprintln!("{} of {} records failed validation", failures.len(), data.len());
                std::process::exit(1);
            }
            println!("All {} records are valid", data.len());
        }
        Commands::Uri { id } => {
            let Some(uri) = codec::uri_from_id_with_base(&service.base_url, id) else {
                eprintln!("No URI for place ID {id:?}");
                std::process::exit(1);
            };
            println!("{uri}");
        }
        Commands::Id { uri } => {
            println!("{}", codec::id_from_uri(uri));
        }
    }

    Ok(())
}
