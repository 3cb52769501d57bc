#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! `helix`: address normalization, property lookup and CSV import.
//!
//! Logging is configured through `RUST_LOG` and routed through
//! [`helix_cli_utils::init_logger`] so that it does not tear the import
//! progress bar.

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use helix_address::{
    normalize_address_with_diagnostics, normalize_postal_code, normalize_state,
};
use helix_cli_utils::IndicatifProgress;
use helix_import::{default_config, import_csv};
use helix_property::{MemoryPropertyStore, PropertyMatchQuery, propertyview_find};

#[derive(Parser)]
#[command(name = "helix", about = "HELIX address normalization and property matching")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the canonical form of a street address
    Normalize {
        /// Street line, e.g. "123 Main Street"
        line1: String,
        /// Secondary line, e.g. "Apt 4"
        #[arg(long, default_value = "")]
        line2: String,
        /// Print the result and how it was derived as JSON
        #[arg(long)]
        json: bool,
    },
    /// Zero-pad a postal code to five digits
    PostalCode { value: String },
    /// Convert a state name to its two-letter abbreviation
    State { value: String },
    /// Find properties in a store file
    Find {
        /// Property store CSV
        #[arg(long)]
        store: PathBuf,
        /// Property id
        #[arg(long)]
        id: Option<u64>,
        /// UBID or custom id (substring match)
        #[arg(long)]
        uid: Option<String>,
        /// Street address
        #[arg(long)]
        street: Option<String>,
        /// Postal code (required for street matching)
        #[arg(long)]
        postal_code: Option<String>,
        /// Organization id
        #[arg(long)]
        organization: Option<u64>,
    },
    /// Import properties and green assessments from a CSV file
    Import {
        /// CSV file to import
        csv: PathBuf,
        /// Existing property store CSV to match against
        #[arg(long)]
        store: Option<PathBuf>,
        /// Organization id assigned to imported properties
        #[arg(long)]
        organization: Option<u64>,
        /// Write the resulting property store to this CSV file
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = helix_cli_utils::init_logger();
    let cli = Cli::parse();

    match cli.command {
        Commands::Normalize { line1, line2, json } => {
            let normalized = normalize_address_with_diagnostics(&line1, &line2);
            if json {
                println!("{}", serde_json::to_string_pretty(&normalized)?);
            } else if let Some(normalized) = normalized {
                println!("{}", normalized.value);
            }
        }
        Commands::PostalCode { value } => println!("{}", normalize_postal_code(&value)),
        Commands::State { value } => println!("{}", normalize_state(&value)),
        Commands::Find {
            store,
            id,
            uid,
            street,
            postal_code,
            organization,
        } => {
            let store = MemoryPropertyStore::from_csv_path(&store)?;
            let query = PropertyMatchQuery {
                property_id: id,
                property_uid: uid,
                street,
                postal_code,
                organization,
            };
            let found = propertyview_find(&store, &query)?;
            println!("{}", serde_json::to_string_pretty(&found)?);
        }
        Commands::Import {
            csv,
            store,
            organization,
            output,
        } => {
            let mut repo = match store {
                Some(path) => MemoryPropertyStore::from_csv_path(&path)?,
                None => MemoryPropertyStore::new(),
            };

            let progress = IndicatifProgress::rows_bar(&multi, "Reading CSV");
            let file = File::open(&csv)?;
            let report = import_csv(file, &mut repo, default_config(), organization, &progress)?;

            if let Some(output) = output {
                write_store(&repo, &output)?;
            }

            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}

fn write_store(store: &MemoryPropertyStore, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let writer = BufWriter::new(File::create(path)?);
    store.write_csv(writer)?;
    log::info!("Wrote {} properties to {}", store.len(), path.display());
    Ok(())
}
