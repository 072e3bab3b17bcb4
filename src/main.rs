//! datagraph - command line front end
//!
//! Inspects container files and lists the registered filters.

use anyhow::Context;
use clap::{Parser, Subcommand};
use datagraph_rs::{
    config::EngineConfig,
    filters::FilterRegistry,
    io,
    logging,
    structure::{DataStructure, HierarchyEntry},
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "datagraph")]
#[command(about = "Inspect datagraph containers and filters", long_about = None)]
struct Cli {
    /// Engine config file, defaults to the platform config directory
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the object tree of a container file.
    Inspect {
        file: PathBuf,

        /// Read arrays as placeholders, skipping their values
        #[arg(long)]
        placeholder: bool,
    },
    /// List the registered filters.
    Filters,
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<EngineConfig> {
    match path {
        Some(path) => EngineConfig::load_from(path).with_context(|| format!("loading {}", path.display())),
        None => Ok(EngineConfig::load_or_default()),
    }
}

fn print_tree(ds: &DataStructure) {
    for entry in ds.hierarchy() {
        println!("{}", describe_entry(&entry));
    }
}

fn describe_entry(entry: &HierarchyEntry) -> String {
    let depth = entry.path.len().saturating_sub(1);
    let name = entry.path.target_name().unwrap_or_default();
    let mut line = format!("{}{} [{}] {}", "  ".repeat(depth), name, entry.object_type, entry.id);
    if let Some(data_type) = entry.data_type {
        line.push_str(&format!(
            " {} tuples={:?} components={:?}",
            data_type, entry.tuple_shape, entry.component_shape
        ));
    }
    if entry.placeholder {
        line.push_str(" (placeholder)");
    }
    line
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_ref())?;
    let _guard = logging::init_logging(&config.logging)?;

    match cli.cmd {
        Commands::Inspect { file, placeholder } => {
            let preflight = placeholder || config.io.placeholder_on_inspect;
            tracing::info!("Inspecting {:?} (placeholder: {})", file, preflight);
            let container = io::Container::load(&file).with_context(|| format!("reading {}", file.display()))?;
            let mut reader = io::DataStructureReader::with_format(&config.io.default_format, preflight);
            if let Err(err) = reader.read(&container) {
                let partial = reader.into_partial();
                tracing::warn!("Container is damaged; showing {} object(s) read before the error", partial.len());
                print_tree(&partial);
                return Err(err).context("decoding container");
            }
            let skipped = reader.skipped();
            let ds = reader.into_partial();
            println!(
                "{} object(s), next id {}, {} non-importable entr(ies) skipped",
                ds.len(),
                ds.next_id(),
                skipped
            );
            print_tree(&ds);
        }
        Commands::Filters => {
            let registry = FilterRegistry::with_core_filters();
            for filter in registry.iter() {
                println!("{}  {:<28} {}", filter.uuid(), filter.human_name(), filter.default_tags().join(", "));
            }
        }
    }

    Ok(())
}
