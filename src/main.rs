use clap::Parser;
use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use env_logger::Env;
use log::info;
use std::fs;
use std::path::PathBuf;

use netflux5g::config_loader;
use netflux5g::export::{self, ExportFormat};
use netflux5g::topology::TopologyGraph;

/// Generate a Mininet-WiFi / Containernet script from a NetFlux5G topology
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the saved topology (JSON, or YAML by extension)
    #[arg(short, long)]
    topology: PathBuf,

    /// Path to the editor configuration YAML file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output file for the generated topology
    #[arg(short, long, default_value = "topology.py")]
    output: PathBuf,

    /// Output format: python, yaml or json
    #[arg(short, long, default_value_t = ExportFormat::Python)]
    format: ExportFormat,

    /// Log the computed coverage range of every radio node
    #[arg(long)]
    ranges: bool,
}

fn main() -> Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    // Parse command-line arguments
    let args = Args::parse();

    // The configuration decides the default log filter, so it loads first
    let config = config_loader::load_config_or_default(args.config.as_deref())?;
    env_logger::Builder::from_env(Env::default().default_filter_or(config.log_filter())).init();

    info!("Starting NetFlux5G topology export");
    info!("Topology file: {:?}", args.topology);
    info!("Output file: {:?}", args.output);

    let graph = config_loader::load_topology(&args.topology)?;

    if args.ranges {
        log_ranges(&graph, &config.export);
    }

    let description = export::export(&graph, &config.export)
        .wrap_err_with(|| format!("Failed to export '{}'", args.topology.display()))?;
    let rendered = export::render(&description, args.format)?;

    if let Some(parent) = args.output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .wrap_err_with(|| format!("Failed to create output directory '{}'", parent.display()))?;
    }
    fs::write(&args.output, rendered)
        .wrap_err_with(|| format!("Failed to write '{}'", args.output.display()))?;

    info!("Generated {} topology: {:?}", args.format, args.output);
    Ok(())
}

fn log_ranges(graph: &TopologyGraph, settings: &netflux5g::config::ExportSettings) {
    for node in graph.nodes() {
        if let Some(range) = graph.coverage_range(node.id(), settings.propagation_model, settings.path_loss_exponent) {
            info!(
                "{}: {:.1} m coverage ({})",
                node.display_name(),
                range,
                settings.propagation_model
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let args = Args::parse_from(["netflux5g", "--topology", "lab.json"]);

        assert_eq!(args.topology, PathBuf::from("lab.json"));
        assert_eq!(args.output, PathBuf::from("topology.py"));
        assert_eq!(args.format, ExportFormat::Python);
        assert!(args.config.is_none());
        assert!(!args.ranges);
    }

    #[test]
    fn test_format_and_ranges() {
        let args = Args::parse_from([
            "netflux5g",
            "--topology", "lab.yaml",
            "--config", "editor.yaml",
            "--format", "json",
            "--output", "out/lab.json",
            "--ranges",
        ]);

        assert_eq!(args.format, ExportFormat::Json);
        assert_eq!(args.config, Some(PathBuf::from("editor.yaml")));
        assert!(args.ranges);
    }
}
