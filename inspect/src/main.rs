//! Loads a hex dataset and reports how well the neighbor model fits it.

use anyhow::{Context, Result, bail};
use clap::Parser;
use hexmine_core::*;
use std::fs;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// What log level to use
    #[command(flatten)]
    verbose: clap_verbosity_flag::Verbosity,

    /// GeoJSON feature collection to inspect
    data: PathBuf,

    /// Board config in TOML, defaults apply when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the configured mine threshold
    #[arg(short, long)]
    threshold: Option<f64>,
}

fn logger(level: log::LevelFilter) -> env_logger::Builder {
    let mut builder = env_logger::Builder::new();
    builder.filter_level(level).format_timestamp(None);
    builder
}

fn main() -> Result<()> {
    let args = Args::parse();
    logger(args.verbose.log_level_filter())
        .try_init()
        .context("Error initializing logger")?;

    let mut config = match &args.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("Could not read {}", path.display()))?;
            BoardConfig::from_toml_str(&text)
                .with_context(|| format!("Invalid config {}", path.display()))?
        }
        None => BoardConfig::default(),
    };
    if let Some(threshold) = args.threshold {
        if !threshold.is_finite() {
            bail!("threshold must be finite");
        }
        config.threshold = threshold;
    }

    let json = fs::read_to_string(&args.data)
        .with_context(|| format!("Could not read {}", args.data.display()))?;
    let registry = CellRegistry::load(&json, &config)
        .with_context(|| format!("Could not load {}", args.data.display()))?;

    report_graph(&registry);
    report_spacing(&registry, &config.neighbors);

    let session = GameSession::new(registry, config.threshold);
    println!(
        "threshold {}: {} mines, {} safe cells",
        session.threshold(),
        session.mine_count(),
        session.total_safe()
    );
    Ok(())
}

fn report_graph(registry: &CellRegistry) {
    let graph = registry.neighbor_graph();
    let inert = registry.iter().filter(|c| c.is_zero()).count();

    println!("cells: {} ({} without count)", registry.len(), inert);
    println!("edges: {}", graph.edge_count());
    println!(
        "symmetric: {}, self-loops: {}",
        graph.is_symmetric(),
        graph.has_self_loops()
    );
    println!("degree histogram:");
    for (degree, cells) in graph.degree_histogram().into_iter().enumerate() {
        if cells > 0 {
            println!("  {degree:>2}: {cells}");
        }
    }
}

fn report_spacing(registry: &CellRegistry, config: &NeighborConfig) {
    let bands = DistanceBands::new(config);
    println!(
        "bands: horizontal {:.1}..{:.1} m, diagonal {:.1}..{:.1} m",
        bands.horizontal.0, bands.horizontal.1, bands.diagonal.0, bands.diagonal.1
    );

    let mut nearest: Vec<f64> = nearest_distances(&registry.centroids(), config.bucket_size)
        .into_iter()
        .flatten()
        .collect();
    if nearest.is_empty() {
        println!("nearest spacing: no cell has a hashed candidate");
        return;
    }
    nearest.sort_by(f64::total_cmp);

    let quantile = |q: f64| nearest[((nearest.len() - 1) as f64 * q).round() as usize];
    println!(
        "nearest spacing: min {:.1} m, p10 {:.1} m, median {:.1} m, p90 {:.1} m, max {:.1} m",
        quantile(0.0),
        quantile(0.1),
        quantile(0.5),
        quantile(0.9),
        quantile(1.0)
    );

    let outside = nearest.iter().filter(|&&d| !bands.accepts(d)).count();
    if outside > 0 {
        log::warn!("{outside} cells have a nearest neighbor outside both bands");
    }
    println!("nearest spacing outside bands: {outside} of {}", nearest.len());
}
