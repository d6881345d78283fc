use anyhow::{bail, Result};
use clap::{Parser, ValueEnum};
use fastbc::cluster::metrics::RankingSignal;
use fastbc::config::{self, Config, DEFAULT_PRECISION};
use fastbc::{data, storage};
use std::path::Path;
use std::time::Instant;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Ranking {
    Degree,
    Weight,
}

impl From<Ranking> for RankingSignal {
    fn from(ranking: Ranking) -> Self {
        match ranking {
            Ranking::Degree => RankingSignal::Degree,
            Ranking::Weight => RankingSignal::Weight,
        }
    }
}

#[derive(Parser, Debug)]
#[clap(
    name = "fastbc",
    about = "Approximate betweenness centrality through Louvain clustering and pivot sampling"
)]
struct Cli {
    /// Path to the edge list (source destination [weight] per line)
    edge_list: String,

    /// Seeds to be used by each parallel Louvain execution (comma or space separated)
    #[clap(short = 's', long)]
    louvain_seeds: Option<String>,

    /// Number of parallel Louvain executors [default: 4]
    #[clap(short = 'e', long)]
    louvain_executors: Option<usize>,

    /// Minimum modularity gain for the Louvain algorithm
    #[clap(short = 'p', long, default_value_t = DEFAULT_PRECISION)]
    louvain_precision: f64,

    /// Output file path
    #[clap(short = 'o', long, default_value = "bc.txt")]
    output: String,

    /// Logger level (trace|debug|info|warning|error|critical|off)
    #[clap(short = 'd', long, default_value = "info")]
    debug: String,

    /// Number of worker threads (0 = use all available cores)
    #[clap(long, default_value = "0")]
    threads: usize,

    /// Pivots selected from each cluster
    #[clap(long, default_value = "1")]
    pivots_per_cluster: usize,

    /// Structural signal used to rank pivot candidates
    #[clap(long, value_enum, default_value = "degree")]
    ranking: Ranking,

    /// Compute exact betweenness using every vertex as a source
    #[clap(long)]
    exact: bool,

    /// Optional path for a JSON run summary
    #[clap(long)]
    summary: Option<String>,
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Cli::parse();

    // Configure logging
    let log_level = config::parse_log_level(&args.debug)?;

    env_logger::Builder::new()
        .filter_level(log_level)
        .format_timestamp_millis()
        .init();

    // Refuse to run when a result would overwrite an existing file
    if Path::new(&args.output).exists() {
        bail!("File \"{}\" already existing", args.output);
    }
    if let Some(summary) = &args.summary {
        if Path::new(summary).exists() {
            bail!("File \"{}\" already existing", summary);
        }
    }

    // Seeds are validated before the graph is touched
    let (seeds, executors) = config::resolve_seeds(args.louvain_seeds.as_deref(), args.louvain_executors)?;

    let config = Config {
        seeds,
        executors,
        precision: args.louvain_precision,
        pivots_per_cluster: args.pivots_per_cluster,
        ranking: args.ranking.into(),
        exact: args.exact,
        ..Config::default()
    };
    let engine = config.build_engine()?;

    // Set number of threads
    let num_threads = if args.threads > 0 {
        args.threads
    } else {
        num_cpus::get()
    };

    log::info!("Using {} worker threads", num_threads);
    rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build_global()?;

    let graph = data::edge_list::load_edge_list(&args.edge_list)?;
    log::info!(
        "Loaded graph contains {} vertices and {} edges",
        graph.node_count(),
        graph.edge_count()
    );

    let started = Instant::now();
    let report = engine.compute_report(&graph)?;
    log::info!("Total computation time: {:.3}ms", started.elapsed().as_secs_f64() * 1000.0);

    storage::write_scores(&args.output, &report.scores)?;
    if let Some(summary) = &args.summary {
        storage::save_summary(summary, &graph, &report)?;
    }

    log::info!("Results written to \"{}\"", args.output);

    Ok(())
}
