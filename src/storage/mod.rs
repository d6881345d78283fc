//! Results persistence module

use anyhow::{Context, Result};
use crate::brandes::BcReport;
use crate::graph::WeightedGraph;
use ndarray::Array1;
use serde_json::{json, to_string_pretty};
use statrs::statistics::Statistics;
use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Write one score per line, in vertex index order.
///
/// The file is created fresh; an existing file is never overwritten.
pub fn write_scores<P: AsRef<Path>>(path: P, scores: &Array1<f64>) -> Result<()> {
    let path = path.as_ref();
    log::info!("Saving {} scores to {}", scores.len(), path.display());

    let file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .with_context(|| format!("creating {}", path.display()))?;
    let mut writer = BufWriter::new(file);

    for score in scores.iter() {
        writeln!(writer, "{}", score)?;
    }
    writer.flush()?;

    Ok(())
}

/// Save a JSON summary of the graph, the run and the score distribution.
///
/// Like the score file, an existing summary is never overwritten.
pub fn save_summary<P: AsRef<Path>>(path: P, graph: &WeightedGraph, report: &BcReport) -> Result<()> {
    let path = path.as_ref();
    log::info!("Saving run summary to {}", path.display());

    let scores = report.scores.as_slice().unwrap_or(&[]);
    let (mean, std_dev, max) = if scores.is_empty() {
        (0.0, 0.0, 0.0)
    } else {
        (
            Statistics::mean(scores),
            if scores.len() > 1 { Statistics::std_dev(scores) } else { 0.0 },
            Statistics::max(scores),
        )
    };

    let largest_cluster = report.cluster_sizes.iter().copied().fold(0, usize::max);
    let singleton_clusters = report.cluster_sizes.iter().filter(|&&size| size == 1).count();

    let summary = json!({
        "graph_stats": {
            "node_count": graph.node_count(),
            "edge_count": graph.edge_count(),
            "avg_out_degree": if graph.node_count() == 0 {
                0.0
            } else {
                graph.edge_count() as f64 / graph.node_count() as f64
            },
        },
        "run": report,
        "cluster_stats": {
            "largest_cluster_size": largest_cluster,
            "singleton_clusters": singleton_clusters,
        },
        "score_stats": {
            "mean": mean,
            "std_dev": std_dev,
            "max": max,
        }
    });

    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .with_context(|| format!("creating {}", path.display()))?;
    file.write_all(to_string_pretty(&summary)?.as_bytes())?;

    Ok(())
}
