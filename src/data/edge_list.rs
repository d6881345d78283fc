//! Plain-text edge list loading

use anyhow::{anyhow, Context, Result};
use crate::graph::{GraphBuilder, WeightedGraph};
use memmap2::Mmap;
use std::fs::File;
use std::path::Path;

/// Weight used when a line carries only the two endpoints
pub const DEFAULT_WEIGHT: f64 = 1.0;

/// Load a weighted directed graph from an edge list file.
///
/// Each line is `source destination [weight]`, separated by whitespace or
/// commas. Blank lines and lines starting with `#` are skipped. Vertex
/// indices follow the order in which tokens first appear.
pub fn load_edge_list<P: AsRef<Path>>(path: P) -> Result<WeightedGraph> {
    let path = path.as_ref();
    log::info!("Reading edge list: {}", path.display());

    if !path.exists() {
        return Err(anyhow!("File not found: {}", path.display()));
    }

    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    if file.metadata()?.len() == 0 {
        log::warn!("Edge list {} is empty", path.display());
        return Ok(GraphBuilder::with_capacity(0).build());
    }

    // SAFETY: the mapping is read-only and dropped before this function returns;
    // the file is not expected to be modified while it is being parsed.
    let mmap = unsafe { Mmap::map(&file) }.with_context(|| format!("mapping {}", path.display()))?;
    let text = std::str::from_utf8(&mmap)
        .with_context(|| format!("{} is not valid UTF-8", path.display()))?;

    let graph = parse_edge_list(text)?;
    log::info!(
        "Loaded graph with {} vertices and {} edges ({} bytes)",
        graph.node_count(),
        graph.edge_count(),
        graph.memory_usage()
    );
    Ok(graph)
}

/// Parse edge list text into a graph
pub fn parse_edge_list(text: &str) -> Result<WeightedGraph> {
    let mut builder = GraphBuilder::with_capacity(1024);

    for (line_no, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let fields: Vec<&str> = line
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|field| !field.is_empty())
            .collect();

        let (src, dst, weight) = match fields.as_slice() {
            [src, dst] => (*src, *dst, DEFAULT_WEIGHT),
            [src, dst, weight] => {
                let weight: f64 = weight
                    .parse()
                    .with_context(|| format!("line {}: invalid weight '{}'", line_no + 1, weight))?;
                (*src, *dst, weight)
            }
            _ => return Err(anyhow!("line {}: expected 'source destination [weight]'", line_no + 1)),
        };

        if !weight.is_finite() || weight < 0.0 {
            return Err(anyhow!(
                "line {}: weight must be a non-negative number, got {}",
                line_no + 1,
                weight
            ));
        }

        builder.add_edge(src, dst, weight);
    }

    Ok(builder.build())
}
