//! Cross-paper similarity network.
//!
//! Abstracts are turned into TF-IDF vectors; every pair whose cosine
//! similarity clears the threshold is linked. Components left apart are
//! joined by chaining neighbouring papers in list order, so with no similar
//! pair at all the network is a simple path. Node positions come from a
//! seeded spring layout, so the same papers always produce the same picture.

mod layout;
mod tfidf;

pub use layout::{spring_layout, LayoutEdge};
pub use tfidf::{tokenize, TfidfMatrix};

use crate::models::{GraphEdge, GraphNode, Paper, SimilarityGraph};

/// Shown when there are no papers at all
pub const NO_PAPERS_MESSAGE: &str = "No papers available for network graph.";

/// Shown when a single paper cannot be linked to anything
pub const SINGLE_PAPER_MESSAGE: &str = "At least 2 papers are required to build a network graph.";

/// Base node size before the degree bonus
const BASE_NODE_SIZE: f64 = 18.0;

/// Size added per incident edge
const SIZE_PER_EDGE: f64 = 3.0;

/// Intensity used when recency cannot be computed
const FLAT_INTENSITY: f64 = 0.6;

/// Tuning values for [`SimilarityGraphBuilder`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GraphSettings {
    /// Minimum cosine similarity for an edge
    pub similarity_threshold: f64,
    /// Weight of the chain edges that join separate components
    pub fallback_edge_weight: f64,
    /// Vocabulary cap of the vectorizer
    pub max_features: usize,
    pub layout_seed: u64,
    pub layout_iterations: usize,
}

impl Default for GraphSettings {
    fn default() -> Self {
        Self {
            similarity_threshold: 0.12,
            fallback_edge_weight: 0.05,
            max_features: 1200,
            layout_seed: 42,
            layout_iterations: 50,
        }
    }
}

/// Builds a [`SimilarityGraph`] from a list of papers
#[derive(Debug, Clone, Default)]
pub struct SimilarityGraphBuilder {
    settings: GraphSettings,
}

impl SimilarityGraphBuilder {
    pub fn new(settings: GraphSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &GraphSettings {
        &self.settings
    }

    /// Build the network for `papers`, indexed in input order
    pub fn build(&self, papers: &[Paper]) -> SimilarityGraph {
        match papers.len() {
            0 => return SimilarityGraph::placeholder(NO_PAPERS_MESSAGE),
            1 => {
                let mut graph = SimilarityGraph::placeholder(SINGLE_PAPER_MESSAGE);
                graph.nodes.push(GraphNode {
                    index: 0,
                    label: papers[0].title.clone(),
                    x: 0.0,
                    y: 0.0,
                    size: BASE_NODE_SIZE,
                    color_intensity: recency_intensities(papers)[0],
                });
                return graph;
            }
            _ => {}
        }

        let edges = self.similarity_edges(papers);
        let n = papers.len();
        let layout_edges: Vec<LayoutEdge> = edges
            .iter()
            .map(|e| LayoutEdge {
                source: e.source,
                target: e.target,
                weight: e.weight,
            })
            .collect();
        let k = 1.5 / (n as f64).sqrt();
        let positions = spring_layout(
            n,
            &layout_edges,
            k,
            self.settings.layout_iterations,
            self.settings.layout_seed,
        );

        let intensities = recency_intensities(papers);
        let mut graph = SimilarityGraph {
            nodes: Vec::with_capacity(n),
            edges,
            placeholder: None,
        };
        for (index, paper) in papers.iter().enumerate() {
            let (x, y) = positions[index];
            graph.nodes.push(GraphNode {
                index,
                label: paper.title.clone(),
                x,
                y,
                size: BASE_NODE_SIZE + SIZE_PER_EDGE * graph.degree(index) as f64,
                color_intensity: intensities[index],
            });
        }

        tracing::debug!(
            "Built similarity graph with {} nodes and {} edges",
            graph.node_count(),
            graph.edge_count()
        );
        graph
    }

    /// Thresholded similarity edges plus chain edges joining components
    fn similarity_edges(&self, papers: &[Paper]) -> Vec<GraphEdge> {
        let abstracts: Vec<&str> = papers.iter().map(|p| p.r#abstract.as_str()).collect();
        let matrix = TfidfMatrix::fit(&abstracts, self.settings.max_features);

        let mut edges = Vec::new();
        for i in 0..papers.len() {
            for j in (i + 1)..papers.len() {
                let weight = matrix.cosine(i, j);
                if weight >= self.settings.similarity_threshold {
                    edges.push(GraphEdge {
                        source: i,
                        target: j,
                        weight,
                    });
                }
            }
        }

        let bridges = bridge_components(papers.len(), &mut edges, self.settings.fallback_edge_weight);
        if bridges > 0 {
            tracing::debug!("Added {} chain edges to connect the similarity graph", bridges);
        }
        edges
    }
}

/// Link consecutive papers that sit in different components.
///
/// With no similarity edges this yields the plain chain `i - i+1`. Returns
/// the number of edges added; `edges` stays sorted by `(source, target)`.
fn bridge_components(n: usize, edges: &mut Vec<GraphEdge>, weight: f64) -> usize {
    let mut parent: Vec<usize> = (0..n).collect();
    fn find(parent: &mut [usize], mut i: usize) -> usize {
        while parent[i] != i {
            parent[i] = parent[parent[i]];
            i = parent[i];
        }
        i
    }

    for edge in edges.iter() {
        let (a, b) = (find(&mut parent, edge.source), find(&mut parent, edge.target));
        parent[a] = b;
    }

    let mut added = 0;
    for i in 0..n.saturating_sub(1) {
        let (a, b) = (find(&mut parent, i), find(&mut parent, i + 1));
        if a != b {
            parent[a] = b;
            edges.push(GraphEdge {
                source: i,
                target: i + 1,
                weight,
            });
            added += 1;
        }
    }
    edges.sort_by_key(|e| (e.source, e.target));
    added
}

/// Map publication years onto [0.25, 0.95], oldest lightest.
///
/// Papers without a year, or a corpus whose years are all equal, get 0.6.
fn recency_intensities(papers: &[Paper]) -> Vec<f64> {
    let years = papers.iter().filter_map(|p| p.year);
    let bounds = years.clone().min().zip(years.max());

    papers
        .iter()
        .map(|paper| match (paper.year, bounds) {
            (Some(year), Some((min, max))) if max > min => {
                0.25 + 0.7 * f64::from(year - min) / f64::from(max - min)
            }
            _ => FLAT_INTENSITY,
        })
        .collect()
}
