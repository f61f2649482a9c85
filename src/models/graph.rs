//! Similarity graph produced over a set of papers.

use serde::{Deserialize, Serialize};

/// A paper placed in the 2-D layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    /// Position of the paper in the analyzed list
    pub index: usize,
    /// Paper title
    pub label: String,
    pub x: f64,
    pub y: f64,
    /// Visual weight derived from degree
    pub size: f64,
    /// Recency-derived intensity in [0.25, 0.95]
    pub color_intensity: f64,
}

/// Undirected similarity link; `source < target` always holds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub source: usize,
    pub target: usize,
    pub weight: f64,
}

/// Undirected weighted graph over papers
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimilarityGraph {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
    /// Explanation shown instead of a network when there is nothing to link
    pub placeholder: Option<String>,
}

impl SimilarityGraph {
    /// Graph with no nodes and an explanatory message
    pub fn placeholder(message: impl Into<String>) -> Self {
        Self {
            nodes: Vec::new(),
            edges: Vec::new(),
            placeholder: Some(message.into()),
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Number of edges touching `index`
    pub fn degree(&self, index: usize) -> usize {
        self.edges
            .iter()
            .filter(|e| e.source == index || e.target == index)
            .count()
    }

    /// Indices adjacent to `index`
    pub fn neighbors(&self, index: usize) -> impl Iterator<Item = usize> + '_ {
        self.edges.iter().filter_map(move |e| {
            if e.source == index {
                Some(e.target)
            } else if e.target == index {
                Some(e.source)
            } else {
                None
            }
        })
    }

    /// Whether every node can be reached from node 0
    pub fn is_connected(&self) -> bool {
        if self.nodes.len() <= 1 {
            return true;
        }
        let mut visited = vec![false; self.nodes.len()];
        let mut stack = vec![0usize];
        visited[0] = true;
        while let Some(current) = stack.pop() {
            for next in self.neighbors(current) {
                if !visited[next] {
                    visited[next] = true;
                    stack.push(next);
                }
            }
        }
        visited.into_iter().all(|v| v)
    }
}
