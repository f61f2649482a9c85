//! Core data models for papers, extracted sections and similarity graphs.

mod analysis;
mod graph;
mod paper;
mod search;

pub use analysis::{
    EnrichmentRecord, PaperAnalysis, SectionKind, SectionSet, INSUFFICIENT_INFORMATION,
};
pub use graph::{GraphEdge, GraphNode, SimilarityGraph};
pub use paper::{Paper, PaperBuilder, SourceType, MAX_YEAR, MIN_YEAR};
pub use search::{SearchQuery, SearchResponse};
