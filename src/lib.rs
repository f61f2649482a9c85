//! # Scholar Sync
//!
//! Literature analysis for a research query or an uploaded paper: search
//! arXiv and Semantic Scholar, split each abstract into semantic sections,
//! relate papers through a similarity network, and resolve uploaded
//! documents against canonical metadata.
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`models`]: Core data structures (Paper, SectionSet, SimilarityGraph)
//! - [`sources`]: Search backends behind the [`Source`] trait, plus the aggregator
//! - [`text`]: Sentence segmentation, keyword classification, heading extraction
//! - [`enrich`]: DOI and title lookup against Semantic Scholar
//! - [`graph`]: TF-IDF similarity network with a seeded spring layout
//! - [`pipeline`]: Query and upload analysis end to end
//! - [`utils`]: HTTP client, retrying fetcher, deduplication and validation
//! - [`config`]: Configuration management

pub mod config;
pub mod enrich;
pub mod graph;
pub mod models;
pub mod pipeline;
pub mod sources;
pub mod text;
pub mod utils;

// Re-export commonly used types
pub use models::{Paper, PaperAnalysis, SectionSet, SimilarityGraph};
pub use pipeline::{AnalysisPipeline, PipelineError, QueryReport, QueryRequest, UploadInput, UploadReport};
pub use sources::Source;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
