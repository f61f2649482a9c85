//! Utility modules shared by sources, enrichment and the pipeline.
//!
//! - [`HttpClient`]: shared reqwest client with default headers
//! - [`HttpTransport`]: [`Transport`] implementation over [`HttpClient`]
//! - [`ResilientFetcher`]: bounded-retry JSON GET with linear backoff
//! - [`dedupe_papers`] / [`dedupe_by_key`]: order-preserving title deduplication
//! - [`ValidationError`] and the `validate_*` helpers for request input
//!
//! # Retry with Backoff
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use scholar_sync::utils::{HttpClient, HttpTransport, ResilientFetcher, RetryPolicy};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let transport = Arc::new(HttpTransport::new(HttpClient::new()?));
//! let fetcher = ResilientFetcher::new(transport, RetryPolicy::default());
//! let body = fetcher
//!     .request("https://api.example.com/items", &[("limit", "5")])
//!     .await;
//! # Ok(())
//! # }
//! ```

mod dedup;
mod http;
mod retry;
mod validate;

pub use dedup::{dedupe_by_key, dedupe_papers, normalize_title};
pub use http::{HttpClient, HttpTransport, DEFAULT_USER_AGENT};
pub use retry::{
    AttemptOutcome, FetchState, ResilientFetcher, RetryPolicy, Transport, TransportError,
    TransportResponse,
};
pub use validate::{
    validate_max_results, validate_query, validate_upload_filename, validate_year,
    validate_year_range, ValidationError, SUPPORTED_EXTENSIONS,
};
