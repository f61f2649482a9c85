//! Combine a primary and a secondary backend into one candidate list.

use std::sync::Arc;

use crate::models::{Paper, SearchQuery};
use crate::sources::{Source, SourceError};

/// Split of the requested result count between backends
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AggregatorSettings {
    /// Share of `max_results` requested from the primary backend
    pub primary_share: f64,
    /// Lower bound for the primary backend's request size
    pub primary_min: usize,
}

impl Default for AggregatorSettings {
    fn default() -> Self {
        Self {
            primary_share: 0.6,
            primary_min: 4,
        }
    }
}

impl AggregatorSettings {
    /// Number of papers requested from the primary backend
    pub fn primary_target(&self, max_results: usize) -> usize {
        let share = (max_results as f64 * self.primary_share).floor() as usize;
        share.max(self.primary_min)
    }
}

/// Queries the primary backend, then the secondary, and concatenates both.
///
/// Results are not deduplicated here. When either call fails, whether at
/// the transport level or because a backend answered with an unreadable
/// body, the search is repeated against the primary backend alone with the
/// full `max_results`.
#[derive(Debug, Clone)]
pub struct SourceAggregator {
    primary: Arc<dyn Source>,
    secondary: Arc<dyn Source>,
    settings: AggregatorSettings,
}

impl SourceAggregator {
    pub fn new(primary: Arc<dyn Source>, secondary: Arc<dyn Source>) -> Self {
        Self {
            primary,
            secondary,
            settings: AggregatorSettings::default(),
        }
    }

    pub fn with_settings(mut self, settings: AggregatorSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn settings(&self) -> &AggregatorSettings {
        &self.settings
    }

    /// Collect candidates for `query` from both backends
    pub async fn search(&self, query: &str, max_results: usize) -> Result<Vec<Paper>, SourceError> {
        match self.search_both(query, max_results).await {
            Ok(papers) => Ok(papers),
            Err(err) => {
                let cause = if err.is_transport() {
                    "unreachable"
                } else {
                    "unreadable response"
                };
                tracing::warn!(
                    "Combined search failed ({}: {}), falling back to {} only",
                    cause,
                    err,
                    self.primary.name()
                );
                let request = SearchQuery::new(query).max_results(max_results);
                let response = self.primary.search(&request).await?;
                Ok(response.papers)
            }
        }
    }

    async fn search_both(&self, query: &str, max_results: usize) -> Result<Vec<Paper>, SourceError> {
        let primary_target = self.settings.primary_target(max_results);

        let primary = self
            .primary
            .search(&SearchQuery::new(query).max_results(primary_target))
            .await?;
        let secondary = self
            .secondary
            .search(&SearchQuery::new(query).max_results(max_results))
            .await?;

        tracing::info!(
            "Collected {} papers from {} and {} from {}",
            primary.len(),
            self.primary.name(),
            secondary.len(),
            self.secondary.name()
        );

        let mut papers = primary.papers;
        papers.extend(secondary.papers);
        Ok(papers)
    }
}
