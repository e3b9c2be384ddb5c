// src/services/orchestrator.rs

//! Single discovery call.
//!
//! Plans queries from the filters, fetches candidates for each one, analyzes
//! the unseen sites and keeps those matching the age filter.

use std::collections::HashSet;
use std::sync::Arc;

use futures::stream::{self, StreamExt};

use crate::models::{Config, Prospect, SearchFilters};
use crate::services::analyzer::Analyzer;
use crate::services::dedup::VisitedSet;
use crate::services::planner::QueryPlanner;
use crate::services::search::{CandidateSource, SearchProvider};

/// Summary of a discovery call.
#[derive(Debug, Default)]
pub struct DiscoveryOutcome {
    pub prospects: Vec<Prospect>,
    pub queries_planned: usize,
    pub queries_issued: usize,
    pub provider_failures: usize,
    pub analysis_failures: usize,
    pub filtered_out: usize,
}

/// Runs one discovery call against a provider and an analyzer.
pub struct DiscoveryOrchestrator {
    planner: QueryPlanner,
    source: CandidateSource,
    analyzer: Arc<dyn Analyzer>,
    visited: Arc<VisitedSet>,
    per_call_cap: usize,
    result_cap: usize,
    concurrency: usize,
}

impl DiscoveryOrchestrator {
    pub fn new(
        config: &Config,
        provider: Arc<dyn SearchProvider>,
        analyzer: Arc<dyn Analyzer>,
        visited: Arc<VisitedSet>,
    ) -> Self {
        let discovery = &config.discovery;
        Self {
            planner: QueryPlanner::with_limits(Arc::new(config.taxonomy.clone()), discovery),
            source: CandidateSource::new(provider, Arc::clone(&visited)),
            analyzer,
            visited,
            per_call_cap: discovery.per_call_cap,
            result_cap: discovery.result_cap,
            concurrency: discovery.analysis_concurrency.max(1),
        }
    }

    pub fn planner(&self) -> &QueryPlanner {
        &self.planner
    }

    /// Discover new prospects for `filters`. Never fails as a whole.
    pub async fn run(&self, filters: &SearchFilters) -> Vec<Prospect> {
        self.run_detailed(filters).await.prospects
    }

    /// Like `run`, with per-call counters.
    pub async fn run_detailed(&self, filters: &SearchFilters) -> DiscoveryOutcome {
        let queries = self.planner.expand(filters);
        let mut outcome = DiscoveryOutcome {
            queries_planned: queries.len(),
            ..DiscoveryOutcome::default()
        };

        for query in &queries {
            if outcome.prospects.len() >= self.per_call_cap {
                log::debug!(
                    "Per-call cap of {} reached, skipping remaining queries",
                    self.per_call_cap
                );
                break;
            }

            let region = self.planner.infer_region(query, &filters.region);
            outcome.queries_issued += 1;

            let candidates = match self.source.fetch(query).await {
                Ok(urls) => urls,
                Err(error) => {
                    outcome.provider_failures += 1;
                    log::warn!("Search failed, skipping query: {}", error);
                    continue;
                }
            };

            let (found, failures) = self
                .classify_candidates(candidates, &filters.sector, &region)
                .await;
            outcome.analysis_failures += failures;

            let total = found.len();
            let kept: Vec<Prospect> = found
                .into_iter()
                .filter(|p| filters.website_age.matches(p.website_age))
                .collect();
            outcome.filtered_out += total - kept.len();

            log::debug!(
                "Query '{}': {} classified, {} kept (region {})",
                query,
                total,
                kept.len(),
                region
            );
            outcome.prospects.extend(kept);
        }

        outcome.prospects.truncate(self.result_cap);
        log::info!(
            "Discovery call: {} prospects from {}/{} queries ({} provider failures, {} analysis failures)",
            outcome.prospects.len(),
            outcome.queries_issued,
            outcome.queries_planned,
            outcome.provider_failures,
            outcome.analysis_failures
        );
        outcome
    }

    /// Analyze unseen candidates, committing results in provider order.
    ///
    /// A URL is owned by whichever result first marks it visited; failed
    /// analyses leave it unvisited.
    async fn classify_candidates(
        &self,
        candidates: Vec<String>,
        sector: &str,
        region: &str,
    ) -> (Vec<Prospect>, usize) {
        let mut seen = HashSet::new();
        let unique: Vec<String> = candidates
            .into_iter()
            .filter(|url| seen.insert(url.clone()))
            .collect();

        let analyzer = &self.analyzer;
        let mut results = stream::iter(unique)
            .map(|url| async move {
                let result = analyzer.analyze(&url).await;
                (url, result)
            })
            .buffered(self.concurrency);

        let mut prospects = Vec::new();
        let mut failures = 0;
        while let Some((url, result)) = results.next().await {
            match result {
                Ok(classification) => {
                    if self.visited.add(&url) {
                        prospects.push(Prospect::from_classification(
                            url,
                            sector,
                            region,
                            classification,
                        ));
                    }
                }
                Err(error) => {
                    failures += 1;
                    log::warn!("Skipping candidate: {}", error);
                }
            }
        }
        (prospects, failures)
    }
}
