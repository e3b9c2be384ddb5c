// src/pipeline/search.rs

//! One-shot prospect search.

use crate::error::{AppError, Result};
use crate::models::{Config, Prospect, QuotaState, SearchFilters, SearchHistoryEntry};
use crate::services::DiscoveryEngine;
use crate::storage::{ProspectStore, QuotaStore, UpsertSummary};
use crate::utils::report;

/// What a search call produced and stored.
#[derive(Debug)]
pub struct SearchReport {
    pub prospects: Vec<Prospect>,
    pub stored: UpsertSummary,
    pub quota: QuotaState,
    pub queries_issued: usize,
    pub provider_failures: usize,
    pub analysis_failures: usize,
}

/// Load today's quota and fail if it is used up.
pub(crate) async fn checked_quota<S: QuotaStore + ?Sized>(
    config: &Config,
    storage: &S,
) -> Result<QuotaState> {
    let quota = storage.load_quota(config.quota.daily_limit).await?;
    if quota.is_exhausted() {
        return Err(AppError::QuotaExhausted {
            used: quota.used,
            limit: quota.daily_limit,
        });
    }
    Ok(quota)
}

/// Run one discovery call and persist its results.
///
/// The quota is charged one request before the call, the prospects are
/// upserted and the search is recorded in the history.
pub async fn run_search<S>(
    config: &Config,
    engine: &DiscoveryEngine,
    storage: &S,
    filters: &SearchFilters,
) -> Result<SearchReport>
where
    S: ProspectStore + QuotaStore,
{
    let mut quota = checked_quota(config, storage).await?;
    quota.record_request();
    storage.save_quota(&quota).await?;

    report::header(&format!(
        "Searching prospects (sector={}, region={}, age={})",
        filters.sector, filters.region, filters.website_age
    ));

    let outcome = engine.run_once_detailed(filters).await;
    let stored = storage.upsert_prospects(&outcome.prospects).await?;
    storage
        .record_search(&SearchHistoryEntry::new(filters, outcome.prospects.len()))
        .await?;

    for prospect in &outcome.prospects {
        report::sub_item(&prospect.format("{name} <{website}> age {age}, score {score}/10"));
    }
    report::summary(
        "Search complete",
        &[
            ("Prospects found", outcome.prospects.len().to_string()),
            ("New in storage", stored.inserted.to_string()),
            ("Refreshed", stored.updated.to_string()),
            (
                "Queries",
                format!("{}/{}", outcome.queries_issued, outcome.queries_planned),
            ),
            ("Quota", format!("{}/{}", quota.used, quota.daily_limit)),
        ],
    );

    Ok(SearchReport {
        prospects: outcome.prospects,
        stored,
        quota,
        queries_issued: outcome.queries_issued,
        provider_failures: outcome.provider_failures,
        analysis_failures: outcome.analysis_failures,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tempfile::TempDir;

    use crate::services::testing::{ScriptedAnalyzer, StaticProvider};
    use crate::storage::LocalStorage;

    fn engine(config: &Config, provider: Arc<StaticProvider>) -> DiscoveryEngine {
        DiscoveryEngine::new(config, provider, Arc::new(ScriptedAnalyzer::new(&[9, 4, 10])))
    }

    #[tokio::test]
    async fn test_run_search_persists_everything() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());
        let config = Config::default();
        let engine = engine(&config, Arc::new(StaticProvider::new(&["https://a.fr", "https://b.fr"])));

        let filters = SearchFilters::new("restaurant", "bretagne");
        let report = run_search(&config, &engine, &storage, &filters).await.unwrap();

        assert_eq!(report.prospects.len(), 2);
        assert_eq!(report.stored.inserted, 2);
        assert_eq!(report.quota.used, 1);

        assert_eq!(storage.load_prospects().await.unwrap().len(), 2);
        let history = storage.recent_searches(10).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].results_count, 2);
        assert_eq!(storage.load_quota(100).await.unwrap().used, 1);
    }

    #[tokio::test]
    async fn test_exhausted_quota_blocks_search() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());
        let mut config = Config::default();
        config.quota.daily_limit = 1;

        let provider = Arc::new(StaticProvider::new(&["https://a.fr"]));
        let engine = engine(&config, provider.clone());
        let filters = SearchFilters::default();

        run_search(&config, &engine, &storage, &filters).await.unwrap();
        let calls = provider.call_count();

        let err = run_search(&config, &engine, &storage, &filters).await.unwrap_err();
        assert!(matches!(err, AppError::QuotaExhausted { used: 1, limit: 1 }));
        assert_eq!(provider.call_count(), calls);
    }
}
