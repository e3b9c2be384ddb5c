// src/pipeline/continuous.rs

//! Continuous prospect search with per-batch persistence.

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;

use crate::error::Result;
use crate::models::{Config, Prospect, QuotaState, SearchFilters, SearchHistoryEntry};
use crate::pipeline::search::checked_quota;
use crate::services::{BatchSink, ContinuousSummary, DiscoveryEngine};
use crate::storage::{ProspectStore, QuotaStore};
use crate::utils::report;

type SharedQuota = Arc<Mutex<QuotaState>>;

fn lock(quota: &SharedQuota) -> MutexGuard<'_, QuotaState> {
    quota.lock().unwrap_or_else(|e| e.into_inner())
}

/// Sink that stores each batch before the next round starts.
pub struct PersistingSink<'a, S> {
    storage: &'a S,
    filters: SearchFilters,
    quota: SharedQuota,
    stored: usize,
}

impl<'a, S> PersistingSink<'a, S>
where
    S: ProspectStore + QuotaStore,
{
    fn new(storage: &'a S, filters: &SearchFilters, quota: SharedQuota) -> Self {
        Self {
            storage,
            filters: filters.clone(),
            quota,
            stored: 0,
        }
    }

    async fn persist_quota(&self) -> Result<()> {
        let snapshot = lock(&self.quota).clone();
        self.storage.save_quota(&snapshot).await
    }
}

#[async_trait]
impl<'a, S> BatchSink for PersistingSink<'a, S>
where
    S: ProspectStore + QuotaStore,
{
    async fn deliver(&mut self, batch: Vec<Prospect>) -> Result<bool> {
        let summary = self.storage.upsert_prospects(&batch).await?;
        self.storage
            .record_search(&SearchHistoryEntry::new(&self.filters, batch.len()))
            .await?;
        self.persist_quota().await?;

        self.stored += summary.inserted;
        for prospect in &batch {
            report::sub_item(&prospect.format("{name} <{website}> age {age}, score {score}/10"));
        }
        report::info(&format!(
            "Batch of {} stored ({} new, {} total new this session)",
            batch.len(),
            summary.inserted,
            self.stored
        ));
        Ok(true)
    }
}

/// Run continuous mode until Ctrl-C, exhaustion or the daily quota runs out.
///
/// Each round charges one quota request. When the charge uses up the quota
/// the loop is asked to stop after that round.
pub async fn run_continuous<S>(
    config: &Config,
    engine: &DiscoveryEngine,
    storage: &S,
    filters: &SearchFilters,
) -> Result<ContinuousSummary>
where
    S: ProspectStore + QuotaStore,
{
    let quota: SharedQuota = Arc::new(Mutex::new(checked_quota(config, storage).await?));

    report::header(&format!(
        "Continuous search (sector={}, region={}, age={}), Ctrl-C to stop",
        filters.sector, filters.region, filters.website_age
    ));

    let ctrl_c_stop = engine.stop_handle();
    let ctrl_c = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::info!("Interrupt received, finishing current round");
            ctrl_c_stop.stop();
        }
    });

    let hook_quota = Arc::clone(&quota);
    let hook_stop = engine.stop_handle();
    let quota_hook = move || {
        let mut quota = lock(&hook_quota);
        quota.roll_over(Utc::now().date_naive());
        quota.record_request();
        if quota.is_exhausted() {
            log::warn!(
                "Daily quota reached ({}/{}), stopping after this round",
                quota.used,
                quota.daily_limit
            );
            hook_stop.stop();
        }
    };

    let mut sink = PersistingSink::new(storage, filters, Arc::clone(&quota));
    let result = engine
        .start_continuous(filters, &mut sink, engine.default_pace(), quota_hook)
        .await;
    ctrl_c.abort();

    // The final round may have charged the quota without delivering.
    sink.persist_quota().await?;
    let summary = result?;

    let used = lock(&quota).clone();
    report::summary(
        "Continuous search stopped",
        &[
            ("Reason", format!("{:?}", summary.reason)),
            ("Rounds", summary.rounds.to_string()),
            ("Prospects delivered", summary.delivered.to_string()),
            ("New in storage", sink.stored.to_string()),
            ("Quota", format!("{}/{}", used.used, used.daily_limit)),
        ],
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    use crate::error::AppError;
    use crate::services::StopReason;
    use crate::services::testing::{ScriptedAnalyzer, StaticProvider};
    use crate::storage::LocalStorage;

    fn config(daily_limit: u32) -> Config {
        let mut config = Config::default();
        config.discovery.max_queries = 1;
        config.discovery.pace_ms = 0;
        config.quota.daily_limit = daily_limit;
        config
    }

    fn engine(config: &Config, provider: StaticProvider) -> DiscoveryEngine {
        DiscoveryEngine::new(config, Arc::new(provider), Arc::new(ScriptedAnalyzer::new(&[6])))
    }

    #[tokio::test]
    async fn test_continuous_persists_each_batch() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());
        let config = config(100);
        let engine = engine(&config, StaticProvider::new(&["https://a.fr", "https://b.fr"]));

        let summary = run_continuous(&config, &engine, &storage, &SearchFilters::default())
            .await
            .unwrap();

        assert_eq!(summary.reason, StopReason::Exhausted);
        assert_eq!(summary.rounds, 2);
        assert_eq!(storage.load_prospects().await.unwrap().len(), 2);
        assert_eq!(storage.recent_searches(10).await.unwrap().len(), 1);
        // Both rounds were charged, including the empty one.
        assert_eq!(storage.load_quota(100).await.unwrap().used, 2);
    }

    #[tokio::test]
    async fn test_quota_exhaustion_stops_loop() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());
        let config = config(2);
        let engine = engine(&config, StaticProvider::fresh(2));

        let summary = run_continuous(&config, &engine, &storage, &SearchFilters::default())
            .await
            .unwrap();

        assert_eq!(summary.reason, StopReason::Cancelled);
        assert_eq!(summary.rounds, 2);
        assert_eq!(summary.delivered, 4);
        assert_eq!(storage.load_quota(2).await.unwrap().used, 2);

        let err = run_continuous(&config, &engine, &storage, &SearchFilters::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::QuotaExhausted { .. }));
    }
}
