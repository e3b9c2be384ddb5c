//! Storage abstractions for prospect persistence.
//!
//! Prospects are keyed by website: writing a site that is already stored
//! refreshes its classification but keeps the outreach fields (id, status,
//! notes, last contact) that the user owns.
//!
//! ## Directory Structure
//!
//! ```text
//! storage/
//! ├── config.toml      # Optional configuration
//! ├── prospects.json   # All known prospects, newest first
//! ├── history.json     # Recorded searches, newest first
//! └── quota.json       # Daily search quota counter
//! ```

pub mod local;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Result;
use crate::models::{Prospect, ProspectStatus, QuotaState, SearchHistoryEntry};

// Re-export for convenience
pub use local::LocalStorage;

/// Number of history entries listed by default.
pub const DEFAULT_HISTORY_LIMIT: usize = 10;

/// Result of an upsert.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpsertSummary {
    pub inserted: usize,
    pub updated: usize,
}

/// Contents of prospects.json.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProspectsData {
    /// ISO 8601 timestamp of last update
    pub updated_at: DateTime<Utc>,
    /// Total prospect count
    pub count: usize,
    /// The prospects, newest first
    pub prospects: Vec<Prospect>,
}

impl ProspectsData {
    pub fn new(prospects: Vec<Prospect>) -> Self {
        Self {
            updated_at: Utc::now(),
            count: prospects.len(),
            prospects,
        }
    }
}

/// Trait for prospect storage backends.
#[async_trait]
pub trait ProspectStore: Send + Sync {
    /// Insert or refresh prospects keyed by website.
    async fn upsert_prospects(&self, prospects: &[Prospect]) -> Result<UpsertSummary>;

    /// All stored prospects, newest first.
    async fn load_prospects(&self) -> Result<Vec<Prospect>>;

    /// Change a prospect's outreach status. Returns false if the id is unknown.
    async fn update_status(&self, id: Uuid, status: ProspectStatus) -> Result<bool>;

    async fn website_exists(&self, website: &str) -> Result<bool>;

    async fn record_search(&self, entry: &SearchHistoryEntry) -> Result<()>;

    /// Most recent searches, newest first.
    async fn recent_searches(&self, limit: usize) -> Result<Vec<SearchHistoryEntry>>;
}

/// Persistence for the daily quota counter.
#[async_trait]
pub trait QuotaStore: Send + Sync {
    /// Today's counter, rolled over if the stored day is stale.
    async fn load_quota(&self, daily_limit: u32) -> Result<QuotaState>;

    async fn save_quota(&self, quota: &QuotaState) -> Result<()>;
}
