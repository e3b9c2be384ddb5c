//! Local filesystem storage implementation.
//!
//! Keeps prospects, search history and the quota counter as JSON files under
//! one root directory. Every file is written atomically (temp file, then
//! rename), and read-modify-write cycles are serialized by an async lock.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde::{Serialize, de::DeserializeOwned};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::{Prospect, ProspectStatus, QuotaState, SearchHistoryEntry};
use crate::storage::{ProspectStore, ProspectsData, QuotaStore, UpsertSummary};

const PROSPECTS_FILE: &str = "prospects.json";
const HISTORY_FILE: &str = "history.json";
const QUOTA_FILE: &str = "quota.json";

/// History entries kept on disk.
const HISTORY_RETENTION: usize = 200;

/// Local filesystem storage backend.
#[derive(Clone)]
pub struct LocalStorage {
    root_dir: PathBuf,
    write_lock: Arc<Mutex<()>>,
}

impl LocalStorage {
    /// Create a new LocalStorage rooted at the given directory.
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Get the full path for a relative key.
    fn path(&self, key: &str) -> PathBuf {
        self.root_dir.join(key)
    }

    /// Ensure parent directory exists.
    async fn ensure_dir(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        Ok(())
    }

    /// Write bytes atomically (write to temp, then rename).
    async fn write_bytes(&self, key: &str, bytes: &[u8]) -> Result<()> {
        let path = self.path(key);
        self.ensure_dir(&path).await?;

        let tmp = path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }

    /// Write JSON data.
    async fn write_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(value)?;
        self.write_bytes(key, &bytes).await
    }

    /// Read bytes, returning None if file doesn't exist.
    async fn read_bytes(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.path(key);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Io(e)),
        }
    }

    /// Read JSON data.
    async fn read_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.read_bytes(key).await? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    async fn read_prospects(&self) -> Result<Vec<Prospect>> {
        Ok(self
            .read_json::<ProspectsData>(PROSPECTS_FILE)
            .await?
            .map(|data| data.prospects)
            .unwrap_or_default())
    }

    async fn write_prospects(&self, mut prospects: Vec<Prospect>) -> Result<()> {
        prospects.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        self.write_json(PROSPECTS_FILE, &ProspectsData::new(prospects))
            .await
    }
}

/// Refresh the classification fields of `stored` from `fresh`.
fn refresh(stored: &mut Prospect, fresh: &Prospect) {
    stored.name = fresh.name.clone();
    stored.description = fresh.description.clone();
    stored.website_age = fresh.website_age;
    stored.sector = fresh.sector.clone();
    stored.region = fresh.region.clone();
    stored.contact = fresh.contact.clone();
    stored.technical_issues = fresh.technical_issues.clone();
    stored.design_score = fresh.design_score;
    stored.updated_at = Some(Utc::now());
}

#[async_trait]
impl ProspectStore for LocalStorage {
    async fn upsert_prospects(&self, prospects: &[Prospect]) -> Result<UpsertSummary> {
        let _guard = self.write_lock.lock().await;

        let mut stored = self.read_prospects().await?;
        let mut by_website: HashMap<String, usize> = stored
            .iter()
            .enumerate()
            .map(|(i, p)| (p.website.clone(), i))
            .collect();

        let mut summary = UpsertSummary::default();
        for prospect in prospects {
            match by_website.get(&prospect.website) {
                Some(&index) => {
                    refresh(&mut stored[index], prospect);
                    summary.updated += 1;
                }
                None => {
                    by_website.insert(prospect.website.clone(), stored.len());
                    stored.push(prospect.clone());
                    summary.inserted += 1;
                }
            }
        }

        self.write_prospects(stored).await?;
        log::debug!(
            "Upserted prospects: {} inserted, {} updated",
            summary.inserted,
            summary.updated
        );
        Ok(summary)
    }

    async fn load_prospects(&self) -> Result<Vec<Prospect>> {
        let mut prospects = self.read_prospects().await?;
        prospects.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(prospects)
    }

    async fn update_status(&self, id: Uuid, status: ProspectStatus) -> Result<bool> {
        let _guard = self.write_lock.lock().await;

        let mut prospects = self.read_prospects().await?;
        let Some(prospect) = prospects.iter_mut().find(|p| p.id == id) else {
            return Ok(false);
        };

        let now = Utc::now();
        if status == ProspectStatus::Contacted && prospect.status != ProspectStatus::Contacted {
            prospect.last_contact = Some(now);
        }
        prospect.status = status;
        prospect.updated_at = Some(now);

        self.write_prospects(prospects).await?;
        Ok(true)
    }

    async fn website_exists(&self, website: &str) -> Result<bool> {
        Ok(self
            .read_prospects()
            .await?
            .iter()
            .any(|p| p.website == website))
    }

    async fn record_search(&self, entry: &SearchHistoryEntry) -> Result<()> {
        let _guard = self.write_lock.lock().await;

        let mut history: Vec<SearchHistoryEntry> =
            self.read_json(HISTORY_FILE).await?.unwrap_or_default();
        history.insert(0, entry.clone());
        history.truncate(HISTORY_RETENTION);
        self.write_json(HISTORY_FILE, &history).await
    }

    async fn recent_searches(&self, limit: usize) -> Result<Vec<SearchHistoryEntry>> {
        let mut history: Vec<SearchHistoryEntry> =
            self.read_json(HISTORY_FILE).await?.unwrap_or_default();
        history.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        history.truncate(limit);
        Ok(history)
    }
}

#[async_trait]
impl QuotaStore for LocalStorage {
    /// The configured limit always replaces the stored one.
    async fn load_quota(&self, daily_limit: u32) -> Result<QuotaState> {
        let today = Utc::now().date_naive();
        let mut quota = match self.read_json::<QuotaState>(QUOTA_FILE).await? {
            Some(stored) => stored,
            None => QuotaState::for_date(today, daily_limit),
        };
        if quota.roll_over(today) {
            log::info!("Quota counter reset for {}", today);
        }
        quota.daily_limit = daily_limit;
        Ok(quota)
    }

    async fn save_quota(&self, quota: &QuotaState) -> Result<()> {
        self.write_json(QUOTA_FILE, quota).await
    }
}
