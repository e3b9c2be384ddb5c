// src/models/history.rs

//! Search history and dashboard statistics.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{Prospect, ProspectStatus, SearchFilters};

/// A recorded search call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHistoryEntry {
    pub id: Uuid,

    /// Free-text query ("" for a plain filter search)
    pub query: String,

    pub filters: SearchFilters,

    pub results_count: usize,

    pub created_at: DateTime<Utc>,
}

impl SearchHistoryEntry {
    pub fn new(filters: &SearchFilters, results_count: usize) -> Self {
        Self {
            id: Uuid::new_v4(),
            query: filters.free_text().unwrap_or_default().to_string(),
            filters: filters.clone(),
            results_count,
            created_at: Utc::now(),
        }
    }
}

/// Outreach totals over a set of prospects.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DashboardStats {
    pub total: usize,
    pub new: usize,
    pub contacted: usize,
    pub interested: usize,
    pub rejected: usize,
    pub converted: usize,
    /// Converted over contacted, in percent
    pub conversion_rate: f64,
}

impl DashboardStats {
    pub fn from_prospects(prospects: &[Prospect]) -> Self {
        let count = |status: ProspectStatus| prospects.iter().filter(|p| p.status == status).count();

        let contacted = count(ProspectStatus::Contacted);
        let converted = count(ProspectStatus::Converted);
        let conversion_rate = if contacted > 0 {
            converted as f64 / contacted as f64 * 100.0
        } else {
            0.0
        };

        Self {
            total: prospects.len(),
            new: count(ProspectStatus::New),
            contacted,
            interested: count(ProspectStatus::Interested),
            rejected: count(ProspectStatus::Rejected),
            converted,
            conversion_rate,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AgeFilter, Classification, Contact};

    fn prospect_with(status: ProspectStatus) -> Prospect {
        let mut prospect = Prospect::from_classification(
            "https://example.fr",
            "commerce",
            "bretagne",
            Classification {
                name: "Example".into(),
                description: String::new(),
                contact: Contact::default(),
                website_age: 4,
                design_score: 5,
                technical_issues: vec![],
            },
        );
        prospect.status = status;
        prospect
    }

    #[test]
    fn test_history_entry_uses_free_text() {
        let filters = SearchFilters::new("restaurant", "all")
            .with_age(AgeFilter::Old)
            .with_query("terrasse");
        let entry = SearchHistoryEntry::new(&filters, 12);
        assert_eq!(entry.query, "terrasse");
        assert_eq!(entry.results_count, 12);

        let plain = SearchHistoryEntry::new(&SearchFilters::default(), 0);
        assert_eq!(plain.query, "");
    }

    #[test]
    fn test_stats_conversion_rate() {
        let prospects = vec![
            prospect_with(ProspectStatus::New),
            prospect_with(ProspectStatus::Contacted),
            prospect_with(ProspectStatus::Contacted),
            prospect_with(ProspectStatus::Converted),
        ];
        let stats = DashboardStats::from_prospects(&prospects);
        assert_eq!(stats.total, 4);
        assert_eq!(stats.new, 1);
        assert_eq!(stats.contacted, 2);
        assert!((stats.conversion_rate - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_stats_empty() {
        let stats = DashboardStats::from_prospects(&[]);
        assert_eq!(stats.total, 0);
        assert_eq!(stats.conversion_rate, 0.0);
    }
}
