// src/models/filters.rs

//! Search filter types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Wildcard value for the sector and region filters.
pub const ALL: &str = "all";

/// Website age bucket requested by the user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AgeFilter {
    #[default]
    All,
    /// 8 years or more
    VeryOld,
    /// 5 to 7 years
    Old,
    /// 3 to 4 years
    Outdated,
}

impl AgeFilter {
    /// Whether a site of the given age falls in this bucket.
    pub fn matches(self, age: u32) -> bool {
        match self {
            AgeFilter::All => true,
            AgeFilter::VeryOld => age >= 8,
            AgeFilter::Old => (5..8).contains(&age),
            AgeFilter::Outdated => (3..5).contains(&age),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AgeFilter::All => "all",
            AgeFilter::VeryOld => "very-old",
            AgeFilter::Old => "old",
            AgeFilter::Outdated => "outdated",
        }
    }
}

impl fmt::Display for AgeFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AgeFilter {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" => Ok(AgeFilter::All),
            "very-old" => Ok(AgeFilter::VeryOld),
            "old" => Ok(AgeFilter::Old),
            "outdated" => Ok(AgeFilter::Outdated),
            other => Err(AppError::validation(format!(
                "unknown website age filter '{other}' (expected all, very-old, old, outdated)"
            ))),
        }
    }
}

/// Input selector for one discovery call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchFilters {
    /// "all" or a sector key
    pub sector: String,

    /// "all" or a region key
    pub region: String,

    #[serde(default)]
    pub website_age: AgeFilter,

    /// Free text appended to every query
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
}

impl SearchFilters {
    pub fn new(sector: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            sector: sector.into(),
            region: region.into(),
            website_age: AgeFilter::All,
            query: None,
        }
    }

    pub fn with_age(mut self, website_age: AgeFilter) -> Self {
        self.website_age = website_age;
        self
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    /// The free-text query, if it has any content.
    pub fn free_text(&self) -> Option<&str> {
        self.query
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
    }
}

impl Default for SearchFilters {
    fn default() -> Self {
        Self::new(ALL, ALL)
    }
}
