// src/models/prospect.rs

//! Prospect data structures.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;

/// Highest design score an analyzer may report.
pub const MAX_DESIGN_SCORE: u8 = 10;

/// Most technical issues kept per site.
pub const MAX_TECHNICAL_ISSUES: usize = 6;

/// Outreach status of a prospect.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProspectStatus {
    #[default]
    New,
    Contacted,
    Interested,
    Rejected,
    Converted,
}

impl ProspectStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ProspectStatus::New => "new",
            ProspectStatus::Contacted => "contacted",
            ProspectStatus::Interested => "interested",
            ProspectStatus::Rejected => "rejected",
            ProspectStatus::Converted => "converted",
        }
    }
}

impl fmt::Display for ProspectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProspectStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "new" => Ok(ProspectStatus::New),
            "contacted" => Ok(ProspectStatus::Contacted),
            "interested" => Ok(ProspectStatus::Interested),
            "rejected" => Ok(ProspectStatus::Rejected),
            "converted" => Ok(ProspectStatus::Converted),
            other => Err(AppError::validation(format!("unknown status '{other}'"))),
        }
    }
}

/// Contact details found on a website.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub email: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    #[serde(default)]
    pub address: String,
}

/// What an analyzer reports about one website.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    /// Business name
    pub name: String,

    /// Short description of the business
    pub description: String,

    pub contact: Contact,

    /// Estimated age of the site in years
    pub website_age: u32,

    /// 1 (poor) to 10 (modern)
    pub design_score: u8,

    /// Short issue labels, at most six
    pub technical_issues: Vec<String>,
}

/// A classified candidate site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prospect {
    pub id: Uuid,

    pub name: String,

    pub description: String,

    /// Site URL, the natural key for storage
    pub website: String,

    pub website_age: u32,

    pub sector: String,

    pub region: String,

    pub contact: Contact,

    #[serde(default)]
    pub technical_issues: Vec<String>,

    pub design_score: u8,

    #[serde(default)]
    pub status: ProspectStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_contact: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    pub created_at: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Prospect {
    /// Build a fresh `new` prospect from an analyzer classification.
    ///
    /// The design score is clamped to 1..=10 and the issue list is cut to six
    /// entries so downstream consumers can rely on those bounds.
    pub fn from_classification(
        website: impl Into<String>,
        sector: impl Into<String>,
        region: impl Into<String>,
        classification: Classification,
    ) -> Self {
        let mut technical_issues = classification.technical_issues;
        technical_issues.truncate(MAX_TECHNICAL_ISSUES);

        Self {
            id: Uuid::new_v4(),
            name: classification.name,
            description: classification.description,
            website: website.into(),
            website_age: classification.website_age,
            sector: sector.into(),
            region: region.into(),
            contact: classification.contact,
            technical_issues,
            design_score: classification.design_score.clamp(1, MAX_DESIGN_SCORE),
            status: ProspectStatus::New,
            last_contact: None,
            notes: None,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    /// Format prospect for display using a template.
    ///
    /// Supported placeholders:
    /// - `{name}`, `{website}`, `{sector}`, `{region}`, `{status}`
    /// - `{age}`, `{score}`, `{email}`, `{issues}`
    pub fn format(&self, template: &str) -> String {
        template
            .replace("{name}", &self.name)
            .replace("{website}", &self.website)
            .replace("{sector}", &self.sector)
            .replace("{region}", &self.region)
            .replace("{status}", self.status.as_str())
            .replace("{age}", &self.website_age.to_string())
            .replace("{score}", &self.design_score.to_string())
            .replace("{email}", &self.contact.email)
            .replace("{issues}", &self.technical_issues.join(", "))
    }
}
