// src/models/mod.rs

//! Domain models for the prospector application.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod config;
mod filters;
mod history;
mod prospect;
mod quota;
mod taxonomy;

// Re-export all public types
pub use config::{
    AnalyzerConfig, Config, DiscoveryConfig, ProviderKind, QuotaConfig, SearchConfig,
};
pub use filters::{ALL, AgeFilter, SearchFilters};
pub use history::{DashboardStats, SearchHistoryEntry};
pub use prospect::{
    Classification, Contact, MAX_DESIGN_SCORE, MAX_TECHNICAL_ISSUES, Prospect, ProspectStatus,
};
pub use quota::QuotaState;
pub use taxonomy::{Taxonomy, TermSet};
