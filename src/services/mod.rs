//! Service layer for the prospector application.
//!
//! This module contains the discovery logic:
//! - Query planning (`QueryPlanner`)
//! - Candidate search (`SearchProvider`, `CandidateSource`)
//! - Website analysis (`Analyzer`, `HttpAnalyzer`)
//! - Deduplication (`VisitedSet`)
//! - Discovery calls and continuous mode (`DiscoveryOrchestrator`, `DiscoveryEngine`)

mod analyzer;
mod dedup;
mod engine;
mod orchestrator;
mod planner;
mod search;
#[cfg(any(test, feature = "simulate"))]
mod simulated;
#[cfg(test)]
pub(crate) mod testing;

pub use analyzer::{Analyzer, HttpAnalyzer, PageSnapshot, TechnicalIssue};
pub use dedup::VisitedSet;
pub use engine::{
    BatchSink, ContinuousSummary, ControllerState, DiscoveryEngine, StopHandle, StopReason,
};
pub use orchestrator::{DiscoveryOrchestrator, DiscoveryOutcome};
pub use planner::QueryPlanner;
pub use search::{
    CandidateSource, DuckDuckGoProvider, GoogleSearchProvider, SearchProvider, create_provider,
};
#[cfg(any(test, feature = "simulate"))]
pub use simulated::RandomAnalyzer;
