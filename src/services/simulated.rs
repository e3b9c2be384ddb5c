// src/services/simulated.rs

//! Randomized stand-in analyzer.
//!
//! Produces plausible classifications without touching the network. Used by
//! `--simulate` demos and by tests that need many prospects quickly.

use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::seq::{IndexedRandom, SliceRandom};
use rand::{Rng, SeedableRng};
use url::Url;

use crate::error::{AppError, Result};
use crate::models::{Classification, Contact, MAX_DESIGN_SCORE, MAX_TECHNICAL_ISSUES};
use crate::services::analyzer::{Analyzer, TechnicalIssue};
use crate::utils::business_name_from_host;

const PHONE_NUMBERS: [&str; 5] = [
    "01 42 85 67 43",
    "04 72 33 45 67",
    "05 56 78 90 12",
    "04 67 89 01 23",
    "03 20 45 67 89",
];

const ADDRESSES: [&str; 5] = [
    "15 rue de la République, 75001 Paris",
    "28 avenue Victor Hugo, 69002 Lyon",
    "42 place de la Mairie, 33000 Bordeaux",
    "7 boulevard des Arts, 34000 Montpellier",
    "123 rue du Commerce, 59000 Lille",
];

/// Probability that a generated contact carries a phone number.
const PHONE_PROBABILITY: f64 = 0.7;

/// Analyzer that invents a classification for any well-formed URL.
pub struct RandomAnalyzer {
    rng: Mutex<StdRng>,
    latency: Duration,
}

impl RandomAnalyzer {
    pub fn new(latency: Duration) -> Self {
        Self {
            rng: Mutex::new(StdRng::from_os_rng()),
            latency,
        }
    }

    /// Deterministic analyzer for reproducible runs.
    pub fn with_seed(seed: u64, latency: Duration) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
            latency,
        }
    }

    fn rng(&self) -> MutexGuard<'_, StdRng> {
        self.rng.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn classify(&self, host: &str) -> Classification {
        let mut rng = self.rng();

        let website_age: u32 = rng.random_range(3..=17);
        let bonus: i32 = rng.random_range(0..=2);
        let design_score = (10 - (website_age / 2) as i32 + bonus)
            .clamp(1, i32::from(MAX_DESIGN_SCORE)) as u8;

        let issue_count = ((website_age / 3) as usize + usize::from(10 - design_score) / 2)
            .min(MAX_TECHNICAL_ISSUES);
        let mut catalog = TechnicalIssue::ALL;
        catalog.shuffle(&mut *rng);
        let technical_issues = catalog[..issue_count]
            .iter()
            .map(|issue| issue.label().to_string())
            .collect();

        let name = business_name_from_host(host);
        let description = describe(&name, rng.random_range(0..4));

        let phone = rng
            .random_bool(PHONE_PROBABILITY)
            .then(|| PHONE_NUMBERS.choose(&mut *rng).map(|p| p.to_string()))
            .flatten();
        let address = ADDRESSES
            .choose(&mut *rng)
            .map(|a| a.to_string())
            .unwrap_or_default();

        Classification {
            name,
            description,
            contact: Contact {
                email: format!("contact@{host}"),
                phone,
                address,
            },
            website_age,
            design_score,
            technical_issues,
        }
    }
}

fn describe(name: &str, template: usize) -> String {
    match template {
        0 => format!("{name} est une entreprise locale proposant des services de qualité à sa communauté."),
        1 => format!("Établissement {name} offrant une expertise reconnue dans son domaine d'activité."),
        2 => format!("{name} accompagne ses clients avec professionnalisme et proximité depuis plusieurs années."),
        _ => format!("Structure {name} dédiée à fournir des solutions adaptées aux besoins locaux."),
    }
}

#[async_trait]
impl Analyzer for RandomAnalyzer {
    async fn analyze(&self, url: &str) -> Result<Classification> {
        let parsed = Url::parse(url).map_err(|e| AppError::analysis(url, e))?;
        let host = parsed
            .host_str()
            .ok_or_else(|| AppError::analysis(url, "URL has no host"))?;

        // The rng guard is dropped before the await.
        let classification = self.classify(host);
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        Ok(classification)
    }
}
