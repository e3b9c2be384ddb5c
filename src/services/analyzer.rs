// src/services/analyzer.rs

//! Website analysis.
//!
//! An `Analyzer` turns a candidate URL into a `Classification`: business
//! name, contact details, an estimated site age, a design score and a list
//! of technical issues. `HttpAnalyzer` fetches the page and scores its markup.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::{DateTime, Datelike, Utc};
use regex::Regex;
use reqwest::Client;
use reqwest::header::LAST_MODIFIED;
use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::error::{AppError, Result};
use crate::models::{AnalyzerConfig, Classification, Contact, MAX_DESIGN_SCORE, MAX_TECHNICAL_ISSUES};
use crate::utils::{bare_host, business_name_from_host, http, normalize_whitespace};

/// Ages at or above this many years count as outdated content.
const OUTDATED_AFTER_YEARS: u32 = 3;

/// Copyright years older than this are treated as noise.
const EARLIEST_PLAUSIBLE_YEAR: i32 = 1990;

/// Classifies one candidate website.
///
/// Failures are reported as `AppError::Analysis`; the caller decides whether
/// to skip the URL.
#[async_trait]
pub trait Analyzer: Send + Sync {
    async fn analyze(&self, url: &str) -> Result<Classification>;
}

/// Fixed catalog of technical issue labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TechnicalIssue {
    NonResponsive,
    SlowLoading,
    OutdatedContent,
    MissingSsl,
    OutdatedTechnologies,
    ConfusingNavigation,
    LowQualityImages,
    OutdatedContactInfo,
    NoMobileOptimization,
    Accessibility,
    PoorSeo,
    BrokenForms,
}

impl TechnicalIssue {
    pub const ALL: [TechnicalIssue; 12] = [
        TechnicalIssue::NonResponsive,
        TechnicalIssue::SlowLoading,
        TechnicalIssue::OutdatedContent,
        TechnicalIssue::MissingSsl,
        TechnicalIssue::OutdatedTechnologies,
        TechnicalIssue::ConfusingNavigation,
        TechnicalIssue::LowQualityImages,
        TechnicalIssue::OutdatedContactInfo,
        TechnicalIssue::NoMobileOptimization,
        TechnicalIssue::Accessibility,
        TechnicalIssue::PoorSeo,
        TechnicalIssue::BrokenForms,
    ];

    pub fn label(self) -> &'static str {
        match self {
            TechnicalIssue::NonResponsive => "Non-responsive design",
            TechnicalIssue::SlowLoading => "Slow loading time",
            TechnicalIssue::OutdatedContent => "Outdated content",
            TechnicalIssue::MissingSsl => "Missing SSL certificate",
            TechnicalIssue::OutdatedTechnologies => "Outdated technologies",
            TechnicalIssue::ConfusingNavigation => "Confusing navigation",
            TechnicalIssue::LowQualityImages => "Low-quality images",
            TechnicalIssue::OutdatedContactInfo => "Outdated contact information",
            TechnicalIssue::NoMobileOptimization => "No mobile optimization",
            TechnicalIssue::Accessibility => "Accessibility problems",
            TechnicalIssue::PoorSeo => "Poor SEO",
            TechnicalIssue::BrokenForms => "Broken forms",
        }
    }

    /// Design score penalty for this issue.
    fn penalty(self) -> u32 {
        match self {
            TechnicalIssue::NonResponsive | TechnicalIssue::OutdatedTechnologies => 2,
            _ => 1,
        }
    }
}

/// A fetched page, ready for inspection.
#[derive(Debug, Clone)]
pub struct PageSnapshot {
    pub url: Url,
    pub html: String,
    pub elapsed: Duration,
    pub last_modified_year: Option<i32>,
}

/// Pre-parsed selectors used during inspection.
struct PageSelectors {
    viewport: Selector,
    legacy: Selector,
    nested_table: Selector,
    navigation: Selector,
    image: Selector,
    html_lang: Selector,
    title: Selector,
    meta_description: Selector,
    site_name: Selector,
    form: Selector,
    mailto: Selector,
    tel: Selector,
    address: Selector,
}

impl PageSelectors {
    fn new() -> Result<Self> {
        Ok(Self {
            viewport: http::parse_selector("meta[name=\"viewport\"]")?,
            legacy: http::parse_selector(
                "font, center, marquee, frameset, blink, embed[src$=\".swf\"], object[data$=\".swf\"]",
            )?,
            nested_table: http::parse_selector("table table")?,
            navigation: http::parse_selector("nav, header, [role=\"navigation\"]")?,
            image: http::parse_selector("img")?,
            html_lang: http::parse_selector("html[lang]")?,
            title: http::parse_selector("title")?,
            meta_description: http::parse_selector("meta[name=\"description\"]")?,
            site_name: http::parse_selector("meta[property=\"og:site_name\"]")?,
            form: http::parse_selector("form")?,
            mailto: http::parse_selector("a[href^=\"mailto:\"]")?,
            tel: http::parse_selector("a[href^=\"tel:\"]")?,
            address: http::parse_selector("[itemprop=\"address\"]")?,
        })
    }
}

/// Fetches a page over HTTP and scores its markup.
pub struct HttpAnalyzer {
    client: Client,
    slow_response: Duration,
    selectors: PageSelectors,
    copyright_pattern: Regex,
    email_pattern: Regex,
}

impl HttpAnalyzer {
    pub fn new(config: &AnalyzerConfig) -> Result<Self> {
        let copyright_pattern =
            Regex::new(r"(?i)(?:©|&copy;|copyright)\s*(?:\d{4}\s*[-–]\s*)?((?:19|20)\d{2})")
                .map_err(|e| AppError::config(format!("copyright pattern: {e}")))?;
        let email_pattern = Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}")
            .map_err(|e| AppError::config(format!("email pattern: {e}")))?;

        Ok(Self {
            client: http::create_client(&config.user_agent, config.timeout_secs)?,
            slow_response: Duration::from_millis(config.slow_response_ms),
            selectors: PageSelectors::new()?,
            copyright_pattern,
            email_pattern,
        })
    }

    async fn fetch(&self, url: &Url) -> Result<PageSnapshot> {
        let started = Instant::now();
        let response = self
            .client
            .get(url.as_str())
            .send()
            .await
            .map_err(|e| AppError::analysis(url.as_str(), e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::analysis(url.as_str(), format!("HTTP {status}")));
        }

        let last_modified_year = response
            .headers()
            .get(LAST_MODIFIED)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| DateTime::parse_from_rfc2822(value).ok())
            .map(|date| date.year());

        let html = response
            .text()
            .await
            .map_err(|e| AppError::analysis(url.as_str(), e))?;

        Ok(PageSnapshot {
            url: url.clone(),
            html,
            elapsed: started.elapsed(),
            last_modified_year,
        })
    }

    /// Score a fetched page. Pure: no I/O, `current_year` supplied by the caller.
    pub fn inspect(&self, snapshot: &PageSnapshot, current_year: i32) -> Classification {
        let document = Html::parse_document(&snapshot.html);
        let sel = &self.selectors;
        let host = snapshot.url.host_str().unwrap_or_default();

        let website_age = self
            .copyright_year(&snapshot.html, current_year)
            .or(snapshot.last_modified_year)
            .map(|year| (current_year - year).max(0) as u32)
            .unwrap_or(0);

        let mut issues: Vec<TechnicalIssue> = Vec::new();
        let mut flag = |issue: TechnicalIssue| {
            if !issues.contains(&issue) {
                issues.push(issue);
            }
        };

        match document.select(&sel.viewport).next() {
            None => {
                flag(TechnicalIssue::NonResponsive);
                flag(TechnicalIssue::NoMobileOptimization);
            }
            Some(meta) => {
                let content = meta.value().attr("content").unwrap_or_default();
                if !content.contains("device-width") {
                    flag(TechnicalIssue::NoMobileOptimization);
                }
            }
        }

        if snapshot.elapsed > self.slow_response {
            flag(TechnicalIssue::SlowLoading);
        }
        if snapshot.url.scheme() == "http" {
            flag(TechnicalIssue::MissingSsl);
        }
        if has_any(&document, &sel.legacy) || has_any(&document, &sel.nested_table) {
            flag(TechnicalIssue::OutdatedTechnologies);
        }
        if !has_any(&document, &sel.navigation) {
            flag(TechnicalIssue::ConfusingNavigation);
        }

        let images: Vec<ElementRef> = document.select(&sel.image).collect();
        if images.iter().any(|img| {
            let src = img.value().attr("src").unwrap_or_default().to_lowercase();
            src.ends_with(".gif") || src.ends_with(".bmp")
        }) {
            flag(TechnicalIssue::LowQualityImages);
        }
        if images.iter().any(|img| img.value().attr("alt").is_none())
            || !has_any(&document, &sel.html_lang)
        {
            flag(TechnicalIssue::Accessibility);
        }

        let title = first_text(&document, &sel.title);
        let meta_description = first_attr(&document, &sel.meta_description, "content");
        if title.is_none() || meta_description.is_none() {
            flag(TechnicalIssue::PoorSeo);
        }

        if document.select(&sel.form).any(|form| {
            form.value()
                .attr("action")
                .is_none_or(|action| action.trim().is_empty())
        }) {
            flag(TechnicalIssue::BrokenForms);
        }

        let email_link = first_attr(&document, &sel.mailto, "href");
        let phone_link = first_attr(&document, &sel.tel, "href");
        if email_link.is_none() && phone_link.is_none() {
            flag(TechnicalIssue::OutdatedContactInfo);
        }

        if website_age >= OUTDATED_AFTER_YEARS {
            flag(TechnicalIssue::OutdatedContent);
        }

        let penalty: u32 = issues.iter().map(|issue| issue.penalty()).sum();
        let design_score = (u32::from(MAX_DESIGN_SCORE).saturating_sub(penalty))
            .clamp(1, u32::from(MAX_DESIGN_SCORE)) as u8;

        let name = first_attr(&document, &sel.site_name, "content")
            .or_else(|| title.as_deref().map(title_name))
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| business_name_from_host(host));

        let description = meta_description
            .unwrap_or_else(|| format!("Site internet de {name}, à moderniser."));

        let email = email_link
            .map(|href| strip_scheme(&href, "mailto:"))
            .or_else(|| {
                self.email_pattern
                    .find(&document.root_element().text().collect::<String>())
                    .map(|m| m.as_str().to_string())
            })
            .unwrap_or_else(|| format!("contact@{}", bare_host(host)));

        let contact = Contact {
            email,
            phone: phone_link.map(|href| strip_scheme(&href, "tel:")),
            address: first_text(&document, &sel.address).unwrap_or_default(),
        };

        Classification {
            name,
            description,
            contact,
            website_age,
            design_score,
            technical_issues: issues
                .into_iter()
                .take(MAX_TECHNICAL_ISSUES)
                .map(|issue| issue.label().to_string())
                .collect(),
        }
    }

    /// Latest plausible copyright year found in the markup.
    fn copyright_year(&self, html: &str, current_year: i32) -> Option<i32> {
        self.copyright_pattern
            .captures_iter(html)
            .filter_map(|caps| caps.get(1)?.as_str().parse::<i32>().ok())
            .filter(|year| (EARLIEST_PLAUSIBLE_YEAR..=current_year).contains(year))
            .max()
    }
}

#[async_trait]
impl Analyzer for HttpAnalyzer {
    async fn analyze(&self, url: &str) -> Result<Classification> {
        let parsed = Url::parse(url).map_err(|e| AppError::analysis(url, e))?;
        let snapshot = self.fetch(&parsed).await?;
        log::debug!(
            "Fetched {} in {}ms ({} bytes)",
            url,
            snapshot.elapsed.as_millis(),
            snapshot.html.len()
        );
        Ok(self.inspect(&snapshot, Utc::now().year()))
    }
}

fn has_any(document: &Html, selector: &Selector) -> bool {
    document.select(selector).next().is_some()
}

fn first_text(document: &Html, selector: &Selector) -> Option<String> {
    document
        .select(selector)
        .next()
        .map(|el| normalize_whitespace(&el.text().collect::<String>()))
        .filter(|text| !text.is_empty())
}

fn first_attr(document: &Html, selector: &Selector, attr: &str) -> Option<String> {
    document
        .select(selector)
        .filter_map(|el| el.value().attr(attr))
        .map(|value| value.trim().to_string())
        .find(|value| !value.is_empty())
}

/// Business name from a page title: the part before the first separator.
fn title_name(title: &str) -> String {
    title
        .split(['|', '–', '—'])
        .next()
        .unwrap_or(title)
        .split(" - ")
        .next()
        .unwrap_or(title)
        .trim()
        .to_string()
}

fn strip_scheme(href: &str, scheme: &str) -> String {
    let value = href.strip_prefix(scheme).unwrap_or(href);
    value.split('?').next().unwrap_or(value).trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing::{NOT_FOUND, UNREACHABLE, serve_once};

    const MODERN_PAGE: &str = r#"<!DOCTYPE html>
        <html lang="fr">
        <head>
            <title>Chez Paul | Bistrot à Paris</title>
            <meta name="viewport" content="width=device-width, initial-scale=1">
            <meta name="description" content="Cuisine de saison au cœur de Paris.">
        </head>
        <body>
            <header><nav><a href="/">Accueil</a></nav></header>
            <img src="/salle.webp" alt="La salle">
            <form action="/reservation"><input name="date"></form>
            <footer>
                <a href="mailto:bonjour@chez-paul.fr?subject=Réservation">Écrire</a>
                <a href="tel:+33142000000">Appeler</a>
                <span itemprop="address">12 rue du Bac,
                    75007 Paris</span>
                © 2025 Chez Paul
            </footer>
        </body>
        </html>"#;

    const LEGACY_PAGE: &str = r#"<html>
        <body>
            <center><font face="Comic Sans">Bienvenue au Garage du Centre</font></center>
            <table><tr><td><table><tr><td>Horaires</td></tr></table></td></tr></table>
            <img src="/logo.gif">
            <form><input name="nom"></form>
            <p>Écrivez-nous : garage.centre@orange.fr</p>
            <p>Copyright 2009-2014 Garage du Centre</p>
        </body>
        </html>"#;

    fn analyzer() -> HttpAnalyzer {
        HttpAnalyzer::new(&AnalyzerConfig::default()).unwrap()
    }

    fn snapshot(url: &str, html: &str) -> PageSnapshot {
        PageSnapshot {
            url: Url::parse(url).unwrap(),
            html: html.to_string(),
            elapsed: Duration::from_millis(200),
            last_modified_year: None,
        }
    }

    #[test]
    fn test_catalog_has_twelve_distinct_labels() {
        let labels: std::collections::HashSet<_> =
            TechnicalIssue::ALL.iter().map(|issue| issue.label()).collect();
        assert_eq!(labels.len(), 12);
    }

    #[test]
    fn test_modern_page_scores_well() {
        let result = analyzer().inspect(&snapshot("https://www.chez-paul.fr/", MODERN_PAGE), 2026);

        assert_eq!(result.name, "Chez Paul");
        assert_eq!(result.description, "Cuisine de saison au cœur de Paris.");
        assert_eq!(result.website_age, 1);
        assert_eq!(result.design_score, 10);
        assert!(result.technical_issues.is_empty());
        assert_eq!(result.contact.email, "bonjour@chez-paul.fr");
        assert_eq!(result.contact.phone.as_deref(), Some("+33142000000"));
        assert_eq!(result.contact.address, "12 rue du Bac, 75007 Paris");
    }

    #[test]
    fn test_legacy_page_is_penalized() {
        let result =
            analyzer().inspect(&snapshot("http://garage-du-centre.fr/", LEGACY_PAGE), 2026);

        assert_eq!(result.website_age, 12);
        assert_eq!(result.design_score, 1);
        assert_eq!(result.technical_issues.len(), MAX_TECHNICAL_ISSUES);
        assert_eq!(result.technical_issues[0], "Non-responsive design");
        assert!(result.technical_issues.contains(&"Missing SSL certificate".to_string()));
        assert_eq!(result.name, "Garage Du Centre");
        assert_eq!(result.contact.email, "garage.centre@orange.fr");
        assert_eq!(result.contact.phone, None);
    }

    #[test]
    fn test_age_falls_back_to_last_modified() {
        let html = MODERN_PAGE.replace("© 2025 Chez Paul", "");
        let mut page = snapshot("https://www.chez-paul.fr/", &html);
        page.last_modified_year = Some(2020);
        let result = analyzer().inspect(&page, 2026);
        assert_eq!(result.website_age, 6);
        assert_eq!(result.technical_issues, vec!["Outdated content"]);
        assert_eq!(result.design_score, 9);
    }

    #[test]
    fn test_age_defaults_to_zero() {
        let result = analyzer().inspect(&snapshot("https://a.fr/", "<p>Bonjour</p>"), 2026);
        assert_eq!(result.website_age, 0);
        assert_eq!(result.contact.email, "contact@a.fr");
    }

    #[test]
    fn test_future_copyright_year_ignored() {
        let html = "<p>© 2031 Demain</p><p>© 2018 Hier</p>";
        assert_eq!(analyzer().copyright_year(html, 2026), Some(2018));
    }

    #[test]
    fn test_slow_response_flagged() {
        let mut page = snapshot("https://www.chez-paul.fr/", MODERN_PAGE);
        page.elapsed = Duration::from_secs(10);
        let result = analyzer().inspect(&page, 2026);
        assert_eq!(result.technical_issues, vec!["Slow loading time"]);
        assert_eq!(result.design_score, 9);
    }

    #[test]
    fn test_title_name() {
        assert_eq!(title_name("Chez Paul | Bistrot"), "Chez Paul");
        assert_eq!(title_name("Garage Martin - Mécanique"), "Garage Martin");
        assert_eq!(title_name("Boulangerie"), "Boulangerie");
    }

    #[tokio::test]
    async fn test_invalid_url_is_analysis_error() {
        let err = analyzer().analyze("not a url").await.unwrap_err();
        assert!(matches!(err, AppError::Analysis { .. }));
    }

    #[tokio::test]
    async fn test_unreachable_site_is_analysis_error() {
        let err = analyzer().analyze(UNREACHABLE).await.unwrap_err();
        assert!(matches!(err, AppError::Analysis { ref url, .. } if url == UNREACHABLE));
    }

    #[tokio::test]
    async fn test_error_status_is_analysis_error() {
        let url = serve_once(NOT_FOUND).await;
        let err = analyzer().analyze(&url).await.unwrap_err();
        assert!(matches!(err, AppError::Analysis { ref message, .. } if message.contains("404")));
    }

    #[tokio::test]
    async fn test_analyze_fetches_and_inspects() {
        let response = format!(
            "HTTP/1.1 200 OK\r\nContent-Type: text/html; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            MODERN_PAGE.len(),
            MODERN_PAGE
        );
        let url = serve_once(response).await;
        let result = analyzer().analyze(&url).await.unwrap();

        assert_eq!(result.name, "Chez Paul");
        assert_eq!(result.contact.email, "bonjour@chez-paul.fr");
        assert!(
            result
                .technical_issues
                .contains(&TechnicalIssue::MissingSsl.label().to_string())
        );
    }
}
