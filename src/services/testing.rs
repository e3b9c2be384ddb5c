// src/services/testing.rs

//! Test doubles for the provider and analyzer boundaries.

use std::collections::HashSet;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use crate::error::{AppError, Result};
use crate::models::{Classification, Contact};
use crate::services::analyzer::Analyzer;
use crate::services::search::SearchProvider;

type Hook = Box<dyn Fn(usize) + Send + Sync>;

/// Provider returning the same URL list for every query, or a fresh
/// batch per call when built with `fresh`.
pub struct StaticProvider {
    urls: Vec<String>,
    fresh_per_call: Option<usize>,
    failing_on: Option<String>,
    calls: AtomicUsize,
    queries: Mutex<Vec<String>>,
    on_search: Option<Hook>,
}

impl StaticProvider {
    pub fn new(urls: &[&str]) -> Self {
        Self {
            urls: urls.iter().map(|u| u.to_string()).collect(),
            fresh_per_call: None,
            failing_on: None,
            calls: AtomicUsize::new(0),
            queries: Mutex::new(Vec::new()),
            on_search: None,
        }
    }

    /// `per_call` never-seen URLs on every call.
    pub fn fresh(per_call: usize) -> Self {
        Self {
            fresh_per_call: Some(per_call),
            ..Self::new(&[])
        }
    }

    /// Fail every query containing `fragment`.
    pub fn failing_on(mut self, fragment: &str) -> Self {
        self.failing_on = Some(fragment.to_string());
        self
    }

    /// Run `hook` with the 1-based call number on every search.
    pub fn on_search(mut self, hook: impl Fn(usize) + Send + Sync + 'static) -> Self {
        self.on_search = Some(Box::new(hook));
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl SearchProvider for StaticProvider {
    fn name(&self) -> &str {
        "static"
    }

    async fn search(&self, query: &str) -> Result<Vec<String>> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        self.queries.lock().unwrap().push(query.to_string());
        if let Some(hook) = &self.on_search {
            hook(call);
        }

        match &self.failing_on {
            Some(fragment) if query.contains(fragment.as_str()) => {
                Err(AppError::provider(query, "HTTP 403"))
            }
            _ => Ok(match self.fresh_per_call {
                Some(n) => (0..n)
                    .map(|i| format!("https://call{call}-site{i}.fr"))
                    .collect(),
                None => self.urls.clone(),
            }),
        }
    }
}

/// Analyzer assigning ages from a fixed script, in call order.
pub struct ScriptedAnalyzer {
    ages: Vec<u32>,
    failing: HashSet<String>,
    calls: AtomicUsize,
}

impl ScriptedAnalyzer {
    pub fn new(ages: &[u32]) -> Self {
        Self {
            ages: ages.to_vec(),
            failing: HashSet::new(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing_for(mut self, url: &str) -> Self {
        self.failing.insert(url.to_string());
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Analyzer for ScriptedAnalyzer {
    async fn analyze(&self, url: &str) -> Result<Classification> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.contains(url) {
            return Err(AppError::analysis(url, "connection reset"));
        }

        let age = self.ages[call % self.ages.len()];
        Ok(Classification {
            name: format!("Site {call}"),
            description: "Test site".to_string(),
            contact: Contact {
                email: "contact@test.fr".to_string(),
                phone: None,
                address: String::new(),
            },
            website_age: age,
            design_score: 5,
            technical_issues: vec!["Poor SEO".to_string()],
        })
    }
}

/// Serve one canned HTTP response on a local port and return its base URL.
pub async fn serve_once(response: impl Into<String>) -> String {
    let response = response.into();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        if let Ok((mut socket, _)) = listener.accept().await {
            let mut buf = [0u8; 4096];
            let _ = socket.read(&mut buf).await;
            let _ = socket.write_all(response.as_bytes()).await;
            let _ = socket.shutdown().await;
        }
    });
    format!("http://{addr}/")
}

/// Address nothing listens on.
pub const UNREACHABLE: &str = "http://127.0.0.1:1/";

pub const NOT_FOUND: &str =
    "HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n";
