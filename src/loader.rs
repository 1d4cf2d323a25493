use std::fs;
use std::path::Path;
use std::thread;
use std::time::{Duration, SystemTime};

use anyhow::{Context, Result, anyhow};
use tracing::{info, warn};

use crate::config::Config;
use crate::feed::{FeedDocument, merge_overlay, parse_feed_json, parse_knockout_json};
use crate::http_cache::{cached_body, fetch_feed};
use crate::http_client::feed_client;
use crate::model::MatchRecord;
use crate::standings::Overrides;

/// Snapshot shipped inside the binary so a first run without network still
/// has something to show.
pub const BOOTSTRAP_JSON: &str = include_str!("../data/bootstrap.json");

const RETRY_BACKOFF_MS: u64 = 400;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSource {
    Live,
    /// Network failed; serving the last body the http cache saw.
    Cache,
    /// Network failed and nothing cached; serving the embedded snapshot.
    Bootstrap,
}

impl DataSource {
    pub fn is_stale(self) -> bool {
        !matches!(self, DataSource::Live)
    }
}

#[derive(Debug, Clone)]
pub struct LoadedData {
    pub matches: Vec<MatchRecord>,
    pub overrides: Overrides,
    pub source: DataSource,
    /// When the served body was fetched, for stale copies.
    pub fetched_at: Option<SystemTime>,
    pub base_count: usize,
    pub knockout_count: usize,
    pub notes: Vec<String>,
}

/// Fetches the base feed and the knockout overlay concurrently, merges them and
/// folds in any local overrides file.
pub fn load_all(config: &Config) -> Result<LoadedData> {
    let (base, knockout) = rayon::join(
        || load_base(config),
        || {
            config
                .knockout_url
                .as_deref()
                .map(|url| fetch_with_retries(url, config.fetch_retries))
        },
    );
    let (doc, source, fetched_at) = base?;
    let mut notes = Vec::new();

    let base_count = doc.matches.len();
    let mut matches = doc.matches;
    let mut knockout_count = 0;
    match knockout {
        Some(Ok(body)) => match parse_knockout_json(&body) {
            Ok(ko) => {
                knockout_count = ko.len();
                matches = merge_overlay(matches, ko);
            }
            Err(err) => {
                warn!("knockout overlay skipped: {err:#}");
                notes.push(format!("Knockout overlay skipped: {err}"));
            }
        },
        Some(Err(err)) => {
            warn!("knockout overlay fetch failed: {err:#}");
            notes.push(format!("Knockout overlay unavailable: {err}"));
        }
        None => {}
    }

    let mut overrides = doc.overrides;
    if let Some(path) = config.overrides_path.as_deref() {
        match load_overrides_file(path) {
            Ok(extra) => overrides.extend(extra),
            Err(err) => {
                warn!("overrides file ignored: {err:#}");
                notes.push(format!("Overrides file ignored: {err}"));
            }
        }
    }

    info!(
        base = base_count,
        knockout = knockout_count,
        total = matches.len(),
        source = ?source,
        "dataset loaded"
    );

    Ok(LoadedData {
        matches,
        overrides,
        source,
        fetched_at,
        base_count,
        knockout_count,
        notes,
    })
}

fn load_base(config: &Config) -> Result<(FeedDocument, DataSource, Option<SystemTime>)> {
    match fetch_with_retries(&config.data_url, config.fetch_retries)
        .and_then(|body| parse_feed_json(&body))
    {
        Ok(doc) => return Ok((doc, DataSource::Live, None)),
        Err(err) => warn!("live fetch failed, trying fallbacks: {err:#}"),
    }

    if let Some(cached) = cached_body(&config.data_url) {
        match parse_feed_json(&cached.body) {
            Ok(doc) => return Ok((doc, DataSource::Cache, cached.fetched_at)),
            Err(err) => warn!("cached body unusable: {err:#}"),
        }
    }

    let doc = parse_feed_json(BOOTSTRAP_JSON).context("embedded snapshot is invalid")?;
    Ok((doc, DataSource::Bootstrap, None))
}

pub fn fetch_with_retries(url: &str, retries: u32) -> Result<String> {
    let client = feed_client()?;
    let mut last_err = None;
    for attempt in 0..=retries {
        if attempt > 0 {
            thread::sleep(Duration::from_millis(RETRY_BACKOFF_MS * u64::from(attempt)));
        }
        match fetch_feed(client, url) {
            Ok(fetched) => {
                if fetched.not_modified {
                    info!(url, "feed unchanged since last fetch");
                }
                return Ok(fetched.body);
            }
            Err(err) => {
                warn!(url, attempt, "fetch failed: {err:#}");
                last_err = Some(err);
            }
        }
    }
    Err(last_err.unwrap_or_else(|| anyhow!("no attempt made for {url}")))
}

pub fn load_overrides_file(path: &Path) -> Result<Overrides> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("read overrides {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parse overrides {}", path.display()))
}

/// Loads a dataset for the command-line tools: a URL goes through the http
/// stack, anything else is read from disk.
pub fn load_document(location: &str, retries: u32) -> Result<FeedDocument> {
    let body = if location.starts_with("http://") || location.starts_with("https://") {
        fetch_with_retries(location, retries)?
    } else {
        fs::read_to_string(location).with_context(|| format!("read {location}"))?
    };
    parse_feed_json(&body)
}
