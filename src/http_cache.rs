//! On-disk copy of every feed body, used for conditional requests and as the
//! stale fallback when the network is down.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result, bail};
use reqwest::StatusCode;
use reqwest::blocking::{Client, Response};
use reqwest::header::{
    CACHE_CONTROL, ETAG, HeaderName, IF_MODIFIED_SINCE, IF_NONE_MATCH, LAST_MODIFIED,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

const APP_DIR: &str = "hurling_hub";
const FEED_CACHE_FILE: &str = "feed_cache.json";
const FEED_CACHE_VERSION: u32 = 2;

static FEED_CACHE: Mutex<Option<FeedCache>> = Mutex::new(None);

#[derive(Debug, Default, Serialize, Deserialize)]
struct FeedCache {
    version: u32,
    feeds: HashMap<String, StoredFeed>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredFeed {
    body: String,
    etag: Option<String>,
    last_modified: Option<String>,
    /// Unix seconds of the last 200 or 304.
    checked_at: u64,
}

impl StoredFeed {
    fn from_response(resp: Response, checked_at: u64) -> Result<Self> {
        let validator = |resp: &Response, name: HeaderName| {
            resp.headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_owned)
        };
        let etag = validator(&resp, ETAG);
        let last_modified = validator(&resp, LAST_MODIFIED);
        let body = resp.text().context("reading feed body")?;
        Ok(Self {
            body,
            etag,
            last_modified,
            checked_at,
        })
    }
}

/// Body returned by [`fetch_feed`].
#[derive(Debug, Clone)]
pub struct FeedBody {
    pub body: String,
    /// The server answered 304 and the stored copy was reused.
    pub not_modified: bool,
}

/// A stored body read without touching the network.
#[derive(Debug, Clone)]
pub struct CachedBody {
    pub body: String,
    pub fetched_at: Option<SystemTime>,
}

impl FeedCache {
    fn load() -> Self {
        let parsed = feed_cache_path()
            .and_then(|path| fs::read_to_string(path).ok())
            .and_then(|raw| serde_json::from_str::<FeedCache>(&raw).ok());
        match parsed {
            Some(cache) if cache.version == FEED_CACHE_VERSION => cache,
            _ => FeedCache {
                version: FEED_CACHE_VERSION,
                feeds: HashMap::new(),
            },
        }
    }

    fn save(&self) -> Result<()> {
        let Some(path) = feed_cache_path() else {
            return Ok(());
        };
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).context("creating cache directory")?;
        }
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_vec(self)?).context("writing feed cache")?;
        fs::rename(&tmp, &path).context("replacing feed cache")?;
        Ok(())
    }
}

fn with_cache<T>(f: impl FnOnce(&mut FeedCache) -> T) -> T {
    let mut guard = FEED_CACHE.lock().expect("feed cache lock poisoned");
    f(guard.get_or_insert_with(FeedCache::load))
}

fn remember(url: &str, feed: StoredFeed) {
    with_cache(|cache| {
        cache.feeds.insert(url.to_string(), feed);
        if let Err(err) = cache.save() {
            warn!("feed cache not saved: {err:#}");
        }
    });
}

/// GETs `url` with the stored validators. A 304 reuses the stored body.
pub fn fetch_feed(client: &Client, url: &str) -> Result<FeedBody> {
    let stored = with_cache(|cache| cache.feeds.get(url).cloned());

    let mut req = client.get(url).header(CACHE_CONTROL, "no-cache");
    if let Some(feed) = &stored {
        if let Some(etag) = &feed.etag {
            req = req.header(IF_NONE_MATCH, etag);
        }
        if let Some(modified) = &feed.last_modified {
            req = req.header(IF_MODIFIED_SINCE, modified);
        }
    }
    let resp = req.send().with_context(|| format!("GET {url}"))?;

    match resp.status() {
        StatusCode::NOT_MODIFIED => {
            let Some(mut feed) = stored else {
                bail!("{url} answered 304 but nothing is stored");
            };
            debug!(url, "feed not modified");
            feed.checked_at = unix_now();
            let body = feed.body.clone();
            remember(url, feed);
            Ok(FeedBody {
                body,
                not_modified: true,
            })
        }
        status if status.is_success() => {
            let feed = StoredFeed::from_response(resp, unix_now())?;
            let body = feed.body.clone();
            remember(url, feed);
            Ok(FeedBody {
                body,
                not_modified: false,
            })
        }
        status => bail!("{url} answered {status}"),
    }
}

/// Last body stored for `url`, however old.
pub fn cached_body(url: &str) -> Option<CachedBody> {
    with_cache(|cache| {
        cache.feeds.get(url).map(|feed| CachedBody {
            body: feed.body.clone(),
            fetched_at: UNIX_EPOCH.checked_add(Duration::from_secs(feed.checked_at)),
        })
    })
}

/// `$XDG_CACHE_HOME/hurling_hub`, else `~/.cache/hurling_hub`.
pub fn app_cache_dir() -> Option<PathBuf> {
    let non_empty = |key: &str| std::env::var(key).ok().filter(|v| !v.trim().is_empty());
    if let Some(base) = non_empty("XDG_CACHE_HOME") {
        return Some(PathBuf::from(base).join(APP_DIR));
    }
    non_empty("HOME").map(|home| PathBuf::from(home).join(".cache").join(APP_DIR))
}

fn feed_cache_path() -> Option<PathBuf> {
    app_cache_dir().map(|dir| dir.join(FEED_CACHE_FILE))
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}
