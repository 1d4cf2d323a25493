use std::time::Duration;

use anyhow::{Context, Result};
use once_cell::sync::OnceCell;
use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};

const FEED_TIMEOUT: Duration = Duration::from_secs(10);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(4);

static FEED_CLIENT: OnceCell<Client> = OnceCell::new();

/// Shared blocking client for the fixtures feeds. Built on first use.
pub fn feed_client() -> Result<&'static Client> {
    FEED_CLIENT.get_or_try_init(|| {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        Client::builder()
            .timeout(FEED_TIMEOUT)
            .connect_timeout(CONNECT_TIMEOUT)
            .user_agent(concat!("hurling_hub/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .build()
            .context("building feed client")
    })
}
