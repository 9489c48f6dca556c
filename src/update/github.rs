use anyhow::{Context, Result};
use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, USER_AGENT};
use serde::Deserialize;
use std::env;

/// The parts of a GitHub release the updater cares about.
#[derive(Debug, Deserialize)]
pub struct Release {
    #[serde(default)]
    pub assets: Vec<Asset>,
    /// Kept verbatim; the cache marker compares it as plain text.
    pub updated_at: String,
    /// Release notes in markdown.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub body: String,
}

#[derive(Debug, Deserialize)]
pub struct Asset {
    pub name: String,
    pub browser_download_url: String,
}

fn null_as_empty<'de, D>(d: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(d)?.unwrap_or_default())
}

impl Release {
    /// First asset whose name ends with `suffix`.
    pub fn asset_with_suffix(&self, suffix: &str) -> Option<&Asset> {
        self.assets.iter().find(|a| a.name.ends_with(suffix))
    }
}

/// HTTP client for the GitHub release feed and its asset downloads.
///
/// Sends the GitHub JSON accept header and, when `GITHUB_TOKEN` is set,
/// a bearer token to lift the anonymous rate limit. Never hand it to
/// anything that talks to another host.
pub fn github_client() -> Result<Client> {
    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT,
        HeaderValue::from_static("application/vnd.github+json"),
    );
    headers.insert(
        USER_AGENT,
        HeaderValue::from_static(concat!("gbeh/", env!("CARGO_PKG_VERSION"))),
    );
    if let Ok(tok) = env::var("GITHUB_TOKEN") {
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", tok))?,
        );
    }
    let client = Client::builder().default_headers(headers).build()?;
    Ok(client)
}

pub fn fetch_release(client: &Client, url: &str) -> Result<Release> {
    let resp = client
        .get(url)
        .send()
        .and_then(|r| r.error_for_status())
        .context("failed to fetch release information")?;
    let rel: Release = resp.json().context("failed to decode release JSON")?;
    Ok(rel)
}
