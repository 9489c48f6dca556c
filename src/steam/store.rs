use anyhow::{Context, Result, anyhow};
use regex::Regex;
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use serde::Deserialize;
use std::collections::{BTreeSet, HashMap};

/// Plain HTTP client for the storefront: a user agent and nothing else.
pub fn store_client() -> Result<Client> {
    let mut headers = HeaderMap::new();
    headers.insert(
        USER_AGENT,
        HeaderValue::from_static(concat!("gbeh/", env!("CARGO_PKG_VERSION"))),
    );
    let client = Client::builder().default_headers(headers).build()?;
    Ok(client)
}

/// Minimal Steam storefront client: app names and DLC ids.
pub struct StoreClient<'a> {
    client: &'a Client,
    api_url: String,
    store_url: String,
}

#[derive(Debug, Deserialize)]
struct AppDetails {
    #[serde(default)]
    data: Option<AppData>,
}

#[derive(Debug, Deserialize)]
struct AppData {
    name: String,
}

impl<'a> StoreClient<'a> {
    pub fn new(client: &'a Client, api_url: &str, store_url: &str) -> Self {
        StoreClient {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
            store_url: store_url.trim_end_matches('/').to_string(),
        }
    }

    /// Display name of `app_id` from the `appdetails` endpoint.
    pub fn app_name(&self, app_id: u32) -> Result<String> {
        let url = format!("{}/appdetails?appids={app_id}&filters=basic", self.api_url);
        let details: HashMap<String, AppDetails> = self
            .client
            .get(&url)
            .send()
            .and_then(|r| r.error_for_status())
            .context("failed to fetch app details")?
            .json()
            .context("failed to decode JSON")?;
        details
            .get(&app_id.to_string())
            .and_then(|d| d.data.as_ref())
            .map(|d| d.name.clone())
            .ok_or_else(|| anyhow!("app details not found for AppID {app_id}"))
    }

    /// Distinct DLC ids the store recommends for `app_id`, ascending.
    pub fn dlc_ids(&self, app_id: u32) -> Result<Vec<u32>> {
        let url = format!(
            "{}/dlc/{app_id}/random/ajaxgetfilteredrecommendations/?query&count=10000",
            self.store_url
        );
        let body = self
            .client
            .get(&url)
            .send()
            .and_then(|r| r.error_for_status())
            .context("failed to fetch DLCs")?
            .text()
            .context("failed to read response body")?;
        scan_dlc_ids(&body)
    }
}

/// Pull `data-ds-appid` values out of the recommendations HTML.
///
/// The HTML arrives embedded in JSON, so the quote may be escaped.
pub fn scan_dlc_ids(body: &str) -> Result<Vec<u32>> {
    let re = Regex::new(r#"data-ds-appid=\\?"(\d+)"#)?;
    let ids: BTreeSet<u32> = re
        .captures_iter(body)
        .filter_map(|c| c[1].parse().ok())
        .collect();
    Ok(ids.into_iter().collect())
}
