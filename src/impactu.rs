//! Impactu API client.
//!
//! Fetches the research products of one researcher (`cod_rh`):
//!
//! `GET {base}/person/{cod_rh}/research/products?max={max}&page={page}`
//!
//! The body is JSON with a top-level `data` array. One request per call, no
//! retries and no caching: a transport error or non-2xx status is returned to
//! the caller as is.

use crate::error::{CvlacError, OptionExt, Result};
use crate::product::ResearchProduct;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

/// Impactu API base URL
pub const IMPACTU_API_BASE: &str = "https://api.impactu.colav.co";

/// Default page size
pub const DEFAULT_MAX_RESULTS: u32 = 200;

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// HTTP client settings
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: IMPACTU_API_BASE.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: format!("autocvlac/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ClientConfig {
    /// Defaults overridden by `IMPACTU_API_URL` and `IMPACTU_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        if let Ok(base_url) = std::env::var("IMPACTU_API_URL") {
            config.base_url = base_url;
        }
        if let Ok(secs) = std::env::var("IMPACTU_TIMEOUT_SECS") {
            let secs: u64 = secs.trim().parse().map_err(|_| {
                CvlacError::Config(format!("IMPACTU_TIMEOUT_SECS is not a number: {}", secs))
            })?;
            config.timeout = Duration::from_secs(secs);
        }
        Ok(config)
    }
}

/// Paging options for the product listing
#[derive(Debug, Clone)]
pub struct QueryOptions {
    /// Maximum number of products per page
    pub max_results: u32,
    /// Page number (1-indexed)
    pub page: u32,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            max_results: DEFAULT_MAX_RESULTS,
            page: 1,
        }
    }
}

/// Anything that can list a researcher's products.
///
/// Implemented by [`ImpactuClient`]; tests substitute a stand-in.
#[async_trait]
pub trait ProductSource: Send + Sync {
    async fn research_products(&self, cod_rh: &str) -> Result<Vec<ResearchProduct>>;
}

/// Impactu API client
pub struct ImpactuClient {
    client: Client,
    base_url: Url,
    options: QueryOptions,
}

impl ImpactuClient {
    /// Create a new client with default paging.
    pub fn new(config: ClientConfig) -> Result<Self> {
        Self::with_options(config, QueryOptions::default())
    }

    pub fn with_options(config: ClientConfig, options: QueryOptions) -> Result<Self> {
        let base_url = Url::parse(config.base_url.trim_end_matches('/')).map_err(|e| {
            CvlacError::Config(format!("Invalid Impactu base URL {:?}: {}", config.base_url, e))
        })?;

        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent)
            .build()
            .map_err(|e| CvlacError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url,
            options,
        })
    }

    /// Fetch one page of research products for `cod_rh`.
    pub async fn get_research_products(
        &self,
        cod_rh: &str,
        options: &QueryOptions,
    ) -> Result<Vec<ResearchProduct>> {
        let url = build_products_url(&self.base_url, cod_rh, options)?;

        info!(
            cod_rh = cod_rh.trim(),
            max = options.max_results,
            page = options.page,
            "Fetching Impactu research products"
        );
        debug!(url = %url, "GET");

        let response = self.client.get(url).send().await?;
        let status = response.status();

        if !status.is_success() {
            warn!(cod_rh = cod_rh.trim(), status = status.as_u16(), "Impactu API error");
            return Err(CvlacError::Api {
                code: status.as_u16(),
                message: format!("Not research products for: {}", cod_rh.trim()),
            });
        }

        let body = response.text().await?;
        let products = parse_products(&body)?;
        info!(cod_rh = cod_rh.trim(), count = products.len(), "Fetched research products");
        Ok(products)
    }
}

#[async_trait]
impl ProductSource for ImpactuClient {
    async fn research_products(&self, cod_rh: &str) -> Result<Vec<ResearchProduct>> {
        self.get_research_products(cod_rh, &self.options).await
    }
}

/// Build the product listing URL. Rejects a blank researcher id.
fn build_products_url(base: &Url, cod_rh: &str, options: &QueryOptions) -> Result<String> {
    let cod_rh = cod_rh.trim();
    if cod_rh.is_empty() {
        return Err(CvlacError::Validation(
            "researcher identifier (cod_rh) must not be empty".to_string(),
        ));
    }

    Ok(format!(
        "{}/person/{}/research/products?max={}&page={}",
        base.as_str().trim_end_matches('/'),
        urlencoding::encode(cod_rh),
        options.max_results,
        options.page
    ))
}

/// Decode an Impactu response body (`{"data": [...]}`).
pub fn parse_products(json_str: &str) -> Result<Vec<ResearchProduct>> {
    let mut body: Value = serde_json::from_str(json_str)
        .map_err(|e| CvlacError::Parse(format!("Failed to parse Impactu response: {}", e)))?;

    let data = body
        .get_mut("data")
        .map(Value::take)
        .ok_or_parse("Impactu response has no `data` array")?;

    match data {
        Value::Null => Ok(Vec::new()),
        Value::Array(items) => Ok(items
            .into_iter()
            .enumerate()
            .filter_map(|(idx, item)| match serde_json::from_value(item) {
                Ok(product) => Some(product),
                Err(e) => {
                    warn!(index = idx, error = %e, "Skipping malformed product record");
                    None
                }
            })
            .collect()),
        _ => Err(CvlacError::Parse(
            "Impactu `data` field is not an array".to_string(),
        )),
    }
}
