use crate::api::{read_bytes, read_json, send, ChartProvider, MarketDataProvider};
use crate::error::{Error, Result};
use crate::models::{DexScreenerResponse, TradingPair};
use async_trait::async_trait;
use chrono::Utc;
use log::{debug, info};
use reqwest::{Client, RequestBuilder};
use std::time::Duration;

pub const API_BASE_URL: &str = "https://api.dexscreener.com/latest/dex";
pub const CHART_BASE_URL: &str = "https://io.dexscreener.com/screenshot/chart";
const PROVIDER: &str = "dexscreener";
const CHART_WIDTH: u32 = 1200;
const CHART_HEIGHT: u32 = 600;

#[derive(Debug, Clone)]
pub struct DexScreenerClient {
    client: Client,
    base_url: String,
    chart_base_url: String,
}

impl DexScreenerClient {
    pub fn new(base_url: &str, chart_base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::ConfigError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            chart_base_url: chart_base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn fetch_pairs(&self, request: RequestBuilder) -> Result<Vec<TradingPair>> {
        let response = send(PROVIDER, request).await?;
        let body: DexScreenerResponse = read_json(PROVIDER, response).await?;
        let pairs = body.into_pairs();
        debug!("DexScreener returned {} pairs", pairs.len());
        Ok(pairs)
    }
}

#[async_trait]
impl MarketDataProvider for DexScreenerClient {
    async fn search_pairs(&self, text: &str) -> Result<Vec<TradingPair>> {
        info!("Searching pairs for '{}'", text);
        let url = format!("{}/search/", self.base_url);
        self.fetch_pairs(self.client.get(&url).query(&[("q", text)])).await
    }

    async fn token_pairs(&self, address: &str) -> Result<Vec<TradingPair>> {
        info!("Fetching pairs for token {}", address);
        let url = format!("{}/tokens/{}", self.base_url, address);
        self.fetch_pairs(self.client.get(&url)).await
    }

    async fn pairs_by_address(&self, chain: &str, addresses: &[String]) -> Result<Vec<TradingPair>> {
        info!("Fetching {} pairs on {}", addresses.len(), chain);
        let url = format!("{}/pairs/{}/{}", self.base_url, chain, addresses.join(","));
        self.fetch_pairs(self.client.get(&url)).await
    }
}

#[async_trait]
impl ChartProvider for DexScreenerClient {
    async fn chart_png(&self, chain: &str, address: &str) -> Result<Vec<u8>> {
        let url = format!("{}/{}/{}.png", self.chart_base_url, chain, address);
        // the timestamp defeats the screenshot CDN cache
        let stamp = Utc::now().timestamp_millis().to_string();
        let request = self
            .client
            .get(&url)
            .query(&[
                ("width", CHART_WIDTH.to_string()),
                ("height", CHART_HEIGHT.to_string()),
                ("t", stamp),
            ])
            .header("Cache-Control", "no-cache")
            .header("Pragma", "no-cache");

        let response = send(PROVIDER, request).await?;
        let bytes = read_bytes(PROVIDER, response).await?;
        info!("Fetched {} byte chart for {}", bytes.len(), address);
        Ok(bytes)
    }
}
