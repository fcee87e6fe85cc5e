use crate::api::{read_bytes, read_json, send, DcaProvider};
use crate::error::{Error, Result};
use crate::models::ActiveDcas;
use async_trait::async_trait;
use chrono::Utc;
use log::{info, warn};
use reqwest::{Client, RequestBuilder};
use std::time::Duration;

pub const API_BASE_URL: &str = "https://callisto.so/api";
const PROVIDER: &str = "callisto";

/// DCA order data and report screenshots.
#[derive(Debug, Clone)]
pub struct CallistoClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl CallistoClient {
    pub fn new(base_url: &str, api_key: Option<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::ConfigError(format!("Failed to build HTTP client: {}", e)))?;

        if api_key.is_none() {
            warn!("No Callisto API key configured, DCA requests will likely be rejected");
        }

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.api_key {
            Some(key) => request.header("x-api-key", key),
            None => request,
        }
    }
}

#[async_trait]
impl DcaProvider for CallistoClient {
    async fn active_positions(&self, address: &str) -> Result<ActiveDcas> {
        info!("Fetching active DCA orders for {}", address);

        let url = format!("{}/dca/get-active", self.base_url);
        let request = self
            .client
            .get(&url)
            .query(&[("address", address)])
            .header("Content-Type", "application/json");

        let response = send(PROVIDER, self.authorized(request)).await?;
        let body: serde_json::Value = read_json(PROVIDER, response).await?;
        if !body.get("orders").map_or(false, |orders| orders.is_array()) {
            return Err(Error::UpstreamFetch("Invalid response from Callisto API".to_string()));
        }
        Ok(serde_json::from_value(body)?)
    }

    async fn report_image(&self, address: &str) -> Result<Vec<u8>> {
        let url = format!("{}/dca/get-report-image", self.base_url);
        let stamp = Utc::now().timestamp_millis().to_string();
        let request = self
            .client
            .get(&url)
            .query(&[("address", address), ("t", stamp.as_str())])
            .header("Cache-Control", "no-cache")
            .header("Pragma", "no-cache");

        let response = send(PROVIDER, self.authorized(request)).await?;
        let bytes = read_bytes(PROVIDER, response).await?;
        info!("Received {} byte DCA report for {}", bytes.len(), address);
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn client(server: &MockServer, key: Option<&str>) -> CallistoClient {
        CallistoClient::new(&server.base_url(), key.map(str::to_string), Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_active_positions_by_address() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/dca/get-active")
                    .query_param("address", "Token1")
                    .header("x-api-key", "secret");
                then.status(200).body(
                    r#"{"orders": [{"input_mint_symbol": "USDC", "output_mint_symbol": "FWOG",
                                    "order_in_amount": 12000, "order_in_amount_per_cycle": 1000,
                                    "order_size": 12000, "order_cycle_frequency": 60,
                                    "progress": 0.5, "dca_delegate": "Delegate1"}],
                        "stats": {"totalBuyPower": 12000, "totalSellPower": 0}}"#,
                );
            })
            .await;

        let active = client(&server, Some("secret"))
            .active_positions("Token1")
            .await
            .unwrap();
        mock.assert_async().await;
        assert_eq!(active.orders.len(), 1);
        assert_eq!(active.orders[0].output_mint_symbol, "FWOG");
        assert_eq!(active.stats.total_buy_power, 12000.0);
    }

    #[tokio::test]
    async fn test_active_positions_rejects_body_without_orders() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/dca/get-active");
                then.status(200).body(r#"{"error": "nope"}"#);
            })
            .await;

        let err = client(&server, None)
            .active_positions("Addr")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::UpstreamFetch(_)));
    }

    #[tokio::test]
    async fn test_active_positions_unauthorized() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/dca/get-active");
                then.status(401);
            })
            .await;

        let err = client(&server, None).active_positions("Addr").await.unwrap_err();
        assert!(matches!(err, Error::UpstreamFetch(_)));
    }

    #[tokio::test]
    async fn test_report_image_sends_api_key() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/dca/get-report-image")
                    .query_param("address", "Token1")
                    .header("x-api-key", "secret");
                then.status(200).body(b"PNG");
            })
            .await;

        let bytes = client(&server, Some("secret")).report_image("Token1").await.unwrap();
        mock.assert_async().await;
        assert_eq!(bytes, b"PNG".to_vec());
    }

    #[tokio::test]
    async fn test_report_image_forbidden() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/dca/get-report-image");
                then.status(403);
            })
            .await;

        let err = client(&server, None).report_image("Token1").await.unwrap_err();
        assert!(matches!(err, Error::UpstreamFetch(_)));
    }
}
