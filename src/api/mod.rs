use crate::error::{Error, Result};
use crate::metrics;
use crate::models::{ActiveDcas, TradingPair};
use crate::ranker;
use async_trait::async_trait;
use log::{debug, error, info};
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Instant;

pub mod callisto;
pub mod dexscreener;
pub mod replicate;

pub use callisto::CallistoClient;
pub use dexscreener::DexScreenerClient;
pub use replicate::ReplicateClient;

/// How to look pair data up on the market-data provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum QueryOptions {
    Query { text: String },
    Token { address: String },
    Pair { chain: String, addresses: Vec<String> },
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Free-text pair search.
    async fn search_pairs(&self, text: &str) -> Result<Vec<TradingPair>>;

    /// All pairs whose base or quote token is `address`.
    async fn token_pairs(&self, address: &str) -> Result<Vec<TradingPair>>;

    /// Pairs by their own pool addresses on one chain.
    async fn pairs_by_address(&self, chain: &str, addresses: &[String]) -> Result<Vec<TradingPair>>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChartProvider: Send + Sync {
    async fn chart_png(&self, chain: &str, address: &str) -> Result<Vec<u8>>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DcaProvider: Send + Sync {
    /// Active orders and aggregate buy/sell pressure for a token mint.
    async fn active_positions(&self, address: &str) -> Result<ActiveDcas>;

    async fn report_image(&self, address: &str) -> Result<Vec<u8>>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<Vec<u8>>;
}

/// Fetches pair data and reduces it to the single most representative pair.
///
/// Direct lookups trust the provider's ordering and take the first pair. A
/// free-text query goes through [`ranker::rank`] with the text as the symbol.
/// `Ok(None)` means nothing matched; provider failures are returned as errors.
pub async fn fetch_and_rank_pair(
    provider: &dyn MarketDataProvider,
    options: &QueryOptions,
    chain: &str,
) -> Result<Option<TradingPair>> {
    match options {
        QueryOptions::Query { text } => {
            let pairs = provider.search_pairs(text).await?;
            if pairs.is_empty() {
                info!("Search for '{}' returned no pairs", text);
                return Ok(None);
            }
            match ranker::rank(&pairs, text, chain) {
                Ok(pair) => Ok(Some(pair)),
                Err(Error::NoPairsFound(reason)) => {
                    debug!("{}", reason);
                    Ok(None)
                }
                Err(e) => Err(e),
            }
        }
        QueryOptions::Token { address } => {
            Ok(provider.token_pairs(address).await?.into_iter().next())
        }
        QueryOptions::Pair { chain, addresses } => {
            if addresses.is_empty() {
                return Err(Error::InvalidInput("no pair addresses given".to_string()));
            }
            Ok(provider
                .pairs_by_address(chain, addresses)
                .await?
                .into_iter()
                .next())
        }
    }
}

/// Sends a request, timing it and counting failures under `provider`.
pub(crate) async fn send(provider: &str, request: RequestBuilder) -> Result<Response> {
    let started = Instant::now();
    let result = request.send().await;
    metrics::record_upstream(
        provider,
        started.elapsed(),
        result.as_ref().map(|r| r.status().is_success()).unwrap_or(false),
    );
    result.map_err(|e| {
        error!("{} request failed: {}", provider, e);
        Error::from(e)
    })
}

/// Maps a non-success status to the crate error, the same way for every provider.
pub(crate) fn status_error(provider: &str, status: StatusCode) -> Error {
    match status {
        StatusCode::TOO_MANY_REQUESTS => {
            Error::RateLimitExceeded(format!("{} API rate limit exceeded", provider))
        }
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            Error::UpstreamFetch(format!("{} rejected the credentials ({})", provider, status))
        }
        _ => Error::UpstreamFetch(format!("{} request failed with status: {}", provider, status)),
    }
}

pub(crate) async fn read_bytes(provider: &str, response: Response) -> Result<Vec<u8>> {
    let status = response.status();
    if !status.is_success() {
        return Err(status_error(provider, status));
    }
    Ok(response.bytes().await?.to_vec())
}

pub(crate) async fn read_json<T: for<'de> Deserialize<'de>>(provider: &str, response: Response) -> Result<T> {
    let status = response.status();
    if !status.is_success() {
        return Err(status_error(provider, status));
    }
    let body = response.text().await?;
    serde_json::from_str(&body)
        .map_err(|e| Error::UpstreamFetch(format!("Failed to parse {} response: {}", provider, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BaseToken;
    use httpmock::prelude::*;
    use mockall::predicate::eq;

    fn pair(address: &str, symbol: &str, fdv: f64) -> TradingPair {
        TradingPair {
            chain_id: "solana".to_string(),
            base_token: BaseToken {
                address: address.to_string(),
                name: symbol.to_string(),
                symbol: symbol.to_string(),
            },
            fdv: Some(fdv),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_token_lookup_takes_first_pair() {
        let mut provider = MockMarketDataProvider::new();
        provider
            .expect_token_pairs()
            .with(eq("Addr1"))
            .times(1)
            .returning(|_| Ok(vec![pair("Addr1", "ONE", 1.0), pair("Addr1", "ONE", 99.0)]));

        let options = QueryOptions::Token { address: "Addr1".to_string() };
        let found = fetch_and_rank_pair(&provider, &options, "solana").await.unwrap();
        assert_eq!(found.unwrap().fdv, Some(1.0));
    }

    #[tokio::test]
    async fn test_token_lookup_without_pairs_is_none() {
        let mut provider = MockMarketDataProvider::new();
        provider.expect_token_pairs().returning(|_| Ok(Vec::new()));

        let options = QueryOptions::Token { address: "Nothing".to_string() };
        assert!(fetch_and_rank_pair(&provider, &options, "solana").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_query_is_ranked() {
        let mut provider = MockMarketDataProvider::new();
        provider
            .expect_search_pairs()
            .with(eq("bonk"))
            .returning(|_| Ok(vec![pair("Fake", "BONK", 10.0), pair("Real", "BONK", 5_000.0)]));

        let options = QueryOptions::Query { text: "bonk".to_string() };
        let found = fetch_and_rank_pair(&provider, &options, "solana").await.unwrap();
        assert_eq!(found.unwrap().base_token.address, "Real");
    }

    #[tokio::test]
    async fn test_query_without_candidates_is_none() {
        let mut provider = MockMarketDataProvider::new();
        provider
            .expect_search_pairs()
            .returning(|_| Ok(vec![pair("Other", "OTHER", 10.0)]));

        let options = QueryOptions::Query { text: "bonk".to_string() };
        assert!(fetch_and_rank_pair(&provider, &options, "solana").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_upstream_failure_propagates() {
        let mut provider = MockMarketDataProvider::new();
        provider
            .expect_token_pairs()
            .returning(|_| Err(Error::UpstreamFetch("502".to_string())));

        let options = QueryOptions::Token { address: "Addr1".to_string() };
        let err = fetch_and_rank_pair(&provider, &options, "solana").await.unwrap_err();
        assert!(matches!(err, Error::UpstreamFetch(_)));
    }

    #[tokio::test]
    async fn test_pair_lookup_requires_addresses() {
        let provider = MockMarketDataProvider::new();
        let options = QueryOptions::Pair { chain: "solana".to_string(), addresses: Vec::new() };
        let err = fetch_and_rank_pair(&provider, &options, "solana").await.unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn test_query_options_are_tagged() {
        let options: QueryOptions =
            serde_json::from_str(r#"{"kind": "pair", "chain": "solana", "addresses": ["a", "b"]}"#).unwrap();
        assert_eq!(
            options,
            QueryOptions::Pair {
                chain: "solana".to_string(),
                addresses: vec!["a".to_string(), "b".to_string()],
            }
        );
    }

    #[tokio::test]
    async fn test_send_counts_failed_status() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/down");
                then.status(502);
            })
            .await;

        let before = metrics::UPSTREAM_ERRORS.with_label_values(&["send-test"]).get();
        let request = reqwest::Client::new().get(server.url("/down"));
        let response = send("send-test", request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(
            metrics::UPSTREAM_ERRORS.with_label_values(&["send-test"]).get(),
            before + 1
        );
    }

    #[tokio::test]
    async fn test_send_connection_error() {
        let request = reqwest::Client::new().get("http://127.0.0.1:1/unreachable");
        let err = send("send-refused", request).await.unwrap_err();
        assert!(matches!(err, Error::UpstreamFetch(_)));
        assert_eq!(metrics::UPSTREAM_ERRORS.with_label_values(&["send-refused"]).get(), 1);
    }
}
