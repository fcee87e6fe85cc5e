#![allow(dead_code)]

use bubbacat_bot::actions::Services;
use bubbacat_bot::api::{CallistoClient, DexScreenerClient, ReplicateClient};
use bubbacat_bot::config::ResolverConfig;
use bubbacat_bot::resolver::TokenResolver;
use httpmock::MockServer;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

pub const WIF: &str = "EKpQGSJtjMFqKZ9KQanSqYXRcF8fBopzLHYxdM65zcjm";
pub const BONK: &str = "DezXAZ8z7PnrnRJjz3wXBoRgixCa6xjnB7YaB1pPB263";
pub const FAKE_BONK: &str = "BoNKfake1111111111111111111111111111111111";

pub const CALLISTO_KEY: &str = "test-callisto-key";
pub const REPLICATE_TOKEN: &str = "r8_test_token";

const TIMEOUT: Duration = Duration::from_secs(5);

/// One dexscreener pair object with the fields ranking looks at.
pub fn pair_json(chain: &str, pair_address: &str, address: &str, symbol: &str, fdv: f64, volume_h24: f64) -> Value {
    json!({
        "chainId": chain,
        "dexId": "raydium",
        "url": format!("https://dexscreener.com/{}/{}", chain, pair_address.to_lowercase()),
        "pairAddress": pair_address,
        "baseToken": {"address": address, "name": symbol.to_lowercase(), "symbol": symbol},
        "quoteToken": {"address": "So11111111111111111111111111111111111111112", "name": "Wrapped SOL", "symbol": "SOL"},
        "priceNative": "0.0000001",
        "priceUsd": "0.00002",
        "txns": {"h24": {"buys": 300, "sells": 250}},
        "volume": {"h24": volume_h24, "h6": volume_h24 / 4.0, "h1": volume_h24 / 24.0, "m5": 1.0},
        "priceChange": {"h24": 5.5, "h6": 1.2, "h1": -0.4, "m5": 0.0},
        "liquidity": {"usd": 1_000_000.0, "base": 10.0, "quote": 20.0},
        "fdv": fdv,
        "pairCreatedAt": 1_700_000_000_000_i64
    })
}

pub fn pairs_body(pairs: Vec<Value>) -> Value {
    json!({"schemaVersion": "1.0.0", "pairs": pairs})
}

pub fn market(server: &MockServer) -> DexScreenerClient {
    DexScreenerClient::new(&server.url("/dex"), &server.url("/chart"), TIMEOUT).unwrap()
}

pub fn resolver() -> Arc<TokenResolver> {
    Arc::new(TokenResolver::new(&ResolverConfig::default()))
}

/// Every provider pointed at a single mock server, each under its own prefix.
pub fn services(server: &MockServer) -> Services {
    let market = Arc::new(market(server));
    Services {
        market: market.clone(),
        charts: market,
        dca: Arc::new(
            CallistoClient::new(&server.url("/callisto"), Some(CALLISTO_KEY.to_string()), TIMEOUT).unwrap(),
        ),
        images: Arc::new(
            ReplicateClient::new(
                &server.url("/replicate"),
                "black-forest-labs/flux-1.1-pro",
                Some(REPLICATE_TOKEN.to_string()),
                TIMEOUT,
            )
            .unwrap(),
        ),
        resolver: resolver(),
    }
}
