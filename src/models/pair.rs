use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BaseToken {
    pub address: String,
    #[serde(default)]
    pub name: String,
    pub symbol: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuoteToken {
    pub symbol: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TxnCount {
    #[serde(default)]
    pub buys: u64,
    #[serde(default)]
    pub sells: u64,
}

impl TxnCount {
    pub fn total(&self) -> u64 {
        self.buys + self.sells
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Txns {
    #[serde(default)]
    pub m5: TxnCount,
    #[serde(default)]
    pub h1: TxnCount,
    #[serde(default)]
    pub h6: TxnCount,
    #[serde(default)]
    pub h24: TxnCount,
}

/// Per-window figures, used for both volume and price change.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Windowed {
    #[serde(default)]
    pub m5: f64,
    #[serde(default)]
    pub h1: f64,
    #[serde(default)]
    pub h6: f64,
    #[serde(default)]
    pub h24: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Liquidity {
    #[serde(default)]
    pub usd: Option<f64>,
    #[serde(default)]
    pub base: f64,
    #[serde(default)]
    pub quote: f64,
}

/// A trading pair as reported by the market-data provider. Read-only.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradingPair {
    pub chain_id: String,
    #[serde(default)]
    pub dex_id: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub pair_address: String,
    pub base_token: BaseToken,
    #[serde(default)]
    pub quote_token: QuoteToken,
    #[serde(default)]
    pub price_native: String,
    #[serde(default)]
    pub price_usd: Option<String>,
    #[serde(default)]
    pub txns: Txns,
    #[serde(default)]
    pub volume: Windowed,
    #[serde(default)]
    pub price_change: Windowed,
    #[serde(default)]
    pub liquidity: Option<Liquidity>,
    #[serde(default)]
    pub fdv: Option<f64>,
    #[serde(default)]
    pub pair_created_at: Option<i64>,
}

impl TradingPair {
    pub fn price_usd(&self) -> Option<f64> {
        self.price_usd
            .as_deref()
            .and_then(|p| p.trim().parse::<f64>().ok())
            .filter(|p| p.is_finite())
    }

    pub fn fdv_or_zero(&self) -> f64 {
        self.fdv.unwrap_or_default()
    }

    pub fn volume_h24(&self) -> f64 {
        self.volume.h24
    }

    pub fn liquidity_usd(&self) -> f64 {
        self.liquidity.and_then(|l| l.usd).unwrap_or_default()
    }

    pub fn total_txns_h24(&self) -> u64 {
        self.txns.h24.total()
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.pair_created_at
            .and_then(|millis| Utc.timestamp_millis_opt(millis).single())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DexScreenerResponse {
    #[serde(default)]
    pub schema_version: Option<String>,
    #[serde(default)]
    pub pairs: Option<Vec<TradingPair>>,
}

impl DexScreenerResponse {
    /// `pairs: null` and a missing field both mean "no pairs".
    pub fn into_pairs(self) -> Vec<TradingPair> {
        self.pairs.unwrap_or_default()
    }
}
