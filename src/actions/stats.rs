use crate::actions::{contains_any, Action};
use crate::api::{fetch_and_rank_pair, MarketDataProvider, QueryOptions};
use crate::error::{Error, Result};
use crate::models::{Message, Reply, TradingPair};
use crate::resolver::TokenResolver;
use crate::utils::abbreviate;
use async_trait::async_trait;
use log::error;
use std::fmt::Write;
use std::sync::Arc;

const KEYWORDS: &[&str] = &[
    "stats",
    "statistics",
    "metrics",
    "numbers",
    "data",
    "performance",
    "volume",
    "transactions",
    "activity",
];

const APOLOGY: &str = "Sorry, I couldn't fetch the stats data right now. Please try again later.";

/// Stats card for the default token.
pub struct StatsAction {
    market: Arc<dyn MarketDataProvider>,
    resolver: Arc<TokenResolver>,
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn render(title: &str, price: f64, pair: &TradingPair) -> String {
    let mut text = String::new();
    let _ = writeln!(text, "📊 {} Stats 📊\n", title);

    let _ = writeln!(text, "💰 Price: ${:.8}", price);
    let _ = writeln!(text, "📈 Market Cap: ${}", abbreviate(pair.fdv_or_zero()));
    let _ = writeln!(text, "💧 Liquidity: ${}\n", abbreviate(pair.liquidity_usd()));

    let _ = writeln!(text, "📊 Volume (24h): ${}", abbreviate(pair.volume.h24));
    let _ = writeln!(text, "📊 Volume (6h): ${}", abbreviate(pair.volume.h6));
    let _ = writeln!(text, "📊 Volume (1h): ${}\n", abbreviate(pair.volume.h1));

    let _ = writeln!(text, "📈 Price Change (24h): {}%", pair.price_change.h24);
    let _ = writeln!(text, "📈 Price Change (6h): {}%", pair.price_change.h6);
    let _ = writeln!(text, "📈 Price Change (1h): {}%\n", pair.price_change.h1);

    let h24 = &pair.txns.h24;
    let _ = writeln!(text, "🔄 24h Transactions: {}", h24.total());
    let _ = writeln!(text, "(Buys: {} | Sells: {})", h24.buys, h24.sells);
    text
}

impl StatsAction {
    pub fn new(market: Arc<dyn MarketDataProvider>, resolver: Arc<TokenResolver>) -> Self {
        Self { market, resolver }
    }

    async fn reply(&self, message: &Message) -> Result<Reply> {
        let options = QueryOptions::Token {
            address: self.resolver.default_address().to_string(),
        };
        let pair = fetch_and_rank_pair(self.market.as_ref(), &options, self.resolver.chain())
            .await?
            .ok_or_else(|| Error::NoPairsFound("no pairs for the default token".to_string()))?;
        let price = pair
            .price_usd()
            .ok_or_else(|| Error::UpstreamFetch("pair has no usd price".to_string()))?;

        let text = render(&capitalize(self.resolver.default_name()), price, &pair);
        Ok(Reply::new(text, "STATS_INFO", message.source.clone()))
    }
}

#[async_trait]
impl Action for StatsAction {
    fn name(&self) -> &'static str {
        "GET_STATS"
    }

    fn similes(&self) -> &'static [&'static str] {
        &["CHECK_STATS", "FETCH_STATS", "TOKEN_STATS"]
    }

    fn description(&self) -> &'static str {
        "Gets detailed statistics for the default token including price, volume, and transaction data"
    }

    fn validate(&self, message: &Message) -> bool {
        let content = message.text.to_lowercase();
        contains_any(&content, KEYWORDS) && self.resolver.mentions_default(&content)
    }

    async fn handle(&self, message: &Message) -> Reply {
        match self.reply(message).await {
            Ok(reply) => reply,
            Err(e) => {
                error!("Error fetching stats: {}", e);
                Reply::new(APOLOGY, "STATS_ERROR", message.source.clone())
            }
        }
    }
}
