use crate::actions::{contains_any, Action};
use crate::api::{fetch_and_rank_pair, MarketDataProvider, QueryOptions};
use crate::error::{Error, Result};
use crate::models::{Message, Reply, TradingPair};
use crate::resolver::{has_token_identifier, TokenResolver};
use crate::utils::abbreviate;
use async_trait::async_trait;
use log::error;
use std::sync::Arc;

const KEYWORDS: &[&str] = &[
    "price",
    "worth",
    "value",
    "cost",
    "rate",
    "trading at",
    "going for",
    "market price",
    "quote",
    "ticker",
    "check",
    "look up",
    "how much",
    "what is",
    "current",
];

const APOLOGY: &str = "Sorry, I couldn't fetch the price data right now. Please try again later.";

pub struct PriceAction {
    market: Arc<dyn MarketDataProvider>,
    resolver: Arc<TokenResolver>,
}

impl PriceAction {
    pub fn new(market: Arc<dyn MarketDataProvider>, resolver: Arc<TokenResolver>) -> Self {
        Self { market, resolver }
    }

    async fn lookup(&self, text: &str) -> Result<(String, TradingPair)> {
        let address = self.resolver.resolve(self.market.as_ref(), text).await?;
        let options = QueryOptions::Token { address: address.clone() };
        let pair = fetch_and_rank_pair(self.market.as_ref(), &options, self.resolver.chain())
            .await?
            .ok_or_else(|| Error::NoPairsFound(format!("no pairs for {}", address)))?;
        Ok((address, pair))
    }

    async fn reply(&self, message: &Message) -> Result<Reply> {
        let (address, pair) = self.lookup(&message.text).await?;
        let price = pair
            .price_usd()
            .ok_or_else(|| Error::UpstreamFetch("Could not fetch token price data".to_string()))?;

        let text = format!(
            "{} token currently trading at ${:.5} with market cap of ${}",
            self.resolver.display_name(&message.text, &address),
            price,
            abbreviate(pair.fdv_or_zero())
        );
        Ok(Reply::new(text, "PRICE_INFO", message.source.clone()))
    }
}

#[async_trait]
impl Action for PriceAction {
    fn name(&self) -> &'static str {
        "GET_PRICE"
    }

    fn similes(&self) -> &'static [&'static str] {
        &["CHECK_PRICE", "FETCH_PRICE", "PRICE_INFO"]
    }

    fn description(&self) -> &'static str {
        "Gets current price and market cap information for a given token or contract address"
    }

    fn validate(&self, message: &Message) -> bool {
        let content = message.text.to_lowercase();
        if !contains_any(&content, KEYWORDS) {
            return false;
        }
        // base58 is case-sensitive
        has_token_identifier(&message.text) || self.resolver.mentions_default(&content)
    }

    async fn handle(&self, message: &Message) -> Reply {
        match self.reply(message).await {
            Ok(reply) => reply,
            Err(e) => {
                error!("Error fetching price: {}", e);
                Reply::new(APOLOGY, "PRICE_ERROR", message.source.clone())
            }
        }
    }
}
