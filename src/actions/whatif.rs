use crate::actions::Action;
use crate::api::{fetch_and_rank_pair, MarketDataProvider, QueryOptions};
use crate::error::{Error, Result};
use crate::models::{Message, Reply, TradingPair};
use crate::resolver::{has_token_identifier, TokenResolver};
use crate::utils::{abbreviate, unabbreviate};
use async_trait::async_trait;
use log::{debug, error};
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;

const PHRASES: &[&str] = &["what if", "whatif"];

const MISSING_TARGET: &str = "Please provide either a target market cap (e.g. '$10M' or 'M10') \
                              or a token symbol to compare with (e.g. '$pepe').";
const APOLOGY: &str = "Sorry, I couldn't perform that calculation right now. Please try again later.";

static DOLLAR_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\$(\S+)").expect("valid dollar pattern"));

#[derive(Debug, Clone, PartialEq)]
enum Target {
    MarketCap(f64),
    Symbol(String),
}

/// "10M", "2.5b", "950" or the unit-first "M10". Needs at least one digit.
fn market_cap_of(word: &str) -> Option<f64> {
    if !word.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }
    if let Some(value) = unabbreviate(word) {
        return Some(value);
    }
    let mut chars = word.chars();
    let unit = chars.next().filter(|c| "kmbtKMBT".contains(*c))?;
    let rest = chars.as_str();
    if !rest.starts_with(|c: char| c.is_ascii_digit() || c == '.') {
        return None;
    }
    unabbreviate(&format!("{}{}", rest, unit))
}

/// The first `$` run decides: with a digit it is a market cap, otherwise a
/// symbol to compare with. Without any `$`, a bare compact number after the
/// "what if" phrase is taken as the market cap.
fn parse_target(text: &str) -> Option<Target> {
    let lower = text.to_lowercase();
    let tail = PHRASES
        .iter()
        .filter_map(|phrase| lower.find(phrase).map(|at| &lower[at + phrase.len()..]))
        .next()?;

    if let Some(run) = DOLLAR_RUN.captures(tail).and_then(|c| c.get(1)) {
        let run = run.as_str().trim_end_matches(|c: char| !c.is_alphanumeric());
        if run.chars().any(|c| c.is_ascii_digit()) {
            return market_cap_of(run).map(Target::MarketCap);
        }
        let symbol: String = run.chars().take_while(|c| c.is_alphanumeric()).collect();
        return (!symbol.is_empty()).then_some(Target::Symbol(symbol));
    }

    tail.split_whitespace()
        .map(|w| {
            w.trim_start_matches(|c: char| !c.is_alphanumeric() && c != '.')
                .trim_end_matches(|c: char| !c.is_alphanumeric())
        })
        .find_map(market_cap_of)
        .map(Target::MarketCap)
}

fn projection(multiplier: f64, price: f64) -> String {
    format!(
        "• {:.2}X from here\n• Price would be: ${:.5}",
        multiplier,
        price * multiplier
    )
}

pub struct WhatIfAction {
    market: Arc<dyn MarketDataProvider>,
    resolver: Arc<TokenResolver>,
}

impl WhatIfAction {
    pub fn new(market: Arc<dyn MarketDataProvider>, resolver: Arc<TokenResolver>) -> Self {
        Self { market, resolver }
    }

    async fn token_pair(&self, address: &str) -> Result<TradingPair> {
        let options = QueryOptions::Token {
            address: address.to_string(),
        };
        fetch_and_rank_pair(self.market.as_ref(), &options, self.resolver.chain())
            .await?
            .ok_or_else(|| Error::NoPairsFound(format!("no pairs for {}", address)))
    }

    async fn reply(&self, message: &Message, target: Target) -> Result<Reply> {
        let current = self.token_pair(self.resolver.default_address()).await?;
        let price = current
            .price_usd()
            .ok_or_else(|| Error::UpstreamFetch("Could not fetch default token data".to_string()))?;
        let market_cap = current
            .fdv
            .filter(|fdv| *fdv > 0.0)
            .ok_or_else(|| Error::UpstreamFetch("default token has no market cap".to_string()))?;

        let text = match target {
            Target::MarketCap(target_mc) => format!(
                "To reach ${} market cap:\n{}",
                abbreviate(target_mc),
                projection(target_mc / market_cap, price)
            ),
            Target::Symbol(symbol) => {
                let address = self
                    .resolver
                    .resolve(self.market.as_ref(), &format!("${}", symbol))
                    .await?;
                let comparison = self.token_pair(&address).await?;
                let target_mc = comparison
                    .fdv
                    .ok_or_else(|| Error::UpstreamFetch("Could not fetch comparison token data".to_string()))?;
                format!(
                    "To reach {}'s market cap (${}):\n{}",
                    comparison.base_token.name,
                    abbreviate(target_mc),
                    projection(target_mc / market_cap, price)
                )
            }
        };
        Ok(Reply::new(text, "WHATIF_RESULT", message.source.clone()))
    }
}

#[async_trait]
impl Action for WhatIfAction {
    fn name(&self) -> &'static str {
        "WHAT_IF"
    }

    fn similes(&self) -> &'static [&'static str] {
        &["PRICE_TARGET", "MARKET_CAP_TARGET", "COMPARE_MCAP"]
    }

    fn description(&self) -> &'static str {
        "Calculates price targets based on market cap comparisons or direct targets"
    }

    fn validate(&self, message: &Message) -> bool {
        let content = message.text.to_lowercase();
        PHRASES.iter().any(|phrase| content.contains(phrase))
            && (has_token_identifier(&message.text) || self.resolver.mentions_default(&content))
    }

    async fn handle(&self, message: &Message) -> Reply {
        let Some(target) = parse_target(&message.text) else {
            return Reply::new(MISSING_TARGET, "WHATIF_ERROR", message.source.clone());
        };
        debug!("What-if target: {:?}", target);

        match self.reply(message, target).await {
            Ok(reply) => reply,
            Err(e) => {
                error!("Error in whatif calculation: {}", e);
                Reply::new(APOLOGY, "WHATIF_ERROR", message.source.clone())
            }
        }
    }
}
