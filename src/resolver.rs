use crate::api::MarketDataProvider;
use crate::config::ResolverConfig;
use crate::error::{Error, Result};
use crate::ranker;
use log::{debug, info};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

static ADDRESS_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[1-9A-HJ-NP-Za-km-z]{32,44}").expect("valid address pattern"));
static SYMBOL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$([a-zA-Z0-9]+)").expect("valid symbol pattern"));

/// First base58 run of 32 to 44 characters, which is how Solana mints look.
pub fn find_address_in(text: &str) -> Option<&str> {
    ADDRESS_PATTERN.find(text).map(|m| m.as_str())
}

/// First `$TICKER` in the text, without the dollar sign.
pub fn find_symbol_in(text: &str) -> Option<&str> {
    SYMBOL_PATTERN
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

pub fn has_token_identifier(text: &str) -> bool {
    text.contains('$') || ADDRESS_PATTERN.is_match(text)
}

/// Symbol overrides that skip the search. Keys are stored lowercase.
#[derive(Debug, Clone, Default)]
pub struct AliasTable {
    entries: HashMap<String, String>,
}

impl AliasTable {
    pub fn new<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(symbol, address)| (symbol.as_ref().to_lowercase(), address.into()))
                .collect(),
        }
    }

    pub fn get(&self, symbol: &str) -> Option<&str> {
        self.entries.get(&symbol.to_lowercase()).map(String::as_str)
    }

    pub fn insert(&mut self, symbol: &str, address: &str) {
        self.entries.insert(symbol.to_lowercase(), address.to_string());
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Maps free-form chat text to a token address.
#[derive(Debug, Clone)]
pub struct TokenResolver {
    aliases: AliasTable,
    chain: String,
    default_address: String,
    default_name: String,
}

impl TokenResolver {
    pub fn new(config: &ResolverConfig) -> Self {
        Self {
            aliases: AliasTable::new(config.aliases.iter()),
            chain: config.chain.clone(),
            default_address: config.default_address.clone(),
            default_name: config.default_name.clone(),
        }
    }

    pub fn chain(&self) -> &str {
        &self.chain
    }

    pub fn default_address(&self) -> &str {
        &self.default_address
    }

    pub fn default_name(&self) -> &str {
        &self.default_name
    }

    pub fn aliases(&self) -> &AliasTable {
        &self.aliases
    }

    /// Address first, then `$symbol` (alias table, else a ranked search), and
    /// the default token when the text names neither.
    pub async fn resolve(&self, provider: &dyn MarketDataProvider, text: &str) -> Result<String> {
        if let Some(address) = find_address_in(text) {
            debug!("Found address in text: {}", address);
            return Ok(address.to_string());
        }

        if !text.contains('$') {
            debug!("No token named, using default {}", self.default_address);
            return Ok(self.default_address.clone());
        }

        let symbol = find_symbol_in(text).ok_or_else(|| {
            Error::NotFound("Could not find valid token symbol or address".to_string())
        })?;

        if let Some(address) = self.aliases.get(symbol) {
            info!("Alias ${} resolved to {}", symbol, address);
            return Ok(address.to_string());
        }

        let pairs = provider.search_pairs(symbol).await?;
        if pairs.is_empty() {
            return Err(Error::NoPairsFound(format!("No pairs found for token symbol {}", symbol)));
        }

        let best = ranker::rank(&pairs, symbol, &self.chain)?;
        info!("Requested token address: {}", best.base_token.address);
        Ok(best.base_token.address)
    }

    pub fn is_default(&self, address: &str) -> bool {
        address == self.default_address
    }

    pub fn mentions_default(&self, text: &str) -> bool {
        text.to_lowercase().contains(&self.default_name.to_lowercase())
    }

    /// How a resolved token is called in replies.
    pub fn display_name(&self, text: &str, address: &str) -> String {
        if self.is_default(address) {
            return self.default_name.clone();
        }
        if text.contains('$') {
            if let Some(symbol) = find_symbol_in(text) {
                return symbol.to_string();
            }
        }
        address.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockMarketDataProvider;
    use crate::models::{BaseToken, TradingPair, Windowed};
    use mockall::predicate::eq;

    const WIF: &str = "EKpQGSJtjMFqKZ9KQanSqYXRcF8fBopzLHYxdM65zcjm";
    const BONK: &str = "DezXAZ8z7PnrnRJjz3wXBoRgixCa6xjnB7YaB1pPB263";

    fn resolver() -> TokenResolver {
        TokenResolver::new(&ResolverConfig::default())
    }

    fn pair(address: &str, symbol: &str, fdv: f64, volume: f64) -> TradingPair {
        TradingPair {
            chain_id: "solana".to_string(),
            base_token: BaseToken {
                address: address.to_string(),
                name: symbol.to_string(),
                symbol: symbol.to_string(),
            },
            volume: Windowed { h24: volume, ..Default::default() },
            fdv: Some(fdv),
            ..Default::default()
        }
    }

    fn offline() -> MockMarketDataProvider {
        let mut provider = MockMarketDataProvider::new();
        provider.expect_search_pairs().never();
        provider.expect_token_pairs().never();
        provider.expect_pairs_by_address().never();
        provider
    }

    #[tokio::test]
    async fn test_address_beats_symbol() {
        let text = format!("is $bonk better than {} today?", WIF);
        let address = resolver().resolve(&offline(), &text).await.unwrap();
        assert_eq!(address, WIF);
    }

    #[tokio::test]
    async fn test_alias_is_case_insensitive_and_offline() {
        let address = resolver().resolve(&offline(), "price of $WiF pls").await.unwrap();
        assert_eq!(address, WIF);

        let address = resolver().resolve(&offline(), "$ai16z chart").await.unwrap();
        assert_eq!(address, "HeLp6NuQkmYB4pYWo2zYs22mESHXPQYzXbB8n4V98jwC");
    }

    #[tokio::test]
    async fn test_plain_text_uses_default() {
        let address = resolver().resolve(&offline(), "how is the cat doing").await.unwrap();
        assert_eq!(address, ResolverConfig::default().default_address);
    }

    #[tokio::test]
    async fn test_dollar_without_symbol_fails() {
        let err = resolver().resolve(&offline(), "it costs $ 5").await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn test_symbol_search_is_ranked() {
        let mut provider = MockMarketDataProvider::new();
        provider
            .expect_search_pairs()
            .with(eq("bonk"))
            .times(1)
            .returning(|_| {
                Ok(vec![
                    pair("FakeBonk1111111111111111111111111", "BONK", 1_000.0, 900_000.0),
                    pair(BONK, "Bonk", 1_500_000_000.0, 10.0),
                    pair(BONK, "Bonk", 1_500_000_000.0, 250_000.0),
                ])
            });

        let address = resolver().resolve(&provider, "what about $bonk and $wif").await.unwrap();
        assert_eq!(address, BONK);
    }

    #[tokio::test]
    async fn test_symbol_search_without_pairs() {
        let mut provider = MockMarketDataProvider::new();
        provider.expect_search_pairs().returning(|_| Ok(Vec::new()));

        let err = resolver().resolve(&provider, "$nothing").await.unwrap_err();
        assert!(matches!(err, Error::NoPairsFound(_)));
    }

    #[tokio::test]
    async fn test_search_failure_is_not_masked() {
        let mut provider = MockMarketDataProvider::new();
        provider
            .expect_search_pairs()
            .returning(|_| Err(Error::UpstreamFetch("timeout".to_string())));

        let err = resolver().resolve(&provider, "$bonk").await.unwrap_err();
        assert!(matches!(err, Error::UpstreamFetch(_)));
    }

    #[test]
    fn test_extractors() {
        assert_eq!(find_symbol_in("buy $FWOG and $bonk"), Some("FWOG"));
        assert_eq!(find_symbol_in("no symbol here"), None);
        assert_eq!(find_address_in(&format!("ca: {}", BONK)), Some(BONK));
        assert_eq!(find_address_in("short 1234"), None);
        assert!(has_token_identifier("$"));
        assert!(!has_token_identifier("hello there"));
    }

    #[test]
    fn test_display_name() {
        let resolver = resolver();
        let default = resolver.default_address().to_string();
        assert_eq!(resolver.display_name("anything", &default), "bubbacat");
        assert_eq!(resolver.display_name("price of $FWOG", "FwogAddr"), "FWOG");
        assert_eq!(resolver.display_name(&format!("price {}", BONK), BONK), BONK);
    }

    #[test]
    fn test_alias_table() {
        let mut table = AliasTable::new([("WIF", WIF)]);
        assert_eq!(table.get("wif"), Some(WIF));
        table.insert("BONK", BONK);
        assert_eq!(table.get("Bonk"), Some(BONK));
        assert_eq!(table.len(), 2);
        assert!(!table.is_empty());
    }
}
