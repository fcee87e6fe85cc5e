use crate::actions::{contains_any, contains_word, Action};
use crate::api::{ChartProvider, MarketDataProvider};
use crate::error::Result;
use crate::models::{Message, Reply};
use crate::resolver::{has_token_identifier, TokenResolver};
use async_trait::async_trait;
use log::{error, info};
use std::sync::Arc;

const KEYWORDS: &[&str] = &["chart", "graph", "trend", "movement", "price action", "technical"];

const APOLOGY: &str = "Sorry, I couldn't generate the chart right now. Please try again later.";

pub const ATTACHMENT_NAME: &str = "token-chart.png";

pub struct ChartAction {
    market: Arc<dyn MarketDataProvider>,
    charts: Arc<dyn ChartProvider>,
    resolver: Arc<TokenResolver>,
}

impl ChartAction {
    pub fn new(
        market: Arc<dyn MarketDataProvider>,
        charts: Arc<dyn ChartProvider>,
        resolver: Arc<TokenResolver>,
    ) -> Self {
        Self {
            market,
            charts,
            resolver,
        }
    }

    async fn reply(&self, message: &Message) -> Result<Reply> {
        let address = self.resolver.resolve(self.market.as_ref(), &message.text).await?;
        let image = self.charts.chart_png(self.resolver.chain(), &address).await?;
        info!("Fetched {} byte chart for {}", image.len(), address);

        let text = format!(
            "here is the chart for {}",
            self.resolver.display_name(&message.text, &address)
        );
        Ok(Reply::new(text, "CHART_INFO", message.source.clone()).with_attachment(ATTACHMENT_NAME, image))
    }
}

#[async_trait]
impl Action for ChartAction {
    fn name(&self) -> &'static str {
        "GET_CHART"
    }

    fn similes(&self) -> &'static [&'static str] {
        &["CHECK_CHART", "FETCH_CHART", "PRICE_CHART", "SHOW_CHART"]
    }

    fn description(&self) -> &'static str {
        "Gets the price chart for tokens"
    }

    fn validate(&self, message: &Message) -> bool {
        let content = message.text.to_lowercase();
        let has_keyword = contains_any(&content, KEYWORDS) || contains_word(&content, "ta");
        has_keyword && (has_token_identifier(&message.text) || self.resolver.mentions_default(&content))
    }

    async fn handle(&self, message: &Message) -> Reply {
        match self.reply(message).await {
            Ok(reply) => reply,
            Err(e) => {
                error!("Error fetching chart: {}", e);
                Reply::new(APOLOGY, "CHART_ERROR", message.source.clone())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::testing::{default_address, resolver, WIF};
    use crate::api::{MockChartProvider, MockMarketDataProvider};
    use crate::error::Error;
    use mockall::predicate::eq;

    fn offline_market() -> MockMarketDataProvider {
        let mut market = MockMarketDataProvider::new();
        market.expect_search_pairs().never();
        market
    }

    fn action(market: MockMarketDataProvider, charts: MockChartProvider) -> ChartAction {
        ChartAction::new(Arc::new(market), Arc::new(charts), resolver())
    }

    #[test]
    fn test_validate() {
        let action = action(MockMarketDataProvider::new(), MockChartProvider::new());
        assert!(action.validate(&Message::new("Show me the bubbacat chart")));
        assert!(action.validate(&Message::new("Can I see $WIF's price action?")));
        assert!(action.validate(&Message::new("any ta on $bonk?")));
        // "ta" inside another word does not count
        assert!(!action.validate(&Message::new("what are the stats for $bonk")));
        assert!(!action.validate(&Message::new("draw me a graph")));
    }

    #[tokio::test]
    async fn test_chart_for_alias() {
        let mut charts = MockChartProvider::new();
        charts
            .expect_chart_png()
            .with(eq("solana"), eq(WIF))
            .times(1)
            .returning(|_, _| Ok(b"PNG".to_vec()));

        let reply = action(offline_market(), charts)
            .handle(&Message::new("Can I see $WIF's price action?"))
            .await;
        assert_eq!(reply.action, "CHART_INFO");
        assert_eq!(reply.text, "here is the chart for WIF");
        assert_eq!(reply.attachments.len(), 1);
        assert_eq!(reply.attachments[0].name, ATTACHMENT_NAME);
        assert_eq!(reply.attachments[0].bytes, b"PNG".to_vec());
    }

    #[tokio::test]
    async fn test_chart_for_default_token() {
        let mut charts = MockChartProvider::new();
        charts
            .expect_chart_png()
            .with(eq("solana"), eq(default_address()))
            .returning(|_, _| Ok(vec![1, 2, 3]));

        let reply = action(offline_market(), charts)
            .handle(&Message::new("bubbacat chart please"))
            .await;
        assert_eq!(reply.text, "here is the chart for bubbacat");
    }

    #[tokio::test]
    async fn test_chart_failure_has_no_attachment() {
        let mut charts = MockChartProvider::new();
        charts
            .expect_chart_png()
            .returning(|_, _| Err(Error::UpstreamFetch("dexscreener returned 500".to_string())));

        let reply = action(offline_market(), charts)
            .handle(&Message::new("$wif chart"))
            .await;
        assert_eq!(reply.action, "CHART_ERROR");
        assert_eq!(reply.text, APOLOGY);
        assert!(reply.attachments.is_empty());
    }
}
