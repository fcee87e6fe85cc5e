use crate::actions::{contains_any, Action};
use crate::api::{DcaProvider, MarketDataProvider};
use crate::error::Result;
use crate::models::{Message, Reply};
use crate::resolver::{has_token_identifier, TokenResolver};
use async_trait::async_trait;
use log::{error, info};
use std::sync::Arc;

const KEYWORDS: &[&str] = &["summary", "table", "report"];

const APOLOGY: &str = "Sorry, I couldn't process the DCA summary right now. Please try again later.";

pub const ATTACHMENT_NAME: &str = "dca-summary.png";

pub struct DcaSummaryAction {
    market: Arc<dyn MarketDataProvider>,
    dca: Arc<dyn DcaProvider>,
    resolver: Arc<TokenResolver>,
}

impl DcaSummaryAction {
    pub fn new(
        market: Arc<dyn MarketDataProvider>,
        dca: Arc<dyn DcaProvider>,
        resolver: Arc<TokenResolver>,
    ) -> Self {
        Self { market, dca, resolver }
    }

    async fn reply(&self, message: &Message) -> Result<Reply> {
        let address = self.resolver.resolve(self.market.as_ref(), &message.text).await?;
        let image = self.dca.report_image(&address).await?;
        info!("Received {} byte DCA report for {}", image.len(), address);

        let text = format!(
            "here is the DCA summary for {}",
            self.resolver.display_name(&message.text, &address)
        );
        Ok(Reply::new(text, "DCA_SUMMARY_RESULT", message.source.clone())
            .with_attachment(ATTACHMENT_NAME, image))
    }
}

#[async_trait]
impl Action for DcaSummaryAction {
    fn name(&self) -> &'static str {
        "DCA_SUMMARY"
    }

    fn similes(&self) -> &'static [&'static str] {
        &["GET_DCA_SUMMARY", "DCA_TABLE", "DCA_REPORT"]
    }

    fn description(&self) -> &'static str {
        "Gets a summary table of active DCA positions for a given token"
    }

    fn validate(&self, message: &Message) -> bool {
        let content = message.text.to_lowercase();
        content.contains("dca") && contains_any(&content, KEYWORDS) && has_token_identifier(&message.text)
    }

    async fn handle(&self, message: &Message) -> Reply {
        match self.reply(message).await {
            Ok(reply) => reply,
            Err(e) => {
                error!("Error processing DCA summary: {}", e);
                Reply::new(APOLOGY, "DCA_SUMMARY_ERROR", message.source.clone())
            }
        }
    }
}
