//! Chat actions. Each one decides from keywords whether a message is meant
//! for it and turns the market data behind it into a reply.

use crate::api::{ChartProvider, DcaProvider, ImageGenerator, MarketDataProvider};
use crate::metrics;
use crate::models::{Message, Reply};
use crate::resolver::TokenResolver;
use async_trait::async_trait;
use log::{debug, info};
use std::sync::Arc;

pub mod chart;
pub mod dca;
pub mod dca_summary;
pub mod image;
pub mod price;
pub mod stats;
pub mod whatif;

pub use chart::ChartAction;
pub use dca::DcaAction;
pub use dca_summary::DcaSummaryAction;
pub use image::GenerateImageAction;
pub use price::PriceAction;
pub use stats::StatsAction;
pub use whatif::WhatIfAction;

#[async_trait]
pub trait Action: Send + Sync {
    fn name(&self) -> &'static str;

    fn similes(&self) -> &'static [&'static str];

    fn description(&self) -> &'static str;

    /// Cheap keyword check, no I/O.
    fn validate(&self, message: &Message) -> bool;

    /// Never fails: errors come back as an apology reply tagged `*_ERROR`.
    async fn handle(&self, message: &Message) -> Reply;
}

/// Everything the actions talk to.
#[derive(Clone)]
pub struct Services {
    pub market: Arc<dyn MarketDataProvider>,
    pub charts: Arc<dyn ChartProvider>,
    pub dca: Arc<dyn DcaProvider>,
    pub images: Arc<dyn ImageGenerator>,
    pub resolver: Arc<TokenResolver>,
}

pub(crate) fn contains_any(content: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|keyword| content.contains(keyword))
}

pub(crate) fn contains_word(content: &str, word: &str) -> bool {
    content
        .split(|c: char| !c.is_alphanumeric())
        .any(|w| w == word)
}

pub(crate) fn is_error_reply(reply: &Reply) -> bool {
    reply.action.ends_with("_ERROR")
}

pub struct ActionRegistry {
    actions: Vec<Box<dyn Action>>,
}

impl ActionRegistry {
    pub fn new(actions: Vec<Box<dyn Action>>) -> Self {
        Self { actions }
    }

    /// All built-in actions, most specific first.
    pub fn with_defaults(services: &Services) -> Self {
        Self::new(vec![
            Box::new(GenerateImageAction::new(services.images.clone())),
            Box::new(DcaSummaryAction::new(
                services.market.clone(),
                services.dca.clone(),
                services.resolver.clone(),
            )),
            Box::new(DcaAction::new(
                services.market.clone(),
                services.dca.clone(),
                services.resolver.clone(),
            )),
            Box::new(WhatIfAction::new(services.market.clone(), services.resolver.clone())),
            Box::new(ChartAction::new(
                services.market.clone(),
                services.charts.clone(),
                services.resolver.clone(),
            )),
            Box::new(StatsAction::new(services.market.clone(), services.resolver.clone())),
            Box::new(PriceAction::new(services.market.clone(), services.resolver.clone())),
        ])
    }

    pub fn actions(&self) -> impl Iterator<Item = &dyn Action> {
        self.actions.iter().map(|a| a.as_ref())
    }

    pub fn find(&self, message: &Message) -> Option<&dyn Action> {
        self.actions().find(|action| action.validate(message))
    }

    /// Runs the first action that accepts the message.
    pub async fn dispatch(&self, message: &Message) -> Option<Reply> {
        let Some(action) = self.find(message) else {
            debug!("No action matched message");
            return None;
        };

        info!("Dispatching message to {}", action.name());
        let reply = action.handle(message).await;
        metrics::record_action(action.name(), is_error_reply(&reply));
        Some(reply)
    }
}
