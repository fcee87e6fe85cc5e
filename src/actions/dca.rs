use crate::actions::{contains_any, Action};
use crate::api::{DcaProvider, MarketDataProvider};
use crate::error::Result;
use crate::models::{ActiveDcas, DcaOrder, Message, Reply};
use crate::resolver::{has_token_identifier, TokenResolver};
use crate::utils::{abbreviate, format_locale};
use async_trait::async_trait;
use log::{error, info};
use std::sync::Arc;

const KEYWORDS: &[&str] = &["all dcas", "dca list", "dcas", "active"];

/// Orders below this USD size are folded into a single summary line.
const VISIBLE_ORDER_SIZE: f64 = 10_000.0;

const NO_POSITIONS: &str = "No active DCA positions found for this token.";
const APOLOGY: &str = "Sorry, I couldn't fetch the DCA positions right now. Please try again later.";

/// Lists active DCA orders for a token, largest first.
pub struct DcaAction {
    market: Arc<dyn MarketDataProvider>,
    dca: Arc<dyn DcaProvider>,
    resolver: Arc<TokenResolver>,
}

fn price_bound(bound: Option<f64>) -> String {
    bound.map_or_else(|| "none".to_string(), |p| p.to_string())
}

fn format_order(index: usize, order: &DcaOrder) -> String {
    let frequency = order.frequency_minutes();
    let conditional = match order.price_bounds() {
        Some((min, max)) => format!(
            " (conditional - min: ${} max: ${})",
            price_bound(min),
            price_bound(max)
        ),
        None => String::new(),
    };
    format!(
        "{}. [{} -> {} | Amount: {} {} (${:.0}) | Frequency: Every {} {} ({:.0} swaps) | Progress: {:.1}%{}](https://solscan.io/account/{})",
        index + 1,
        order.input_mint_symbol,
        order.output_mint_symbol,
        abbreviate(order.order_in_amount),
        order.input_mint_symbol,
        order.order_size,
        frequency,
        if frequency > 1.0 { "minutes" } else { "minute" },
        order.swap_count(),
        order.progress * 100.0,
        conditional,
        order.dca_delegate
    )
}

fn format_active(active: &ActiveDcas) -> String {
    let mut orders: Vec<&DcaOrder> = active.orders.iter().collect();
    orders.sort_by(|a, b| b.order_size.total_cmp(&a.order_size));
    let (visible, hidden): (Vec<&DcaOrder>, Vec<&DcaOrder>) = orders
        .into_iter()
        .partition(|order| order.order_size >= VISIBLE_ORDER_SIZE);

    let lines: Vec<String> = visible
        .iter()
        .enumerate()
        .map(|(i, order)| format_order(i, order))
        .collect();
    let mut text = format!(
        "Found {} active DCA position(s):\n{}",
        active.orders.len(),
        lines.join("\n")
    );

    if !hidden.is_empty() {
        let total: f64 = hidden.iter().map(|order| order.order_size).sum();
        text.push_str(&format!(
            "\n\n+ {} more order(s) with total size of ${:.0} (hidden to avoid spam)",
            hidden.len(),
            total
        ));
    }

    text.push_str(&format!(
        "\n\nTotal Buy Pressure: ${}\nTotal Sell Pressure: ${}",
        format_locale(active.stats.total_buy_power),
        format_locale(active.stats.total_sell_power)
    ));
    text
}

impl DcaAction {
    pub fn new(
        market: Arc<dyn MarketDataProvider>,
        dca: Arc<dyn DcaProvider>,
        resolver: Arc<TokenResolver>,
    ) -> Self {
        Self { market, dca, resolver }
    }

    async fn reply(&self, message: &Message) -> Result<Reply> {
        let address = self.resolver.resolve(self.market.as_ref(), &message.text).await?;
        let active = self.dca.active_positions(&address).await?;
        info!("Found {} active DCA orders for {}", active.orders.len(), address);

        let text = if active.orders.is_empty() {
            NO_POSITIONS.to_string()
        } else {
            format_active(&active)
        };
        Ok(Reply::new(text, "DCA_RESULT", message.source.clone()))
    }
}

#[async_trait]
impl Action for DcaAction {
    fn name(&self) -> &'static str {
        "DCA"
    }

    fn similes(&self) -> &'static [&'static str] {
        &["GET_DCA", "ACTIVE_DCA", "CHECK_DCA"]
    }

    fn description(&self) -> &'static str {
        "Gets active DCA positions for a given token"
    }

    fn validate(&self, message: &Message) -> bool {
        contains_any(&message.text.to_lowercase(), KEYWORDS) && has_token_identifier(&message.text)
    }

    async fn handle(&self, message: &Message) -> Reply {
        match self.reply(message).await {
            Ok(reply) => reply,
            Err(e) => {
                error!("Error fetching DCA positions: {}", e);
                Reply::new(APOLOGY, "DCA_ERROR", message.source.clone())
            }
        }
    }
}
