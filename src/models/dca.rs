use serde::{Deserialize, Deserializer, Serialize};

/// One active DCA order as reported by the DCA provider.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DcaOrder {
    pub input_mint_symbol: String,
    pub output_mint_symbol: String,
    #[serde(deserialize_with = "number_or_string")]
    pub order_in_amount: f64,
    #[serde(deserialize_with = "number_or_string")]
    pub order_in_amount_per_cycle: f64,
    /// USD value of the whole order.
    #[serde(deserialize_with = "number_or_string")]
    pub order_size: f64,
    /// Seconds between swaps.
    #[serde(deserialize_with = "number_or_string")]
    pub order_cycle_frequency: f64,
    /// Filled share, 0..=1.
    #[serde(default, deserialize_with = "number_or_string")]
    pub progress: f64,
    #[serde(default, deserialize_with = "optional_number")]
    pub order_min_price: Option<f64>,
    #[serde(default, deserialize_with = "optional_number")]
    pub order_max_price: Option<f64>,
    pub dca_delegate: String,
}

impl DcaOrder {
    pub fn frequency_minutes(&self) -> f64 {
        self.order_cycle_frequency / 60.0
    }

    pub fn swap_count(&self) -> f64 {
        if self.order_in_amount_per_cycle > 0.0 {
            (self.order_in_amount / self.order_in_amount_per_cycle).round()
        } else {
            0.0
        }
    }

    /// Min and max price, if either bound is set. Zero counts as unset.
    pub fn price_bounds(&self) -> Option<(Option<f64>, Option<f64>)> {
        let min = self.order_min_price.filter(|p| *p != 0.0);
        let max = self.order_max_price.filter(|p| *p != 0.0);
        (min.is_some() || max.is_some()).then_some((min, max))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DcaStats {
    #[serde(default, deserialize_with = "number_or_string")]
    pub total_buy_power: f64,
    #[serde(default, deserialize_with = "number_or_string")]
    pub total_sell_power: f64,
}

/// Body of the active-orders endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActiveDcas {
    pub orders: Vec<DcaOrder>,
    #[serde(default)]
    pub stats: DcaStats,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Raw {
    Number(f64),
    Text(String),
}

fn number_or_string<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    match Raw::deserialize(deserializer)? {
        Raw::Number(n) => Ok(n),
        Raw::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

fn optional_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Raw>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Raw::Number(n)) => Ok(Some(n)),
        Some(Raw::Text(s)) if s.trim().is_empty() => Ok(None),
        Some(Raw::Text(s)) => s.trim().parse().map(Some).map_err(serde::de::Error::custom),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_active_dcas_body() {
        let body = r#"{
            "orders": [{
                "input_mint_symbol": "USDC",
                "output_mint_symbol": "BONK",
                "order_in_amount": 25000,
                "order_in_amount_per_cycle": "500",
                "order_size": 25000.4,
                "order_cycle_frequency": "300",
                "progress": 0.25,
                "order_min_price": null,
                "order_max_price": "0.00003",
                "dca_delegate": "Delegate1"
            }],
            "stats": {"totalBuyPower": 25000.4, "totalSellPower": "0"}
        }"#;
        let active: ActiveDcas = serde_json::from_str(body).unwrap();
        let order = &active.orders[0];
        assert_eq!(order.frequency_minutes(), 5.0);
        assert_eq!(order.swap_count(), 50.0);
        assert_eq!(order.price_bounds(), Some((None, Some(0.00003))));
        assert_eq!(active.stats.total_sell_power, 0.0);
    }

    #[test]
    fn test_missing_orders_is_rejected() {
        assert!(serde_json::from_str::<ActiveDcas>(r#"{"error": "nope"}"#).is_err());
    }

    #[test]
    fn test_zero_bounds_are_unset() {
        let order = DcaOrder {
            order_min_price: Some(0.0),
            ..Default::default()
        };
        assert_eq!(order.price_bounds(), None);
        assert_eq!(order.swap_count(), 0.0);
    }
}
