use crate::error::{Error, Result};
use crate::models::TradingPair;
use log::debug;
use std::cmp::Ordering;

fn descending(a: f64, b: f64) -> Ordering {
    b.partial_cmp(&a).unwrap_or(Ordering::Equal)
}

fn matches_query(pair: &TradingPair, query: &str, chain: &str) -> bool {
    pair.chain_id == chain
        && (pair.base_token.symbol.to_lowercase().contains(query)
            || pair.base_token.address.to_lowercase().contains(query))
}

/// Picks the most representative pair for `query` on `chain`.
///
/// The highest-fdv candidate decides which token is meant. Among that
/// token's pools the one with the most 24h volume wins.
pub fn rank(pairs: &[TradingPair], query: &str, chain: &str) -> Result<TradingPair> {
    let query = query.to_lowercase();

    let mut candidates: Vec<&TradingPair> = pairs
        .iter()
        .filter(|pair| matches_query(pair, &query, chain))
        .collect();

    if candidates.is_empty() {
        return Err(Error::NoPairsFound(format!(
            "no {} pair has '{}' as its base token",
            chain, query
        )));
    }

    candidates.sort_by(|a, b| descending(a.fdv_or_zero(), b.fdv_or_zero()));
    let main_address = candidates[0].base_token.address.clone();
    debug!("Main token for '{}' by fdv: {}", query, main_address);

    let mut main_pairs: Vec<&TradingPair> = candidates
        .into_iter()
        .filter(|pair| pair.base_token.address == main_address)
        .collect();
    main_pairs.sort_by(|a, b| descending(a.volume_h24(), b.volume_h24()));

    Ok(main_pairs[0].clone())
}
