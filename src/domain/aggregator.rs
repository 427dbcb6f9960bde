//! Metrics Aggregator
//!
//! Folds a batch of pool records into one aggregate per token mint.
//! A pool's liquidity and volume are pair metrics, so each pool counts
//! toward both of its mints.

use std::collections::{HashMap, HashSet};

use super::pool::{PoolField, PoolRecord};

/// Per-mint metrics summed over every pool that contains the mint
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TokenAggregate {
    /// Token mint address
    pub mint: String,
    /// Summed pool liquidity in USD
    pub liquidity: f64,
    /// Summed 24h volume in USD
    pub volume: f64,
    /// Addresses of contributing pools
    pub pools: HashSet<String>,
    /// Price from the last pool seen for this mint (listing order)
    pub latest_price: f64,
}

impl TokenAggregate {
    fn new(mint: &str) -> Self {
        Self {
            mint: mint.to_string(),
            ..Default::default()
        }
    }

    pub fn pool_count(&self) -> usize {
        self.pools.len()
    }
}

/// Aggregated view of one listing fetch
#[derive(Debug, Clone, Default)]
pub struct PoolSnapshot {
    tokens: HashMap<String, TokenAggregate>,
    /// Pools processed in this batch
    pub pool_count: usize,
    /// Numeric fields that failed to parse and were read as zero
    pub malformed_fields: usize,
}

impl PoolSnapshot {
    /// Every mint seen in the batch
    pub fn mints(&self) -> impl Iterator<Item = &str> {
        self.tokens.keys().map(String::as_str)
    }

    pub fn contains(&self, mint: &str) -> bool {
        self.tokens.contains_key(mint)
    }

    pub fn get(&self, mint: &str) -> Option<&TokenAggregate> {
        self.tokens.get(mint)
    }

    pub fn tokens(&self) -> impl Iterator<Item = &TokenAggregate> {
        self.tokens.values()
    }

    pub fn token_count(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Tokens sorted by liquidity, highest first
    pub fn top_by_liquidity(&self, n: usize) -> Vec<&TokenAggregate> {
        let mut tokens: Vec<&TokenAggregate> = self.tokens.values().collect();
        tokens.sort_by(|a, b| b.liquidity.total_cmp(&a.liquidity).then_with(|| a.mint.cmp(&b.mint)));
        tokens.truncate(n);
        tokens
    }
}

/// Read one numeric field, logging and zeroing it on failure
fn field_or_zero(record: &PoolRecord, field: PoolField, malformed: &mut usize) -> f64 {
    match record.metric(field) {
        Ok(value) => value,
        Err(e) => {
            *malformed += 1;
            tracing::warn!(
                "Pool {}: bad {} field ({}), using 0",
                record.address.as_deref().unwrap_or("<unknown>"),
                field.as_str(),
                e
            );
            0.0
        }
    }
}

/// Build per-mint aggregates from a batch of pool records
pub fn aggregate(records: &[PoolRecord]) -> PoolSnapshot {
    let mut snapshot = PoolSnapshot {
        pool_count: records.len(),
        ..Default::default()
    };

    for record in records {
        let volume = field_or_zero(record, PoolField::Volume, &mut snapshot.malformed_fields);
        let liquidity = field_or_zero(record, PoolField::Liquidity, &mut snapshot.malformed_fields);
        let price = field_or_zero(record, PoolField::Price, &mut snapshot.malformed_fields);

        for mint in record.mints() {
            let entry = snapshot
                .tokens
                .entry(mint.to_string())
                .or_insert_with(|| TokenAggregate::new(mint));

            entry.volume += volume;
            entry.liquidity += liquidity;
            if let Some(address) = record.address.as_deref() {
                entry.pools.insert(address.to_string());
            }
            entry.latest_price = price;
        }
    }

    snapshot
}
