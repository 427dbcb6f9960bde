//! Pool Records
//!
//! Raw pool entries as served by the DLMM pair listing. The listing is
//! loosely typed: numeric fields arrive as JSON numbers, numeric strings,
//! nulls, or not at all. Parsing here is lenient so a single bad field
//! never poisons a batch.

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use thiserror::Error;

/// Errors from parsing a single numeric pool field
#[derive(Debug, Clone, Error, PartialEq)]
pub enum MetricParseError {
    #[error("not a number: {0:?}")]
    NotNumeric(String),
    #[error("non-finite value: {0}")]
    NonFinite(f64),
    #[error("unexpected JSON type: {0}")]
    UnexpectedType(&'static str),
}

/// Which numeric field of a pool record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolField {
    Liquidity,
    Volume,
    Price,
}

impl PoolField {
    pub fn as_str(&self) -> &'static str {
        match self {
            PoolField::Liquidity => "liquidity",
            PoolField::Volume => "trade_volume_24h",
            PoolField::Price => "current_price",
        }
    }
}

/// One liquidity pair from the listing
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PoolRecord {
    /// Pool (pair) address
    #[serde(default, deserialize_with = "string_or_none")]
    pub address: Option<String>,
    /// First token mint of the pair
    #[serde(default, deserialize_with = "string_or_none")]
    pub mint_x: Option<String>,
    /// Second token mint of the pair
    #[serde(default, deserialize_with = "string_or_none")]
    pub mint_y: Option<String>,
    /// Pool liquidity in USD (usually a numeric string)
    #[serde(default)]
    pub liquidity: Option<Value>,
    /// Trailing 24h trade volume in USD
    #[serde(default, rename = "trade_volume_24h")]
    pub volume: Option<Value>,
    /// Current pair price
    #[serde(default, rename = "current_price")]
    pub price: Option<Value>,
}

impl PoolRecord {
    /// Build a record with numeric metrics, mostly for fixtures and tooling
    pub fn new(address: &str, mint_x: &str, mint_y: &str, liquidity: f64, volume: f64, price: f64) -> Self {
        Self {
            address: Some(address.to_string()),
            mint_x: Some(mint_x.to_string()),
            mint_y: Some(mint_y.to_string()),
            liquidity: Some(Value::from(liquidity)),
            volume: Some(Value::from(volume)),
            price: Some(Value::from(price)),
        }
    }

    /// Raw value of a numeric field
    pub fn raw(&self, field: PoolField) -> Option<&Value> {
        match field {
            PoolField::Liquidity => self.liquidity.as_ref(),
            PoolField::Volume => self.volume.as_ref(),
            PoolField::Price => self.price.as_ref(),
        }
    }

    /// Parse a numeric field. Absent or null fields read as zero.
    pub fn metric(&self, field: PoolField) -> Result<f64, MetricParseError> {
        parse_metric(self.raw(field))
    }

    /// The non-empty mints this pool references
    pub fn mints(&self) -> impl Iterator<Item = &str> {
        [self.mint_x.as_deref(), self.mint_y.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|m| !m.is_empty())
    }
}

/// Accept a JSON string; any other type leaves the slot empty
fn string_or_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Ok(Some(s)),
        Some(other) => {
            tracing::debug!("Ignoring non-string pool identifier: {}", other);
            Ok(None)
        }
        None => Ok(None),
    }
}

/// Lenient numeric parse of a listing field
pub fn parse_metric(value: Option<&Value>) -> Result<f64, MetricParseError> {
    let parsed = match value {
        None | Some(Value::Null) => return Ok(0.0),
        Some(Value::Number(n)) => n
            .as_f64()
            .ok_or_else(|| MetricParseError::NotNumeric(n.to_string()))?,
        Some(Value::String(s)) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return Ok(0.0);
            }
            trimmed
                .parse::<f64>()
                .map_err(|_| MetricParseError::NotNumeric(s.clone()))?
        }
        Some(Value::Bool(_)) => return Err(MetricParseError::UnexpectedType("bool")),
        Some(Value::Array(_)) => return Err(MetricParseError::UnexpectedType("array")),
        Some(Value::Object(_)) => return Err(MetricParseError::UnexpectedType("object")),
    };

    if !parsed.is_finite() {
        return Err(MetricParseError::NonFinite(parsed));
    }
    Ok(parsed)
}

/// Decode a raw listing into records, dropping entries that are not
/// pool-shaped. Returns the records and the number of entries skipped.
pub fn decode_listing(entries: Vec<Value>) -> (Vec<PoolRecord>, usize) {
    let mut records = Vec::with_capacity(entries.len());
    let mut skipped = 0;

    for entry in entries {
        match serde_json::from_value::<PoolRecord>(entry) {
            Ok(record) => records.push(record),
            Err(e) => {
                skipped += 1;
                tracing::warn!("Skipping undecodable pool entry: {}", e);
            }
        }
    }

    (records, skipped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_number_and_numeric_string() {
        assert_eq!(parse_metric(Some(&json!(1250.5))).unwrap(), 1250.5);
        assert_eq!(parse_metric(Some(&json!("1250.5"))).unwrap(), 1250.5);
        assert_eq!(parse_metric(Some(&json!(" 42 "))).unwrap(), 42.0);
        assert_eq!(parse_metric(Some(&json!(7))).unwrap(), 7.0);
    }

    #[test]
    fn test_absent_null_and_empty_read_as_zero() {
        assert_eq!(parse_metric(None).unwrap(), 0.0);
        assert_eq!(parse_metric(Some(&Value::Null)).unwrap(), 0.0);
        assert_eq!(parse_metric(Some(&json!(""))).unwrap(), 0.0);
    }

    #[test]
    fn test_malformed_values_rejected() {
        assert!(matches!(
            parse_metric(Some(&json!("abc"))),
            Err(MetricParseError::NotNumeric(_))
        ));
        assert!(matches!(
            parse_metric(Some(&json!("NaN"))),
            Err(MetricParseError::NonFinite(_))
        ));
        assert!(matches!(
            parse_metric(Some(&json!("inf"))),
            Err(MetricParseError::NonFinite(_))
        ));
        assert!(matches!(
            parse_metric(Some(&json!(true))),
            Err(MetricParseError::UnexpectedType("bool"))
        ));
        assert!(matches!(
            parse_metric(Some(&json!({"usd": 1}))),
            Err(MetricParseError::UnexpectedType("object"))
        ));
    }

    #[test]
    fn test_deserialize_listing_entry() {
        let entry = json!({
            "address": "PoolAddr1",
            "name": "FOO-SOL",
            "mint_x": "MintFoo",
            "mint_y": "So11111111111111111111111111111111111111112",
            "liquidity": "15234.77",
            "trade_volume_24h": 80210.5,
            "current_price": 0.0041,
            "bin_step": 100
        });

        let record: PoolRecord = serde_json::from_value(entry).unwrap();
        assert_eq!(record.address.as_deref(), Some("PoolAddr1"));
        assert_eq!(record.metric(PoolField::Liquidity).unwrap(), 15234.77);
        assert_eq!(record.metric(PoolField::Volume).unwrap(), 80210.5);
        assert_eq!(record.metric(PoolField::Price).unwrap(), 0.0041);
        assert_eq!(record.mints().count(), 2);
    }

    #[test]
    fn test_empty_mint_slots_skipped() {
        let record = PoolRecord {
            address: Some("Pool".to_string()),
            mint_x: Some("".to_string()),
            mint_y: None,
            ..Default::default()
        };
        assert_eq!(record.mints().count(), 0);

        let record = PoolRecord {
            mint_x: Some("MintA".to_string()),
            mint_y: Some("   ".to_string()),
            ..Default::default()
        };
        assert_eq!(record.mints().collect::<Vec<_>>(), vec!["MintA"]);
    }

    #[test]
    fn test_decode_listing_skips_bad_entries() {
        let entries = vec![
            json!({"address": "P1", "mint_x": "A", "mint_y": "B", "liquidity": "10"}),
            json!("not a pool"),
            json!({"address": "P3", "mint_x": "C", "mint_y": "D"}),
        ];

        let (records, skipped) = decode_listing(entries);
        assert_eq!(records.len(), 2);
        assert_eq!(skipped, 1);
        assert_eq!(records[1].address.as_deref(), Some("P3"));
    }

    #[test]
    fn test_wrong_typed_identifiers_only_drop_their_slot() {
        let entries = vec![
            json!({"address": "P2", "mint_x": 12345, "mint_y": "C", "liquidity": "750", "trade_volume_24h": 90}),
            json!({"address": 99, "mint_x": "E", "mint_y": ["F"], "liquidity": 20}),
        ];

        let (records, skipped) = decode_listing(entries);
        assert_eq!(skipped, 0);
        assert_eq!(records.len(), 2);

        assert_eq!(records[0].mint_x, None);
        assert_eq!(records[0].mints().collect::<Vec<_>>(), vec!["C"]);
        assert_eq!(records[0].metric(PoolField::Liquidity).unwrap(), 750.0);
        assert_eq!(records[0].metric(PoolField::Volume).unwrap(), 90.0);

        assert_eq!(records[1].address, None);
        assert_eq!(records[1].mints().collect::<Vec<_>>(), vec!["E"]);
    }

    #[test]
    fn test_null_identifiers_read_as_absent() {
        let record: PoolRecord =
            serde_json::from_value(json!({"address": null, "mint_x": "A", "mint_y": null})).unwrap();
        assert_eq!(record.address, None);
        assert_eq!(record.mints().collect::<Vec<_>>(), vec!["A"]);
    }

    #[test]
    fn test_field_names() {
        assert_eq!(PoolField::Liquidity.as_str(), "liquidity");
        assert_eq!(PoolField::Volume.as_str(), "trade_volume_24h");
        assert_eq!(PoolField::Price.as_str(), "current_price");
    }
}
