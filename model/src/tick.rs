use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

/// An immutable, vendor-normalized price update for one commodity.
///
/// `commodity_id` is normalized to uppercase ASCII before a [`Tick`] is ever
/// constructed (MDG's responsibility); this type does not re-validate it on
/// every access, only on construction via [`Tick::new`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Tick {
    commodity_id: SmolStr,
    #[serde(with = "crate::wire::decimal")]
    pub match_price: Decimal,
}

/// A [`Tick`] failed MDG's normalization invariants.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TickError {
    #[error("commodity_id must be 1..=16 uppercase ASCII characters, got {0:?}")]
    InvalidCommodityId(String),
}

impl Tick {
    /// Builds a [`Tick`], uppercasing `commodity_id` and rejecting identifiers
    /// outside the 1..=16 ASCII-character range.
    pub fn new(commodity_id: &str, match_price: Decimal) -> Result<Self, TickError> {
        if commodity_id.is_empty()
            || commodity_id.len() > 16
            || !commodity_id.is_ascii()
            || !commodity_id.chars().all(|c| c.is_ascii_alphanumeric())
        {
            return Err(TickError::InvalidCommodityId(commodity_id.to_string()));
        }
        Ok(Self {
            commodity_id: SmolStr::new(commodity_id.to_ascii_uppercase()),
            match_price,
        })
    }

    pub fn commodity_id(&self) -> &str {
        &self.commodity_id
    }
}

/// The MDG publish envelope: a [`Tick`] stamped with the UTC instant it was
/// observed. Created at callback reception, destroyed after serialization;
/// never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct TickEvent {
    #[serde(with = "crate::wire::timestamp")]
    pub when: DateTime<Utc>,
    pub tick: Tick,
}

impl TickEvent {
    pub fn new(when: DateTime<Utc>, tick: Tick) -> Self {
        Self { when, tick }
    }

    pub fn commodity_id(&self) -> &str {
        self.tick.commodity_id()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn uppercases_commodity_id() {
        let tick = Tick::new("mxff5", dec!(22000)).unwrap();
        assert_eq!(tick.commodity_id(), "MXFF5");
    }

    #[test]
    fn rejects_empty_and_overlong_ids() {
        assert!(Tick::new("", dec!(1)).is_err());
        assert!(Tick::new(&"A".repeat(17), dec!(1)).is_err());
    }

    #[test]
    fn rejects_non_alphanumeric() {
        assert!(Tick::new("MX-F5", dec!(1)).is_err());
    }
}
