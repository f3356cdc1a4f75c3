use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{UtcDateTime, ValidationError};

/// One executed trade for the instrument under analysis.
///
/// Fields are private so a record can only come from [`TradeRecord::new`];
/// the aggregation engine relies on `price >= 0` and `size > 0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "TradeFields")]
pub struct TradeRecord {
    ts_event: UtcDateTime,
    price: Decimal,
    size: u64,
}

impl TradeRecord {
    pub fn new(ts_event: UtcDateTime, price: Decimal, size: u64) -> Result<Self, ValidationError> {
        if price.is_sign_negative() && !price.is_zero() {
            return Err(ValidationError::NegativeValue { field: "price" });
        }
        if size == 0 {
            return Err(ValidationError::NonPositiveSize);
        }

        Ok(Self {
            ts_event,
            price: price.normalize(),
            size,
        })
    }

    pub const fn ts_event(&self) -> UtcDateTime {
        self.ts_event
    }

    pub const fn price(&self) -> Decimal {
        self.price
    }

    pub const fn size(&self) -> u64 {
        self.size
    }

    /// `price * size`, or `None` when it does not fit a `Decimal`.
    pub fn notional(&self) -> Option<Decimal> {
        self.price.checked_mul(Decimal::from(self.size))
    }
}

#[derive(Deserialize)]
struct TradeFields {
    ts_event: UtcDateTime,
    price: Decimal,
    size: u64,
}

impl TryFrom<TradeFields> for TradeRecord {
    type Error = ValidationError;

    fn try_from(value: TradeFields) -> Result<Self, Self::Error> {
        Self::new(value.ts_event, value.price, value.size)
    }
}

/// Parse a vendor price string exactly, without a float round trip.
pub fn parse_price(input: &str) -> Result<Decimal, ValidationError> {
    Decimal::from_str(input.trim()).map_err(|_| ValidationError::InvalidPrice {
        value: input.to_owned(),
    })
}
