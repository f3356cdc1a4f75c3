//! # Domain Models
//!
//! Canonical domain types for a single-instrument, single-session trade tape.
//!
//! ## Models
//!
//! | Type | Description |
//! |------|-------------|
//! | [`TradeRecord`] | One executed trade: timestamp, price, size |
//! | [`Symbol`] | Validated instrument symbol |
//! | [`UtcDateTime`] | UTC timestamp with nanosecond precision |
//! | [`SessionTimezone`] | IANA timezone used for hour truncation |
//! | [`SessionDate`] | Calendar date of the session |
//! | [`SessionWindow`] | Optional local-time trading window filter |
//! | [`SourceId`] | Identifier of the ingestion source |
//!
//! ## Validation
//!
//! Construction validates all invariants, so a [`TradeRecord`] in hand is
//! always well-formed:
//!
//! ```rust
//! use rust_decimal::Decimal;
//! use tickroll_core::{TradeRecord, UtcDateTime, ValidationError};
//!
//! let ts = UtcDateTime::parse("2024-12-23T14:30:00Z")?;
//! assert!(TradeRecord::new(ts, Decimal::new(8150, 2), 100).is_ok());
//! assert_eq!(
//!     TradeRecord::new(ts, Decimal::new(8150, 2), 0),
//!     Err(ValidationError::NonPositiveSize)
//! );
//! # Ok::<(), ValidationError>(())
//! ```

mod session;
mod source;
mod symbol;
mod timestamp;
mod trade;

pub use session::{SessionDate, SessionTimezone, SessionWindow};
pub use source::SourceId;
pub use symbol::Symbol;
pub use timestamp::UtcDateTime;
pub use trade::{parse_price, TradeRecord};
