//! # Tickroll Core
//!
//! Core contracts and the aggregation engine for the tickroll trade-tape toolkit.
//!
//! ## Overview
//!
//! This crate turns one session of trades for one instrument into an
//! [`AggregationReport`]:
//!
//! - **Domain models** for trade records, symbols, timestamps and sessions
//! - **Bucketing engine** that folds price extremes per session-local hour
//! - **Daily reducer** for range, total volume and trade-size extremes
//! - **Report assembler** that runs both reductions over one snapshot
//! - **Annotations and chart series** that prepare the tape for visualization
//! - **Ingestion contracts** ([`TradeSource`]) with Databento and CSV adapters
//! - **CSV persistence** for the raw and annotated tape
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`adapters`] | Trade sources (Databento historical API, CSV file) |
//! | [`aggregation`] | Bucketing engine, daily reducer, report assembler, annotations |
//! | [`chart`] | Visualization-ready series built from a report |
//! | [`config`] | Report configuration (symbol, date, timezone, session window) |
//! | [`data_source`] | Trade source trait and request/response types |
//! | [`domain`] | Domain models (TradeRecord, Symbol, UtcDateTime, sessions) |
//! | [`envelope`] | Response envelope with metadata |
//! | [`error`] | Core error types |
//! | [`http_client`] | HTTP client abstraction |
//! | [`persist`] | CSV writers |
//! | [`retry`] | Retry and backoff policy for ingestion |
//!
//! ## Quick Start
//!
//! ```rust
//! use rust_decimal::Decimal;
//! use tickroll_core::{ReportAssembler, ReportConfig, TradeRecord, UtcDateTime};
//!
//! let config = ReportConfig::parse("PLTR", "2024-12-23", "America/New_York")?;
//! let trades = vec![
//!     TradeRecord::new(UtcDateTime::parse("2024-12-23T14:15:00Z")?, Decimal::new(1000, 2), 100)?,
//!     TradeRecord::new(UtcDateTime::parse("2024-12-23T14:45:00Z")?, Decimal::new(1200, 2), 50)?,
//! ];
//!
//! let report = ReportAssembler::new(config).assemble(&trades)?;
//! assert_eq!(report.hourly.len(), 1);
//! assert_eq!(report.daily.total_volume, 150);
//! # Ok::<(), tickroll_core::CoreError>(())
//! ```
//!
//! ## Error Handling
//!
//! A day without trades is surfaced as [`AggregationError::EmptyInput`] rather
//! than a zeroed report:
//!
//! ```rust
//! use tickroll_core::{reduce, AggregationError};
//!
//! let err = reduce(&[]).expect_err("no trades");
//! assert_eq!(err, AggregationError::EmptyInput);
//! ```

pub mod adapters;
pub mod aggregation;
pub mod chart;
pub mod config;
pub mod data_source;
pub mod domain;
pub mod envelope;
pub mod error;
pub mod http_client;
pub mod persist;
pub mod retry;

// Adapter implementations
pub use adapters::{CsvFileSource, DatabentoAdapter, DatabentoConfig};

// Aggregation engine
pub use aggregation::{
    annotate, assemble, bucketize, bucketize_filtered, reduce, AggregationReport,
    AnnotatedTrade, DailyStats, HourKey, HourlyBucket, ReportAssembler, TradeNote,
};

// Visualization series
pub use chart::{ChartMarker, ChartPoint, ChartSeries, VolumeBar};

// Configuration
pub use config::ReportConfig;

// Trade source trait and types
pub use data_source::{SourceError, SourceErrorKind, TradeBatch, TradeQuery, TradeSource};

// Domain models
pub use domain::{
    SessionDate, SessionTimezone, SessionWindow, SourceId, Symbol, TradeRecord, UtcDateTime,
};

// Envelope types
pub use envelope::{Envelope, EnvelopeMeta};

// Error types
pub use error::{AggregationError, CoreError, ValidationError};

// HTTP client types
pub use http_client::{
    HttpAuth, HttpClient, HttpError, HttpRequest, HttpResponse, ReqwestHttpClient,
};

// Persistence
pub use persist::{default_export_file_name, write_annotated_csv, write_trades_csv, PersistError};

// Retry logic
pub use retry::{Backoff, RetryConfig};
