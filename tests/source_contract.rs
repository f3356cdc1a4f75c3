//! Contract tests for trade sources
//!
//! Every `TradeSource` must return only the trades of the requested local
//! session day, sorted by event time, and classify failures by kind.

use std::future::Future;
use std::io::Write;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use rust_decimal_macros::dec;
use tickroll_core::{
    CsvFileSource, DatabentoAdapter, DatabentoConfig, HttpClient, HttpError, HttpRequest,
    HttpResponse, ReportAssembler, ReportConfig, RetryConfig, SourceErrorKind, SourceId,
    TradeQuery, TradeSource,
};

struct ScriptedClient {
    responses: Mutex<Vec<Result<HttpResponse, HttpError>>>,
}

impl ScriptedClient {
    fn new(mut responses: Vec<Result<HttpResponse, HttpError>>) -> Arc<Self> {
        responses.reverse();
        Arc::new(Self {
            responses: Mutex::new(responses),
        })
    }
}

impl HttpClient for ScriptedClient {
    fn execute<'a>(
        &'a self,
        _request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
        let next = self
            .responses
            .lock()
            .expect("lock")
            .pop()
            .unwrap_or_else(|| Err(HttpError::non_retryable("script exhausted")));
        Box::pin(async move { next })
    }
}

fn config() -> ReportConfig {
    ReportConfig::parse("PLTR", "2024-12-23", "America/New_York").expect("valid config")
}

fn databento(client: Arc<ScriptedClient>) -> Box<dyn TradeSource> {
    let config = DatabentoConfig::new("db-contract-key")
        .expect("key")
        .with_retry(RetryConfig::fixed(Duration::from_millis(1), 1));
    Box::new(DatabentoAdapter::with_http_client(config, client))
}

fn ndjson_line(ts_event: &str, price: &str, size: u64) -> String {
    format!(r#"{{"hd":{{"ts_event":"{ts_event}","rtype":0}},"price":"{price}","size":{size}}}"#)
}

// =============================================================================
// Databento Source
// =============================================================================

#[tokio::test]
async fn when_databento_returns_trades_across_midnight_only_the_local_day_is_kept() {
    // Given: One trade just before New York midnight and two within the day
    let body = [
        ndjson_line("2024-12-23T19:30:00.000000000Z", "8.000000000", 200),
        ndjson_line("2024-12-23T04:59:59.999999999Z", "50.000000000", 1),
        ndjson_line("2024-12-23T14:15:00.000000000Z", "10.000000000", 100),
    ]
    .join("\n");
    let source = databento(ScriptedClient::new(vec![Ok(HttpResponse::ok(body))]));

    // When: The session is fetched through the trait object
    let batch = source
        .fetch_trades(&TradeQuery::from_config(&config()))
        .await
        .expect("fetch succeeds");

    // Then: The out-of-day trade is dropped and the rest are sorted
    assert_eq!(batch.source, SourceId::Databento);
    assert_eq!(batch.dropped, 1);
    let prices: Vec<_> = batch.trades.iter().map(|trade| trade.price()).collect();
    assert_eq!(prices, vec![dec!(10), dec!(8)]);

    // And: The batch feeds straight into the assembler
    let report = ReportAssembler::new(config()).assemble(&batch.trades).expect("report");
    assert_eq!(report.daily.total_volume, 300);
}

#[tokio::test]
async fn when_databento_keeps_failing_the_error_stays_retryable() {
    // Given: A vendor that answers 503 on every attempt
    let source = databento(ScriptedClient::new(vec![
        Ok(HttpResponse::new(503, r#"{"detail":"maintenance"}"#)),
        Ok(HttpResponse::new(503, r#"{"detail":"maintenance"}"#)),
    ]));

    // When: The session is fetched
    let error = source
        .fetch_trades(&TradeQuery::from_config(&config()))
        .await
        .expect_err("must fail");

    // Then: The caller sees an unavailable, retryable failure
    assert_eq!(error.kind(), SourceErrorKind::Unavailable);
    assert!(error.retryable());
}

#[tokio::test]
async fn when_a_day_has_no_trades_the_batch_is_empty_not_an_error() {
    let source = databento(ScriptedClient::new(vec![Ok(HttpResponse::ok(""))]));

    let batch = source
        .fetch_trades(&TradeQuery::from_config(&config()))
        .await
        .expect("empty day is a valid answer");

    assert!(batch.is_empty());
}

// =============================================================================
// CSV Source
// =============================================================================

#[tokio::test]
async fn when_a_csv_tape_is_read_it_honors_the_same_window_contract() {
    // Given: A tape with offsets, unsorted, with one trade on the next local day
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    writeln!(file, "ts_event,price,size").expect("write");
    writeln!(file, "2024-12-23T14:30:00-05:00,8,200").expect("write");
    writeln!(file, "2024-12-23T09:15:00-05:00,10,100").expect("write");
    writeln!(file, "2024-12-24T00:00:00-05:00,11,5").expect("write");
    file.flush().expect("flush");

    // When: The session is fetched
    let source: Box<dyn TradeSource> = Box::new(CsvFileSource::new(file.path()));
    let batch = source
        .fetch_trades(&TradeQuery::from_config(&config()))
        .await
        .expect("fetch succeeds");

    // Then: Next-day midnight is excluded and trades come back sorted
    assert_eq!(batch.source, SourceId::Csv);
    assert_eq!(batch.dropped, 1);
    let sizes: Vec<_> = batch.trades.iter().map(|trade| trade.size()).collect();
    assert_eq!(sizes, vec![100, 200]);
}

#[tokio::test]
async fn when_a_csv_tape_is_missing_the_request_is_invalid() {
    let dir = tempfile::tempdir().expect("temp dir");
    let source = CsvFileSource::new(dir.path().join("missing.csv"));

    let error = source
        .fetch_trades(&TradeQuery::from_config(&config()))
        .await
        .expect_err("must fail");

    assert_eq!(error.kind(), SourceErrorKind::InvalidRequest);
    assert!(!error.retryable());
}

#[tokio::test]
async fn when_a_csv_row_is_negative_the_tape_is_malformed() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    writeln!(file, "ts_event,price,size").expect("write");
    writeln!(file, "2024-12-23T09:15:00-05:00,-1,100").expect("write");
    file.flush().expect("flush");

    let error = CsvFileSource::new(file.path())
        .fetch_trades(&TradeQuery::from_config(&config()))
        .await
        .expect_err("must fail");

    assert_eq!(error.kind(), SourceErrorKind::Malformed);
    assert!(error.message().contains("line 2"));
}
