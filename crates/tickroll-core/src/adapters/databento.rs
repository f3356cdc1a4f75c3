use std::fmt::{Debug, Formatter};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Instant;

use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::data_source::{SourceError, TradeBatch, TradeQuery, TradeSource};
use crate::domain::parse_price;
use crate::http_client::{HttpAuth, HttpClient, HttpRequest, ReqwestHttpClient};
use crate::retry::RetryConfig;
use crate::{SourceId, TradeRecord, UtcDateTime};

pub const API_KEY_ENV: &str = "DATABENTO_API_KEY";
pub const DEFAULT_BASE_URL: &str = "https://hist.databento.com";
pub const DEFAULT_DATASET: &str = "XNAS.ITCH";

/// Fixed-point scale of un-prettified DBN prices.
const PRICE_SCALE: u32 = 9;

/// DBN marker for a missing price.
const UNDEF_PRICE: i64 = i64::MAX;

/// Connection settings for the Databento historical API.
#[derive(Clone)]
pub struct DatabentoConfig {
    api_key: String,
    dataset: String,
    base_url: String,
    timeout_ms: u64,
    retry: RetryConfig,
}

impl Debug for DatabentoConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabentoConfig")
            .field("api_key", &"<redacted>")
            .field("dataset", &self.dataset)
            .field("base_url", &self.base_url)
            .field("timeout_ms", &self.timeout_ms)
            .field("retry", &self.retry)
            .finish()
    }
}

impl DatabentoConfig {
    pub fn new(api_key: impl Into<String>) -> Result<Self, SourceError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(SourceError::unauthorized("databento API key is empty"));
        }

        Ok(Self {
            api_key,
            dataset: String::from(DEFAULT_DATASET),
            base_url: String::from(DEFAULT_BASE_URL),
            timeout_ms: 30_000,
            retry: RetryConfig::default(),
        })
    }

    /// Read the API key from `DATABENTO_API_KEY`.
    pub fn from_env() -> Result<Self, SourceError> {
        let api_key = std::env::var(API_KEY_ENV).map_err(|_| {
            SourceError::unauthorized(format!("{API_KEY_ENV} is not set"))
        })?;
        Self::new(api_key)
    }

    pub fn with_dataset(mut self, dataset: impl Into<String>) -> Self {
        self.dataset = dataset.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_owned();
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn dataset(&self) -> &str {
        &self.dataset
    }
}

/// Historical trades from Databento's `timeseries.get_range` endpoint.
#[derive(Clone)]
pub struct DatabentoAdapter {
    config: DatabentoConfig,
    http_client: Arc<dyn HttpClient>,
}

impl Debug for DatabentoAdapter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabentoAdapter")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl DatabentoAdapter {
    pub fn new(config: DatabentoConfig) -> Self {
        Self::with_http_client(config, Arc::new(ReqwestHttpClient::new()))
    }

    pub fn with_http_client(config: DatabentoConfig, http_client: Arc<dyn HttpClient>) -> Self {
        Self {
            config,
            http_client,
        }
    }

    pub fn config(&self) -> &DatabentoConfig {
        &self.config
    }

    fn build_request(
        &self,
        query: &TradeQuery,
        (start, end): (UtcDateTime, UtcDateTime),
    ) -> HttpRequest {
        HttpRequest::get(format!("{}/v0/timeseries.get_range", self.config.base_url))
            .with_query("dataset", self.config.dataset.as_str())
            .with_query("schema", "trades")
            .with_query("encoding", "json")
            .with_query("pretty_px", "true")
            .with_query("pretty_ts", "true")
            .with_query("symbols", query.symbol.as_str())
            .with_query("start", start.format_rfc3339())
            .with_query("end", end.format_rfc3339())
            .with_auth(HttpAuth::api_key_as_username(self.config.api_key.as_str()))
            .with_timeout_ms(self.config.timeout_ms)
    }

    async fn fetch_body_with_retry(&self, request: HttpRequest) -> Result<String, SourceError> {
        let mut retry = 0;
        loop {
            let error = match self.http_client.execute(request.clone()).await {
                Ok(response) if response.is_success() => return Ok(response.body),
                Ok(response) => classify_status(response.status, &response.body),
                Err(error) if error.retryable() => SourceError::unavailable(format!(
                    "databento transport error: {}",
                    error.message()
                )),
                Err(error) => SourceError::internal(format!(
                    "databento transport error: {}",
                    error.message()
                )),
            };

            let Some(delay) = self.config.retry.next_delay(retry, &error) else {
                return Err(error);
            };
            warn!(
                code = error.code(),
                retry = retry + 1,
                delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                "databento request failed, retrying"
            );
            tokio::time::sleep(delay).await;
            retry += 1;
        }
    }
}

impl TradeSource for DatabentoAdapter {
    fn id(&self) -> SourceId {
        SourceId::Databento
    }

    fn fetch_trades<'a>(
        &'a self,
        query: &'a TradeQuery,
    ) -> Pin<Box<dyn Future<Output = Result<TradeBatch, SourceError>> + Send + 'a>> {
        Box::pin(async move {
            let window = query.window()?;
            let request = self.build_request(query, window);
            debug!(
                symbol = %query.symbol,
                dataset = %self.config.dataset,
                start = %window.0,
                end = %window.1,
                "requesting databento trades"
            );

            let started = Instant::now();
            let body = self.fetch_body_with_retry(request).await?;
            let trades = parse_trades_ndjson(&body)?;
            let batch = TradeBatch::clipped(SourceId::Databento, trades, window);

            info!(
                symbol = %query.symbol,
                trades = batch.trades.len(),
                dropped = batch.dropped,
                elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
                "fetched databento trades"
            );
            Ok(batch)
        })
    }
}

fn classify_status(status: u16, body: &str) -> SourceError {
    let detail = serde_json::from_str::<DatabentoErrorBody>(body)
        .ok()
        .and_then(|error| error.detail)
        .unwrap_or_else(|| String::from("no detail"));
    let message = format!("databento returned status {status}: {detail}");

    match status {
        401 | 403 => SourceError::unauthorized(message),
        429 => SourceError::rate_limited(message),
        status if RetryConfig::is_retryable_status(status) => SourceError::unavailable(message),
        400..=499 => SourceError::invalid_request(message),
        _ => SourceError::internal(message),
    }
}

/// Parse a `get_range` JSON-lines body into validated trades.
pub fn parse_trades_ndjson(body: &str) -> Result<Vec<TradeRecord>, SourceError> {
    body.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| {
            let message: DatabentoTrade = serde_json::from_str(line).map_err(|e| {
                SourceError::malformed(format!("databento line {}: {e}", index + 1))
            })?;
            message.into_record().map_err(|error| {
                SourceError::malformed(format!("databento line {}: {}", index + 1, error.message()))
            })
        })
        .collect()
}

#[derive(Debug, Deserialize)]
struct DatabentoErrorBody {
    detail: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DatabentoTrade {
    hd: DatabentoHeader,
    price: DatabentoPrice,
    size: u64,
}

#[derive(Debug, Deserialize)]
struct DatabentoHeader {
    ts_event: DatabentoTimestamp,
}

/// `pretty_ts` yields RFC3339 strings; raw output yields nanoseconds as a string or number.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum DatabentoTimestamp {
    Nanos(i64),
    Text(String),
}

/// `pretty_px` yields decimal strings that always carry a fractional part;
/// raw output yields 1e-9 fixed-point integers, quoted or not.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum DatabentoPrice {
    Fixed(i64),
    Text(String),
}

impl DatabentoTimestamp {
    fn to_utc(&self) -> Result<UtcDateTime, SourceError> {
        match self {
            Self::Nanos(nanos) => Ok(UtcDateTime::from_unix_nanos(*nanos)?),
            Self::Text(text) => match text.parse::<i64>() {
                Ok(nanos) => Ok(UtcDateTime::from_unix_nanos(nanos)?),
                Err(_) => Ok(UtcDateTime::parse_with_offset(text)?),
            },
        }
    }
}

impl DatabentoPrice {
    fn to_decimal(&self) -> Result<Decimal, SourceError> {
        match self {
            Self::Fixed(fixed) => fixed_price(*fixed),
            Self::Text(text) => match text.trim().parse::<i64>() {
                Ok(fixed) => fixed_price(fixed),
                Err(_) => Ok(parse_price(text)?),
            },
        }
    }
}

fn fixed_price(fixed: i64) -> Result<Decimal, SourceError> {
    if fixed == UNDEF_PRICE {
        return Err(SourceError::malformed("trade carries the undefined price sentinel"));
    }
    Ok(Decimal::new(fixed, PRICE_SCALE))
}

impl DatabentoTrade {
    fn into_record(self) -> Result<TradeRecord, SourceError> {
        let record = TradeRecord::new(self.hd.ts_event.to_utc()?, self.price.to_decimal()?, self.size)?;
        Ok(record)
    }
}
