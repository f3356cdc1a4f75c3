use std::io::BufWriter;
use std::path::Path;

use rust_decimal::Decimal;
use serde::Serialize;
use tickroll_core::{
    write_annotated_csv, AggregationReport, ChartSeries, ReportAssembler, SessionWindow,
};
use tracing::info;

use crate::cli::{Cli, ReportArgs};
use crate::error::CliError;

use super::fetch::fetch_session;
use super::{create_output, write_json_file, CommandResult};

#[derive(Debug, Serialize)]
struct ReportResponseData<'a> {
    report: &'a AggregationReport,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    exports: Vec<ExportedFile>,
}

#[derive(Debug, Serialize)]
struct ExportedFile {
    kind: &'static str,
    path: String,
}

pub async fn run(cli: &Cli, args: &ReportArgs) -> Result<CommandResult, CliError> {
    let window = SessionWindow::parse(&args.session_window)?;
    let fetched = fetch_session(cli, &args.session, window).await?;
    let symbol = fetched.config.symbol.clone();
    let date = fetched.config.date;
    let source = fetched.batch.source;

    let assembler = ReportAssembler::new(fetched.config);
    let (report, annotated) = assembler
        .assemble_annotated(&fetched.batch.trades)
        .map_err(|error| CliError::from_aggregation(error, &symbol, date))?;

    let mut warnings = fetched.warnings;
    let excluded = fetched.batch.trades.len() - report.trade_count;
    if excluded > 0 {
        if let Some(window) = report.session_window {
            warnings.push(format!(
                "{excluded} trades outside the {window} session window were excluded"
            ));
        }
    }

    let mut exports = Vec::new();
    if let Some(path) = &args.csv_out {
        let writer = BufWriter::new(create_output(path)?);
        write_annotated_csv(writer, &report.symbol, report.timezone, &annotated)?;
        exports.push(exported("annotated_csv", path));
    }
    if let Some(path) = &args.chart_out {
        let series = ChartSeries::build(&report, &annotated);
        write_json_file(path, &series, cli.pretty)?;
        exports.push(exported("chart_json", path));
    }

    info!(
        symbol = %report.symbol,
        date = %report.date,
        trades = report.trade_count,
        hours = report.hourly.len(),
        exports = exports.len(),
        "report assembled"
    );

    let summary = report_summary(&report);
    let data = serde_json::to_value(ReportResponseData {
        report: &report,
        exports,
    })?;

    Ok(CommandResult::ok(data, vec![source])
        .with_summary(summary)
        .with_warnings(warnings))
}

fn exported(kind: &'static str, path: &Path) -> ExportedFile {
    ExportedFile {
        kind,
        path: path.display().to_string(),
    }
}

/// Console rendering of a report: hourly extremes, day range, volume.
pub(super) fn report_summary(report: &AggregationReport) -> Vec<String> {
    let mut lines = Vec::with_capacity(report.hourly.len() + 10);
    lines.push(format!(
        "{} {} ({}), {} trades",
        report.symbol, report.date, report.timezone, report.trade_count
    ));
    if let Some(window) = report.session_window {
        lines.push(format!("Session window: {window}"));
    }

    lines.push(String::new());
    lines.push(String::from("Hourly Price Summary:"));
    for bucket in &report.hourly {
        lines.push(format!(
            "{}: High {}, Low {}",
            bucket.hour_key,
            dollars(bucket.high),
            dollars(bucket.low)
        ));
    }

    let daily = &report.daily;
    lines.push(String::new());
    lines.push(String::from("Day Summary:"));
    lines.push(format!("Day High: {}", dollars(daily.day_high)));
    lines.push(format!("Day Low: {}", dollars(daily.day_low)));
    lines.push(format!("Day Range: {}", dollars(daily.range())));

    lines.push(String::new());
    lines.push(String::from("Volume Summary:"));
    lines.push(format!("Total Volume: {}", thousands(daily.total_volume)));
    lines.push(format!("Max Trade Size: {}", thousands(daily.max_trade_size)));
    lines.push(format!("Min Trade Size: {}", thousands(daily.min_trade_size)));
    lines
}

fn dollars(value: Decimal) -> String {
    format!("${:.2}", value.round_dp(2))
}

fn thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;
    use tickroll_core::{ReportConfig, SessionWindow, TradeRecord, UtcDateTime};

    use super::*;

    fn trade(ts: &str, price: Decimal, size: u64) -> TradeRecord {
        TradeRecord::new(UtcDateTime::parse(ts).expect("ts"), price, size).expect("trade")
    }

    #[test]
    fn groups_thousands() {
        assert_eq!(thousands(0), "0");
        assert_eq!(thousands(999), "999");
        assert_eq!(thousands(1_000), "1,000");
        assert_eq!(thousands(12_345_678), "12,345,678");
    }

    #[test]
    fn prices_print_as_dollars_and_cents() {
        assert_eq!(dollars(dec!(10)), "$10.00");
        assert_eq!(dollars(dec!(79.456)), "$79.46");
    }

    #[test]
    fn summary_lists_hours_then_day_then_volume() {
        let config = ReportConfig::parse("PLTR", "2024-12-23", "America/New_York")
            .expect("config")
            .with_session_window(Some(SessionWindow::regular()));
        let trades = [
            trade("2024-12-23T14:45:00Z", dec!(10), 100),
            trade("2024-12-23T15:30:00Z", dec!(12.5), 2_500),
            trade("2024-12-23T15:59:00Z", dec!(8), 50),
        ];
        let report = ReportAssembler::new(config).assemble(&trades).expect("report");

        let lines = report_summary(&report);

        assert_eq!(lines[0], "PLTR 2024-12-23 (America/New_York), 3 trades");
        assert_eq!(lines[1], "Session window: 09:30-16:00");
        assert!(lines.contains(&String::from("09:00 EST: High $10.00, Low $10.00")));
        assert!(lines.contains(&String::from("10:00 EST: High $12.50, Low $8.00")));
        assert!(lines.contains(&String::from("Day Range: $4.50")));
        assert!(lines.contains(&String::from("Total Volume: 2,650")));
        assert_eq!(lines.last().map(String::as_str), Some("Min Trade Size: 50"));
    }
}
