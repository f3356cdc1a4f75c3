//! CLI argument definitions for tickroll.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `report` | Hourly and daily summary of one session, with optional CSV and chart exports |
//! | `export` | Raw `ts_event,price,size` tape for one session |
//! | `chart` | Chart series JSON for one session |
//!
//! # Global Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--format` | `json` | Output format (json, ndjson, table) |
//! | `--pretty` | `false` | Pretty-print JSON output |
//! | `--strict` | `false` | Treat warnings as errors |
//! | `--source` | `databento` | Trade source |
//! | `--dataset` | `XNAS.ITCH` | Databento dataset |
//! | `--timeout-ms` | `30000` | Request timeout in ms |
//! | `-v` | off | Raise log verbosity (repeatable) |
//!
//! # Examples
//!
//! ```bash
//! tickroll report PLTR --date 2024-12-23 --tz America/New_York --format table
//! tickroll report PLTR --date 2024-12-23 --tz America/New_York --session regular \
//!     --csv-out PLTR_trades_2024-12-23.csv --chart-out pltr.json
//! tickroll export PLTR --date 2024-12-23 --tz America/New_York --source csv --input tape.csv
//! ```

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use tickroll_core::SourceId;

/// Hourly and daily trade summaries for one instrument and one session.
#[derive(Debug, Parser)]
#[command(name = "tickroll", author, version, about)]
pub struct Cli {
    /// Output format for results.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    /// Treat warnings as failures (exit code 5).
    #[arg(long, global = true, default_value_t = false)]
    pub strict: bool,

    /// Where trades come from: databento or csv. `--input` always reads a CSV tape.
    #[arg(long, global = true, default_value = "databento")]
    pub source: SourceId,

    /// Databento dataset to query.
    #[arg(long, global = true, default_value = "XNAS.ITCH")]
    pub dataset: String,

    /// Request timeout budget in milliseconds.
    #[arg(long, global = true, default_value_t = 30_000)]
    pub timeout_ms: u64,

    /// Log more to stderr (-v info, -vv debug). `RUST_LOG` takes precedence.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable summary.
    Table,
    /// Single JSON object.
    Json,
    /// One JSON object per line.
    Ndjson,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Summarize a session: hourly high/low, day range and volume.
    Report(ReportArgs),

    /// Write the raw `ts_event,price,size` tape for a session.
    Export(ExportArgs),

    /// Write visualization series (price, VWAP, extremes, minute volume) as JSON.
    Chart(ChartArgs),
}

/// Identifies one (symbol, date) session.
#[derive(Debug, Args)]
pub struct SessionArgs {
    /// Instrument symbol (e.g. PLTR).
    pub symbol: String,

    /// Session date, YYYY-MM-DD, in the session timezone.
    #[arg(long)]
    pub date: String,

    /// IANA session timezone (e.g. America/New_York). Required; never defaulted.
    #[arg(long)]
    pub tz: String,

    /// CSV tape (`ts_event,price,size`) to read instead of calling Databento.
    #[arg(long)]
    pub input: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct ReportArgs {
    #[command(flatten)]
    pub session: SessionArgs,

    /// Trades to keep: regular, extended, all, or HH:MM-HH:MM (end exclusive).
    #[arg(long = "session", default_value = "all")]
    pub session_window: String,

    /// Write the annotated tape (`symbol,ts_event_local,price,vwap,size,note`).
    #[arg(long)]
    pub csv_out: Option<PathBuf>,

    /// Write chart series JSON.
    #[arg(long)]
    pub chart_out: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct ExportArgs {
    #[command(flatten)]
    pub session: SessionArgs,

    /// Output path; defaults to `<SYMBOL>_trades_<DATE>.csv`.
    #[arg(long)]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct ChartArgs {
    #[command(flatten)]
    pub session: SessionArgs,

    /// Trades to keep: regular, extended, all, or HH:MM-HH:MM (end exclusive).
    #[arg(long = "session", default_value = "all")]
    pub session_window: String,

    /// Write the series to a file instead of embedding it in the envelope.
    #[arg(long)]
    pub output: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_report_with_window_and_exports() {
        let cli = Cli::try_parse_from([
            "tickroll",
            "report",
            "PLTR",
            "--date",
            "2024-12-23",
            "--tz",
            "America/New_York",
            "--session",
            "regular",
            "--csv-out",
            "out.csv",
            "-vv",
        ])
        .expect("parses");

        assert_eq!(cli.verbose, 2);
        let Command::Report(args) = cli.command else {
            panic!("expected report");
        };
        assert_eq!(args.session.symbol, "PLTR");
        assert_eq!(args.session_window, "regular");
        assert_eq!(args.csv_out, Some(PathBuf::from("out.csv")));
    }

    #[test]
    fn source_is_parsed_case_insensitively() {
        let cli = Cli::try_parse_from([
            "tickroll", "--source", "CSV", "export", "PLTR", "--date", "2024-12-23", "--tz",
            "America/New_York",
        ])
        .expect("parses");
        assert_eq!(cli.source, SourceId::Csv);
    }

    #[test]
    fn unknown_source_is_rejected() {
        let err = Cli::try_parse_from([
            "tickroll", "--source", "polygon", "export", "PLTR", "--date", "2024-12-23", "--tz",
            "America/New_York",
        ])
        .expect_err("must fail");
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
        assert!(err.to_string().contains("expected one of databento, csv"));
    }

    #[test]
    fn timezone_is_required() {
        let err = Cli::try_parse_from(["tickroll", "export", "PLTR", "--date", "2024-12-23"])
            .expect_err("must fail");
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }
}
