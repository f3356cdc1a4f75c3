mod chart;
mod export;
mod fetch;
mod report;

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::time::Instant;

use serde::Serialize;
use serde_json::Value;
use tickroll_core::{Envelope, EnvelopeMeta, PersistError, SourceId};
use uuid::Uuid;

use crate::cli::{Cli, Command};
use crate::error::CliError;

pub struct CommandResult {
    pub data: Value,
    /// Human-readable lines for `--format table`.
    pub summary: Vec<String>,
    pub warnings: Vec<String>,
    pub source_chain: Vec<SourceId>,
}

impl CommandResult {
    pub fn ok(data: Value, source_chain: Vec<SourceId>) -> Self {
        Self {
            data,
            summary: Vec::new(),
            warnings: Vec::new(),
            source_chain,
        }
    }

    pub fn with_summary(mut self, summary: Vec<String>) -> Self {
        self.summary = summary;
        self
    }

    pub fn with_warnings(mut self, warnings: Vec<String>) -> Self {
        self.warnings.extend(warnings);
        self
    }
}

/// Envelope plus the table-mode rendering of its data.
pub struct CommandOutput {
    pub envelope: Envelope<Value>,
    pub summary: Vec<String>,
}

pub async fn run(cli: &Cli) -> Result<CommandOutput, CliError> {
    let started = Instant::now();
    let command_result = match &cli.command {
        Command::Report(args) => report::run(cli, args).await?,
        Command::Export(args) => export::run(cli, args).await?,
        Command::Chart(args) => chart::run(cli, args).await?,
    };

    let CommandResult {
        data,
        summary,
        warnings,
        source_chain,
    } = command_result;

    let latency_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
    let mut meta = EnvelopeMeta::new(Uuid::new_v4().to_string(), source_chain, latency_ms)?;
    for warning in warnings {
        meta.push_warning(warning);
    }

    Ok(CommandOutput {
        envelope: Envelope::success(meta, data),
        summary,
    })
}

fn create_output(path: &Path) -> Result<File, CliError> {
    File::create(path).map_err(|error| CliError::Persist(PersistError::Io(error)))
}

fn write_json_file<T: Serialize>(path: &Path, value: &T, pretty: bool) -> Result<(), CliError> {
    let mut writer = BufWriter::new(create_output(path)?);
    if pretty {
        serde_json::to_writer_pretty(&mut writer, value)?;
    } else {
        serde_json::to_writer(&mut writer, value)?;
    }
    writer
        .flush()
        .map_err(|error| CliError::Persist(PersistError::Io(error)))
}
