use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};

use crate::changeset;
use crate::config::RuntimeConfig;
use crate::pipeline::{ChangeFilters, ChangeSummary, process_changes};
use crate::sinks::{ChangeSink, JsonlSink};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Input change file (.osc.gz)
    #[arg(short, long)]
    pub input: PathBuf,

    /// Tag mapping file (YAML)
    #[arg(short, long)]
    pub mapping: PathBuf,

    /// Output file for JSON lines, `-` for stdout
    #[arg(short, long, default_value = "-")]
    pub output: PathBuf,

    /// Capture version, user, changeset and timestamp of each element
    #[arg(long)]
    pub metadata: bool,

    /// Also write elements that match no mapping rule
    #[arg(long)]
    pub keep_irrelevant: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    pub fn runtime_config(&self) -> RuntimeConfig {
        RuntimeConfig {
            metadata: self.metadata,
            keep_irrelevant: self.keep_irrelevant,
        }
    }
}

pub fn init_sink(output: &Path) -> Result<Box<dyn ChangeSink>> {
    if output == Path::new("-") {
        tracing::info!("Sink: jsonl -> stdout");
        Ok(Box::new(JsonlSink::stdout()))
    } else {
        tracing::info!("Sink: jsonl -> {:?}", output);
        let sink = JsonlSink::new(output)
            .with_context(|| format!("CLI: Failed to create output {:?}", output))?;
        Ok(Box::new(sink))
    }
}

/// Decode `input` and write the filtered changes to `sink`.
pub fn process_changeset(
    input: &Path,
    filters: &ChangeFilters,
    runtime: &RuntimeConfig,
    sink: &mut dyn ChangeSink,
) -> Result<ChangeSummary> {
    tracing::info!("Decoding {:?} (metadata: {})", input, runtime.metadata);
    let stream = if runtime.metadata {
        changeset::parse_full(input)
    } else {
        changeset::parse(input)
    };

    let summary = process_changes(stream, filters, runtime, sink)?;
    sink.finish().context("Pipeline: Failed to finalize sink")?;
    Ok(summary)
}

pub fn log_summary(summary: &ChangeSummary) {
    tracing::info!(
        "Changes: {} (create: {}, modify: {}, delete: {})",
        summary.total(),
        summary.created,
        summary.modified,
        summary.deleted
    );
    tracing::info!(
        "Elements: {} nodes, {} ways, {} relations",
        summary.nodes,
        summary.ways,
        summary.relations
    );
    tracing::info!(
        "Relevant: {}, written: {}",
        summary.relevant,
        summary.written
    );
}
