use anyhow::{Context, Result};
use clap::Parser;

use osc_diff::app::{Cli, init_sink, log_summary, process_changeset};
use osc_diff::config::MappingConfig;
use osc_diff::mapping::Mapping;
use osc_diff::pipeline::ChangeFilters;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::INFO
    } else {
        tracing::Level::WARN
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(level.into())
                .from_env_lossy(),
        )
        .with_writer(std::io::stderr)
        .init();

    let mapping_config = MappingConfig::load(&cli.mapping)
        .with_context(|| format!("CLI: Failed to load mapping {:?}", cli.mapping))?;
    let mapping = Mapping::compile(&mapping_config).context("CLI: Invalid mapping")?;
    tracing::info!("Mapping: {} tables", mapping_config.tables.len());

    let filters = ChangeFilters::from_mapping(&mapping);
    let runtime = cli.runtime_config();

    let mut sink = init_sink(&cli.output)?;

    let start = std::time::Instant::now();
    let summary = process_changeset(&cli.input, &filters, &runtime, sink.as_mut())?;

    log_summary(&summary);
    tracing::info!("Done in {:.2}s", start.elapsed().as_secs_f64());

    Ok(())
}
