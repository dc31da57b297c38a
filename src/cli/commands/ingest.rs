use std::path::PathBuf;

use crate::cli::utils::{connect_state, output_success};
use crate::cli::OutputFormat;

/// Run the ingest pipeline once, from `dir` or the configured data directory.
pub async fn handle(dir: Option<PathBuf>, output_format: OutputFormat) -> anyhow::Result<()> {
    let state = connect_state().await?;
    state.ensure_schema().await?;

    let dir = dir.unwrap_or_else(|| state.config.ingest.data_dir.clone());
    let report = state.ingest.run(&dir).await?;

    if let OutputFormat::Text = output_format {
        for source in &report.sources {
            println!("{:<12} {:>8} rows  {}  {}", source.kind, source.rows, &source.sha256[..12], source.path.display());
        }
    }
    output_success(&output_format, &report.message(), Some(serde_json::to_value(&report)?))
}
