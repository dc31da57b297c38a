use crate::cli::utils::{connect_state, output_success};
use crate::cli::OutputFormat;

pub async fn handle(output_format: OutputFormat) -> anyhow::Result<()> {
    let state = connect_state().await?;
    state.ensure_schema().await?;
    output_success(&output_format, "Database tables are ready", None)
}
