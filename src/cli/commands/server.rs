use anyhow::Context;
use std::time::Duration;

use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::config::AppConfig;

/// GET `<url>/health` and report the server's answer.
pub async fn ping(url: Option<String>, output_format: OutputFormat) -> anyhow::Result<()> {
    let base = url.unwrap_or_else(|| format!("http://{}", AppConfig::from_env().bind_addr()));
    let health_url = format!("{}/health", base.trim_end_matches('/'));

    let client = reqwest::Client::new();
    let response = client
        .get(&health_url)
        .timeout(Duration::from_secs(5))
        .send()
        .await
        .with_context(|| format!("could not reach {}", health_url))?;

    let status = response.status();
    let body: serde_json::Value = response.json().await.unwrap_or(serde_json::Value::Null);
    if !status.is_success() {
        anyhow::bail!("{} answered {}: {}", health_url, status, body);
    }

    output_success(&output_format, &format!("{} is up", base), Some(body))
}
