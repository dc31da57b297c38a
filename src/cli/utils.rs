use serde_json::{json, Value};

use crate::cli::OutputFormat;
use crate::config::AppConfig;
use crate::database::DatabaseManager;
use crate::state::AppState;

/// Output a success message in the appropriate format
pub fn output_success(output_format: &OutputFormat, message: &str, data: Option<Value>) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": true,
                "message": message
            });

            if let Some(data_value) = data {
                response["data"] = data_value;
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
        }
    }
    Ok(())
}

/// Output an aligned two-or-more column table, or the rows as JSON
pub fn output_table(
    output_format: &OutputFormat,
    headers: &[&str],
    rows: &[Vec<String>],
    data: Value,
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&json!({ "success": true, "data": data }))?);
        }
        OutputFormat::Text => {
            print!("{}", render_table(headers, rows));
        }
    }
    Ok(())
}

fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(w) = widths.get_mut(i) {
                *w = (*w).max(cell.chars().count());
            }
        }
    }

    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    let mut out = table_line(headers, &widths);
    out.push_str(&table_line(&rule.iter().map(String::as_str).collect::<Vec<_>>(), &widths));
    for row in rows {
        out.push_str(&table_line(&row.iter().map(String::as_str).collect::<Vec<_>>(), &widths));
    }
    out
}

fn table_line(cells: &[&str], widths: &[usize]) -> String {
    let padded: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(c, w)| format!("{:<width$}", c, width = *w))
        .collect();
    format!("{}\n", padded.join("  ").trim_end())
}

/// Configuration from the environment plus a Postgres-backed state.
pub async fn connect_state() -> anyhow::Result<AppState> {
    let config = AppConfig::from_env();
    let pool = DatabaseManager::connect(&config.database).await?;
    Ok(AppState::with_pool(config, pool))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pads_columns_to_widest_cell() {
        let table = render_table(
            &["Category", "Total Spend"],
            &[vec!["35-49K".into(), "34.75".into()], vec!["1".into(), "3.25".into()]],
        );
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines[0], "Category  Total Spend");
        assert_eq!(lines[1], "--------  -----------");
        assert_eq!(lines[2], "35-49K    34.75");
        assert_eq!(lines[3], "1         3.25");
    }
}
