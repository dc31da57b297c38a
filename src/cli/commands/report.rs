use crate::cli::utils::{connect_state, output_table};
use crate::cli::OutputFormat;
use crate::database::models::Dimension;

pub async fn spend(dimension: &str, output_format: OutputFormat) -> anyhow::Result<()> {
    let dimension: Dimension = dimension.parse()?;
    let state = connect_state().await?;
    let buckets = state.reference.spend_by(dimension).await?;

    let rows: Vec<Vec<String>> = buckets
        .iter()
        .map(|b| vec![b.category.clone(), format!("{:.2}", b.total_spend)])
        .collect();
    output_table(
        &output_format,
        &[dimension.label(), "Total Spend"],
        &rows,
        serde_json::to_value(&buckets)?,
    )
}

pub async fn search(hshd_num: i32, output_format: OutputFormat) -> anyhow::Result<()> {
    let state = connect_state().await?;
    let found = state.reference.household_transactions(hshd_num).await?;

    if found.is_empty() {
        if let OutputFormat::Text = output_format {
            println!("No transactions found for household {}", hshd_num);
            return Ok(());
        }
    }

    let rows: Vec<Vec<String>> = found
        .iter()
        .map(|r| {
            vec![
                r.hshd_num.to_string(),
                r.basket_num.to_string(),
                r.purchase_date.clone(),
                r.product_num.to_string(),
                r.department.clone(),
                r.commodity.clone(),
            ]
        })
        .collect();
    output_table(
        &output_format,
        &["Household", "Basket", "Date", "Product", "Department", "Commodity"],
        &rows,
        serde_json::to_value(&found)?,
    )
}
