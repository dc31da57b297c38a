mod common;

use anyhow::Result;
use axum::http::StatusCode;
use serde_json::json;

use common::{body_json, body_string, cookie_pair, location, TestApp};
use spend_dashboard::testing::fixtures;

/// Signed-in app with the fixture extracts loaded through POST /dashboard.
async fn loaded_app() -> Result<(TestApp, String)> {
    let app = TestApp::new()?;
    app.seed_extracts()?;
    let session = app.signed_in("analyst").await?;

    let res = app.post_form("/dashboard", &[], &[session.clone()]).await?;
    assert_eq!(location(&res), Some("/dashboard"));
    Ok((app, session))
}

#[tokio::test]
async fn load_data_replaces_tables_and_flashes_counts() -> Result<()> {
    let (app, session) = loaded_app().await?;
    assert_eq!(app.store.transaction_count(), fixtures::TRANSACTION_ROWS);

    // Loading the same extracts again replaces rather than appends.
    let res = app.post_form("/dashboard", &[], &[session.clone()]).await?;
    assert_eq!(app.store.transaction_count(), fixtures::TRANSACTION_ROWS);

    let flash = cookie_pair(&res, "flash").expect("flash cookie");
    let page = body_string(app.get("/dashboard", &[session, flash]).await?).await?;
    assert!(page.contains("Data loaded successfully: 4 households, 3 products, 5 transactions."));
    Ok(())
}

#[tokio::test]
async fn dashboard_charts_every_dimension() -> Result<()> {
    let (app, session) = loaded_app().await?;
    let page = body_string(app.get("/dashboard", &[session]).await?).await?;

    for label in ["Household Size", "Presence of Children", "Income Range"] {
        assert!(page.contains(&format!("Spend by {}", label)), "{label}");
    }
    assert!(page.contains("<td>35-49K</td><td>34.75</td>"));
    assert!(page.contains("<td>50-74K</td><td>3.25</td>"));
    assert!(page.contains("<td>Y</td><td>22.25</td>"));
    assert!(page.contains("<strong>3</strong>"));
    assert!(page.contains("<strong>38.00</strong>"));
    Ok(())
}

#[tokio::test]
async fn spend_api_sums_per_category() -> Result<()> {
    let (app, session) = loaded_app().await?;

    let res = app.get("/api/spend/household-size", &[session.clone()]).await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body = body_json(res).await?;
    assert_eq!(
        body["data"],
        json!([
            {"category": "1", "total_spend": 3.25},
            {"category": "2", "total_spend": 12.5},
            {"category": "4", "total_spend": 22.25},
        ])
    );

    let body = body_json(app.get("/api/spend/children", &[session.clone()]).await?).await?;
    assert_eq!(
        body["data"],
        json!([
            {"category": "N", "total_spend": 15.75},
            {"category": "Y", "total_spend": 22.25},
        ])
    );

    let res = app.get("/api/spend/age-range", &[session]).await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn search_lists_household_transactions() -> Result<()> {
    let (app, session) = loaded_app().await?;

    let res = app.post_form("/search", &[("hshd_num", "100")], &[session.clone()]).await?;
    assert_eq!(res.status(), StatusCode::OK);
    let page = body_string(res).await?;
    assert!(page.contains(
        "<tr><td>100</td><td>1</td><td>2023-01-01</td><td>500</td><td>FOOD</td><td>PRODUCE</td></tr>"
    ));
    assert_eq!(page.matches("<tr><td>").count(), 1);

    // A household with no purchases is an empty result, not an error.
    let page = body_string(app.post_form("/search", &[("hshd_num", "103")], &[session.clone()]).await?).await?;
    assert!(page.contains("No transactions found for household 103."));

    let res = app.post_form("/search", &[("hshd_num", "ten")], &[session.clone()]).await?;
    assert_eq!(location(&res), Some("/search"));
    let flash = cookie_pair(&res, "flash").expect("flash cookie");
    let page = body_string(app.get("/search", &[session, flash]).await?).await?;
    assert!(page.contains("Household Number must be a whole number."));
    Ok(())
}

#[tokio::test]
async fn household_api_orders_by_basket_then_product() -> Result<()> {
    let (app, session) = loaded_app().await?;

    let body = body_json(app.get("/api/households/102/transactions", &[session.clone()]).await?).await?;
    let products: Vec<i64> = body["data"]
        .as_array()
        .expect("array")
        .iter()
        .map(|row| row["product_num"].as_i64().unwrap_or_default())
        .collect();
    assert_eq!(products, vec![500, 502, 501]);
    assert_eq!(body["data"][1]["commodity"], "VITAMINS");

    let res = app.get("/api/households/abc/transactions", &[session]).await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn malformed_extract_changes_nothing() -> Result<()> {
    let (app, session) = loaded_app().await?;
    let before = body_json(app.get("/api/spend/income-range", &[session.clone()]).await?).await?;

    // Columns out of order in a newer product file.
    std::fs::remove_file(app.data_dir.path().join("400_products.csv"))?;
    app.write_extract(
        "401_products.csv",
        "DEPARTMENT,PRODUCT_NUM,COMMODITY,BRAND_TY\nFOOD,500,PRODUCE,NATIONAL\n",
    )?;
    app.write_extract("401_transactions.csv", "BASKET_NUM,HSHD_NUM,PURCHASE_,PRODUCT_NUM,SPEND,UNITS,STORE_R,WEEK_NUM,YEAR\n")?;
    std::fs::remove_file(app.data_dir.path().join("400_transactions.csv"))?;

    let res = app.post_form("/dashboard", &[], &[session.clone()]).await?;
    let flash = cookie_pair(&res, "flash").expect("flash cookie");
    assert!(flash.contains("Data+load+failed"));

    assert_eq!(app.store.transaction_count(), fixtures::TRANSACTION_ROWS);
    let after = body_json(app.get("/api/spend/income-range", &[session]).await?).await?;
    assert_eq!(before, after);
    Ok(())
}
