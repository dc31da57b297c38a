use axum::http::StatusCode;

use super::{chart, escape, layout};
use crate::database::models::{DashboardSummary, Dimension, HouseholdTransaction, SpendBucket};
use crate::middleware::Flash;

pub fn index(username: Option<&str>, flash: &Flash) -> String {
    let body = match username {
        Some(name) => format!(
            "<h1>Hi, {}!</h1><p>Load the latest extracts and explore spend on the \
             <a href=\"/dashboard\">dashboard</a>, or look up a household on the \
             <a href=\"/search\">search</a> page.</p>",
            escape(name)
        ),
        None => "<h1>Spend Dashboard</h1><p>Please <a href=\"/login\">log in</a> or \
                 <a href=\"/register\">register</a> to view household spend.</p>"
            .to_string(),
    };
    layout("Home", username, flash, &body)
}

fn error_line(error: Option<&str>) -> String {
    error
        .map(|e| format!("<p class=\"error\">{}</p>", escape(e)))
        .unwrap_or_default()
}

/// Registration form, refilled with everything but the passwords.
pub fn register(flash: &Flash, username: &str, email: &str, error: Option<&str>) -> String {
    let body = format!(
        "<h1>Register</h1>{error}\
         <form action=\"/register\" method=\"post\">\
         <p><label>Username<br><input type=\"text\" name=\"username\" value=\"{username}\" required></label></p>\
         <p><label>Email<br><input type=\"email\" name=\"email\" value=\"{email}\" required></label></p>\
         <p><label>Password<br><input type=\"password\" name=\"password\" required></label></p>\
         <p><label>Repeat Password<br><input type=\"password\" name=\"password2\" required></label></p>\
         <p><input type=\"submit\" value=\"Register\"></p>\
         </form>",
        error = error_line(error),
        username = escape(username),
        email = escape(email),
    );
    layout("Register", None, flash, &body)
}

pub fn login(flash: &Flash, username: &str, error: Option<&str>) -> String {
    let body = format!(
        "<h1>Sign In</h1>{error}\
         <form action=\"/login\" method=\"post\">\
         <p><label>Username<br><input type=\"text\" name=\"username\" value=\"{username}\" required></label></p>\
         <p><label>Password<br><input type=\"password\" name=\"password\" required></label></p>\
         <p><input type=\"submit\" value=\"Sign In\"></p>\
         </form>\
         <p>New user? <a href=\"/register\">Click to Register!</a></p>",
        error = error_line(error),
        username = escape(username),
    );
    layout("Sign In", None, flash, &body)
}

pub fn dashboard(
    username: &str,
    flash: &Flash,
    charts: &[(Dimension, Vec<SpendBucket>)],
    summary: &DashboardSummary,
) -> String {
    let svgs: String = charts
        .iter()
        .map(|(dimension, buckets)| chart::bar_chart(&format!("Spend by {}", dimension.label()), buckets))
        .collect();

    let tables: String = charts
        .iter()
        .map(|(dimension, buckets)| {
            let rows: String = buckets
                .iter()
                .map(|b| format!("<tr><td>{}</td><td>{:.2}</td></tr>", escape(&b.category), b.total_spend))
                .collect();
            format!(
                "<table><caption>{}</caption><tr><th>Category</th><th>Total Spend</th></tr>{}</table>",
                dimension.label(),
                rows
            )
        })
        .collect();

    let body = format!(
        "<h1>Dashboard</h1>\
         <form action=\"/dashboard\" method=\"post\"><input type=\"submit\" value=\"Load Data\"></form>\
         <div class=\"charts\">{svgs}</div>\
         <h2>Summary</h2>\
         <p>Households with purchases: <strong>{households}</strong>. \
         Total spend: <strong>{total:.2}</strong>.</p>\
         {tables}",
        households = summary.households,
        total = summary.total_spend,
    );
    layout("Dashboard", Some(username), flash, &body)
}

/// Search form plus, when a lookup ran, its result table.
pub fn search(
    username: &str,
    flash: &Flash,
    hshd_num: &str,
    rows: Option<&[HouseholdTransaction]>,
) -> String {
    let results = match rows {
        None => String::new(),
        Some([]) => format!(
            "<p>No transactions found for household {}.</p>",
            escape(hshd_num)
        ),
        Some(rows) => {
            let body: String = rows
                .iter()
                .map(|r| {
                    format!(
                        "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                        r.hshd_num,
                        r.basket_num,
                        escape(&r.purchase_date),
                        r.product_num,
                        escape(&r.department),
                        escape(&r.commodity)
                    )
                })
                .collect();
            format!(
                "<table><tr><th>Household</th><th>Basket</th><th>Date</th><th>Product</th>\
                 <th>Department</th><th>Commodity</th></tr>{}</table>",
                body
            )
        }
    };

    let body = format!(
        "<h1>Household Search</h1>\
         <form action=\"/search\" method=\"post\">\
         <p><label>Household Number<br><input type=\"text\" name=\"hshd_num\" value=\"{}\" required></label></p>\
         <p><input type=\"submit\" value=\"Search\"></p>\
         </form>{}",
        escape(hshd_num),
        results
    );
    layout("Search", Some(username), flash, &body)
}

pub fn error_page(status: StatusCode, message: &str) -> String {
    let body = format!(
        "<h1>{}</h1><p class=\"error\">{}</p><p><a href=\"/\">Back to home</a></p>",
        status,
        escape(message)
    );
    layout("Error", None, &Flash::default(), &body)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(basket_num: i64) -> HouseholdTransaction {
        HouseholdTransaction {
            hshd_num: 100,
            basket_num,
            purchase_date: "2023-01-01".to_string(),
            product_num: 500,
            department: "FOOD".to_string(),
            commodity: "PRODUCE".to_string(),
        }
    }

    #[test]
    fn search_renders_rows_or_empty_notice() {
        let flash = Flash::default();
        let page = search("alice", &flash, "100", Some(&[row(1), row(2)]));
        assert_eq!(page.matches("<td>FOOD</td>").count(), 2);

        let page = search("alice", &flash, "103", Some(&[]));
        assert!(page.contains("No transactions found for household 103."));

        let page = search("alice", &flash, "", None);
        assert!(!page.contains("<table>"));
    }

    #[test]
    fn dashboard_lists_every_bucket() {
        let charts = vec![(
            Dimension::IncomeRange,
            vec![
                SpendBucket {
                    category: "35-49K".to_string(),
                    total_spend: 34.75,
                },
                SpendBucket {
                    category: "50-74K".to_string(),
                    total_spend: 3.25,
                },
            ],
        )];
        let summary = DashboardSummary {
            households: 3,
            total_spend: 38.0,
        };
        let page = dashboard("alice", &Flash::default(), &charts, &summary);
        assert!(page.contains("<td>35-49K</td><td>34.75</td>"));
        assert!(page.contains("<td>50-74K</td><td>3.25</td>"));
        assert!(page.contains("Spend by Income Range"));
        assert!(page.contains("<strong>38.00</strong>"));
    }

    #[test]
    fn register_refills_without_passwords() {
        let page = register(&Flash::default(), "bob\"", "bob@example.com", Some("Passwords must match."));
        assert!(page.contains("value=\"bob&quot;\""));
        assert!(page.contains("Passwords must match."));
    }
}
