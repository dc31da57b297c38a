use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;

/// Household attribute that spend can be grouped by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Dimension {
    HouseholdSize,
    Children,
    IncomeRange,
}

impl Dimension {
    pub const ALL: [Dimension; 3] = [
        Dimension::HouseholdSize,
        Dimension::Children,
        Dimension::IncomeRange,
    ];

    /// Column of the `household` table this dimension groups on.
    pub fn column(self) -> &'static str {
        match self {
            Dimension::HouseholdSize => "hh_size",
            Dimension::Children => "children",
            Dimension::IncomeRange => "income_range",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Dimension::HouseholdSize => "Household Size",
            Dimension::Children => "Presence of Children",
            Dimension::IncomeRange => "Income Range",
        }
    }

    pub fn slug(self) -> &'static str {
        match self {
            Dimension::HouseholdSize => "household-size",
            Dimension::Children => "children",
            Dimension::IncomeRange => "income-range",
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown dimension '{0}' (expected household-size, children or income-range)")]
pub struct UnknownDimension(pub String);

impl FromStr for Dimension {
    type Err = UnknownDimension;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Dimension::ALL
            .into_iter()
            .find(|d| d.slug() == s || d.column() == s)
            .ok_or_else(|| UnknownDimension(s.to_string()))
    }
}

/// Total spend for one category of a dimension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct SpendBucket {
    pub category: String,
    pub total_spend: f64,
}

/// Headline numbers shown beneath the dashboard charts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, FromRow)]
pub struct DashboardSummary {
    pub households: i64,
    pub total_spend: f64,
}

/// One row of the household lookup: a transaction joined to its product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct HouseholdTransaction {
    pub hshd_num: i32,
    pub basket_num: i64,
    pub purchase_date: String,
    pub product_num: i32,
    pub department: String,
    pub commodity: String,
}
