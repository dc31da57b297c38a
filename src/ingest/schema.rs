//! Column descriptors for the three extract kinds.
//!
//! Each descriptor is the ordered list of fields a file must carry. Header
//! cells are matched after trimming and upper-casing, against the field
//! name or one of its aliases, position by position.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Household,
    Product,
    Transaction,
}

impl EntityKind {
    /// Load order: reference tables before the rows that point at them.
    pub const ALL: [EntityKind; 3] = [
        EntityKind::Household,
        EntityKind::Product,
        EntityKind::Transaction,
    ];

    /// Substring that identifies this kind's files in the data directory.
    pub fn file_marker(self) -> &'static str {
        match self {
            EntityKind::Household => "household",
            EntityKind::Product => "product",
            EntityKind::Transaction => "transaction",
        }
    }

    pub fn schema(self) -> &'static EntitySchema {
        match self {
            EntityKind::Household => &HOUSEHOLD,
            EntityKind::Product => &PRODUCT,
            EntityKind::Transaction => &TRANSACTION,
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.file_marker())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Integer,
    BigInt,
    Float,
    Text,
}

#[derive(Debug)]
pub struct FieldSpec {
    pub name: &'static str,
    pub aliases: &'static [&'static str],
    pub ty: FieldType,
    /// Optional fields may only appear at the end of a descriptor.
    pub required: bool,
}

impl FieldSpec {
    const fn new(name: &'static str, aliases: &'static [&'static str], ty: FieldType) -> Self {
        Self { name, aliases, ty, required: true }
    }

    const fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    fn matches(&self, header_cell: &str) -> bool {
        let normalized = header_cell.trim().to_ascii_uppercase();
        normalized == self.name || self.aliases.iter().any(|alias| *alias == normalized)
    }
}

#[derive(Debug)]
pub struct EntitySchema {
    pub kind: EntityKind,
    pub fields: &'static [FieldSpec],
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HeaderError {
    #[error("file has no header row")]
    Empty,

    #[error("column {position}: expected {expected}, found '{found}'")]
    Mismatch {
        position: usize,
        expected: &'static str,
        found: String,
    },

    #[error("column {position}: missing required column {expected}")]
    Missing { position: usize, expected: &'static str },

    #[error("column {position}: unexpected extra column '{found}'")]
    Extra { position: usize, found: String },
}

impl EntitySchema {
    pub fn min_columns(&self) -> usize {
        self.fields.iter().filter(|f| f.required).count()
    }

    pub fn max_columns(&self) -> usize {
        self.fields.len()
    }

    /// Check a header row and return how many columns the file carries.
    ///
    /// Positions in errors are 1-based.
    pub fn validate_header<'a, I>(&self, header: I) -> Result<usize, HeaderError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let cells: Vec<&str> = header.into_iter().collect();
        if cells.is_empty() || (cells.len() == 1 && cells[0].trim().is_empty()) {
            return Err(HeaderError::Empty);
        }

        for (index, field) in self.fields.iter().enumerate() {
            match cells.get(index) {
                Some(cell) if field.matches(cell) => {}
                Some(cell) => {
                    return Err(HeaderError::Mismatch {
                        position: index + 1,
                        expected: field.name,
                        found: cell.trim().to_string(),
                    })
                }
                None if field.required => {
                    return Err(HeaderError::Missing {
                        position: index + 1,
                        expected: field.name,
                    })
                }
                None => break,
            }
        }

        if cells.len() > self.max_columns() {
            let position = self.max_columns() + 1;
            return Err(HeaderError::Extra {
                position,
                found: cells[position - 1].trim().to_string(),
            });
        }

        Ok(cells.len())
    }

    pub fn field(&self, index: usize) -> &'static FieldSpec {
        &self.fields[index]
    }
}

pub static HOUSEHOLD: EntitySchema = EntitySchema {
    kind: EntityKind::Household,
    fields: &[
        FieldSpec::new("HSHD_NUM", &[], FieldType::Integer),
        FieldSpec::new("L", &["LOYALTY", "LOYALTY_FLAG"], FieldType::Text),
        FieldSpec::new("AGE_RANGE", &[], FieldType::Text),
        FieldSpec::new("MARITAL", &["MARITAL_STATUS"], FieldType::Text),
        FieldSpec::new("INCOME_RANGE", &[], FieldType::Text),
        FieldSpec::new("HOMEOWNER", &["HOMEOWNER_DESC"], FieldType::Text),
        FieldSpec::new("HSHD_COMPOSITION", &["HH_COMPOSITION"], FieldType::Text),
        FieldSpec::new("HH_SIZE", &["HSHD_SIZE"], FieldType::Text),
        FieldSpec::new("CHILDREN", &[], FieldType::Text),
    ],
};

pub static PRODUCT: EntitySchema = EntitySchema {
    kind: EntityKind::Product,
    fields: &[
        FieldSpec::new("PRODUCT_NUM", &[], FieldType::Integer),
        FieldSpec::new("DEPARTMENT", &[], FieldType::Text),
        FieldSpec::new("COMMODITY", &[], FieldType::Text),
        FieldSpec::new("BRAND_TY", &["BRAND_TYPE"], FieldType::Text),
        FieldSpec::new("NATURAL_ORGANIC_FLAG", &[], FieldType::Text).optional(),
    ],
};

pub static TRANSACTION: EntitySchema = EntitySchema {
    kind: EntityKind::Transaction,
    fields: &[
        FieldSpec::new("BASKET_NUM", &[], FieldType::BigInt),
        FieldSpec::new("HSHD_NUM", &[], FieldType::Integer),
        // Published extracts truncate this header to PURCHASE_.
        FieldSpec::new("PURCHASE_DATE", &["PURCHASE_", "PURCHASE"], FieldType::Text),
        FieldSpec::new("PRODUCT_NUM", &[], FieldType::Integer),
        FieldSpec::new("SPEND", &[], FieldType::Float),
        FieldSpec::new("UNITS", &[], FieldType::Integer),
        FieldSpec::new("STORE_R", &["STORE_REGION"], FieldType::Text),
        FieldSpec::new("WEEK_NUM", &[], FieldType::Integer),
        FieldSpec::new("YEAR", &[], FieldType::Integer),
    ],
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_padded_and_lowercase_headers() {
        let header = [
            "HSHD_NUM ", "L", "age_range", "MARITAL", "INCOME_RANGE", "HOMEOWNER",
            "HSHD_COMPOSITION", "HH_SIZE", " CHILDREN",
        ];
        assert_eq!(HOUSEHOLD.validate_header(header), Ok(9));
    }

    #[test]
    fn accepts_truncated_purchase_header() {
        let header = [
            "BASKET_NUM", "HSHD_NUM", "PURCHASE_", "PRODUCT_NUM", "SPEND", "UNITS", "STORE_R",
            "WEEK_NUM", "YEAR",
        ];
        assert_eq!(TRANSACTION.validate_header(header), Ok(9));
    }

    #[test]
    fn product_organic_flag_is_optional() {
        let four = ["PRODUCT_NUM", "DEPARTMENT", "COMMODITY", "BRAND_TY"];
        let five = ["PRODUCT_NUM", "DEPARTMENT", "COMMODITY", "BRAND_TY", "NATURAL_ORGANIC_FLAG"];
        assert_eq!(PRODUCT.validate_header(four), Ok(4));
        assert_eq!(PRODUCT.validate_header(five), Ok(5));
        assert_eq!(PRODUCT.min_columns(), 4);
        assert_eq!(PRODUCT.max_columns(), 5);
    }

    #[test]
    fn rejects_reordered_columns() {
        let header = [
            "HSHD_NUM", "BASKET_NUM", "PURCHASE_", "PRODUCT_NUM", "SPEND", "UNITS", "STORE_R",
            "WEEK_NUM", "YEAR",
        ];
        assert_eq!(
            TRANSACTION.validate_header(header),
            Err(HeaderError::Mismatch {
                position: 1,
                expected: "BASKET_NUM",
                found: "HSHD_NUM".to_string(),
            })
        );
    }

    #[test]
    fn rejects_missing_and_extra_columns() {
        let short = ["PRODUCT_NUM", "DEPARTMENT", "COMMODITY"];
        assert_eq!(
            PRODUCT.validate_header(short),
            Err(HeaderError::Missing { position: 4, expected: "BRAND_TY" })
        );

        let long = ["PRODUCT_NUM", "DEPARTMENT", "COMMODITY", "BRAND_TY", "NATURAL_ORGANIC_FLAG", "X"];
        assert_eq!(
            PRODUCT.validate_header(long),
            Err(HeaderError::Extra { position: 6, found: "X".to_string() })
        );
    }

    #[test]
    fn rejects_empty_header() {
        assert_eq!(HOUSEHOLD.validate_header([""]), Err(HeaderError::Empty));
        assert_eq!(HOUSEHOLD.validate_header(Vec::<&str>::new()), Err(HeaderError::Empty));
    }

    #[test]
    fn kinds_map_to_their_schema() {
        for kind in EntityKind::ALL {
            assert_eq!(kind.schema().kind, kind);
        }
    }
}
