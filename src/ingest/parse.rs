use std::io::Read;
use std::path::Path;

use crate::database::models::{Household, Product, Transaction};

use super::schema::{EntityKind, EntitySchema, FieldType};
use super::IngestError;

/// A problem with a single cell, before file and line are attached.
#[derive(Debug)]
pub struct CellError {
    pub column: &'static str,
    pub reason: String,
}

/// Positional view over one data row, checked against its schema.
pub struct Row<'r> {
    schema: &'static EntitySchema,
    record: &'r csv::StringRecord,
}

impl<'r> Row<'r> {
    fn raw(&self, index: usize) -> &'r str {
        self.record.get(index).unwrap_or("")
    }

    fn number<T: std::str::FromStr>(&self, index: usize, expected: FieldType) -> Result<T, CellError>
    where
        T::Err: std::fmt::Display,
    {
        let field = self.schema.field(index);
        debug_assert_eq!(field.ty, expected);
        let raw = self.raw(index).trim();
        raw.parse::<T>().map_err(|e| CellError {
            column: field.name,
            reason: format!("invalid {:?} value '{}': {}", expected, raw, e),
        })
    }

    pub fn int(&self, index: usize) -> Result<i32, CellError> {
        self.number(index, FieldType::Integer)
    }

    pub fn big(&self, index: usize) -> Result<i64, CellError> {
        self.number(index, FieldType::BigInt)
    }

    pub fn float(&self, index: usize) -> Result<f64, CellError> {
        self.number(index, FieldType::Float)
    }

    /// Text is kept exactly as it appears in the file.
    pub fn text(&self, index: usize) -> String {
        self.raw(index).to_string()
    }

    pub fn opt_text(&self, index: usize) -> Option<String> {
        self.record.get(index).map(str::to_string)
    }
}

/// Conversion from a validated row into a typed record.
pub trait FromRecord: Sized {
    const KIND: EntityKind;

    fn from_record(row: &Row<'_>) -> Result<Self, CellError>;
}

impl FromRecord for Household {
    const KIND: EntityKind = EntityKind::Household;

    fn from_record(row: &Row<'_>) -> Result<Self, CellError> {
        Ok(Household {
            hshd_num: row.int(0)?,
            loyalty: row.text(1),
            age_range: row.text(2),
            marital: row.text(3),
            income_range: row.text(4),
            homeowner: row.text(5),
            hshd_composition: row.text(6),
            hh_size: row.text(7),
            children: row.text(8),
        })
    }
}

impl FromRecord for Product {
    const KIND: EntityKind = EntityKind::Product;

    fn from_record(row: &Row<'_>) -> Result<Self, CellError> {
        Ok(Product {
            product_num: row.int(0)?,
            department: row.text(1),
            commodity: row.text(2),
            brand_ty: row.text(3),
            natural_organic_flag: row.opt_text(4),
        })
    }
}

impl FromRecord for Transaction {
    const KIND: EntityKind = EntityKind::Transaction;

    fn from_record(row: &Row<'_>) -> Result<Self, CellError> {
        Ok(Transaction {
            basket_num: row.big(0)?,
            hshd_num: row.int(1)?,
            purchase_date: row.text(2),
            product_num: row.int(3)?,
            spend: row.float(4)?,
            units: row.int(5)?,
            store_r: row.text(6),
            week_num: row.int(7)?,
            year: row.int(8)?,
        })
    }
}

/// Parse a whole extract. The first bad row fails the entire file.
pub fn parse_reader<T: FromRecord, R: Read>(reader: R, path: &Path) -> Result<Vec<T>, IngestError> {
    let schema = T::KIND.schema();
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let header = csv_reader.headers().map_err(|source| IngestError::Csv {
        path: path.to_path_buf(),
        source,
    })?;
    let columns = schema
        .validate_header(header.iter())
        .map_err(|source| IngestError::Header {
            path: path.to_path_buf(),
            source,
        })?;

    let mut rows = Vec::new();
    let mut record = csv::StringRecord::new();
    loop {
        match csv_reader.read_record(&mut record) {
            Ok(true) => {}
            Ok(false) => break,
            Err(source) => {
                return Err(IngestError::Csv {
                    path: path.to_path_buf(),
                    source,
                })
            }
        }

        let line = record.position().map(|p| p.line()).unwrap_or(0);
        if record.len() == 1 && record[0].trim().is_empty() {
            continue;
        }
        if record.len() != columns {
            return Err(IngestError::Parse {
                path: path.to_path_buf(),
                line,
                column: "*",
                reason: format!("expected {} cells, found {}", columns, record.len()),
            });
        }

        let row = Row { schema, record: &record };
        let value = T::from_record(&row).map_err(|e| IngestError::Parse {
            path: path.to_path_buf(),
            line,
            column: e.column,
            reason: e.reason,
        })?;
        rows.push(value);
    }

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse<T: FromRecord>(csv: &str) -> Result<Vec<T>, IngestError> {
        parse_reader(csv.as_bytes(), Path::new("fixture.csv"))
    }

    #[test]
    fn parses_household_rows_keeping_raw_text() {
        let csv = "HSHD_NUM,L,AGE_RANGE,MARITAL,INCOME_RANGE,HOMEOWNER,HSHD_COMPOSITION,HH_SIZE,CHILDREN\n\
                   100,A,45-54,Married,35-49K,Y,Married-no children,2,N\n\
                   101,Y,19-24 ,Single,null ,Renter,1 Adult,1,NOT AVAILABLE\n";
        let rows: Vec<Household> = parse(csv).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].hshd_num, 100);
        assert_eq!(rows[0].income_range, "35-49K");
        assert_eq!(rows[0].hshd_composition, "Married-no children");
        assert_eq!(rows[1].age_range, "19-24 ");
        assert_eq!(rows[1].income_range, "null ");
    }

    #[test]
    fn parses_transactions_with_padded_numbers() {
        let csv = "BASKET_NUM,HSHD_NUM,PURCHASE_,PRODUCT_NUM,SPEND,UNITS,STORE_R,WEEK_NUM,YEAR\n\
                   1, 100 ,2023-01-01,500,12.50,2,S1,1,2023\n\
                   24,1600,03-JAN-20,104213,-1.99,1,EAST  ,1,2020\n";
        let rows: Vec<Transaction> = parse(csv).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].hshd_num, 100);
        assert_eq!(rows[0].spend, 12.5);
        assert_eq!(rows[1].spend, -1.99);
        assert_eq!(rows[1].store_r, "EAST  ");
    }

    #[test]
    fn parses_four_and_five_column_products() {
        let four = "PRODUCT_NUM,DEPARTMENT,COMMODITY,BRAND_TY\n500,FOOD,PRODUCE,NATIONAL\n";
        let rows: Vec<Product> = parse(four).unwrap();
        assert_eq!(rows[0].natural_organic_flag, None);

        let five = "PRODUCT_NUM,DEPARTMENT,COMMODITY,BRAND_TY,NATURAL_ORGANIC_FLAG\n\
                    500,FOOD,PRODUCE,NATIONAL,N\n";
        let rows: Vec<Product> = parse(five).unwrap();
        assert_eq!(rows[0].natural_organic_flag.as_deref(), Some("N"));
    }

    #[test]
    fn malformed_number_fails_whole_file_with_location() {
        let csv = "BASKET_NUM,HSHD_NUM,PURCHASE_,PRODUCT_NUM,SPEND,UNITS,STORE_R,WEEK_NUM,YEAR\n\
                   1,100,2023-01-01,500,12.50,2,S1,1,2023\n\
                   2,100,2023-01-02,500,twelve,2,S1,1,2023\n";
        match parse::<Transaction>(csv) {
            Err(IngestError::Parse { line, column, .. }) => {
                assert_eq!(line, 3);
                assert_eq!(column, "SPEND");
            }
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn short_row_is_rejected() {
        let csv = "PRODUCT_NUM,DEPARTMENT,COMMODITY,BRAND_TY\n500,FOOD,PRODUCE\n";
        assert!(matches!(
            parse::<Product>(csv),
            Err(IngestError::Parse { column: "*", line: 2, .. })
        ));
    }

    #[test]
    fn header_mismatch_is_reported_before_rows() {
        let csv = "DEPARTMENT,PRODUCT_NUM,COMMODITY,BRAND_TY\nFOOD,500,PRODUCE,NATIONAL\n";
        assert!(matches!(parse::<Product>(csv), Err(IngestError::Header { .. })));
    }

    #[test]
    fn header_only_file_yields_no_rows() {
        let csv = "PRODUCT_NUM,DEPARTMENT,COMMODITY,BRAND_TY\n";
        let rows: Vec<Product> = parse(csv).unwrap();
        assert!(rows.is_empty());
    }
}
