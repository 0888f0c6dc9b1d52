//! Brand value records loaded from CSV
//!
//! Expected columns: `name, year, value, lastValue`. Extra columns are
//! ignored. Numeric fields that are missing or malformed are coerced to 0
//! instead of failing the load.

use crate::chart::error::Result;
use csv::ReaderBuilder;
use serde::Deserialize;
use std::io::Read;
use std::path::Path;

/// One row of the race dataset
#[derive(Debug, Clone, PartialEq)]
pub struct BrandRecord {
    pub name: String,
    pub year: f64,
    pub value: f64,
    pub last_value: f64,
}

/// Row as it appears in the file, before numeric coercion
#[derive(Debug, Deserialize)]
struct RawRecord {
    #[serde(default)]
    name: String,
    #[serde(default)]
    year: String,
    #[serde(default)]
    value: String,
    #[serde(default, rename = "lastValue")]
    last_value: String,
}

impl RawRecord {
    /// Coerce every numeric field, counting the ones that had to fall back to 0
    fn coerce(self, coerced: &mut usize) -> BrandRecord {
        let mut number = |text: &str| {
            parse_number(text).unwrap_or_else(|| {
                *coerced += 1;
                0.0
            })
        };
        BrandRecord {
            year: number(&self.year),
            value: number(&self.value),
            last_value: number(&self.last_value),
            name: self.name.trim().to_string(),
        }
    }
}

/// Finite number, or None
fn parse_number(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// All records of a race dataset
#[derive(Debug, Clone, Default)]
pub struct BrandDataset {
    records: Vec<BrandRecord>,
    coerced: usize,
}

impl BrandDataset {
    pub fn from_records(records: Vec<BrandRecord>) -> Self {
        Self {
            records,
            coerced: 0,
        }
    }

    /// Parse CSV data with a header row
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::Headers)
            .from_reader(reader);

        let mut records = Vec::new();
        let mut coerced = 0usize;
        for row in reader.deserialize::<RawRecord>() {
            let record = row?.coerce(&mut coerced);
            if record.name.is_empty() {
                tracing::warn!(year = record.year, "skipping row without a name");
                continue;
            }
            records.push(record);
        }

        if coerced > 0 {
            tracing::warn!(fields = coerced, "non-numeric values coerced to 0");
        }
        tracing::debug!(rows = records.len(), "loaded brand records");

        Ok(Self { records, coerced })
    }

    /// Load a CSV file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path.as_ref())?;
        Self::from_reader(std::io::BufReader::new(file))
    }

    pub fn records(&self) -> &[BrandRecord] {
        &self.records
    }

    /// Numeric fields that were unusable and read as 0
    pub fn coerced(&self) -> usize {
        self.coerced
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct brand names in order of first appearance
    pub fn names(&self) -> Vec<String> {
        crate::chart::scales::distinct_in_order(self.records.iter().map(|r| r.name.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::error::ChartError;

    const SAMPLE: &str = "\
name,year,value,lastValue,rank
Coca-Cola,2000,72537,70000,1
Microsoft,2000,70196,68000,2
IBM,2000,53183,n/a,3
Intel,2000,,39000,4
Coca-Cola,2000.1,72200,72537,1
";

    #[test]
    fn test_parse_sample() {
        let data = BrandDataset::from_reader(SAMPLE.as_bytes()).unwrap();
        assert_eq!(data.len(), 5);

        let first = &data.records()[0];
        assert_eq!(first.name, "Coca-Cola");
        assert_eq!(first.year, 2000.0);
        assert_eq!(first.value, 72537.0);
        assert_eq!(first.last_value, 70000.0);

        assert_eq!(data.records()[4].year, 2000.1);
    }

    #[test]
    fn test_malformed_numbers_become_zero() {
        let data = BrandDataset::from_reader(SAMPLE.as_bytes()).unwrap();
        assert_eq!(data.records()[2].last_value, 0.0);
        assert_eq!(data.records()[3].value, 0.0);
        assert_eq!(parse_number(" 12.5 "), Some(12.5));
        assert_eq!(parse_number("NaN"), None);
        assert_eq!(parse_number("inf"), None);
    }

    #[test]
    fn test_every_coerced_field_is_counted() {
        let data = BrandDataset::from_reader(SAMPLE.as_bytes()).unwrap();
        assert_eq!(data.coerced(), 2);

        let csv = "name,year,value,lastValue\nA,soon,inf,1\nB,2000,5,6\n";
        let data = BrandDataset::from_reader(csv.as_bytes()).unwrap();
        assert_eq!(data.coerced(), 2);
        assert_eq!(data.records()[0].year, 0.0);
        assert_eq!(data.records()[0].value, 0.0);
    }

    #[test]
    fn test_names_distinct_in_order() {
        let data = BrandDataset::from_reader(SAMPLE.as_bytes()).unwrap();
        assert_eq!(data.names(), vec!["Coca-Cola", "Microsoft", "IBM", "Intel"]);
    }

    #[test]
    fn test_missing_columns_default_to_zero() {
        let data = BrandDataset::from_reader("name,year\nA,2000\n".as_bytes()).unwrap();
        assert_eq!(data.records()[0].value, 0.0);
        assert_eq!(data.records()[0].last_value, 0.0);
    }

    #[test]
    fn test_rows_without_name_are_skipped() {
        let data = BrandDataset::from_reader("name,year,value\n,2000,5\nB,2000,6\n".as_bytes())
            .unwrap();
        assert_eq!(data.len(), 1);
    }

    #[test]
    fn test_bundled_dataset_loads() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("data/brands.csv");
        let data = BrandDataset::load(path).unwrap();
        assert_eq!(data.names().len(), 15);
        assert_eq!(data.len(), 15 * 11);
        assert!(data.records().iter().any(|r| r.name == "AT&T"));
    }

    #[test]
    fn test_missing_file_is_an_error_not_a_panic() {
        let err = BrandDataset::load("/definitely/not/here.csv").unwrap_err();
        assert!(matches!(err, ChartError::Io(_)));
    }

    #[test]
    fn test_ragged_rows_are_reported() {
        let err = BrandDataset::from_reader("name,year,value\nA,2000\n".as_bytes()).unwrap_err();
        assert!(matches!(err, ChartError::Csv(_)));
    }
}
