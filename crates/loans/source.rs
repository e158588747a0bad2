use csv::ReaderBuilder;
use log::debug;

use crate::record::Record;

/// Quarterly loan-size extract bundled with the binary. The dataset is
/// fixed at build time; there is no runtime path to swap it out.
pub const DATASET: &str = include_str!("data/loansize.csv");

/// Preamble rows before the data: a title line and the column-name line.
const HEADER_ROWS: usize = 2;

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("malformed dataset: {0}")]
    Malformed(#[from] csv::Error),
    #[error("dataset load was interrupted")]
    Interrupted,
}

/// Parse raw dataset text into records, in file order.
///
/// Columns are positional: year, quarter, grade, home ownership, term,
/// current balance. Rows shorter than six fields fill in with empty
/// strings; there is no per-row column-count validation.
pub fn parse_records(raw: &str) -> Result<Vec<Record>, SourceError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(raw.as_bytes());

    let mut records = Vec::new();
    for (i, row) in reader.records().enumerate() {
        let row = row?;
        if i < HEADER_ROWS {
            continue;
        }
        let field = |idx: usize| row.get(idx).unwrap_or("").to_string();
        records.push(Record::new(
            field(0),
            field(1),
            field(2),
            field(3),
            field(4),
            field(5),
        ));
    }
    debug!("parsed {} records from dataset", records.len());
    Ok(records)
}

/// Parse the bundled dataset.
pub fn load() -> Result<Vec<Record>, SourceError> {
    parse_records(DATASET)
}

#[cfg(test)]
mod tests {
    use super::*;

    const RAW: &str = "\
quarterly loan size extract,,,,,
year,quarter,grade,home_ownership,term,current_balance
2018,Q1,A,RENT,36 months,1000.00
2018,Q1,B,OWN,60 months,2000.50
2018,Q2,A,RENT,36 months,500.00
";

    #[test]
    fn skips_two_preamble_rows() {
        let records = parse_records(RAW).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].year, "2018");
        assert_eq!(records[0].grade, "A");
    }

    #[test]
    fn maps_columns_positionally_in_file_order() {
        let records = parse_records(RAW).unwrap();
        assert_eq!(
            records[1],
            Record::new(
                "2018".to_string(),
                "Q1".to_string(),
                "B".to_string(),
                "OWN".to_string(),
                "60 months".to_string(),
                "2000.50".to_string(),
            )
        );
        assert_eq!(records[2].quarter, "Q2");
    }

    #[test]
    fn short_rows_fill_missing_fields_with_empty_strings() {
        let raw = "title,,,,,\nyear,quarter,grade,home_ownership,term,current_balance\n2019,Q3,C\n";
        let records = parse_records(raw).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].grade, "C");
        assert_eq!(records[0].term, "");
        assert_eq!(records[0].current_balance, "");
    }

    #[test]
    fn preamble_only_input_yields_no_records() {
        let raw = "title,,,,,\nyear,quarter,grade,home_ownership,term,current_balance\n";
        assert_eq!(parse_records(raw).unwrap().len(), 0);
    }

    #[test]
    fn bundled_dataset_parses() {
        let records = load().unwrap();
        assert!(!records.is_empty());
        // every quarter label in the bundled extract is one of the four
        for record in &records {
            assert!(matches!(
                record.quarter.as_str(),
                "Q1" | "Q2" | "Q3" | "Q4"
            ));
        }
    }
}
