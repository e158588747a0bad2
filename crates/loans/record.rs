use std::error::Error;
use std::io::Cursor;

use serde::Serialize;

/// One loan observation. All fields come out of the dataset as text;
/// `current_balance` is only parsed to a number when sums are taken.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    pub year: String,
    pub quarter: String,
    pub grade: String,
    pub home_ownership: String,
    pub term: String,
    pub current_balance: String,
}

impl Record {
    pub fn new(
        year: String,
        quarter: String,
        grade: String,
        home_ownership: String,
        term: String,
        current_balance: String,
    ) -> Self {
        Record {
            year,
            quarter,
            grade,
            home_ownership,
            term,
            current_balance,
        }
    }

    /// Balance as a number. Unparseable text degrades to NaN and is carried
    /// into whatever sum this record lands in.
    pub fn balance(&self) -> f64 {
        self.current_balance.parse().unwrap_or(f64::NAN)
    }
}

#[derive(Debug, Clone)]
pub struct RecordVec {
    pub record_vec: Vec<Record>,
}

impl RecordVec {
    pub fn new(record_vec: Vec<Record>) -> Self {
        RecordVec { record_vec }
    }

    /// The record set as an in-memory CSV file, one header row with the
    /// field names followed by one row per record. Feeds the dataframe
    /// readers in the report outputs.
    pub fn file_cursor(&self) -> Result<Cursor<Vec<u8>>, Box<dyn Error>> {
        let mut wtr = csv::Writer::from_writer(vec![]);
        for record in &self.record_vec {
            wtr.serialize(record)?;
        }
        let buf = wtr.into_inner()?;
        Ok(Cursor::new(buf))
    }
}
