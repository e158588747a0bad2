use itertools::Itertools;

use crate::record::Record;

/// The four fields a user can pin to a single value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Year,
    Quarter,
    HomeOwnership,
    Term,
}

impl Field {
    pub const ALL: [Field; 4] = [Field::Year, Field::Quarter, Field::HomeOwnership, Field::Term];

    pub fn label(&self) -> &'static str {
        match self {
            Field::Year => "Year",
            Field::Quarter => "Quarter",
            Field::HomeOwnership => "Home Ownership",
            Field::Term => "Term",
        }
    }

    pub fn value<'a>(&self, record: &'a Record) -> &'a str {
        match self {
            Field::Year => &record.year,
            Field::Quarter => &record.quarter,
            Field::HomeOwnership => &record.home_ownership,
            Field::Term => &record.term,
        }
    }
}

/// Active field pins. An unset field matches any value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Constraints {
    pub year: Option<String>,
    pub quarter: Option<String>,
    pub home_ownership: Option<String>,
    pub term: Option<String>,
}

impl Constraints {
    pub fn get(&self, field: Field) -> Option<&str> {
        match field {
            Field::Year => self.year.as_deref(),
            Field::Quarter => self.quarter.as_deref(),
            Field::HomeOwnership => self.home_ownership.as_deref(),
            Field::Term => self.term.as_deref(),
        }
    }

    pub fn set(&mut self, field: Field, value: Option<String>) {
        match field {
            Field::Year => self.year = value,
            Field::Quarter => self.quarter = value,
            Field::HomeOwnership => self.home_ownership = value,
            Field::Term => self.term = value,
        }
    }

    pub fn reset(&mut self) {
        *self = Constraints::default();
    }

    /// Every pinned field must match exactly (case-sensitive), and records
    /// without a grade never match.
    pub fn matches(&self, record: &Record) -> bool {
        fn pin_ok(pin: Option<&str>, value: &str) -> bool {
            pin.map_or(true, |p| p == value)
        }

        !record.grade.is_empty()
            && pin_ok(self.year.as_deref(), &record.year)
            && pin_ok(self.quarter.as_deref(), &record.quarter)
            && pin_ok(self.home_ownership.as_deref(), &record.home_ownership)
            && pin_ok(self.term.as_deref(), &record.term)
    }
}

/// The matching subset, in the input's order.
pub fn filter(records: &[Record], constraints: &Constraints) -> Vec<Record> {
    records
        .iter()
        .filter(|record| constraints.matches(record))
        .cloned()
        .collect()
}

/// Distinct non-empty values present for one field, sorted as strings.
/// Numeric-looking labels like years sort lexicographically.
pub fn options_for(records: &[Record], field: Field) -> Vec<String> {
    records
        .iter()
        .map(|record| field.value(record).to_string())
        .filter(|value| !value.is_empty())
        .unique()
        .sorted()
        .collect_vec()
}
