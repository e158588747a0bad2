use std::collections::HashMap;

use crate::record::Record;

/// Summed balance for one grade.
#[derive(Debug, Clone, PartialEq)]
pub struct GradeTotal {
    pub grade: String,
    pub balance: f64,
}

/// Group the subset by grade and sum each group's current balance.
///
/// Grades come out in first-seen order so the table and chart render
/// deterministically. A balance that fails to parse poisons its group's
/// sum with NaN instead of being skipped. No rounding happens here.
pub fn balance_by_grade(records: &[Record]) -> Vec<GradeTotal> {
    let mut totals: HashMap<String, f64> = HashMap::new();
    let mut order: Vec<String> = Vec::new();

    for record in records {
        if !totals.contains_key(&record.grade) {
            order.push(record.grade.clone());
        }
        let total = totals.entry(record.grade.clone()).or_insert(0.0);
        *total += record.balance();
    }

    order
        .into_iter()
        .map(|grade| {
            let balance = totals[&grade];
            GradeTotal { grade, balance }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{filter, Constraints};

    fn fixture() -> Vec<Record> {
        vec![
            Record::new(
                "2018".into(),
                "Q1".into(),
                "A".into(),
                "RENT".into(),
                "36".into(),
                "1000.00".into(),
            ),
            Record::new(
                "2018".into(),
                "Q1".into(),
                "B".into(),
                "OWN".into(),
                "60".into(),
                "2000.50".into(),
            ),
            Record::new(
                "2018".into(),
                "Q2".into(),
                "A".into(),
                "RENT".into(),
                "36".into(),
                "500.00".into(),
            ),
        ]
    }

    #[test]
    fn sums_balances_per_grade_in_first_seen_order() {
        let totals = balance_by_grade(&fixture());
        assert_eq!(
            totals,
            vec![
                GradeTotal {
                    grade: "A".into(),
                    balance: 1500.0
                },
                GradeTotal {
                    grade: "B".into(),
                    balance: 2000.5
                },
            ]
        );
    }

    #[test]
    fn respects_an_upstream_quarter_pin() {
        let constraints = Constraints {
            quarter: Some("Q1".into()),
            ..Constraints::default()
        };
        let totals = balance_by_grade(&filter(&fixture(), &constraints));
        assert_eq!(
            totals,
            vec![
                GradeTotal {
                    grade: "A".into(),
                    balance: 1000.0
                },
                GradeTotal {
                    grade: "B".into(),
                    balance: 2000.5
                },
            ]
        );
    }

    #[test]
    fn empty_subset_yields_empty_mapping() {
        assert!(balance_by_grade(&[]).is_empty());
    }

    #[test]
    fn repeated_calls_yield_the_same_mapping() {
        let records = fixture();
        assert_eq!(balance_by_grade(&records), balance_by_grade(&records));
    }

    #[test]
    fn grade_totals_add_up_to_the_subset_total() {
        let records = filter(&fixture(), &Constraints::default());
        let total: f64 = records.iter().map(Record::balance).sum();
        let sum_of_parts: f64 = balance_by_grade(&records)
            .iter()
            .map(|t| t.balance)
            .sum();
        assert!((total - sum_of_parts).abs() < 1e-9);
    }

    #[test]
    fn nan_balance_poisons_its_group() {
        let mut records = fixture();
        records.push(Record::new(
            "2018".into(),
            "Q2".into(),
            "A".into(),
            "RENT".into(),
            "36".into(),
            "not-a-number".into(),
        ));
        let totals = balance_by_grade(&records);
        assert!(totals[0].balance.is_nan());
        // the other group is untouched
        assert_eq!(totals[1].balance, 2000.5);
    }
}
