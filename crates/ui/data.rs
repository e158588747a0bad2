use loans::aggregate::GradeTotal;

/// One column of the grade table: the header text and the formatted
/// balance cell below it.
#[derive(Debug, PartialEq)]
pub struct GradeRow {
    pub grade: String,
    pub balance: String,
}

impl GradeRow {
    pub fn from_totals(totals: &[GradeTotal]) -> Vec<GradeRow> {
        totals
            .iter()
            .map(|total| GradeRow {
                grade: format!("Grade {}", total.grade),
                balance: format_currency(total.balance),
            })
            .collect()
    }

    pub fn grade(&self) -> &str {
        &self.grade
    }

    pub fn balance(&self) -> &str {
        &self.balance
    }
}

/// Currency with two decimal places. Rounding happens here and nowhere
/// upstream.
pub fn format_currency(balance: f64) -> String {
    format!("${:.2}", balance)
}
