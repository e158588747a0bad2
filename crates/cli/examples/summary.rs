use polars::prelude::*;

fn main() {
    let path = "detail.csv";
    let q = LazyCsvReader::new(path)
        .with_has_header(true)
        .finish()
        .unwrap()
        .filter(col("grade").is_not_null())
        .select(vec![col("grade"), col("current_balance")])
        .group_by(vec![col("grade")])
        .agg([col("*").sum()]);

    let df = q.collect().unwrap();

    println!("{}", df)
}
