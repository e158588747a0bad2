use config::Config;
use loans::filter::Constraints;
use loans::record::RecordVec;
use loans::{LoadState, Loader, Record};

use clap::builder::PossibleValuesParser;
use clap::Parser;
use env_logger::Env;
use polars::prelude::*;
use std::error::Error;
use std::fs::File;
use std::time::Duration;

use log::{debug, info};

enum OutputType {
    CSV,
    TABLE,
    POLAR,
}

impl OutputType {
    fn from_str(s: &str) -> Option<Self> {
        match s {
            "csv" => Some(OutputType::CSV),
            "table" => Some(OutputType::TABLE),
            "polar" => Some(OutputType::POLAR),
            _ => None,
        }
    }
}

trait Output {
    fn output(&self) -> Result<(), Box<dyn Error>>;
}

struct PolarOutput {
    df: DataFrame,
}

impl PolarOutput {
    fn new(df: DataFrame) -> Self {
        PolarOutput { df }
    }
}

impl Output for PolarOutput {
    fn output(&self) -> Result<(), Box<dyn Error>> {
        println!("{}", self.df);
        Ok(())
    }
}

struct CsvOutput {
    filename: String,
    df: DataFrame,
}

impl CsvOutput {
    fn new(filename: String, df: DataFrame) -> Self {
        CsvOutput { filename, df }
    }
}

impl Output for CsvOutput {
    fn output(&self) -> Result<(), Box<dyn Error>> {
        let mut file = File::create(&self.filename)?;
        let mut m_df = self.df.clone();
        CsvWriter::new(&mut file).finish(&mut m_df)?;
        info!("csv written: {}", self.filename);
        Ok(())
    }
}

struct TableOutput {
    delay: Duration,
}

impl TableOutput {
    fn new(delay: Duration) -> Self {
        TableOutput { delay }
    }
}

impl Output for TableOutput {
    fn output(&self) -> Result<(), Box<dyn Error>> {
        // the dashboard owns the load so it can show the loading state
        ui::tui::run(Loader::new(self.delay))
    }
}

/// Grade dashboard and reports over the bundled loan dataset
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
struct Args {
    #[arg(
        short = 'F',
        long = "format",
        value_parser = PossibleValuesParser::new(["csv", "table", "polar"]),
        help = "output format, defaults to the configured one"
    )]
    format: Option<String>,

    #[arg(
        long = "detail",
        help = "where the report formats dump the full record set, e.g. --detail detail.csv"
    )]
    detail: Option<String>,

    #[arg(long = "no-detail", action = clap::ArgAction::SetTrue, help = "do not keep a detail csv file, ignore --detail if this is set")]
    no_detail: bool,

    #[arg(
        long = "delay-ms",
        help = "override the configured simulated network delay"
    )]
    delay_ms: Option<u64>,

    #[arg(long = "year", help = "pin the year for the report formats")]
    year: Option<String>,

    #[arg(long = "quarter", help = "pin the quarter, e.g. Q1")]
    quarter: Option<String>,

    #[arg(long = "home-ownership", help = "pin the home ownership, e.g. RENT")]
    home_ownership: Option<String>,

    #[arg(long = "term", help = "pin the term, e.g. '36 months'")]
    term: Option<String>,
}

impl Args {
    fn constraints(&self) -> Constraints {
        Constraints {
            year: self.year.clone(),
            quarter: self.quarter.clone(),
            home_ownership: self.home_ownership.clone(),
            term: self.term.clone(),
        }
    }
}

pub struct LoanFrame<'a> {
    df: &'a DataFrame,
    constraints: &'a Constraints,
}

impl<'a> LoanFrame<'a> {
    pub fn new(df: &'a DataFrame, constraints: &'a Constraints) -> Self {
        LoanFrame { df, constraints }
    }

    /// Balance summed per grade over the constrained subset, sorted by
    /// grade. Ungraded records drop out here just as they do on the
    /// dashboard; empty grades read back from CSV as nulls.
    pub fn summary(&self) -> DataFrame {
        let q = self.df.clone().lazy();

        let mut filter_expr = col("grade").is_not_null();
        let pins = [
            ("year", &self.constraints.year),
            ("quarter", &self.constraints.quarter),
            ("home_ownership", &self.constraints.home_ownership),
            ("term", &self.constraints.term),
        ];
        for (name, pin) in pins {
            if let Some(value) = pin {
                // the csv reader type-infers columns like year, compare as text
                filter_expr =
                    filter_expr.and(col(name).cast(DataType::String).eq(lit(value.as_str())));
            }
        }

        q.filter(filter_expr)
            .select(vec![col("grade"), col("current_balance")])
            .group_by(["grade"])
            .agg([col("*").sum()])
            .sort(["grade"], SortMultipleOptions::default())
            .collect()
            .unwrap()
    }
}

fn load_records(delay: Duration) -> Result<Vec<Record>, Box<dyn Error>> {
    let mut loader = Loader::new(delay);
    match loader.wait() {
        LoadState::Loaded(records) => Ok(records.clone()),
        LoadState::Failed(e) => Err(format!("dataset load failed: {e}").into()),
        _ => Err("dataset load did not finish".into()),
    }
}

fn detail_df(records: &[Record]) -> Result<DataFrame, Box<dyn Error>> {
    let file = RecordVec::new(records.to_vec()).file_cursor()?;
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .into_reader_with_file_handle(file)
        .finish()?;
    Ok(df)
}

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let conf = Config::new(".loan-stat.yml");

    let format = args.format.clone().unwrap_or(conf.output.clone());
    let delay = Duration::from_millis(args.delay_ms.unwrap_or(conf.delay_ms));

    match OutputType::from_str(format.as_str()).expect("output not match") {
        OutputType::TABLE => {
            TableOutput::new(delay).output().expect("table output failed");
        }
        out_type => {
            let records = load_records(delay).expect("dataset load failed");
            let df = detail_df(&records).expect("building dataframe failed");

            if !args.no_detail {
                let detail_file = args.detail.clone().unwrap_or("detail.csv".to_string());
                info!("detail csv file: {}", detail_file);
                CsvOutput::new(detail_file, df.clone())
                    .output()
                    .expect("detail csv output failed");
            }

            let constraints = args.constraints();
            debug!("report constraints: {:?}", constraints);
            let summ = LoanFrame::new(&df, &constraints).summary();

            let output: Box<dyn Output> = match out_type {
                OutputType::CSV => Box::new(CsvOutput::new(String::from("report.csv"), summ)),
                _ => Box::new(PolarOutput::new(summ)),
            };
            output.output().expect("output failed");
        }
    }
}
