//! Command-line front end for the casewise selection engine.
//!
//! Reads a JSON dataset (`{"variables": [...], "rows": [...]}`) named by
//! configuration and runs one selection strategy per invocation:
//!
//! ```text
//! casewise where '<expression>'
//! casewise sample approximate <percentage>
//! casewise sample exact <count> [fromFirstCount]
//! casewise range <firstCase> [lastCase]
//! casewise filter <variableName>
//! ```
//!
//! Configuration comes from `casewise.toml` in the working directory and/or
//! `CASEWISE_*` environment variables:
//!
//! * `dataset` – path to the dataset file (required)
//! * `seed` – optional RNG seed for reproducible sampling
//!
//! The selection and its 0/1 filter column are printed as JSON on stdout.
//! An empty selection is a normal outcome and exits zero; only
//! configuration and I/O problems exit nonzero.

use std::process::ExitCode;

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use casewise::error::{EngineError, Result};
use casewise::schema::{Row, Schema, Variable};
use casewise::select::{
    filter_column, select_by_condition, select_by_filter_variable, select_by_range,
    select_random_sample, RandomSampleConfig, RangeConfig,
};

#[derive(Deserialize)]
struct DatasetFile {
    variables: Vec<Variable>,
    rows: Vec<Row>,
}

#[derive(Serialize)]
struct SelectionOutput {
    selected: Vec<usize>,
    filter: Vec<u8>,
}

struct Settings {
    dataset: String,
    seed: Option<u64>,
}

fn settings() -> Result<Settings> {
    let source = config::Config::builder()
        .add_source(config::File::with_name("casewise").required(false))
        .add_source(config::Environment::with_prefix("CASEWISE"))
        .build()?;
    let dataset = source
        .get_string("dataset")
        .map_err(|_| EngineError::Config(String::from("no dataset configured")))?;
    let seed = source.get_int("seed").ok().map(|s| s as u64);
    Ok(Settings { dataset, seed })
}

fn load_dataset(path: &str) -> Result<(Schema, Vec<Row>)> {
    let text = std::fs::read_to_string(path)?;
    let file: DatasetFile = serde_json::from_str(&text)?;
    let schema = Schema::new(file.variables)?;
    Ok((schema, file.rows))
}

const USAGE: &str = "usage: casewise where <expression> \
    | sample approximate <percentage> \
    | sample exact <count> [fromFirstCount] \
    | range <firstCase> [lastCase] \
    | filter <variableName>";

fn usage() -> EngineError {
    EngineError::Config(String::from(USAGE))
}

fn run() -> Result<()> {
    let settings = settings()?;
    let (schema, rows) = load_dataset(&settings.dataset)?;
    info!(
        dataset = %settings.dataset,
        variables = schema.len(),
        cases = rows.len(),
        "dataset loaded"
    );

    let args: Vec<String> = std::env::args().skip(1).collect();
    let selected = match args.first().map(String::as_str) {
        Some("where") => {
            let expression = args.get(1).ok_or_else(usage)?;
            select_by_condition(&rows, &schema, expression)
        }
        Some("sample") => {
            let config = sample_config(&args[1..])?;
            let mut rng = match settings.seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };
            select_random_sample(&rows, &config, &mut rng)
        }
        Some("range") => {
            let range = RangeConfig {
                first_case: args.get(1).cloned(),
                last_case: args.get(2).cloned(),
            };
            if range.first_case.is_none() {
                return Err(usage());
            }
            select_by_range(&rows, &range)
        }
        Some("filter") => {
            let name = args.get(1).ok_or_else(usage)?;
            let variable = schema.variable(name);
            if variable.is_none() {
                error!(variable = %name, "filter variable not in schema");
            }
            select_by_filter_variable(&rows, variable)
        }
        _ => return Err(usage()),
    };

    let output = SelectionOutput {
        filter: filter_column(&selected, rows.len()),
        selected,
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn sample_config(args: &[String]) -> Result<RandomSampleConfig> {
    match args.first().map(String::as_str) {
        Some("approximate") => {
            let percentage = args
                .get(1)
                .and_then(|p| p.parse::<f64>().ok())
                .ok_or_else(usage)?;
            Ok(RandomSampleConfig::Approximate { percentage })
        }
        Some("exact") => {
            let exact_count = args
                .get(1)
                .and_then(|c| c.parse::<usize>().ok())
                .ok_or_else(usage)?;
            let from_first_count = match args.get(2) {
                Some(n) => Some(n.parse::<usize>().map_err(|_| usage())?),
                None => None,
            };
            Ok(RandomSampleConfig::Exact {
                exact_count,
                from_first_count,
            })
        }
        _ => Err(usage()),
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "casewise failed");
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}
