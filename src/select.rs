//! The selector engine: four independent strategies that turn a dataset
//! into a set of selected row indices.
//!
//! All strategies are pure single-pass functions over the rows. "No rows
//! matched" is an ordinary empty result, never an error; configuration
//! problems (inverted ranges, missing filter variables) are logged and also
//! yield an empty result, because nothing in this engine is fatal.

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

use crate::condition::Evaluator;
use crate::datatype::Value;
use crate::schema::{Row, Schema, Variable};

/// Random sampling configuration, mirroring the caller-facing JSON shape
/// (`{"sampleType": "approximate", "percentage": 50}`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "sampleType", rename_all = "lowercase")]
pub enum RandomSampleConfig {
    #[serde(rename_all = "camelCase")]
    Approximate { percentage: f64 },
    #[serde(rename_all = "camelCase")]
    Exact {
        exact_count: usize,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        from_first_count: Option<usize>,
    },
}

/// Range selection bounds: 1-based, inclusive case numbers, carried as
/// strings the way the caller's form fields supply them. An absent bound
/// means "from the start" respectively "to the end".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RangeConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_case: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_case: Option<String>,
}

/// Select every row satisfying the condition expression, in ascending row
/// order. A whitespace-only expression selects nothing (there is no
/// implicit "select all"). A row on which the evaluator fails is excluded
/// and the scan continues.
pub fn select_by_condition(dataset: &[Row], schema: &Schema, expression: &str) -> Vec<usize> {
    if expression.trim().is_empty() {
        warn!("empty condition expression, selecting no cases");
        return Vec::new();
    }
    let evaluator = Evaluator::new(schema);
    let mut selected = Vec::new();
    for (index, row) in dataset.iter().enumerate() {
        if evaluator.evaluate(expression, row) {
            selected.push(index);
        }
    }
    debug!(
        selected = selected.len(),
        total = dataset.len(),
        "condition selection complete"
    );
    selected
}

/// Select a random subset of rows by repeated draw-without-replacement over
/// an index pool. Indices come back in draw order, not ascending.
///
/// The random source is injected so that sampling is reproducible under a
/// seeded generator without changing the algorithm.
pub fn select_random_sample<R: Rng>(
    dataset: &[Row],
    config: &RandomSampleConfig,
    rng: &mut R,
) -> Vec<usize> {
    let total = dataset.len();
    if total == 0 {
        return Vec::new();
    }
    let (pool_size, sample_size) = match config {
        RandomSampleConfig::Approximate { percentage } => {
            let size = (percentage / 100.0 * total as f64).round();
            // defensive bounds only; range validation is the caller's job
            let size = size.clamp(0.0, total as f64) as usize;
            (total, size)
        }
        RandomSampleConfig::Exact {
            exact_count,
            from_first_count,
        } => {
            let pool = from_first_count.unwrap_or(total).min(total);
            (pool, (*exact_count).min(pool))
        }
    };
    let mut pool: Vec<usize> = (0..pool_size).collect();
    let mut drawn = Vec::with_capacity(sample_size);
    for _ in 0..sample_size {
        let at = rng.gen_range(0..pool.len());
        // Fisher-Yates-style pop: O(1) removal, uniform over the remainder
        drawn.push(pool.swap_remove(at));
    }
    debug!(drawn = drawn.len(), pool = pool_size, "random sample complete");
    drawn
}

/// Select the contiguous span of rows between two 1-based, inclusive case
/// numbers. Invalid bounds (out of range, inverted, unparsable) are logged
/// and select nothing.
pub fn select_by_range(dataset: &[Row], range: &RangeConfig) -> Vec<usize> {
    let total = dataset.len();
    let first_case = match parse_case_number(range.first_case.as_deref(), 1) {
        Some(n) => n,
        None => {
            error!(bound = ?range.first_case, "unparsable first case");
            return Vec::new();
        }
    };
    let last_case = match parse_case_number(range.last_case.as_deref(), total as i64) {
        Some(n) => n,
        None => {
            error!(bound = ?range.last_case, "unparsable last case");
            return Vec::new();
        }
    };
    // 1-based inclusive case numbers to 0-based inclusive indices; a bound
    // of i64::MIN has no predecessor and is as invalid as any other
    // out-of-range case number
    let (first, last) = match (first_case.checked_sub(1), last_case.checked_sub(1)) {
        (Some(first), Some(last)) => (first, last),
        _ => {
            error!(first_case, last_case, total, "invalid case range");
            return Vec::new();
        }
    };
    if first < 0 || last >= total as i64 || first > last {
        error!(first_case, last_case, total, "invalid case range");
        return Vec::new();
    }
    (first as usize..=last as usize).collect()
}

fn parse_case_number(bound: Option<&str>, default: i64) -> Option<i64> {
    match bound {
        None => Some(default),
        Some(text) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                Some(default)
            } else {
                trimmed.parse::<i64>().ok()
            }
        }
    }
}

/// Select every row whose cell in the filter variable's column is truthy:
/// a case is excluded only when that cell is exactly zero, empty text, or
/// missing. With no filter variable, nothing is selected.
pub fn select_by_filter_variable(dataset: &[Row], filter_variable: Option<&Variable>) -> Vec<usize> {
    let variable = match filter_variable {
        Some(variable) => variable,
        None => {
            warn!("no filter variable given, selecting no cases");
            return Vec::new();
        }
    };
    let mut selected = Vec::new();
    for (index, row) in dataset.iter().enumerate() {
        let cell = row.get(variable.column_index).unwrap_or(&Value::Missing);
        if cell.truthy() {
            selected.push(index);
        }
    }
    selected
}

/// Render a selection into the 0/1 column consumed by the filter
/// materializer: one entry per row, 1 where the row is selected.
/// Out-of-range indices are ignored.
pub fn filter_column(selection: &[usize], total_rows: usize) -> Vec<u8> {
    let mut column = vec![0u8; total_rows];
    for &index in selection {
        if let Some(flag) = column.get_mut(index) {
            *flag = 1;
        }
    }
    column
}
