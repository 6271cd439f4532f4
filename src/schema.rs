use core::hash::BuildHasherDefault;
use std::collections::{HashMap, HashSet};

use regex::Regex;
use seahash::SeaHasher;
use serde::{Deserialize, Serialize};

use crate::datatype::Value;
use crate::error::{EngineError, Result};

// variable names are short strings, so a fast non-cryptographic hash will do
pub type NameHasher = BuildHasherDefault<SeaHasher>;

/// One data row, indexed positionally by column. Rows are read-only inputs
/// to the engine and are never mutated.
pub type Row = Vec<Value>;

/// The name→value view of one row, keyed by variable name.
pub type ValueMap<'a> = HashMap<&'a str, &'a Value, NameHasher>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VariableType {
    Numeric,
    Text,
}

/// Statistical scale classification. Carried as schema metadata for
/// downstream consumers; the evaluator itself never looks at it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Measure {
    Nominal,
    Ordinal,
    Scale,
}

/// One schema entry: a named column of the dataset.
///
/// The name is the token matched inside condition expressions, so it should
/// be identifier-like. The column index is the 0-based position of the
/// variable's cell in every data row.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Variable {
    pub name: String,
    pub column_index: usize,
    #[serde(rename = "type")]
    pub variable_type: VariableType,
    pub measure: Measure,
}

impl Variable {
    pub fn new(
        name: impl Into<String>,
        column_index: usize,
        variable_type: VariableType,
        measure: Measure,
    ) -> Self {
        Self {
            name: name.into(),
            column_index,
            variable_type,
            measure,
        }
    }
}

/// An ordered, validated collection of variables describing a dataset.
///
/// Construction rejects duplicate names and duplicate column indices, since
/// the evaluator must never be handed an ambiguous schema. A whole-word
/// matcher per variable is compiled once here so that per-row substitution
/// does not recompile regular expressions.
#[derive(Debug, Clone)]
pub struct Schema {
    variables: Vec<Variable>,
    matchers: Vec<Regex>,
}

impl Schema {
    pub fn new(variables: Vec<Variable>) -> Result<Self> {
        let mut names: HashSet<&str, NameHasher> = HashSet::default();
        let mut columns: HashSet<usize> = HashSet::new();
        for variable in &variables {
            if variable.name.is_empty() {
                return Err(EngineError::Schema(String::from(
                    "variable names may not be empty",
                )));
            }
            if !names.insert(&variable.name) {
                return Err(EngineError::Schema(format!(
                    "duplicate variable name: {}",
                    variable.name
                )));
            }
            if !columns.insert(variable.column_index) {
                return Err(EngineError::Schema(format!(
                    "duplicate column index: {}",
                    variable.column_index
                )));
            }
        }
        let mut matchers = Vec::with_capacity(variables.len());
        for variable in &variables {
            // whole-word matching keeps `age` from matching inside `average`
            let pattern = format!(r"\b{}\b", regex::escape(&variable.name));
            let matcher = Regex::new(&pattern)
                .map_err(|e| EngineError::Schema(format!("unusable variable name: {e}")))?;
            matchers.push(matcher);
        }
        Ok(Self {
            variables,
            matchers,
        })
    }

    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    pub fn variable(&self, name: &str) -> Option<&Variable> {
        self.variables.iter().find(|v| v.name == name)
    }

    /// The precompiled whole-word matcher for each variable, aligned with
    /// `variables()`.
    pub(crate) fn matchers(&self) -> &[Regex] {
        &self.matchers
    }

    /// Build the name→value view of one row. A column index beyond the end
    /// of the row resolves to the missing sentinel rather than failing,
    /// since a short row and a missing cell are indistinguishable to the
    /// condition language.
    pub fn value_map<'a>(&'a self, row: &'a [Value]) -> ValueMap<'a> {
        let mut map: ValueMap<'a> = HashMap::default();
        for variable in &self.variables {
            let value = row.get(variable.column_index).unwrap_or(&Value::Missing);
            map.insert(variable.name.as_str(), value);
        }
        map
    }
}
