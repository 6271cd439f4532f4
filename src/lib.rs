//! Casewise – a case-selection engine for tabular, statistics-style data.
//!
//! Casewise centers on the *selection* concept: given a dataset (ordered
//! rows of scalar cells) and a variable schema (name, column index, type,
//! measurement level per column), produce the set of row indices — the
//! *cases* — satisfying a chosen strategy:
//!
//! * a **condition expression** in a small mini-language
//!   (`age > 25 & gender == "M"`, with a catalog of math/statistical/text
//!   functions such as `SQRT`, `MEAN`, `CONCAT`, `IF`),
//! * a **random sample** (approximate percentage, or an exact count drawn
//!   from the first N cases),
//! * a **case range** (1-based inclusive bounds),
//! * an existing **filter variable** (truthy cells mark selected cases).
//!
//! ## Modules
//! * [`schema`] – [`schema::Variable`] and the validated [`schema::Schema`].
//! * [`datatype`] – the [`datatype::Value`] cell type (number, text,
//!   boolean, missing).
//! * [`condition`] – the [`condition::Evaluator`]: substitution passes plus
//!   a pest-parsed literal expression language. Grammar details live in
//!   `condition.pest`.
//! * [`functions`] – the fixed function catalog invoked during expression
//!   preprocessing.
//! * [`select`] – the four selection strategies and the 0/1 filter-column
//!   contract consumed by downstream materializers.
//! * [`error`] – [`error::EngineError`] and the crate [`error::Result`].
//!
//! ## Failure semantics
//! The engine is deliberately non-fatal. A malformed expression or a math
//! domain error makes the affected row evaluate to `false`; configuration
//! problems yield an empty selection and a log line. Turning an empty
//! selection into a user-facing message is the caller's job.
//!
//! ## Quick Start
//! ```
//! use casewise::schema::{Measure, Schema, Variable, VariableType};
//! use casewise::datatype::Value;
//! use casewise::select::select_by_condition;
//!
//! let schema = Schema::new(vec![
//!     Variable::new("age", 0, VariableType::Numeric, Measure::Scale),
//!     Variable::new("gender", 1, VariableType::Text, Measure::Nominal),
//! ])
//! .unwrap();
//! let dataset = vec![
//!     vec![Value::Number(30.0), Value::from("M")],
//!     vec![Value::Number(20.0), Value::from("F")],
//!     vec![Value::Number(41.0), Value::from("M")],
//! ];
//! let selected = select_by_condition(&dataset, &schema, "age > 25 & gender == \"M\"");
//! assert_eq!(selected, vec![0, 2]);
//! ```
//!
//! ## Status
//! The mini-language is intentionally flat: function calls cannot nest
//! inside other calls' arguments. Whether nesting should be supported is a
//! product decision that has not been taken; the current behavior (the
//! outer call fails, the row evaluates false) is documented and tested.

pub mod condition;
pub mod datatype;
pub mod error;
pub mod functions;
pub mod schema;
pub mod select;
