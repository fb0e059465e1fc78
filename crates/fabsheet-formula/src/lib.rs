//! # fabsheet-formula
//!
//! Parser and evaluator for the fabsheet column formula mini-language.
//!
//! A FORMULA column declares an expression over other columns' keys, for
//! example `qty * unit_price | percentage:-10 | round:2`: steps are applied
//! strictly left to right (no precedence), then modifiers in declared
//! order. Evaluation never fails; bad input degrades to zero, skipped
//! steps, or the `—` sentinel.
//!
//! ## Example
//!
//! ```rust
//! use std::collections::HashMap;
//!
//! use fabsheet_core::{Column, DataType};
//! use fabsheet_formula::{evaluate, parse_formula};
//!
//! let columns = vec![
//!     Column::new("c1", "qty", DataType::Number),
//!     Column::new("c2", "unit_price", DataType::Number),
//! ];
//! let mut row = HashMap::new();
//! row.insert("qty".to_string(), "4".to_string());
//! row.insert("unit_price".to_string(), "2.55".to_string());
//!
//! let formula = parse_formula("qty * unit_price");
//! assert_eq!(evaluate(formula.as_ref(), &columns, &row), "10.20");
//! ```

pub mod ast;
pub mod error;
pub mod evaluator;
pub mod parser;

pub use ast::{Modifier, Operator, ParsedFormula, Sign, Step};
pub use error::{FormulaError, FormulaResult};
pub use evaluator::{evaluate, evaluate_value, format_number, NO_VALUE};
pub use parser::{check_formula, parse_formula};
