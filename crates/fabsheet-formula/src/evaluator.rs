//! Formula evaluator
//!
//! Evaluates a [`ParsedFormula`] against one row of raw column values.
//! This path never fails: missing keys read as zero, zero divisors skip
//! their step, and anything unevaluable collapses to the no-value
//! sentinel.

use std::collections::HashMap;

use fabsheet_core::{parse_loose_number, Column};

use crate::ast::{Modifier, Operator, ParsedFormula};

/// Displayed when a formula produces no value.
pub const NO_VALUE: &str = "—";

/// Evaluate a formula against one row of values, producing display text.
///
/// `row_values` is keyed by column key. Absent or unparsable inputs read
/// as zero; an absent or empty formula yields [`NO_VALUE`].
pub fn evaluate(
    formula: Option<&ParsedFormula>,
    columns: &[Column],
    row_values: &HashMap<String, String>,
) -> String {
    match evaluate_value(formula, columns, row_values) {
        Some(n) => format_number(n),
        None => NO_VALUE.to_string(),
    }
}

/// Evaluate a formula to its numeric result.
///
/// `None` when the formula is absent or empty, or when the arithmetic
/// leaves the finite range.
pub fn evaluate_value(
    formula: Option<&ParsedFormula>,
    columns: &[Column],
    row_values: &HashMap<String, String>,
) -> Option<f64> {
    let formula = formula?;
    let lookup = numeric_lookup(columns, row_values);

    let mut steps = formula.steps.iter();
    let mut result = resolve(&lookup, &steps.next()?.column_key);
    for (op, step) in formula.operators.iter().zip(steps) {
        let rhs = resolve(&lookup, &step.column_key);
        result = apply_operator(result, *op, rhs);
    }

    for modifier in &formula.modifiers {
        result = apply_modifier(result, *modifier);
    }

    result.is_finite().then_some(result)
}

/// Format a numeric result for display: whole numbers print bare,
/// anything else with exactly two decimal places.
pub fn format_number(n: f64) -> String {
    if !n.is_finite() {
        return NO_VALUE.to_string();
    }
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n:.2}")
    }
}

/// Numeric view of a row: every NUMBER column's key mapped to its
/// tolerantly parsed value. Keys of other column types resolve to zero.
fn numeric_lookup<'a>(
    columns: &'a [Column],
    row_values: &HashMap<String, String>,
) -> HashMap<&'a str, f64> {
    let mut lookup = HashMap::new();
    for column in columns.iter().filter(|c| c.is_numeric()) {
        let value = row_values
            .get(&column.key)
            .and_then(|raw| parse_loose_number(raw))
            .unwrap_or(0.0);
        lookup.insert(column.key.as_str(), value);
    }
    lookup
}

fn resolve(lookup: &HashMap<&str, f64>, key: &str) -> f64 {
    lookup.get(key).copied().unwrap_or(0.0)
}

/// Apply one binary operator. Division and modulo by zero skip the step,
/// leaving the running result unchanged.
fn apply_operator(lhs: f64, op: Operator, rhs: f64) -> f64 {
    match op {
        Operator::Add => lhs + rhs,
        Operator::Subtract => lhs - rhs,
        Operator::Multiply => lhs * rhs,
        Operator::Divide => {
            if rhs == 0.0 {
                lhs
            } else {
                lhs / rhs
            }
        }
        Operator::Modulo => {
            if rhs == 0.0 {
                lhs
            } else {
                lhs % rhs
            }
        }
        Operator::Power => lhs.powf(rhs),
    }
}

fn apply_modifier(result: f64, modifier: Modifier) -> f64 {
    match modifier {
        Modifier::Percentage { sign, value } => sign.apply(result, result * value / 100.0),
        Modifier::Fixed { sign, value } => sign.apply(result, value),
        Modifier::Round { places } => round_to(result, places),
        Modifier::Abs => result.abs(),
        Modifier::Ceil => result.ceil(),
        Modifier::Floor => result.floor(),
        // The clamps keep their inverted names: min is a floor, max a cap.
        Modifier::Min { value } => result.max(value),
        Modifier::Max { value } => result.min(value),
    }
}

/// Round to a number of decimal places; negative rounds left of the
/// point. Places are clamped so the scale factor stays finite.
fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10_f64.powi(places.clamp(-12, 12));
    (value * factor).round() / factor
}
