//! Formula syntax types

use std::fmt;

/// One step of a formula: a reference to a column by its key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub column_key: String,
}

impl Step {
    pub fn new(column_key: impl Into<String>) -> Self {
        Self {
            column_key: column_key.into(),
        }
    }
}

/// Binary operators, applied strictly left to right (no precedence).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    Power,
}

impl Operator {
    /// The source character for this operator.
    pub fn symbol(self) -> char {
        match self {
            Operator::Add => '+',
            Operator::Subtract => '-',
            Operator::Multiply => '*',
            Operator::Divide => '/',
            Operator::Modulo => '%',
            Operator::Power => '^',
        }
    }

    pub fn from_char(c: char) -> Option<Self> {
        Some(match c {
            '+' => Operator::Add,
            '-' => Operator::Subtract,
            '*' => Operator::Multiply,
            '/' => Operator::Divide,
            '%' => Operator::Modulo,
            '^' => Operator::Power,
            _ => return None,
        })
    }
}

/// Direction of a percentage or fixed adjustment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Sign {
    #[default]
    Plus,
    Minus,
}

impl Sign {
    /// Apply an adjustment to the running result in this direction.
    pub fn apply(self, base: f64, adjustment: f64) -> f64 {
        match self {
            Sign::Plus => base + adjustment,
            Sign::Minus => base - adjustment,
        }
    }
}

/// Post-processing applied to the step result, in declared order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Modifier {
    /// Adjust by a percentage of the running result.
    Percentage { sign: Sign, value: f64 },
    /// Adjust by a fixed amount.
    Fixed { sign: Sign, value: f64 },
    /// Round to this many decimal places.
    Round { places: i32 },
    Abs,
    Ceil,
    Floor,
    /// Lower clamp despite the name: `min:10` keeps the result at or
    /// above 10.
    Min { value: f64 },
    /// Upper clamp despite the name: `max:10` caps the result at 10.
    Max { value: f64 },
}

impl fmt::Display for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Modifier::Percentage { sign: Sign::Plus, value } => write!(f, "percentage:{value}"),
            Modifier::Percentage { sign: Sign::Minus, value } => write!(f, "percentage:-{value}"),
            Modifier::Fixed { sign: Sign::Plus, value } => write!(f, "fixed:{value}"),
            Modifier::Fixed { sign: Sign::Minus, value } => write!(f, "fixed:-{value}"),
            Modifier::Round { places } => write!(f, "round:{places}"),
            Modifier::Abs => f.write_str("abs"),
            Modifier::Ceil => f.write_str("ceil"),
            Modifier::Floor => f.write_str("floor"),
            Modifier::Min { value } => write!(f, "min:{value}"),
            Modifier::Max { value } => write!(f, "max:{value}"),
        }
    }
}

/// A parsed column formula: key steps joined by left-to-right operators,
/// then modifiers.
///
/// Well-formed formulas satisfy `operators.len() + 1 == steps.len()`; the
/// evaluator tolerates anything else by pairing operators with steps until
/// one side runs out.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedFormula {
    pub steps: Vec<Step>,
    pub operators: Vec<Operator>,
    pub modifiers: Vec<Modifier>,
}

impl ParsedFormula {
    /// True when there is nothing to evaluate.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl fmt::Display for ParsedFormula {
    /// Canonical text form, reparseable by the parser.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, step) in self.steps.iter().enumerate() {
            if i > 0 {
                match self.operators.get(i - 1) {
                    Some(op) => write!(f, " {} ", op.symbol())?,
                    None => f.write_str(" ")?,
                }
            }
            f.write_str(&step.column_key)?;
        }
        for modifier in &self.modifiers {
            write!(f, " | {modifier}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_display_prints_canonical_text() {
        let formula = ParsedFormula {
            steps: vec![Step::new("a"), Step::new("b"), Step::new("c")],
            operators: vec![Operator::Add, Operator::Multiply],
            modifiers: vec![
                Modifier::Percentage {
                    sign: Sign::Minus,
                    value: 10.0,
                },
                Modifier::Round { places: 2 },
                Modifier::Abs,
            ],
        };
        assert_eq!(formula.to_string(), "a + b * c | percentage:-10 | round:2 | abs");
    }

    #[test]
    fn test_operator_symbols_round_trip() {
        for op in [
            Operator::Add,
            Operator::Subtract,
            Operator::Multiply,
            Operator::Divide,
            Operator::Modulo,
            Operator::Power,
        ] {
            assert_eq!(Operator::from_char(op.symbol()), Some(op));
        }
        assert_eq!(Operator::from_char('&'), None);
    }

    #[test]
    fn test_sign_applies_adjustments_directionally() {
        assert_eq!(Sign::Plus.apply(100.0, 5.0), 105.0);
        assert_eq!(Sign::Minus.apply(100.0, 5.0), 95.0);
    }
}
