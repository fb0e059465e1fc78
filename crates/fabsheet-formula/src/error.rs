//! Formula error types

use thiserror::Error;

/// Result type for strict formula checking
pub type FormulaResult<T> = std::result::Result<T, FormulaError>;

/// Defects a strict parse can report.
///
/// The evaluation path never sees these; [`parse_formula`] collapses every
/// defect to `None`. They exist for template configuration checks, where
/// the author wants to know exactly what is wrong with a formula.
///
/// [`parse_formula`]: crate::parse_formula
#[derive(Debug, Error, PartialEq)]
pub enum FormulaError {
    /// Formula text is empty or whitespace
    #[error("Formula is empty")]
    Empty,

    /// A column key was expected
    #[error("Expected a column key at position {at}")]
    ExpectedColumnKey { at: usize },

    /// An operator was expected between steps
    #[error("Expected an operator at position {at}")]
    ExpectedOperator { at: usize },

    /// Formula ends on an operator
    #[error("Formula ends on an operator")]
    TrailingOperator,

    /// A `|` with no modifier after it
    #[error("Expected a modifier after '|'")]
    EmptyModifier,

    /// Modifier name not recognized
    #[error("Unknown modifier: '{0}'")]
    UnknownModifier(String),

    /// Modifier requires a value
    #[error("Modifier '{0}' is missing its value")]
    MissingModifierValue(String),

    /// Modifier takes no value
    #[error("Modifier '{0}' does not take a value")]
    UnexpectedModifierValue(String),

    /// Modifier value is not a number
    #[error("Invalid number: '{0}'")]
    InvalidNumber(String),

    /// Character that fits nowhere in the grammar
    #[error("Unexpected character '{ch}' at position {at}")]
    UnexpectedCharacter { ch: char, at: usize },
}
