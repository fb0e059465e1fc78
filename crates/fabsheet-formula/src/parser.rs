//! Formula parser
//!
//! Parses column formula text ("qty * unit_price | round:2") into a
//! [`ParsedFormula`]. Two entry points share one grammar: the tolerant
//! [`parse_formula`] used on the evaluation path, and the strict
//! [`check_formula`] used to validate template configuration.

use crate::ast::{Modifier, Operator, ParsedFormula, Sign, Step};
use crate::error::{FormulaError, FormulaResult};

/// Parse a formula, degrading any defect to `None`.
///
/// The evaluation path never fails on bad formula text; a malformed or
/// empty formula simply produces no value.
///
/// # Example
/// ```rust
/// use fabsheet_formula::parse_formula;
///
/// assert!(parse_formula("qty * unit_price | round:2").is_some());
/// assert!(parse_formula("qty * ").is_none());
/// assert!(parse_formula("").is_none());
/// ```
pub fn parse_formula(text: &str) -> Option<ParsedFormula> {
    check_formula(text).ok()
}

/// Parse a formula, reporting the precise defect.
pub fn check_formula(text: &str) -> FormulaResult<ParsedFormula> {
    if text.trim().is_empty() {
        return Err(FormulaError::Empty);
    }

    let mut scanner = Scanner::new(text);
    let (steps, operators) = parse_steps(&mut scanner)?;

    let rest = &text[scanner.pos..];
    let modifiers = match rest.strip_prefix('|') {
        Some(section) => parse_modifiers(section)?,
        None => Vec::new(),
    };

    Ok(ParsedFormula {
        steps,
        operators,
        modifiers,
    })
}

/// Character scanner over the step section
struct Scanner<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Scanner<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn advance(&mut self) {
        if let Some(c) = self.peek() {
            self.pos += c.len_utf8();
        }
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.advance();
        }
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.input.len()
    }
}

/// Scan `key (op key)*`, stopping at the first `|` or end of input.
fn parse_steps(scanner: &mut Scanner<'_>) -> FormulaResult<(Vec<Step>, Vec<Operator>)> {
    let mut steps = Vec::new();
    let mut operators = Vec::new();

    loop {
        scanner.skip_whitespace();
        steps.push(scan_key(scanner)?);

        scanner.skip_whitespace();
        let c = match scanner.peek() {
            None | Some('|') => break,
            Some(c) => c,
        };
        let Some(op) = Operator::from_char(c) else {
            return Err(FormulaError::ExpectedOperator { at: scanner.pos });
        };
        operators.push(op);
        scanner.advance();

        scanner.skip_whitespace();
        if scanner.is_at_end() || scanner.peek() == Some('|') {
            return Err(FormulaError::TrailingOperator);
        }
    }

    Ok((steps, operators))
}

/// Scan one column key: `ALPHA / "_"` then `ALPHA / DIGIT / "_"`.
fn scan_key(scanner: &mut Scanner<'_>) -> FormulaResult<Step> {
    let at = scanner.pos;
    let mut key = String::new();
    while let Some(c) = scanner.peek() {
        let accept = if key.is_empty() {
            c.is_ascii_alphabetic() || c == '_'
        } else {
            c.is_ascii_alphanumeric() || c == '_'
        };
        if !accept {
            break;
        }
        key.push(c);
        scanner.advance();
    }

    if key.is_empty() {
        return match scanner.peek() {
            Some(c) if Operator::from_char(c).is_none() && c != '|' => {
                Err(FormulaError::UnexpectedCharacter { ch: c, at })
            }
            _ => Err(FormulaError::ExpectedColumnKey { at }),
        };
    }
    Ok(Step { column_key: key })
}

/// Parse the `|`-separated modifier section. Every segment, including a
/// blank one left by a dangling `|`, must name a modifier.
fn parse_modifiers(section: &str) -> FormulaResult<Vec<Modifier>> {
    section.split('|').map(parse_modifier).collect()
}

/// Parse one `name` or `name:value` modifier segment.
fn parse_modifier(segment: &str) -> FormulaResult<Modifier> {
    let segment = segment.trim();
    if segment.is_empty() {
        return Err(FormulaError::EmptyModifier);
    }
    let (name, value) = match segment.split_once(':') {
        Some((name, value)) => (name.trim(), Some(value.trim())),
        None => (segment, None),
    };

    match name {
        "percentage" => {
            let (sign, value) = signed_value(name, value)?;
            Ok(Modifier::Percentage { sign, value })
        }
        "fixed" => {
            let (sign, value) = signed_value(name, value)?;
            Ok(Modifier::Fixed { sign, value })
        }
        "round" => {
            let places = required_int(name, value)?;
            Ok(Modifier::Round { places })
        }
        "min" => {
            let value = required_value(name, value)?;
            Ok(Modifier::Min { value })
        }
        "max" => {
            let value = required_value(name, value)?;
            Ok(Modifier::Max { value })
        }
        "abs" | "ceil" | "floor" => {
            if value.is_some() {
                return Err(FormulaError::UnexpectedModifierValue(name.to_string()));
            }
            Ok(match name {
                "abs" => Modifier::Abs,
                "ceil" => Modifier::Ceil,
                _ => Modifier::Floor,
            })
        }
        other => Err(FormulaError::UnknownModifier(other.to_string())),
    }
}

fn required_value(name: &str, value: Option<&str>) -> FormulaResult<f64> {
    let raw = value.ok_or_else(|| FormulaError::MissingModifierValue(name.to_string()))?;
    if raw.is_empty() {
        return Err(FormulaError::MissingModifierValue(name.to_string()));
    }
    raw.parse::<f64>()
        .map_err(|_| FormulaError::InvalidNumber(raw.to_string()))
}

fn required_int(name: &str, value: Option<&str>) -> FormulaResult<i32> {
    let raw = value.ok_or_else(|| FormulaError::MissingModifierValue(name.to_string()))?;
    if raw.is_empty() {
        return Err(FormulaError::MissingModifierValue(name.to_string()));
    }
    raw.parse::<i32>()
        .map_err(|_| FormulaError::InvalidNumber(raw.to_string()))
}

/// Parse `[sign] number`, defaulting to plus.
fn signed_value(name: &str, value: Option<&str>) -> FormulaResult<(Sign, f64)> {
    let raw = value.ok_or_else(|| FormulaError::MissingModifierValue(name.to_string()))?;
    let (sign, rest) = match raw.strip_prefix('-') {
        Some(rest) => (Sign::Minus, rest),
        None => (Sign::Plus, raw.strip_prefix('+').unwrap_or(raw)),
    };
    let rest = rest.trim();
    if rest.is_empty() {
        return Err(FormulaError::MissingModifierValue(name.to_string()));
    }
    rest.parse::<f64>()
        .map(|v| (sign, v))
        .map_err(|_| FormulaError::InvalidNumber(rest.to_string()))
}
