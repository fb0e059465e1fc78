//! Pre-save validation of entry values
//!
//! Issues collected here never abort computation; they block submission
//! until the user fixes them, and every one is recoverable.

use std::fmt;

use serde::Serialize;

use crate::id::{ColumnId, ExtraFieldId, RowId};
use crate::order::OrderTemplateEntry;
use crate::template::Template;
use crate::values::parse_loose_number;

/// Where a validation issue points.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum IssueTarget {
    #[serde(rename_all = "camelCase")]
    Cell { row_id: RowId, column_id: ColumnId },
    #[serde(rename_all = "camelCase")]
    ExtraField { field_id: ExtraFieldId },
}

/// What is wrong with the value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IssueKind {
    /// Required and empty.
    Required,
    /// NUMBER-typed and not readable as a number.
    NotNumeric,
}

/// One problem found before save.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationIssue {
    pub target: IssueTarget,
    /// Human label of the offending cell or field.
    pub label: String,
    pub kind: IssueKind,
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            IssueKind::Required => write!(f, "{} is required", self.label),
            IssueKind::NotNumeric => write!(f, "{} must be a number", self.label),
        }
    }
}

/// Check an entry's grid and extra values against its template.
///
/// NORMAL rows only; FORMULA columns are derived and never validated.
pub fn validate_entry(template: &Template, entry: &OrderTemplateEntry) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    for row in template.normal_rows() {
        for column in &template.columns {
            if column.is_formula() {
                continue;
            }
            let raw = entry.values.get(&row.id, &column.id).unwrap_or("");
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                if column.is_required {
                    issues.push(ValidationIssue {
                        target: IssueTarget::Cell {
                            row_id: row.id.clone(),
                            column_id: column.id.clone(),
                        },
                        label: format!("{} / {}", row.label, column.label),
                        kind: IssueKind::Required,
                    });
                }
                continue;
            }
            if column.is_numeric() && parse_loose_number(trimmed).is_none() {
                issues.push(ValidationIssue {
                    target: IssueTarget::Cell {
                        row_id: row.id.clone(),
                        column_id: column.id.clone(),
                    },
                    label: format!("{} / {}", row.label, column.label),
                    kind: IssueKind::NotNumeric,
                });
            }
        }
    }

    for field in &template.extra_fields {
        let raw = entry.extra_values.get(&field.id).unwrap_or("");
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            if field.is_required {
                issues.push(ValidationIssue {
                    target: IssueTarget::ExtraField {
                        field_id: field.id.clone(),
                    },
                    label: field.label.clone(),
                    kind: IssueKind::Required,
                });
            }
            continue;
        }
        if field.is_numeric() && parse_loose_number(trimmed).is_none() {
            issues.push(ValidationIssue {
                target: IssueTarget::ExtraField {
                    field_id: field.id.clone(),
                },
                label: field.label.clone(),
                kind: IssueKind::NotNumeric,
            });
        }
    }

    issues
}
