//! Error types for fabsheet-core

use thiserror::Error;

use crate::id::{ColumnId, ExtraFieldId, OrderTemplateId, RowId, TemplateId};

/// Result type alias using [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in fabsheet-core
#[derive(Debug, Error)]
pub enum Error {
    /// Template definition not found on the order
    #[error("Template not found: {0}")]
    TemplateNotFound(TemplateId),

    /// Order-template entry not found
    #[error("Order template entry not found: {0}")]
    EntryNotFound(OrderTemplateId),

    /// Entry with this key already attached to the order
    #[error("Order template entry already exists: {0}")]
    EntryExists(OrderTemplateId),

    /// Column not found in template
    #[error("Column not found: {0}")]
    ColumnNotFound(ColumnId),

    /// Row not found in template
    #[error("Row not found: {0}")]
    RowNotFound(RowId),

    /// Extra field not found in template
    #[error("Extra field not found: {0}")]
    ExtraFieldNotFound(ExtraFieldId),

    /// Duplicate cap reached for a template
    #[error("Template {0} already has a duplicate; at most 2 instances per order")]
    DuplicateCapReached(TemplateId),

    /// Parent entry must be persisted before it can be duplicated
    #[error("Entry {0} is not saved yet; save it before duplicating")]
    ParentNotPersisted(OrderTemplateId),

    /// Formula columns are derived, never directly editable
    #[error("Column {0} holds a formula and cannot be edited")]
    FormulaColumnNotEditable(ColumnId),
}
