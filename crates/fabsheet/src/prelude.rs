//! Prelude module - common imports for fabsheet users
//!
//! ```rust
//! use fabsheet::prelude::*;
//! ```

pub use crate::{
    // Formula functions
    check_formula,
    evaluate,
    parse_formula,
    // Validation
    validate_entry,
    // Grid definition types
    Column,
    ColumnId,
    CompanyId,
    DataType,
    DiscountType,
    // Error types
    Error,
    ExtraField,
    ExtraFieldId,
    ExtraFieldSection,
    ExtraFieldType,
    ExtraValueMap,
    // Rollup types
    FinalCalculation,
    FormulaError,
    InstanceState,
    IssueKind,
    IssueTarget,
    Money,
    OrderAdjustments,
    OrderHeader,
    OrderId,
    // Recalculation engine
    OrderRecalcExt,
    // Main types
    OrderSnapshot,
    OrderTemplateEntry,
    OrderTemplateId,
    ParsedFormula,
    RecalcStats,
    Result,
    Row,
    RowId,
    RowType,
    Template,
    TemplateId,
    TemplateRollup,
    TemplateSummary,
    ValidationIssue,
    ValueMap,
};
