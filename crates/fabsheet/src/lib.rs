//! # fabsheet
//!
//! Client-side library for fabrication order sheets: templated grids with
//! formula columns, per-template discount summaries, duplicate instances
//! and the order-level final calculation.
//!
//! The facade bundles the core model with the formula engine and adds the
//! order recalculation engine. The async remote-service client lives in
//! the separate `fabsheet-client` crate so this one stays synchronous.
//!
//! ## Features
//!
//! - Order snapshots: templates, entries, raw and calculated value maps
//! - Formula mini-language (`qty * unit_price | percentage:-10 | round:2`)
//! - Recalculation of formula cells, TOTAL rows and summary payables
//! - Order-level discount/margin rollup with child totals kept separate
//! - Pre-save validation of required and numeric cells
//!
//! ## Example
//!
//! ```rust
//! use fabsheet::prelude::*;
//!
//! let mut snapshot = OrderSnapshot::new(OrderHeader::new("ord-1", "co-9", "Kitchen refit"));
//!
//! let mut template = Template::new("tpl-cab", "Cabinet");
//! let mut line_total = Column::new("c-total", "line_total", DataType::Formula);
//! line_total.formula = Some("qty * unit_price".to_string());
//! template.columns = vec![
//!     Column::new("c-qty", "qty", DataType::Number),
//!     Column::new("c-price", "unit_price", DataType::Number),
//!     line_total,
//! ];
//! template.rows = vec![Row::new("r-1", "Main")];
//! snapshot.add_template(template);
//!
//! let mut entry = OrderTemplateEntry::synthesize(TemplateId::new("tpl-cab"));
//! entry.values.set(RowId::new("r-1"), ColumnId::new("c-qty"), "4");
//! entry.values.set(RowId::new("r-1"), ColumnId::new("c-price"), "2.55");
//! snapshot.add_entry(entry).unwrap();
//!
//! let stats = snapshot.recalculate();
//! assert_eq!(stats.cells_evaluated, 1);
//!
//! let entry = &snapshot.entries()[0];
//! assert_eq!(
//!     entry
//!         .calculated_values
//!         .get(&RowId::new("r-1"), &ColumnId::new("c-total")),
//!     Some("10.20")
//! );
//! ```

pub mod prelude;
pub mod recalc;

// Re-export recalculation types
pub use recalc::{OrderRecalcExt, RecalcStats};

// Re-export core types
pub use fabsheet_core::{
    parse_loose_number,
    validate_entry,
    Column,
    // Identifier newtypes
    ColumnId,
    CompanyId,
    DataType,
    DiscountType,
    // Error types
    Error,
    // Extra-field types
    ExtraField,
    ExtraFieldId,
    ExtraFieldSection,
    ExtraFieldType,
    ExtraValueMap,
    // Rollup types
    FinalCalculation,
    InstanceState,
    // Validation types
    IssueKind,
    IssueTarget,
    // Money types
    Money,
    OrderAdjustments,
    OrderHeader,
    OrderId,
    // Main types
    OrderSnapshot,
    OrderTemplateEntry,
    OrderTemplateId,
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
    // Constants
    MAX_TEMPLATE_INSTANCES,
    MONEY_SCALE,
};

// Re-export formula types
pub use fabsheet_formula::{
    check_formula, evaluate, evaluate_value, format_number, parse_formula, FormulaError,
    FormulaResult, Modifier, Operator, ParsedFormula, Sign, Step, NO_VALUE,
};
