//! # fabsheet-core
//!
//! Core data model for the fabsheet order/template calculation library.
//!
//! This crate provides the types the rest of fabsheet is built on:
//! - [`Template`], [`Column`], [`Row`], [`ExtraField`] - grid definitions
//! - [`ValueMap`], [`ExtraValueMap`] - raw per-entry values
//! - [`Money`], [`DiscountType`], [`TemplateSummary`] - discount arithmetic
//! - [`OrderSnapshot`], [`OrderTemplateEntry`] - orders, template instances
//!   and the duplicate state machine
//! - [`FinalCalculation`] - the order-level discount/margin rollup
//! - [`validate_entry`] - pre-save validation
//!
//! ## Example
//!
//! ```rust
//! use fabsheet_core::{
//!     DiscountType, Money, OrderHeader, OrderSnapshot, OrderTemplateEntry, Template, TemplateId,
//! };
//! use rust_decimal::Decimal;
//!
//! let mut snapshot = OrderSnapshot::new(OrderHeader::new("ord-1", "co-9", "Kitchen refit"));
//! snapshot.add_template(Template::new("tpl-cab", "Cabinet"));
//!
//! let mut entry = OrderTemplateEntry::synthesize(TemplateId::new("tpl-cab"));
//! entry.summary.set_total(Money::parse("200").unwrap());
//! entry.summary.set_discount(Decimal::from(10), DiscountType::Percent);
//! snapshot.add_entry(entry).unwrap();
//!
//! let payable = snapshot.entries()[0].summary.final_payable_amount;
//! assert_eq!(payable.to_string(), "180.00");
//! ```

pub mod aggregate;
pub mod column;
pub mod error;
pub mod extra;
pub mod id;
pub mod money;
pub mod order;
pub mod row;
pub mod summary;
pub mod template;
pub mod validation;
pub mod values;

// Re-exports for convenience
pub use aggregate::{FinalCalculation, TemplateRollup};
pub use column::{Column, DataType};
pub use error::{Error, Result};
pub use extra::{ExtraField, ExtraFieldSection, ExtraFieldType};
pub use id::{ColumnId, CompanyId, ExtraFieldId, OrderId, OrderTemplateId, RowId, TemplateId};
pub use money::{DiscountType, Money, MONEY_SCALE};
pub use order::{
    InstanceState, OrderAdjustments, OrderHeader, OrderSnapshot, OrderTemplateEntry,
    MAX_TEMPLATE_INSTANCES,
};
pub use row::{Row, RowType};
pub use summary::TemplateSummary;
pub use template::Template;
pub use validation::{validate_entry, IssueKind, IssueTarget, ValidationIssue};
pub use values::{parse_loose_number, ExtraValueMap, ValueMap};
