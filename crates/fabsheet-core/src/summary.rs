//! Per-template summary and discount application

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::money::{lossy_decimal, DiscountType, Money};

/// Totals block of one template instance.
///
/// `total` is computed by the service from the grid; the client carries it,
/// derives `discount_amount` and `final_payable_amount` from it and the
/// discount inputs, and ships all of them back on save.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateSummary {
    #[serde(default)]
    pub total: Money,
    /// Raw discount input; its meaning depends on `discount_type`.
    #[serde(default, with = "lossy_decimal")]
    pub discount: Decimal,
    #[serde(default)]
    pub discount_type: DiscountType,
    #[serde(default)]
    pub discount_amount: Money,
    #[serde(default)]
    pub final_payable_amount: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl TemplateSummary {
    /// Summary for a known total with no discount applied.
    pub fn with_total(total: Money) -> Self {
        let mut summary = Self {
            total,
            ..Self::default()
        };
        summary.refresh();
        summary
    }

    /// The discount amount the current inputs produce.
    ///
    /// PERCENT: `total * discount / 100`. AMOUNT: `discount` as-is.
    pub fn computed_discount_amount(&self) -> Money {
        self.discount_type.amount_of(self.total, self.discount)
    }

    /// `total - discountAmount`, floored at zero.
    pub fn computed_final_payable(&self) -> Money {
        self.total.saturating_sub(self.computed_discount_amount())
    }

    /// Recompute the derived fields from `total` and the discount inputs.
    pub fn refresh(&mut self) {
        self.discount_amount = self.computed_discount_amount();
        self.final_payable_amount = self.computed_final_payable();
    }

    /// Change the discount inputs and refresh the derived fields.
    pub fn set_discount(&mut self, discount: Decimal, discount_type: DiscountType) {
        self.discount = discount;
        self.discount_type = discount_type;
        self.refresh();
    }

    /// Replace the grid total and refresh the derived fields.
    pub fn set_total(&mut self, total: Money) {
        self.total = total;
        self.refresh();
    }
}
