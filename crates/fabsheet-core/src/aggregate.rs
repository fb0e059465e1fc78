//! Order-level final calculation

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::id::{OrderTemplateId, TemplateId};
use crate::money::{lossy_decimal, DiscountType, Money};
use crate::order::{OrderAdjustments, OrderSnapshot};

/// One line of the final-calculation table: a template's parent payable
/// plus the summed payables of its duplicate children, kept separate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateRollup {
    pub template_id: TemplateId,
    pub template_name: String,
    pub order_template_id: OrderTemplateId,
    /// The parent entry's final payable amount; zero on a row whose
    /// template only has orphaned children left.
    pub total: Money,
    /// Summed child payables. `None` when the template has no child, which
    /// is not the same as a child totalling zero.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub child_total: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// The order-level rollup combining every template's payable with the
/// order-wide discount and margin adjustments.
///
/// `total` sums parent payables only; child totals stay on their rollup
/// rows and are never merged in. Discount applies to `total`, margin to
/// what the discount leaves, and each stage floors at zero, so
/// `margin_total` always equals `final_payable_amount`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalCalculation {
    pub rows: Vec<TemplateRollup>,
    pub total: Money,
    #[serde(with = "lossy_decimal")]
    pub discount: Decimal,
    pub discount_type: DiscountType,
    pub discount_amount: Money,
    #[serde(with = "lossy_decimal")]
    pub margin_discount: Decimal,
    pub margin_type: DiscountType,
    pub margin_amount: Money,
    pub margin_total: Money,
    pub final_payable_amount: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl FinalCalculation {
    /// Roll up a snapshot using the adjustments saved on the order.
    pub fn compute(snapshot: &OrderSnapshot) -> Self {
        Self::compute_with(snapshot, &snapshot.order().adjustments)
    }

    /// Roll up a snapshot with explicit adjustments, for previewing
    /// not-yet-saved discount/margin edits.
    pub fn compute_with(snapshot: &OrderSnapshot, adjustments: &OrderAdjustments) -> Self {
        let mut rows = Vec::new();
        for parent in snapshot.entries().iter().filter(|e| !e.is_child) {
            let template_name = snapshot
                .template(&parent.template_id)
                .map(|t| t.name.clone())
                .unwrap_or_else(|| parent.template_id.to_string());

            let mut any_child = false;
            let mut child_sum = Money::ZERO;
            for child in snapshot.children_of(&parent.template_id) {
                any_child = true;
                child_sum += child.summary.final_payable_amount;
            }

            rows.push(TemplateRollup {
                template_id: parent.template_id.clone(),
                template_name,
                order_template_id: parent.order_template_id.clone(),
                total: parent.summary.final_payable_amount,
                child_total: any_child.then_some(child_sum),
                notes: parent.summary.notes.clone(),
            });
        }

        // A child whose parent entry is missing still gets a row; its money
        // stays on the child side and never joins `total`.
        for child in snapshot.entries().iter().filter(|e| e.is_child) {
            if snapshot.parent_of(&child.template_id).is_some() {
                continue;
            }
            let payable = child.summary.final_payable_amount;
            if let Some(row) = rows.iter_mut().find(|r| r.template_id == child.template_id) {
                row.child_total = Some(row.child_total.unwrap_or(Money::ZERO) + payable);
            } else {
                let template_name = snapshot
                    .template(&child.template_id)
                    .map(|t| t.name.clone())
                    .unwrap_or_else(|| child.template_id.to_string());
                rows.push(TemplateRollup {
                    template_id: child.template_id.clone(),
                    template_name,
                    order_template_id: child.order_template_id.clone(),
                    total: Money::ZERO,
                    child_total: Some(payable),
                    notes: child.summary.notes.clone(),
                });
            }
        }

        let total: Money = rows.iter().map(|r| r.total).sum();
        let discount_amount = adjustments.discount_type.amount_of(total, adjustments.discount);
        let after_discount = total.saturating_sub(discount_amount);
        let margin_amount = adjustments
            .margin_type
            .amount_of(after_discount, adjustments.margin_discount);
        let margin_total = after_discount.saturating_sub(margin_amount);

        FinalCalculation {
            rows,
            total,
            discount: adjustments.discount,
            discount_type: adjustments.discount_type,
            discount_amount,
            margin_discount: adjustments.margin_discount,
            margin_type: adjustments.margin_type,
            margin_amount,
            margin_total,
            final_payable_amount: margin_total,
            notes: adjustments.notes.clone(),
        }
    }
}
