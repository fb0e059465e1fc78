//! Tests for order recalculation over snapshots in the service wire shape

use fabsheet::prelude::*;
use pretty_assertions::assert_eq;

fn load_snapshot() -> OrderSnapshot {
    let json = r#"{
        "order": {
            "id": "ord-77",
            "companyId": "co-9",
            "name": "Showroom refit",
            "finalCalculation": {
                "discount": 10,
                "discountType": "PERCENT",
                "marginDiscount": 18,
                "marginType": "AMOUNT"
            }
        },
        "templates": [
            {
                "id": "tpl-wardrobe",
                "name": "Wardrobe",
                "columns": [
                    {"id": "c-qty", "key": "qty", "label": "Qty", "dataType": "NUMBER", "isRequired": true},
                    {"id": "c-price", "key": "unit_price", "label": "Unit price", "dataType": "NUMBER"},
                    {"id": "c-line", "key": "line_total", "label": "Line total", "dataType": "FORMULA", "formula": "qty * unit_price"},
                    {"id": "c-note", "key": "note", "label": "Note", "dataType": "TEXT"}
                ],
                "rows": [
                    {"id": "r-doors", "label": "Doors", "orderNo": 0},
                    {"id": "r-frames", "label": "Frames", "orderNo": 1},
                    {"id": "r-sum", "label": "Total", "rowType": "TOTAL", "orderNo": 2}
                ]
            }
        ],
        "entries": [
            {
                "orderTemplateId": "ote-parent",
                "templateId": "tpl-wardrobe",
                "values": {
                    "r-doors": {"c-qty": "2", "c-price": "10.50"},
                    "r-frames": {"c-qty": "3", "c-price": "4"}
                },
                "summary": {"total": "200.00", "discount": 10, "discountType": "PERCENT"}
            },
            {
                "orderTemplateId": "ote-child",
                "templateId": "tpl-wardrobe",
                "parentOrderTemplateId": "ote-parent",
                "isChild": true,
                "values": {
                    "r-doors": {"c-qty": "1", "c-price": "10.50"}
                },
                "summary": {"total": "60.00"}
            }
        ]
    }"#;
    serde_json::from_str(json).unwrap()
}

fn cell<'a>(entry: &'a OrderTemplateEntry, row: &str, column: &str) -> Option<&'a str> {
    entry
        .calculated_values
        .get(&RowId::new(row), &ColumnId::new(column))
}

/// Test that one pass fills formula cells, TOTAL rows and summary payables
/// for every entry, parent and child alike.
#[test]
fn test_recalculation_fills_grid_and_summaries() {
    let mut snapshot = load_snapshot();

    let stats = snapshot.recalculate();
    assert_eq!(stats.formula_columns, 1);
    assert_eq!(stats.cells_evaluated, 4);
    assert_eq!(stats.parse_failures, 0);
    assert_eq!(stats.totals_filled, 6);
    assert_eq!(stats.summaries_refreshed, 2);

    let parent = snapshot.entry(&OrderTemplateId::new("ote-parent")).unwrap();
    assert_eq!(cell(parent, "r-doors", "c-line"), Some("21"));
    assert_eq!(cell(parent, "r-frames", "c-line"), Some("12"));
    assert_eq!(cell(parent, "r-sum", "c-qty"), Some("5"));
    assert_eq!(cell(parent, "r-sum", "c-price"), Some("14.50"));
    assert_eq!(cell(parent, "r-sum", "c-line"), Some("33"));
    assert_eq!(cell(parent, "r-sum", "c-note"), None);
    assert_eq!(parent.summary.discount_amount.to_string(), "20.00");
    assert_eq!(parent.summary.final_payable_amount.to_string(), "180.00");

    let child = snapshot.entry(&OrderTemplateId::new("ote-child")).unwrap();
    assert_eq!(cell(child, "r-doors", "c-line"), Some("10.50"));
    assert_eq!(cell(child, "r-frames", "c-line"), Some("0"));
    assert_eq!(cell(child, "r-sum", "c-line"), Some("10.50"));
    assert_eq!(child.summary.final_payable_amount.to_string(), "60.00");
}

/// Test that recalculating an already recalculated snapshot changes
/// nothing.
#[test]
fn test_recalculation_is_idempotent() {
    let mut snapshot = load_snapshot();
    snapshot.recalculate();
    let first = snapshot.clone();

    snapshot.recalculate();
    assert_eq!(snapshot, first);
}

/// Test that an edit flows through recalculation into the dependent
/// formula and TOTAL cells.
#[test]
fn test_fresh_edit_flows_into_dependent_cells() {
    let mut snapshot = load_snapshot();
    snapshot.recalculate();

    snapshot
        .set_value(
            &OrderTemplateId::new("ote-parent"),
            &RowId::new("r-doors"),
            &ColumnId::new("c-qty"),
            "10",
        )
        .unwrap();
    snapshot.recalculate();

    let parent = snapshot.entry(&OrderTemplateId::new("ote-parent")).unwrap();
    assert_eq!(cell(parent, "r-doors", "c-line"), Some("105"));
    assert_eq!(cell(parent, "r-sum", "c-line"), Some("117"));
    assert_eq!(cell(parent, "r-sum", "c-qty"), Some("13"));
}

/// Test that the final calculation built on recalculated payables follows
/// the discount-then-margin cascade and keeps child totals separate.
#[test]
fn test_final_calculation_follows_recalculated_payables() {
    let mut snapshot = load_snapshot();
    snapshot.recalculate();

    let calc = FinalCalculation::compute(&snapshot);
    assert_eq!(calc.rows.len(), 1);
    assert_eq!(calc.rows[0].total.to_string(), "180.00");
    assert_eq!(calc.rows[0].child_total.map(|m| m.to_string()), Some("60.00".to_string()));
    assert_eq!(calc.total.to_string(), "180.00");
    assert_eq!(calc.discount_amount.to_string(), "18.00");
    assert_eq!(calc.margin_amount.to_string(), "18.00");
    assert_eq!(calc.final_payable_amount.to_string(), "144.00");
}
