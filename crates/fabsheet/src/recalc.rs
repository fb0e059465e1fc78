//! Order recalculation engine
//!
//! Re-evaluates every FORMULA column of every entry in an order snapshot,
//! fills TOTAL-row figures and refreshes summary payables. This is the
//! client-side mirror of the service's own recalculation; running it never
//! fails, bad formulas degrade cell by cell.
//!
//! # Example
//!
//! ```rust,ignore
//! use fabsheet::prelude::*;
//!
//! let mut snapshot: OrderSnapshot = serde_json::from_str(&body)?;
//! let stats = snapshot.recalculate();
//! println!("evaluated {} cells", stats.cells_evaluated);
//! ```

use std::collections::HashMap;

use fabsheet_core::{
    parse_loose_number, Column, OrderSnapshot, OrderTemplateEntry, Row, Template, TemplateId,
    ValueMap,
};
use fabsheet_formula::{evaluate_value, format_number, parse_formula, ParsedFormula, NO_VALUE};

/// Statistics from a recalculation run
#[derive(Debug, Clone, Default)]
pub struct RecalcStats {
    /// FORMULA columns across the templates entries reference
    pub formula_columns: usize,
    /// NORMAL-row formula cells written
    pub cells_evaluated: usize,
    /// Formula texts that failed to parse
    pub parse_failures: usize,
    /// TOTAL-row cells written
    pub totals_filled: usize,
    /// Entry summaries whose derived fields were recomputed
    pub summaries_refreshed: usize,
}

/// Extension trait for [`OrderSnapshot`] to add recalculation
pub trait OrderRecalcExt {
    /// Recompute every entry's formula cells, TOTAL-row figures and
    /// summary payables from its current raw values.
    fn recalculate(&mut self) -> RecalcStats;
}

impl OrderRecalcExt for OrderSnapshot {
    fn recalculate(&mut self) -> RecalcStats {
        let mut stats = RecalcStats::default();
        let (templates, entries) = self.split_mut();

        // Phase 1: parse each referenced template's formula columns once;
        // a parent and its duplicate child share the parses.
        let mut library: HashMap<&TemplateId, TemplateFormulas<'_>> = HashMap::new();
        for template in templates {
            if entries.iter().any(|e| e.template_id == template.id) {
                library.insert(&template.id, TemplateFormulas::parse(template, &mut stats));
            }
        }

        // Phase 2: walk the entries against their template's parses.
        for entry in entries.iter_mut() {
            if let Some(formulas) = library.get(&entry.template_id) {
                recalculate_entry(formulas, entry, &mut stats);
            } else {
                tracing::warn!(
                    template_id = %entry.template_id,
                    order_template_id = %entry.order_template_id,
                    "entry references an unknown template, grid left as loaded"
                );
            }
            entry.summary.refresh();
            stats.summaries_refreshed += 1;
        }

        stats
    }
}

/// One template's FORMULA columns with their parsed expressions.
struct TemplateFormulas<'a> {
    template: &'a Template,
    parsed: Vec<(&'a Column, Option<ParsedFormula>)>,
}

impl<'a> TemplateFormulas<'a> {
    fn parse(template: &'a Template, stats: &mut RecalcStats) -> Self {
        let mut parsed = Vec::new();
        for column in template.formula_columns() {
            stats.formula_columns += 1;
            let text = column.formula.as_deref().unwrap_or("");
            let formula = parse_formula(text);
            if formula.is_none() && !text.trim().is_empty() {
                stats.parse_failures += 1;
                tracing::warn!(
                    template_id = %template.id,
                    column_key = %column.key,
                    "formula failed to parse, its cells degrade to the no-value sentinel"
                );
            }
            parsed.push((column, formula));
        }
        Self { template, parsed }
    }
}

fn recalculate_entry(
    formulas: &TemplateFormulas<'_>,
    entry: &mut OrderTemplateEntry,
    stats: &mut RecalcStats,
) {
    let template = formulas.template;
    entry.calculated_values.clear();

    // NORMAL rows: evaluate every formula column; accumulate the per-column
    // sums the TOTAL rows will display. A slot stays `None` only when the
    // formula itself never parsed.
    let mut formula_sums: Vec<Option<f64>> = formulas
        .parsed
        .iter()
        .map(|(_, formula)| formula.as_ref().map(|_| 0.0))
        .collect();
    for row in template.normal_rows() {
        let raw = row_values(template, &entry.values, row);
        for (slot, (column, formula)) in formula_sums.iter_mut().zip(&formulas.parsed) {
            let value = evaluate_value(formula.as_ref(), &template.columns, &raw);
            let shown = match value {
                Some(n) => format_number(n),
                None => NO_VALUE.to_string(),
            };
            entry
                .calculated_values
                .set(row.id.clone(), column.id.clone(), shown);
            stats.cells_evaluated += 1;
            if let Some(sum) = slot {
                *sum += value.unwrap_or(0.0);
            }
        }
    }

    // TOTAL rows: per NUMBER column the sum of the tolerantly parsed
    // NORMAL-row values, per FORMULA column the summed evaluation results.
    // TEXT and DATE columns stay blank.
    for total_row in template.total_rows() {
        for column in template.columns.iter().filter(|c| c.is_numeric()) {
            let sum: f64 = template
                .normal_rows()
                .filter_map(|row| entry.values.get(&row.id, &column.id))
                .filter_map(parse_loose_number)
                .sum();
            entry
                .calculated_values
                .set(total_row.id.clone(), column.id.clone(), format_number(sum));
            stats.totals_filled += 1;
        }
        for ((column, _), sum) in formulas.parsed.iter().zip(&formula_sums) {
            let figure = match sum {
                Some(n) => format_number(*n),
                None => NO_VALUE.to_string(),
            };
            entry
                .calculated_values
                .set(total_row.id.clone(), column.id.clone(), figure);
            stats.totals_filled += 1;
        }
    }
}

/// Raw values of one row keyed by column key, the shape the evaluator reads.
fn row_values(template: &Template, values: &ValueMap, row: &Row) -> HashMap<String, String> {
    let mut raw = HashMap::new();
    for column in template.columns.iter().filter(|c| !c.is_formula()) {
        if let Some(value) = values.get(&row.id, &column.id) {
            raw.insert(column.key.clone(), value.to_string());
        }
    }
    raw
}

#[cfg(test)]
mod tests {
    use super::*;
    use fabsheet_core::{
        ColumnId, DataType, DiscountType, Money, OrderHeader, RowId, RowType, TemplateSummary,
    };
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;

    fn template() -> Template {
        let mut t = Template::new("tpl-1", "Wardrobe");
        let mut total = Column::new("c-line", "line_total", DataType::Formula);
        total.formula = Some("qty * unit_price".to_string());
        t.columns = vec![
            Column::new("c-qty", "qty", DataType::Number),
            Column::new("c-price", "unit_price", DataType::Number),
            Column::new("c-note", "note", DataType::Text),
            total,
        ];
        let mut sum = Row::new("r-sum", "Total");
        sum.row_type = RowType::Total;
        sum.order_no = 2;
        let mut b = Row::new("r-b", "Item B");
        b.order_no = 1;
        t.rows = vec![Row::new("r-a", "Item A"), b, sum];
        t
    }

    fn snapshot() -> OrderSnapshot {
        let mut snap = OrderSnapshot::new(OrderHeader::new("ord-1", "co-1", "Refit"));
        snap.add_template(template());
        snap
    }

    fn filled_entry() -> OrderTemplateEntry {
        let mut entry = OrderTemplateEntry::synthesize(TemplateId::new("tpl-1"));
        entry.values.set(RowId::new("r-a"), ColumnId::new("c-qty"), "2");
        entry
            .values
            .set(RowId::new("r-a"), ColumnId::new("c-price"), "10.50");
        entry.values.set(RowId::new("r-b"), ColumnId::new("c-qty"), "3");
        entry
            .values
            .set(RowId::new("r-b"), ColumnId::new("c-price"), "4");
        entry
            .values
            .set(RowId::new("r-a"), ColumnId::new("c-note"), "oak front");
        entry
    }

    fn cell<'a>(entry: &'a OrderTemplateEntry, row: &str, column: &str) -> Option<&'a str> {
        entry
            .calculated_values
            .get(&RowId::new(row), &ColumnId::new(column))
    }

    #[test]
    fn test_formula_cells_land_in_calculated_values() {
        let mut snap = snapshot();
        snap.add_entry(filled_entry()).unwrap();

        let stats = snap.recalculate();

        let entry = &snap.entries()[0];
        assert_eq!(cell(entry, "r-a", "c-line"), Some("21"));
        assert_eq!(cell(entry, "r-b", "c-line"), Some("12"));
        assert_eq!(stats.formula_columns, 1);
        assert_eq!(stats.cells_evaluated, 2);
        assert_eq!(stats.parse_failures, 0);
    }

    #[test]
    fn test_total_row_sums_numbers_and_formula_results() {
        let mut snap = snapshot();
        snap.add_entry(filled_entry()).unwrap();

        let stats = snap.recalculate();

        let entry = &snap.entries()[0];
        assert_eq!(cell(entry, "r-sum", "c-qty"), Some("5"));
        assert_eq!(cell(entry, "r-sum", "c-price"), Some("14.50"));
        assert_eq!(cell(entry, "r-sum", "c-line"), Some("33"));
        // TEXT columns get no TOTAL figure.
        assert_eq!(cell(entry, "r-sum", "c-note"), None);
        assert_eq!(stats.totals_filled, 3);
    }

    #[test]
    fn test_shared_template_parses_once() {
        let mut snap = snapshot();
        let mut parent = filled_entry();
        parent.is_persisted = true;
        snap.add_entry(parent).unwrap();
        snap.duplicate_entry(&TemplateId::new("tpl-1")).unwrap();

        let stats = snap.recalculate();

        assert_eq!(stats.formula_columns, 1);
        assert_eq!(stats.cells_evaluated, 4);
        assert_eq!(stats.summaries_refreshed, 2);
        // The child copied the parent's raw values, so its figures match.
        let child = snap.entries().iter().find(|e| e.is_child).unwrap();
        assert_eq!(cell(child, "r-sum", "c-line"), Some("33"));
    }

    #[test]
    fn test_malformed_formula_degrades_to_the_sentinel() {
        let mut snap = snapshot();
        let mut t = template();
        t.columns[3].formula = Some("qty * * unit_price".to_string());
        snap.add_template(t);
        snap.add_entry(filled_entry()).unwrap();

        let stats = snap.recalculate();

        let entry = &snap.entries()[0];
        assert_eq!(cell(entry, "r-a", "c-line"), Some(NO_VALUE));
        assert_eq!(cell(entry, "r-sum", "c-line"), Some(NO_VALUE));
        // NUMBER totals still fill.
        assert_eq!(cell(entry, "r-sum", "c-qty"), Some("5"));
        assert_eq!(stats.parse_failures, 1);
    }

    #[test]
    fn test_summaries_refresh_from_their_totals() {
        let mut snap = snapshot();
        let mut entry = filled_entry();
        entry.summary = TemplateSummary {
            total: Money::parse("200").unwrap(),
            discount: Decimal::from(10),
            discount_type: DiscountType::Percent,
            ..TemplateSummary::default()
        };
        snap.add_entry(entry).unwrap();

        let stats = snap.recalculate();

        let summary = &snap.entries()[0].summary;
        assert_eq!(summary.discount_amount, Money::parse("20").unwrap());
        assert_eq!(summary.final_payable_amount, Money::parse("180").unwrap());
        assert_eq!(stats.summaries_refreshed, 1);
    }

    #[test]
    fn test_unknown_template_keeps_the_entry() {
        let mut snap = snapshot();
        let mut entry = OrderTemplateEntry::synthesize(TemplateId::new("tpl-ghost"));
        entry.summary = TemplateSummary::with_total(Money::parse("40").unwrap());
        snap.add_entry(entry).unwrap();

        let stats = snap.recalculate();

        assert_eq!(stats.cells_evaluated, 0);
        assert_eq!(stats.summaries_refreshed, 1);
        assert_eq!(
            snap.entries()[0].summary.final_payable_amount,
            Money::parse("40").unwrap()
        );
    }

    #[test]
    fn test_stale_calculated_values_are_cleared() {
        let mut snap = snapshot();
        let mut entry = filled_entry();
        entry
            .calculated_values
            .set(RowId::new("r-a"), ColumnId::new("c-ghost"), "999");
        snap.add_entry(entry).unwrap();

        snap.recalculate();

        assert_eq!(cell(&snap.entries()[0], "r-a", "c-ghost"), None);
    }

    #[test]
    fn test_empty_grid_totals_to_zero() {
        let mut snap = snapshot();
        snap.add_entry(OrderTemplateEntry::synthesize(TemplateId::new("tpl-1")))
            .unwrap();

        snap.recalculate();

        let entry = &snap.entries()[0];
        assert_eq!(cell(entry, "r-sum", "c-qty"), Some("0"));
        assert_eq!(cell(entry, "r-sum", "c-line"), Some("0"));
        assert_eq!(cell(entry, "r-a", "c-line"), Some("0"));
    }
}
