//! Template definitions

use serde::{Deserialize, Serialize};

use crate::column::Column;
use crate::extra::{ExtraField, ExtraFieldSection};
use crate::id::{ColumnId, ExtraFieldId, RowId, TemplateId};
use crate::row::{Row, RowType};

/// A configurable grid definition (rows by columns, plus extra metadata
/// fields) attached to a product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    pub id: TemplateId,
    pub name: String,
    #[serde(default)]
    pub columns: Vec<Column>,
    #[serde(default)]
    pub rows: Vec<Row>,
    #[serde(default)]
    pub extra_fields: Vec<ExtraField>,
}

impl Template {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: TemplateId::new(id),
            name: name.into(),
            columns: Vec::new(),
            rows: Vec::new(),
            extra_fields: Vec::new(),
        }
    }

    /// Look up a column by id.
    pub fn column(&self, id: &ColumnId) -> Option<&Column> {
        self.columns.iter().find(|c| &c.id == id)
    }

    /// Look up a column by its formula key.
    pub fn column_by_key(&self, key: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.key == key)
    }

    /// Look up a row by id.
    pub fn row(&self, id: &RowId) -> Option<&Row> {
        self.rows.iter().find(|r| &r.id == id)
    }

    /// Rows sorted by display position.
    pub fn ordered_rows(&self) -> Vec<&Row> {
        let mut rows: Vec<&Row> = self.rows.iter().collect();
        rows.sort_by_key(|r| r.order_no);
        rows
    }

    /// NORMAL rows, the ones that feed TOTAL-row sums.
    pub fn normal_rows(&self) -> impl Iterator<Item = &Row> {
        self.rows.iter().filter(|r| r.row_type == RowType::Normal)
    }

    /// TOTAL rows.
    pub fn total_rows(&self) -> impl Iterator<Item = &Row> {
        self.rows.iter().filter(|r| r.row_type == RowType::Total)
    }

    /// Columns of one display block, sorted by position.
    pub fn block_columns(&self, block_index: u32) -> Vec<&Column> {
        let mut cols: Vec<&Column> = self
            .columns
            .iter()
            .filter(|c| c.block_index == block_index)
            .collect();
        cols.sort_by_key(|c| c.order_no);
        cols
    }

    /// FORMULA columns.
    pub fn formula_columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter().filter(|c| c.is_formula())
    }

    /// Look up an extra field by id.
    pub fn extra_field(&self, id: &ExtraFieldId) -> Option<&ExtraField> {
        self.extra_fields.iter().find(|f| &f.id == id)
    }

    /// Extra fields of one section, sorted by position.
    pub fn section_fields(&self, section: ExtraFieldSection) -> Vec<&ExtraField> {
        let mut fields: Vec<&ExtraField> = self
            .extra_fields
            .iter()
            .filter(|f| f.section == section)
            .collect();
        fields.sort_by_key(|f| f.order_no);
        fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::DataType;
    use crate::extra::ExtraFieldType;
    use pretty_assertions::assert_eq;

    fn template() -> Template {
        let mut t = Template::new("tpl-1", "Cabinet");
        let mut qty = Column::new("c-qty", "qty", DataType::Number);
        qty.block_index = 0;
        qty.order_no = 1;
        let mut price = Column::new("c-price", "unit_price", DataType::Number);
        price.block_index = 0;
        price.order_no = 0;
        let mut total = Column::new("c-total", "line_total", DataType::Formula);
        total.formula = Some("qty * unit_price".to_string());
        total.block_index = 1;
        t.columns = vec![qty, price, total];

        let mut sum = Row::new("r-sum", "Total");
        sum.row_type = RowType::Total;
        sum.order_no = 2;
        let mut a = Row::new("r-a", "Item A");
        a.order_no = 0;
        let mut b = Row::new("r-b", "Item B");
        b.order_no = 1;
        t.rows = vec![sum, b, a];

        t.extra_fields = vec![ExtraField::new(
            "xf-1",
            "note",
            ExtraFieldType::Text,
            ExtraFieldSection::Footer,
        )];
        t
    }

    #[test]
    fn test_lookups_by_id_and_key() {
        let t = template();
        assert_eq!(t.column(&ColumnId::new("c-qty")).unwrap().key, "qty");
        assert_eq!(t.column_by_key("line_total").unwrap().id, ColumnId::new("c-total"));
        assert!(t.column_by_key("missing").is_none());
        assert!(t.row(&RowId::new("r-a")).is_some());
        assert!(t.extra_field(&ExtraFieldId::new("xf-1")).is_some());
    }

    #[test]
    fn test_rows_sort_by_display_position() {
        let t = template();
        let labels: Vec<&str> = t.ordered_rows().iter().map(|r| r.label.as_str()).collect();
        assert_eq!(labels, vec!["Item A", "Item B", "Total"]);
    }

    #[test]
    fn test_normal_and_total_rows_partition() {
        let t = template();
        assert_eq!(t.normal_rows().count(), 2);
        assert_eq!(t.total_rows().count(), 1);
    }

    #[test]
    fn test_block_columns_sort_within_block() {
        let t = template();
        let keys: Vec<&str> = t.block_columns(0).iter().map(|c| c.key.as_str()).collect();
        assert_eq!(keys, vec!["unit_price", "qty"]);
        assert_eq!(t.block_columns(1).len(), 1);
    }

    #[test]
    fn test_formula_columns_filter() {
        let t = template();
        let keys: Vec<&str> = t.formula_columns().map(|c| c.key.as_str()).collect();
        assert_eq!(keys, vec!["line_total"]);
    }
}
