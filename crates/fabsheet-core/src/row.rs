//! Template rows

use serde::{Deserialize, Serialize};

use crate::id::RowId;

/// Row kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RowType {
    #[default]
    Normal,
    /// Displays per-column sums over the NORMAL rows.
    Total,
}

/// One row of a template grid.
///
/// Rows carry no values themselves; those live in the entry's
/// [`ValueMap`](crate::values::ValueMap).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Row {
    pub id: RowId,
    pub label: String,
    #[serde(default)]
    pub row_type: RowType,
    #[serde(default)]
    pub order_no: u32,
}

impl Row {
    /// NORMAL row with default ordering.
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: RowId::new(id),
            label: label.into(),
            row_type: RowType::Normal,
            order_no: 0,
        }
    }

    pub fn is_total(&self) -> bool {
        self.row_type == RowType::Total
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_row_type_defaults_to_normal() {
        let row: Row = serde_json::from_str(r#"{"id": "r1", "label": "Item"}"#).unwrap();
        assert_eq!(row.row_type, RowType::Normal);
        assert!(!row.is_total());
    }

    #[test]
    fn test_total_row_wire_shape() {
        let row: Row =
            serde_json::from_str(r#"{"id": "r9", "label": "Sum", "rowType": "TOTAL", "orderNo": 9}"#)
                .unwrap();
        assert!(row.is_total());
        assert_eq!(row.order_no, 9);
    }
}
