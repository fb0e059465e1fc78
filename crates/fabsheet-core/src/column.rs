//! Template columns

use serde::{Deserialize, Serialize};

use crate::id::ColumnId;

/// What a column's cell values hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DataType {
    Text,
    Number,
    Date,
    /// Derived from other columns via the column's expression text.
    Formula,
}

/// One column of a template grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    pub id: ColumnId,
    /// Stable symbolic name referenced inside formula strings.
    pub key: String,
    pub label: String,
    pub data_type: DataType,
    /// Expression text for FORMULA columns, `None` otherwise.
    #[serde(default)]
    pub formula: Option<String>,
    #[serde(default)]
    pub is_required: bool,
    /// Display block the column belongs to.
    #[serde(default)]
    pub block_index: u32,
    /// Position within the block.
    #[serde(default)]
    pub order_no: u32,
}

impl Column {
    /// Column with default layout fields; label falls back to the key.
    pub fn new(id: impl Into<String>, key: impl Into<String>, data_type: DataType) -> Self {
        let key = key.into();
        Self {
            id: ColumnId::new(id),
            key: key.clone(),
            label: key,
            data_type,
            formula: None,
            is_required: false,
            block_index: 0,
            order_no: 0,
        }
    }

    pub fn is_formula(&self) -> bool {
        self.data_type == DataType::Formula
    }

    pub fn is_numeric(&self) -> bool {
        self.data_type == DataType::Number
    }
}
