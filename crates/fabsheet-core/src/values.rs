//! Cell and extra-field value storage

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::id::{ColumnId, ExtraFieldId, RowId};

/// Grid values of one template instance: rowId to (columnId to raw string).
///
/// Holds only directly entered values. FORMULA column results never land
/// here; they are recomputed on every recalculation and kept in the entry's
/// calculated-value map.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValueMap(HashMap<RowId, HashMap<ColumnId, String>>);

impl ValueMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, row: &RowId, column: &ColumnId) -> Option<&str> {
        self.0
            .get(row)
            .and_then(|cells| cells.get(column))
            .map(String::as_str)
    }

    pub fn set(&mut self, row: RowId, column: ColumnId, value: impl Into<String>) {
        self.0.entry(row).or_default().insert(column, value.into());
    }

    /// Remove one cell, dropping the row bucket when it empties.
    pub fn remove(&mut self, row: &RowId, column: &ColumnId) -> Option<String> {
        let cells = self.0.get_mut(row)?;
        let removed = cells.remove(column);
        if cells.is_empty() {
            self.0.remove(row);
        }
        removed
    }

    /// All stored cells of one row.
    pub fn row(&self, row: &RowId) -> Option<&HashMap<ColumnId, String>> {
        self.0.get(row)
    }

    pub fn rows(&self) -> impl Iterator<Item = (&RowId, &HashMap<ColumnId, String>)> {
        self.0.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }
}

/// Extra-field values keyed by field id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtraValueMap(HashMap<ExtraFieldId, String>);

impl ExtraValueMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, field: &ExtraFieldId) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn set(&mut self, field: ExtraFieldId, value: impl Into<String>) {
        self.0.insert(field, value.into());
    }

    pub fn remove(&mut self, field: &ExtraFieldId) -> Option<String> {
        self.0.remove(field)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ExtraFieldId, &str)> {
        self.0.iter().map(|(id, value)| (id, value.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Tolerant numeric read of a raw cell string.
///
/// Trims whitespace and thousands separators; anything still unparsable
/// reads as `None`. Callers on the evaluation path degrade that to `0`.
pub fn parse_loose_number(raw: &str) -> Option<f64> {
    let cleaned = raw.trim().replace(',', "");
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn row(id: &str) -> RowId {
        RowId::new(id)
    }

    fn col(id: &str) -> ColumnId {
        ColumnId::new(id)
    }

    #[test]
    fn test_set_get_remove_roundtrip() {
        let mut values = ValueMap::new();
        values.set(row("r1"), col("c1"), "12");
        values.set(row("r1"), col("c2"), "steel");

        assert_eq!(values.get(&row("r1"), &col("c1")), Some("12"));
        assert_eq!(values.get(&row("r2"), &col("c1")), None);

        assert_eq!(values.remove(&row("r1"), &col("c1")), Some("12".to_string()));
        assert_eq!(values.get(&row("r1"), &col("c1")), None);
    }

    #[test]
    fn test_empty_row_buckets_are_dropped() {
        let mut values = ValueMap::new();
        values.set(row("r1"), col("c1"), "x");
        values.remove(&row("r1"), &col("c1"));
        assert!(values.is_empty());
    }

    #[test]
    fn test_serializes_as_nested_maps() {
        let mut values = ValueMap::new();
        values.set(row("r1"), col("c1"), "5");
        let json = serde_json::to_value(&values).unwrap();
        assert_eq!(json["r1"]["c1"], "5");
    }

    #[test]
    fn test_loose_number_parsing() {
        assert_eq!(parse_loose_number(" 42 "), Some(42.0));
        assert_eq!(parse_loose_number("1,200.5"), Some(1200.5));
        assert_eq!(parse_loose_number("-3.25"), Some(-3.25));
        assert_eq!(parse_loose_number(""), None);
        assert_eq!(parse_loose_number("   "), None);
        assert_eq!(parse_loose_number("12mm"), None);
    }

    #[test]
    fn test_extra_values_keyed_by_field_id() {
        let mut extras = ExtraValueMap::new();
        extras.set(ExtraFieldId::new("xf-1"), "2026-09-01");
        assert_eq!(extras.get(&ExtraFieldId::new("xf-1")), Some("2026-09-01"));
        assert_eq!(extras.iter().count(), 1);
    }
}
