//! Extra (non-grid) template fields

use serde::{Deserialize, Serialize};

use crate::id::ExtraFieldId;

/// Value kind of an extra field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ExtraFieldType {
    Text,
    Number,
    Date,
    /// Value holds an opaque upload reference.
    Image,
    /// Value holds an opaque upload reference.
    File,
}

/// Where the field renders relative to the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ExtraFieldSection {
    Header,
    Footer,
    Media,
}

/// Header/footer/media metadata field attached to a template, independent
/// of the row/column grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtraField {
    pub id: ExtraFieldId,
    pub key: String,
    pub label: String,
    pub field_type: ExtraFieldType,
    pub section: ExtraFieldSection,
    #[serde(default)]
    pub is_required: bool,
    #[serde(default)]
    pub order_no: u32,
}

impl ExtraField {
    pub fn new(
        id: impl Into<String>,
        key: impl Into<String>,
        field_type: ExtraFieldType,
        section: ExtraFieldSection,
    ) -> Self {
        let key = key.into();
        Self {
            id: ExtraFieldId::new(id),
            key: key.clone(),
            label: key,
            field_type,
            section,
            is_required: false,
            order_no: 0,
        }
    }

    pub fn is_numeric(&self) -> bool {
        self.field_type == ExtraFieldType::Number
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_deserializes_wire_shape() {
        let json = r#"{
            "id": "xf-1",
            "key": "delivery_date",
            "label": "Delivery date",
            "fieldType": "DATE",
            "section": "HEADER",
            "isRequired": true
        }"#;
        let field: ExtraField = serde_json::from_str(json).unwrap();
        assert_eq!(field.field_type, ExtraFieldType::Date);
        assert_eq!(field.section, ExtraFieldSection::Header);
        assert!(field.is_required);
    }

    #[test]
    fn test_media_sections_hold_upload_references() {
        let field = ExtraField::new("xf-2", "photo", ExtraFieldType::Image, ExtraFieldSection::Media);
        assert!(!field.is_numeric());
        assert_eq!(serde_json::to_string(&field.section).unwrap(), "\"MEDIA\"");
    }
}
