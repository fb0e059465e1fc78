//! Request bodies for the order service

use fabsheet_core::{
    ExtraValueMap, OrderSnapshot, OrderTemplateEntry, OrderTemplateId, TemplateId, TemplateSummary,
    ValueMap,
};
use serde::{Deserialize, Serialize};

/// One template instance's slice of an `updateOrderValues` body: grid
/// values, extra values and the summary block, with duplicate children
/// nested under their parent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryValuesPayload {
    pub order_template_id: OrderTemplateId,
    pub template_id: TemplateId,
    #[serde(default)]
    pub values: ValueMap,
    #[serde(default)]
    pub extra_values: ExtraValueMap,
    #[serde(default)]
    pub summary: TemplateSummary,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<EntryValuesPayload>,
}

impl EntryValuesPayload {
    /// Payload slice for one entry, without children.
    pub fn from_entry(entry: &OrderTemplateEntry) -> Self {
        Self {
            order_template_id: entry.order_template_id.clone(),
            template_id: entry.template_id.clone(),
            values: entry.values.clone(),
            extra_values: entry.extra_values.clone(),
            summary: entry.summary.clone(),
            children: Vec::new(),
        }
    }

    /// Nest child slices under this parent.
    pub fn with_children(mut self, children: impl IntoIterator<Item = EntryValuesPayload>) -> Self {
        self.children.extend(children);
        self
    }
}

/// Body of `updateOrderValues`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrderValuesRequest {
    pub entries: Vec<EntryValuesPayload>,
}

impl UpdateOrderValuesRequest {
    pub fn single(entry: EntryValuesPayload) -> Self {
        Self {
            entries: vec![entry],
        }
    }

    /// The full slice of one template on an order: the root entry (the
    /// parent when one exists) with every other instance nested under it.
    /// `None` when the template has no instance on the order.
    pub fn for_template(snapshot: &OrderSnapshot, template_id: &TemplateId) -> Option<Self> {
        let root = snapshot
            .parent_of(template_id)
            .or_else(|| snapshot.children_of(template_id).next())?;
        let children = snapshot
            .children_of(template_id)
            .filter(|c| c.order_template_id != root.order_template_id)
            .map(EntryValuesPayload::from_entry);
        Some(Self::single(
            EntryValuesPayload::from_entry(root).with_children(children),
        ))
    }
}

/// Body of `createOrder`: a name plus any initial template instances,
/// assembled from synthesized entries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub entries: Vec<EntryValuesPayload>,
}

impl CreateOrderRequest {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: Vec::new(),
        }
    }

    pub fn with_entry(mut self, entry: EntryValuesPayload) -> Self {
        self.entries.push(entry);
        self
    }
}
