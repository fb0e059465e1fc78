//! Orders, template instances and the duplicate state machine

use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::id::{ColumnId, CompanyId, ExtraFieldId, OrderId, OrderTemplateId, RowId, TemplateId};
use crate::money::{lossy_decimal, DiscountType};
use crate::summary::TemplateSummary;
use crate::template::Template;
use crate::values::{ExtraValueMap, ValueMap};

/// Most instances (parent plus duplicate child) a template may have on one
/// order.
pub const MAX_TEMPLATE_INSTANCES: usize = 2;

/// Order-level discount and margin inputs, applied on top of the summed
/// template totals by the final calculation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderAdjustments {
    #[serde(default, with = "lossy_decimal")]
    pub discount: Decimal,
    #[serde(default)]
    pub discount_type: DiscountType,
    #[serde(default, with = "lossy_decimal")]
    pub margin_discount: Decimal,
    #[serde(default)]
    pub margin_type: DiscountType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Order identity and header fields as the service returns them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderHeader {
    pub id: OrderId,
    pub company_id: CompanyId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    /// Saved order-level discount/margin inputs.
    #[serde(rename = "finalCalculation", default)]
    pub adjustments: OrderAdjustments,
}

impl OrderHeader {
    pub fn new(id: impl Into<String>, company_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: OrderId::new(id),
            company_id: CompanyId::new(company_id),
            name: name.into(),
            status: None,
            created_at: None,
            updated_at: None,
            adjustments: OrderAdjustments::default(),
        }
    }
}

/// One occurrence of a template within an order, either the parent or its
/// duplicate child.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderTemplateEntry {
    pub order_template_id: OrderTemplateId,
    pub template_id: TemplateId,
    /// Set on duplicate children; points at the parent entry.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_order_template_id: Option<OrderTemplateId>,
    #[serde(default)]
    pub is_child: bool,
    #[serde(default)]
    pub summary: TemplateSummary,
    #[serde(default)]
    pub values: ValueMap,
    #[serde(default)]
    pub extra_values: ExtraValueMap,
    /// FORMULA results and TOTAL-row figures from the last recalculation.
    #[serde(default)]
    pub calculated_values: ValueMap,
    /// False until the first save round-trips.
    #[serde(default = "default_true")]
    pub is_persisted: bool,
}

fn default_true() -> bool {
    true
}

impl OrderTemplateEntry {
    /// Fresh, unsaved instance of a template under a client-generated key.
    pub fn synthesize(template_id: TemplateId) -> Self {
        Self {
            order_template_id: OrderTemplateId::generate(),
            template_id,
            parent_order_template_id: None,
            is_child: false,
            summary: TemplateSummary::default(),
            values: ValueMap::new(),
            extra_values: ExtraValueMap::new(),
            calculated_values: ValueMap::new(),
            is_persisted: false,
        }
    }
}

/// Lifecycle of a template's instances within one order.
///
/// `PersistedParentWithChild` is terminal: once a child exists the template
/// can never be duplicated again on this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstanceState {
    /// No instance of the template on this order.
    Absent,
    /// A parent instance exists but has not been saved yet.
    New,
    /// A saved parent instance and no child.
    PersistedParent,
    /// Saved parent plus its duplicate child.
    PersistedParentWithChild,
}

impl InstanceState {
    /// Whether a duplicate action is allowed from this state.
    pub fn can_duplicate(self) -> bool {
        self == InstanceState::PersistedParent
    }
}

impl fmt::Display for InstanceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            InstanceState::Absent => "absent",
            InstanceState::New => "new",
            InstanceState::PersistedParent => "saved",
            InstanceState::PersistedParentWithChild => "saved+duplicate",
        };
        f.write_str(s)
    }
}

/// Full in-memory picture of one order: header, template definitions and
/// the template instances attached to the order.
///
/// Built fresh from a `getOrder` response on every load. Edits mutate this
/// copy and are shipped back through the client; nothing is persisted
/// locally. Entry writes go through [`add_entry`](OrderSnapshot::add_entry),
/// which is where the instance cap holds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderSnapshot {
    order: OrderHeader,
    #[serde(default)]
    templates: Vec<Template>,
    #[serde(default)]
    entries: Vec<OrderTemplateEntry>,
}

impl OrderSnapshot {
    pub fn new(order: OrderHeader) -> Self {
        Self {
            order,
            templates: Vec::new(),
            entries: Vec::new(),
        }
    }

    pub fn order(&self) -> &OrderHeader {
        &self.order
    }

    pub fn order_mut(&mut self) -> &mut OrderHeader {
        &mut self.order
    }

    pub fn templates(&self) -> &[Template] {
        &self.templates
    }

    pub fn entries(&self) -> &[OrderTemplateEntry] {
        &self.entries
    }

    /// Templates alongside mutable entries. Recalculation walks every entry
    /// mutably while reading its template definition; the disjoint borrow
    /// makes that a single pass.
    pub fn split_mut(&mut self) -> (&[Template], &mut [OrderTemplateEntry]) {
        (&self.templates, &mut self.entries)
    }

    /// Register a template definition, replacing any previous version.
    pub fn add_template(&mut self, template: Template) {
        if let Some(existing) = self.templates.iter_mut().find(|t| t.id == template.id) {
            *existing = template;
        } else {
            self.templates.push(template);
        }
    }

    pub fn template(&self, id: &TemplateId) -> Option<&Template> {
        self.templates.iter().find(|t| &t.id == id)
    }

    pub fn entry(&self, id: &OrderTemplateId) -> Option<&OrderTemplateEntry> {
        self.entries.iter().find(|e| &e.order_template_id == id)
    }

    pub fn entry_mut(&mut self, id: &OrderTemplateId) -> Option<&mut OrderTemplateEntry> {
        self.entries.iter_mut().find(|e| &e.order_template_id == id)
    }

    /// The parent (non-child) instance of a template, if any.
    pub fn parent_of(&self, template_id: &TemplateId) -> Option<&OrderTemplateEntry> {
        self.entries
            .iter()
            .find(|e| &e.template_id == template_id && !e.is_child)
    }

    /// Duplicate children of a template. The returned entries borrow the
    /// snapshot only, not the lookup key.
    pub fn children_of(
        &self,
        template_id: &TemplateId,
    ) -> impl Iterator<Item = &OrderTemplateEntry> + '_ {
        let template_id = template_id.clone();
        self.entries
            .iter()
            .filter(move |e| e.template_id == template_id && e.is_child)
    }

    /// The duplicate child of a template, if any.
    pub fn child_of(&self, template_id: &TemplateId) -> Option<&OrderTemplateEntry> {
        self.children_of(template_id).next()
    }

    /// Lifecycle state of a template's instances on this order.
    pub fn instance_state(&self, template_id: &TemplateId) -> InstanceState {
        let parent = self.parent_of(template_id);
        let has_child = self.child_of(template_id).is_some();
        match (parent, has_child) {
            (None, _) => InstanceState::Absent,
            (Some(p), false) if !p.is_persisted => InstanceState::New,
            (Some(_), false) => InstanceState::PersistedParent,
            (Some(_), true) => InstanceState::PersistedParentWithChild,
        }
    }

    /// Whether a duplicate action is currently allowed for a template.
    pub fn can_duplicate(&self, template_id: &TemplateId) -> bool {
        self.instance_state(template_id).can_duplicate()
    }

    /// Attach an entry to the order.
    ///
    /// Single write path for entries: a template may appear at most
    /// [`MAX_TEMPLATE_INSTANCES`] times, one parent and at most one child.
    pub fn add_entry(&mut self, entry: OrderTemplateEntry) -> Result<()> {
        if self.entry(&entry.order_template_id).is_some() {
            return Err(Error::EntryExists(entry.order_template_id.clone()));
        }
        let existing = self
            .entries
            .iter()
            .filter(|e| e.template_id == entry.template_id)
            .count();
        if existing >= MAX_TEMPLATE_INSTANCES {
            return Err(Error::DuplicateCapReached(entry.template_id.clone()));
        }
        if entry.is_child && self.child_of(&entry.template_id).is_some() {
            return Err(Error::DuplicateCapReached(entry.template_id.clone()));
        }
        if !entry.is_child && self.parent_of(&entry.template_id).is_some() {
            return Err(Error::DuplicateCapReached(entry.template_id.clone()));
        }
        self.entries.push(entry);
        Ok(())
    }

    /// Build, without attaching, the duplicate child of a template's parent.
    ///
    /// Checks the full precondition set: parent exists, parent is saved, no
    /// child yet. The child copies the parent's current values, extra values
    /// and summary under a generated key.
    pub fn build_duplicate(&self, template_id: &TemplateId) -> Result<OrderTemplateEntry> {
        let parent = self
            .parent_of(template_id)
            .ok_or_else(|| Error::TemplateNotFound(template_id.clone()))?;
        if !parent.is_persisted {
            return Err(Error::ParentNotPersisted(parent.order_template_id.clone()));
        }
        if self.child_of(template_id).is_some() {
            return Err(Error::DuplicateCapReached(template_id.clone()));
        }

        let mut child = OrderTemplateEntry::synthesize(template_id.clone());
        child.parent_order_template_id = Some(parent.order_template_id.clone());
        child.is_child = true;
        child.values = parent.values.clone();
        child.extra_values = parent.extra_values.clone();
        child.calculated_values = parent.calculated_values.clone();
        child.summary = parent.summary.clone();
        Ok(child)
    }

    /// Duplicate a template's parent entry in place, returning the new
    /// child's key.
    pub fn duplicate_entry(&mut self, template_id: &TemplateId) -> Result<OrderTemplateId> {
        let child = self.build_duplicate(template_id)?;
        let id = child.order_template_id.clone();
        self.add_entry(child)?;
        Ok(id)
    }

    /// Write one grid cell of an entry.
    ///
    /// FORMULA columns are derived and rejected here; unknown rows and
    /// columns are rejected so stray ids never grow the value map.
    pub fn set_value(
        &mut self,
        entry_id: &OrderTemplateId,
        row_id: &RowId,
        column_id: &ColumnId,
        value: impl Into<String>,
    ) -> Result<()> {
        let entry = self
            .entry(entry_id)
            .ok_or_else(|| Error::EntryNotFound(entry_id.clone()))?;
        let template = self
            .template(&entry.template_id)
            .ok_or_else(|| Error::TemplateNotFound(entry.template_id.clone()))?;
        let column = template
            .column(column_id)
            .ok_or_else(|| Error::ColumnNotFound(column_id.clone()))?;
        if column.is_formula() {
            return Err(Error::FormulaColumnNotEditable(column_id.clone()));
        }
        if template.row(row_id).is_none() {
            return Err(Error::RowNotFound(row_id.clone()));
        }

        let entry = self
            .entry_mut(entry_id)
            .ok_or_else(|| Error::EntryNotFound(entry_id.clone()))?;
        entry.values.set(row_id.clone(), column_id.clone(), value);
        Ok(())
    }

    /// Write one extra-field value of an entry.
    pub fn set_extra_value(
        &mut self,
        entry_id: &OrderTemplateId,
        field_id: &ExtraFieldId,
        value: impl Into<String>,
    ) -> Result<()> {
        let entry = self
            .entry(entry_id)
            .ok_or_else(|| Error::EntryNotFound(entry_id.clone()))?;
        let template = self
            .template(&entry.template_id)
            .ok_or_else(|| Error::TemplateNotFound(entry.template_id.clone()))?;
        if template.extra_field(field_id).is_none() {
            return Err(Error::ExtraFieldNotFound(field_id.clone()));
        }

        let entry = self
            .entry_mut(entry_id)
            .ok_or_else(|| Error::EntryNotFound(entry_id.clone()))?;
        entry.extra_values.set(field_id.clone(), value);
        Ok(())
    }

    /// Flag an entry as saved after its write round-trips.
    pub fn mark_persisted(&mut self, entry_id: &OrderTemplateId) -> Result<()> {
        let entry = self
            .entry_mut(entry_id)
            .ok_or_else(|| Error::EntryNotFound(entry_id.clone()))?;
        entry.is_persisted = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::{Column, DataType};
    use crate::money::Money;
    use pretty_assertions::assert_eq;

    fn template() -> Template {
        let mut t = Template::new("tpl-1", "Cabinet");
        let mut total = Column::new("c-total", "line_total", DataType::Formula);
        total.formula = Some("qty * unit_price".to_string());
        t.columns = vec![
            Column::new("c-qty", "qty", DataType::Number),
            Column::new("c-price", "unit_price", DataType::Number),
            total,
        ];
        t.rows = vec![crate::row::Row::new("r-a", "Item A")];
        t
    }

    fn snapshot() -> OrderSnapshot {
        let mut snap = OrderSnapshot::new(OrderHeader::new("ord-1", "co-1", "Test order"));
        snap.add_template(template());
        snap
    }

    fn tpl() -> TemplateId {
        TemplateId::new("tpl-1")
    }

    #[test]
    fn test_state_machine_walks_forward() {
        let mut snap = snapshot();
        assert_eq!(snap.instance_state(&tpl()), InstanceState::Absent);

        let entry = OrderTemplateEntry::synthesize(tpl());
        let id = entry.order_template_id.clone();
        snap.add_entry(entry).unwrap();
        assert_eq!(snap.instance_state(&tpl()), InstanceState::New);
        assert!(!snap.can_duplicate(&tpl()));

        snap.mark_persisted(&id).unwrap();
        assert_eq!(snap.instance_state(&tpl()), InstanceState::PersistedParent);
        assert!(snap.can_duplicate(&tpl()));

        snap.duplicate_entry(&tpl()).unwrap();
        assert_eq!(
            snap.instance_state(&tpl()),
            InstanceState::PersistedParentWithChild
        );
        assert!(!snap.can_duplicate(&tpl()));
    }

    #[test]
    fn test_second_duplicate_is_rejected_before_anything_else() {
        let mut snap = snapshot();
        let entry = OrderTemplateEntry::synthesize(tpl());
        let id = entry.order_template_id.clone();
        snap.add_entry(entry).unwrap();
        snap.mark_persisted(&id).unwrap();
        snap.duplicate_entry(&tpl()).unwrap();

        let err = snap.duplicate_entry(&tpl()).unwrap_err();
        assert!(matches!(err, Error::DuplicateCapReached(_)));
        assert_eq!(snap.entries().len(), 2);
    }

    #[test]
    fn test_unsaved_parent_cannot_be_duplicated() {
        let mut snap = snapshot();
        snap.add_entry(OrderTemplateEntry::synthesize(tpl())).unwrap();

        let err = snap.build_duplicate(&tpl()).unwrap_err();
        assert!(matches!(err, Error::ParentNotPersisted(_)));
    }

    #[test]
    fn test_duplicate_copies_values_and_links_parent() {
        let mut snap = snapshot();
        let entry = OrderTemplateEntry::synthesize(tpl());
        let parent_id = entry.order_template_id.clone();
        snap.add_entry(entry).unwrap();
        snap.set_value(&parent_id, &RowId::new("r-a"), &ColumnId::new("c-qty"), "4")
            .unwrap();
        snap.entry_mut(&parent_id).unwrap().summary = TemplateSummary::with_total(
            Money::parse("90").unwrap(),
        );
        snap.mark_persisted(&parent_id).unwrap();

        let child_id = snap.duplicate_entry(&tpl()).unwrap();
        let child = snap.entry(&child_id).unwrap();
        assert!(child.is_child);
        assert!(!child.is_persisted);
        assert_eq!(child.parent_order_template_id.as_ref(), Some(&parent_id));
        assert_eq!(
            child.values.get(&RowId::new("r-a"), &ColumnId::new("c-qty")),
            Some("4")
        );
        assert_eq!(child.summary.total, Money::parse("90").unwrap());
        assert_ne!(child.order_template_id, parent_id);
    }

    #[test]
    fn test_child_lookup_outlives_the_key_borrow() {
        let mut snap = snapshot();
        let entry = OrderTemplateEntry::synthesize(tpl());
        let id = entry.order_template_id.clone();
        snap.add_entry(entry).unwrap();
        snap.mark_persisted(&id).unwrap();
        snap.duplicate_entry(&tpl()).unwrap();

        // the entry stays usable after the key it was found with is gone
        let child = {
            let key = tpl();
            snap.child_of(&key)
        };
        assert!(child.unwrap().is_child);
        assert_eq!(snap.children_of(&tpl()).count(), 1);
    }

    #[test]
    fn test_a_template_never_gets_two_parents() {
        let mut snap = snapshot();
        snap.add_entry(OrderTemplateEntry::synthesize(tpl())).unwrap();

        let err = snap.add_entry(OrderTemplateEntry::synthesize(tpl())).unwrap_err();
        assert!(matches!(err, Error::DuplicateCapReached(_)));
    }

    #[test]
    fn test_entry_keys_stay_unique() {
        let mut snap = snapshot();
        let entry = OrderTemplateEntry::synthesize(tpl());
        let copy = entry.clone();
        snap.add_entry(entry).unwrap();

        let err = snap.add_entry(copy).unwrap_err();
        assert!(matches!(err, Error::EntryExists(_)));
    }

    #[test]
    fn test_formula_cells_are_not_editable() {
        let mut snap = snapshot();
        let entry = OrderTemplateEntry::synthesize(tpl());
        let id = entry.order_template_id.clone();
        snap.add_entry(entry).unwrap();

        let err = snap
            .set_value(&id, &RowId::new("r-a"), &ColumnId::new("c-total"), "999")
            .unwrap_err();
        assert!(matches!(err, Error::FormulaColumnNotEditable(_)));

        let err = snap
            .set_value(&id, &RowId::new("r-a"), &ColumnId::new("c-unknown"), "1")
            .unwrap_err();
        assert!(matches!(err, Error::ColumnNotFound(_)));

        let err = snap
            .set_value(&id, &RowId::new("r-unknown"), &ColumnId::new("c-qty"), "1")
            .unwrap_err();
        assert!(matches!(err, Error::RowNotFound(_)));
    }

    #[test]
    fn test_snapshot_deserializes_from_service_json() {
        let json = r#"{
            "order": {
                "id": "ord-1",
                "companyId": "co-1",
                "name": "Kitchen refit",
                "finalCalculation": {"discount": 10, "discountType": "PERCENT"}
            },
            "templates": [{"id": "tpl-1", "name": "Cabinet"}],
            "entries": [{
                "orderTemplateId": "ote-1",
                "templateId": "tpl-1",
                "summary": {"total": "200.00"}
            }]
        }"#;
        let snap: OrderSnapshot = serde_json::from_str(json).unwrap();
        assert_eq!(snap.order().name, "Kitchen refit");
        assert_eq!(snap.order().adjustments.discount, Decimal::from(10));
        let entry = snap.entry(&OrderTemplateId::new("ote-1")).unwrap();
        assert!(entry.is_persisted);
        assert!(!entry.is_child);
        assert_eq!(snap.instance_state(&tpl()), InstanceState::PersistedParent);
    }

    #[test]
    fn test_unsaved_entries_round_trip_through_snapshot_json() {
        let mut snap = snapshot();
        snap.add_entry(OrderTemplateEntry::synthesize(tpl())).unwrap();

        let json = serde_json::to_string(&snap).unwrap();
        let back: OrderSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back.instance_state(&tpl()), InstanceState::New);
        assert_eq!(back, snap);
    }
}
