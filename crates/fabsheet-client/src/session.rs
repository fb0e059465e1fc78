//! Stateful editing session over one order
//!
//! The session owns the in-memory snapshot and routes every remote mutation
//! through one async mutex, so overlapping saves or duplicates for the same
//! order can never interleave. Loads stay concurrent; each carries a stamp
//! and a response is discarded unless its stamp is still the latest when it
//! resolves.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use fabsheet_core::{
    validate_entry, ColumnId, CompanyId, DiscountType, Error as CoreError, ExtraFieldId,
    OrderAdjustments, OrderId, OrderSnapshot, OrderTemplateEntry, OrderTemplateId, RowId,
    TemplateId,
};
use rust_decimal::Decimal;
use tokio::sync::Mutex;

use crate::api::OrderApi;
use crate::error::{ClientError, ClientResult};
use crate::payload::{CreateOrderRequest, EntryValuesPayload, UpdateOrderValuesRequest};

/// What became of a load once its response arrived.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The response became the session snapshot.
    Applied,
    /// A newer load or recalculation started while this one was in flight;
    /// the response was discarded.
    Superseded,
}

/// One user's editing session over one order.
///
/// Local edits mutate the snapshot under the session lock. Remote mutations
/// validate first, send second and update local state last, so a failed call
/// leaves everything as it was for a retry. The duplicate cap is enforced by
/// the data layer before any request goes out.
pub struct OrderSession<A: OrderApi> {
    api: Arc<A>,
    company_id: CompanyId,
    order_id: OrderId,
    state: Mutex<Option<OrderSnapshot>>,
    next_stamp: AtomicU64,
}

impl<A: OrderApi> OrderSession<A> {
    /// Session over an existing order. Call [`load`](Self::load) before
    /// editing.
    pub fn new(api: Arc<A>, company_id: CompanyId, order_id: OrderId) -> Self {
        Self {
            api,
            company_id,
            order_id,
            state: Mutex::new(None),
            next_stamp: AtomicU64::new(1),
        }
    }

    /// Create an order remotely and open a session over the stored result.
    pub async fn create(
        api: Arc<A>,
        company_id: CompanyId,
        request: CreateOrderRequest,
    ) -> ClientResult<Self> {
        let snapshot = api.create_order(&company_id, &request).await?;
        let order_id = snapshot.order().id.clone();
        let session = Self::new(api, company_id, order_id);
        {
            let mut state = session.state.lock().await;
            *state = Some(snapshot);
        }
        Ok(session)
    }

    pub fn company_id(&self) -> &CompanyId {
        &self.company_id
    }

    pub fn order_id(&self) -> &OrderId {
        &self.order_id
    }

    /// Clone of the current snapshot, if one is loaded.
    pub async fn snapshot(&self) -> Option<OrderSnapshot> {
        self.state.lock().await.clone()
    }

    /// Fetch the order and apply the response, unless a newer load or
    /// recalculation started in the meantime.
    pub async fn load(&self) -> ClientResult<LoadOutcome> {
        let stamp = self.next_stamp.fetch_add(1, Ordering::SeqCst);
        let snapshot = self.api.get_order(&self.company_id, &self.order_id).await?;

        let mut state = self.state.lock().await;
        let newest = self.next_stamp.load(Ordering::SeqCst) - 1;
        if stamp != newest {
            tracing::debug!(stamp, newest, "discarding stale load response");
            return Ok(LoadOutcome::Superseded);
        }
        *state = Some(snapshot);
        Ok(LoadOutcome::Applied)
    }

    /// Write one grid cell locally. No network.
    pub async fn set_value(
        &self,
        entry_id: &OrderTemplateId,
        row_id: &RowId,
        column_id: &ColumnId,
        value: impl Into<String>,
    ) -> ClientResult<()> {
        let mut state = self.state.lock().await;
        let snapshot = state.as_mut().ok_or(ClientError::NotLoaded)?;
        snapshot.set_value(entry_id, row_id, column_id, value)?;
        Ok(())
    }

    /// Write one extra-field value locally. No network.
    pub async fn set_extra_value(
        &self,
        entry_id: &OrderTemplateId,
        field_id: &ExtraFieldId,
        value: impl Into<String>,
    ) -> ClientResult<()> {
        let mut state = self.state.lock().await;
        let snapshot = state.as_mut().ok_or(ClientError::NotLoaded)?;
        snapshot.set_extra_value(entry_id, field_id, value)?;
        Ok(())
    }

    /// Change an entry's discount inputs locally, refreshing its derived
    /// summary fields. No network.
    pub async fn set_discount(
        &self,
        entry_id: &OrderTemplateId,
        discount: Decimal,
        discount_type: DiscountType,
    ) -> ClientResult<()> {
        let mut state = self.state.lock().await;
        let snapshot = state.as_mut().ok_or(ClientError::NotLoaded)?;
        let entry = snapshot
            .entry_mut(entry_id)
            .ok_or_else(|| CoreError::EntryNotFound(entry_id.clone()))?;
        entry.summary.set_discount(discount, discount_type);
        Ok(())
    }

    /// Put a fresh, unsaved instance of a template on the order, returning
    /// its generated key. No network until the entry is saved.
    pub async fn add_template_instance(
        &self,
        template_id: &TemplateId,
    ) -> ClientResult<OrderTemplateId> {
        let mut state = self.state.lock().await;
        let snapshot = state.as_mut().ok_or(ClientError::NotLoaded)?;
        if snapshot.template(template_id).is_none() {
            return Err(CoreError::TemplateNotFound(template_id.clone()).into());
        }
        let entry = OrderTemplateEntry::synthesize(template_id.clone());
        let id = entry.order_template_id.clone();
        snapshot.add_entry(entry)?;
        Ok(id)
    }

    /// Persist the values, extra values and summaries of an entry's whole
    /// template slice (the parent with any child nested).
    ///
    /// Validation issues anywhere in the slice block the call; nothing is
    /// sent until every shipped entry is clean. On success all shipped
    /// entries are marked persisted.
    pub async fn save_entry(&self, entry_id: &OrderTemplateId) -> ClientResult<()> {
        let mut state = self.state.lock().await;
        let snapshot = state.as_mut().ok_or(ClientError::NotLoaded)?;

        let entry = snapshot
            .entry(entry_id)
            .ok_or_else(|| CoreError::EntryNotFound(entry_id.clone()))?;
        let template_id = entry.template_id.clone();
        let template = snapshot
            .template(&template_id)
            .ok_or_else(|| CoreError::TemplateNotFound(template_id.clone()))?;

        let mut issues = Vec::new();
        let mut saved_ids = Vec::new();
        for e in snapshot
            .entries()
            .iter()
            .filter(|e| e.template_id == template_id)
        {
            issues.extend(validate_entry(template, e));
            saved_ids.push(e.order_template_id.clone());
        }
        if !issues.is_empty() {
            return Err(ClientError::Validation(issues));
        }

        let request = UpdateOrderValuesRequest::for_template(snapshot, &template_id)
            .ok_or_else(|| CoreError::EntryNotFound(entry_id.clone()))?;
        self.api
            .update_order_values(&self.company_id, &self.order_id, &request)
            .await?;

        for id in &saved_ids {
            snapshot.mark_persisted(id)?;
        }
        Ok(())
    }

    /// Duplicate a template's saved parent entry, returning the child's key.
    ///
    /// The cap and parent-state checks run first; when they fail nothing is
    /// sent. The parent ships with the new child nested in one values call,
    /// and the child joins the snapshot only after that call succeeds.
    pub async fn duplicate_template(
        &self,
        template_id: &TemplateId,
    ) -> ClientResult<OrderTemplateId> {
        let mut state = self.state.lock().await;
        let snapshot = state.as_mut().ok_or(ClientError::NotLoaded)?;

        let mut child = snapshot.build_duplicate(template_id)?;
        let child_id = child.order_template_id.clone();

        let parent = snapshot
            .parent_of(template_id)
            .ok_or_else(|| CoreError::TemplateNotFound(template_id.clone()))?;
        let payload = EntryValuesPayload::from_entry(parent)
            .with_children([EntryValuesPayload::from_entry(&child)]);
        let request = UpdateOrderValuesRequest::single(payload);

        self.api
            .update_order_values(&self.company_id, &self.order_id, &request)
            .await?;

        child.is_persisted = true;
        snapshot.add_entry(child)?;
        Ok(child_id)
    }

    /// Persist order-level discount and margin inputs, mirroring them into
    /// the snapshot header on success.
    pub async fn apply_final_calculation(
        &self,
        adjustments: OrderAdjustments,
    ) -> ClientResult<()> {
        let mut state = self.state.lock().await;
        let snapshot = state.as_mut().ok_or(ClientError::NotLoaded)?;
        self.api
            .update_final_calculation(&self.company_id, &self.order_id, &adjustments)
            .await?;
        snapshot.order_mut().adjustments = adjustments;
        Ok(())
    }

    /// Ask the service to recompute its figures and replace the snapshot
    /// with the fresh one.
    pub async fn recalculate(&self) -> ClientResult<()> {
        let mut state = self.state.lock().await;
        if state.is_none() {
            return Err(ClientError::NotLoaded);
        }
        // In-flight load responses must not overwrite the fresher result.
        self.next_stamp.fetch_add(1, Ordering::SeqCst);
        let snapshot = self
            .api
            .recalculate_order(&self.company_id, &self.order_id)
            .await?;
        *state = Some(snapshot);
        Ok(())
    }
}
