//! The remote order service boundary

use async_trait::async_trait;
use fabsheet_core::{CompanyId, OrderAdjustments, OrderId, OrderSnapshot};

use crate::error::ClientResult;
use crate::payload::{CreateOrderRequest, UpdateOrderValuesRequest};

/// The five remote procedures of the order service.
///
/// The service is the consistency authority: every mutation round-trips and
/// the caller refreshes from `get_order` or `recalculate_order` responses.
/// Implementations must be shareable across tasks; [`OrderSession`] holds
/// one behind an `Arc`.
///
/// [`OrderSession`]: crate::session::OrderSession
#[async_trait]
pub trait OrderApi: Send + Sync {
    /// Fetch the full order picture: header, template definitions and
    /// template instances.
    async fn get_order(
        &self,
        company: &CompanyId,
        order: &OrderId,
    ) -> ClientResult<OrderSnapshot>;

    /// Create an order with optional initial entries, returning the stored
    /// snapshot.
    async fn create_order(
        &self,
        company: &CompanyId,
        request: &CreateOrderRequest,
    ) -> ClientResult<OrderSnapshot>;

    /// Persist entry values, extra values and summaries. Duplicate children
    /// ride nested in their parent's payload slice.
    async fn update_order_values(
        &self,
        company: &CompanyId,
        order: &OrderId,
        request: &UpdateOrderValuesRequest,
    ) -> ClientResult<()>;

    /// Ask the service to recompute its totals, returning the fresh
    /// snapshot.
    async fn recalculate_order(
        &self,
        company: &CompanyId,
        order: &OrderId,
    ) -> ClientResult<OrderSnapshot>;

    /// Persist the order-level discount and margin inputs.
    async fn update_final_calculation(
        &self,
        company: &CompanyId,
        order: &OrderId,
        adjustments: &OrderAdjustments,
    ) -> ClientResult<()>;
}
