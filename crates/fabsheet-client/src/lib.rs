//! # fabsheet-client
//!
//! Remote boundary of the fabsheet stack:
//!
//! - [`OrderApi`]: the five order service procedures as an async trait
//! - [`HttpOrderApi`]: the JSON-over-HTTP implementation, with bounded
//!   retry and idempotency keys on mutating calls
//! - [`OrderSession`]: a stateful editing session that serializes
//!   mutations per order, stamps loads against stale responses, validates
//!   before saving and enforces the duplicate cap before any network call
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use fabsheet_client::{HttpOrderApi, OrderSession};
//! use fabsheet_core::{CompanyId, OrderId};
//!
//! # async fn demo() -> fabsheet_client::ClientResult<()> {
//! let api = Arc::new(HttpOrderApi::new("https://orders.example.com/api")?);
//! let session = OrderSession::new(api, CompanyId::new("co-7"), OrderId::new("ord-41"));
//! session.load().await?;
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod error;
pub mod http;
pub mod payload;
pub mod retry;
pub mod session;

pub use api::OrderApi;
pub use error::{ClientError, ClientResult};
pub use http::HttpOrderApi;
pub use payload::{CreateOrderRequest, EntryValuesPayload, UpdateOrderValuesRequest};
pub use retry::RetryPolicy;
pub use session::{LoadOutcome, OrderSession};
