//! HTTP implementation of the order service boundary

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use fabsheet_core::{CompanyId, OrderAdjustments, OrderId, OrderSnapshot};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use uuid::Uuid;

use crate::api::OrderApi;
use crate::error::{ClientError, ClientResult};
use crate::payload::{CreateOrderRequest, UpdateOrderValuesRequest};
use crate::retry::RetryPolicy;

/// HTTP client for the order service.
///
/// Endpoints hang off `{base_url}/companies/{companyId}/orders`. Mutating
/// calls run under the configured [`RetryPolicy`] and carry one
/// `Idempotency-Key` per logical mutation, reused across attempts.
pub struct HttpOrderApi {
    client: reqwest::Client,
    base_url: String,
    api_token: Option<String>,
    retry: RetryPolicy,
}

impl HttpOrderApi {
    /// Client against `base_url` with a 30 second timeout and the default
    /// retry policy.
    pub fn new(base_url: impl Into<String>) -> ClientResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self {
            client,
            base_url,
            api_token: None,
            retry: RetryPolicy::default(),
        })
    }

    /// Bearer token attached to every request.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = Some(token.into());
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    fn orders_url(&self, company: &CompanyId) -> String {
        format!("{}/companies/{}/orders", self.base_url, company)
    }

    fn order_url(&self, company: &CompanyId, order: &OrderId) -> String {
        format!("{}/{}", self.orders_url(company), order)
    }

    fn request(&self, method: Method, url: &str) -> reqwest::RequestBuilder {
        let mut builder = self.client.request(method, url);
        if let Some(token) = &self.api_token {
            builder = builder.bearer_auth(token);
        }
        builder
    }

    /// Send a read request and return the successful body. Reads are never
    /// retried.
    async fn read(&self, url: &str) -> ClientResult<String> {
        tracing::debug!(%url, "GET");
        let response = self.request(Method::GET, url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(service_error(status, response).await);
        }
        Ok(response.text().await?)
    }

    /// Send a mutating request under the retry policy and return the
    /// successful body.
    ///
    /// One idempotency key covers every attempt of the same logical
    /// mutation. Only transport failures and 429/5xx answers are retried;
    /// anything else surfaces immediately.
    async fn mutate<B>(&self, method: Method, url: &str, body: &B) -> ClientResult<String>
    where
        B: Serialize + Sync,
    {
        run_mutation(&self.retry, |attempt, idempotency_key| {
            tracing::debug!(%url, method = %method, attempt, "sending");
            let request = self
                .request(method.clone(), url)
                .header("Idempotency-Key", idempotency_key)
                .json(body);
            async move {
                match request.send().await {
                    Ok(response) => {
                        let status = response.status();
                        if status.is_success() {
                            return AttemptOutcome::Done(
                                response.text().await.map_err(ClientError::Transport),
                            );
                        }
                        let err = service_error(status, response).await;
                        if is_retryable_status(status) {
                            AttemptOutcome::Retry(err)
                        } else {
                            AttemptOutcome::Done(Err(err))
                        }
                    }
                    Err(err) => AttemptOutcome::Retry(ClientError::Transport(err)),
                }
            }
        })
        .await
    }

    fn parse<T: DeserializeOwned>(body: &str) -> ClientResult<T> {
        serde_json::from_str(body).map_err(|err| {
            tracing::error!(%err, "malformed service response");
            ClientError::Decode(err)
        })
    }
}

#[async_trait]
impl OrderApi for HttpOrderApi {
    async fn get_order(
        &self,
        company: &CompanyId,
        order: &OrderId,
    ) -> ClientResult<OrderSnapshot> {
        let body = self.read(&self.order_url(company, order)).await?;
        Self::parse(&body)
    }

    async fn create_order(
        &self,
        company: &CompanyId,
        request: &CreateOrderRequest,
    ) -> ClientResult<OrderSnapshot> {
        let body = self
            .mutate(Method::POST, &self.orders_url(company), request)
            .await?;
        Self::parse(&body)
    }

    async fn update_order_values(
        &self,
        company: &CompanyId,
        order: &OrderId,
        request: &UpdateOrderValuesRequest,
    ) -> ClientResult<()> {
        let url = format!("{}/values", self.order_url(company, order));
        self.mutate(Method::PUT, &url, request).await?;
        Ok(())
    }

    async fn recalculate_order(
        &self,
        company: &CompanyId,
        order: &OrderId,
    ) -> ClientResult<OrderSnapshot> {
        let url = format!("{}/recalculate", self.order_url(company, order));
        let body = self
            .mutate(Method::POST, &url, &serde_json::json!({}))
            .await?;
        Self::parse(&body)
    }

    async fn update_final_calculation(
        &self,
        company: &CompanyId,
        order: &OrderId,
        adjustments: &OrderAdjustments,
    ) -> ClientResult<()> {
        let url = format!("{}/final-calculation", self.order_url(company, order));
        self.mutate(Method::PUT, &url, adjustments).await?;
        Ok(())
    }
}

/// One attempt's verdict inside [`run_mutation`].
enum AttemptOutcome<T> {
    /// Terminal: a success, or a failure not worth another attempt.
    Done(ClientResult<T>),
    /// Worth another attempt while the policy allows one.
    Retry(ClientError),
}

/// Drive one logical mutation through a [`RetryPolicy`].
///
/// Mints the idempotency key once and hands the same key to every attempt.
/// The last retryable failure surfaces when attempts run out.
async fn run_mutation<T, F, Fut>(retry: &RetryPolicy, mut send: F) -> ClientResult<T>
where
    F: FnMut(u32, String) -> Fut,
    Fut: Future<Output = AttemptOutcome<T>>,
{
    let idempotency_key = Uuid::new_v4().to_string();
    let attempts = retry.max_attempts.max(1);
    let mut attempt = 0;

    loop {
        match send(attempt, idempotency_key.clone()).await {
            AttemptOutcome::Done(outcome) => return outcome,
            AttemptOutcome::Retry(err) => {
                attempt += 1;
                if attempt >= attempts {
                    return Err(err);
                }
                tracing::warn!(error = %err, attempt, "retrying after failure");
                tokio::time::sleep(retry.delay_for(attempt)).await;
            }
        }
    }
}

/// Collapse an error response into a single displayable message.
async fn service_error(status: StatusCode, response: reqwest::Response) -> ClientError {
    let body = response.text().await.unwrap_or_default();
    let message = error_message(&body).unwrap_or_else(|| {
        status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string()
    });
    tracing::error!(%status, %message, "service error");
    ClientError::Service {
        status: status.as_u16(),
        message,
    }
}

/// The `message` field of an error body, when there is one.
fn error_message(body: &str) -> Option<String> {
    #[derive(serde::Deserialize)]
    struct ErrorBody {
        message: String,
    }
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .map(|e| e.message)
        .filter(|m| !m.trim().is_empty())
}

/// Statuses worth another attempt: throttling and server-side failures.
fn is_retryable_status(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}
