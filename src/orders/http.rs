//! HTTP order gateway.

use async_trait::async_trait;
use reqwest::Client;
use tracing::{Span, warn};

use crate::orders::{OrderConfirmation, OrderGateway, OrderPayload, SubmissionError};

/// Header carrying the checkout id so retried submissions are deduplicated.
pub const IDEMPOTENCY_KEY_HEADER: &str = "Idempotency-Key";

/// Configuration for connecting to the order API.
#[derive(Debug, Clone)]
pub struct OrderApiConfig {
    /// Order API base URL, e.g. `"https://shop.example.com/api"`.
    pub base_url: String,

    /// Bearer token, if the API requires one.
    pub token: Option<String>,
}

/// Places orders by POSTing them to `{base_url}/orders`.
#[derive(Debug, Clone)]
pub struct HttpOrderGateway {
    config: OrderApiConfig,
    http: Client,
}

impl HttpOrderGateway {
    /// Create a new gateway from the given configuration.
    #[must_use]
    pub fn new(config: OrderApiConfig) -> Self {
        Self::with_client(config, Client::new())
    }

    /// Create a gateway that sends requests through `http`.
    #[must_use]
    pub fn with_client(config: OrderApiConfig, http: Client) -> Self {
        Self { config, http }
    }

    /// Endpoint orders are sent to.
    pub fn orders_url(&self) -> String {
        format!("{}/orders", self.config.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl OrderGateway for HttpOrderGateway {
    #[tracing::instrument(
        name = "orders.http.submit",
        skip(self, payload),
        fields(checkout_id = %payload.checkout_id, status = tracing::field::Empty),
        err
    )]
    async fn submit(&self, payload: &OrderPayload) -> Result<OrderConfirmation, SubmissionError> {
        let mut request = self
            .http
            .post(self.orders_url())
            .header(IDEMPOTENCY_KEY_HEADER, payload.checkout_id.to_string())
            .json(payload);

        if let Some(token) = &self.config.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();

        Span::current().record("status", status.as_u16());

        if !status.is_success() {
            let body = response.text().await.unwrap_or_else(|error| {
                warn!(%status, %error, "failed to read order API error body");

                String::new()
            });

            return Err(SubmissionError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let confirmation: OrderConfirmation = response
            .json()
            .await
            .map_err(|error| SubmissionError::InvalidResponse(error.to_string()))?;

        if confirmation.order_number.trim().is_empty() {
            return Err(SubmissionError::InvalidResponse(
                "order number is empty".to_string(),
            ));
        }

        Ok(confirmation)
    }
}
