use std::time::Duration;
use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, error};
use cafe_core::wire::{AddOrderResponse, ErrorBody, MessageResponse};
use cafe_core::{
    CoreError, CoreResult, OrderReceipt, OrderRepository, PendingOrder, PersistedOrder, QrArtifact, QrGenerator,
    QrRequest,
};

use crate::app_config::ClientConfig;

/// Talks to the order API from a till
#[derive(Clone)]
pub struct HttpOrderGateway {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl HttpOrderGateway {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> CoreResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CoreError::InternalError(format!("HTTP client setup failed: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout,
        })
    }

    pub fn from_config(config: &ClientConfig) -> CoreResult<Self> {
        Self::new(config.base_url.clone(), config.request_timeout())
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    fn transport_error(&self, e: reqwest::Error) -> CoreError {
        if e.is_timeout() {
            CoreError::Timeout(self.timeout)
        } else {
            CoreError::NetworkError(e.to_string())
        }
    }

    async fn decode<T: DeserializeOwned>(&self, response: Response) -> CoreResult<T> {
        let status = response.status();

        if status.is_success() {
            return response.json::<T>().await.map_err(|e| self.transport_error(e));
        }

        let message = match response.json::<ErrorBody>().await {
            Ok(body) => body.error,
            Err(_) => status.to_string(),
        };

        error!("Order API answered {}: {}", status, message);
        match status {
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => Err(CoreError::ValidationError(message)),
            StatusCode::GATEWAY_TIMEOUT => Err(CoreError::Timeout(self.timeout)),
            _ => Err(CoreError::NetworkError(format!("{}: {}", status, message))),
        }
    }
}

#[async_trait]
impl OrderRepository for HttpOrderGateway {
    async fn submit_order(&self, order: &PendingOrder) -> CoreResult<OrderReceipt> {
        debug!("POST /add_order snapshot {}", order.snapshot_id());
        let response = self
            .client
            .post(self.url("add_order"))
            .json(order)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let body: AddOrderResponse = self.decode(response).await?;
        Ok(OrderReceipt {
            order_number: body.order_number,
            status: body.status,
        })
    }

    async fn list_orders(&self) -> CoreResult<Vec<PersistedOrder>> {
        let response = self
            .client
            .get(self.url("get_orders"))
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        self.decode(response).await
    }

    async fn clear_orders(&self) -> CoreResult<()> {
        let response = self
            .client
            .post(self.url("clear_orders"))
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let _: MessageResponse = self.decode(response).await?;
        Ok(())
    }
}

#[async_trait]
impl QrGenerator for HttpOrderGateway {
    async fn generate_qr(&self, request: &QrRequest) -> CoreResult<QrArtifact> {
        let response = self
            .client
            .post(self.url("generate_qr"))
            .json(request)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        self.decode(response).await
    }
}
