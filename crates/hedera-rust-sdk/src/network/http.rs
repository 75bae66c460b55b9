//! HTTP transport to node gateways.
//!
//! Submissions are `POST {endpoint}/{service}/{method}` with the BCS-encoded
//! [`SignedTransaction`] as body, answered by `{"precheck_code": <i32>}`.
//! Receipts are `GET {endpoint}/receipts/{transaction_id}`, answered by a JSON
//! [`TransactionReceipt`].

use crate::config::HederaConfig;
use crate::error::{HederaError, HederaResult};
use crate::network::{Channel, ChannelFactory, NodeDescriptor, PrecheckResponse};
use crate::transaction::{SignedTransaction, TransactionKind, TransactionReceipt};
use crate::types::TransactionId;
use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::Client;
use std::sync::Arc;
use url::Url;

const BCS_CONTENT_TYPE: &str = "application/x.hedera.signed_transaction+bcs";
const JSON_CONTENT_TYPE: &str = "application/json";

/// Opens [`HttpChannel`]s that share one connection pool.
#[derive(Debug, Clone)]
pub struct HttpChannelFactory {
    client: Client,
}

impl HttpChannelFactory {
    /// Creates a factory using the timeout and pool settings of `config`.
    ///
    /// TLS certificate validation is left at reqwest's default: enabled.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn new(config: &HederaConfig) -> HederaResult<Self> {
        let pool = config.pool_config();
        let mut builder = Client::builder()
            .timeout(config.timeout())
            .pool_max_idle_per_host(pool.max_idle_per_host.unwrap_or(usize::MAX))
            .pool_idle_timeout(pool.idle_timeout)
            .tcp_nodelay(pool.tcp_nodelay);

        if let Some(keepalive) = pool.tcp_keepalive {
            builder = builder.tcp_keepalive(keepalive);
        }

        let client = builder.build().map_err(HederaError::Http)?;
        Ok(Self { client })
    }

    /// Creates a factory around an existing `reqwest` client.
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ChannelFactory for HttpChannelFactory {
    async fn connect(&self, node: &NodeDescriptor) -> HederaResult<Arc<dyn Channel>> {
        Ok(Arc::new(HttpChannel {
            node: node.clone(),
            client: self.client.clone(),
        }))
    }
}

/// A channel to one node gateway.
#[derive(Debug, Clone)]
pub struct HttpChannel {
    node: NodeDescriptor,
    client: Client,
}

impl HttpChannel {
    fn build_url(&self, path: &str) -> Url {
        let mut url = self.node.endpoint.clone();
        if !url.path().ends_with('/') {
            url.set_path(&format!("{}/", url.path()));
        }
        url.set_path(&format!("{}{}", url.path(), path));
        url
    }

    async fn handle_response<T: for<'de> serde::Deserialize<'de>>(
        &self,
        response: reqwest::Response,
    ) -> HederaResult<T> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }

        let body: serde_json::Value = response.json().await.unwrap_or_default();
        let message = body
            .get("message")
            .and_then(|v| v.as_str())
            .unwrap_or("Unknown error")
            .to_string();
        Err(HederaError::api(status.as_u16(), message))
    }

    fn transport_error(&self, err: reqwest::Error) -> HederaError {
        if err.is_connect() || err.is_timeout() {
            HederaError::channel(self.node.account_id, err.to_string())
        } else {
            HederaError::Http(err)
        }
    }
}

#[async_trait]
impl Channel for HttpChannel {
    async fn submit(
        &self,
        kind: TransactionKind,
        transaction: &SignedTransaction,
    ) -> HederaResult<PrecheckResponse> {
        let url = self.build_url(&format!("{}/{}", kind.service(), kind.method()));
        let body = transaction.to_bytes()?;
        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, BCS_CONTENT_TYPE)
            .header(ACCEPT, JSON_CONTENT_TYPE)
            .body(body)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;
        self.handle_response(response).await
    }

    async fn get_receipt(&self, transaction_id: &TransactionId) -> HederaResult<TransactionReceipt> {
        let url = self.build_url(&format!("receipts/{transaction_id}"));
        let response = self
            .client
            .get(url)
            .header(ACCEPT, JSON_CONTENT_TYPE)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;
        self.handle_response(response).await
    }
}
