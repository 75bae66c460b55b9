use crate::error::HederaResult;
use crate::network::NodeDescriptor;
use crate::status::ResponseStatus;
use crate::transaction::{SignedTransaction, TransactionKind, TransactionReceipt};
use crate::types::TransactionId;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A node's immediate answer to a submission.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrecheckResponse {
    /// The precheck status.
    #[serde(rename = "precheck_code")]
    pub status: ResponseStatus,
}

impl PrecheckResponse {
    /// Creates a response carrying `status`.
    pub fn new(status: ResponseStatus) -> Self {
        Self { status }
    }
}

/// A live connection to one node.
///
/// Implementations must be cheap to share: the network keeps one channel per
/// node and hands clones of the `Arc` to every transaction.
#[async_trait]
pub trait Channel: Send + Sync {
    /// Submits a signed transaction through the RPC of `kind`.
    async fn submit(
        &self,
        kind: TransactionKind,
        transaction: &SignedTransaction,
    ) -> HederaResult<PrecheckResponse>;

    /// Asks the node for the receipt of `transaction_id`.
    async fn get_receipt(&self, transaction_id: &TransactionId) -> HederaResult<TransactionReceipt>;
}

/// Opens channels to nodes.
#[async_trait]
pub trait ChannelFactory: Send + Sync {
    /// Connects to `node`.
    async fn connect(&self, node: &NodeDescriptor) -> HederaResult<Arc<dyn Channel>>;
}
