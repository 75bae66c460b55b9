//! A scripted in-memory network for driving transactions end to end.

#![allow(dead_code)]

use async_trait::async_trait;
use hedera_rust_sdk::crypto::Ed25519PrivateKey;
use hedera_rust_sdk::network::{Channel, ChannelFactory, NodeDescriptor, PrecheckResponse};
use hedera_rust_sdk::retry::RetryConfig;
use hedera_rust_sdk::transaction::{
    SignedTransaction, TransactionKind, TransactionReceipt, TransferTransaction,
};
use hedera_rust_sdk::types::{AccountId, Hbar};
use hedera_rust_sdk::{
    Hedera, HederaConfig, HederaError, HederaResult, ResponseStatus, TransactionId,
};
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

pub const OPERATOR: AccountId = AccountId::from_num(2);
pub const NODE_COOLDOWN: Duration = Duration::from_secs(30);

/// One node whose answers are queued up front.
///
/// Once a queue runs dry the node keeps answering with its fallback: `OK`
/// for prechecks and the configured status for receipts.
pub struct ScriptedNode {
    prechecks: Mutex<VecDeque<HederaResult<ResponseStatus>>>,
    receipts: Mutex<VecDeque<HederaResult<TransactionReceipt>>>,
    fallback_receipt: Mutex<TransactionReceipt>,
    submitted: Mutex<Vec<(TransactionKind, SignedTransaction)>>,
    submissions: AtomicU32,
    receipt_queries: AtomicU32,
}

impl ScriptedNode {
    fn new() -> Self {
        Self {
            prechecks: Mutex::new(VecDeque::new()),
            receipts: Mutex::new(VecDeque::new()),
            fallback_receipt: Mutex::new(TransactionReceipt::new(ResponseStatus::Success)),
            submitted: Mutex::new(Vec::new()),
            submissions: AtomicU32::new(0),
            receipt_queries: AtomicU32::new(0),
        }
    }

    pub fn push_precheck(&self, status: ResponseStatus) -> &Self {
        self.prechecks.lock().push_back(Ok(status));
        self
    }

    pub fn push_precheck_error(&self, err: HederaError) -> &Self {
        self.prechecks.lock().push_back(Err(err));
        self
    }

    pub fn push_receipt(&self, receipt: TransactionReceipt) -> &Self {
        self.receipts.lock().push_back(Ok(receipt));
        self
    }

    pub fn set_fallback_receipt(&self, receipt: TransactionReceipt) -> &Self {
        *self.fallback_receipt.lock() = receipt;
        self
    }

    pub fn submissions(&self) -> u32 {
        self.submissions.load(Ordering::SeqCst)
    }

    pub fn receipt_queries(&self) -> u32 {
        self.receipt_queries.load(Ordering::SeqCst)
    }

    pub fn submitted(&self) -> Vec<(TransactionKind, SignedTransaction)> {
        self.submitted.lock().clone()
    }
}

#[async_trait]
impl Channel for ScriptedNode {
    async fn submit(
        &self,
        kind: TransactionKind,
        transaction: &SignedTransaction,
    ) -> HederaResult<PrecheckResponse> {
        self.submissions.fetch_add(1, Ordering::SeqCst);
        self.submitted.lock().push((kind, transaction.clone()));
        let next = self.prechecks.lock().pop_front();
        next.unwrap_or(Ok(ResponseStatus::Ok))
            .map(PrecheckResponse::new)
    }

    async fn get_receipt(
        &self,
        _transaction_id: &TransactionId,
    ) -> HederaResult<TransactionReceipt> {
        self.receipt_queries.fetch_add(1, Ordering::SeqCst);
        let next = self.receipts.lock().pop_front();
        next.unwrap_or_else(|| Ok(self.fallback_receipt.lock().clone()))
    }
}

/// Hands out the scripted nodes and counts connections.
pub struct ScriptedNetwork {
    nodes: HashMap<AccountId, Arc<ScriptedNode>>,
    connects: AtomicU32,
}

#[async_trait]
impl ChannelFactory for ScriptedNetwork {
    async fn connect(&self, node: &NodeDescriptor) -> HederaResult<Arc<dyn Channel>> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        let channel: Arc<dyn Channel> = self
            .nodes
            .get(&node.account_id)
            .cloned()
            .ok_or_else(|| HederaError::channel(node.account_id, "refused"))?;
        Ok(channel)
    }
}

/// A client wired to scripted nodes `0.0.3`, `0.0.4`, ... with a signed-in
/// operator `0.0.2`.
pub struct Harness {
    pub client: Hedera,
    pub network: Arc<ScriptedNetwork>,
    pub operator_key: Ed25519PrivateKey,
}

impl Harness {
    pub fn new(node_count: u64) -> anyhow::Result<Self> {
        Self::with_retry(node_count, test_retry())
    }

    pub fn with_retry(node_count: u64, retry: RetryConfig) -> anyhow::Result<Self> {
        let descriptors = (0..node_count)
            .map(|i| {
                NodeDescriptor::new(
                    AccountId::from_num(3 + i),
                    &format!("http://127.0.0.1:{}", 50_211 + i),
                )
            })
            .collect::<HederaResult<Vec<_>>>()?;
        let nodes = descriptors
            .iter()
            .map(|d| (d.account_id, Arc::new(ScriptedNode::new())))
            .collect();
        let network = Arc::new(ScriptedNetwork {
            nodes,
            connects: AtomicU32::new(0),
        });

        let config = HederaConfig::custom(descriptors)?
            .with_retry(retry)
            .with_node_cooldown(NODE_COOLDOWN);
        let mut client = Hedera::with_channel_factory(config, network.clone());
        let operator_key = Ed25519PrivateKey::generate();
        client.set_operator(OPERATOR, operator_key.clone());

        Ok(Self {
            client,
            network,
            operator_key,
        })
    }

    pub fn node(&self, num: u64) -> &ScriptedNode {
        &self.network.nodes[&AccountId::from_num(num)]
    }

    pub fn connects(&self) -> u32 {
        self.network.connects.load(Ordering::SeqCst)
    }
}

/// Three retries, fixed 100ms/200ms/400ms backoff.
pub fn test_retry() -> RetryConfig {
    RetryConfig::builder()
        .max_retries(3)
        .initial_backoff(Duration::from_millis(100))
        .max_backoff(Duration::from_secs(1))
        .multiplier(2.0)
        .jitter(false)
        .build()
}

/// Moves 10 tinybars from `0.0.1` to `0.0.2`.
pub fn transfer() -> anyhow::Result<TransferTransaction> {
    let mut txn = TransferTransaction::new();
    txn.add_hbar_transfer(AccountId::from_num(1), Hbar::from_tinybars(-10))?
        .add_hbar_transfer(AccountId::from_num(2), Hbar::from_tinybars(10))?;
    Ok(txn)
}
