//! Receipt polling.
//!
//! After a node accepts a transaction at precheck, its outcome becomes
//! available some time later. [`ReceiptPoller`] asks for the receipt until it
//! reports a final status or the caller's deadline passes.
//!
//! Each wait between queries grows geometrically from
//! [`PollConfig::initial_interval`] up to [`PollConfig::max_interval`] and is
//! clamped to the time left, so a poll never overshoots its deadline.

use crate::error::{HederaError, HederaResult};
use crate::network::Network;
use crate::status::{ResponseStatus, StatusClass};
use crate::transaction::TransactionReceipt;
use crate::types::{AccountId, TransactionId};
use parking_lot::RwLock;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep, timeout_at, Instant};
use tracing::{debug, info, warn};

/// Configuration for receipt polling.
#[derive(Debug, Clone)]
pub struct PollConfig {
    /// Wait before the second query.
    pub initial_interval: Duration,
    /// Upper bound on any single wait.
    pub max_interval: Duration,
    /// Factor applied to the wait after each query.
    pub multiplier: f64,
    /// Overall budget used when the caller does not pass one.
    pub default_timeout: Duration,
    /// Final receipts kept for repeat lookups. The oldest is dropped first.
    pub cache_capacity: usize,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            initial_interval: Duration::from_millis(250),
            max_interval: Duration::from_secs(2),
            multiplier: 2.0,
            default_timeout: Duration::from_secs(60),
            cache_capacity: 4_096,
        }
    }
}

impl PollConfig {
    /// A fixed interval between queries.
    pub fn fixed(interval: Duration, default_timeout: Duration) -> Self {
        Self {
            initial_interval: interval,
            max_interval: interval,
            multiplier: 1.0,
            default_timeout,
            ..Self::default()
        }
    }

    /// The wait that follows a wait of `current`.
    fn next_interval(&self, current: Duration) -> Duration {
        current.mul_f64(self.multiplier.max(1.0)).min(self.max_interval)
    }
}

/// Final receipts in insertion order, bounded by a capacity.
#[derive(Debug, Default)]
struct ReceiptCache {
    receipts: HashMap<TransactionId, TransactionReceipt>,
    order: VecDeque<TransactionId>,
}

impl ReceiptCache {
    fn insert(
        &mut self,
        transaction_id: TransactionId,
        receipt: TransactionReceipt,
        capacity: usize,
    ) {
        if capacity == 0 {
            return;
        }
        if self.receipts.insert(transaction_id, receipt).is_none() {
            self.order.push_back(transaction_id);
        }
        while self.order.len() > capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.receipts.remove(&oldest);
            }
        }
    }

    fn clear(&mut self) {
        self.receipts.clear();
        self.order.clear();
    }
}

/// Queries receipts and caches final ones.
#[derive(Debug)]
pub struct ReceiptPoller {
    network: Arc<Network>,
    config: PollConfig,
    cache: RwLock<ReceiptCache>,
}

impl ReceiptPoller {
    /// Creates a poller querying nodes of `network`.
    pub fn new(network: Arc<Network>, config: PollConfig) -> Self {
        Self {
            network,
            config,
            cache: RwLock::new(ReceiptCache::default()),
        }
    }

    /// Returns the polling configuration.
    pub fn config(&self) -> &PollConfig {
        &self.config
    }

    /// Returns the cached final receipt of `transaction_id`, if any.
    pub fn cached(&self, transaction_id: &TransactionId) -> Option<TransactionReceipt> {
        self.cache.read().receipts.get(transaction_id).cloned()
    }

    /// Drops every cached receipt.
    pub fn clear_cache(&self) {
        self.cache.write().clear();
    }

    /// Waits for the receipt of `transaction_id` for at most `timeout`.
    ///
    /// Queries go to `node_hint` while it is healthy, otherwise to any
    /// healthy node. A `Success` receipt is returned at once. `Busy`,
    /// `Unknown` and transient transport errors lead to another query after a
    /// backoff. Any other status stops polling.
    ///
    /// # Errors
    ///
    /// * [`HederaError::ReceiptFailed`] with the final status.
    /// * [`HederaError::ReceiptNotFound`] if the network has no record of the id.
    /// * [`HederaError::ReceiptTimeout`] once `timeout` has elapsed.
    pub async fn await_receipt(
        &self,
        node_hint: Option<AccountId>,
        transaction_id: &TransactionId,
        timeout: Duration,
    ) -> HederaResult<TransactionReceipt> {
        if let Some(receipt) = self.cached(transaction_id) {
            debug!(transaction_id = %transaction_id, "receipt served from cache");
            return Self::finish(transaction_id, receipt);
        }

        let deadline = Instant::now() + timeout;
        let timed_out = || HederaError::ReceiptTimeout {
            transaction_id: *transaction_id,
            timeout,
        };
        let mut interval = self.config.initial_interval;
        let mut attempt: u32 = 0;

        loop {
            attempt += 1;
            match timeout_at(deadline, self.query(node_hint, transaction_id)).await {
                Err(_) => return Err(timed_out()),
                Ok(Ok(receipt)) => match receipt.status.class() {
                    StatusClass::Retryable => {
                        debug!(
                            transaction_id = %transaction_id,
                            status = %receipt.status,
                            attempt,
                            "receipt not final yet"
                        );
                    }
                    _ => {
                        if receipt.status != ResponseStatus::ReceiptNotFound {
                            self.cache.write().insert(
                                *transaction_id,
                                receipt.clone(),
                                self.config.cache_capacity,
                            );
                        }
                        return Self::finish(transaction_id, receipt);
                    }
                },
                Ok(Err(err)) if err.is_retryable() || matches!(err, HederaError::NoHealthyNodes) => {
                    warn!(
                        transaction_id = %transaction_id,
                        attempt,
                        error = %err.sanitized_message(),
                        "receipt query failed, will retry"
                    );
                }
                Ok(Err(err)) => return Err(err),
            }

            let now = Instant::now();
            if now >= deadline {
                return Err(timed_out());
            }
            sleep(interval.min(deadline - now)).await;
            if Instant::now() >= deadline {
                return Err(timed_out());
            }
            interval = self.config.next_interval(interval);
        }
    }

    async fn query(
        &self,
        node_hint: Option<AccountId>,
        transaction_id: &TransactionId,
    ) -> HederaResult<TransactionReceipt> {
        let node = match node_hint {
            Some(node) if self.network.is_healthy(node) => node,
            _ => self.network.pick(None)?,
        };
        let channel = self.network.channel_for(node).await?;
        channel.get_receipt(transaction_id).await
    }

    fn finish(
        transaction_id: &TransactionId,
        receipt: TransactionReceipt,
    ) -> HederaResult<TransactionReceipt> {
        match receipt.status.class() {
            StatusClass::Success => {
                info!(
                    transaction_id = %transaction_id,
                    status = %receipt.status,
                    "transaction reached consensus"
                );
                Ok(receipt)
            }
            _ if receipt.status == ResponseStatus::ReceiptNotFound => {
                Err(HederaError::ReceiptNotFound {
                    transaction_id: *transaction_id,
                })
            }
            _ => {
                warn!(
                    transaction_id = %transaction_id,
                    status = %receipt.status,
                    "transaction failed at consensus"
                );
                Err(HederaError::ReceiptFailed {
                    status: receipt.status,
                    transaction_id: *transaction_id,
                })
            }
        }
    }
}
