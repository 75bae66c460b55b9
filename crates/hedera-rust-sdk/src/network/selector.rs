use crate::error::{HederaError, HederaResult};
use crate::network::{Channel, ChannelFactory, NodeDescriptor};
use crate::types::AccountId;
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, warn};

/// The node selector and channel manager.
///
/// Holds the read-only address book plus the only mutable state shared
/// between transactions: the channel cache and the per-node cooldowns. Both
/// are internally locked, so one `Network` can serve any number of concurrent
/// transactions.
///
/// A node that keeps failing is put in cooldown with
/// [`mark_unhealthy`](Self::mark_unhealthy). [`pick`](Self::pick) skips it
/// until the cooldown expires. Already frozen transactions keep their
/// designated node; the selector never redirects them.
pub struct Network {
    nodes: Vec<NodeDescriptor>,
    factory: Arc<dyn ChannelFactory>,
    cooldown: Duration,
    channels: RwLock<HashMap<AccountId, Arc<dyn Channel>>>,
    // One connect in flight per node.
    connecting: HashMap<AccountId, tokio::sync::Mutex<()>>,
    unhealthy_until: Mutex<HashMap<AccountId, Instant>>,
    cursor: AtomicUsize,
}

impl Network {
    /// Creates a selector over `nodes`.
    pub fn new(
        nodes: Vec<NodeDescriptor>,
        factory: Arc<dyn ChannelFactory>,
        cooldown: Duration,
    ) -> Self {
        let connecting = nodes
            .iter()
            .map(|n| (n.account_id, tokio::sync::Mutex::new(())))
            .collect();
        Self {
            nodes,
            factory,
            cooldown,
            channels: RwLock::new(HashMap::new()),
            connecting,
            unhealthy_until: Mutex::new(HashMap::new()),
            cursor: AtomicUsize::new(0),
        }
    }

    /// Returns the address book.
    pub fn nodes(&self) -> &[NodeDescriptor] {
        &self.nodes
    }

    /// Looks up a node by account id.
    pub fn node(&self, account_id: AccountId) -> Option<&NodeDescriptor> {
        self.nodes.iter().find(|n| n.account_id == account_id)
    }

    /// Chooses the node a transaction will be frozen against.
    ///
    /// A healthy `hint` is returned as is. Without one, nodes are taken in
    /// address-book order, round robin, skipping any in cooldown.
    ///
    /// # Errors
    ///
    /// [`HederaError::UnknownNode`] for a hint outside the address book and
    /// [`HederaError::NoHealthyNodes`] when every node is cooling down.
    pub fn pick(&self, hint: Option<AccountId>) -> HederaResult<AccountId> {
        if let Some(hint) = hint {
            if self.node(hint).is_none() {
                return Err(HederaError::UnknownNode(hint));
            }
            if self.is_healthy(hint) {
                return Ok(hint);
            }
            debug!(node = %hint, "preferred node is cooling down, picking another");
        }

        if self.nodes.is_empty() {
            return Err(HederaError::NoHealthyNodes);
        }
        let start = self.cursor.fetch_add(1, Ordering::Relaxed);
        (0..self.nodes.len())
            .map(|offset| self.nodes[(start + offset) % self.nodes.len()].account_id)
            .find(|node| self.is_healthy(*node))
            .ok_or(HederaError::NoHealthyNodes)
    }

    /// Returns the channel to `node`, connecting on first use.
    ///
    /// Later calls reuse the cached channel until the node is evicted.
    /// Concurrent first calls for one node wait for a single connect.
    pub async fn channel_for(&self, node: AccountId) -> HederaResult<Arc<dyn Channel>> {
        if let Some(channel) = self.cached_channel(node) {
            return Ok(channel);
        }

        let descriptor = self.node(node).ok_or(HederaError::UnknownNode(node))?;
        let _connecting = match self.connecting.get(&node) {
            Some(lock) => lock.lock().await,
            None => return Err(HederaError::UnknownNode(node)),
        };
        if let Some(channel) = self.cached_channel(node) {
            return Ok(channel);
        }

        let channel = self.factory.connect(descriptor).await?;
        debug!(node = %node, endpoint = %descriptor.endpoint, "channel opened");
        self.channels.write().insert(node, channel.clone());
        Ok(channel)
    }

    fn cached_channel(&self, node: AccountId) -> Option<Arc<dyn Channel>> {
        self.channels.read().get(&node).cloned()
    }

    /// Puts `node` in cooldown and drops its channel.
    pub fn mark_unhealthy(&self, node: AccountId) {
        let until = Instant::now() + self.cooldown;
        self.unhealthy_until.lock().insert(node, until);
        self.evict(node);
        warn!(
            node = %node,
            cooldown_ms = self.cooldown.as_millis() as u64,
            "node marked unhealthy"
        );
    }

    /// True unless `node` is in cooldown.
    pub fn is_healthy(&self, node: AccountId) -> bool {
        let mut unhealthy = self.unhealthy_until.lock();
        match unhealthy.get(&node) {
            Some(until) if Instant::now() < *until => false,
            Some(_) => {
                unhealthy.remove(&node);
                true
            }
            None => true,
        }
    }

    /// Drops the cached channel to `node`. Returns whether one was cached.
    pub fn evict(&self, node: AccountId) -> bool {
        self.channels.write().remove(&node).is_some()
    }

    /// Returns the nodes not in cooldown, in address-book order.
    pub fn healthy_nodes(&self) -> Vec<AccountId> {
        self.nodes
            .iter()
            .map(|n| n.account_id)
            .filter(|node| self.is_healthy(*node))
            .collect()
    }
}

impl fmt::Debug for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Network")
            .field("nodes", &self.nodes)
            .field("cooldown", &self.cooldown)
            .field("open_channels", &self.channels.read().len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::PrecheckResponse;
    use crate::status::ResponseStatus;
    use crate::transaction::{SignedTransaction, TransactionKind, TransactionReceipt};
    use crate::types::TransactionId;
    use async_trait::async_trait;
    use std::sync::atomic::AtomicU32;

    struct NullChannel;

    #[async_trait]
    impl Channel for NullChannel {
        async fn submit(
            &self,
            _kind: TransactionKind,
            _transaction: &SignedTransaction,
        ) -> HederaResult<PrecheckResponse> {
            Ok(PrecheckResponse::new(ResponseStatus::Ok))
        }

        async fn get_receipt(&self, _id: &TransactionId) -> HederaResult<TransactionReceipt> {
            Ok(TransactionReceipt::new(ResponseStatus::Success))
        }
    }

    #[derive(Default)]
    struct CountingFactory {
        connects: AtomicU32,
    }

    #[async_trait]
    impl ChannelFactory for CountingFactory {
        async fn connect(&self, _node: &NodeDescriptor) -> HederaResult<Arc<dyn Channel>> {
            self.connects.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(5)).await;
            Ok(Arc::new(NullChannel))
        }
    }

    fn network(factory: Arc<CountingFactory>) -> Network {
        let nodes = (3..=5)
            .map(|num| {
                NodeDescriptor::new(
                    AccountId::from_num(num),
                    &format!("http://127.0.0.1:{}", 50_208 + num),
                )
                .unwrap()
            })
            .collect();
        Network::new(nodes, factory, Duration::from_secs(10))
    }

    #[test]
    fn test_pick_round_robin() {
        let network = network(Arc::default());
        let picked: Vec<_> = (0..4).map(|_| network.pick(None).unwrap().num).collect();
        assert_eq!(picked, vec![3, 4, 5, 3]);
    }

    #[test]
    fn test_pick_honours_hint() {
        let network = network(Arc::default());
        assert_eq!(
            network.pick(Some(AccountId::from_num(5))).unwrap(),
            AccountId::from_num(5)
        );
        assert!(matches!(
            network.pick(Some(AccountId::from_num(99))),
            Err(HederaError::UnknownNode(_))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_unhealthy_node_skipped_until_cooldown_expires() {
        let network = network(Arc::default());
        let node4 = AccountId::from_num(4);
        network.mark_unhealthy(node4);

        assert!(!network.is_healthy(node4));
        assert_eq!(network.healthy_nodes().len(), 2);
        for _ in 0..6 {
            assert_ne!(network.pick(None).unwrap(), node4);
        }
        assert_ne!(network.pick(Some(node4)).unwrap(), node4);

        tokio::time::advance(Duration::from_secs(11)).await;
        assert!(network.is_healthy(node4));
        assert_eq!(network.pick(Some(node4)).unwrap(), node4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_healthy_nodes() {
        let network = network(Arc::default());
        for num in 3..=5 {
            network.mark_unhealthy(AccountId::from_num(num));
        }
        assert!(matches!(network.pick(None), Err(HederaError::NoHealthyNodes)));
    }

    #[tokio::test]
    async fn test_channel_is_cached_and_evicted() {
        let factory = Arc::new(CountingFactory::default());
        let network = network(factory.clone());
        let node = AccountId::from_num(3);

        let a = network.channel_for(node).await.unwrap();
        let b = network.channel_for(node).await.unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(factory.connects.load(Ordering::SeqCst), 1);

        assert!(network.evict(node));
        assert!(!network.evict(node));
        network.channel_for(node).await.unwrap();
        assert_eq!(factory.connects.load(Ordering::SeqCst), 2);

        assert!(matches!(
            network.channel_for(AccountId::from_num(42)).await,
            Err(HederaError::UnknownNode(_))
        ));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_channel_requests_share_one_channel() {
        let factory = Arc::new(CountingFactory::default());
        let network = Arc::new(network(factory.clone()));

        let handles: Vec<_> = (0..32)
            .map(|_| {
                let network = network.clone();
                tokio::spawn(async move { network.channel_for(AccountId::from_num(3)).await })
            })
            .collect();

        let mut channels = Vec::new();
        for handle in handles {
            channels.push(handle.await.unwrap().unwrap());
        }
        let first = &channels[0];
        assert!(channels.iter().all(|c| Arc::ptr_eq(c, first)));
        assert_eq!(factory.connects.load(Ordering::SeqCst), 1);
    }
}
