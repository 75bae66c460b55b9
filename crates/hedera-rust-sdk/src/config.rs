//! Client configuration.
//!
//! [`HederaConfig`] carries the node address book together with every knob
//! the engine reads at run time: request timeout, submission retry, receipt
//! polling, node cooldown and transaction defaults. It is read-only once the
//! client has been built.

use crate::error::{HederaError, HederaResult};
use crate::network::NodeDescriptor;
use crate::poller::PollConfig;
use crate::retry::RetryConfig;
use crate::types::{AccountId, Hbar};
use std::time::Duration;

/// Configuration for HTTP connection pooling.
///
/// Controls how connections to node gateways are reused across requests.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Maximum number of idle connections per host.
    /// Default: unlimited (no limit)
    pub max_idle_per_host: Option<usize>,
    /// How long to keep idle connections alive.
    /// Default: 90 seconds
    pub idle_timeout: Duration,
    /// Whether to enable TCP keepalive.
    /// Default: 60 seconds
    pub tcp_keepalive: Option<Duration>,
    /// Whether to enable TCP nodelay (disable Nagle's algorithm).
    /// Default: true
    pub tcp_nodelay: bool,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_idle_per_host: None,
            idle_timeout: Duration::from_secs(90),
            tcp_keepalive: Some(Duration::from_secs(60)),
            tcp_nodelay: true,
        }
    }
}

impl PoolConfig {
    /// Creates a configuration optimized for high-throughput scenarios.
    pub fn high_throughput() -> Self {
        Self {
            max_idle_per_host: Some(32),
            idle_timeout: Duration::from_secs(300),
            tcp_keepalive: Some(Duration::from_secs(30)),
            tcp_nodelay: true,
        }
    }

    /// Creates a configuration optimized for low-latency scenarios.
    pub fn low_latency() -> Self {
        Self {
            max_idle_per_host: Some(8),
            idle_timeout: Duration::from_secs(30),
            tcp_keepalive: Some(Duration::from_secs(15)),
            tcp_nodelay: true,
        }
    }
}

/// Known ledger networks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LedgerNetwork {
    /// Production network
    Mainnet,
    /// Public test network
    Testnet,
    /// Preview network, runs release candidates
    Previewnet,
    /// Single-node local network
    Local,
    /// Caller-supplied address book
    Custom,
}

impl LedgerNetwork {
    /// Returns the network name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            LedgerNetwork::Mainnet => "mainnet",
            LedgerNetwork::Testnet => "testnet",
            LedgerNetwork::Previewnet => "previewnet",
            LedgerNetwork::Local => "local",
            LedgerNetwork::Custom => "custom",
        }
    }
}

/// Configuration for the [`Hedera`](crate::Hedera) client.
///
/// # Example
///
/// ```rust
/// use hedera_rust_sdk::HederaConfig;
/// use hedera_rust_sdk::retry::RetryConfig;
/// use hedera_rust_sdk::types::Hbar;
/// use std::time::Duration;
///
/// let config = HederaConfig::testnet()
///     .with_timeout(Duration::from_secs(5))
///     .with_retry(RetryConfig::aggressive())
///     .with_receipt_timeout(Duration::from_secs(30))
///     .with_default_max_transaction_fee(Hbar::new(5));
///
/// assert_eq!(config.nodes().len(), 4);
/// ```
#[derive(Debug, Clone)]
pub struct HederaConfig {
    pub(crate) network: LedgerNetwork,
    pub(crate) nodes: Vec<NodeDescriptor>,
    pub(crate) timeout: Duration,
    pub(crate) retry_config: RetryConfig,
    pub(crate) poll_config: PollConfig,
    pub(crate) node_cooldown: Duration,
    pub(crate) default_max_transaction_fee: Hbar,
    pub(crate) transaction_valid_duration: Duration,
    pub(crate) pool_config: PoolConfig,
}

/// Default per-request timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
/// Default time an unhealthy node is excluded from selection.
pub const DEFAULT_NODE_COOLDOWN: Duration = Duration::from_secs(30);
/// Default validity window of a transaction.
pub const DEFAULT_TRANSACTION_VALID_DURATION: Duration = Duration::from_secs(120);
/// Default fee ceiling for kinds without their own default.
pub const DEFAULT_MAX_TRANSACTION_FEE: Hbar = Hbar::new(2);

fn preset_node(num: u64, endpoint: &str) -> NodeDescriptor {
    NodeDescriptor::new(AccountId::from_num(num), endpoint).expect("valid preset node URL")
}

impl HederaConfig {
    fn with_nodes(network: LedgerNetwork, nodes: Vec<NodeDescriptor>) -> Self {
        Self {
            network,
            nodes,
            timeout: DEFAULT_REQUEST_TIMEOUT,
            retry_config: RetryConfig::default(),
            poll_config: PollConfig::default(),
            node_cooldown: DEFAULT_NODE_COOLDOWN,
            default_max_transaction_fee: DEFAULT_MAX_TRANSACTION_FEE,
            transaction_valid_duration: DEFAULT_TRANSACTION_VALID_DURATION,
            pool_config: PoolConfig::default(),
        }
    }

    /// Creates a configuration for mainnet.
    pub fn mainnet() -> Self {
        let nodes = vec![
            preset_node(3, "https://node00.swirldslabs.com:50212"),
            preset_node(4, "https://node01.swirldslabs.com:50212"),
            preset_node(5, "https://node02.swirldslabs.com:50212"),
            preset_node(6, "https://node03.swirldslabs.com:50212"),
        ];
        Self {
            retry_config: RetryConfig::conservative(),
            ..Self::with_nodes(LedgerNetwork::Mainnet, nodes)
        }
    }

    /// Creates a configuration for testnet.
    ///
    /// # Example
    ///
    /// ```rust
    /// use hedera_rust_sdk::HederaConfig;
    ///
    /// let config = HederaConfig::testnet();
    /// assert_eq!(config.nodes()[0].account_id.to_string(), "0.0.3");
    /// ```
    pub fn testnet() -> Self {
        let nodes = vec![
            preset_node(3, "https://0.testnet.hedera.com:50212"),
            preset_node(4, "https://1.testnet.hedera.com:50212"),
            preset_node(5, "https://2.testnet.hedera.com:50212"),
            preset_node(6, "https://3.testnet.hedera.com:50212"),
        ];
        Self::with_nodes(LedgerNetwork::Testnet, nodes)
    }

    /// Creates a configuration for previewnet.
    pub fn previewnet() -> Self {
        let nodes = vec![
            preset_node(3, "https://0.previewnet.hedera.com:50212"),
            preset_node(4, "https://1.previewnet.hedera.com:50212"),
            preset_node(5, "https://2.previewnet.hedera.com:50212"),
        ];
        Self::with_nodes(LedgerNetwork::Previewnet, nodes)
    }

    /// Creates a configuration for a single local node at `127.0.0.1:50211`.
    pub fn local() -> Self {
        Self {
            retry_config: RetryConfig::aggressive(),
            pool_config: PoolConfig::low_latency(),
            node_cooldown: Duration::from_secs(5),
            ..Self::with_nodes(
                LedgerNetwork::Local,
                vec![preset_node(3, "http://127.0.0.1:50211")],
            )
        }
    }

    /// Creates a configuration from a caller-supplied address book.
    ///
    /// # Errors
    ///
    /// Fails if `nodes` is empty or names the same node account twice.
    pub fn custom(nodes: Vec<NodeDescriptor>) -> HederaResult<Self> {
        if nodes.is_empty() {
            return Err(HederaError::Config(
                "address book must contain at least one node".into(),
            ));
        }
        for (i, node) in nodes.iter().enumerate() {
            if nodes[..i].iter().any(|n| n.account_id == node.account_id) {
                return Err(HederaError::Config(format!(
                    "node {} listed more than once",
                    node.account_id
                )));
            }
        }
        Ok(Self::with_nodes(LedgerNetwork::Custom, nodes))
    }

    /// Sets the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the retry configuration for submissions.
    pub fn with_retry(mut self, retry_config: RetryConfig) -> Self {
        self.retry_config = retry_config;
        self
    }

    /// Disables submission retry.
    ///
    /// This is equivalent to `with_retry(RetryConfig::no_retry())`.
    pub fn without_retry(mut self) -> Self {
        self.retry_config = RetryConfig::no_retry();
        self
    }

    /// Sets the maximum number of submission retries, keeping the other
    /// backoff settings.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.retry_config.max_retries = max_retries;
        self
    }

    /// Sets the receipt polling configuration.
    pub fn with_poll(mut self, poll_config: PollConfig) -> Self {
        self.poll_config = poll_config;
        self
    }

    /// Sets how long `execute` waits for a receipt by default.
    pub fn with_receipt_timeout(mut self, timeout: Duration) -> Self {
        self.poll_config.default_timeout = timeout;
        self
    }

    /// Sets how long a failing node is excluded from selection.
    pub fn with_node_cooldown(mut self, cooldown: Duration) -> Self {
        self.node_cooldown = cooldown;
        self
    }

    /// Sets the fee ceiling used when neither the transaction nor its kind
    /// provides one.
    pub fn with_default_max_transaction_fee(mut self, fee: Hbar) -> Self {
        self.default_max_transaction_fee = fee;
        self
    }

    /// Sets the default validity window of new transactions.
    pub fn with_transaction_valid_duration(mut self, duration: Duration) -> Self {
        self.transaction_valid_duration = duration;
        self
    }

    /// Sets the connection pool configuration.
    pub fn with_pool(mut self, pool_config: PoolConfig) -> Self {
        self.pool_config = pool_config;
        self
    }

    /// Returns the network this config is for.
    pub fn network(&self) -> LedgerNetwork {
        self.network
    }

    /// Returns the node address book.
    pub fn nodes(&self) -> &[NodeDescriptor] {
        &self.nodes
    }

    /// Returns the per-request timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Returns the submission retry configuration.
    pub fn retry_config(&self) -> &RetryConfig {
        &self.retry_config
    }

    /// Returns the receipt polling configuration.
    pub fn poll_config(&self) -> &PollConfig {
        &self.poll_config
    }

    /// Returns the node cooldown window.
    pub fn node_cooldown(&self) -> Duration {
        self.node_cooldown
    }

    /// Returns the default fee ceiling.
    pub fn default_max_transaction_fee(&self) -> Hbar {
        self.default_max_transaction_fee
    }

    /// Returns the default transaction validity window.
    pub fn transaction_valid_duration(&self) -> Duration {
        self.transaction_valid_duration
    }

    /// Returns the connection pool configuration.
    pub fn pool_config(&self) -> &PoolConfig {
        &self.pool_config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets() {
        let testnet = HederaConfig::testnet();
        assert_eq!(testnet.network(), LedgerNetwork::Testnet);
        assert_eq!(testnet.nodes().len(), 4);
        assert!(testnet.nodes()[0].endpoint.as_str().contains("testnet"));

        let mainnet = HederaConfig::mainnet();
        assert_eq!(mainnet.network().as_str(), "mainnet");
        assert_eq!(
            mainnet.retry_config().initial_backoff,
            Duration::from_secs(1)
        );

        let local = HederaConfig::local();
        assert_eq!(local.nodes().len(), 1);
        assert_eq!(local.nodes()[0].account_id, AccountId::from_num(3));
        assert_eq!(local.retry_config().max_retries, 6);

        assert_eq!(HederaConfig::previewnet().nodes().len(), 3);
    }

    #[test]
    fn test_defaults() {
        let config = HederaConfig::testnet();
        assert_eq!(config.timeout(), DEFAULT_REQUEST_TIMEOUT);
        assert_eq!(config.default_max_transaction_fee(), Hbar::new(2));
        assert_eq!(config.transaction_valid_duration(), Duration::from_secs(120));
        assert_eq!(config.poll_config().default_timeout, Duration::from_secs(60));
    }

    #[test]
    fn test_custom_config() {
        let nodes = vec![
            NodeDescriptor::new(AccountId::from_num(3), "http://localhost:9000").unwrap(),
            NodeDescriptor::new(AccountId::from_num(4), "http://localhost:9001").unwrap(),
        ];
        let config = HederaConfig::custom(nodes).unwrap();
        assert_eq!(config.network(), LedgerNetwork::Custom);
        assert_eq!(config.nodes().len(), 2);

        assert!(matches!(
            HederaConfig::custom(vec![]),
            Err(HederaError::Config(_))
        ));

        let duplicate = vec![
            NodeDescriptor::new(AccountId::from_num(3), "http://localhost:9000").unwrap(),
            NodeDescriptor::new(AccountId::from_num(3), "http://localhost:9001").unwrap(),
        ];
        assert!(HederaConfig::custom(duplicate).is_err());
    }

    #[test]
    fn test_builder_methods() {
        let config = HederaConfig::testnet()
            .with_timeout(Duration::from_secs(3))
            .with_max_retries(7)
            .with_receipt_timeout(Duration::from_secs(15))
            .with_node_cooldown(Duration::from_secs(1))
            .with_transaction_valid_duration(Duration::from_secs(60))
            .with_pool(PoolConfig::high_throughput());

        assert_eq!(config.timeout(), Duration::from_secs(3));
        assert_eq!(config.retry_config().max_retries, 7);
        assert_eq!(config.poll_config().default_timeout, Duration::from_secs(15));
        assert_eq!(config.node_cooldown(), Duration::from_secs(1));
        assert_eq!(config.transaction_valid_duration(), Duration::from_secs(60));
        assert_eq!(config.pool_config().max_idle_per_host, Some(32));

        assert_eq!(HederaConfig::testnet().without_retry().retry_config().max_retries, 0);
    }

    #[test]
    fn test_invalid_node_url() {
        assert!(matches!(
            NodeDescriptor::new(AccountId::from_num(3), "not a url"),
            Err(HederaError::Url(_))
        ));
    }
}
