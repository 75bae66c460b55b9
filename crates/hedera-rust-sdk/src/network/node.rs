use crate::error::HederaResult;
use crate::types::AccountId;
use std::fmt;
use url::Url;

/// A consensus node in the address book: its account id and where to reach it.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct NodeDescriptor {
    /// The node's account id; transactions name it as their designated node.
    pub account_id: AccountId,
    /// Base URL of the node's gateway.
    pub endpoint: Url,
}

impl NodeDescriptor {
    /// Creates a descriptor, parsing `endpoint`.
    pub fn new(account_id: AccountId, endpoint: &str) -> HederaResult<Self> {
        Ok(Self {
            account_id,
            endpoint: Url::parse(endpoint)?,
        })
    }
}

impl fmt::Debug for NodeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeDescriptor({} @ {})", self.account_id, self.endpoint)
    }
}
