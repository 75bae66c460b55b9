use crate::status::ResponseStatus;
use crate::types::{AccountId, TokenId, TopicId};
use serde::{Deserialize, Serialize};

/// The finalized outcome of a transaction.
///
/// Only the fields relevant to the transaction's kind are set. A transfer's
/// receipt carries just the status.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionReceipt {
    /// Consensus status.
    pub status: ResponseStatus,
    /// Account created by an account-create transaction.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_id: Option<AccountId>,
    /// Token created by a token-create transaction.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_id: Option<TokenId>,
    /// Topic created by a topic-create transaction.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic_id: Option<TopicId>,
    /// Sequence number assigned to a submitted topic message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic_sequence_number: Option<u64>,
    /// Running hash of the topic after a submitted message.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "hex_opt"
    )]
    pub topic_running_hash: Option<Vec<u8>>,
}

impl TransactionReceipt {
    /// A receipt carrying only a status.
    pub fn new(status: ResponseStatus) -> Self {
        Self {
            status,
            account_id: None,
            token_id: None,
            topic_id: None,
            topic_sequence_number: None,
            topic_running_hash: None,
        }
    }

    /// Sets the created account.
    pub fn with_account_id(mut self, account_id: AccountId) -> Self {
        self.account_id = Some(account_id);
        self
    }

    /// Sets the created token.
    pub fn with_token_id(mut self, token_id: TokenId) -> Self {
        self.token_id = Some(token_id);
        self
    }

    /// Sets the created topic.
    pub fn with_topic_id(mut self, topic_id: TopicId) -> Self {
        self.topic_id = Some(topic_id);
        self
    }

    /// Returns whichever entity the transaction created, if any.
    pub fn created_entity(&self) -> Option<crate::types::EntityId> {
        self.account_id.or(self.token_id).or(self.topic_id)
    }
}

mod hex_opt {
    use serde::{Deserialize, Deserializer, Serializer};

    pub(super) fn serialize<S: Serializer>(bytes: &Option<Vec<u8>>, s: S) -> Result<S::Ok, S::Error> {
        match bytes {
            Some(bytes) => s.serialize_some(&hex::encode(bytes)),
            None => s.serialize_none(),
        }
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Vec<u8>>, D::Error> {
        Option::<String>::deserialize(d)?
            .map(|text| hex::decode(text.trim_start_matches("0x")).map_err(serde::de::Error::custom))
            .transpose()
    }
}
