use super::{validate_memo, TransactionData, DEFAULT_AUTO_RENEW_PERIOD};
use crate::crypto::Ed25519PublicKey;
use crate::error::{HederaError, HederaResult};
use crate::transaction::lifecycle::Transaction;
use crate::transaction::payload::TransactionPayload;
use crate::types::TopicId;
use std::time::Duration;

/// Largest message accepted in a single submission, in bytes.
pub const MAX_TOPIC_MESSAGE_LENGTH: usize = 1024;

/// Fields of a topic-create transaction.
#[derive(Clone, Debug)]
pub struct TopicCreateData {
    topic_memo: String,
    admin_key: Option<Ed25519PublicKey>,
    submit_key: Option<Ed25519PublicKey>,
    auto_renew_period: Duration,
}

impl Default for TopicCreateData {
    fn default() -> Self {
        Self {
            topic_memo: String::new(),
            admin_key: None,
            submit_key: None,
            auto_renew_period: DEFAULT_AUTO_RENEW_PERIOD,
        }
    }
}

fn key_bytes(key: Option<Ed25519PublicKey>) -> Vec<u8> {
    key.map(|k| k.to_bytes().to_vec()).unwrap_or_default()
}

impl TransactionData for TopicCreateData {
    fn build_payload(&self) -> HederaResult<TransactionPayload> {
        Ok(TransactionPayload::TopicCreate {
            topic_memo: self.topic_memo.clone(),
            admin_key: key_bytes(self.admin_key),
            submit_key: key_bytes(self.submit_key),
            auto_renew_period_secs: self.auto_renew_period.as_secs(),
        })
    }
}

/// Creates a consensus topic. The receipt carries the new topic id.
pub type TopicCreateTransaction = Transaction<TopicCreateData>;

impl Transaction<TopicCreateData> {
    /// Sets the memo stored on the topic.
    pub fn set_topic_memo(&mut self, memo: impl Into<String>) -> HederaResult<&mut Self> {
        let data = self.data_mut()?;
        let memo = memo.into();
        validate_memo("topic_memo", &memo)?;
        data.topic_memo = memo;
        Ok(self)
    }

    /// Sets the key allowed to update and delete the topic.
    pub fn set_admin_key(&mut self, key: Ed25519PublicKey) -> HederaResult<&mut Self> {
        self.data_mut()?.admin_key = Some(key);
        Ok(self)
    }

    /// Restricts message submission to holders of this key.
    pub fn set_submit_key(&mut self, key: Ed25519PublicKey) -> HederaResult<&mut Self> {
        self.data_mut()?.submit_key = Some(key);
        Ok(self)
    }

    /// Sets how often the topic is automatically renewed.
    pub fn set_auto_renew_period(&mut self, period: Duration) -> HederaResult<&mut Self> {
        self.data_mut()?.auto_renew_period = period;
        Ok(self)
    }
}

/// Fields of a topic-message-submit transaction.
#[derive(Clone, Debug, Default)]
pub struct TopicMessageSubmitData {
    topic_id: Option<TopicId>,
    message: Vec<u8>,
}

impl TransactionData for TopicMessageSubmitData {
    fn build_payload(&self) -> HederaResult<TransactionPayload> {
        let topic_id = self
            .topic_id
            .ok_or(HederaError::IncompleteTransaction { field: "topic_id" })?;
        if self.message.is_empty() {
            return Err(HederaError::IncompleteTransaction { field: "message" });
        }
        if self.message.len() > MAX_TOPIC_MESSAGE_LENGTH {
            return Err(HederaError::InvalidTransaction(format!(
                "message is {} bytes, at most {MAX_TOPIC_MESSAGE_LENGTH} allowed",
                self.message.len()
            )));
        }
        Ok(TransactionPayload::TopicMessageSubmit {
            topic_id,
            message: self.message.clone(),
        })
    }
}

/// Submits a message to a consensus topic.
pub type TopicMessageSubmitTransaction = Transaction<TopicMessageSubmitData>;

impl Transaction<TopicMessageSubmitData> {
    /// Sets the target topic. Required.
    pub fn set_topic_id(&mut self, topic_id: TopicId) -> HederaResult<&mut Self> {
        self.data_mut()?.topic_id = Some(topic_id);
        Ok(self)
    }

    /// Sets the message. Required.
    pub fn set_message(&mut self, message: impl Into<Vec<u8>>) -> HederaResult<&mut Self> {
        self.data_mut()?.message = message.into();
        Ok(self)
    }

    /// Returns the message bytes.
    pub fn message(&self) -> &[u8] {
        &self.data.message
    }
}

/// Fields of a topic-delete transaction.
#[derive(Clone, Debug, Default)]
pub struct TopicDeleteData {
    topic_id: Option<TopicId>,
}

impl TransactionData for TopicDeleteData {
    fn build_payload(&self) -> HederaResult<TransactionPayload> {
        let topic_id = self
            .topic_id
            .ok_or(HederaError::IncompleteTransaction { field: "topic_id" })?;
        Ok(TransactionPayload::TopicDelete { topic_id })
    }
}

/// Deletes a consensus topic.
pub type TopicDeleteTransaction = Transaction<TopicDeleteData>;

impl Transaction<TopicDeleteData> {
    /// Sets the topic to delete. Required.
    pub fn set_topic_id(&mut self, topic_id: TopicId) -> HederaResult<&mut Self> {
        self.data_mut()?.topic_id = Some(topic_id);
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::Ed25519PrivateKey;

    #[test]
    fn test_topic_create_has_no_required_fields() {
        let payload = TopicCreateTransaction::new().data().build_payload().unwrap();
        match payload {
            TransactionPayload::TopicCreate {
                admin_key,
                submit_key,
                ..
            } => {
                assert!(admin_key.is_empty());
                assert!(submit_key.is_empty());
            }
            other => panic!("unexpected payload {other:?}"),
        }
    }

    #[test]
    fn test_topic_create_keys() {
        let key = Ed25519PrivateKey::generate().public_key();
        let mut txn = TopicCreateTransaction::new();
        txn.set_admin_key(key).unwrap().set_topic_memo("news").unwrap();
        match txn.data().build_payload().unwrap() {
            TransactionPayload::TopicCreate {
                admin_key,
                topic_memo,
                ..
            } => {
                assert_eq!(admin_key, key.to_bytes().to_vec());
                assert_eq!(topic_memo, "news");
            }
            other => panic!("unexpected payload {other:?}"),
        }
    }

    #[test]
    fn test_message_submit_validation() {
        let mut txn = TopicMessageSubmitTransaction::new();
        assert!(matches!(
            txn.data().build_payload(),
            Err(HederaError::IncompleteTransaction { field: "topic_id" })
        ));
        txn.set_topic_id("0.0.5005".parse().unwrap()).unwrap();
        assert!(matches!(
            txn.data().build_payload(),
            Err(HederaError::IncompleteTransaction { field: "message" })
        ));
        txn.set_message(vec![0u8; MAX_TOPIC_MESSAGE_LENGTH + 1]).unwrap();
        assert!(matches!(
            txn.data().build_payload(),
            Err(HederaError::InvalidTransaction(_))
        ));
        txn.set_message("hello").unwrap();
        assert_eq!(txn.message(), b"hello");
        assert!(txn.data().build_payload().is_ok());
    }

    #[test]
    fn test_topic_delete() {
        let mut txn = TopicDeleteTransaction::new();
        assert!(txn.data().build_payload().is_err());
        txn.set_topic_id(TopicId::from_num(5005)).unwrap();
        assert_eq!(
            txn.data().build_payload().unwrap(),
            TransactionPayload::TopicDelete {
                topic_id: TopicId::from_num(5005)
            }
        );
    }
}
