use super::TransactionData;
use crate::error::{HederaError, HederaResult};
use crate::transaction::lifecycle::Transaction;
use crate::transaction::payload::TransactionPayload;
use crate::types::{AccountId, Hbar, TokenId};

/// Default fee ceiling of a token association (5 hbar).
pub const TOKEN_ASSOCIATE_DEFAULT_FEE: Hbar = Hbar::new(5);

/// Fields of a token-associate transaction.
#[derive(Clone, Debug, Default)]
pub struct TokenAssociateData {
    account_id: Option<AccountId>,
    token_ids: Vec<TokenId>,
}

impl TransactionData for TokenAssociateData {
    fn build_payload(&self) -> HederaResult<TransactionPayload> {
        let account_id = self
            .account_id
            .ok_or(HederaError::IncompleteTransaction { field: "account_id" })?;
        if self.token_ids.is_empty() {
            return Err(HederaError::IncompleteTransaction { field: "token_ids" });
        }
        for (i, token_id) in self.token_ids.iter().enumerate() {
            if self.token_ids[..i].contains(token_id) {
                return Err(HederaError::InvalidTransaction(format!(
                    "token {token_id} listed more than once"
                )));
            }
        }
        Ok(TransactionPayload::TokenAssociate {
            account_id,
            token_ids: self.token_ids.clone(),
        })
    }

    fn default_max_transaction_fee(&self) -> Option<Hbar> {
        Some(TOKEN_ASSOCIATE_DEFAULT_FEE)
    }
}

/// Associates an account with one or more tokens.
pub type TokenAssociateTransaction = Transaction<TokenAssociateData>;

impl Transaction<TokenAssociateData> {
    /// Sets the account to associate. Required.
    pub fn set_account_id(&mut self, account_id: AccountId) -> HederaResult<&mut Self> {
        self.data_mut()?.account_id = Some(account_id);
        Ok(self)
    }

    /// Replaces the token list. At least one token is required.
    pub fn set_token_ids(&mut self, token_ids: Vec<TokenId>) -> HederaResult<&mut Self> {
        self.data_mut()?.token_ids = token_ids;
        Ok(self)
    }

    /// Appends a token to the list.
    pub fn add_token_id(&mut self, token_id: TokenId) -> HederaResult<&mut Self> {
        self.data_mut()?.token_ids.push(token_id);
        Ok(self)
    }

    /// Returns the account to associate.
    pub fn account_id(&self) -> Option<AccountId> {
        self.data.account_id
    }

    /// Returns the tokens.
    pub fn token_ids(&self) -> &[TokenId] {
        &self.data.token_ids
    }
}

/// Fields of a token-delete transaction.
#[derive(Clone, Debug, Default)]
pub struct TokenDeleteData {
    token_id: Option<TokenId>,
}

impl TransactionData for TokenDeleteData {
    fn build_payload(&self) -> HederaResult<TransactionPayload> {
        let token_id = self
            .token_id
            .ok_or(HederaError::IncompleteTransaction { field: "token_id" })?;
        Ok(TransactionPayload::TokenDelete { token_id })
    }
}

/// Deletes a token.
pub type TokenDeleteTransaction = Transaction<TokenDeleteData>;

impl Transaction<TokenDeleteData> {
    /// Sets the token to delete. Required.
    pub fn set_token_id(&mut self, token_id: TokenId) -> HederaResult<&mut Self> {
        self.data_mut()?.token_id = Some(token_id);
        Ok(self)
    }

    /// Returns the token to delete.
    pub fn token_id(&self) -> Option<TokenId> {
        self.data.token_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_associate_requires_account_and_tokens() {
        let mut txn = TokenAssociateTransaction::new();
        assert!(matches!(
            txn.data().build_payload(),
            Err(HederaError::IncompleteTransaction { field: "account_id" })
        ));

        txn.set_account_id(AccountId::from_num(2)).unwrap();
        assert!(matches!(
            txn.data().build_payload(),
            Err(HederaError::IncompleteTransaction { field: "token_ids" })
        ));

        txn.add_token_id(TokenId::from_num(1001))
            .unwrap()
            .add_token_id(TokenId::from_num(1002))
            .unwrap();
        let payload = txn.data().build_payload().unwrap();
        assert_eq!(
            payload,
            TransactionPayload::TokenAssociate {
                account_id: AccountId::from_num(2),
                token_ids: vec![TokenId::from_num(1001), TokenId::from_num(1002)],
            }
        );
    }

    #[test]
    fn test_associate_default_fee() {
        let txn = TokenAssociateTransaction::new();
        assert_eq!(
            txn.data().default_max_transaction_fee(),
            Some(Hbar::from_tinybars(500_000_000))
        );
    }

    #[test]
    fn test_associate_rejects_duplicate_tokens() {
        let mut txn = TokenAssociateTransaction::new();
        txn.set_account_id(AccountId::from_num(2))
            .unwrap()
            .set_token_ids(vec![TokenId::from_num(7), TokenId::from_num(7)])
            .unwrap();
        assert!(matches!(
            txn.data().build_payload(),
            Err(HederaError::InvalidTransaction(_))
        ));
    }

    #[test]
    fn test_delete_requires_token() {
        let mut txn = TokenDeleteTransaction::new();
        assert!(txn.data().build_payload().is_err());
        txn.set_token_id(TokenId::from_num(9)).unwrap();
        assert_eq!(txn.token_id(), Some(TokenId::from_num(9)));
        assert!(txn.data().build_payload().is_ok());
    }
}
