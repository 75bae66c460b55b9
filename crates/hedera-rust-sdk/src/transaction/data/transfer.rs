use super::TransactionData;
use crate::error::{HederaError, HederaResult};
use crate::transaction::lifecycle::Transaction;
use crate::transaction::payload::{HbarTransfer, TokenTransfer, TransactionPayload};
use crate::types::{AccountId, Hbar, TokenId};
use std::collections::BTreeMap;

/// Fields of a transfer transaction.
///
/// Adjustments to the same account (and token) are merged, keeping the order
/// in which accounts were first added.
#[derive(Clone, Debug, Default)]
pub struct TransferData {
    hbar_transfers: Vec<HbarTransfer>,
    token_transfers: Vec<TokenTransfer>,
}

impl TransactionData for TransferData {
    fn build_payload(&self) -> HederaResult<TransactionPayload> {
        if self.hbar_transfers.is_empty() && self.token_transfers.is_empty() {
            return Err(HederaError::IncompleteTransaction { field: "transfers" });
        }

        let hbar_total = self
            .hbar_transfers
            .iter()
            .try_fold(0i64, |sum, t| sum.checked_add(t.amount.to_tinybars()));
        if hbar_total != Some(0) {
            return Err(HederaError::InvalidTransaction(
                "hbar transfers must sum to zero".into(),
            ));
        }

        let mut token_totals: BTreeMap<TokenId, i64> = BTreeMap::new();
        for transfer in &self.token_transfers {
            let total = token_totals.entry(transfer.token_id).or_default();
            *total = total.checked_add(transfer.amount).ok_or_else(|| {
                HederaError::InvalidTransaction(format!(
                    "transfers of token {} overflow",
                    transfer.token_id
                ))
            })?;
        }
        if let Some((token_id, _)) = token_totals.iter().find(|(_, total)| **total != 0) {
            return Err(HederaError::InvalidTransaction(format!(
                "transfers of token {token_id} must sum to zero"
            )));
        }

        Ok(TransactionPayload::Transfer {
            hbar_transfers: self.hbar_transfers.clone(),
            token_transfers: self.token_transfers.clone(),
        })
    }
}

/// Moves hbar and fungible tokens between accounts.
pub type TransferTransaction = Transaction<TransferData>;

impl Transaction<TransferData> {
    /// Adds an hbar adjustment. Debits are negative.
    ///
    /// # Errors
    ///
    /// [`HederaError::InvalidTransaction`] if merging with an earlier
    /// adjustment to the same account overflows; the earlier amount is kept.
    pub fn add_hbar_transfer(&mut self, account_id: AccountId, amount: Hbar) -> HederaResult<&mut Self> {
        let transfers = &mut self.data_mut()?.hbar_transfers;
        match transfers.iter_mut().find(|t| t.account_id == account_id) {
            Some(existing) => {
                existing.amount = existing.amount.checked_add(amount).ok_or_else(|| {
                    HederaError::InvalidTransaction(format!(
                        "hbar adjustment for {account_id} overflows"
                    ))
                })?;
            }
            None => transfers.push(HbarTransfer { account_id, amount }),
        }
        Ok(self)
    }

    /// Adds a token adjustment in the token's smallest unit. Debits are negative.
    ///
    /// Fails like [`add_hbar_transfer`](Self::add_hbar_transfer) on overflow.
    pub fn add_token_transfer(
        &mut self,
        token_id: TokenId,
        account_id: AccountId,
        amount: i64,
    ) -> HederaResult<&mut Self> {
        let transfers = &mut self.data_mut()?.token_transfers;
        match transfers
            .iter_mut()
            .find(|t| t.token_id == token_id && t.account_id == account_id)
        {
            Some(existing) => {
                existing.amount = existing.amount.checked_add(amount).ok_or_else(|| {
                    HederaError::InvalidTransaction(format!(
                        "adjustment of token {token_id} for {account_id} overflows"
                    ))
                })?;
            }
            None => transfers.push(TokenTransfer {
                token_id,
                account_id,
                amount,
            }),
        }
        Ok(self)
    }

    /// Returns the hbar adjustments.
    pub fn hbar_transfers(&self) -> &[HbarTransfer] {
        &self.data.hbar_transfers
    }

    /// Returns the token adjustments.
    pub fn token_transfers(&self) -> &[TokenTransfer] {
        &self.data.token_transfers
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::TransactionState;
    use crate::types::{Timestamp, TransactionId};

    #[test]
    fn test_balanced_transfer() {
        let mut txn = TransferTransaction::new();
        txn.add_hbar_transfer(AccountId::from_num(1), Hbar::from_tinybars(-10))
            .unwrap()
            .add_hbar_transfer(AccountId::from_num(2), Hbar::from_tinybars(10))
            .unwrap();

        let payload = txn.data().build_payload().unwrap();
        assert_eq!(payload.kind().method(), "cryptoTransfer");
    }

    #[test]
    fn test_merges_same_account() {
        let mut txn = TransferTransaction::new();
        txn.add_hbar_transfer(AccountId::from_num(1), Hbar::from_tinybars(-4))
            .unwrap()
            .add_hbar_transfer(AccountId::from_num(2), Hbar::from_tinybars(10))
            .unwrap()
            .add_hbar_transfer(AccountId::from_num(1), Hbar::from_tinybars(-6))
            .unwrap();

        assert_eq!(txn.hbar_transfers().len(), 2);
        assert_eq!(txn.hbar_transfers()[0].amount, Hbar::from_tinybars(-10));
    }

    #[test]
    fn test_unbalanced_transfers_rejected() {
        let mut txn = TransferTransaction::new();
        txn.add_hbar_transfer(AccountId::from_num(1), Hbar::from_tinybars(-10))
            .unwrap();
        assert!(matches!(
            txn.data().build_payload(),
            Err(HederaError::InvalidTransaction(_))
        ));

        let token = TokenId::from_num(1001);
        let mut txn = TransferTransaction::new();
        txn.add_token_transfer(token, AccountId::from_num(1), -5)
            .unwrap()
            .add_token_transfer(token, AccountId::from_num(2), 4)
            .unwrap();
        assert!(txn.data().build_payload().is_err());

        txn.add_token_transfer(token, AccountId::from_num(2), 1).unwrap();
        assert!(txn.data().build_payload().is_ok());
        assert_eq!(txn.token_transfers().len(), 2);
    }

    #[test]
    fn test_overflowing_merge_is_rejected() {
        let mut txn = TransferTransaction::new();
        txn.add_hbar_transfer(AccountId::from_num(1), Hbar::from_tinybars(i64::MAX))
            .unwrap()
            .add_hbar_transfer(AccountId::from_num(2), Hbar::from_tinybars(-i64::MAX))
            .unwrap();
        assert!(matches!(
            txn.add_hbar_transfer(AccountId::from_num(1), Hbar::from_tinybars(1)),
            Err(HederaError::InvalidTransaction(_))
        ));
        assert_eq!(txn.hbar_transfers()[0].amount, Hbar::from_tinybars(i64::MAX));

        let token = TokenId::from_num(1001);
        txn.add_token_transfer(token, AccountId::from_num(1), i64::MAX)
            .unwrap()
            .add_token_transfer(token, AccountId::from_num(2), -i64::MAX)
            .unwrap();
        assert!(txn
            .add_token_transfer(token, AccountId::from_num(1), 1)
            .is_err());
        assert_eq!(txn.token_transfers()[0].amount, i64::MAX);

        // Still balanced, and the frozen amounts are the ones given.
        txn.freeze(
            TransactionId::new(AccountId::from_num(2), Timestamp::new(1_700_000_000, 0)),
            AccountId::from_num(3),
        )
        .unwrap();
        assert_eq!(txn.state(), TransactionState::Frozen);
    }

    #[test]
    fn test_empty_transfer_is_incomplete() {
        assert!(matches!(
            TransferTransaction::new().data().build_payload(),
            Err(HederaError::IncompleteTransaction { field: "transfers" })
        ));
    }
}
