use crate::error::{HederaError, HederaResult};
use crate::hedera::Hedera;
use crate::retry::RetryExecutor;
use crate::status::StatusClass;
use crate::transaction::data::TransactionData;
use crate::transaction::lifecycle::{Transaction, TransactionState};
use crate::transaction::receipt::TransactionReceipt;
use std::time::Duration;
use tracing::{info, warn};

impl<D: TransactionData> Transaction<D> {
    /// Submits the transaction and waits for its receipt, using the client's
    /// default receipt timeout.
    ///
    /// See [`execute_with_timeout`](Self::execute_with_timeout).
    pub async fn execute(&mut self, client: &Hedera) -> HederaResult<TransactionReceipt> {
        let timeout = client.config().poll_config().default_timeout;
        self.execute_with_timeout(client, timeout).await
    }

    /// Submits the transaction to its designated node and waits at most
    /// `timeout` for the receipt.
    ///
    /// Submission is retried while the node answers `BUSY` or `UNKNOWN`, or
    /// fails at the transport level, following the client's retry policy.
    /// The transaction is never redirected to another node: once the retries
    /// are spent the node is put in cooldown and the transaction fails.
    ///
    /// # State
    ///
    /// `Signed` moves to `Submitted`, then to `Finalized` on success, `Failed`
    /// on any failure and `TimedOut` when the receipt did not arrive in time.
    /// A timed out transaction may still reach consensus; its receipt can be
    /// fetched later with [`get_receipt`](Self::get_receipt).
    ///
    /// # Errors
    ///
    /// * [`HederaError::NotFrozen`] while still building.
    /// * [`HederaError::MissingOperatorSignature`] without the operator's signature.
    /// * [`HederaError::TransactionRejected`] on a terminal precheck status.
    /// * [`HederaError::NodeUnavailable`] once submission retries are spent.
    /// * [`HederaError::ReceiptFailed`] or [`HederaError::ReceiptTimeout`] from
    ///   the receipt.
    pub async fn execute_with_timeout(
        &mut self,
        client: &Hedera,
        timeout: Duration,
    ) -> HederaResult<TransactionReceipt> {
        let frozen = (
            self.state,
            self.transaction_id,
            self.node_account_id,
            self.kind,
        );
        let (transaction_id, node, kind) = match frozen {
            (TransactionState::Building, ..) => return Err(HederaError::NotFrozen),
            (TransactionState::Frozen, Some(transaction_id), ..) => {
                return Err(HederaError::MissingOperatorSignature { transaction_id })
            }
            (TransactionState::Signed, Some(transaction_id), Some(node), Some(kind)) => {
                (transaction_id, node, kind)
            }
            _ => return Err(self.invalid_state("execute")),
        };

        let operator = client.operator().ok_or(HederaError::OperatorNotSet)?;
        if !self.is_signed_by(&operator.signer.public_key_bytes()) {
            return Err(HederaError::MissingOperatorSignature { transaction_id });
        }

        let signed = self.to_signed()?;
        self.state = TransactionState::Submitted;
        info!(
            transaction_id = %transaction_id,
            node = %node,
            kind = %kind,
            "submitting transaction"
        );

        let network = client.network();
        let retry_config = client.config().retry_config();
        let executor = RetryExecutor::new(retry_config.clone());

        let submitted = {
            let signed = &signed;
            executor
                .execute_with_predicate(
                    move |attempt| async move {
                        let channel = network.channel_for(node).await?;
                        let response = channel.submit(kind, signed).await?;
                        let status = response.status;
                        match status.class() {
                            StatusClass::Success => Ok(()),
                            StatusClass::TerminalFailure => {
                                Err(HederaError::TransactionRejected {
                                    status,
                                    transaction_id,
                                    node,
                                })
                            }
                            StatusClass::Retryable => Err(HederaError::NodeUnavailable {
                                node,
                                transaction_id,
                                attempts: attempt,
                                last_status: Some(status),
                            }),
                        }
                    },
                    |err| {
                        matches!(err, HederaError::NodeUnavailable { .. })
                            || retry_config.is_retryable_error(err)
                    },
                )
                .await
        };

        if let Err(err) = submitted {
            self.state = TransactionState::Failed;
            // Only an exhausted budget stops a retryable error.
            let attempts = retry_config.max_retries + 1;
            let err = match err {
                HederaError::TransactionRejected { status, .. } => {
                    warn!(
                        transaction_id = %transaction_id,
                        node = %node,
                        status = %status,
                        "transaction rejected at precheck"
                    );
                    err
                }
                HederaError::NodeUnavailable { .. } => {
                    network.mark_unhealthy(node);
                    err
                }
                err if retry_config.is_retryable_error(&err) => {
                    warn!(
                        transaction_id = %transaction_id,
                        node = %node,
                        attempts,
                        error = %err.sanitized_message(),
                        "node unreachable"
                    );
                    network.mark_unhealthy(node);
                    HederaError::NodeUnavailable {
                        node,
                        transaction_id,
                        attempts,
                        last_status: None,
                    }
                }
                err => err,
            };
            return Err(err);
        }

        self.accepted = true;
        info!(
            transaction_id = %transaction_id,
            node = %node,
            "transaction accepted at precheck"
        );

        self.await_outcome(client, timeout).await
    }

    /// Fetches the receipt of an accepted transaction, waiting at most
    /// `timeout`.
    ///
    /// Mostly useful after [`execute`](Self::execute) ended in `TimedOut`: a
    /// final receipt moves the transaction to `Finalized` or `Failed`, another
    /// timeout leaves it as it is. A receipt obtained earlier is returned
    /// without a network round trip.
    ///
    /// # Errors
    ///
    /// [`HederaError::InvalidState`] if the transaction was never accepted by
    /// a node, otherwise the same receipt errors as
    /// [`execute`](Self::execute).
    pub async fn get_receipt(
        &mut self,
        client: &Hedera,
        timeout: Duration,
    ) -> HederaResult<TransactionReceipt> {
        if !self.accepted {
            return Err(self.invalid_state("get the receipt of"));
        }
        if let Some(receipt) = &self.receipt {
            return Ok(receipt.clone());
        }
        self.await_outcome(client, timeout).await
    }

    async fn await_outcome(
        &mut self,
        client: &Hedera,
        timeout: Duration,
    ) -> HederaResult<TransactionReceipt> {
        let transaction_id = self
            .transaction_id
            .ok_or_else(|| HederaError::Internal("accepted transaction without id".into()))?;

        match client
            .poller()
            .await_receipt(self.node_account_id, &transaction_id, timeout)
            .await
        {
            Ok(receipt) => {
                self.state = TransactionState::Finalized;
                self.receipt = Some(receipt.clone());
                Ok(receipt)
            }
            Err(err) if err.is_timeout() => {
                self.state = TransactionState::TimedOut;
                warn!(
                    transaction_id = %transaction_id,
                    timeout_ms = timeout.as_millis() as u64,
                    "receipt not available in time"
                );
                Err(err)
            }
            Err(err) => {
                self.state = TransactionState::Failed;
                Err(err)
            }
        }
    }
}
