//! Transfer Handler
//!
//! Moves points between two accounts inside a single store transaction.

use std::sync::Arc;

use uuid::Uuid;

use crate::domain::{Amount, DomainError, Email, OperationContext, TransferError};
use crate::error::AppError;
use crate::state::AppState;
use crate::store::{with_transaction, AccountStore, AccountTransaction};

use super::{TransferCommand, TransferResult};

/// Handler for point transfers
pub struct TransferHandler {
    store: Arc<dyn AccountStore>,
}

impl TransferHandler {
    pub fn new(state: &AppState) -> Self {
        Self::with_store(Arc::clone(&state.store))
    }

    pub fn with_store(store: Arc<dyn AccountStore>) -> Self {
        Self { store }
    }

    /// Execute the transfer command.
    ///
    /// Nothing is retried: any failure rolls the transaction back and is
    /// returned to the caller as is.
    pub async fn execute(
        &self,
        command: TransferCommand,
        context: &OperationContext,
    ) -> Result<TransferResult, AppError> {
        let amount = Amount::new(command.amount).map_err(TransferError::from)?;

        // An address that cannot be normalized cannot belong to any account
        let receiver_email = Email::parse(&command.receiver_email)
            .map_err(|_| DomainError::EmailNotFound(command.receiver_email.clone()))?;

        let sender_id = command.sender_id;
        let result = with_transaction::<_, AppError, _>(self.store.as_ref(), move |tx| {
            Box::pin(apply_transfer(tx, sender_id, receiver_email, amount))
        })
        .await;

        match &result {
            Ok(done) => tracing::info!(
                correlation_id = ?context.correlation_id,
                caller = ?context.account_id,
                sender_id = %done.sender_id,
                receiver_id = %done.receiver_id,
                amount = done.amount,
                "Transfer committed"
            ),
            Err(err) => tracing::info!(
                correlation_id = ?context.correlation_id,
                caller = ?context.account_id,
                sender_id = %sender_id,
                amount = command.amount,
                error = %err,
                "Transfer rejected"
            ),
        }

        result
    }
}

/// Body of the transfer transaction.
///
/// Both rows are locked before the balance is read, so the sufficiency check
/// and the writes see the same live balance.
async fn apply_transfer(
    tx: &mut Box<dyn AccountTransaction>,
    sender_id: Uuid,
    receiver_email: Email,
    amount: Amount,
) -> Result<TransferResult, AppError> {
    let receiver_id = tx.find_by_email(&receiver_email).await?.map(|r| r.id);

    let mut ids = vec![sender_id];
    ids.extend(receiver_id);
    let locked = tx.lock_accounts(&ids).await?;

    let sender = locked
        .iter()
        .find(|a| a.id == sender_id)
        .ok_or(DomainError::AccountNotFound(sender_id))?;

    if receiver_id == Some(sender_id) {
        return Err(TransferError::SelfTransfer.into());
    }

    if !sender.points.is_sufficient_for(&amount) {
        return Err(DomainError::insufficient_funds(amount.value(), sender.points.value()).into());
    }

    let receiver = receiver_id
        .and_then(|id| locked.iter().find(|a| a.id == id))
        .ok_or_else(|| DomainError::EmailNotFound(receiver_email.to_string()))?;

    let sender_balance = sender.points.debit(&amount).map_err(TransferError::from)?;
    let receiver_balance = receiver.points.credit(&amount).map_err(TransferError::from)?;

    tx.set_points(sender.id, sender_balance).await?;
    tx.set_points(receiver.id, receiver_balance).await?;

    Ok(TransferResult {
        sender_id: sender.id,
        receiver_id: receiver.id,
        amount: amount.value(),
        sender_balance: sender_balance.value(),
        receiver_balance: receiver_balance.value(),
    })
}
