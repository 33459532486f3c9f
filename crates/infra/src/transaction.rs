//! Transaction grouping.

use std::sync::Arc;

use annostack_commands::Transaction;

use crate::error::EngineError;
use crate::store::{EngineStore, StoreTx};

/// Hands out correlation ids for composite operations.
///
/// A caller starts a transaction, then threads its id into every `execute`
/// of the composite operation; one undo later reverts all of them.
#[derive(Clone)]
pub struct TransactionService {
    store: Arc<dyn EngineStore>,
}

impl TransactionService {
    pub fn new(store: Arc<dyn EngineStore>) -> Self {
        Self { store }
    }

    /// Persist a new transaction and return it.
    pub async fn start(&self) -> Result<Transaction, EngineError> {
        let mut tx = self.store.begin().await?;
        let transaction = Self::start_in(tx.as_mut()).await?;
        tx.commit().await?;
        Ok(transaction)
    }

    /// Persist a new transaction inside a caller-owned storage transaction.
    pub async fn start_in(tx: &mut dyn StoreTx) -> Result<Transaction, EngineError> {
        let transaction = Transaction::new();
        tx.insert_transaction(&transaction).await?;
        tracing::debug!(transaction_id = %transaction.id, "transaction started");
        Ok(transaction)
    }
}
