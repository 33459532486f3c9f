use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use annostack_core::TransactionId;

/// Correlation id grouping an ordered sequence of commands.
///
/// Commands point at their transaction, not the other way round; a transaction
/// with no commands carries no history meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    pub fn new() -> Self {
        Self {
            id: TransactionId::new(),
            created_at: Utc::now(),
        }
    }
}

impl Default for Transaction {
    fn default() -> Self {
        Self::new()
    }
}
