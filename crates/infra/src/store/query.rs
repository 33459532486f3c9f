//! History query interface for audit screens.
//!
//! Read-only and paginated by default.

use serde::{Deserialize, Serialize};

use annostack_commands::CommandHistory;
use annostack_core::{ProjectId, UserId};

use super::StoreError;

/// Pagination parameters for history queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub limit: u32,
    pub offset: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            limit: 50,
            offset: 0,
        }
    }
}

impl Pagination {
    pub const MAX_LIMIT: u32 = 1000;

    pub fn new(limit: Option<u32>, offset: Option<u32>) -> Self {
        Self {
            limit: limit.unwrap_or(50).min(Self::MAX_LIMIT),
            offset: offset.unwrap_or(0),
        }
    }
}

/// Filter criteria for history queries. Empty filter matches every row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryFilter {
    pub user: Option<UserId>,
    pub project: Option<ProjectId>,
}

impl HistoryFilter {
    pub fn matches(&self, row: &CommandHistory) -> bool {
        self.user.is_none_or(|u| row.acting_user == u)
            && self.project.is_none_or(|p| row.project == Some(p))
    }
}

/// Paginated history result, newest rows first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryPage {
    pub rows: Vec<CommandHistory>,
    pub total: u64,
    pub pagination: Pagination,
    pub has_more: bool,
}

impl HistoryPage {
    pub fn new(rows: Vec<CommandHistory>, total: u64, pagination: Pagination) -> Self {
        let has_more = u64::from(pagination.offset) + (rows.len() as u64) < total;
        Self {
            rows,
            total,
            pagination,
            has_more,
        }
    }
}

#[async_trait::async_trait]
pub trait HistoryQuery: Send + Sync {
    async fn query_history(
        &self,
        filter: HistoryFilter,
        pagination: Pagination,
    ) -> Result<HistoryPage, StoreError>;
}
