//! Postgres-backed engine store.
//!
//! Each [`StoreTx`] wraps one `sqlx::Transaction`, so an `execute` (or an
//! all-or-nothing undo/redo) is atomic at the database level. Ordering of
//! "most recent" stack items relies on the `BIGSERIAL seq` columns, never on
//! id ordering. Deleted entities leave their last version in
//! `domain_entity_retired` so a restored entity never reuses an old token.
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Code | StoreError |
//! |------------|-----------------|------------|
//! | Database (unique violation) | `23505` | `AlreadyExists` |
//! | Database (foreign key violation) | `23503` | `NotFound` |
//! | Database (serialization failure) | `40001` | `Concurrency` |
//! | Database (other) | any other | `Backend` |
//! | PoolClosed / Io / other | N/A | `Backend` |

use std::sync::Arc;

use serde_json::Value as JsonValue;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{FromRow, PgPool, Postgres, Row, Transaction as SqlxTransaction};
use tracing::instrument;
use uuid::Uuid;

use annostack_commands::{
    Command, CommandHistory, CommandKind, CommandParts, HistoryId, HistoryPrefix, RedoStackItem,
    StackItemId, Transaction, UndoStackItem,
};
use annostack_core::{CommandId, EntityId, ExpectedVersion, ProjectId, TransactionId, UserId};

use super::query::{HistoryFilter, HistoryPage, HistoryQuery, Pagination};
use super::r#trait::{EngineStore, StoreError, StoreTx, StoredEntity};

const SCHEMA: &str = include_str!("../../migrations/0001_command_engine.sql");

/// Postgres-backed engine store.
///
/// `Send + Sync`; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct PostgresEngineStore {
    pool: Arc<PgPool>,
}

impl PostgresEngineStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Connect a pool to `database_url`.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        Ok(Self::new(pool))
    }

    /// Apply the engine schema. Idempotent.
    #[instrument(skip(self), err)]
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::raw_sql(SCHEMA)
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("migrate", e))?;
        Ok(())
    }
}

pub struct PostgresTx {
    tx: SqlxTransaction<'static, Postgres>,
}

#[async_trait::async_trait]
impl EngineStore for PostgresEngineStore {
    async fn begin(&self) -> Result<Box<dyn StoreTx>, StoreError> {
        let tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;
        Ok(Box::new(PostgresTx { tx }))
    }
}

#[async_trait::async_trait]
impl HistoryQuery for PostgresEngineStore {
    #[instrument(skip(self), err)]
    async fn query_history(
        &self,
        filter: HistoryFilter,
        pagination: Pagination,
    ) -> Result<HistoryPage, StoreError> {
        let user = filter.user.map(|u| *u.as_uuid());
        let project = filter.project.map(|p| *p.as_uuid());

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM command_history
            WHERE ($1::uuid IS NULL OR acting_user = $1)
              AND ($2::uuid IS NULL OR project = $2)
            "#,
        )
        .bind(user)
        .bind(project)
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("count_history", e))?;

        let rows = sqlx::query(
            r#"
            SELECT id, command_id, acting_user, project, prefix_action, message, created_at
            FROM command_history
            WHERE ($1::uuid IS NULL OR acting_user = $1)
              AND ($2::uuid IS NULL OR project = $2)
            ORDER BY seq DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(user)
        .bind(project)
        .bind(i64::from(pagination.limit))
        .bind(i64::from(pagination.offset))
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("query_history", e))?;

        let rows = rows
            .iter()
            .map(|row| HistoryRow::from_row(row).map_err(row_error).and_then(CommandHistory::try_from))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(HistoryPage::new(rows, total as u64, pagination))
    }
}

impl PostgresTx {
    async fn missing_or_stale(
        &mut self,
        class_name: &str,
        id: EntityId,
        expected: ExpectedVersion,
    ) -> StoreError {
        let current: Result<Option<i64>, sqlx::Error> =
            sqlx::query_scalar("SELECT version FROM domain_entity WHERE class_name = $1 AND id = $2")
                .bind(class_name)
                .bind(id.as_uuid())
                .fetch_optional(&mut *self.tx)
                .await;
        match current {
            Ok(Some(version)) => StoreError::Concurrency(format!(
                "{class_name} {id}: expected {expected:?}, found {version}"
            )),
            Ok(None) => StoreError::NotFound(format!("{class_name} {id}")),
            Err(e) => map_sqlx_error("check_version", e),
        }
    }
}

#[async_trait::async_trait]
impl StoreTx for PostgresTx {
    #[instrument(skip(self), err)]
    async fn load_entity(
        &mut self,
        class_name: &str,
        id: EntityId,
    ) -> Result<Option<StoredEntity>, StoreError> {
        let row = sqlx::query(
            "SELECT class_name, id, version, data FROM domain_entity WHERE class_name = $1 AND id = $2",
        )
        .bind(class_name)
        .bind(id.as_uuid())
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(|e| map_sqlx_error("load_entity", e))?;

        row.map(|r| EntityRow::from_row(&r).map(Into::into).map_err(row_error))
            .transpose()
    }

    async fn list_entities(&mut self, class_name: &str) -> Result<Vec<StoredEntity>, StoreError> {
        let rows = sqlx::query(
            "SELECT class_name, id, version, data FROM domain_entity WHERE class_name = $1 ORDER BY seq ASC",
        )
        .bind(class_name)
        .fetch_all(&mut *self.tx)
        .await
        .map_err(|e| map_sqlx_error("list_entities", e))?;

        rows.iter()
            .map(|r| EntityRow::from_row(r).map(Into::into).map_err(row_error))
            .collect()
    }

    async fn find_entities(
        &mut self,
        class_name: &str,
        field: &str,
        value: &str,
    ) -> Result<Vec<StoredEntity>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT class_name, id, version, data
            FROM domain_entity
            WHERE class_name = $1 AND data ->> $2 = $3
            ORDER BY seq ASC
            "#,
        )
        .bind(class_name)
        .bind(field)
        .bind(value)
        .fetch_all(&mut *self.tx)
        .await
        .map_err(|e| map_sqlx_error("find_entities", e))?;

        rows.iter()
            .map(|r| EntityRow::from_row(r).map(Into::into).map_err(row_error))
            .collect()
    }

    #[instrument(skip(self, data), err)]
    async fn insert_entity(
        &mut self,
        class_name: &str,
        id: EntityId,
        data: JsonValue,
        unique_key: Option<String>,
    ) -> Result<StoredEntity, StoreError> {
        let version: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO domain_entity (class_name, id, version, unique_key, data)
            VALUES (
                $1, $2,
                COALESCE(
                    (SELECT version FROM domain_entity_retired WHERE class_name = $1 AND id = $2),
                    0
                ) + 1,
                $3, $4
            )
            RETURNING version
            "#,
        )
        .bind(class_name)
        .bind(id.as_uuid())
        .bind(&unique_key)
        .bind(&data)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(|e| map_sqlx_error("insert_entity", e))?;

        Ok(StoredEntity {
            class_name: class_name.to_string(),
            id,
            version: version as u64,
            data,
        })
    }

    #[instrument(skip(self, data), err)]
    async fn update_entity(
        &mut self,
        class_name: &str,
        id: EntityId,
        data: JsonValue,
        unique_key: Option<String>,
        expected: ExpectedVersion,
    ) -> Result<StoredEntity, StoreError> {
        let expected_version = match expected {
            ExpectedVersion::Any => None,
            ExpectedVersion::Exact(v) => Some(v as i64),
        };

        let version: Option<i64> = sqlx::query_scalar(
            r#"
            UPDATE domain_entity
            SET data = $1, unique_key = $2, version = version + 1, updated_at = now()
            WHERE class_name = $3 AND id = $4 AND ($5::bigint IS NULL OR version = $5)
            RETURNING version
            "#,
        )
        .bind(&data)
        .bind(&unique_key)
        .bind(class_name)
        .bind(id.as_uuid())
        .bind(expected_version)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(|e| map_sqlx_error("update_entity", e))?;

        match version {
            Some(version) => Ok(StoredEntity {
                class_name: class_name.to_string(),
                id,
                version: version as u64,
                data,
            }),
            None => Err(self.missing_or_stale(class_name, id, expected).await),
        }
    }

    #[instrument(skip(self), err)]
    async fn delete_entity(
        &mut self,
        class_name: &str,
        id: EntityId,
        expected: ExpectedVersion,
    ) -> Result<(), StoreError> {
        let expected_version = match expected {
            ExpectedVersion::Any => None,
            ExpectedVersion::Exact(v) => Some(v as i64),
        };

        let deleted: Option<i64> = sqlx::query_scalar(
            r#"
            DELETE FROM domain_entity
            WHERE class_name = $1 AND id = $2 AND ($3::bigint IS NULL OR version = $3)
            RETURNING version
            "#,
        )
        .bind(class_name)
        .bind(id.as_uuid())
        .bind(expected_version)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(|e| map_sqlx_error("delete_entity", e))?;

        let Some(version) = deleted else {
            return Err(self.missing_or_stale(class_name, id, expected).await);
        };

        sqlx::query(
            r#"
            INSERT INTO domain_entity_retired (class_name, id, version)
            VALUES ($1, $2, $3)
            ON CONFLICT (class_name, id) DO UPDATE SET version = EXCLUDED.version
            "#,
        )
        .bind(class_name)
        .bind(id.as_uuid())
        .bind(version)
        .execute(&mut *self.tx)
        .await
        .map_err(|e| map_sqlx_error("retire_entity", e))?;
        Ok(())
    }

    #[instrument(skip(self, command), fields(command_id = %command.id()), err)]
    async fn insert_command(&mut self, command: &Command) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO command (
                id, kind, domain_class_name, domain_id, before_state, after_state,
                acting_user, project, transaction_id, action_message, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(command.id().as_uuid())
        .bind(command.kind().as_str())
        .bind(command.domain_class_name())
        .bind(command.domain_id().as_uuid())
        .bind(command.before_state())
        .bind(command.after_state())
        .bind(command.acting_user().as_uuid())
        .bind(command.project().map(|p| *p.as_uuid()))
        .bind(command.transaction_id().map(|t| *t.as_uuid()))
        .bind(command.action_message())
        .bind(command.created_at())
        .execute(&mut *self.tx)
        .await
        .map_err(|e| map_sqlx_error("insert_command", e))?;
        Ok(())
    }

    async fn load_command(&mut self, id: CommandId) -> Result<Option<Command>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT id, kind, domain_class_name, domain_id, before_state, after_state,
                   acting_user, project, transaction_id, action_message, created_at
            FROM command
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(|e| map_sqlx_error("load_command", e))?;

        row.map(|r| CommandRow::from_row(&r).map_err(row_error).and_then(Command::try_from))
            .transpose()
    }

    async fn insert_transaction(&mut self, transaction: &Transaction) -> Result<(), StoreError> {
        sqlx::query("INSERT INTO command_transaction (id, created_at) VALUES ($1, $2)")
            .bind(transaction.id.as_uuid())
            .bind(transaction.created_at)
            .execute(&mut *self.tx)
            .await
            .map_err(|e| map_sqlx_error("insert_transaction", e))?;
        Ok(())
    }

    async fn append_history(&mut self, row: &CommandHistory) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO command_history (id, command_id, acting_user, project, prefix_action, message, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(row.id.as_uuid())
        .bind(row.command_id.as_uuid())
        .bind(row.acting_user.as_uuid())
        .bind(row.project.map(|p| *p.as_uuid()))
        .bind(row.prefix_action.as_str())
        .bind(&row.message)
        .bind(row.created_at)
        .execute(&mut *self.tx)
        .await
        .map_err(|e| map_sqlx_error("append_history", e))?;
        Ok(())
    }

    async fn push_undo(&mut self, item: &UndoStackItem) -> Result<(), StoreError> {
        let row = StackRow {
            id: item.id,
            command_id: item.command_id,
            acting_user: item.acting_user,
            created_at: item.created_at,
        };
        push_item(&mut self.tx, "undo_stack_item", &row).await
    }

    async fn push_redo(&mut self, item: &RedoStackItem) -> Result<(), StoreError> {
        let row = StackRow {
            id: item.id,
            command_id: item.command_id,
            acting_user: item.acting_user,
            created_at: item.created_at,
        };
        push_item(&mut self.tx, "redo_stack_item", &row).await
    }

    async fn latest_undo(
        &mut self,
        user: UserId,
        command: Option<CommandId>,
    ) -> Result<Option<UndoStackItem>, StoreError> {
        let row = latest_item(&mut self.tx, "undo_stack_item", user, command).await?;
        Ok(row.map(|r| UndoStackItem {
            id: r.id,
            command_id: r.command_id,
            acting_user: r.acting_user,
            created_at: r.created_at,
        }))
    }

    async fn latest_redo(
        &mut self,
        user: UserId,
        command: Option<CommandId>,
    ) -> Result<Option<RedoStackItem>, StoreError> {
        let row = latest_item(&mut self.tx, "redo_stack_item", user, command).await?;
        Ok(row.map(|r| RedoStackItem {
            id: r.id,
            command_id: r.command_id,
            acting_user: r.acting_user,
            created_at: r.created_at,
        }))
    }

    async fn undo_items_in_transaction(
        &mut self,
        user: UserId,
        transaction: TransactionId,
    ) -> Result<Vec<UndoStackItem>, StoreError> {
        let rows = items_in_transaction(&mut self.tx, "undo_stack_item", user, transaction).await?;
        Ok(rows
            .into_iter()
            .map(|r| UndoStackItem {
                id: r.id,
                command_id: r.command_id,
                acting_user: r.acting_user,
                created_at: r.created_at,
            })
            .collect())
    }

    async fn redo_items_in_transaction(
        &mut self,
        user: UserId,
        transaction: TransactionId,
    ) -> Result<Vec<RedoStackItem>, StoreError> {
        let rows = items_in_transaction(&mut self.tx, "redo_stack_item", user, transaction).await?;
        Ok(rows
            .into_iter()
            .map(|r| RedoStackItem {
                id: r.id,
                command_id: r.command_id,
                acting_user: r.acting_user,
                created_at: r.created_at,
            })
            .collect())
    }

    async fn remove_undo(&mut self, item: &UndoStackItem) -> Result<(), StoreError> {
        remove_item(&mut self.tx, "undo_stack_item", item.id).await
    }

    async fn remove_redo(&mut self, item: &RedoStackItem) -> Result<(), StoreError> {
        remove_item(&mut self.tx, "redo_stack_item", item.id).await
    }

    #[instrument(skip(self), err)]
    async fn clear_redo(&mut self, user: UserId) -> Result<u64, StoreError> {
        let done = sqlx::query("DELETE FROM redo_stack_item WHERE acting_user = $1")
            .bind(user.as_uuid())
            .execute(&mut *self.tx)
            .await
            .map_err(|e| map_sqlx_error("clear_redo", e))?;
        Ok(done.rows_affected())
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        let this = *self;
        this.tx
            .commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))
    }

    async fn rollback(self: Box<Self>) -> Result<(), StoreError> {
        let this = *self;
        this.tx
            .rollback()
            .await
            .map_err(|e| map_sqlx_error("rollback", e))
    }
}

// Stack helpers. Table names are compile-time constants, never user input.

async fn push_item(
    tx: &mut SqlxTransaction<'static, Postgres>,
    table: &'static str,
    row: &StackRow,
) -> Result<(), StoreError> {
    tracing::debug!(table, command_id = %row.command_id, "push stack item");
    let sql = format!(
        "INSERT INTO {table} (id, command_id, acting_user, created_at) VALUES ($1, $2, $3, $4)"
    );
    sqlx::query(&sql)
        .bind(row.id.as_uuid())
        .bind(row.command_id.as_uuid())
        .bind(row.acting_user.as_uuid())
        .bind(row.created_at)
        .execute(&mut **tx)
        .await
        .map_err(|e| map_sqlx_error("push_stack_item", e))?;
    Ok(())
}

async fn latest_item(
    tx: &mut SqlxTransaction<'static, Postgres>,
    table: &'static str,
    user: UserId,
    command: Option<CommandId>,
) -> Result<Option<StackRow>, StoreError> {
    let sql = format!(
        r#"
        SELECT id, command_id, acting_user, created_at
        FROM {table}
        WHERE acting_user = $1 AND ($2::uuid IS NULL OR command_id = $2)
        ORDER BY seq DESC
        LIMIT 1
        "#
    );
    let row = sqlx::query(&sql)
        .bind(user.as_uuid())
        .bind(command.map(|c| *c.as_uuid()))
        .fetch_optional(&mut **tx)
        .await
        .map_err(|e| map_sqlx_error("latest_stack_item", e))?;

    row.map(|r| StackRow::from_row(&r).map_err(row_error)).transpose()
}

async fn items_in_transaction(
    tx: &mut SqlxTransaction<'static, Postgres>,
    table: &'static str,
    user: UserId,
    transaction: TransactionId,
) -> Result<Vec<StackRow>, StoreError> {
    let sql = format!(
        r#"
        SELECT s.id, s.command_id, s.acting_user, s.created_at
        FROM {table} s
        JOIN command c ON c.id = s.command_id
        WHERE s.acting_user = $1 AND c.transaction_id = $2
        ORDER BY s.seq DESC
        "#
    );
    let rows = sqlx::query(&sql)
        .bind(user.as_uuid())
        .bind(transaction.as_uuid())
        .fetch_all(&mut **tx)
        .await
        .map_err(|e| map_sqlx_error("stack_items_in_transaction", e))?;

    rows.iter()
        .map(|r| StackRow::from_row(r).map_err(row_error))
        .collect()
}

async fn remove_item(
    tx: &mut SqlxTransaction<'static, Postgres>,
    table: &'static str,
    id: StackItemId,
) -> Result<(), StoreError> {
    let sql = format!("DELETE FROM {table} WHERE id = $1");
    let done = sqlx::query(&sql)
        .bind(id.as_uuid())
        .execute(&mut **tx)
        .await
        .map_err(|e| map_sqlx_error("remove_stack_item", e))?;
    if done.rows_affected() == 0 {
        return Err(StoreError::Concurrency(format!("{table} {id} already consumed")));
    }
    Ok(())
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {}: {}", operation, db_err.message());
            match db_err.code().as_deref() {
                Some("23505") => StoreError::AlreadyExists(msg),
                Some("23503") => StoreError::NotFound(msg),
                Some("40001") => StoreError::Concurrency(msg),
                _ => StoreError::Backend(msg),
            }
        }
        sqlx::Error::PoolClosed => {
            StoreError::Backend(format!("connection pool closed in {}", operation))
        }
        other => StoreError::Backend(format!("{} failed: {}", operation, other)),
    }
}

fn row_error(err: sqlx::Error) -> StoreError {
    StoreError::Serialization(format!("failed to decode row: {err}"))
}

// SQLx row types

#[derive(Debug)]
struct EntityRow {
    class_name: String,
    id: Uuid,
    version: i64,
    data: JsonValue,
}

impl<'r> FromRow<'r, PgRow> for EntityRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(EntityRow {
            class_name: row.try_get("class_name")?,
            id: row.try_get("id")?,
            version: row.try_get("version")?,
            data: row.try_get("data")?,
        })
    }
}

impl From<EntityRow> for StoredEntity {
    fn from(row: EntityRow) -> Self {
        StoredEntity {
            class_name: row.class_name,
            id: EntityId::from_uuid(row.id),
            version: row.version as u64,
            data: row.data,
        }
    }
}

#[derive(Debug)]
struct CommandRow {
    id: Uuid,
    kind: String,
    domain_class_name: String,
    domain_id: Uuid,
    before_state: Option<JsonValue>,
    after_state: Option<JsonValue>,
    acting_user: Uuid,
    project: Option<Uuid>,
    transaction_id: Option<Uuid>,
    action_message: String,
    created_at: chrono::DateTime<chrono::Utc>,
}

impl<'r> FromRow<'r, PgRow> for CommandRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(CommandRow {
            id: row.try_get("id")?,
            kind: row.try_get("kind")?,
            domain_class_name: row.try_get("domain_class_name")?,
            domain_id: row.try_get("domain_id")?,
            before_state: row.try_get("before_state")?,
            after_state: row.try_get("after_state")?,
            acting_user: row.try_get("acting_user")?,
            project: row.try_get("project")?,
            transaction_id: row.try_get("transaction_id")?,
            action_message: row.try_get("action_message")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

impl TryFrom<CommandRow> for Command {
    type Error = StoreError;

    fn try_from(row: CommandRow) -> Result<Self, Self::Error> {
        let kind = match row.kind.as_str() {
            "add" => CommandKind::Add,
            "edit" => CommandKind::Edit,
            "delete" => CommandKind::Delete,
            other => return Err(StoreError::Serialization(format!("unknown command kind '{other}'"))),
        };
        Command::from_parts(CommandParts {
            id: CommandId::from_uuid(row.id),
            kind,
            domain_class_name: row.domain_class_name,
            domain_id: EntityId::from_uuid(row.domain_id),
            before_state: row.before_state,
            after_state: row.after_state,
            acting_user: UserId::from_uuid(row.acting_user),
            project: row.project.map(ProjectId::from_uuid),
            transaction_id: row.transaction_id.map(TransactionId::from_uuid),
            action_message: row.action_message,
            created_at: row.created_at,
        })
        .map_err(|e| StoreError::Serialization(e.to_string()))
    }
}

#[derive(Debug)]
struct HistoryRow {
    id: Uuid,
    command_id: Uuid,
    acting_user: Uuid,
    project: Option<Uuid>,
    prefix_action: String,
    message: String,
    created_at: chrono::DateTime<chrono::Utc>,
}

impl<'r> FromRow<'r, PgRow> for HistoryRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(HistoryRow {
            id: row.try_get("id")?,
            command_id: row.try_get("command_id")?,
            acting_user: row.try_get("acting_user")?,
            project: row.try_get("project")?,
            prefix_action: row.try_get("prefix_action")?,
            message: row.try_get("message")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

impl TryFrom<HistoryRow> for CommandHistory {
    type Error = StoreError;

    fn try_from(row: HistoryRow) -> Result<Self, Self::Error> {
        let prefix_action = HistoryPrefix::parse(&row.prefix_action).ok_or_else(|| {
            StoreError::Serialization(format!("unknown history prefix '{}'", row.prefix_action))
        })?;
        Ok(CommandHistory {
            id: HistoryId::from_uuid(row.id),
            command_id: CommandId::from_uuid(row.command_id),
            acting_user: UserId::from_uuid(row.acting_user),
            project: row.project.map(ProjectId::from_uuid),
            prefix_action,
            message: row.message,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug)]
struct StackRow {
    id: StackItemId,
    command_id: CommandId,
    acting_user: UserId,
    created_at: chrono::DateTime<chrono::Utc>,
}

impl<'r> FromRow<'r, PgRow> for StackRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(StackRow {
            id: StackItemId::from_uuid(row.try_get("id")?),
            command_id: CommandId::from_uuid(row.try_get("command_id")?),
            acting_user: UserId::from_uuid(row.try_get("acting_user")?),
            created_at: row.try_get("created_at")?,
        })
    }
}
