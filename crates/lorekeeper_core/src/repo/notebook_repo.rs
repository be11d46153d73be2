//! Notebook repository contract and SQLite implementation.
//!
//! # Invariants
//! - Every query is scoped to the owning user.
//! - Deleting a notebook cascades to its notes, notables and links through
//!   foreign keys.
//! - `order_index` comes from the global notebook sequence.

use crate::model::notebook::{Notebook, NotebookDraft};
use crate::model::{NotebookId, UserId};
use crate::repo::sequence::{map_insert_error, next_order_index, OrderScope};
use crate::repo::{ensure_schema_ready, RecordRef, RepoError, RepoResult};
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction, TransactionBehavior};
use uuid::Uuid;

const NOTEBOOK_SELECT_SQL: &str = "SELECT
    id,
    owner_uuid,
    name,
    summary,
    order_index,
    created_at,
    updated_at
FROM notebooks";

const NOTEBOOK_COLUMNS: &[&str] = &[
    "id",
    "owner_uuid",
    "name",
    "summary",
    "order_index",
    "created_at",
    "updated_at",
];

/// Repository interface for notebook operations.
pub trait NotebookRepository {
    /// Creates one notebook and assigns the next global order index.
    fn create_notebook(&self, owner_id: UserId, draft: &NotebookDraft) -> RepoResult<Notebook>;
    fn get_notebook(&self, owner_id: UserId, id: NotebookId) -> RepoResult<Option<Notebook>>;
    /// Lists the owner's notebooks by order index.
    fn list_notebooks(&self, owner_id: UserId) -> RepoResult<Vec<Notebook>>;
    /// Replaces name and summary; order index is kept.
    fn update_notebook(
        &self,
        owner_id: UserId,
        id: NotebookId,
        draft: &NotebookDraft,
    ) -> RepoResult<Notebook>;
    /// Deletes one notebook with everything it owns.
    fn delete_notebook(&self, owner_id: UserId, id: NotebookId) -> RepoResult<()>;
}

/// SQLite-backed notebook repository.
pub struct SqliteNotebookRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteNotebookRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_schema_ready(conn, &[("notebooks", NOTEBOOK_COLUMNS)])?;
        Ok(Self { conn })
    }
}

impl NotebookRepository for SqliteNotebookRepository<'_> {
    fn create_notebook(&self, owner_id: UserId, draft: &NotebookDraft) -> RepoResult<Notebook> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let order_index = next_order_index(&tx, OrderScope::Notebooks)?;
        tx.execute(
            "INSERT INTO notebooks (owner_uuid, name, summary, order_index)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                owner_id.to_string(),
                draft.name.as_str(),
                draft.summary.as_deref(),
                order_index,
            ],
        )
        .map_err(|err| map_insert_error(err, OrderScope::Notebooks))?;
        let id = tx.last_insert_rowid();
        let notebook = load_required_notebook(&tx, owner_id, id)?;
        tx.commit()?;
        Ok(notebook)
    }

    fn get_notebook(&self, owner_id: UserId, id: NotebookId) -> RepoResult<Option<Notebook>> {
        load_notebook(self.conn, owner_id, id)
    }

    fn list_notebooks(&self, owner_id: UserId) -> RepoResult<Vec<Notebook>> {
        let mut stmt = self.conn.prepare(&format!(
            "{NOTEBOOK_SELECT_SQL}
             WHERE owner_uuid = ?1
             ORDER BY order_index ASC, id ASC;"
        ))?;
        let mut rows = stmt.query([owner_id.to_string()])?;
        let mut notebooks = Vec::new();
        while let Some(row) = rows.next()? {
            notebooks.push(parse_notebook_row(row)?);
        }
        Ok(notebooks)
    }

    fn update_notebook(
        &self,
        owner_id: UserId,
        id: NotebookId,
        draft: &NotebookDraft,
    ) -> RepoResult<Notebook> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let changed = tx.execute(
            "UPDATE notebooks
             SET
                name = ?1,
                summary = ?2,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?3
               AND owner_uuid = ?4;",
            params![
                draft.name.as_str(),
                draft.summary.as_deref(),
                id,
                owner_id.to_string(),
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(RecordRef::Notebook(id)));
        }
        let notebook = load_required_notebook(&tx, owner_id, id)?;
        tx.commit()?;
        Ok(notebook)
    }

    fn delete_notebook(&self, owner_id: UserId, id: NotebookId) -> RepoResult<()> {
        let changed = self.conn.execute(
            "DELETE FROM notebooks WHERE id = ?1 AND owner_uuid = ?2;",
            params![id, owner_id.to_string()],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(RecordRef::Notebook(id)));
        }
        Ok(())
    }
}

fn load_notebook(
    conn: &Connection,
    owner_id: UserId,
    id: NotebookId,
) -> RepoResult<Option<Notebook>> {
    let mut stmt = conn.prepare(&format!(
        "{NOTEBOOK_SELECT_SQL}
         WHERE id = ?1
           AND owner_uuid = ?2;"
    ))?;
    let row = stmt
        .query_row(params![id, owner_id.to_string()], |row| {
            Ok(parse_notebook_row(row))
        })
        .optional()?;
    row.transpose()
}

fn load_required_notebook(
    conn: &Connection,
    owner_id: UserId,
    id: NotebookId,
) -> RepoResult<Notebook> {
    load_notebook(conn, owner_id, id)?.ok_or(RepoError::NotFound(RecordRef::Notebook(id)))
}

fn parse_notebook_row(row: &Row<'_>) -> RepoResult<Notebook> {
    let owner_text: String = row.get("owner_uuid")?;
    let owner_id = Uuid::parse_str(&owner_text).map_err(|_| {
        RepoError::InvalidData(format!(
            "invalid uuid value `{owner_text}` in notebooks.owner_uuid"
        ))
    })?;

    Ok(Notebook {
        id: row.get("id")?,
        owner_id,
        name: row.get("name")?,
        summary: row.get("summary")?,
        order_index: row.get("order_index")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}
