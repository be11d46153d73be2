//! Notable repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist characters, items and locations in one `notables` table.
//! - Provide the notebook-scoped lookup used to resolve reference tokens.
//! - Own the notable teardown cascade.
//!
//! # Invariants
//! - Lookups never return a notable from another notebook.
//! - `order_index` is drawn from the notebook-wide sequence shared by all kinds.
//! - Deleting a notable first deletes every note linked to it, together with
//!   those notes' other links, in the same transaction.

use crate::model::notable::{Notable, NotableChanges, NotableDraft, NotableKind};
use crate::model::{NotableId, NoteId, NotebookId};
use crate::repo::sequence::{map_insert_error, next_order_index, OrderScope};
use crate::repo::{ensure_notebook_exists, ensure_schema_ready, RecordRef, RepoError, RepoResult};
use rusqlite::types::Value;
use rusqlite::{
    params, params_from_iter, Connection, OptionalExtension, Row, Transaction, TransactionBehavior,
};

const NOTABLE_SELECT_SQL: &str = "SELECT
    id,
    notebook_id,
    type,
    name,
    description,
    order_index,
    viewed_at,
    created_at,
    updated_at
FROM notables";

pub(crate) const NOTABLE_COLUMNS: &[&str] = &[
    "id",
    "notebook_id",
    "type",
    "name",
    "description",
    "order_index",
    "viewed_at",
    "created_at",
    "updated_at",
];

pub(crate) const LINK_COLUMNS: &[&str] = &["notable_id", "note_id"];

/// Notebook-scoped notable lookup used by the link resolver.
pub trait NotableLookup {
    /// Returns the notable only when `id` has this `kind` and lives in `notebook_id`.
    fn find_notable(
        &self,
        notebook_id: NotebookId,
        kind: NotableKind,
        id: NotableId,
    ) -> RepoResult<Option<Notable>>;
}

/// Filter options for notable lists. Results are always ordered by order index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotableListQuery {
    /// Restricts the list to one kind.
    pub kind: Option<NotableKind>,
    /// Case-insensitive substring match on the name.
    pub name_contains: Option<String>,
}

/// Repository interface for notable operations.
pub trait NotableRepository: NotableLookup {
    /// Creates one notable with the next notebook-wide order index.
    fn create_notable(
        &self,
        notebook_id: NotebookId,
        draft: &NotableDraft,
        viewed_at: i64,
    ) -> RepoResult<Notable>;
    fn get_notable(&self, notebook_id: NotebookId, id: NotableId) -> RepoResult<Option<Notable>>;
    /// Replaces name and description. Kind and order index are kept.
    fn update_notable(
        &self,
        notebook_id: NotebookId,
        id: NotableId,
        changes: &NotableChanges,
    ) -> RepoResult<Notable>;
    /// Records a detail view at `viewed_at` (epoch ms).
    fn mark_viewed(&self, notebook_id: NotebookId, id: NotableId, viewed_at: i64)
        -> RepoResult<()>;
    fn list_notables(
        &self,
        notebook_id: NotebookId,
        query: &NotableListQuery,
    ) -> RepoResult<Vec<Notable>>;
    /// Most recently viewed notables, newest first.
    fn recent_notables(&self, notebook_id: NotebookId, limit: u32) -> RepoResult<Vec<Notable>>;
    /// Deletes the notable and every note linked to it. Returns the deleted note ids.
    fn delete_notable(&self, notebook_id: NotebookId, id: NotableId) -> RepoResult<Vec<NoteId>>;
}

/// SQLite-backed notable repository.
pub struct SqliteNotableRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteNotableRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_schema_ready(
            conn,
            &[
                ("notables", NOTABLE_COLUMNS),
                ("notables_notes", LINK_COLUMNS),
            ],
        )?;
        Ok(Self { conn })
    }
}

impl NotableLookup for SqliteNotableRepository<'_> {
    fn find_notable(
        &self,
        notebook_id: NotebookId,
        kind: NotableKind,
        id: NotableId,
    ) -> RepoResult<Option<Notable>> {
        find_notable_in(self.conn, notebook_id, kind, id)
    }
}

impl NotableRepository for SqliteNotableRepository<'_> {
    fn create_notable(
        &self,
        notebook_id: NotebookId,
        draft: &NotableDraft,
        viewed_at: i64,
    ) -> RepoResult<Notable> {
        let scope = OrderScope::Notables(notebook_id);
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        ensure_notebook_exists(&tx, notebook_id)?;
        let order_index = next_order_index(&tx, scope)?;
        tx.execute(
            "INSERT INTO notables (
                notebook_id,
                type,
                name,
                description,
                order_index,
                viewed_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                notebook_id,
                draft.kind.as_str(),
                draft.name.as_str(),
                draft.description.as_deref(),
                order_index,
                viewed_at,
            ],
        )
        .map_err(|err| map_insert_error(err, scope))?;
        let id = tx.last_insert_rowid();
        let notable = load_required_notable(&tx, notebook_id, id)?;
        tx.commit()?;
        Ok(notable)
    }

    fn get_notable(&self, notebook_id: NotebookId, id: NotableId) -> RepoResult<Option<Notable>> {
        load_notable(self.conn, notebook_id, id)
    }

    fn update_notable(
        &self,
        notebook_id: NotebookId,
        id: NotableId,
        changes: &NotableChanges,
    ) -> RepoResult<Notable> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let changed = tx.execute(
            "UPDATE notables
             SET
                name = ?1,
                description = ?2,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?3
               AND notebook_id = ?4;",
            params![
                changes.name.as_str(),
                changes.description.as_deref(),
                id,
                notebook_id,
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(RecordRef::Notable(id)));
        }
        let notable = load_required_notable(&tx, notebook_id, id)?;
        tx.commit()?;
        Ok(notable)
    }

    fn mark_viewed(
        &self,
        notebook_id: NotebookId,
        id: NotableId,
        viewed_at: i64,
    ) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE notables
             SET viewed_at = ?1
             WHERE id = ?2
               AND notebook_id = ?3;",
            params![viewed_at, id, notebook_id],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(RecordRef::Notable(id)));
        }
        Ok(())
    }

    fn list_notables(
        &self,
        notebook_id: NotebookId,
        query: &NotableListQuery,
    ) -> RepoResult<Vec<Notable>> {
        let mut sql = format!("{NOTABLE_SELECT_SQL} WHERE notebook_id = ?");
        let mut bind_values: Vec<Value> = vec![Value::Integer(notebook_id)];

        if let Some(kind) = query.kind {
            sql.push_str(" AND type = ?");
            bind_values.push(Value::Text(kind.as_str().to_string()));
        }

        sql.push_str(" ORDER BY order_index ASC, id ASC;");

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut notables = collect_notables(&mut rows)?;

        // SQLite's lower() only folds ASCII, so the name filter runs here.
        if let Some(needle) = query.name_contains.as_deref() {
            let needle = needle.to_lowercase();
            notables.retain(|notable| notable.name.to_lowercase().contains(&needle));
        }
        Ok(notables)
    }

    fn recent_notables(&self, notebook_id: NotebookId, limit: u32) -> RepoResult<Vec<Notable>> {
        let mut stmt = self.conn.prepare(&format!(
            "{NOTABLE_SELECT_SQL}
             WHERE notebook_id = ?1
             ORDER BY viewed_at DESC, id DESC
             LIMIT ?2;"
        ))?;
        let mut rows = stmt.query(params![notebook_id, i64::from(limit)])?;
        collect_notables(&mut rows)
    }

    fn delete_notable(&self, notebook_id: NotebookId, id: NotableId) -> RepoResult<Vec<NoteId>> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        if load_notable(&tx, notebook_id, id)?.is_none() {
            return Err(RepoError::NotFound(RecordRef::Notable(id)));
        }

        // Phase one: collect the notes that mention this notable.
        let note_ids = linked_note_ids(&tx, id)?;

        // Phase two: tear those notes down with all their links, then the notable.
        for note_id in &note_ids {
            tx.execute("DELETE FROM notables_notes WHERE note_id = ?1;", [note_id])?;
            tx.execute("DELETE FROM notes WHERE id = ?1;", [note_id])?;
        }
        tx.execute(
            "DELETE FROM notables WHERE id = ?1 AND notebook_id = ?2;",
            params![id, notebook_id],
        )?;

        tx.commit()?;
        Ok(note_ids)
    }
}

pub(crate) fn find_notable_in(
    conn: &Connection,
    notebook_id: NotebookId,
    kind: NotableKind,
    id: NotableId,
) -> RepoResult<Option<Notable>> {
    let mut stmt = conn.prepare(&format!(
        "{NOTABLE_SELECT_SQL}
         WHERE id = ?1
           AND notebook_id = ?2
           AND type = ?3;"
    ))?;
    let row = stmt
        .query_row(params![id, notebook_id, kind.as_str()], |row| {
            Ok(parse_notable_row(row))
        })
        .optional()?;
    row.transpose()
}

pub(crate) fn parse_notable_row(row: &Row<'_>) -> RepoResult<Notable> {
    let type_text: String = row.get("type")?;
    let kind = type_text.parse::<NotableKind>().map_err(|_| {
        RepoError::InvalidData(format!("invalid notable type `{type_text}` in notables.type"))
    })?;

    Ok(Notable {
        id: row.get("id")?,
        notebook_id: row.get("notebook_id")?,
        kind,
        name: row.get("name")?,
        description: row.get("description")?,
        order_index: row.get("order_index")?,
        viewed_at: row.get("viewed_at")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

pub(crate) fn collect_notables(rows: &mut rusqlite::Rows<'_>) -> RepoResult<Vec<Notable>> {
    let mut notables = Vec::new();
    while let Some(row) = rows.next()? {
        notables.push(parse_notable_row(row)?);
    }
    Ok(notables)
}

fn load_notable(
    conn: &Connection,
    notebook_id: NotebookId,
    id: NotableId,
) -> RepoResult<Option<Notable>> {
    let mut stmt = conn.prepare(&format!(
        "{NOTABLE_SELECT_SQL}
         WHERE id = ?1
           AND notebook_id = ?2;"
    ))?;
    let row = stmt
        .query_row(params![id, notebook_id], |row| Ok(parse_notable_row(row)))
        .optional()?;
    row.transpose()
}

fn load_required_notable(
    conn: &Connection,
    notebook_id: NotebookId,
    id: NotableId,
) -> RepoResult<Notable> {
    load_notable(conn, notebook_id, id)?.ok_or(RepoError::NotFound(RecordRef::Notable(id)))
}

fn linked_note_ids(conn: &Connection, notable_id: NotableId) -> RepoResult<Vec<NoteId>> {
    let mut stmt = conn.prepare(
        "SELECT DISTINCT note_id
         FROM notables_notes
         WHERE notable_id = ?1
         ORDER BY note_id ASC;",
    )?;
    let mut rows = stmt.query([notable_id])?;
    let mut ids = Vec::new();
    while let Some(row) = rows.next()? {
        ids.push(row.get(0)?);
    }
    Ok(ids)
}
