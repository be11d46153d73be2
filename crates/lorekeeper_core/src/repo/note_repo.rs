//! Note repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist notes together with their link set to notables.
//! - Apply link-set deltas atomically with the content write.
//!
//! # Invariants
//! - A note's content and its links commit together or not at all.
//! - Links only ever point at notables of the note's own notebook.
//! - `order_index` is assigned on insert and never touched by updates.
//! - Deleting a note removes only its own link rows.

use crate::model::link::LinkDelta;
use crate::model::notable::{Notable, NotableKind};
use crate::model::note::Note;
use crate::model::{NotableId, NoteId, NotebookId};
use crate::repo::notable_repo::{
    collect_notables, find_notable_in, NotableLookup, LINK_COLUMNS, NOTABLE_COLUMNS,
};
use crate::repo::sequence::{map_insert_error, next_order_index, OrderScope};
use crate::repo::{ensure_notebook_exists, ensure_schema_ready, RecordRef, RepoError, RepoResult};
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction, TransactionBehavior};
use std::collections::BTreeSet;

const NOTE_SELECT_SQL: &str = "SELECT
    notes.id,
    notes.notebook_id,
    notes.content,
    notes.order_index,
    notes.created_at,
    notes.updated_at
FROM notes";

const NOTE_COLUMNS: &[&str] = &[
    "id",
    "notebook_id",
    "content",
    "order_index",
    "created_at",
    "updated_at",
];

/// Repository interface for notes and their link sets.
pub trait NoteRepository: NotableLookup {
    fn notebook_exists(&self, notebook_id: NotebookId) -> RepoResult<bool>;
    /// Whether note `id` exists inside `notebook_id`.
    fn note_exists(&self, notebook_id: NotebookId, id: NoteId) -> RepoResult<bool>;
    /// Inserts a note with the next order index and links it to `links`.
    fn create_note(
        &self,
        notebook_id: NotebookId,
        content: &str,
        links: &BTreeSet<NotableId>,
    ) -> RepoResult<Note>;
    /// Replaces content and reconciles the link set to exactly `links`.
    fn update_note(
        &self,
        notebook_id: NotebookId,
        id: NoteId,
        content: &str,
        links: &BTreeSet<NotableId>,
    ) -> RepoResult<(Note, LinkDelta)>;
    fn get_note(&self, notebook_id: NotebookId, id: NoteId) -> RepoResult<Option<Note>>;
    /// Notables linked to one note, by order index.
    fn linked_notables(&self, notebook_id: NotebookId, id: NoteId) -> RepoResult<Vec<Notable>>;
    /// Notes of one notebook, by order index.
    fn list_notes(&self, notebook_id: NotebookId) -> RepoResult<Vec<Note>>;
    /// Notes of one notebook that link to no notable, by order index.
    fn list_unlinked_notes(&self, notebook_id: NotebookId) -> RepoResult<Vec<Note>>;
    /// Notes linking to one notable, by order index.
    fn list_notes_for_notable(
        &self,
        notebook_id: NotebookId,
        notable_id: NotableId,
    ) -> RepoResult<Vec<Note>>;
    fn delete_note(&self, notebook_id: NotebookId, id: NoteId) -> RepoResult<()>;
}

/// SQLite-backed note repository.
pub struct SqliteNoteRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteNoteRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_schema_ready(
            conn,
            &[
                ("notes", NOTE_COLUMNS),
                ("notables", NOTABLE_COLUMNS),
                ("notables_notes", LINK_COLUMNS),
            ],
        )?;
        Ok(Self { conn })
    }
}

impl NotableLookup for SqliteNoteRepository<'_> {
    fn find_notable(
        &self,
        notebook_id: NotebookId,
        kind: NotableKind,
        id: NotableId,
    ) -> RepoResult<Option<Notable>> {
        find_notable_in(self.conn, notebook_id, kind, id)
    }
}

impl NoteRepository for SqliteNoteRepository<'_> {
    fn notebook_exists(&self, notebook_id: NotebookId) -> RepoResult<bool> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM notebooks WHERE id = ?1);",
            [notebook_id],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }

    fn note_exists(&self, notebook_id: NotebookId, id: NoteId) -> RepoResult<bool> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM notes WHERE id = ?1 AND notebook_id = ?2);",
            params![id, notebook_id],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }

    fn create_note(
        &self,
        notebook_id: NotebookId,
        content: &str,
        links: &BTreeSet<NotableId>,
    ) -> RepoResult<Note> {
        let scope = OrderScope::Notes(notebook_id);
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        ensure_notebook_exists(&tx, notebook_id)?;

        let order_index = next_order_index(&tx, scope)?;
        tx.execute(
            "INSERT INTO notes (notebook_id, content, order_index) VALUES (?1, ?2, ?3);",
            params![notebook_id, content, order_index],
        )
        .map_err(|err| map_insert_error(err, scope))?;
        let id = tx.last_insert_rowid();

        let delta = LinkDelta::between(&BTreeSet::new(), links);
        apply_link_delta(&tx, notebook_id, id, &delta)?;

        let note = load_required_note(&tx, notebook_id, id)?;
        tx.commit()?;
        Ok(note)
    }

    fn update_note(
        &self,
        notebook_id: NotebookId,
        id: NoteId,
        content: &str,
        links: &BTreeSet<NotableId>,
    ) -> RepoResult<(Note, LinkDelta)> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let changed = tx.execute(
            "UPDATE notes
             SET
                content = ?1,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?2
               AND notebook_id = ?3;",
            params![content, id, notebook_id],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(RecordRef::Note(id)));
        }

        let current = linked_notable_ids(&tx, id)?;
        let delta = LinkDelta::between(&current, links);
        apply_link_delta(&tx, notebook_id, id, &delta)?;

        let note = load_required_note(&tx, notebook_id, id)?;
        tx.commit()?;
        Ok((note, delta))
    }

    fn get_note(&self, notebook_id: NotebookId, id: NoteId) -> RepoResult<Option<Note>> {
        load_note(self.conn, notebook_id, id)
    }

    fn linked_notables(&self, notebook_id: NotebookId, id: NoteId) -> RepoResult<Vec<Notable>> {
        let mut stmt = self.conn.prepare(
            "SELECT
                notables.id,
                notables.notebook_id,
                notables.type,
                notables.name,
                notables.description,
                notables.order_index,
                notables.viewed_at,
                notables.created_at,
                notables.updated_at
             FROM notables
             INNER JOIN notables_notes nn ON nn.notable_id = notables.id
             WHERE nn.note_id = ?1
               AND notables.notebook_id = ?2
             ORDER BY notables.order_index ASC, notables.id ASC;",
        )?;
        let mut rows = stmt.query(params![id, notebook_id])?;
        collect_notables(&mut rows)
    }

    fn list_notes(&self, notebook_id: NotebookId) -> RepoResult<Vec<Note>> {
        query_notes(
            self.conn,
            &format!(
                "{NOTE_SELECT_SQL}
                 WHERE notes.notebook_id = ?1
                 ORDER BY notes.order_index ASC, notes.id ASC;"
            ),
            notebook_id,
        )
    }

    fn list_unlinked_notes(&self, notebook_id: NotebookId) -> RepoResult<Vec<Note>> {
        query_notes(
            self.conn,
            &format!(
                "{NOTE_SELECT_SQL}
                 WHERE notes.notebook_id = ?1
                   AND NOT EXISTS (
                       SELECT 1 FROM notables_notes nn WHERE nn.note_id = notes.id
                   )
                 ORDER BY notes.order_index ASC, notes.id ASC;"
            ),
            notebook_id,
        )
    }

    fn list_notes_for_notable(
        &self,
        notebook_id: NotebookId,
        notable_id: NotableId,
    ) -> RepoResult<Vec<Note>> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM notables WHERE id = ?1 AND notebook_id = ?2);",
            params![notable_id, notebook_id],
            |row| row.get(0),
        )?;
        if exists != 1 {
            return Err(RepoError::NotFound(RecordRef::Notable(notable_id)));
        }

        let mut stmt = self.conn.prepare(&format!(
            "{NOTE_SELECT_SQL}
             INNER JOIN notables_notes nn ON nn.note_id = notes.id
             WHERE nn.notable_id = ?1
               AND notes.notebook_id = ?2
             ORDER BY notes.order_index ASC, notes.id ASC;"
        ))?;
        let mut rows = stmt.query(params![notable_id, notebook_id])?;
        let mut notes = Vec::new();
        while let Some(row) = rows.next()? {
            notes.push(parse_note_row(row)?);
        }
        Ok(notes)
    }

    fn delete_note(&self, notebook_id: NotebookId, id: NoteId) -> RepoResult<()> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        if load_note(&tx, notebook_id, id)?.is_none() {
            return Err(RepoError::NotFound(RecordRef::Note(id)));
        }
        tx.execute("DELETE FROM notables_notes WHERE note_id = ?1;", [id])?;
        tx.execute("DELETE FROM notes WHERE id = ?1;", [id])?;
        tx.commit()?;
        Ok(())
    }
}

fn apply_link_delta(
    tx: &Transaction<'_>,
    notebook_id: NotebookId,
    note_id: NoteId,
    delta: &LinkDelta,
) -> RepoResult<()> {
    for notable_id in &delta.to_unlink {
        tx.execute(
            "DELETE FROM notables_notes WHERE note_id = ?1 AND notable_id = ?2;",
            params![note_id, notable_id],
        )?;
    }

    for notable_id in &delta.to_link {
        let inserted = tx.execute(
            "INSERT INTO notables_notes (notable_id, note_id)
             SELECT id, ?2
             FROM notables
             WHERE id = ?1
               AND notebook_id = ?3;",
            params![notable_id, note_id, notebook_id],
        )?;
        if inserted == 0 {
            return Err(RepoError::InvalidData(format!(
                "notable {notable_id} is not part of notebook {notebook_id}"
            )));
        }
    }

    Ok(())
}

fn linked_notable_ids(conn: &Connection, note_id: NoteId) -> RepoResult<BTreeSet<NotableId>> {
    let mut stmt = conn.prepare("SELECT notable_id FROM notables_notes WHERE note_id = ?1;")?;
    let mut rows = stmt.query([note_id])?;
    let mut ids = BTreeSet::new();
    while let Some(row) = rows.next()? {
        ids.insert(row.get(0)?);
    }
    Ok(ids)
}

fn query_notes(conn: &Connection, sql: &str, notebook_id: NotebookId) -> RepoResult<Vec<Note>> {
    let mut stmt = conn.prepare(sql)?;
    let mut rows = stmt.query([notebook_id])?;
    let mut notes = Vec::new();
    while let Some(row) = rows.next()? {
        notes.push(parse_note_row(row)?);
    }
    Ok(notes)
}

fn load_note(conn: &Connection, notebook_id: NotebookId, id: NoteId) -> RepoResult<Option<Note>> {
    let mut stmt = conn.prepare(&format!(
        "{NOTE_SELECT_SQL}
         WHERE notes.id = ?1
           AND notes.notebook_id = ?2;"
    ))?;
    let note = stmt
        .query_row(params![id, notebook_id], |row| Ok(parse_note_row(row)))
        .optional()?;
    note.transpose()
}

fn load_required_note(conn: &Connection, notebook_id: NotebookId, id: NoteId) -> RepoResult<Note> {
    load_note(conn, notebook_id, id)?.ok_or(RepoError::NotFound(RecordRef::Note(id)))
}

fn parse_note_row(row: &Row<'_>) -> RepoResult<Note> {
    Ok(Note {
        id: row.get("id")?,
        notebook_id: row.get("notebook_id")?,
        content: row.get("content")?,
        order_index: row.get("order_index")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}
