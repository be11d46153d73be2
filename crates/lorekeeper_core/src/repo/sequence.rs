//! Creation-order sequencing for notebooks, notes and notables.
//!
//! # Invariants
//! - The next index is `max(order_index in scope) + 1`, or `0` for an empty scope.
//! - Indices are computed inside the creating write transaction and never
//!   recomputed on update.
//! - Scope uniqueness is enforced by unique indexes; a violation is a data
//!   integrity failure, not a retryable error.

use crate::model::NotebookId;
use crate::repo::{RepoError, RepoResult};
use log::error;
use rusqlite::{Connection, ErrorCode};
use std::fmt::{Display, Formatter};

/// Sibling set sharing one order sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrderScope {
    /// All notebooks of all owners.
    // TODO: scope notebook ordering per owner once product confirms the intent.
    Notebooks,
    /// Notes of one notebook.
    Notes(NotebookId),
    /// Notables of one notebook, all kinds together.
    Notables(NotebookId),
}

impl Display for OrderScope {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Notebooks => write!(f, "notebooks"),
            Self::Notes(notebook_id) => write!(f, "notes of notebook {notebook_id}"),
            Self::Notables(notebook_id) => write!(f, "notables of notebook {notebook_id}"),
        }
    }
}

/// Next free order index in `scope`.
///
/// Callers must hold the write transaction that inserts the new sibling.
pub fn next_order_index(conn: &Connection, scope: OrderScope) -> RepoResult<i64> {
    let next = match scope {
        OrderScope::Notebooks => conn.query_row(
            "SELECT COALESCE(MAX(order_index), -1) + 1 FROM notebooks;",
            [],
            |row| row.get(0),
        )?,
        OrderScope::Notes(notebook_id) => conn.query_row(
            "SELECT COALESCE(MAX(order_index), -1) + 1
             FROM notes
             WHERE notebook_id = ?1;",
            [notebook_id],
            |row| row.get(0),
        )?,
        OrderScope::Notables(notebook_id) => conn.query_row(
            "SELECT COALESCE(MAX(order_index), -1) + 1
             FROM notables
             WHERE notebook_id = ?1;",
            [notebook_id],
            |row| row.get(0),
        )?,
    };
    Ok(next)
}

/// Maps a unique-index violation on `order_index` to `OrderIndexConflict`.
pub(crate) fn map_insert_error(err: rusqlite::Error, scope: OrderScope) -> RepoError {
    if is_order_index_violation(&err) {
        error!(
            "event=order_index_conflict module=repo status=error scope=\"{scope}\" error={err}"
        );
        return RepoError::OrderIndexConflict(scope);
    }
    err.into()
}

fn is_order_index_violation(err: &rusqlite::Error) -> bool {
    match err {
        rusqlite::Error::SqliteFailure(failure, Some(message)) => {
            failure.code == ErrorCode::ConstraintViolation && message.contains("order_index")
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::{map_insert_error, next_order_index, OrderScope};
    use crate::db::open_db_in_memory;
    use crate::repo::RepoError;
    use rusqlite::params;

    #[test]
    fn empty_scope_starts_at_zero_and_scopes_are_independent() {
        let conn = open_db_in_memory().unwrap();
        conn.execute(
            "INSERT INTO notebooks (owner_uuid, name, order_index) VALUES ('o', 'n', 0);",
            [],
        )
        .unwrap();
        let notebook_id = conn.last_insert_rowid();
        conn.execute(
            "INSERT INTO notes (notebook_id, content, order_index) VALUES (?1, 'hello', 4);",
            [notebook_id],
        )
        .unwrap();

        assert_eq!(next_order_index(&conn, OrderScope::Notebooks).unwrap(), 1);
        assert_eq!(
            next_order_index(&conn, OrderScope::Notes(notebook_id)).unwrap(),
            5
        );
        assert_eq!(
            next_order_index(&conn, OrderScope::Notables(notebook_id)).unwrap(),
            0
        );
    }

    #[test]
    fn duplicate_index_maps_to_conflict() {
        let conn = open_db_in_memory().unwrap();
        conn.execute(
            "INSERT INTO notebooks (owner_uuid, name, order_index) VALUES ('o', 'n', 0);",
            [],
        )
        .unwrap();
        let notebook_id = conn.last_insert_rowid();
        let insert = "INSERT INTO notes (notebook_id, content, order_index) VALUES (?1, ?2, 0);";
        conn.execute(insert, params![notebook_id, "first"]).unwrap();
        let err = conn
            .execute(insert, params![notebook_id, "second"])
            .unwrap_err();

        let scope = OrderScope::Notes(notebook_id);
        assert!(matches!(
            map_insert_error(err, scope),
            RepoError::OrderIndexConflict(found) if found == scope
        ));
    }
}
