use lorekeeper_core::db::open_db_in_memory;
use lorekeeper_core::{
    next_order_index, NotableDraft, NotableKind, NotableService, NotebookDraft, NotebookService,
    NotebookServiceError, NoteService, OrderScope, SqliteNotableRepository,
    SqliteNotebookRepository, SqliteNoteRepository,
};
use rusqlite::Connection;
use uuid::Uuid;

fn notebook_service(conn: &Connection) -> NotebookService<SqliteNotebookRepository<'_>> {
    NotebookService::new(SqliteNotebookRepository::try_new(conn).unwrap())
}

fn count(conn: &Connection, table: &str) -> i64 {
    conn.query_row(&format!("SELECT COUNT(*) FROM {table};"), [], |row| {
        row.get(0)
    })
    .unwrap()
}

#[test]
fn notebook_order_index_is_global_across_owners() {
    let conn = open_db_in_memory().unwrap();
    let service = notebook_service(&conn);
    let alice = Uuid::new_v4();
    let bob = Uuid::new_v4();

    assert_eq!(next_order_index(&conn, OrderScope::Notebooks).unwrap(), 0);

    let first = service
        .create_notebook(alice, NotebookDraft::new("Alice One"))
        .unwrap();
    let second = service
        .create_notebook(bob, NotebookDraft::new("Bob One"))
        .unwrap();
    let third = service
        .create_notebook(alice, NotebookDraft::new("Alice Two"))
        .unwrap();

    assert_eq!(
        [first.order_index, second.order_index, third.order_index],
        [0, 1, 2]
    );
    assert_eq!(next_order_index(&conn, OrderScope::Notebooks).unwrap(), 3);
}

#[test]
fn notebooks_are_scoped_to_their_owner() {
    let conn = open_db_in_memory().unwrap();
    let service = notebook_service(&conn);
    let owner = Uuid::new_v4();
    let intruder = Uuid::new_v4();

    let first = service
        .create_notebook(owner, NotebookDraft::new("Saga").with_summary("sea stories"))
        .unwrap();
    let second = service
        .create_notebook(owner, NotebookDraft::new("Atlas"))
        .unwrap();
    service
        .create_notebook(intruder, NotebookDraft::new("Elsewhere"))
        .unwrap();

    let listed: Vec<i64> = service
        .list_notebooks(owner)
        .unwrap()
        .into_iter()
        .map(|notebook| notebook.id)
        .collect();
    assert_eq!(listed, vec![first.id, second.id]);

    assert!(matches!(
        service.get_notebook(intruder, first.id),
        Err(NotebookServiceError::NotebookNotFound(id)) if id == first.id
    ));
    assert!(matches!(
        service.update_notebook(intruder, first.id, NotebookDraft::new("Stolen")),
        Err(NotebookServiceError::NotebookNotFound(_))
    ));
    assert!(matches!(
        service.delete_notebook(intruder, first.id),
        Err(NotebookServiceError::NotebookNotFound(_))
    ));

    let fetched = service.get_notebook(owner, first.id).unwrap();
    assert_eq!(fetched.owner_id, owner);
    assert_eq!(fetched.summary.as_deref(), Some("sea stories"));
}

#[test]
fn update_replaces_fields_and_keeps_order_index() {
    let conn = open_db_in_memory().unwrap();
    let service = notebook_service(&conn);
    let owner = Uuid::new_v4();

    service
        .create_notebook(owner, NotebookDraft::new("First"))
        .unwrap();
    let second = service
        .create_notebook(owner, NotebookDraft::new("Second"))
        .unwrap();

    let updated = service
        .update_notebook(
            owner,
            second.id,
            NotebookDraft::new("Second, renamed").with_summary("now with summary"),
        )
        .unwrap();
    assert_eq!(updated.name, "Second, renamed");
    assert_eq!(updated.summary.as_deref(), Some("now with summary"));
    assert_eq!(updated.order_index, second.order_index);
}

#[test]
fn name_and_summary_limits_are_enforced() {
    let conn = open_db_in_memory().unwrap();
    let service = notebook_service(&conn);
    let owner = Uuid::new_v4();

    let draft = NotebookDraft::new("n".repeat(46)).with_summary("s".repeat(251));
    match service.create_notebook(owner, draft) {
        Err(NotebookServiceError::Invalid(errors)) => assert_eq!(
            errors.full_messages(),
            vec![
                "Name is too long (maximum is 45 characters)",
                "Summary is too long (maximum is 250 characters)",
            ]
        ),
        other => panic!("expected validation failure, got {other:?}"),
    }

    assert!(service
        .create_notebook(owner, NotebookDraft::new("n".repeat(45)))
        .is_ok());
    assert_eq!(count(&conn, "notebooks"), 1);
}

#[test]
fn deleting_a_notebook_cascades_to_its_contents() {
    let conn = open_db_in_memory().unwrap();
    let service = notebook_service(&conn);
    let owner = Uuid::new_v4();

    let doomed = service
        .create_notebook(owner, NotebookDraft::new("Doomed"))
        .unwrap();
    let kept = service
        .create_notebook(owner, NotebookDraft::new("Kept"))
        .unwrap();

    let notables = NotableService::new(SqliteNotableRepository::try_new(&conn).unwrap());
    let notes = NoteService::new(SqliteNoteRepository::try_new(&conn).unwrap());
    for notebook_id in [doomed.id, kept.id] {
        let mira = notables
            .create_notable(notebook_id, NotableDraft::new(NotableKind::Character, "Mira"))
            .unwrap();
        notes
            .create_note(notebook_id, &format!("{} was here", mira.text_code()))
            .unwrap();
    }

    service.delete_notebook(owner, doomed.id).unwrap();

    assert_eq!(count(&conn, "notebooks"), 1);
    assert_eq!(count(&conn, "notes"), 1);
    assert_eq!(count(&conn, "notables"), 1);
    assert_eq!(count(&conn, "notables_notes"), 1);
    assert_eq!(notes.list_notes(kept.id).unwrap().len(), 1);
}
