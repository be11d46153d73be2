use lorekeeper_core::db::open_db_in_memory;
use lorekeeper_core::{
    Notable, NotableChanges, NotableDraft, NotableKind, NotableListQuery, NotableService,
    NotableServiceError, NotebookDraft, NotebookId, NotebookService, NoteService,
    SqliteNotableRepository, SqliteNotebookRepository, SqliteNoteRepository,
    RECENT_NOTABLES_LIMIT,
};
use rusqlite::Connection;
use uuid::Uuid;

fn create_notebook(conn: &Connection, name: &str) -> NotebookId {
    let service = NotebookService::new(SqliteNotebookRepository::try_new(conn).unwrap());
    service
        .create_notebook(Uuid::new_v4(), NotebookDraft::new(name))
        .unwrap()
        .id
}

fn notable_service(conn: &Connection) -> NotableService<SqliteNotableRepository<'_>> {
    NotableService::new(SqliteNotableRepository::try_new(conn).unwrap())
}

fn names(notables: &[Notable]) -> Vec<&str> {
    notables.iter().map(|notable| notable.name.as_str()).collect()
}

#[test]
fn order_index_is_shared_across_kinds() {
    let conn = open_db_in_memory().unwrap();
    let notebook = create_notebook(&conn, "Saga");
    let other = create_notebook(&conn, "Other");
    let service = notable_service(&conn);

    let location = service
        .create_notable(notebook, NotableDraft::new(NotableKind::Location, "Harbor"))
        .unwrap();
    let character = service
        .create_notable(notebook, NotableDraft::new(NotableKind::Character, "Mira"))
        .unwrap();
    let item = service
        .create_notable(notebook, NotableDraft::new(NotableKind::Item, "Lantern"))
        .unwrap();
    let elsewhere = service
        .create_notable(other, NotableDraft::new(NotableKind::Item, "Rope"))
        .unwrap();

    assert_eq!(
        [location.order_index, character.order_index, item.order_index],
        [0, 1, 2]
    );
    assert_eq!(elsewhere.order_index, 0);
}

#[test]
fn update_keeps_kind_and_order_index() {
    let conn = open_db_in_memory().unwrap();
    let notebook = create_notebook(&conn, "Saga");
    let service = notable_service(&conn);

    let created = service
        .create_notable(
            notebook,
            NotableDraft::new(NotableKind::Character, "Mira").with_description("pilot"),
        )
        .unwrap();
    let updated = service
        .update_notable(
            notebook,
            created.id,
            NotableChanges {
                name: "Mira Vale".to_string(),
                description: None,
            },
        )
        .unwrap();

    assert_eq!(updated.name, "Mira Vale");
    assert_eq!(updated.description, None);
    assert_eq!(updated.kind, NotableKind::Character);
    assert_eq!(updated.order_index, created.order_index);
}

#[test]
fn blank_name_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let notebook = create_notebook(&conn, "Saga");
    let service = notable_service(&conn);

    match service.create_notable(notebook, NotableDraft::new(NotableKind::Item, "  ")) {
        Err(NotableServiceError::Invalid(errors)) => {
            assert_eq!(errors.full_messages(), vec!["Name can't be blank"]);
        }
        other => panic!("expected validation failure, got {other:?}"),
    }
    assert!(service
        .list_notables(notebook, &NotableListQuery::default())
        .unwrap()
        .is_empty());
}

#[test]
fn list_filters_by_kind_and_name() {
    let conn = open_db_in_memory().unwrap();
    let notebook = create_notebook(&conn, "Saga");
    let service = notable_service(&conn);

    for (kind, name) in [
        (NotableKind::Character, "Mira"),
        (NotableKind::Location, "Mirror Lake"),
        (NotableKind::Character, "Tobias"),
        (NotableKind::Item, "Lantern"),
    ] {
        service
            .create_notable(notebook, NotableDraft::new(kind, name))
            .unwrap();
    }

    let characters = service
        .list_by_kind(notebook, NotableKind::Character)
        .unwrap();
    assert_eq!(names(&characters), vec!["Mira", "Tobias"]);

    let mir = service
        .list_notables(
            notebook,
            &NotableListQuery {
                kind: None,
                name_contains: Some("MIR".to_string()),
            },
        )
        .unwrap();
    assert_eq!(names(&mir), vec!["Mira", "Mirror Lake"]);

    let mir_locations = service
        .list_notables(
            notebook,
            &NotableListQuery {
                kind: Some(NotableKind::Location),
                name_contains: Some("mir".to_string()),
            },
        )
        .unwrap();
    assert_eq!(names(&mir_locations), vec!["Mirror Lake"]);
}

#[test]
fn name_filter_folds_non_ascii_case() {
    let conn = open_db_in_memory().unwrap();
    let notebook = create_notebook(&conn, "Saga");
    let service = notable_service(&conn);

    for name in ["Élodie", "Eloise"] {
        service
            .create_notable(notebook, NotableDraft::new(NotableKind::Character, name))
            .unwrap();
    }

    for needle in ["élodie", "ÉLODIE", "lodi"] {
        let found = service
            .list_notables(
                notebook,
                &NotableListQuery {
                    kind: None,
                    name_contains: Some(needle.to_string()),
                },
            )
            .unwrap();
        assert_eq!(names(&found), vec!["Élodie"], "needle {needle}");
    }
}

#[test]
fn recents_are_limited_and_newest_first() {
    let conn = open_db_in_memory().unwrap();
    let notebook = create_notebook(&conn, "Saga");
    let service = notable_service(&conn);

    let mut created = Vec::new();
    for name in ["A1", "A2", "A3", "A4", "A5", "A6", "A7"] {
        created.push(
            service
                .create_notable(notebook, NotableDraft::new(NotableKind::Character, name))
                .unwrap(),
        );
    }
    for (offset, notable) in created.iter().enumerate() {
        service
            .show_notable_at(notebook, notable.id, 1_000 + offset as i64)
            .unwrap();
    }
    let viewed = service
        .show_notable_at(notebook, created[0].id, 5_000)
        .unwrap();
    assert_eq!(viewed.viewed_at, 5_000);

    let recent = service.recent_notables(notebook).unwrap();
    assert_eq!(recent.len(), RECENT_NOTABLES_LIMIT as usize);
    assert_eq!(names(&recent), vec!["A1", "A7", "A6", "A5", "A4"]);
}

#[test]
fn show_and_get_are_notebook_scoped() {
    let conn = open_db_in_memory().unwrap();
    let home = create_notebook(&conn, "Home");
    let away = create_notebook(&conn, "Away");
    let service = notable_service(&conn);

    let mira = service
        .create_notable(home, NotableDraft::new(NotableKind::Character, "Mira"))
        .unwrap();

    assert!(matches!(
        service.get_notable(away, mira.id),
        Err(NotableServiceError::NotableNotFound(id)) if id == mira.id
    ));
    assert!(matches!(
        service.show_notable(away, mira.id),
        Err(NotableServiceError::NotableNotFound(_))
    ));
    assert!(matches!(
        service.create_notable(9_999, NotableDraft::new(NotableKind::Item, "Rope")),
        Err(NotableServiceError::NotebookNotFound(9_999))
    ));
}

#[test]
fn deleting_a_notable_deletes_notes_that_reference_it() {
    let conn = open_db_in_memory().unwrap();
    let notebook = create_notebook(&conn, "Saga");
    let service = notable_service(&conn);
    let notes = NoteService::new(SqliteNoteRepository::try_new(&conn).unwrap());

    let mira = service
        .create_notable(notebook, NotableDraft::new(NotableKind::Character, "Mira"))
        .unwrap();
    let harbor = service
        .create_notable(notebook, NotableDraft::new(NotableKind::Location, "Harbor"))
        .unwrap();

    let both = notes
        .create_note(
            notebook,
            &format!("{} sails from {}", mira.text_code(), harbor.text_code()),
        )
        .unwrap()
        .note;
    let harbor_only = notes
        .create_note(notebook, &format!("Fog over {}", harbor.text_code()))
        .unwrap()
        .note;
    let plain = notes.create_note(notebook, "nothing here").unwrap().note;

    let deleted = service.delete_notable(notebook, mira.id).unwrap();
    assert_eq!(deleted, vec![both.id]);

    let remaining: Vec<i64> = notes
        .list_notes(notebook)
        .unwrap()
        .into_iter()
        .map(|note| note.id)
        .collect();
    assert_eq!(remaining, vec![harbor_only.id, plain.id]);

    let harbor_notes: Vec<i64> = notes
        .list_notes_for_notable(notebook, harbor.id)
        .unwrap()
        .into_iter()
        .map(|note| note.id)
        .collect();
    assert_eq!(harbor_notes, vec![harbor_only.id]);
    assert!(matches!(
        service.get_notable(notebook, mira.id),
        Err(NotableServiceError::NotableNotFound(_))
    ));

    let orphan_links: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM notables_notes WHERE note_id = ?1 OR notable_id = ?2;",
            [both.id, mira.id],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(orphan_links, 0);
}

#[test]
fn notable_serializes_kind_as_type() {
    let conn = open_db_in_memory().unwrap();
    let notebook = create_notebook(&conn, "Saga");
    let service = notable_service(&conn);

    let lantern = service
        .create_notable(notebook, NotableDraft::new(NotableKind::Item, "Lantern"))
        .unwrap();
    let json = serde_json::to_value(&lantern).unwrap();

    assert_eq!(json["type"], "Item");
    assert_eq!(json["name"], "Lantern");
    assert_eq!(json["order_index"], 0);

    let back: Notable = serde_json::from_value(json).unwrap();
    assert_eq!(back, lantern);
}
