use noteapp_core::{
    InMemoryNoteStore, InvalidNoteError, InvalidOperationError, ManualClock, Note, NoteColor,
    NoteError, NoteOrder, NoteService, NoteStore, OrderDirection, OrderKey, SqliteNoteStore,
    StoreError,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

type TestService = NoteService<InMemoryNoteStore, ManualClock>;

fn setup(start_millis: i64) -> (Arc<InMemoryNoteStore>, ManualClock, TestService) {
    let store = Arc::new(InMemoryNoteStore::new());
    let clock = ManualClock::new(start_millis);
    let service = NoteService::with_clock(Arc::clone(&store), clock.clone());
    (store, clock, service)
}

fn draft(title: &str, content: &str) -> Note {
    Note::new(title, content, NoteColor::LightGreen)
}

#[test]
fn blank_title_or_content_is_rejected_without_store_write() {
    let (store, _clock, service) = setup(0);
    let cases = [
        ("", "content", InvalidNoteError::TitleEmpty),
        ("   ", "content", InvalidNoteError::TitleEmpty),
        ("title", "", InvalidNoteError::ContentEmpty),
        ("title", "\n\t ", InvalidNoteError::ContentEmpty),
        (" ", " ", InvalidNoteError::TitleEmpty),
    ];

    for (title, content, expected) in cases {
        match service.add_or_update_note(draft(title, content)) {
            Err(NoteError::InvalidNote(err)) => assert_eq!(err, expected),
            other => panic!("unexpected result for ({title:?}, {content:?}): {other:?}"),
        }
    }

    assert_eq!(store.write_count(), 0);
    assert!(store.notes().is_empty());
}

#[test]
fn update_with_blank_title_keeps_stored_note() {
    let (store, _clock, service) = setup(10);
    let mut stored = service.add_or_update_note(draft("title", "body")).unwrap();

    stored.title = " ".to_string();
    assert!(service.add_or_update_note(stored.clone()).is_err());

    let loaded = service.get_note_by_id(stored.id.unwrap()).unwrap().unwrap();
    assert_eq!(loaded.title, "title");
    assert_eq!(store.write_count(), 1);
}

#[test]
fn add_then_get_returns_same_note_with_stamped_timestamp() {
    let (_store, clock, service) = setup(1_700_000_000_000);
    let mut note = draft("Shopping", "eggs");
    note.timestamp = 42;

    let stored = service.add_or_update_note(note.clone()).unwrap();
    let loaded = service.get_note_by_id(stored.id.unwrap()).unwrap().unwrap();

    assert_eq!(loaded.title, note.title);
    assert_eq!(loaded.content, note.content);
    assert_eq!(loaded.color, note.color);
    assert_eq!(loaded.timestamp, 1_700_000_000_000);

    clock.advance(60_000);
    let mut edited = loaded.clone();
    edited.content = "eggs, milk".to_string();
    let updated = service.add_or_update_note(edited).unwrap();
    assert_eq!(updated.id, loaded.id);
    assert_eq!(updated.timestamp, 1_700_000_060_000);
}

#[test]
fn get_note_by_id_returns_none_for_unknown_id() {
    let (_store, _clock, service) = setup(0);
    assert_eq!(service.get_note_by_id(99).unwrap(), None);
}

#[test]
fn store_failure_is_passed_through() {
    let (store, _clock, service) = setup(0);
    store.fail_with("io error");

    let err = service.get_note_by_id(1).unwrap_err();
    assert!(matches!(err, NoteError::Store(StoreError::Unavailable(_))));

    let err = service.add_or_update_note(draft("t", "c")).unwrap_err();
    assert!(matches!(err, NoteError::Store(StoreError::Unavailable(_))));
}

#[test]
fn deleting_unsaved_note_is_invalid_operation() {
    let (store, _clock, service) = setup(0);
    let err = service.delete_note(&draft("t", "c")).unwrap_err();
    assert!(matches!(
        err,
        NoteError::InvalidOperation(InvalidOperationError::UnsavedNote)
    ));
    assert_eq!(store.write_count(), 0);
}

#[test]
fn delete_then_restore_yields_previous_store_state() {
    let (store, clock, service) = setup(500);
    let keep = service.add_or_update_note(draft("keep", "a")).unwrap();
    let target = service.add_or_update_note(draft("target", "b")).unwrap();
    let before = store.notes();

    service.delete_note(&target).unwrap();
    assert_eq!(service.get_note_by_id(target.id.unwrap()).unwrap(), None);

    clock.advance(10_000);
    let restored = service.restore_note(&target).unwrap();

    assert_eq!(restored, target);
    assert_eq!(restored.timestamp, 500);
    assert_eq!(store.notes(), before);
    assert_eq!(
        service.get_note_by_id(keep.id.unwrap()).unwrap(),
        Some(keep)
    );
}

#[tokio::test]
async fn get_notes_emits_sorted_list_for_every_mutation() {
    let (_store, clock, service) = setup(10);
    service.add_or_update_note(draft("B", "b")).unwrap();
    clock.set(20);
    service.add_or_update_note(draft("A", "a")).unwrap();

    let order = NoteOrder::new(OrderKey::Title, OrderDirection::Ascending);
    let mut notes = service.get_notes(order).unwrap();
    assert_eq!(notes.order(), order);

    let wait = Duration::from_secs(1);
    let titles = |list: Vec<Note>| list.into_iter().map(|n| n.title).collect::<Vec<_>>();

    let initial = timeout(wait, notes.next()).await.unwrap().unwrap();
    assert_eq!(titles(initial), vec!["A", "B"]);

    clock.set(30);
    let c = service.add_or_update_note(draft("C", "c")).unwrap();
    let after_add = timeout(wait, notes.next()).await.unwrap().unwrap();
    assert_eq!(titles(after_add), vec!["A", "B", "C"]);

    service.delete_note(&c).unwrap();
    let after_delete = timeout(wait, notes.next()).await.unwrap().unwrap();
    assert_eq!(titles(after_delete), vec!["A", "B"]);
}

#[tokio::test]
async fn get_notes_date_descending_example() {
    let store = Arc::new(InMemoryNoteStore::with_notes([
        Note {
            id: Some(1),
            title: "B".to_string(),
            content: "x".to_string(),
            timestamp: 10,
            color: NoteColor::Violet.argb(),
        },
        Note {
            id: Some(2),
            title: "A".to_string(),
            content: "x".to_string(),
            timestamp: 20,
            color: NoteColor::Violet.argb(),
        },
    ]));
    let service = NoteService::new(store);

    let mut notes = service
        .get_notes(NoteOrder::new(OrderKey::Date, OrderDirection::Descending))
        .unwrap();
    let list = notes.next().await.unwrap();
    let ids: Vec<_> = list.iter().filter_map(|note| note.id).collect();
    assert_eq!(ids, vec![2, 1]);
}

#[test]
fn service_works_against_sqlite_store() {
    let store = Arc::new(SqliteNoteStore::open_in_memory(8).unwrap());
    let service = NoteService::with_clock(Arc::clone(&store), ManualClock::new(77));

    let stored = service.add_or_update_note(draft("sql", "body")).unwrap();
    assert_eq!(stored.timestamp, 77);
    service.delete_note(&stored).unwrap();
    service.restore_note(&stored).unwrap();
    assert_eq!(store.get_by_id(stored.id.unwrap()).unwrap(), Some(stored));
}
