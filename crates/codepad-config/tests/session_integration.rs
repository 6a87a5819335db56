use codepad_config::{SessionBackend, SessionStore, WidgetRecord};

fn record(code: &str, language: &str) -> WidgetRecord {
    WidgetRecord {
        code: code.to_string(),
        language: language.to_string(),
        dark_mode: false,
        word_wrap: true,
        show_line_numbers: true,
    }
}

#[test]
fn test_record_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("session.redb");

    let mut store = SessionStore::new(&db_path, "editor-1");
    store.connect().unwrap();
    store.set_data(&record("SELECT 1;", "sql")).unwrap();
    drop(store);

    let mut reopened = SessionStore::new(&db_path, "editor-1");
    reopened.connect().unwrap();
    assert_eq!(
        reopened.get_data().unwrap(),
        Some(record("SELECT 1;", "sql"))
    );
}

#[test]
fn test_widgets_do_not_share_records() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("session.redb");

    let mut first = SessionStore::new(&db_path, "a");
    first.connect().unwrap();
    first.set_data(&record("a()", "javascript")).unwrap();
    drop(first);

    let mut second = SessionStore::new(&db_path, "b");
    second.connect().unwrap();
    assert!(second.get_data().unwrap().is_none());
    second.set_data(&record("b = 1", "ruby")).unwrap();
    drop(second);

    let mut first = SessionStore::new(&db_path, "a");
    first.connect().unwrap();
    assert_eq!(first.get_data().unwrap().unwrap().code, "a()");
}

#[test]
fn test_connect_creates_missing_directories() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("deep").join("er").join("session.redb");
    let mut store = SessionStore::new(&db_path, "w");
    store.connect().unwrap();
    assert!(db_path.exists());
}
