use tower_lsp::lsp_types::{Position, Range};

use super::*;

fn uri(name: &str) -> Url {
    Url::parse(&format!("file:///project/{name}")).unwrap()
}

#[test]
fn open_get_close() {
    let store = DocumentStore::new();
    let login = uri("LoginTest.java");
    store.open(login.clone(), "void test_a() {}".to_string(), 1);

    let document = store.get(&login).unwrap();
    assert_eq!(document.text, "void test_a() {}");
    assert_eq!(document.version, 1);
    assert_eq!(store.all_uris(), vec![login.clone()]);

    store.close(&login);
    assert!(store.get(&login).is_none());
    assert!(store.all_uris().is_empty());
}

#[test]
fn reopening_replaces_the_mirror() {
    let store = DocumentStore::new();
    let login = uri("LoginTest.java");
    store.open(login.clone(), "v1".to_string(), 1);
    store.open(login.clone(), "v2".to_string(), 5);

    let document = store.get(&login).unwrap();
    assert_eq!(document.text, "v2");
    assert_eq!(document.version, 5);
}

#[test]
fn incremental_changes_reach_the_mirror() {
    let store = DocumentStore::new();
    let login = uri("LoginTest.java");
    store.open(login.clone(), "void test_a() {}\n".to_string(), 1);

    store.apply_changes(
        &login,
        vec![TextDocumentContentChangeEvent {
            range: Some(Range::new(Position::new(0, 0), Position::new(0, 0))),
            range_length: None,
            text: "@Suppress\n".to_string(),
        }],
        2,
    );

    let document = store.get(&login).unwrap();
    assert_eq!(document.text, "@Suppress\nvoid test_a() {}\n");
    assert_eq!(document.version, 2);
}

#[test]
fn changes_for_untracked_uri_are_ignored() {
    let store = DocumentStore::default();
    store.apply_changes(
        &uri("Missing.java"),
        vec![TextDocumentContentChangeEvent {
            range: None,
            range_length: None,
            text: "void test_x() {}".to_string(),
        }],
        2,
    );
    assert!(store.all_uris().is_empty());
}

#[test]
fn snapshot_is_detached_from_later_edits() {
    let store = DocumentStore::new();
    let login = uri("LoginTest.java");
    store.open(login.clone(), "void test_a() {}\n".to_string(), 1);

    let snapshot = store.snapshot(&login).unwrap();
    store.apply_changes(
        &login,
        vec![TextDocumentContentChangeEvent {
            range: None,
            range_length: None,
            text: String::new(),
        }],
        2,
    );

    assert_eq!(snapshot.as_str(), "void test_a() {}\n");
    assert_eq!(store.with_document(&login, |doc| doc.text.len()), Some(0));
}

#[test]
fn unknown_uri_has_no_document() {
    let store = DocumentStore::default();
    let missing = uri("Missing.java");
    assert!(store.with_document(&missing, |_| ()).is_none());
    assert!(store.snapshot(&missing).is_none());
}
