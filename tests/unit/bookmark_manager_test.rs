//! Unit tests for the bookmark store.

use std::sync::Arc;

use valbrowser::database::Database;
use valbrowser::managers::bookmark_manager::{BookmarkManager, BookmarkManagerTrait};
use valbrowser::types::errors::BookmarkError;

fn manager() -> BookmarkManager {
    BookmarkManager::new(Arc::new(Database::open_in_memory().unwrap()))
}

#[test]
fn test_add_and_list_in_insertion_order() {
    let mut mgr = manager();
    mgr.add_bookmark("https://b.example", "B").unwrap();
    mgr.add_bookmark("https://a.example", "A").unwrap();
    let urls: Vec<String> = mgr.list_bookmarks().unwrap().into_iter().map(|b| b.url).collect();
    assert_eq!(urls, vec!["https://b.example", "https://a.example"]);
}

#[test]
fn test_duplicate_url_is_rejected() {
    let mut mgr = manager();
    mgr.add_bookmark("https://a.example", "A").unwrap();
    let err = mgr.add_bookmark("https://a.example", "Another title").unwrap_err();
    assert!(matches!(err, BookmarkError::DuplicateUrl(url) if url == "https://a.example"));
    assert_eq!(mgr.list_bookmarks().unwrap().len(), 1);
}

#[test]
fn test_urls_differing_only_by_scheme_are_distinct() {
    let mut mgr = manager();
    mgr.add_bookmark("https://a.example", "A").unwrap();
    mgr.add_bookmark("http://a.example", "A").unwrap();
    assert_eq!(mgr.list_bookmarks().unwrap().len(), 2);
}

#[test]
fn test_contains() {
    let mut mgr = manager();
    assert!(!mgr.contains("https://a.example").unwrap());
    mgr.add_bookmark("https://a.example", "A").unwrap();
    assert!(mgr.contains("https://a.example").unwrap());
}

#[test]
fn test_remove_then_add_again() {
    let mut mgr = manager();
    let id = mgr.add_bookmark("https://a.example", "A").unwrap();
    mgr.remove_bookmark(&id).unwrap();
    assert!(mgr.list_bookmarks().unwrap().is_empty());
    mgr.add_bookmark("https://a.example", "A").unwrap();
    assert!(mgr.contains("https://a.example").unwrap());
}

#[test]
fn test_remove_unknown() {
    let mut mgr = manager();
    assert!(matches!(
        mgr.remove_bookmark("missing"),
        Err(BookmarkError::NotFound(_))
    ));
}

#[test]
fn test_title_is_stored() {
    let mut mgr = manager();
    mgr.add_bookmark("https://a.example", "Alpha").unwrap();
    assert_eq!(mgr.list_bookmarks().unwrap()[0].title, "Alpha");
}

#[test]
fn test_bookmarks_persist_across_managers_on_same_database() {
    let db = Arc::new(Database::open_in_memory().unwrap());
    BookmarkManager::new(db.clone())
        .add_bookmark("https://a.example", "A")
        .unwrap();
    assert!(BookmarkManager::new(db).contains("https://a.example").unwrap());
}
