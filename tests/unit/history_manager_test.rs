//! Unit tests for the history store.

use std::sync::Arc;

use valbrowser::database::Database;
use valbrowser::managers::history_manager::{HistoryManager, HistoryManagerTrait};

fn manager() -> HistoryManager {
    HistoryManager::new(Arc::new(Database::open_in_memory().unwrap()))
}

#[test]
fn test_empty_history() {
    let mgr = manager();
    assert!(mgr.list_history().unwrap().is_empty());
    assert_eq!(mgr.len().unwrap(), 0);
}

#[test]
fn test_visits_are_appended_in_order_with_duplicates() {
    let mut mgr = manager();
    for url in ["https://a.example", "https://b.example", "https://a.example"] {
        mgr.record_visit(url).unwrap();
    }
    let urls: Vec<String> = mgr.list_history().unwrap().into_iter().map(|h| h.url).collect();
    assert_eq!(urls, vec!["https://a.example", "https://b.example", "https://a.example"]);
    assert_eq!(mgr.len().unwrap(), 3);
}

#[test]
fn test_each_visit_has_its_own_id() {
    let mut mgr = manager();
    let a = mgr.record_visit("https://a.example").unwrap();
    let b = mgr.record_visit("https://a.example").unwrap();
    assert_ne!(a, b);
}

#[test]
fn test_search_is_substring_and_case_insensitive() {
    let mut mgr = manager();
    mgr.record_visit("https://docs.rs/serde").unwrap();
    mgr.record_visit("https://crates.io").unwrap();
    let found = mgr.search_history("SERDE").unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].url, "https://docs.rs/serde");
}

#[test]
fn test_search_treats_wildcards_literally() {
    let mut mgr = manager();
    mgr.record_visit("https://axb.example").unwrap();
    mgr.record_visit("https://a_b.example/100%25").unwrap();
    mgr.record_visit("https://a.example/50%off").unwrap();

    let underscore: Vec<String> = mgr
        .search_history("a_b")
        .unwrap()
        .into_iter()
        .map(|h| h.url)
        .collect();
    assert_eq!(underscore, vec!["https://a_b.example/100%25"]);

    let percent: Vec<String> = mgr
        .search_history("%off")
        .unwrap()
        .into_iter()
        .map(|h| h.url)
        .collect();
    assert_eq!(percent, vec!["https://a.example/50%off"]);
}

#[test]
fn test_clear_all() {
    let mut mgr = manager();
    mgr.record_visit("https://a.example").unwrap();
    mgr.clear_all().unwrap();
    assert!(mgr.list_history().unwrap().is_empty());
}

#[test]
fn test_visit_time_is_recent() {
    let mut mgr = manager();
    let before = chrono::Utc::now().timestamp();
    mgr.record_visit("https://a.example").unwrap();
    let entry = &mgr.list_history().unwrap()[0];
    assert!(entry.visit_time >= before);
}
