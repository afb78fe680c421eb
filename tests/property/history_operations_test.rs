//! Property-based tests for the history log.

use std::sync::Arc;

use proptest::prelude::*;
use valbrowser::database::Database;
use valbrowser::managers::history_manager::{HistoryManager, HistoryManagerTrait};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Every visit is kept, repeats included, in the order recorded.
    #[test]
    fn history_is_an_ordered_log(
        urls in proptest::collection::vec("https://[a-c]\\.example(/[a-z]{1,3})?", 0..25),
    ) {
        let mut manager = HistoryManager::new(Arc::new(Database::open_in_memory().unwrap()));
        for url in &urls {
            manager.record_visit(url).unwrap();
        }
        let listed: Vec<String> = manager
            .list_history()
            .unwrap()
            .into_iter()
            .map(|h| h.url)
            .collect();
        prop_assert_eq!(manager.len().unwrap(), urls.len());
        prop_assert_eq!(listed, urls);
    }

    /// Search returns exactly the entries whose URL contains the needle.
    #[test]
    fn search_matches_substring_filter(
        urls in proptest::collection::vec("https://[a-c]\\.example/[a-z_%]{1,3}", 0..20),
        needle in "[a-z_%]{1,2}",
    ) {
        let mut manager = HistoryManager::new(Arc::new(Database::open_in_memory().unwrap()));
        for url in &urls {
            manager.record_visit(url).unwrap();
        }
        let found: Vec<String> = manager
            .search_history(&needle)
            .unwrap()
            .into_iter()
            .map(|h| h.url)
            .collect();
        let expected: Vec<String> = urls.iter().filter(|u| u.contains(&needle)).cloned().collect();
        prop_assert_eq!(found, expected);
    }
}
