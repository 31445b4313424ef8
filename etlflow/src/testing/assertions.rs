//! Assertions over recorded store traffic.

use super::RecordingStore;

/// Asserts that some executed payload contains `fragment`.
pub fn assert_executed(store: &RecordingStore, fragment: &str) {
    assert!(
        store.count_containing(fragment) > 0,
        "Expected a payload containing '{}', got: {:?}",
        fragment,
        store.payloads()
    );
}

/// Asserts that no executed payload contains `fragment`.
pub fn assert_not_executed(store: &RecordingStore, fragment: &str) {
    assert_eq!(
        store.count_containing(fragment),
        0,
        "Expected no payload containing '{}', got: {:?}",
        fragment,
        store.payloads()
    );
}

/// Asserts that payloads containing each fragment ran in the given order.
pub fn assert_executed_in_order(store: &RecordingStore, fragments: &[&str]) {
    let payloads = store.payloads();
    let positions: Vec<Option<usize>> = fragments
        .iter()
        .map(|fragment| payloads.iter().position(|p| p.contains(fragment)))
        .collect();
    assert!(
        positions.iter().all(Option::is_some) && positions.windows(2).all(|w| w[0] < w[1]),
        "Expected payloads in order {:?}, got: {:?}",
        fragments,
        payloads
    );
}
