//! Integration Test: Sleep Prohibition
//!
//! **Policy**: Production code MUST NOT call sleep. The session waits on the
//! backend future, a timeout or a channel; it never polls.
//!
//! Integration tests are held to the same rule: time-dependent tests run on
//! a paused Tokio clock instead of sleeping.

use architectural_enforcement::{report, sources_in, INTEGRATION_TEST_DIRS, PRODUCTION_DIRS};

const HINTS: &[&str] = &[
    "Instead of sleeping:",
    "  - await the future you are waiting for",
    "  - bound it with tokio::time::timeout",
    "  - wait on a watch/broadcast channel or tokio::sync::Notify",
    "  - in tests, use #[tokio::test(start_paused = true)]",
];

fn is_sleep_call(code: &str) -> bool {
    code.contains("::sleep(") || code.contains(".sleep(")
}

#[test]
fn test_no_sleep_in_production_code() {
    let mut violations = Vec::new();

    for file in sources_in(PRODUCTION_DIRS) {
        for (idx, code) in file.production_lines() {
            if is_sleep_call(code) {
                violations.push(file.violation(idx, "Sleep call"));
            }
        }
    }

    report("Sleep calls found in production code!", HINTS, &violations);
}

#[test]
fn test_no_sleep_in_integration_tests() {
    let mut violations = Vec::new();

    for file in sources_in(INTEGRATION_TEST_DIRS) {
        for (idx, code) in file.all_lines() {
            if is_sleep_call(code) {
                violations.push(file.violation(idx, "Sleep call"));
            }
        }
    }

    report("Sleep calls found in integration tests!", HINTS, &violations);
}

#[test]
fn test_sleep_detection() {
    assert!(is_sleep_call("    tokio::time::sleep(Duration::from_millis(10)).await;"));
    assert!(is_sleep_call("std::thread::sleep(d);"));
    assert!(!is_sleep_call("tokio::time::timeout(d, fut).await"));
}
