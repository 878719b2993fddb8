//! Integration Test: Blocking I/O Prohibition
//!
//! **Policy**: Async functions MUST NOT perform blocking I/O.
//! **Required**: `tokio::io`, `tokio::net`, `tokio::process` and async
//! `reqwest` inside async code.
//!
//! Blocking calls are acceptable in plain functions that run before the
//! session starts (configuration loading, logging setup) and in tests.

use architectural_enforcement::{report, sources_in, FnKind, SourceFile, PRODUCTION_DIRS};

const HINTS: &[&str] = &[
    "FORBIDDEN in async fn:",
    "  - std::fs::*, std::net::*, std::process::Command",
    "  - std::io::stdin(), std::io::stdout()",
    "  - reqwest::blocking::*",
    "REQUIRED instead:",
    "  - tokio::fs, tokio::net, tokio::process",
    "  - tokio::io::stdin() with AsyncBufReadExt",
    "  - reqwest::Client",
];

/// Blocking patterns that are wrong anywhere in async code
const ASYNC_FORBIDDEN: &[(&str, &str)] = &[
    ("std::fs::", "Blocking file I/O"),
    ("std::net::", "Blocking network I/O"),
    ("std::process::Command", "Blocking process I/O"),
    ("std::io::stdin()", "Blocking stdin in async"),
    ("std::io::stdout()", "Blocking stdout in async"),
];

fn check_file(file: &SourceFile, violations: &mut Vec<String>) {
    for (idx, code) in file.production_lines() {
        if code.contains("reqwest::blocking") {
            violations.push(file.violation(idx, "Blocking HTTP client"));
        }

        if file.enclosing_fn(idx) != Some(FnKind::Async) {
            continue;
        }
        for (pattern, what) in ASYNC_FORBIDDEN {
            if code.contains(pattern) {
                violations.push(file.violation(idx, what));
            }
        }
    }
}

#[test]
fn test_no_blocking_io_in_async_code() {
    let mut violations = Vec::new();
    for file in sources_in(PRODUCTION_DIRS) {
        check_file(&file, &mut violations);
    }

    report(
        "Blocking I/O calls found in async production code!",
        HINTS,
        &violations,
    );
}

#[test]
fn test_blocking_io_detection() {
    let file = SourceFile {
        path: "x.rs".into(),
        lines: [
            "fn load() {",
            "    std::fs::read_to_string(\"config.toml\");",
            "}",
            "pub async fn serve() {",
            "    let s = std::fs::read_to_string(\"file.txt\");",
            "    let c = reqwest::blocking::Client::new();",
            "}",
        ]
        .iter()
        .map(|s| (*s).to_string())
        .collect(),
    };

    let mut violations = Vec::new();
    check_file(&file, &mut violations);

    assert_eq!(violations.len(), 2, "{violations:#?}");
    assert!(violations[0].starts_with("x.rs:5 - Blocking file I/O"));
    assert!(violations[1].starts_with("x.rs:6 - Blocking HTTP client"));
}
