//! Integration Test: Core Surface Independence
//!
//! **Policy**: `lca-conductor-core` is UI-agnostic. It must not depend on
//! terminal, CLI or logging-subscriber crates; those belong to surfaces such
//! as `lca-chat`.

use std::fs;

use architectural_enforcement::workspace_root;

/// Crates that only a surface may use
const SURFACE_ONLY: &[&str] = &[
    "clap",
    "crossterm",
    "ratatui",
    "tracing-subscriber",
    "anyhow",
];

fn dependency_names(manifest: &str, table: &str) -> Vec<String> {
    let value: toml::Table = toml::from_str(manifest).expect("core manifest parses");
    value
        .get(table)
        .and_then(toml::Value::as_table)
        .map(|deps| deps.keys().cloned().collect())
        .unwrap_or_default()
}

#[test]
fn test_core_has_no_surface_dependencies() {
    let path = workspace_root().join("conductor/core/Cargo.toml");
    let manifest = fs::read_to_string(&path).expect("core manifest readable");

    let offending: Vec<_> = dependency_names(&manifest, "dependencies")
        .into_iter()
        .filter(|name| SURFACE_ONLY.contains(&name.as_str()))
        .collect();

    assert!(
        offending.is_empty(),
        "conductor/core depends on surface-only crates: {offending:?}"
    );
}

#[test]
fn test_dependency_names() {
    let manifest = "[dependencies]\ntokio = \"1\"\nclap = { version = \"4\" }\n";
    let mut names = dependency_names(manifest, "dependencies");
    names.sort();
    assert_eq!(names, vec!["clap", "tokio"]);
}
