//! Hygiene: source-level standards for the canvas crate.
//!
//! Scans `src/` (excluding `_test.rs` files) for antipatterns. Every budget is
//! zero; adding an exception means removing another first.

use std::fs;
use std::path::Path;

struct SourceFile {
    path: String,
    content: String,
}

/// Pattern, budget, and what goes wrong when it slips in.
const RULES: &[(&str, usize, &str)] = &[
    // Panics: a gesture handler must never bring the page down.
    (".unwrap()", 0, "crashes the page"),
    (".expect(", 0, "crashes the page"),
    ("panic!(", 0, "crashes the page"),
    ("unreachable!(", 0, "crashes the page"),
    ("todo!(", 0, "unfinished stub"),
    ("unimplemented!(", 0, "unfinished stub"),
    // Silent loss: storage and DOM errors get logged, not dropped.
    ("let _ =", 0, "discards a result unseen"),
    (".ok()", 0, "discards an error unseen"),
    // Output goes through tracing.
    ("println!(", 0, "bypasses tracing"),
    ("eprintln!(", 0, "bypasses tracing"),
    ("dbg!(", 0, "debug leftover"),
    ("web_sys::console", 0, "bypasses tracing"),
    // Structure.
    ("#[allow(dead_code)]", 0, "hides unused code"),
];

fn source_files() -> Vec<SourceFile> {
    let mut files = Vec::new();
    collect_rs_files(Path::new(env!("CARGO_MANIFEST_DIR")).join("src").as_path(), &mut files);
    files
}

fn collect_rs_files(dir: &Path, out: &mut Vec<SourceFile>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_rs_files(&path, out);
            continue;
        }
        let path_str = path.to_string_lossy().to_string();
        if path.extension().is_none_or(|e| e != "rs") || path_str.ends_with("_test.rs") {
            continue;
        }
        if let Ok(content) = fs::read_to_string(&path) {
            out.push(SourceFile { path: path_str, content });
        }
    }
}

fn hits(files: &[SourceFile], pattern: &str) -> Vec<(String, usize)> {
    files
        .iter()
        .filter_map(|file| {
            let count = file.content.lines().filter(|line| line.contains(pattern)).count();
            (count > 0).then(|| (file.path.clone(), count))
        })
        .collect()
}

#[test]
fn sources_are_found() {
    let files = source_files();
    assert!(files.iter().any(|f| f.path.ends_with("engine.rs")), "hygiene scan found no sources");
}

#[test]
fn antipattern_budgets() {
    let files = source_files();
    let mut failures = Vec::new();
    for &(pattern, budget, why) in RULES {
        let found = hits(&files, pattern);
        let count: usize = found.iter().map(|(_, c)| c).sum();
        if count > budget {
            let listing: Vec<String> = found.iter().map(|(path, c)| format!("    {path}: {c}")).collect();
            failures.push(format!("{pattern} ({why}): found {count}, max {budget}\n{}", listing.join("\n")));
        }
    }
    assert!(failures.is_empty(), "hygiene budgets exceeded:\n{}", failures.join("\n"));
}

#[test]
fn every_module_has_sibling_tests() {
    let files = source_files();
    let missing: Vec<&str> = files
        .iter()
        .filter(|f| !f.path.ends_with("lib.rs") && !f.path.ends_with("consts.rs"))
        .filter(|f| !f.content.contains("#[cfg(test)]"))
        .map(|f| f.path.as_str())
        .collect();
    assert!(missing.is_empty(), "modules without a test module: {missing:?}");
}
