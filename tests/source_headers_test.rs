// ABOUTME: Checks that every Rust source file carries the project license header
// ABOUTME: Walks src, crates and tests from the manifest directory
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use std::fs;
use std::path::{Path, PathBuf};

const LICENSE_LINE: &str = "// SPDX-License-Identifier: MIT OR Apache-2.0";
const COPYRIGHT_LINE: &str = "// Copyright (c) 2025 Async-IO.org";

fn collect_rust_files(dir: &Path, files: &mut Vec<PathBuf>) {
    for entry in fs::read_dir(dir).unwrap() {
        let path = entry.unwrap().path();
        if path.is_dir() {
            if path.file_name().is_some_and(|name| name == "target") {
                continue;
            }
            collect_rust_files(&path, files);
        } else if path.extension().is_some_and(|ext| ext == "rs") {
            files.push(path);
        }
    }
}

#[test]
fn test_every_source_file_has_license_header() {
    let root = Path::new(env!("CARGO_MANIFEST_DIR"));
    let mut files = Vec::new();
    for dir in ["src", "crates", "tests"] {
        collect_rust_files(&root.join(dir), &mut files);
    }
    assert!(!files.is_empty());

    let missing: Vec<_> = files
        .iter()
        .filter(|path| {
            let content = fs::read_to_string(path).unwrap();
            let head: Vec<&str> = content.lines().take(8).collect();
            !(head.contains(&LICENSE_LINE) && head.contains(&COPYRIGHT_LINE))
        })
        .collect();
    assert!(missing.is_empty(), "files without license header: {missing:?}");
}
