#![allow(dead_code)]

use course_slides::Config;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

pub fn write_file(path: &Path, content: &[u8]) {
    fs::create_dir_all(path.parent().unwrap()).expect("Failed to create parent dir");
    fs::write(path, content).expect("Failed to write file");
}

/// A course project: two listed decks, one hidden deck, public assets and reveal.js
pub fn create_course_project() -> (TempDir, Config) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let root = temp_dir.path();

    write_file(
        &root.join("slides/course_metadata/metadata.json"),
        br#"{
            "title": "Modern C++",
            "description": "Learning C++ step by step",
            "noBreakWords": ["C++"],
            "favIcon": "course.ico",
            "bgLogo": "missing_logo.png"
        }"#,
    );
    write_file(&root.join("slides/course_metadata/course.ico"), b"ICO");

    write_file(
        &root.join("slides/session_1/metadata.json"),
        br#"{"title": "C++ basics", "description": "Types and values in C++"}"#,
    );
    write_file(
        &root.join("slides/session_1/index.md"),
        b"# Basics\n\n![diagram](./assets/diagram.png)\n\n---\n\n```cpp\n#include \"./assets/prog.cpp\"\n```\n",
    );
    write_file(&root.join("slides/session_1/assets/diagram.png"), b"\x89PNG");
    write_file(&root.join("slides/session_1/assets/prog.cpp"), b"int main() {}");

    write_file(
        &root.join("slides/session_2/metadata.json"),
        br#"{"title": "Pointers", "description": "Memory"}"#,
    );
    write_file(&root.join("slides/session_2/index.md"), b"# Pointers\n");

    write_file(
        &root.join("slides/session_9/metadata.json"),
        br#"{"title": "Exam answers", "description": "Not yet", "hidden": true}"#,
    );
    write_file(&root.join("slides/session_9/index.md"), b"# Answers\n");

    write_file(&root.join("public/style.css"), b"body {}");
    write_file(&root.join("public/ap_logo.png"), b"\x89PNG");
    write_file(&root.join("node_modules/reveal.js/dist/reveal.js"), b"/* reveal */");

    write_file(&root.join("secret.txt"), b"do not serve");

    let config = Config::rooted_at(root);
    (temp_dir, config)
}
