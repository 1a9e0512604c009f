use std::fs;
use tempfile::TempDir;
use viewer_engine::{ensure_output_dir, AtomicFileWriter};

#[test]
fn creates_missing_output_dir() {
    let temp = TempDir::new().unwrap();
    let new_dir = temp.path().join("out");
    assert!(!new_dir.exists());
    ensure_output_dir(&new_dir).unwrap();
    assert!(new_dir.is_dir());
}

#[test]
fn atomic_write_replaces_existing() {
    let temp = TempDir::new().unwrap();
    let writer = AtomicFileWriter::new(temp.path().to_path_buf());

    let first = writer.write("prefs.ron", "(theme: \"dark\")").unwrap();
    assert_eq!(first.file_name().unwrap(), "prefs.ron");
    assert_eq!(fs::read_to_string(&first).unwrap(), "(theme: \"dark\")");

    let second = writer.write("prefs.ron", "(theme: \"light\")").unwrap();
    assert_eq!(first, second);
    assert_eq!(fs::read_to_string(&second).unwrap(), "(theme: \"light\")");
}

#[test]
fn no_partial_file_on_error() {
    let temp = TempDir::new().unwrap();
    let file_path = temp.path().join("not_a_dir");
    fs::write(&file_path, "x").unwrap();

    let writer = AtomicFileWriter::new(file_path.clone());
    let result = writer.write("page.html", "data");
    assert!(result.is_err());
    assert!(!file_path.with_file_name("page.html").exists());
}
