use std::fs;

use huffpack::archive::{container_path, extract, read_files, write_container};
use huffpack::{compress, decompress, Config, Entry, Error};

#[test]
fn compress_and_extract_through_disk() {
    let src = tempfile::tempdir().unwrap();
    let english = src.path().join("test_english.txt");
    let repetitive = src.path().join("test_repetitive.txt");
    let binary = src.path().join("test_binary.bin");
    fs::write(&english, "Hello, World!\nThis is a test file for Huffman compression.\n").unwrap();
    fs::write(&repetitive, "AAAAAAAAAA".repeat(100)).unwrap();
    fs::write(&binary, (0..=255u8).collect::<Vec<_>>()).unwrap();

    let paths = vec![english.clone(), repetitive.clone(), binary.clone()];
    let entries = read_files(&paths, &Config::default()).unwrap();
    let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, ["test_english.txt", "test_repetitive.txt", "test_binary.bin"]);

    let container = src.path().join(container_path(&english));
    write_container(&container, &compress(&entries).unwrap()).unwrap();
    assert!(container.ends_with("test_english.cmp"));

    let out = src.path().join("test_output");
    let restored = decompress(&fs::read(&container).unwrap()).unwrap();
    let written = extract(&restored, &out).unwrap();
    assert_eq!(written.len(), 3);

    for path in &paths {
        let name = path.file_name().unwrap();
        assert_eq!(fs::read(out.join(name)).unwrap(), fs::read(path).unwrap());
    }
}

#[test]
fn missing_input_names_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.txt");
    let err = read_files(&[missing], &Config::default()).unwrap_err();
    assert!(matches!(err, Error::File { .. }));
    assert!(err.to_string().contains("nope.txt"));
}

#[test]
fn failed_extraction_removes_partial_output() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out");
    fs::create_dir_all(out.join("blocked")).unwrap();

    // the second entry collides with a directory, so its write fails
    let entries = vec![
        Entry::new("first.txt", b"one".to_vec()),
        Entry::new("blocked", b"two".to_vec()),
    ];
    assert!(extract(&entries, &out).is_err());
    assert!(!out.join("first.txt").exists());
}

#[test]
fn write_container_replaces_atomically() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("a.cmp");
    fs::write(&path, b"old").unwrap();

    write_container(&path, b"new contents").unwrap();
    assert_eq!(fs::read(&path).unwrap(), b"new contents");

    let leftovers: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
    assert_eq!(leftovers.len(), 1);
}
