use clipsight_engine::{ensure_output_dir, AtomicFileWriter, PersistError};

#[test]
fn writes_the_payload_to_the_target_name() {
    let dir = tempfile::tempdir().expect("tempdir");
    let writer = AtomicFileWriter::new(dir.path().to_path_buf());

    let path = writer.write("clip a.mp4", b"payload").expect("write");
    assert_eq!(path, dir.path().join("clip a.mp4"));
    assert_eq!(std::fs::read(&path).unwrap(), b"payload");

    // No temp files left behind.
    let names: Vec<_> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name())
        .collect();
    assert_eq!(names, ["clip a.mp4"]);
}

#[test]
fn replaces_an_existing_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let writer = AtomicFileWriter::new(dir.path().to_path_buf());

    writer.write("job_42_assets.zip", b"first").expect("write");
    writer.write("job_42_assets.zip", b"second").expect("write");

    let content = std::fs::read(dir.path().join("job_42_assets.zip")).unwrap();
    assert_eq!(content, b"second");
}

#[test]
fn creates_the_directory_when_missing() {
    let dir = tempfile::tempdir().expect("tempdir");
    let nested = dir.path().join("downloads");
    let writer = AtomicFileWriter::new(nested.clone());

    writer.write("v.avi", b"x").expect("write");
    assert!(nested.join("v.avi").exists());
}

#[test]
fn a_traversal_name_is_stripped_to_its_basename() {
    let dir = tempfile::tempdir().expect("tempdir");
    let downloads = dir.path().join("downloads");
    let writer = AtomicFileWriter::new(downloads.clone());

    let path = writer.write("../escaped.txt", b"owned").expect("write");
    assert_eq!(path, downloads.join("escaped.txt"));
    assert_eq!(std::fs::read(&path).unwrap(), b"owned");
    // Nothing lands outside the output directory.
    assert!(!dir.path().join("escaped.txt").exists());
}

#[test]
fn backslash_separators_are_stripped_too() {
    let dir = tempfile::tempdir().expect("tempdir");
    let downloads = dir.path().join("downloads");
    let writer = AtomicFileWriter::new(downloads.clone());

    let path = writer.write("..\\..\\escaped.txt", b"owned").expect("write");
    assert_eq!(path, downloads.join("escaped.txt"));
}

#[test]
fn a_name_with_no_usable_component_is_an_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let writer = AtomicFileWriter::new(dir.path().to_path_buf());

    for name in ["", "..", ".", "outputs/", "a/.."] {
        let err = writer.write(name, b"x").unwrap_err();
        assert!(matches!(err, PersistError::Filename(_)), "for {name:?}");
    }
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn a_file_in_place_of_the_directory_is_an_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let blocker = dir.path().join("downloads");
    std::fs::write(&blocker, b"not a dir").unwrap();

    let err = ensure_output_dir(&blocker).unwrap_err();
    assert!(matches!(err, PersistError::OutputDir(_)));
}
