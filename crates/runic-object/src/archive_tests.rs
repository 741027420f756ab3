use std::path::Path;

use crate::{Archive, ArchiveError, RtFunction, function_name_for};

#[test]
fn name_derivation() {
    assert_eq!(function_name_for(Path::new("lib/rt_power.bin")), "power");
    assert_eq!(function_name_for(Path::new("strings.bin")), "strings");
    assert_eq!(function_name_for(Path::new("rt_.bin")), "rt_");
    assert_eq!(function_name_for(Path::new("deep/dir/rt_fmod.bin")), "fmod");
}

#[test]
fn save_load_roundtrip() {
    let mut archive = Archive::new();
    archive
        .add_function(RtFunction::new("power", vec![0x90, 0x90, 0xC3]))
        .unwrap();
    archive
        .add_function(RtFunction::new("fmod", vec![0xC3]))
        .unwrap();
    archive.add_function(RtFunction::new("concat", vec![])).unwrap();

    let mut stream = Vec::new();
    archive.save(&mut stream).unwrap();

    let loaded = Archive::load(&mut stream.as_slice()).unwrap();
    assert_eq!(loaded.len(), 3);

    let names: Vec<&str> = loaded.get_functions().keys().map(String::as_str).collect();
    assert_eq!(names, ["power", "fmod", "concat"]);

    assert_eq!(
        loaded.find_function("power").unwrap().code(),
        [0x90, 0x90, 0xC3]
    );
    assert_eq!(loaded.find_function("concat").unwrap().code(), [0u8; 0]);
    assert!(loaded.find_function("missing").is_none());
}

#[test]
fn duplicate_names_rejected() {
    let mut archive = Archive::new();
    archive
        .add_function(RtFunction::new("power", vec![1]))
        .unwrap();
    let err = archive
        .add_function(RtFunction::new("power", vec![2]))
        .unwrap_err();
    assert!(matches!(err, ArchiveError::DuplicateFunction(name) if name == "power"));
}

#[test]
fn create_rejects_colliding_stems() {
    let dir = tempfile::tempdir().unwrap();
    let a = dir.path().join("rt_power.bin");
    let b = dir.path().join("power.bin");
    std::fs::write(&a, [1]).unwrap();
    std::fs::write(&b, [2]).unwrap();

    // both inputs derive the name "power"
    let err = Archive::create(&[a, b]).unwrap_err();
    assert!(matches!(err, ArchiveError::DuplicateFunction(name) if name == "power"));
}

#[test]
fn create_reads_blobs() {
    let dir = tempfile::tempdir().unwrap();
    let a = dir.path().join("rt_power.bin");
    let b = dir.path().join("rt_concat.bin");
    std::fs::write(&a, [1, 2, 3]).unwrap();
    std::fs::write(&b, [4]).unwrap();

    let archive = Archive::create(&[a, b]).unwrap();
    assert_eq!(archive.find_function("power").unwrap().code(), [1, 2, 3]);
    assert_eq!(archive.find_function("concat").unwrap().code(), [4]);
}

#[test]
fn truncated_stream_fails_closed() {
    let mut archive = Archive::new();
    archive
        .add_function(RtFunction::new("power", vec![1, 2, 3, 4]))
        .unwrap();
    let mut stream = Vec::new();
    archive.save(&mut stream).unwrap();

    // chop into the code bytes
    stream.truncate(stream.len() - 2);
    let err = Archive::load(&mut stream.as_slice()).unwrap_err();
    assert!(matches!(err, ArchiveError::Corrupt(_)));

    // chop into the length field
    let mut short = Vec::new();
    short.extend_from_slice(&5_u16.to_le_bytes());
    short.extend_from_slice(b"po");
    let err = Archive::load(&mut short.as_slice()).unwrap_err();
    assert!(matches!(err, ArchiveError::Corrupt(_)));
}

#[test]
fn empty_stream_is_empty_archive() {
    let archive = Archive::load(&mut [].as_slice()).unwrap();
    assert!(archive.is_empty());
}

#[test]
fn roundtrip_via_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("runtime.roa");

    let mut archive = Archive::new();
    archive
        .add_function(RtFunction::new("power", vec![7; 100]))
        .unwrap();
    archive.save_to_path(&path).unwrap();

    let loaded = Archive::load_from_path(&path).unwrap();
    assert_eq!(loaded.find_function("power").unwrap().code(), vec![7; 100]);
}
