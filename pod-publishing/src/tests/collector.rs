use std::collections::HashSet;
use std::fs;

use assert_matches::assert_matches;
use rstest::rstest;
use tempfile::TempDir;

use crate::collector::{collect_files, rename_with_unique_prefix, CollectorError, FileCollector};
use crate::tests::common::{workflow_volume, write_file};
use crate::types::params::OUTPUTS_DIR;

#[rstest]
#[case::empty(0)]
#[case::single(1)]
#[case::nested(7)]
fn indices_are_contiguous_from_zero(#[case] count: usize) {
    let dir = tempfile::tempdir().unwrap();
    for i in 0..count {
        // spread files over nested directories
        let path = dir.path().join(format!("level-{}", i % 3)).join(format!("sub-{}", i % 2)).join(format!("{i}.bin"));
        write_file(&path, i);
    }

    let files = collect_files(dir.path()).unwrap();

    assert_eq!(files.len(), count);
    let indices: Vec<usize> = files.iter().map(|f| f.index).collect();
    assert_eq!(indices, (0..count).collect::<Vec<_>>());
}

#[rstest]
fn describes_type_and_length_of_each_file(workflow_volume: TempDir) {
    let mut files = collect_files(workflow_volume.path().join(OUTPUTS_DIR)).unwrap();
    files.sort_by(|a, b| a.name.cmp(&b.name));

    assert_eq!(files.len(), 2);
    assert_eq!(files[0].name, "a.txt");
    assert_eq!(files[0].content_type.as_deref(), Some("text/plain"));
    assert_eq!(files[0].content_length, 10);
    assert_eq!(files[1].name, "b.png");
    assert_eq!(files[1].content_type.as_deref(), Some("image/png"));
    assert_eq!(files[1].content_length, 2048);
    assert!(files.iter().all(|f| f.path.is_file()));
}

#[test]
fn unknown_extensions_have_no_content_type() {
    let dir = tempfile::tempdir().unwrap();
    write_file(&dir.path().join("result.unknownext"), 3);
    write_file(&dir.path().join("README"), 3);

    let files = collect_files(dir.path()).unwrap();
    assert_eq!(files.len(), 2);
    assert!(files.iter().all(|f| f.content_type.is_none()));
}

#[test]
fn directories_are_not_collected() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir_all(dir.path().join("empty/nested")).unwrap();
    write_file(&dir.path().join("empty/file.json"), 2);

    let files = collect_files(dir.path()).unwrap();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].name, "file.json");
    assert_eq!(files[0].content_type.as_deref(), Some("application/json"));
}

#[cfg(unix)]
#[test]
fn symlinks_to_files_are_collected() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("data.csv");
    write_file(&target, 5);
    std::os::unix::fs::symlink(&target, dir.path().join("link.csv")).unwrap();
    std::os::unix::fs::symlink(dir.path().join("missing"), dir.path().join("dangling.csv")).unwrap();

    let mut names: Vec<String> = collect_files(dir.path()).unwrap().into_iter().map(|f| f.name).collect();
    names.sort();
    assert_eq!(names, vec!["data.csv", "link.csv"]);
}

#[test]
fn keys_are_paths_relative_to_the_root() {
    let dir = tempfile::tempdir().unwrap();
    write_file(&dir.path().join("x/result.txt"), 1);
    write_file(&dir.path().join("y/result.txt"), 2);
    write_file(&dir.path().join("top.txt"), 3);

    let mut keys: Vec<(String, String)> =
        collect_files(dir.path()).unwrap().into_iter().map(|f| (f.key, f.name)).collect();
    keys.sort();

    assert_eq!(
        keys,
        vec![
            ("top.txt".to_string(), "top.txt".to_string()),
            ("x/result.txt".to_string(), "result.txt".to_string()),
            ("y/result.txt".to_string(), "result.txt".to_string()),
        ]
    );
}

#[cfg(target_os = "linux")]
#[test]
fn non_utf8_names_are_refused_and_left_untouched() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(OsStr::from_bytes(b"report-\xff.txt"));
    write_file(&path, 4);

    assert_matches!(collect_files(dir.path()), Err(CollectorError::NonUtf8Name(p)) if p == path);
    assert!(path.is_file());
}

#[test]
fn collector_is_lazy() {
    let dir = tempfile::tempdir().unwrap();
    for i in 0..3 {
        write_file(&dir.path().join(format!("{i}.txt")), 1);
    }

    let mut collector = FileCollector::new(dir.path());
    let first = collector.next().unwrap().unwrap();
    assert_eq!(first.index, 0);
    assert_eq!(collector.count(), 2);
}

#[test]
fn missing_root_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    assert_matches!(collect_files(dir.path().join("outputs")), Err(CollectorError::WalkError(_)));
}

#[test]
fn renamed_files_are_unique_and_keep_their_name() {
    let dir = tempfile::tempdir().unwrap();
    write_file(&dir.path().join("first/result.txt"), 4);
    write_file(&dir.path().join("second/result.txt"), 6);

    let files = collect_files(dir.path()).unwrap();
    let originals: Vec<_> = files.iter().map(|f| f.path.clone()).collect();
    let renamed = rename_with_unique_prefix(files).unwrap();

    let names: HashSet<&str> = renamed.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names.len(), 2);
    for file in &renamed {
        assert!(file.name.ends_with("-result.txt"));
        assert_ne!(file.name, "result.txt");
        assert!(file.path.is_file());
        assert_eq!(file.path.file_name().unwrap().to_str().unwrap(), file.name);
        assert!(file.key == format!("first/{}", file.name) || file.key == format!("second/{}", file.name));
    }
    assert!(originals.iter().all(|path| !path.exists()));
    assert_eq!(renamed.iter().map(|f| f.index).collect::<Vec<_>>(), vec![0, 1]);
}

#[test]
fn renaming_a_vanished_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    write_file(&dir.path().join("gone.txt"), 1);
    let files = collect_files(dir.path()).unwrap();
    fs::remove_file(dir.path().join("gone.txt")).unwrap();

    assert_matches!(rename_with_unique_prefix(files), Err(CollectorError::RenameError { .. }));
}
