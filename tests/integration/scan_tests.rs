use photodedupe::duplicates::{resolve_all, DuplicateFinder, FinderConfig};
use photodedupe::scanner::{ExtensionFilter, WalkerConfig};
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn write(root: &Path, rel: &str, content: &[u8]) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

#[test]
fn test_scan_empty_directory() {
    let dir = tempdir().unwrap();
    let finder = DuplicateFinder::with_defaults();

    let (sets, summary) = finder.find_duplicates(dir.path()).unwrap();

    assert!(sets.is_empty());
    assert_eq!(summary.total_files, 0);
    assert_eq!(summary.duplicate_sets, 0);
}

#[test]
fn test_scan_unique_files() {
    let dir = tempdir().unwrap();
    write(dir.path(), "a.jpg", b"content a");
    write(dir.path(), "b.jpg", b"content bb");
    write(dir.path(), "c.jpg", b"content ccc");

    let (sets, summary) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    assert!(sets.is_empty());
    assert_eq!(summary.total_files, 3);
    assert_eq!(summary.eliminated_by_size, 3);
    assert_eq!(summary.candidates, 0);
}

#[test]
fn test_scan_nested_duplicates_and_resolution() {
    let dir = tempdir().unwrap();
    let content = vec![9u8; 500];
    write(dir.path(), "a/2020-01-01/img.jpg", &content);
    write(dir.path(), "a/2020-01-01/copy/img.jpg", &content);

    let (sets, _) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();
    let resolved = resolve_all(&sets);

    assert_eq!(resolved.len(), 1);
    assert_eq!(
        resolved[0].original,
        dir.path().join("a/2020-01-01/img.jpg")
    );
    assert_eq!(
        resolved[0].rejects,
        vec![dir.path().join("a/2020-01-01/copy/img.jpg")]
    );
}

#[test]
fn test_scan_ignores_files_outside_allow_list() {
    let dir = tempdir().unwrap();
    write(dir.path(), "a.jpg", b"same");
    write(dir.path(), "b.txt", b"same");
    write(dir.path(), "c.JPEG", b"same");

    let (sets, summary) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    assert_eq!(summary.total_files, 2);
    assert_eq!(sets.len(), 1);
    assert!(sets[0]
        .paths
        .iter()
        .all(|p| p.extension().unwrap() != "txt"));
}

#[test]
fn test_scan_with_custom_extensions() {
    let dir = tempdir().unwrap();
    write(dir.path(), "a.cr2", b"raw");
    write(dir.path(), "b.cr2", b"raw");
    write(dir.path(), "c.jpg", b"raw");

    let walker = WalkerConfig::default().with_extensions(ExtensionFilter::new(["CR2"]));
    let finder = DuplicateFinder::new(FinderConfig::default().with_walker_config(walker));
    let (sets, summary) = finder.find_duplicates(dir.path()).unwrap();

    assert_eq!(summary.total_files, 2);
    assert_eq!(sets.len(), 1);
}

#[test]
fn test_scan_size_bounds() {
    let dir = tempdir().unwrap();
    write(dir.path(), "small1.jpg", b"ab");
    write(dir.path(), "small2.jpg", b"ab");
    write(dir.path(), "big1.jpg", &[1u8; 200]);
    write(dir.path(), "big2.jpg", &[1u8; 200]);

    let walker = WalkerConfig::default().with_size_bounds(Some(100), None);
    let finder = DuplicateFinder::new(FinderConfig::default().with_walker_config(walker));
    let (sets, summary) = finder.find_duplicates(dir.path()).unwrap();

    assert_eq!(summary.total_files, 2);
    assert_eq!(sets.len(), 1);
    assert_eq!(sets[0].size, 200);
}

#[test]
fn test_scan_many_sets_parallel_matches_sequential() {
    let dir = tempdir().unwrap();
    for day in 0..5 {
        for copy in 0..3 {
            let content = format!("photo of day {day}");
            write(
                dir.path(),
                &format!("2021-01-0{day}/import{copy}/IMG_{day}.jpg"),
                content.as_bytes(),
            );
        }
    }

    let sequential = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap()
        .0;
    let parallel = DuplicateFinder::new(FinderConfig::default().with_io_threads(4))
        .find_duplicates(dir.path())
        .unwrap()
        .0;

    assert_eq!(sequential.len(), 5);
    assert_eq!(sequential, parallel);
    assert_eq!(resolve_all(&sequential), resolve_all(&parallel));
}

#[test]
fn test_zero_length_files_are_duplicates() {
    let dir = tempdir().unwrap();
    write(dir.path(), "empty1.jpg", b"");
    write(dir.path(), "empty2.jpg", b"");

    let (sets, summary) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    assert_eq!(sets.len(), 1);
    assert_eq!(summary.reclaimable_space, 0);
}

#[test]
#[cfg(unix)]
fn test_unreadable_directory_is_collected_not_fatal() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempdir().unwrap();
    write(dir.path(), "a.jpg", b"dup");
    write(dir.path(), "b.jpg", b"dup");
    let locked = dir.path().join("locked");
    write(dir.path(), "locked/c.jpg", b"dup");
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

    // Privileged users can still read the directory
    if fs::read_dir(&locked).is_ok() {
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
        return;
    }

    let result = DuplicateFinder::with_defaults().find_duplicates(dir.path());
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

    let (sets, summary) = result.unwrap();
    assert_eq!(sets.len(), 1);
    assert_eq!(sets[0].len(), 2);
    assert!(summary.has_errors());
}
