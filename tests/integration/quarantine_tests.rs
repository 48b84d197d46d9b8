use photodedupe::actions::{QuarantineAbort, QuarantineError, QuarantinePlacement, RunMode};
use photodedupe::config::Config;
use photodedupe::output::TextReport;
use photodedupe::RunAborted;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn write(root: &Path, rel: &str, content: &[u8]) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn scenario_tree(root: &Path) {
    let content = vec![0x5au8; 500];
    write(root, "a/2020-01-01/img.jpg", &content);
    write(root, "a/2020-01-01/copy/img.jpg", &content);
}

#[test]
fn test_live_scenario_beside_reject() {
    let dir = tempdir().unwrap();
    scenario_tree(dir.path());

    let config = Config {
        placement: QuarantinePlacement::BesideReject,
        ..Config::default()
    };
    let result = photodedupe::run(dir.path(), &config, RunMode::Live, None).unwrap();

    let original = dir.path().join("a/2020-01-01/img.jpg");
    let moved = dir.path().join("a/2020-01-01/copy/_Rejected/img_1.jpg");
    assert_eq!(result.sets.len(), 1);
    assert!(original.exists());
    assert!(!dir.path().join("a/2020-01-01/copy/img.jpg").exists());
    assert!(moved.exists());
    assert_eq!(fs::read(&moved).unwrap(), vec![0x5au8; 500]);
}

#[test]
fn test_live_scenario_beside_original() {
    let dir = tempdir().unwrap();
    scenario_tree(dir.path());

    let result = photodedupe::run(dir.path(), &Config::default(), RunMode::Live, None).unwrap();

    assert!(dir.path().join("a/2020-01-01/_Rejected/img_1.jpg").exists());
    assert!(result.outcomes[0].applied);
}

#[test]
fn test_simulation_moves_nothing_and_is_repeatable() {
    let dir = tempdir().unwrap();
    scenario_tree(dir.path());
    write(dir.path(), "b/one.mov", b"clip");
    write(dir.path(), "b/two/one.mov", b"clip");
    write(dir.path(), "b/three/one.mov", b"clip");

    let first = photodedupe::run(dir.path(), &Config::default(), RunMode::Simulate, None).unwrap();
    let second = photodedupe::run(dir.path(), &Config::default(), RunMode::Simulate, None).unwrap();

    assert_eq!(first.sets, second.sets);
    assert_eq!(first.outcomes, second.outcomes);
    assert!(dir.path().join("a/2020-01-01/copy/img.jpg").exists());
    assert!(!dir.path().join("a/2020-01-01/_Rejected").exists());
    assert!(!dir.path().join("b/_Rejected").exists());
    assert_eq!(first.report().relocation_count(), 3);
}

#[test]
fn test_live_run_then_rescan_finds_nothing() {
    let dir = tempdir().unwrap();
    scenario_tree(dir.path());

    photodedupe::run(dir.path(), &Config::default(), RunMode::Live, None).unwrap();
    let again = photodedupe::run(dir.path(), &Config::default(), RunMode::Live, None).unwrap();

    assert!(again.sets.is_empty());
    assert_eq!(again.summary.total_files, 1);
}

#[test]
fn test_rejects_get_sequence_numbers() {
    let dir = tempdir().unwrap();
    write(dir.path(), "img.jpg", b"same");
    write(dir.path(), "x/img.jpg", b"same");
    write(dir.path(), "y/img.jpg", b"same");

    let result = photodedupe::run(dir.path(), &Config::default(), RunMode::Live, None).unwrap();

    let quarantine = dir.path().join("_Rejected");
    assert!(quarantine.join("img_1.jpg").exists());
    assert!(quarantine.join("img_2.jpg").exists());
    assert!(dir.path().join("img.jpg").exists());
    assert_eq!(result.outcomes[0].relocations.len(), 2);
}

#[test]
fn test_prior_run_leftovers_are_never_overwritten() {
    let dir = tempdir().unwrap();
    write(dir.path(), "img.jpg", b"new shot");
    write(dir.path(), "dup/img.jpg", b"new shot");
    write(dir.path(), "_Rejected/img_1.jpg", b"older reject");

    photodedupe::run(dir.path(), &Config::default(), RunMode::Live, None).unwrap();

    let quarantine = dir.path().join("_Rejected");
    assert_eq!(fs::read(quarantine.join("img_1.jpg")).unwrap(), b"older reject");
    assert_eq!(fs::read(quarantine.join("img_1_2.jpg")).unwrap(), b"new shot");
}

#[test]
fn test_equal_size_different_content_moves_nothing() {
    let dir = tempdir().unwrap();
    write(dir.path(), "p/a.jpg", b"1234");
    write(dir.path(), "q/a.jpg", b"5678");

    let result = photodedupe::run(dir.path(), &Config::default(), RunMode::Live, None).unwrap();

    assert!(result.sets.is_empty());
    assert_eq!(result.report().relocation_count(), 0);
    assert!(!dir.path().join("p/_Rejected").exists());
}

#[test]
fn test_custom_quarantine_name_is_skipped_on_rescan() {
    let dir = tempdir().unwrap();
    scenario_tree(dir.path());
    let config = Config {
        quarantine_dir: "_Dupes".to_string(),
        ..Config::default()
    };

    photodedupe::run(dir.path(), &config, RunMode::Live, None).unwrap();
    assert!(dir.path().join("a/2020-01-01/_Dupes/img_1.jpg").exists());

    let again = photodedupe::run(dir.path(), &config, RunMode::Simulate, None).unwrap();
    assert!(again.sets.is_empty());
}

#[test]
fn test_abort_keeps_completed_relocations_in_report() {
    yansi::disable();
    let dir = tempdir().unwrap();
    write(dir.path(), "a.jpg", b"one");
    write(dir.path(), "x/a.jpg", b"one");
    write(dir.path(), "d/b.jpg", b"two2");
    write(dir.path(), "e/b.jpg", b"two2");
    // A regular file where the second set's quarantine folder should go
    write(dir.path(), "d/_Rejected", b"");

    let err = photodedupe::run(dir.path(), &Config::default(), RunMode::Live, None).unwrap_err();

    let aborted = err.downcast_ref::<RunAborted>().unwrap();
    let partial = &aborted.partial;
    assert_eq!(partial.sets.len(), 2);
    assert_eq!(partial.outcomes.len(), 1);

    let moved = dir.path().join("_Rejected/a_1.jpg");
    assert!(moved.exists());
    assert!(dir.path().join("e/b.jpg").exists());

    let text = TextReport::new(partial.report()).render().unwrap();
    let line = format!(
        "  {} -> {}",
        dir.path().join("x/a.jpg").display(),
        moved.display()
    );
    assert!(text.contains(&line));
    assert!(text.contains("1 reject moved"));

    let abort = err
        .chain()
        .find_map(|cause| cause.downcast_ref::<QuarantineAbort>())
        .unwrap();
    assert_eq!(abort.relocated, 1);
    assert!(matches!(abort.source, QuarantineError::CreateDir { .. }));
    assert!(format!("{err:#}").contains("_Rejected"));
}
