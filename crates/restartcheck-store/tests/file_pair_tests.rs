#![allow(clippy::unwrap_used, clippy::expect_used)]

use restartcheck_core::container::{Array, Group};
use restartcheck_store::resolver::resolve_required;
use restartcheck_store::root::is_root_pair;
use restartcheck_store::{expand_shards, read_container, read_root_info, write_container};
use tempfile::TempDir;

fn root_container(n: i64, pattern: &str) -> Group {
    Group::new()
        .with_dataset("number_of_files", Array::i64s(vec![n]))
        .with_dataset("file_pattern", Array::string(format!("{}\0", pattern)))
        .with_child(
            "protocol",
            Group::new().with_dataset("version", Array::string("1.0")),
        )
}

#[test]
fn test_root_files_expand_to_shard_pairs_on_disk() {
    let run = TempDir::new().unwrap();
    let base = TempDir::new().unwrap();

    write_container(&run.path().join("plot_000010.root"), &root_container(3, "plot_000010/rank_%03d.json")).unwrap();
    write_container(&run.path().join("plot_000005.root"), &root_container(1, "old_%d.json")).unwrap();
    write_container(&base.path().join("plot_000010.root"), &root_container(3, "shards/r%d.json")).unwrap();

    let target = resolve_required(&format!("{}/plot_.*\\.root", run.path().display())).unwrap();
    let baseline = resolve_required(&format!("{}/plot_.*\\.root", base.path().display())).unwrap();
    assert_eq!(target, run.path().join("plot_000010.root"));
    assert!(is_root_pair(&target, &baseline));

    let target_info = read_root_info(&read_container(&target).unwrap()).unwrap();
    let baseline_info = read_root_info(&read_container(&baseline).unwrap()).unwrap();
    let pairs = expand_shards(&target, &target_info, &baseline, &baseline_info).unwrap();

    assert_eq!(pairs.len(), 3);
    assert_eq!(pairs[2].target, run.path().join("plot_000010/rank_002.json"));
    assert_eq!(pairs[2].baseline, base.path().join("shards/r2.json"));
}

#[test]
fn test_no_match_names_the_pattern() {
    let dir = TempDir::new().unwrap();
    let pattern = format!("{}/missing_.*", dir.path().display());
    let err = resolve_required(&pattern).unwrap_err();
    assert!(err.message().contains("missing_.*"));
}
