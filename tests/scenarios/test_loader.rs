//! Tests for loading and re-exporting the player table

use std::io::Write;

use retention_analytics::{DatasetLoader, PlayerTable};

use super::two_arm_table;

#[test]
fn test_load_twice_identical() {
    let table = two_arm_table((20, 5), (20, 3));
    let file = tempfile::NamedTempFile::new().unwrap();
    table.export(file.path()).unwrap();

    let loader = DatasetLoader::new(file.path());
    let first = loader.load().unwrap().expect("table should load");
    let second = loader.load().unwrap().expect("table should load");

    assert_eq!(first.records(), second.records());
    assert_eq!(first.as_ref(), &table);
}

#[test]
fn test_two_loaders_read_same_rows() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(
        b"player_id,version,sum_gamerounds,retention_1,retention_7\n\
          116,gate_30,3,False,False\n\
          337,gate_30,38,True,False\n",
    )
    .unwrap();

    let a = DatasetLoader::new(file.path()).load().unwrap().unwrap();
    let b = DatasetLoader::new(file.path()).load().unwrap().unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_missing_source_is_absent_not_error() {
    let dir = tempfile::tempdir().unwrap();
    let loader = DatasetLoader::new(dir.path().join("missing.csv"));
    assert!(loader.load().unwrap().is_none());
}

#[test]
fn test_export_round_trips_player_ids() {
    let table = two_arm_table((10, 2), (10, 4));
    let mut buffer = Vec::new();
    table.write_csv(&mut buffer).unwrap();

    let reread = PlayerTable::read_csv(buffer.as_slice()).unwrap();
    let ids: Vec<u64> = reread.records().iter().map(|r| r.player_id).collect();
    let expected: Vec<u64> = table.records().iter().map(|r| r.player_id).collect();
    assert_eq!(ids, expected);
}
