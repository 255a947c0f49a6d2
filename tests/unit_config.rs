// tests/unit_config.rs
use neardup_core::config::DedupConfig;
use neardup_core::shingle::ShingleUnit;
use neardup_core::DedupError;
use std::fs;
use std::path::PathBuf;

#[test]
fn test_load_toml() {
    let d = tempfile::tempdir().unwrap();
    let path = d.path().join("neardup.toml");
    fs::write(
        &path,
        "minhash_threshold = 0.7\nnum_perm = 64\nshingle_unit = \"char\"\noutput_dir = \"reports\"\n",
    )
    .unwrap();
    let c = DedupConfig::load(&path).unwrap();
    assert!((c.minhash_threshold - 0.7).abs() < f64::EPSILON);
    assert_eq!(c.num_perm, 64);
    assert_eq!(c.shingle_unit, ShingleUnit::Char);
    assert_eq!(c.track_path(), PathBuf::from("reports/dedup_track.txt"));
    assert_eq!(c.fuzzy_threshold, 60);
    c.validate().unwrap();
}

#[test]
fn test_defaults() {
    let c = DedupConfig::default();
    assert!((c.minhash_threshold - 0.5).abs() < f64::EPSILON);
    assert_eq!(c.fuzzy_threshold, 60);
    assert_eq!(c.num_perm, 128);
    assert_eq!(c.dedup_threshold, 80);
    assert_eq!(c.shingle_size, 20);
    assert_eq!(c.results_path(), PathBuf::from("dedup_outputs/dap.json"));
}

#[test]
fn test_malformed_toml_is_input_error() {
    let d = tempfile::tempdir().unwrap();
    let path = d.path().join("neardup.toml");
    fs::write(&path, "num_perm = \"lots\"").unwrap();
    let err = DedupConfig::load(&path).unwrap_err();
    assert!(matches!(err, DedupError::Toml { .. }));
    assert!(err.is_input_error());
}

#[test]
fn test_missing_file_is_io_error() {
    let d = tempfile::tempdir().unwrap();
    let err = DedupConfig::load(&d.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, DedupError::Io { .. }));
}
