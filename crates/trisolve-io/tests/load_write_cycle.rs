//! Generated systems survive a write/read cycle through the flat-text files.

use std::fs;

use trisolve_io::{IoError, SystemPaths, generate_system, read_system, write_system};
use trisolve_model::TriangularSystem;

#[test]
fn generated_system_reloads_within_rounding() {
    let dir = tempfile::tempdir().expect("tempdir");
    let paths = SystemPaths::in_dir(dir.path());
    let system = generate_system(25, 2024).expect("generate");

    write_system(&system, &paths).expect("write");
    let loaded = read_system(&paths).expect("read");

    assert_eq!(loaded.n(), system.n());
    for row in 0..system.n() {
        for col in 0..system.n() {
            let expected = system.coefficient(row, col);
            let actual = loaded.coefficient(row, col);
            assert!(
                (expected - actual).abs() <= 1e-12 * expected.abs().max(1.0),
                "coefficient ({row}, {col}): {expected} vs {actual}"
            );
        }
        assert_eq!(loaded.free_term(row), system.free_term(row));
    }
}

#[test]
fn hand_written_files_are_sanitized() {
    let dir = tempfile::tempdir().expect("tempdir");
    let paths = SystemPaths::new(
        dir.path().join("unknown_no_3.txt"),
        dir.path().join("a_input_3.txt"),
        dir.path().join("free_terms_3.txt"),
    );
    fs::write(&paths.unknown_count, "3\n").unwrap();
    fs::write(&paths.coefficients, "100 200 300\n0 400\n100\n").unwrap();
    fs::write(&paths.free_terms, "14 9 0\n").unwrap();

    let system: TriangularSystem = read_system(&paths).expect("read");

    assert_eq!(system.pivot(1), 1.0);
    assert!((system.coefficient(1, 2) - 4.0).abs() < 1e-12);
    assert!((system.pivot(2) - 1.0).abs() < 1e-12);
    assert_eq!(system.free_term(2), 1000.0);
    assert_eq!(system.coefficient(2, 1), 0.0);
}

#[test]
fn free_term_file_shorter_than_count_is_rejected() {
    let dir = tempfile::tempdir().expect("tempdir");
    let paths = SystemPaths::in_dir(dir.path());
    fs::write(&paths.unknown_count, "2").unwrap();
    fs::write(&paths.coefficients, "1 1 1").unwrap();
    fs::write(&paths.free_terms, "5").unwrap();

    let err = read_system(&paths).expect_err("missing free term");
    assert!(err.to_string().contains("free term 1"), "{err}");
}

#[test]
fn absurd_unknown_count_is_a_parse_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let paths = SystemPaths::in_dir(dir.path());
    fs::write(&paths.unknown_count, "100000000000\n").unwrap();
    fs::write(&paths.coefficients, "1 2 3\n").unwrap();
    fs::write(&paths.free_terms, "4 5\n").unwrap();

    let err = read_system(&paths).expect_err("count far exceeds the coefficient file");
    match err {
        IoError::Parse { path, .. } => assert_eq!(path, paths.coefficients),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn system_with_zero_entries_is_not_written() {
    let dir = tempfile::tempdir().expect("tempdir");
    let paths = SystemPaths::in_dir(dir.path());
    let system = TriangularSystem::from_upper_rows(
        vec![vec![2.0, 0.0], vec![0.0]],
        vec![0.0, 4.0],
    )
    .expect("system");

    let err = write_system(&system, &paths).expect_err("zeros cannot survive a reload");
    assert!(matches!(err, IoError::Unrepresentable { .. }), "{err}");
    assert!(!paths.coefficients.exists());
}
