use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;

use trisolve_model::TriangularSystem;

use crate::error::{IoError, Result};
use crate::{COEFFICIENT_SCALE, SystemPaths};

/// Write `system` as the three flat-text artifacts.
///
/// Coefficients are written raw (divided by the load scale) so reading the
/// files back yields the in-memory values up to rounding. Zero coefficients
/// and zero free terms are rejected with [`IoError::Unrepresentable`]
/// before any file is touched, since the reader sanitizes zeros away.
pub fn write_system(system: &TriangularSystem, paths: &SystemPaths) -> Result<()> {
    check_representable(system)?;

    for path in [&paths.unknown_count, &paths.coefficients, &paths.free_terms] {
        create_parent(path)?;
    }

    fs::write(&paths.unknown_count, format!("{}\n", system.n()))?;

    let mut coefficients = BufWriter::new(fs::File::create(&paths.coefficients)?);
    for row in 0..system.n() {
        let line: Vec<String> = system
            .upper_row(row)
            .map(|value| format!("{}", value / COEFFICIENT_SCALE))
            .collect();
        writeln!(coefficients, "{}", line.join(" "))?;
    }
    coefficients.flush()?;

    let mut free_terms = BufWriter::new(fs::File::create(&paths.free_terms)?);
    let line: Vec<String> = system.free_terms().iter().map(|v| format!("{v}")).collect();
    writeln!(free_terms, "{}", line.join(" "))?;
    free_terms.flush()?;

    log::info!(
        "wrote {}-unknown system to {}",
        system.n(),
        paths.coefficients.display()
    );
    Ok(())
}

fn check_representable(system: &TriangularSystem) -> Result<()> {
    for row in 0..system.n() {
        if let Some(offset) = system.upper_row(row).position(|value| value == 0.0) {
            return Err(IoError::Unrepresentable {
                what: format!("coefficient ({row}, {})", row + offset),
            });
        }
        if system.free_term(row) == 0.0 {
            return Err(IoError::Unrepresentable {
                what: format!("free term {row}"),
            });
        }
    }
    Ok(())
}

fn create_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coefficient_file_has_one_upper_row_per_line() {
        let dir = tempfile::tempdir().expect("tempdir");
        let paths = SystemPaths::in_dir(dir.path().join("nested"));
        let system = TriangularSystem::from_upper_rows(
            vec![vec![1.0, 2.0, 3.0], vec![1.0, 4.0], vec![1.0]],
            vec![14.0, 9.0, 5.0],
        )
        .unwrap();

        write_system(&system, &paths).expect("write system");

        let count = fs::read_to_string(&paths.unknown_count).unwrap();
        assert_eq!(count.trim(), "3");

        let coefficients = fs::read_to_string(&paths.coefficients).unwrap();
        let widths: Vec<usize> = coefficients
            .lines()
            .map(|line| line.split_whitespace().count())
            .collect();
        assert_eq!(widths, vec![3, 2, 1]);
        assert_eq!(coefficients.lines().next(), Some("100 200 300"));
    }

    #[test]
    fn zero_entries_are_refused_without_writing() {
        let dir = tempfile::tempdir().expect("tempdir");
        let paths = SystemPaths::in_dir(dir.path());

        let zero_pivot =
            TriangularSystem::from_upper_rows(vec![vec![2.0, 1.0], vec![0.0]], vec![3.0, 4.0])
                .unwrap();
        let err = write_system(&zero_pivot, &paths).expect_err("zero pivot");
        assert!(err.to_string().contains("coefficient (1, 1)"), "{err}");
        assert!(!paths.unknown_count.exists());

        let zero_free =
            TriangularSystem::from_upper_rows(vec![vec![2.0, 1.0], vec![1.0]], vec![0.0, 4.0])
                .unwrap();
        let err = write_system(&zero_free, &paths).expect_err("zero free term");
        assert!(matches!(err, IoError::Unrepresentable { ref what } if what == "free term 0"));
    }
}
