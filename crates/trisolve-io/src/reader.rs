//! Flat-text system reader.
//!
//! Files are whitespace-separated token streams; line breaks carry no
//! meaning beyond separating tokens. Coefficients are sanitized on load:
//! each raw value is scaled by [`COEFFICIENT_SCALE`] and a resulting zero
//! becomes [`PIVOT_FALLBACK`]. A raw zero free term becomes
//! [`FREE_TERM_FALLBACK`].

use std::fs;
use std::path::Path;
use std::str::FromStr;

use trisolve_model::TriangularSystem;

use crate::error::{IoError, Result};
use crate::SystemPaths;

pub const COEFFICIENT_SCALE: f64 = 0.01;
pub const PIVOT_FALLBACK: f64 = 1.0;
pub const FREE_TERM_FALLBACK: f64 = 1000.0;

/// Read the number of unknowns (the first token of the file).
pub fn read_unknown_count(path: impl AsRef<Path>) -> Result<usize> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path)?;
    let mut tokens = Tokens::new(path, &raw);
    let n: usize = tokens.next_value("unknown count")?;
    if n == 0 {
        return Err(IoError::parse(path, "unknown count must be at least 1"));
    }
    Ok(n)
}

/// Read the upper-triangular coefficient rows of an `n`-unknown system.
///
/// Row `i` consists of the `n - i` entries for columns `i..n`.
pub fn read_coefficients(path: impl AsRef<Path>, n: usize) -> Result<Vec<Vec<f64>>> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path)?;
    let mut tokens = Tokens::new(path, &raw);

    let available = tokens.remaining();
    let required = n
        .checked_add(1)
        .and_then(|m| n.checked_mul(m))
        .map(|entries| entries / 2);
    if required.is_none_or(|required| required > available) {
        return Err(IoError::parse(
            path,
            format!(
                "{n} unknowns need n(n+1)/2 coefficients but the file holds only {available} tokens"
            ),
        ));
    }

    let mut rows = Vec::with_capacity(n);
    for row in 0..n {
        let mut entries = Vec::with_capacity(n - row);
        for col in row..n {
            let value: f64 = tokens.next_value(&format!("coefficient ({row}, {col})"))?;
            entries.push(sanitize_coefficient(value));
        }
        rows.push(entries);
    }
    tokens.note_trailing();
    Ok(rows)
}

/// Read `n` free terms.
pub fn read_free_terms(path: impl AsRef<Path>, n: usize) -> Result<Vec<f64>> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path)?;
    let mut tokens = Tokens::new(path, &raw);

    let mut terms = Vec::with_capacity(n.min(tokens.remaining()));
    for row in 0..n {
        let value: f64 = tokens.next_value(&format!("free term {row}"))?;
        terms.push(sanitize_free_term(value));
    }
    tokens.note_trailing();
    Ok(terms)
}

/// Load a complete system from its three artifacts.
pub fn read_system(paths: &SystemPaths) -> Result<TriangularSystem> {
    let n = read_unknown_count(&paths.unknown_count)?;
    let rows = read_coefficients(&paths.coefficients, n)?;
    let free_terms = read_free_terms(&paths.free_terms, n)?;
    let system = TriangularSystem::from_upper_rows(rows, free_terms)?;
    log::info!(
        "loaded {n}-unknown system from {}",
        paths.coefficients.display()
    );
    Ok(system)
}

fn sanitize_coefficient(raw: f64) -> f64 {
    let scaled = raw * COEFFICIENT_SCALE;
    if scaled == 0.0 { PIVOT_FALLBACK } else { scaled }
}

fn sanitize_free_term(raw: f64) -> f64 {
    if raw == 0.0 { FREE_TERM_FALLBACK } else { raw }
}

struct Tokens<'a> {
    path: &'a Path,
    inner: std::str::SplitWhitespace<'a>,
    position: usize,
}

impl<'a> Tokens<'a> {
    fn new(path: &'a Path, raw: &'a str) -> Self {
        Self {
            path,
            inner: raw.split_whitespace(),
            position: 0,
        }
    }

    fn remaining(&self) -> usize {
        self.inner.clone().count()
    }

    fn next_value<T: FromStr>(&mut self, what: &str) -> Result<T> {
        let token = self.inner.next().ok_or_else(|| {
            IoError::parse(
                self.path,
                format!("unexpected end of file while reading {what}"),
            )
        })?;
        self.position += 1;
        token.parse().map_err(|_| {
            IoError::parse(
                self.path,
                format!("token {} ({token:?}) is not a valid {what}", self.position),
            )
        })
    }

    fn note_trailing(&mut self) {
        let extra = self.inner.by_ref().count();
        if extra > 0 {
            log::debug!(
                "{}: ignoring {extra} trailing token(s)",
                self.path.display()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn write_temp(dir: &tempfile::TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, contents).expect("write fixture");
        path
    }

    #[test]
    fn coefficients_are_scaled_and_zero_replaced() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_temp(&dir, "a.txt", "200 0 300\n0 400\n500\n");

        let rows = read_coefficients(&path, 3).expect("read coefficients");
        assert_eq!(rows.len(), 3);
        assert!((rows[0][0] - 2.0).abs() < 1e-12);
        assert_eq!(rows[0][1], PIVOT_FALLBACK);
        assert!((rows[0][2] - 3.0).abs() < 1e-12);
        assert_eq!(rows[1][0], PIVOT_FALLBACK);
        assert!((rows[1][1] - 4.0).abs() < 1e-12);
        assert!((rows[2][0] - 5.0).abs() < 1e-12);
    }

    #[test]
    fn free_terms_replace_zero() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_temp(&dir, "b.txt", "14 0\n5");

        let terms = read_free_terms(&path, 3).expect("read free terms");
        assert_eq!(terms, vec![14.0, FREE_TERM_FALLBACK, 5.0]);
    }

    #[test]
    fn short_file_reports_missing_token() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_temp(&dir, "a.txt", "1 2 3\n4\n");

        let err = read_coefficients(&path, 3).expect_err("one entry missing");
        assert!(matches!(err, IoError::Parse { .. }));
        assert!(err.to_string().contains("only 4 tokens"), "{err}");
    }

    #[test]
    fn huge_unknown_count_is_rejected_before_allocating() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_temp(&dir, "a.txt", "1 2 3\n");

        let err = read_coefficients(&path, 100_000_000_000).expect_err("far too few tokens");
        assert!(matches!(err, IoError::Parse { .. }));

        let err = read_coefficients(&path, usize::MAX).expect_err("entry count overflows");
        assert!(matches!(err, IoError::Parse { .. }));

        let err = read_free_terms(&path, 100_000_000_000).expect_err("short free terms");
        assert!(err.to_string().contains("free term 3"), "{err}");
    }

    #[test]
    fn invalid_token_reports_position() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_temp(&dir, "b.txt", "1 x 3");

        let err = read_free_terms(&path, 3).expect_err("bad token");
        assert!(err.to_string().contains("token 2"), "{err}");
    }

    #[test]
    fn unknown_count_must_be_positive() {
        let dir = tempfile::tempdir().expect("tempdir");
        let zero = write_temp(&dir, "n0.txt", "0\n");
        let ok = write_temp(&dir, "n3.txt", "  3\n");

        assert!(read_unknown_count(&zero).is_err());
        assert_eq!(read_unknown_count(&ok).expect("valid count"), 3);
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = read_unknown_count(dir.path().join("absent.txt")).expect_err("missing");
        assert!(matches!(err, IoError::Io(_)));
    }
}
