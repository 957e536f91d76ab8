use std::path::{Path, PathBuf};

/// Locations of the three flat-text artifacts describing one system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemPaths {
    pub unknown_count: PathBuf,
    pub coefficients: PathBuf,
    pub free_terms: PathBuf,
}

impl SystemPaths {
    pub const UNKNOWN_COUNT_FILE: &'static str = "unknown_no.txt";
    pub const COEFFICIENTS_FILE: &'static str = "a_input.txt";
    pub const FREE_TERMS_FILE: &'static str = "free_terms.txt";

    pub fn new(
        unknown_count: impl Into<PathBuf>,
        coefficients: impl Into<PathBuf>,
        free_terms: impl Into<PathBuf>,
    ) -> Self {
        Self {
            unknown_count: unknown_count.into(),
            coefficients: coefficients.into(),
            free_terms: free_terms.into(),
        }
    }

    /// Default file names inside `dir`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self::new(
            dir.join(Self::UNKNOWN_COUNT_FILE),
            dir.join(Self::COEFFICIENTS_FILE),
            dir.join(Self::FREE_TERMS_FILE),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_dir_uses_default_names() {
        let paths = SystemPaths::in_dir("/data/run");
        assert_eq!(paths.unknown_count, PathBuf::from("/data/run/unknown_no.txt"));
        assert_eq!(paths.coefficients, PathBuf::from("/data/run/a_input.txt"));
        assert_eq!(paths.free_terms, PathBuf::from("/data/run/free_terms.txt"));
    }
}
