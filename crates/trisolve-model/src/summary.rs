use crate::TriangularSystem;

/// Shape statistics printed before a solve.
#[derive(Debug, Clone, PartialEq)]
pub struct SystemSummary {
    pub unknowns: usize,
    pub stored_entries: usize,
    pub zero_pivots: usize,
    pub min_abs_pivot: f64,
    pub max_abs_pivot: f64,
}

impl SystemSummary {
    pub fn from_system(system: &TriangularSystem) -> Self {
        let n = system.n();
        let mut min_abs_pivot = f64::INFINITY;
        let mut max_abs_pivot = 0.0f64;

        for row in 0..n {
            let pivot = system.pivot(row).abs();
            min_abs_pivot = min_abs_pivot.min(pivot);
            max_abs_pivot = max_abs_pivot.max(pivot);
        }

        Self {
            unknowns: n,
            stored_entries: n * (n + 1) / 2,
            zero_pivots: system.zero_pivots().len(),
            min_abs_pivot,
            max_abs_pivot,
        }
    }
}
