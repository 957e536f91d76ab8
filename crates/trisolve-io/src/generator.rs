use rand::prelude::*;
use rayon::prelude::*;
use trisolve_model::TriangularSystem;

use crate::error::Result;

/// Generate a seeded `n`-unknown upper-triangular system.
///
/// Off-diagonal entries are uniform in `[0.01, 1)` and each pivot exceeds the
/// sum of its row's off-diagonal entries by a uniform margin in `[0.01, 1)`,
/// which keeps back-substitution well conditioned for large `n`. Free terms
/// are uniform in `[1, 1000)`. Every row draws from its own RNG stream, so
/// the output depends only on `(n, seed)` and not on the thread count.
pub fn generate_system(n: usize, seed: u64) -> Result<TriangularSystem> {
    let rows: Vec<(Vec<f64>, f64)> = (0..n)
        .into_par_iter()
        .map(|row| {
            let mut rng = StdRng::seed_from_u64(row_seed(seed, row));
            let mut entries = Vec::with_capacity(n - row);
            entries.push(0.0);
            let mut off_diagonal = 0.0;
            for _ in row + 1..n {
                let value = rng.gen_range(0.01..1.0);
                off_diagonal += value;
                entries.push(value);
            }
            entries[0] = off_diagonal + rng.gen_range(0.01..1.0);
            let free_term = rng.gen_range(1.0..1000.0);
            (entries, free_term)
        })
        .collect();

    let (rows, free_terms): (Vec<_>, Vec<_>) = rows.into_iter().unzip();
    let system = TriangularSystem::from_upper_rows(rows, free_terms)?;
    log::info!("generated {n}-unknown system (seed {seed})");
    Ok(system)
}

fn row_seed(seed: u64, row: usize) -> u64 {
    seed ^ (row as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15)
}
