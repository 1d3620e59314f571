//! Random sampling helpers shared by groups and the population
//!
//! Nothing here owns an RNG; callers pass their own so that every group keeps
//! a deterministic stream.

use rand::Rng;

/// Count how many of `slots` independent uniform draws fall below `rate`
///
/// This is the lottery used for both mutation and migration. A rate of 1.0
/// always returns `slots`, a rate of 0.0 always returns 0.
pub fn lottery_count<R: Rng + ?Sized>(rate: f64, slots: usize, rng: &mut R) -> usize {
    (0..slots).filter(|_| rng.gen::<f64>() < rate).count()
}

/// Draw a full permutation of `0..weights.len()` without replacement,
/// proportional to weight
///
/// Uses Efraimidis-Spirakis exponential keys: each index gets
/// `ln(u) / w` for `u` uniform in (0, 1], and indices are ordered by
/// descending key. The first index of the result is the first "draw".
/// Callers must ensure every weight is finite and positive.
pub fn weighted_permutation<R: Rng + ?Sized>(weights: &[f64], rng: &mut R) -> Vec<usize> {
    let mut keyed: Vec<(usize, f64)> = weights
        .iter()
        .enumerate()
        .map(|(idx, &w)| {
            let u = 1.0 - rng.gen::<f64>();
            (idx, u.ln() / w)
        })
        .collect();

    keyed.sort_by(|a, b| b.1.total_cmp(&a.1));
    keyed.into_iter().map(|(idx, _)| idx).collect()
}

/// Pearson correlation coefficient, `None` when undefined
pub fn pearson_correlation(xs: &[f64], ys: &[f64]) -> Option<f64> {
    if xs.len() != ys.len() || xs.len() < 2 {
        return None;
    }

    let n = xs.len() as f64;
    let mean_x = xs.iter().sum::<f64>() / n;
    let mean_y = ys.iter().sum::<f64>() / n;

    let (mut cov, mut var_x, mut var_y) = (0.0, 0.0, 0.0);
    for (&x, &y) in xs.iter().zip(ys) {
        let dx = x - mean_x;
        let dy = y - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    let denom = (var_x * var_y).sqrt();
    if denom == 0.0 || !denom.is_finite() {
        return None;
    }
    Some(cov / denom)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_lottery_count_extremes() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert_eq!(lottery_count(1.0, 5, &mut rng), 5);
        assert_eq!(lottery_count(0.0, 500, &mut rng), 0);
        assert_eq!(lottery_count(0.5, 0, &mut rng), 0);
    }

    #[test]
    fn test_lottery_count_tracks_rate() {
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let hits = lottery_count(0.25, 10_000, &mut rng);
        assert!((2_000..3_000).contains(&hits), "got {hits}");
    }

    #[test]
    fn test_weighted_permutation_is_permutation() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let weights = [1.0, 3.0, 0.5, 2.0, 1e-50];
        let mut perm = weighted_permutation(&weights, &mut rng);
        perm.sort_unstable();
        assert_eq!(perm, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_weighted_permutation_favours_heavy_weights() {
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let weights = [1.0, 9.0];

        let heavy_first = (0..2_000)
            .filter(|_| weighted_permutation(&weights, &mut rng)[0] == 1)
            .count();

        // Expected 90%
        assert!(heavy_first > 1_700, "heavy index first only {heavy_first} times");
    }

    #[test]
    fn test_pearson_correlation_known_values() {
        let xs = [0.0, 1.0, 2.0, 3.0];
        let up = [1.0, 2.0, 3.0, 4.0];
        let down = [4.0, 3.0, 2.0, 1.0];

        assert!((pearson_correlation(&xs, &up).unwrap() - 1.0).abs() < 1e-12);
        assert!((pearson_correlation(&xs, &down).unwrap() + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_pearson_correlation_undefined_cases() {
        assert_eq!(pearson_correlation(&[1.0], &[2.0]), None);
        assert_eq!(pearson_correlation(&[1.0, 1.0], &[2.0, 3.0]), None);
        assert_eq!(pearson_correlation(&[1.0, 2.0], &[2.0]), None);
    }
}
