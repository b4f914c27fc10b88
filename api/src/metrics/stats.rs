//! Descriptive statistics over a population of values

/// Arithmetic mean; 0 for an empty population
pub fn mean(population: &[f64]) -> f64 {
    if population.is_empty() {
        return 0.0;
    }
    population.iter().sum::<f64>() / population.len() as f64
}

/// Population standard deviation (divides by `n`); 0 below two values
pub fn stddev(population: &[f64]) -> f64 {
    if population.len() < 2 {
        return 0.0;
    }
    let m = mean(population);
    let variance =
        population.iter().map(|p| (p - m).powi(2)).sum::<f64>() / population.len() as f64;
    variance.sqrt()
}

/// Percentile rank: `round(100 * |{p <= v}| / |P|)`.
///
/// Ties share a percentile. An empty population ranks everything at 0.
pub fn percentile(value: f64, population: &[f64]) -> u8 {
    if population.is_empty() {
        return 0;
    }
    let at_or_below = population.iter().filter(|p| **p <= value).count();
    rank_from_count(at_or_below, population.len())
}

pub(crate) fn rank_from_count(at_or_below: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    (100.0 * at_or_below as f64 / total as f64).round().clamp(0.0, 100.0) as u8
}

/// Standard score of `value`; 0 when the population has no spread
pub fn z_score(value: f64, population: &[f64]) -> f64 {
    z_from(value, mean(population), stddev(population))
}

pub(crate) fn z_from(value: f64, mean: f64, stddev: f64) -> f64 {
    if stddev == 0.0 || !stddev.is_finite() {
        return 0.0;
    }
    let z = (value - mean) / stddev;
    if z.is_finite() { z } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_and_stddev() {
        let p = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert_eq!(mean(&p), 5.0);
        assert_eq!(stddev(&p), 2.0);
        assert_eq!(mean(&[]), 0.0);
        assert_eq!(stddev(&[3.0]), 0.0);
    }

    #[test]
    fn test_percentile_counts_ties() {
        let p = [10.0, 20.0, 20.0, 40.0];
        assert_eq!(percentile(5.0, &p), 0);
        assert_eq!(percentile(10.0, &p), 25);
        // Both 20s share the same rank
        assert_eq!(percentile(20.0, &p), 75);
        assert_eq!(percentile(40.0, &p), 100);
        assert_eq!(percentile(99.0, &p), 100);
    }

    #[test]
    fn test_percentile_empty_population() {
        assert_eq!(percentile(42.0, &[]), 0);
    }

    #[test]
    fn test_percentile_is_monotonic_and_bounded() {
        let p = [3.0, 1.0, 4.0, 1.0, 5.0, 9.0, 2.0, 6.0, 5.0, 3.0, 5.0];
        let mut last = 0u8;
        let mut v = -2.0;
        while v < 12.0 {
            let rank = percentile(v, &p);
            assert!(rank >= last, "rank decreased at {}", v);
            assert!(rank <= 100);
            last = rank;
            v += 0.25;
        }
    }

    #[test]
    fn test_z_score_zero_spread() {
        assert_eq!(z_score(7.0, &[7.0, 7.0, 7.0]), 0.0);
        assert_eq!(z_score(1.0, &[]), 0.0);
    }

    #[test]
    fn test_z_score_value() {
        let p = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert_eq!(z_score(9.0, &p), 2.0);
        assert_eq!(z_score(3.0, &p), -1.0);
    }
}
