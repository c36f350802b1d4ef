//! Reduction of sampled counter series.

/// Returns the mean of the non-zero samples in `series`.
///
/// `perfmon` pads minutes it has not sampled yet with zeros, so a zero is
/// treated as "no data" rather than "no activity". An empty or all-zero
/// series averages to `0.0`.
pub fn average_nonzero(series: &[f64]) -> f64 {
    let (sum, count) = series
        .iter()
        .filter(|&&v| v != 0.0)
        .fold((0.0, 0usize), |(sum, count), &v| (sum + v, count + 1));

    if count == 0 {
        return 0.0;
    }
    sum / count as f64
}
