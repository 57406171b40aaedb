//! Statistics that skip missing samples instead of treating them as zero.

fn present(values: &[Option<f64>]) -> Vec<f64> {
    values.iter().flatten().copied().filter(|v| !v.is_nan()).collect()
}

/// Arithmetic mean of the present values. `None` if nothing is present.
pub fn nan_mean(values: &[Option<f64>]) -> Option<f64> {
    let v = present(values);
    if v.is_empty() {
        return None;
    }
    Some(v.iter().sum::<f64>() / v.len() as f64)
}

/// Sum of the present values; 0.0 when nothing is present.
pub fn nan_sum(values: &[Option<f64>]) -> f64 {
    present(values).iter().sum()
}

/// Population standard deviation of the present values.
pub fn nan_std(values: &[Option<f64>]) -> Option<f64> {
    let v = present(values);
    let mean = nan_mean(values)?;
    let variance = v.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / v.len() as f64;

    Some(variance.sqrt())
}

/// Percentile `q` (0–100) of the present values, interpolating linearly
/// between the closest ranks.
pub fn nan_percentile(values: &[Option<f64>], q: f64) -> Option<f64> {
    let mut v = present(values);
    if v.is_empty() {
        return None;
    }
    v.sort_by(f64::total_cmp);

    let rank = (q.clamp(0.0, 100.0) / 100.0) * (v.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    Some(v[lo] + (v[hi] - v[lo]) * (rank - lo as f64))
}

pub fn nan_median(values: &[Option<f64>]) -> Option<f64> {
    nan_percentile(values, 50.0)
}

/// Interquartile range, 75th minus 25th percentile.
pub fn nan_iqr(values: &[Option<f64>]) -> Option<f64> {
    Some(nan_percentile(values, 75.0)? - nan_percentile(values, 25.0)?)
}

/// `num / den`, or `None` when either side is missing or `den` is zero.
pub fn ratio(num: Option<f64>, den: Option<f64>) -> Option<f64> {
    match (num, den) {
        (Some(n), Some(d)) if d != 0.0 => Some(n / d),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Option<f64>, b: f64) -> bool {
        a.is_some_and(|a| (a - b).abs() < 1e-9)
    }

    #[test]
    fn test_missing_values_are_skipped() {
        let values = [Some(1.0), None, Some(3.0), Some(f64::NAN)];
        assert!(close(nan_mean(&values), 2.0));
        assert_eq!(nan_sum(&values), 4.0);
        assert!(close(nan_std(&values), 1.0));
    }

    #[test]
    fn test_all_missing() {
        let values = [None, None];
        assert_eq!(nan_mean(&values), None);
        assert_eq!(nan_std(&values), None);
        assert_eq!(nan_median(&values), None);
        assert_eq!(nan_iqr(&values), None);
        assert_eq!(nan_sum(&values), 0.0);
        assert_eq!(nan_mean(&[]), None);
    }

    #[test]
    fn test_percentiles_interpolate() {
        let values: Vec<Option<f64>> = [4.0, 1.0, 3.0, 2.0].into_iter().map(Some).collect();
        assert!(close(nan_median(&values), 2.5));
        assert!(close(nan_percentile(&values, 25.0), 1.75));
        assert!(close(nan_percentile(&values, 75.0), 3.25));
        assert!(close(nan_iqr(&values), 1.5));
        assert!(close(nan_percentile(&values, 0.0), 1.0));
        assert!(close(nan_percentile(&values, 100.0), 4.0));
    }

    #[test]
    fn test_single_value() {
        let values = [Some(7.0)];
        assert!(close(nan_median(&values), 7.0));
        assert!(close(nan_std(&values), 0.0));
        assert!(close(nan_iqr(&values), 0.0));
    }

    #[test]
    fn test_ratio() {
        assert_eq!(ratio(Some(1.0), Some(4.0)), Some(0.25));
        assert_eq!(ratio(Some(1.0), Some(0.0)), None);
        assert_eq!(ratio(None, Some(2.0)), None);
    }
}
