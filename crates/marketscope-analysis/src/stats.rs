//! Column statistics shared by the opportunity scorer and comparables finder.
//!
//! All helpers operate on plain `f64` slices and return defined values for
//! degenerate input (empty or constant columns) instead of `NaN`.

/// Arithmetic mean; `0.0` for an empty slice.
#[must_use]
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    #[allow(clippy::cast_precision_loss)]
    let n = values.len() as f64;
    values.iter().sum::<f64>() / n
}

/// Population standard deviation (`ddof = 0`).
#[must_use]
pub fn population_std(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    let squares: Vec<f64> = values.iter().map(|v| (v - m).powi(2)).collect();
    mean(&squares).sqrt()
}

/// Rescales to zero mean and unit variance. A constant column becomes all
/// zeros.
#[must_use]
pub fn standardize(values: &[f64]) -> Vec<f64> {
    let m = mean(values);
    let sd = population_std(values);
    if sd == 0.0 {
        return vec![0.0; values.len()];
    }
    values.iter().map(|v| (v - m) / sd).collect()
}

/// Replaces missing entries with the mean of the present ones (or `0.0` when
/// none are present).
#[must_use]
pub fn impute_mean(values: &[Option<f64>]) -> Vec<f64> {
    let present: Vec<f64> = values.iter().flatten().copied().collect();
    let fill = mean(&present);
    values.iter().map(|v| v.unwrap_or(fill)).collect()
}

/// Min-max scaling onto `[0, 1]`.
///
/// Returns `None` when the column is empty or constant; each caller decides
/// what the degenerate case means.
#[must_use]
pub fn min_max(values: &[f64]) -> Option<Vec<f64>> {
    let (lo, hi) = bounds(values)?;
    if hi == lo {
        return None;
    }
    Some(values.iter().map(|v| (v - lo) / (hi - lo)).collect())
}

/// `(min, max)` of a non-empty slice.
#[must_use]
pub fn bounds(values: &[f64]) -> Option<(f64, f64)> {
    let first = *values.first()?;
    Some(
        values
            .iter()
            .fold((first, first), |(lo, hi), &v| (lo.min(v), hi.max(v))),
    )
}

/// Quantile with linear interpolation between closest ranks.
///
/// `sorted` must be ascending and non-empty; `q` is clamped to `[0, 1]`.
#[must_use]
pub fn quantile(sorted: &[f64], q: f64) -> f64 {
    match sorted.len() {
        0 => 0.0,
        1 => sorted[0],
        n => {
            #[allow(clippy::cast_precision_loss)]
            let pos = q.clamp(0.0, 1.0) * (n - 1) as f64;
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let lower = pos.floor() as usize;
            let upper = (lower + 1).min(n - 1);
            #[allow(clippy::cast_precision_loss)]
            let frac = pos - lower as f64;
            sorted[lower] + (sorted[upper] - sorted[lower]) * frac
        }
    }
}

/// Logistic function.
#[must_use]
pub fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}
