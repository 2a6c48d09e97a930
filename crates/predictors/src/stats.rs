//! Population-level numeric helpers used by the scorer and segmenter.

/// Quantile with linear interpolation between closest ranks.
///
/// Returns `None` for an empty series. `q` is clamped into `[0, 1]`.
pub fn quantile(values: &[f64], q: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    Some(quantile_sorted(&sorted, q))
}

/// Same as [`quantile`] over an already ascending, non-empty slice.
pub fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    let last = sorted.len() - 1;
    let position = q.clamp(0.0, 1.0) * last as f64;
    let lower = position.floor();
    let gamma = position - lower;
    let lower = lower as usize;
    let upper = (lower + 1).min(last);
    lerp(sorted[lower], sorted[upper], gamma)
}

// Interpolate from the nearer endpoint so results stay monotonic in `t`.
fn lerp(a: f64, b: f64, t: f64) -> f64 {
    let diff = b - a;
    if t >= 0.5 {
        b - diff * (1.0 - t)
    } else {
        a + diff * t
    }
}

/// Clamp every value into the `[low, high]` quantile band of the series.
pub fn percentile_clip(values: &[f64], low: f64, high: f64) -> Vec<f64> {
    if values.is_empty() {
        return Vec::new();
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let lower = quantile_sorted(&sorted, low);
    let upper = quantile_sorted(&sorted, high);
    values.iter().map(|v| v.max(lower).min(upper)).collect()
}

/// Rescale to `[0, 1]`. A zero-variance series maps to all zeros.
pub fn minmax_scale(values: &[f64]) -> Vec<f64> {
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if max == min {
        return vec![0.0; values.len()];
    }
    let range = max - min;
    values.iter().map(|v| (v - min) / range).collect()
}

pub fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}
