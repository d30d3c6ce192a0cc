//! Evaluation grids for density curves.
//!
//! The density evaluator maps over whatever points it is handed; this
//! module builds the two grids used for previews:
//!
//! - the full support `[0, 1]` ([`linspace`]);
//! - a window around the groups' posterior means, wide enough to hold both
//!   curves but narrow enough that a few hundred points resolve their
//!   peaks ([`preview_window`], [`preview_grid`]).

use log::debug;

use crate::error::DomainError;
use crate::observation::BetaShapeParameters;

/// `n` equally spaced points from `start` to `end`, both inclusive.
///
/// # Errors
/// [`DomainError::InvalidGrid`] if `n < 2`, either bound is not finite, or
/// `start >= end`.
///
/// # Examples
/// ```
/// use abtest_stats::grid::linspace;
/// assert_eq!(linspace(0.0, 1.0, 5).unwrap(), vec![0.0, 0.25, 0.5, 0.75, 1.0]);
/// ```
pub fn linspace(start: f64, end: f64, n: usize) -> Result<Vec<f64>, DomainError> {
    if n < 2 {
        return Err(DomainError::InvalidGrid(format!(
            "need at least 2 points, got {n}"
        )));
    }
    if !start.is_finite() || !end.is_finite() || start >= end {
        return Err(DomainError::InvalidGrid(format!(
            "bounds must be finite with start < end, got [{start}, {end}]"
        )));
    }

    let step = (end - start) / (n - 1) as f64;
    let mut points: Vec<f64> = (0..n).map(|i| start + step * i as f64).collect();
    // Pin the endpoint; accumulated rounding can leave it a few ulps off.
    points[n - 1] = end;
    Ok(points)
}

/// Window `[lo, hi] ⊆ [0, 1]` covering the given Beta curves.
///
/// Centred on the average of the curves' means. Each side extends by half
/// the distance between the extreme means plus `margin_sds` times the
/// largest standard deviation.
///
/// # Errors
/// [`DomainError::InvalidGrid`] if `shapes` is empty or `margin_sds` is not
/// a positive finite number.
pub fn preview_window(
    shapes: &[BetaShapeParameters],
    margin_sds: f64,
) -> Result<(f64, f64), DomainError> {
    if shapes.is_empty() {
        return Err(DomainError::InvalidGrid(
            "no curves to build a window for".into(),
        ));
    }
    if !margin_sds.is_finite() || margin_sds <= 0.0 {
        return Err(DomainError::InvalidGrid(format!(
            "margin must be a positive number of standard deviations, got {margin_sds}"
        )));
    }

    let means: Vec<f64> = shapes.iter().map(BetaShapeParameters::mean).collect();
    let center = means.iter().sum::<f64>() / means.len() as f64;
    let lowest = means.iter().copied().fold(f64::INFINITY, f64::min);
    let highest = means.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let widest_sd = shapes
        .iter()
        .map(BetaShapeParameters::std_dev)
        .fold(0.0, f64::max);

    let half_width = (highest - lowest) / 2.0 + margin_sds * widest_sd;
    let lo = (center - half_width).max(0.0);
    let hi = (center + half_width).min(1.0);
    debug!("preview window: center={center:.6}, half_width={half_width:.6}, [{lo:.6}, {hi:.6}]");
    Ok((lo, hi))
}

/// Equally spaced grid over [`preview_window`] with the default margin.
///
/// # Examples
/// ```
/// use abtest_stats::grid::preview_grid;
/// use abtest_stats::observation::BetaShapeParameters;
/// let a = BetaShapeParameters::new(21.0, 981.0).unwrap();
/// let b = BetaShapeParameters::new(26.0, 926.0).unwrap();
/// let grid = preview_grid(&[a, b], 300).unwrap();
/// assert_eq!(grid.len(), 300);
/// assert!(grid[0] < 0.02 && grid[299] > 0.0263);
/// ```
pub fn preview_grid(shapes: &[BetaShapeParameters], points: usize) -> Result<Vec<f64>, DomainError> {
    let (lo, hi) = preview_window(shapes, crate::DEFAULT_WINDOW_SDS)?;
    linspace(lo, hi, points)
}
