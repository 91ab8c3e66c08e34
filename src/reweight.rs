//! Importance reweighting of histograms sampled under a bias.
//!
//! Frames from a biased run are over-represented where the reference
//! coordinate was driven. Each frame is weighted by the inverse of its
//! reference-bin probability before counting it on the new coordinate.

use log::debug;
use ndarray::Array1;

use crate::binning::{bin_projection, BinnedProjection};
use crate::error::{Result, SgoopError};
use crate::trajectory::Trajectory;

/// Histogram over `rc_bin` target bins where each frame contributes
/// `1 / reference_p[reference_bin]`, normalized to sum 1.
pub fn reweighted_histogram(
    target_bins: &[usize],
    rc_bin: usize,
    reference_bins: &[usize],
    reference_p: &[f64],
) -> Result<Vec<f64>> {
    if target_bins.len() != reference_bins.len() {
        return Err(SgoopError::Config(format!(
            "target sequence has {} frames, reference has {}",
            target_bins.len(),
            reference_bins.len()
        )));
    }

    let mut histogram = vec![0.0; rc_bin];
    for (&target, &reference) in target_bins.iter().zip(reference_bins) {
        let weight = reference_p.get(reference).copied().unwrap_or(0.0);
        if weight <= 0.0 || !weight.is_finite() {
            return Err(SgoopError::ZeroWeightBin { bin: reference });
        }
        let slot = histogram.get_mut(target).ok_or_else(|| {
            SgoopError::Config(format!("bin {} outside {} target bins", target, rc_bin))
        })?;
        *slot += 1.0 / weight;
    }

    let total: f64 = histogram.iter().sum();
    if total <= 0.0 {
        return Err(SgoopError::DivisionByZero(
            "reweighted histogram has no mass".to_string(),
        ));
    }
    histogram.iter_mut().for_each(|value| *value /= total);
    Ok(histogram)
}

/// Bins `trajectory` on `rc` and corrects its histogram for sampling that was
/// biased along `reference_rc`. Both vectors must already be normalized.
pub fn biased_histogram(
    trajectory: &Trajectory,
    rc: &Array1<f64>,
    reference_rc: &Array1<f64>,
    rc_bin: usize,
) -> Result<BinnedProjection> {
    let reference = bin_projection(trajectory, reference_rc, rc_bin)?;
    let mut target = bin_projection(trajectory, rc, rc_bin)?;
    target.histogram = reweighted_histogram(
        &target.bins,
        rc_bin,
        &reference.bins,
        &reference.histogram,
    )?;
    debug!(
        "reweighted {} frames against reference coordinate",
        target.frame_count()
    );
    Ok(target)
}
