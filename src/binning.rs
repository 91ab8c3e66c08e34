use log::debug;
use ndarray::Array1;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SgoopError};
use crate::trajectory::Trajectory;

/// Scales `rc` to unit Euclidean norm.
pub fn normalize_rc(rc: &[f64]) -> Result<Array1<f64>> {
    if rc.is_empty() {
        return Err(SgoopError::DegenerateProjection(
            "reaction coordinate is empty".to_string(),
        ));
    }
    let norm = rc.iter().map(|v| v * v).sum::<f64>().sqrt();
    if !norm.is_finite() || norm <= f64::EPSILON {
        return Err(SgoopError::DegenerateProjection(format!(
            "reaction coordinate norm {} cannot be normalized",
            norm
        )));
    }
    Ok(rc.iter().map(|v| v / norm).collect())
}

/// Per-frame bin indices plus the occupancy histogram they induce.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BinnedProjection {
    pub bins: Vec<usize>,
    pub histogram: Vec<f64>,
    pub rc_bin: usize,
    /// Projection values mapped to the first and last bin.
    pub bounds: (f64, f64),
}

impl BinnedProjection {
    pub fn frame_count(&self) -> usize {
        self.bins.len()
    }

    /// Lowest and highest bin visited by the trajectory.
    pub fn occupied_range(&self) -> Option<(usize, usize)> {
        let lo = self.bins.iter().copied().min()?;
        let hi = self.bins.iter().copied().max()?;
        Some((lo, hi))
    }

    /// Restricts `histogram` (one entry per bin of this projection) to the
    /// occupied bin range and shifts bin indices so the range starts at 0.
    /// The trimmed histogram keeps its original mass and is not renormalized.
    pub fn trim_to(&self, histogram: &[f64]) -> Result<BinnedProjection> {
        if histogram.len() != self.rc_bin {
            return Err(SgoopError::Config(format!(
                "histogram has {} bins, projection has {}",
                histogram.len(),
                self.rc_bin
            )));
        }
        let (lo, hi) = self.occupied_range().ok_or_else(|| {
            SgoopError::Config("cannot trim an empty bin sequence".to_string())
        })?;

        let width = if self.rc_bin > 1 {
            (self.bounds.1 - self.bounds.0) / (self.rc_bin - 1) as f64
        } else {
            0.0
        };
        let trimmed = BinnedProjection {
            bins: self.bins.iter().map(|bin| bin - lo).collect(),
            histogram: histogram[lo..=hi].to_vec(),
            rc_bin: hi - lo + 1,
            bounds: (
                self.bounds.0 + lo as f64 * width,
                self.bounds.0 + hi as f64 * width,
            ),
        };
        debug!(
            "trimmed histogram from {} to {} bins (offset {})",
            self.rc_bin, trimmed.rc_bin, lo
        );
        Ok(trimmed)
    }
}

/// Projects `trajectory` onto the unit vector `rc` and bins the result
/// between the observed extrema.
pub fn bin_projection(
    trajectory: &Trajectory,
    rc: &Array1<f64>,
    rc_bin: usize,
) -> Result<BinnedProjection> {
    let projection = trajectory.project(rc.view())?;
    let rc_min = projection.iter().copied().fold(f64::INFINITY, f64::min);
    let rc_max = projection.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    discretize(&projection, rc_bin, (rc_min, rc_max))
}

/// Like [`bin_projection`] but against a fixed `(rc_min, rc_max)` scale.
/// Frames projecting outside the bounds land in the edge bins.
pub fn bin_projection_with_bounds(
    trajectory: &Trajectory,
    rc: &Array1<f64>,
    rc_bin: usize,
    bounds: (f64, f64),
) -> Result<BinnedProjection> {
    let projection = trajectory.project(rc.view())?;
    discretize(&projection, rc_bin, bounds)
}

fn discretize(
    projection: &Array1<f64>,
    rc_bin: usize,
    (rc_min, rc_max): (f64, f64),
) -> Result<BinnedProjection> {
    if rc_bin == 0 {
        return Err(SgoopError::Config("bin count must be positive".to_string()));
    }
    if projection.is_empty() {
        return Err(SgoopError::Config("no frames to bin".to_string()));
    }
    let range = rc_max - rc_min;
    if !range.is_finite() || range <= 0.0 {
        return Err(SgoopError::DegenerateProjection(format!(
            "projection range [{}, {}] is empty",
            rc_min, rc_max
        )));
    }

    let last = rc_bin - 1;
    // Divide before scaling so the frame at rc_max lands exactly in `last`.
    let bins: Vec<usize> = projection
        .iter()
        .map(|x| {
            let raw = ((x - rc_min) / range * last as f64).floor();
            if raw <= 0.0 {
                0
            } else {
                (raw as usize).min(last)
            }
        })
        .collect();
    let histogram = occupancy(&bins, rc_bin);

    Ok(BinnedProjection {
        bins,
        histogram,
        rc_bin,
        bounds: (rc_min, rc_max),
    })
}

/// Fraction of frames in each bin.
pub fn occupancy(bins: &[usize], rc_bin: usize) -> Vec<f64> {
    let mut histogram = vec![0.0; rc_bin];
    if bins.is_empty() {
        return histogram;
    }
    for &bin in bins {
        histogram[bin] += 1.0;
    }
    let total = bins.len() as f64;
    histogram.iter_mut().for_each(|count| *count /= total);
    histogram
}

/// Zeroes probabilities below `cutoff` and renormalizes the rest.
/// Returns the input unchanged when nothing would survive.
pub fn apply_probability_cutoff(histogram: &[f64], cutoff: f64) -> Vec<f64> {
    let mut filtered: Vec<f64> = histogram
        .iter()
        .map(|&p| if p < cutoff { 0.0 } else { p })
        .collect();
    let total: f64 = filtered.iter().sum();
    if total <= 0.0 {
        return histogram.to_vec();
    }
    filtered.iter_mut().for_each(|p| *p /= total);
    filtered
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trajectory::TrajectoryLoader;

    fn line_trajectory() -> Trajectory {
        TrajectoryLoader::from_table_str("0 5\n1 5\n2 5\n3 5\n4 5\n").unwrap()
    }

    #[test]
    fn normalization_is_scale_invariant() {
        let v = [3.0, -4.0, 1.0];
        let base = normalize_rc(&v).unwrap();
        let scaled = normalize_rc(&v.map(|x| x * 7.5)).unwrap();
        let flipped = normalize_rc(&v.map(|x| x * -2.0)).unwrap();
        for i in 0..3 {
            assert!((base[i] - scaled[i]).abs() < 1e-12);
            assert!((base[i] + flipped[i]).abs() < 1e-12);
        }
        assert!((base.dot(&base) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn zero_vector_cannot_be_normalized() {
        let err = normalize_rc(&[0.0, 0.0]).unwrap_err();
        assert!(matches!(err, SgoopError::DegenerateProjection(_)));
    }

    #[test]
    fn bins_span_observed_extrema() {
        let rc = normalize_rc(&[1.0, 0.0]).unwrap();
        let binned = bin_projection(&line_trajectory(), &rc, 3).unwrap();
        assert_eq!(binned.bins, vec![0, 0, 1, 1, 2]);
        assert_eq!(binned.histogram, vec![0.4, 0.4, 0.2]);
        assert_eq!(binned.bounds, (0.0, 4.0));
        let total: f64 = binned.histogram.iter().sum();
        assert!((total - 1.0).abs() < 1e-12);
    }

    #[test]
    fn extrema_land_in_edge_bins() {
        let trajectory = TrajectoryLoader::from_table_str("-2.986\n2.682\n").unwrap();
        let rc = normalize_rc(&[1.0]).unwrap();
        let binned = bin_projection(&trajectory, &rc, 33).unwrap();
        assert_eq!(binned.bins, vec![0, 32]);
        assert_eq!(binned.histogram[32], 0.5);
        assert_eq!(binned.histogram[31], 0.0);
    }

    #[test]
    fn constant_projection_is_degenerate() {
        let rc = normalize_rc(&[0.0, 1.0]).unwrap();
        let err = bin_projection(&line_trajectory(), &rc, 4).unwrap_err();
        assert!(matches!(err, SgoopError::DegenerateProjection(_)));
    }

    #[test]
    fn explicit_bounds_clamp_outliers() {
        let rc = normalize_rc(&[1.0, 0.0]).unwrap();
        let binned = bin_projection_with_bounds(&line_trajectory(), &rc, 5, (1.0, 3.0)).unwrap();
        assert_eq!(binned.bins, vec![0, 0, 2, 4, 4]);
    }

    #[test]
    fn trimming_rebaselines_bins() {
        let rc = normalize_rc(&[1.0, 0.0]).unwrap();
        let binned = bin_projection_with_bounds(&line_trajectory(), &rc, 9, (-4.0, 4.0)).unwrap();
        assert_eq!(binned.bins, vec![4, 5, 6, 7, 8]);

        let external = vec![0.0, 0.0, 0.0, 0.0, 0.2, 0.2, 0.2, 0.2, 0.2];
        let trimmed = binned.trim_to(&external).unwrap();
        assert_eq!(trimmed.rc_bin, 5);
        assert_eq!(trimmed.bins, vec![0, 1, 2, 3, 4]);
        assert_eq!(trimmed.histogram, vec![0.2; 5]);
        assert!((trimmed.bounds.0 - 0.0).abs() < 1e-12);
        assert!((trimmed.bounds.1 - 4.0).abs() < 1e-12);
    }

    #[test]
    fn trimming_requires_matching_length() {
        let rc = normalize_rc(&[1.0, 0.0]).unwrap();
        let binned = bin_projection(&line_trajectory(), &rc, 3).unwrap();
        assert!(matches!(
            binned.trim_to(&[0.5, 0.5]),
            Err(SgoopError::Config(_))
        ));
    }

    #[test]
    fn cutoff_drops_small_entries() {
        let filtered = apply_probability_cutoff(&[0.5, 1e-7, 0.5], 1e-5);
        assert_eq!(filtered, vec![0.5, 0.0, 0.5]);
        let untouched = apply_probability_cutoff(&[1e-7, 1e-7], 1e-5);
        assert_eq!(untouched, vec![1e-7, 1e-7]);
    }
}
