//! Maximum-caliber estimate of the single rate prefactor shared by all
//! neighbor hops.

use log::debug;

use crate::config::FirstFrame;
use crate::error::{Result, SgoopError};

/// Mean number of neighbor transitions per frame.
///
/// A transition counts when consecutive bins differ by at most `hop`. With
/// [`FirstFrame::Sentinel`] the first frame has no predecessor and never
/// counts; with [`FirstFrame::Periodic`] it is paired with the last frame.
pub fn mean_transitions(bins: &[usize], hop: usize, first_frame: FirstFrame) -> Result<f64> {
    if bins.is_empty() {
        return Err(SgoopError::DivisionByZero(
            "cannot average transitions over zero frames".to_string(),
        ));
    }
    let mut count = bins
        .windows(2)
        .filter(|pair| pair[0].abs_diff(pair[1]) <= hop)
        .count();
    if first_frame == FirstFrame::Periodic {
        if let (Some(first), Some(last)) = (bins.first(), bins.last()) {
            if first.abs_diff(*last) <= hop {
                count += 1;
            }
        }
    }
    Ok(count as f64 / bins.len() as f64)
}

/// Sum of `sqrt(p[i] * p[j])` over unordered pairs of distinct bins at most
/// `hop` apart.
pub fn neighbor_overlap(histogram: &[f64], hop: usize) -> f64 {
    let k = histogram.len();
    let mut total = 0.0;
    for i in 0..k {
        for j in (i + 1)..k.min(i + hop + 1) {
            total += (histogram[i] * histogram[j]).sqrt();
        }
    }
    total
}

/// Rate prefactor `MU = N_mean / D` matching the expected number of neighbor
/// hops to the observed one.
pub fn mu_factor(
    bins: &[usize],
    histogram: &[f64],
    hop: usize,
    first_frame: FirstFrame,
) -> Result<f64> {
    let n_mean = mean_transitions(bins, hop, first_frame)?;
    let overlap = neighbor_overlap(histogram, hop);
    if overlap <= 0.0 || !overlap.is_finite() {
        return Err(SgoopError::DivisionByZero(format!(
            "no neighboring bins with probability mass among {} bins",
            histogram.len()
        )));
    }
    let mu = n_mean / overlap;
    debug!("mu factor {:.6} (N_mean {:.6}, D {:.6})", mu, n_mean, overlap);
    Ok(mu)
}
