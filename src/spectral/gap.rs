use crate::error::{Result, SgoopError};
use crate::spectral::eigen::Spectrum;

pub const DEFAULT_NOISE_TOLERANCE: f64 = 1e-10;

/// Gap between the `wells`-th and `wells + 1`-th relaxation weights.
///
/// Eigenvalues below `-noise_tolerance` and non-positive weights are dropped
/// first. Returns 0 when the remaining spectrum resolves fewer than `wells`
/// gaps.
pub fn spectral_gap(
    eigenvalues: &[f64],
    weights: &[f64],
    wells: usize,
    noise_tolerance: f64,
) -> Result<f64> {
    if wells == 0 {
        return Err(SgoopError::Config("well count must be positive".to_string()));
    }
    if eigenvalues.len() != weights.len() {
        return Err(SgoopError::Config(format!(
            "{} eigenvalues but {} relaxation weights",
            eigenvalues.len(),
            weights.len()
        )));
    }

    let usable: Vec<f64> = eigenvalues
        .iter()
        .zip(weights)
        .filter(|(lambda, _)| **lambda >= -noise_tolerance)
        .map(|(_, weight)| *weight)
        .filter(|weight| *weight > 0.0)
        .collect();

    let gaps: Vec<f64> = usable.windows(2).map(|pair| pair[0] - pair[1]).collect();
    Ok(gaps.get(wells - 1).copied().unwrap_or(0.0))
}

impl Spectrum {
    pub fn gap(&self, wells: usize, noise_tolerance: f64) -> Result<f64> {
        spectral_gap(
            &self.eigenvalues,
            &self.relaxation_weights,
            wells,
            noise_tolerance,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn weights(eigenvalues: &[f64]) -> Vec<f64> {
        eigenvalues.iter().map(|l| (-l).exp()).collect()
    }

    #[test]
    fn picks_gap_at_well_rank() {
        let eigenvalues = [0.0, 0.1, 3.0, 3.5];
        let w = weights(&eigenvalues);
        let first = spectral_gap(&eigenvalues, &w, 1, DEFAULT_NOISE_TOLERANCE).unwrap();
        let second = spectral_gap(&eigenvalues, &w, 2, DEFAULT_NOISE_TOLERANCE).unwrap();
        assert!((first - (1.0 - (-0.1f64).exp())).abs() < 1e-12);
        assert!((second - ((-0.1f64).exp() - (-3.0f64).exp())).abs() < 1e-12);
        assert!(second > first);
    }

    #[test]
    fn too_few_wells_scores_zero() {
        let eigenvalues = [0.0, 2.0];
        let w = weights(&eigenvalues);
        assert_eq!(spectral_gap(&eigenvalues, &w, 2, DEFAULT_NOISE_TOLERANCE).unwrap(), 0.0);
    }

    #[test]
    fn noise_eigenvalues_are_dropped() {
        let eigenvalues = [-1e-3, -1e-12, 1.0];
        let w = weights(&eigenvalues);
        let gap = spectral_gap(&eigenvalues, &w, 1, DEFAULT_NOISE_TOLERANCE).unwrap();
        assert!((gap - ((1e-12f64).exp() - (-1.0f64).exp())).abs() < 1e-12);
        assert_eq!(spectral_gap(&eigenvalues, &w, 2, DEFAULT_NOISE_TOLERANCE).unwrap(), 0.0);
    }

    #[test]
    fn underflowed_weights_are_dropped() {
        let eigenvalues = [0.0, 1.0, 1e4];
        let w = weights(&eigenvalues);
        assert_eq!(w[2], 0.0);
        assert_eq!(spectral_gap(&eigenvalues, &w, 2, DEFAULT_NOISE_TOLERANCE).unwrap(), 0.0);
    }

    #[test]
    fn zero_wells_is_a_configuration_error() {
        let err = spectral_gap(&[0.0], &[1.0], 0, DEFAULT_NOISE_TOLERANCE).unwrap_err();
        assert!(matches!(err, SgoopError::Config(_)));
    }
}
