use std::cmp::Ordering;

use log::debug;
use nalgebra::{DMatrix, SymmetricEigen};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SgoopError};

const SYMMETRY_TOLERANCE: f64 = 1e-8;

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EigenSettings {
    pub tolerance: f64,
    /// Sweep cap for the symmetric QR iteration; 0 means unbounded.
    pub max_iterations: usize,
}

impl Default for EigenSettings {
    fn default() -> Self {
        Self {
            tolerance: f64::EPSILON,
            max_iterations: 10_000,
        }
    }
}

/// Eigenvalues in ascending order with matching eigenvectors (as columns)
/// and relaxation weights `exp(-lambda)`.
#[derive(Debug, Clone)]
pub struct Spectrum {
    pub eigenvalues: Vec<f64>,
    pub eigenvectors: DMatrix<f64>,
    pub relaxation_weights: Vec<f64>,
}

impl Spectrum {
    pub fn len(&self) -> usize {
        self.eigenvalues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.eigenvalues.is_empty()
    }

    /// Eigenvectors as a list of columns, in eigenvalue order.
    pub fn eigenvector_columns(&self) -> Vec<Vec<f64>> {
        self.eigenvectors
            .column_iter()
            .map(|column| column.iter().copied().collect())
            .collect()
    }
}

/// Diagonalizes a rate matrix built against `histogram`.
///
/// The matrix is brought to symmetric form by \( P^{-1} S P \) with
/// \( P = \mathrm{diag}(\sqrt{p}) \) and handed to a symmetric eigensolver;
/// eigenvectors are mapped back through `P`. Empty bins keep unit scale since
/// their rows and columns vanish.
pub fn analyze(
    matrix: &DMatrix<f64>,
    histogram: &[f64],
    settings: &EigenSettings,
) -> Result<Spectrum> {
    if matrix.nrows() != matrix.ncols() {
        return Err(SgoopError::NumericFailure(
            "spectral analysis expects a square matrix".to_string(),
        ));
    }
    let size = matrix.nrows();
    if size == 0 {
        return Err(SgoopError::NumericFailure(
            "spectral analysis of an empty matrix".to_string(),
        ));
    }
    if histogram.len() != size {
        return Err(SgoopError::NumericFailure(format!(
            "histogram has {} bins, matrix has order {}",
            histogram.len(),
            size
        )));
    }
    if matrix.iter().any(|v| !v.is_finite()) {
        return Err(SgoopError::NumericFailure(
            "rate matrix contains non-finite entries".to_string(),
        ));
    }

    let scale: Vec<f64> = histogram
        .iter()
        .map(|p| if *p > 0.0 { p.sqrt() } else { 1.0 })
        .collect();
    let similar = DMatrix::from_fn(size, size, |i, j| matrix[(i, j)] * scale[j] / scale[i]);
    let asymmetry = (&similar - similar.transpose()).amax();
    if asymmetry > SYMMETRY_TOLERANCE * similar.amax().max(1.0) {
        return Err(SgoopError::NumericFailure(format!(
            "rate matrix violates detailed balance (asymmetry {:.3e})",
            asymmetry
        )));
    }
    let symmetric = 0.5 * (&similar + similar.transpose());

    let eigen = SymmetricEigen::try_new(symmetric, settings.tolerance, settings.max_iterations)
        .ok_or_else(|| {
            SgoopError::NumericFailure(format!(
                "eigendecomposition did not converge within {} iterations",
                settings.max_iterations
            ))
        })?;

    let mut order: Vec<usize> = (0..size).collect();
    order.sort_by(|&a, &b| {
        eigen.eigenvalues[a]
            .partial_cmp(&eigen.eigenvalues[b])
            .unwrap_or(Ordering::Equal)
    });

    let eigenvalues: Vec<f64> = order.iter().map(|&idx| eigen.eigenvalues[idx]).collect();
    if eigenvalues.iter().any(|v| !v.is_finite()) {
        return Err(SgoopError::NumericFailure(
            "eigendecomposition produced non-finite eigenvalues".to_string(),
        ));
    }

    let mut eigenvectors = DMatrix::from_fn(size, size, |row, col| {
        eigen.eigenvectors[(row, order[col])] * scale[row]
    });
    for mut column in eigenvectors.column_iter_mut() {
        let norm = column.norm();
        if norm > f64::EPSILON {
            column /= norm;
        }
    }

    let relaxation_weights = eigenvalues.iter().map(|lambda| (-lambda).exp()).collect();
    debug!(
        "spectrum of order {}: lowest eigenvalues {:?}",
        size,
        &eigenvalues[..size.min(4)]
    );

    Ok(Spectrum {
        eigenvalues,
        eigenvectors,
        relaxation_weights,
    })
}
