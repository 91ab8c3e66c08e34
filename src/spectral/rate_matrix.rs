use log::debug;
use nalgebra::DMatrix;

use crate::error::{Result, SgoopError};

/// Builds the transition-rate matrix over bins.
///
/// Hops between bins at most `hop` apart get rate `mu * sqrt(p[j] / p[i])`,
/// which satisfies detailed balance against `histogram`. Each diagonal entry
/// balances its column so the returned matrix \( S = -R^T \) has rows summing
/// to zero and a non-negative spectrum.
pub fn build_rate_matrix(mu: f64, histogram: &[f64], hop: usize) -> Result<DMatrix<f64>> {
    if !mu.is_finite() || mu < 0.0 {
        return Err(SgoopError::NumericFailure(format!(
            "rate prefactor {} is not a finite non-negative number",
            mu
        )));
    }
    if histogram.iter().any(|p| !p.is_finite() || *p < 0.0) {
        return Err(SgoopError::NumericFailure(
            "histogram contains negative or non-finite probabilities".to_string(),
        ));
    }

    let k = histogram.len();
    let mut raw = DMatrix::<f64>::zeros(k, k);
    for i in 0..k {
        if histogram[i] <= 0.0 {
            continue;
        }
        let upper = (i + hop).min(k.saturating_sub(1));
        for j in i.saturating_sub(hop)..=upper {
            if j != i {
                raw[(i, j)] = mu * (histogram[j] / histogram[i]).sqrt();
            }
        }
    }

    for i in 0..k {
        let column_sum: f64 = raw.column(i).iter().sum();
        raw[(i, i)] = -column_sum;
    }

    let rates = -raw.transpose();
    debug!("built {}x{} rate matrix (hop {}, mu {:.6})", k, k, hop, mu);
    Ok(rates)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn asymmetric_histogram() -> Vec<f64> {
        vec![0.1, 0.25, 0.0, 0.3, 0.2, 0.15]
    }

    #[test]
    fn two_bin_symmetric_case() {
        let s = build_rate_matrix(2.0, &[0.5, 0.5], 1).unwrap();
        assert!((s[(0, 0)] - 2.0).abs() < 1e-12);
        assert!((s[(1, 1)] - 2.0).abs() < 1e-12);
        assert!((s[(0, 1)] + 2.0).abs() < 1e-12);
        assert!((s[(1, 0)] + 2.0).abs() < 1e-12);
    }

    #[test]
    fn rows_sum_to_zero() {
        for hop in 1..=3 {
            let s = build_rate_matrix(1.7, &asymmetric_histogram(), hop).unwrap();
            for row in s.row_iter() {
                assert!(row.sum().abs() < 1e-12, "hop {hop}: row sum {}", row.sum());
            }
        }
    }

    #[test]
    fn detailed_balance_holds() {
        let p = asymmetric_histogram();
        let hop = 2;
        let s = build_rate_matrix(0.8, &p, hop).unwrap();
        for i in 0..p.len() {
            for j in 0..p.len() {
                if i == j || i.abs_diff(j) > hop || p[i] == 0.0 || p[j] == 0.0 {
                    continue;
                }
                assert!((s[(j, i)] * p[i] - s[(i, j)] * p[j]).abs() < 1e-12);
                assert!(s[(i, j)] < 0.0);
            }
        }
    }

    #[test]
    fn hops_beyond_range_are_zero() {
        let p = asymmetric_histogram();
        let s = build_rate_matrix(1.0, &p, 1).unwrap();
        assert_eq!(s[(0, 3)], 0.0);
        assert_eq!(s[(5, 1)], 0.0);
    }

    #[test]
    fn empty_bins_are_disconnected() {
        let s = build_rate_matrix(1.0, &asymmetric_histogram(), 1).unwrap();
        assert!(s.row(2).iter().all(|v| *v == 0.0));
        assert!(s.column(2).iter().all(|v| *v == 0.0));
    }

    #[test]
    fn rejects_invalid_prefactor() {
        let err = build_rate_matrix(f64::NAN, &[0.5, 0.5], 1).unwrap_err();
        assert!(matches!(err, SgoopError::NumericFailure(_)));
    }
}
