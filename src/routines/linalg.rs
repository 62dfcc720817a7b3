use faer::prelude::*;
use faer::Mat;
use ndarray::{Array1, Array2};
use std::f64::consts::PI;

/// Terms of the Gaussian log-density that depend on the covariance
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GaussianTerms {
    /// `dᵗ C⁻¹ d`
    pub mahalanobis: f64,
    /// Signed log-determinant `sign(det C) · log|det(2π C)|`
    pub log_det: f64,
}

/// Compute `dᵗ C⁻¹ d` and the signed log-determinant of `2π C` from a partial-pivoting LU
/// factorization of `C`
///
/// faer stores the pivots on the diagonal of `L` and returns a unit upper-triangular `U`. The
/// log-determinant is the sum of the logarithms of the pivot magnitudes, and its sign combines
/// the pivot signs with the parity of the row transpositions. `C⁻¹ d` comes from a linear
/// solve against the factors. Returns `None` if a pivot is zero, non-finite, or smaller than
/// `tolerance` times the largest pivot.
pub fn gaussian_terms(cov: &Array2<f64>, diff: &Array1<f64>, tolerance: f64) -> Option<GaussianTerms> {
    let n = diff.len();
    let c = Mat::from_fn(cov.nrows(), cov.ncols(), |i, j| cov[[i, j]]);
    let lu = c.partial_piv_lu();
    let l = lu.compute_l();

    let pivots: Vec<f64> = (0..n).map(|i| l.read(i, i)).collect();
    let largest = pivots.iter().map(|p| p.abs()).fold(0.0, f64::max);
    if !largest.is_finite() || largest == 0.0 {
        return None;
    }
    if pivots
        .iter()
        .any(|&p| !p.is_finite() || p == 0.0 || p.abs() <= tolerance * largest)
    {
        return None;
    }

    let negative = pivots.iter().filter(|&&p| p < 0.0).count() + lu.transposition_count();
    let sign = if negative % 2 == 0 { 1.0 } else { -1.0 };
    let log_abs_det = pivots.iter().map(|p| p.abs().ln()).sum::<f64>() + n as f64 * (2.0 * PI).ln();
    let log_det = sign * log_abs_det;

    let rhs = Mat::from_fn(n, 1, |i, _| diff[i]);
    let solved = lu.solve(rhs.as_ref());
    let mahalanobis: f64 = (0..n).map(|i| diff[i] * solved.read(i, 0)).sum();

    if !mahalanobis.is_finite() || !log_det.is_finite() {
        return None;
    }
    Some(GaussianTerms {
        mahalanobis,
        log_det,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    fn diagonal_covariance() {
        let cov = array![[2.0, 0.0], [0.0, 4.0]];
        let diff = array![2.0, 2.0];
        let terms = gaussian_terms(&cov, &diff, 1e-12).unwrap();
        assert_relative_eq!(terms.mahalanobis, 4.0 / 2.0 + 4.0 / 4.0, epsilon = 1e-12);
        assert_relative_eq!(
            terms.log_det,
            (2.0 * PI * 2.0).ln() + (2.0 * PI * 4.0).ln(),
            epsilon = 1e-12
        );
    }

    #[test]
    fn dense_covariance_determinant() {
        // det = 4 * 3 - 1 * 2 = 10
        let cov = array![[4.0, 1.0], [2.0, 3.0]];
        let terms = gaussian_terms(&cov, &array![0.0, 0.0], 1e-12).unwrap();
        assert_relative_eq!(terms.mahalanobis, 0.0);
        assert_relative_eq!(
            terms.log_det,
            10.0f64.ln() + 2.0 * (2.0 * PI).ln(),
            epsilon = 1e-12
        );
    }

    #[test]
    fn pivoting_handles_zero_leading_entry() {
        // det = -1, one row swap
        let cov = array![[0.0, 1.0], [1.0, 0.0]];
        let diff = array![1.0, 3.0];
        let terms = gaussian_terms(&cov, &diff, 1e-12).unwrap();
        // C⁻¹ = C, so dᵗ C d = 2 * 1 * 3
        assert_relative_eq!(terms.mahalanobis, 6.0, epsilon = 1e-12);
        assert_relative_eq!(terms.log_det, -2.0 * (2.0 * PI).ln(), epsilon = 1e-12);
    }

    #[test]
    fn negative_determinant_flips_sign() {
        // det = 1 - 4 = -3
        let cov = array![[1.0, 2.0], [2.0, 1.0]];
        let terms = gaussian_terms(&cov, &array![0.0, 0.0], 1e-12).unwrap();
        assert_relative_eq!(
            terms.log_det,
            -(3.0f64.ln() + 2.0 * (2.0 * PI).ln()),
            epsilon = 1e-12
        );
    }

    #[test]
    fn singular_matrix_is_rejected() {
        let cov = array![[1.0, 2.0], [2.0, 4.0]];
        assert!(gaussian_terms(&cov, &array![1.0, 1.0], 1e-12).is_none());
        assert!(gaussian_terms(&Array2::zeros((3, 3)), &Array1::ones(3), 1e-12).is_none());
    }

    #[test]
    fn tiny_relative_pivot_is_rejected() {
        let cov = Array2::from_diag(&array![1.0, 1e-14]);
        let diff = array![1.0, 0.0];
        assert!(gaussian_terms(&cov, &diff, 1e-12).is_none());

        let terms = gaussian_terms(&cov, &diff, 0.0).unwrap();
        assert_relative_eq!(terms.mahalanobis, 1.0, epsilon = 1e-12);
        assert_relative_eq!(
            terms.log_det,
            1e-14f64.ln() + 2.0 * (2.0 * PI).ln(),
            epsilon = 1e-10
        );
    }
}
