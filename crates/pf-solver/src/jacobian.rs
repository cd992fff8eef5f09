//! Finite difference Jacobian computation.

use crate::error::{SolverError, SolverResult};
use nalgebra::{DMatrix, DVector};
use rayon::prelude::*;

/// Compute the Jacobian using forward finite differences.
///
/// `f_x` is `f(x)`, already known to the caller. Column `j` perturbs `x[j]`
/// by `epsilon * max(|x[j]|, 1)`. Columns are evaluated in parallel, so `f`
/// must be free of side effects.
pub fn finite_difference_jacobian<F>(
    x: &DVector<f64>,
    f_x: &DVector<f64>,
    f: F,
    epsilon: f64,
) -> SolverResult<DMatrix<f64>>
where
    F: Fn(&DVector<f64>) -> SolverResult<DVector<f64>> + Sync,
{
    let n = x.len();
    let m = f_x.len();

    let columns = (0..n)
        .into_par_iter()
        .map(|j| {
            let mut x_perturbed = x.clone();
            let dx = epsilon * x[j].abs().max(1.0);
            x_perturbed[j] += dx;

            let f_perturbed = f(&x_perturbed)?;
            if f_perturbed.len() != m {
                return Err(SolverError::DimensionMismatch {
                    what: "perturbed residual",
                    expected: m,
                    actual: f_perturbed.len(),
                });
            }
            Ok((f_perturbed - f_x) / dx)
        })
        .collect::<SolverResult<Vec<_>>>()?;

    let mut jac = DMatrix::zeros(m, n);
    for (j, df) in columns.iter().enumerate() {
        jac.set_column(j, df);
    }
    Ok(jac)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jacobian_linear() {
        // f(x) = 2*x, J = 2
        let f = |x: &DVector<f64>| -> SolverResult<DVector<f64>> { Ok(DVector::from_element(1, 2.0 * x[0])) };

        let x = DVector::from_element(1, 3.0);
        let f_x = f(&x).unwrap();
        let jac = finite_difference_jacobian(&x, &f_x, f, 1e-7).unwrap();

        assert!((jac[(0, 0)] - 2.0).abs() < 1e-5);
    }

    #[test]
    fn jacobian_coupled() {
        // f(x, y) = (x*y, x + y^2)
        let f = |v: &DVector<f64>| -> SolverResult<DVector<f64>> {
            Ok(DVector::from_vec(vec![v[0] * v[1], v[0] + v[1] * v[1]]))
        };

        let x = DVector::from_vec(vec![2.0, 3.0]);
        let f_x = f(&x).unwrap();
        let jac = finite_difference_jacobian(&x, &f_x, f, 1e-7).unwrap();

        assert!((jac[(0, 0)] - 3.0).abs() < 1e-5);
        assert!((jac[(0, 1)] - 2.0).abs() < 1e-5);
        assert!((jac[(1, 0)] - 1.0).abs() < 1e-5);
        assert!((jac[(1, 1)] - 6.0).abs() < 1e-5);
    }

    #[test]
    fn perturbation_scales_with_magnitude() {
        // f(p) = p^2 around 1e5: a fixed 1e-7 step would drown in round-off.
        let f = |x: &DVector<f64>| -> SolverResult<DVector<f64>> { Ok(DVector::from_element(1, x[0] * x[0])) };

        let x = DVector::from_element(1, 1e5);
        let f_x = f(&x).unwrap();
        let jac = finite_difference_jacobian(&x, &f_x, f, 1e-7).unwrap();

        assert!((jac[(0, 0)] / 2e5 - 1.0).abs() < 1e-6);
    }

    #[test]
    fn residual_errors_propagate() {
        let f = |_: &DVector<f64>| -> SolverResult<DVector<f64>> {
            Err(SolverError::Numeric {
                what: "unphysical".to_string(),
            })
        };
        let x = DVector::from_element(2, 1.0);
        let f_x = DVector::zeros(2);
        assert!(finite_difference_jacobian(&x, &f_x, f, 1e-7).is_err());
    }
}
