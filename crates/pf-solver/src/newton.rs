//! Newton method driven by a [`NewtonController`].

use crate::controller::NewtonController;
use crate::error::{SolverError, SolverResult};
use crate::jacobian::finite_difference_jacobian;
use nalgebra::{DMatrix, DVector};
use tracing::{debug, warn};

/// Relative perturbation of the finite difference Jacobian.
pub const FD_EPSILON: f64 = 1e-7;

/// Nonlinear system solved by [`newton_solve`].
pub trait NewtonSystem: Sync {
    /// Number of unknowns.
    fn size(&self) -> usize;

    /// Fix the state at which state-dependent branch decisions are taken
    /// for the following residual evaluations.
    fn set_evaluation_point(&mut self, u: &DVector<f64>) -> SolverResult<()>;

    fn residual(&self, u: &DVector<f64>) -> SolverResult<DVector<f64>>;

    /// Jacobian of the residual at `u`, where `r = residual(u)`.
    fn jacobian(&self, u: &DVector<f64>, r: &DVector<f64>) -> SolverResult<DMatrix<f64>> {
        finite_difference_jacobian(u, r, |x| self.residual(x), FD_EPSILON)
    }
}

/// Outcome of one Newton solve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NewtonOutcome {
    pub converged: bool,
    pub iterations: usize,
    /// Euclidean norm of the last assembled residual.
    pub residual_norm: f64,
    /// Controller error measure after the last iteration.
    pub error: f64,
}

/// Solve `system` starting from `u`, which holds the final iterate on return.
///
/// Non-convergence is reported through [`NewtonOutcome::converged`], and the
/// controller has then been told via `newton_fail`. Recoverable errors
/// during an iteration (non-physical states, singular Jacobians) end the
/// solve the same way; other errors are returned.
pub fn newton_solve<S, C>(system: &mut S, controller: &mut C, u: &mut DVector<f64>) -> SolverResult<NewtonOutcome>
where
    S: NewtonSystem + ?Sized,
    C: NewtonController + ?Sized,
{
    if u.len() != system.size() {
        return Err(SolverError::DimensionMismatch {
            what: "initial guess",
            expected: system.size(),
            actual: u.len(),
        });
    }

    controller.newton_begin(u);
    let mut residual_norm = f64::NAN;
    let mut aborted = false;

    while controller.newton_proceed() {
        match newton_iteration(system, u) {
            Ok((u_new, norm)) => {
                residual_norm = norm;
                let u_old = std::mem::replace(u, u_new);
                controller.newton_end_step(u, &u_old);
                debug!(
                    iteration = controller.num_steps(),
                    residual_norm,
                    error = controller.error(),
                    "newton iteration"
                );
            }
            Err(e) if e.is_recoverable() => {
                warn!(iteration = controller.num_steps() + 1, error = %e, "newton iteration aborted");
                aborted = true;
                break;
            }
            Err(e) => return Err(e),
        }
    }

    let iterations = controller.num_steps();
    let error = controller.error();
    let converged = !aborted && controller.newton_converged();
    if converged {
        controller.newton_succeed();
    } else {
        controller.newton_fail();
    }

    Ok(NewtonOutcome {
        converged,
        iterations,
        residual_norm,
        error,
    })
}

/// One update `u - J⁻¹ r`, returned with the norm of `r`.
fn newton_iteration<S>(system: &mut S, u: &DVector<f64>) -> SolverResult<(DVector<f64>, f64)>
where
    S: NewtonSystem + ?Sized,
{
    system.set_evaluation_point(u)?;

    let r = system.residual(u)?;
    if r.iter().any(|v| !v.is_finite()) {
        return Err(SolverError::Numeric {
            what: "non-finite residual".to_string(),
        });
    }

    let jac = system.jacobian(u, &r)?;
    let delta = jac.lu().solve(&r).ok_or_else(|| SolverError::Numeric {
        what: "Jacobian solve failed".to_string(),
    })?;
    if delta.iter().any(|v| !v.is_finite()) {
        return Err(SolverError::Numeric {
            what: "non-finite Newton update".to_string(),
        });
    }

    Ok((u - delta, r.norm()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::{BaseNewtonController, NewtonSettings};

    /// `x² − 4 = 0`; rejects `x ≤ 0` as non-physical.
    struct Quadratic {
        eval_points: Vec<f64>,
    }

    impl NewtonSystem for Quadratic {
        fn size(&self) -> usize {
            1
        }

        fn set_evaluation_point(&mut self, u: &DVector<f64>) -> SolverResult<()> {
            self.eval_points.push(u[0]);
            Ok(())
        }

        fn residual(&self, u: &DVector<f64>) -> SolverResult<DVector<f64>> {
            if u[0] <= 0.0 {
                return Err(SolverError::Numeric {
                    what: "non-positive unknown".to_string(),
                });
            }
            Ok(DVector::from_element(1, u[0] * u[0] - 4.0))
        }
    }

    fn controller() -> BaseNewtonController {
        BaseNewtonController::new(NewtonSettings {
            rel_tolerance: 1e-10,
            ..NewtonSettings::default()
        })
        .unwrap()
    }

    #[test]
    fn simple_quadratic() {
        let mut system = Quadratic { eval_points: Vec::new() };
        let mut c = controller();
        let mut u = DVector::from_element(1, 3.0);

        let outcome = newton_solve(&mut system, &mut c, &mut u).unwrap();

        assert!(outcome.converged);
        assert!((u[0] - 2.0).abs() < 1e-9);
        assert!(outcome.iterations >= 2 && outcome.iterations < 18);
        // Every iteration fixes its own starting point as evaluation point.
        assert_eq!(system.eval_points.len(), outcome.iterations);
        assert_eq!(system.eval_points[0], 3.0);
    }

    #[test]
    fn non_physical_iterate_fails_the_solve() {
        let mut system = Quadratic { eval_points: Vec::new() };
        let mut c = controller();
        let mut u = DVector::from_element(1, -1.0);

        let outcome = newton_solve(&mut system, &mut c, &mut u).unwrap();

        assert!(!outcome.converged);
        assert_eq!(outcome.iterations, 0);
        // The controller was told, so its next proposal halves the step.
        assert!((c.suggest_time_step_size(2.0) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn singular_jacobian_fails_the_solve() {
        struct Flat;
        impl NewtonSystem for Flat {
            fn size(&self) -> usize {
                1
            }
            fn set_evaluation_point(&mut self, _u: &DVector<f64>) -> SolverResult<()> {
                Ok(())
            }
            fn residual(&self, _u: &DVector<f64>) -> SolverResult<DVector<f64>> {
                Ok(DVector::from_element(1, 1.0))
            }
        }

        let mut c = controller();
        let mut u = DVector::from_element(1, 0.0);
        let outcome = newton_solve(&mut Flat, &mut c, &mut u).unwrap();
        assert!(!outcome.converged);
    }

    #[test]
    fn wrong_initial_length_is_an_error() {
        let mut system = Quadratic { eval_points: Vec::new() };
        let mut c = controller();
        let mut u = DVector::zeros(2);
        assert!(matches!(
            newton_solve(&mut system, &mut c, &mut u),
            Err(SolverError::DimensionMismatch { .. })
        ));
    }
}
