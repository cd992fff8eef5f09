//! Phase complementarity (NCP) conditions.
//!
//! Each phase `p` carries two inequalities,
//! - `phase_present_ineq = S_p ≥ 0`
//! - `phase_absent_ineq  = 1 − Σ_c x_{p,c} ≥ 0`
//!
//! and the complementarity condition `min(absent, present) = 0` says that at
//! least one of them is tight: either the phase exists and its mole
//! fractions sum to one, or its saturation vanishes. Instead of a hard
//! `min`, the smaller inequality is picked at the evaluation point (the
//! previous Newton iterate) and only that one is returned for the current
//! state, so the residual stays smooth within one Newton step.

use pf_fluids::FluidStateAccess;

/// Which inequality a phase's complementarity row returns.
///
/// Variants are named after the returned quantity. `Saturation` is chosen
/// when `phase_absent_ineq > phase_present_ineq` at the evaluation point and
/// returns the "present" inequality `S_p`; `MoleFractionSum` is chosen
/// otherwise, ties included, and returns the "absent" inequality
/// `1 − Σ_c x_{p,c}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NcpBranch {
    /// `phase_present_ineq` is returned: the saturation is driven to zero.
    Saturation,
    /// `phase_absent_ineq` is returned: the mole fractions are driven to sum to one.
    MoleFractionSum,
}

impl NcpBranch {
    /// Whether this branch describes a phase that physically exists.
    pub fn phase_exists(self) -> bool {
        self == NcpBranch::MoleFractionSum
    }
}

/// Inequality that holds while the phase exists: its saturation.
pub fn phase_present_ineq<S>(fs: &S, phase: usize) -> f64
where
    S: FluidStateAccess + ?Sized,
{
    fs.saturation(phase)
}

/// Inequality that holds while the phase is absent: `1 − Σ_c x_{p,c}`.
pub fn phase_absent_ineq<S>(fs: &S, phase: usize) -> f64
where
    S: FluidStateAccess + ?Sized,
{
    let mut a = 1.0;
    for comp in 0..fs.num_components() {
        a -= fs.mole_fraction(phase, comp);
    }
    a
}

/// Branch for `phase`, judged from the evaluation-point state only.
///
/// Ties return [`NcpBranch::MoleFractionSum`], i.e. `phase_absent_ineq`.
pub fn select_branch<S>(eval_fs: &S, phase: usize) -> NcpBranch
where
    S: FluidStateAccess + ?Sized,
{
    let a_eval = phase_absent_ineq(eval_fs, phase);
    let b_eval = phase_present_ineq(eval_fs, phase);
    if a_eval > b_eval {
        NcpBranch::Saturation
    } else {
        NcpBranch::MoleFractionSum
    }
}

/// Complementarity residual of `phase`: branch from `eval_fs`, value from `fs`.
pub fn phase_ncp<E, S>(eval_fs: &E, fs: &S, phase: usize) -> f64
where
    E: FluidStateAccess + ?Sized,
    S: FluidStateAccess + ?Sized,
{
    match select_branch(eval_fs, phase) {
        NcpBranch::Saturation => phase_present_ineq(fs, phase),
        NcpBranch::MoleFractionSum => phase_absent_ineq(fs, phase),
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use pf_core::units::{k, pa};
    use pf_fluids::FluidState;
    use proptest::prelude::*;

    fn state(s: f64, x0: f64, x1: f64) -> FluidState {
        FluidState::from_parts(vec![s], vec![vec![x0, x1]], pa(1e5), k(300.0)).unwrap()
    }

    proptest! {
        #[test]
        fn returns_exactly_one_of_the_inequalities(
            s_eval in -0.2_f64..1.2, x_eval in 0.0_f64..0.8, y_eval in 0.0_f64..0.8,
            s in -0.2_f64..1.2, x in 0.0_f64..0.8, y in 0.0_f64..0.8,
        ) {
            let eval = state(s_eval, x_eval, y_eval);
            let current = state(s, x, y);
            let value = phase_ncp(&eval, &current, 0);
            match select_branch(&eval, 0) {
                NcpBranch::Saturation => prop_assert_eq!(value, phase_present_ineq(&current, 0)),
                NcpBranch::MoleFractionSum => prop_assert_eq!(value, phase_absent_ineq(&current, 0)),
            }
        }

        #[test]
        fn branch_depends_on_evaluation_point_only(
            s_eval in -0.2_f64..1.2, x_eval in 0.0_f64..0.8,
            s1 in -0.2_f64..1.2, s2 in -0.2_f64..1.2, x1 in 0.0_f64..0.8, x2 in 0.0_f64..0.8,
        ) {
            let eval = state(s_eval, x_eval, 0.1);
            let branch = select_branch(&eval, 0);
            for (s, x) in [(s1, x1), (s2, x2)] {
                let current = state(s, x, 0.0);
                let expected = match branch {
                    NcpBranch::Saturation => s,
                    NcpBranch::MoleFractionSum => 1.0 - x,
                };
                prop_assert_eq!(phase_ncp(&eval, &current, 0), expected);
            }
        }

        #[test]
        fn smaller_inequality_is_selected(s in -1.0_f64..2.0, x in 0.0_f64..1.0, y in 0.0_f64..1.0) {
            let fs = state(s, x, y);
            let chosen = phase_ncp(&fs, &fs, 0);
            let smaller = phase_absent_ineq(&fs, 0).min(phase_present_ineq(&fs, 0));
            prop_assert_eq!(chosen, smaller);
        }
    }
}
