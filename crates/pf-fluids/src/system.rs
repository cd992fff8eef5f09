//! Fluid system trait.

/// Phase and component properties needed by the compositional residual.
///
/// Implementations must be thread-safe (Send + Sync): elements are assembled
/// in parallel and all share one fluid system. Pressures are in Pa,
/// temperatures in K, and all methods are pure functions of their inputs.
pub trait FluidSystem: Send + Sync {
    /// Model name (for debugging/logging).
    fn name(&self) -> &str;

    fn num_phases(&self) -> usize;

    fn num_components(&self) -> usize;

    fn phase_name(&self, phase: usize) -> &'static str;

    fn component_name(&self, comp: usize) -> &'static str;

    /// Fugacity coefficient φ such that `f = φ · x · p`.
    fn fugacity_coefficient(&self, phase: usize, comp: usize, p: f64, t: f64) -> f64;

    /// Molar density [mol/m³].
    fn molar_density(&self, phase: usize, p: f64, t: f64) -> f64;

    /// Dynamic viscosity [Pa·s].
    fn viscosity(&self, phase: usize, p: f64, t: f64) -> f64;

    /// Partial molar enthalpy of `comp` dissolved in `phase` [J/mol].
    fn component_enthalpy(&self, phase: usize, comp: usize, t: f64) -> f64;

    /// Molecular diffusion coefficient inside `phase` [m²/s].
    fn diffusion_coefficient(&self, phase: usize, p: f64, t: f64) -> f64;

    /// Thermal conductivity of `phase` [W/(m·K)].
    fn thermal_conductivity(&self, phase: usize) -> f64;
}
