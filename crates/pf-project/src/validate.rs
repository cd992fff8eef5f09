//! Configuration validation logic.

use crate::schema::{BoundaryDef, SimulationConfig};

pub const LATEST_VERSION: u32 = 1;

#[derive(thiserror::Error, Debug)]
pub enum ValidationError {
    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Unsupported version: {version}")]
    UnsupportedVersion { version: u32 },
}

fn invalid(field: &str, value: impl ToString, reason: &str) -> ValidationError {
    ValidationError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn positive(field: &str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(invalid(field, value, "must be positive and finite"));
    }
    Ok(())
}

fn non_negative(field: &str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() || value < 0.0 {
        return Err(invalid(field, value, "must be non-negative and finite"));
    }
    Ok(())
}

fn saturation(field: &str, value: f64) -> Result<(), ValidationError> {
    if !(0.0..=1.0).contains(&value) {
        return Err(invalid(field, value, "must lie in [0, 1]"));
    }
    Ok(())
}

fn fugacity(field: &str, value: Option<f64>) -> Result<(), ValidationError> {
    match value {
        Some(f) => non_negative(field, f),
        None => Ok(()),
    }
}

pub fn validate_config(config: &SimulationConfig) -> Result<(), ValidationError> {
    if config.version > LATEST_VERSION {
        return Err(ValidationError::UnsupportedVersion {
            version: config.version,
        });
    }

    let newton = &config.newton;
    positive("newton.rel_tolerance", newton.rel_tolerance)?;
    positive("newton.max_time_step_size", newton.max_time_step_size)?;
    if newton.target_steps == 0 {
        return Err(invalid("newton.target_steps", newton.target_steps, "must be at least 1"));
    }
    if newton.max_steps < newton.target_steps {
        return Err(invalid(
            "newton.max_steps",
            newton.max_steps,
            "must not be below newton.target_steps",
        ));
    }

    let time = &config.time;
    non_negative("time.t_end", time.t_end)?;
    positive("time.dt_initial", time.dt_initial)?;
    positive("time.min_dt", time.min_dt)?;
    if time.min_dt > time.dt_initial {
        return Err(invalid("time.min_dt", time.min_dt, "must not exceed time.dt_initial"));
    }
    if time.record_every == 0 {
        return Err(invalid("time.record_every", time.record_every, "must be at least 1"));
    }

    let domain = &config.domain;
    positive("domain.length", domain.length)?;
    positive("domain.area", domain.area)?;
    positive("domain.permeability", domain.permeability)?;
    if domain.cells == 0 {
        return Err(invalid("domain.cells", domain.cells, "must be at least 1"));
    }
    if !(domain.porosity > 0.0 && domain.porosity <= 1.0) {
        return Err(invalid("domain.porosity", domain.porosity, "must lie in (0, 1]"));
    }

    positive("fluid.temperature", config.fluid.temperature)?;

    let initial = &config.initial;
    positive("initial.pressure", initial.pressure)?;
    saturation("initial.gas_saturation", initial.gas_saturation)?;
    fugacity("initial.water_fugacity", initial.water_fugacity)?;
    fugacity("initial.air_fugacity", initial.air_fugacity)?;

    let num_eq = config.fluid.num_eq();
    validate_boundary("boundaries.left", &config.boundaries.left, num_eq)?;
    validate_boundary("boundaries.right", &config.boundaries.right, num_eq)?;

    Ok(())
}

fn validate_boundary(context: &str, boundary: &BoundaryDef, num_eq: usize) -> Result<(), ValidationError> {
    match boundary {
        BoundaryDef::NoFlow => Ok(()),
        BoundaryDef::Neumann { rates } => {
            if rates.len() != num_eq {
                return Err(invalid(
                    &format!("{context}.rates"),
                    rates.len(),
                    &format!("expected one rate per equation ({num_eq})"),
                ));
            }
            if let Some(r) = rates.iter().find(|r| !r.is_finite()) {
                return Err(invalid(&format!("{context}.rates"), r, "must be finite"));
            }
            Ok(())
        }
        BoundaryDef::Dirichlet {
            pressure,
            gas_saturation,
            water_fugacity,
            air_fugacity,
        } => {
            positive(&format!("{context}.pressure"), *pressure)?;
            saturation(&format!("{context}.gas_saturation"), *gas_saturation)?;
            fugacity(&format!("{context}.water_fugacity"), *water_fugacity)?;
            fugacity(&format!("{context}.air_fugacity"), *air_fugacity)
        }
    }
}
