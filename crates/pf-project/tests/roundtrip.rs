use pf_project::schema::*;
use pf_project::{ConfigError, load_json, load_yaml, save_json, save_yaml, validate_config};

fn config() -> SimulationConfig {
    SimulationConfig {
        version: 1,
        name: "Injection".to_string(),
        newton: NewtonDef {
            max_time_step_size: 120.0,
            ..NewtonDef::default()
        },
        time: TimeDef {
            t_end: 600.0,
            dt_initial: 1.0,
            min_dt: 1e-3,
            max_retries: 8,
            record_every: 2,
        },
        domain: DomainDef {
            length: 2.0,
            cells: 8,
            area: 0.5,
            porosity: 0.25,
            permeability: 2e-12,
        },
        fluid: FluidDef {
            temperature: 300.0,
            enable_energy: true,
        },
        initial: InitialStateDef {
            pressure: 1.5e5,
            gas_saturation: 0.0,
            water_fugacity: Some(3000.0),
            air_fugacity: None,
        },
        boundaries: BoundariesDef {
            left: BoundaryDef::Neumann {
                rates: vec![0.0, -1e-5, 0.0, 0.0, 0.0],
            },
            right: BoundaryDef::Dirichlet {
                pressure: 1.5e5,
                gas_saturation: 0.0,
                water_fugacity: None,
                air_fugacity: Some(1e4),
            },
        },
    }
}

#[test]
fn roundtrip_yaml() {
    let config = config();
    validate_config(&config).unwrap();

    let path = std::env::temp_dir().join("pf_project_roundtrip.yaml");
    save_yaml(&path, &config).unwrap();
    let loaded = load_yaml(&path).unwrap();

    assert_eq!(config, loaded);
}

#[test]
fn roundtrip_json() {
    let config = config();
    let path = std::env::temp_dir().join("pf_project_roundtrip.json");
    save_json(&path, &config).unwrap();
    let loaded = load_json(&path).unwrap();

    assert_eq!(config, loaded);
}

#[test]
fn defaults_fill_omitted_sections() {
    let yaml = r#"
version: 1
name: minimal
time: { t_end: 10.0, dt_initial: 1.0, min_dt: 0.1 }
domain: { length: 1.0, cells: 4, porosity: 0.3, permeability: 1.0e-12 }
fluid: { temperature: 293.15 }
initial: { pressure: 1.0e5, gas_saturation: 0.1 }
"#;
    let config: SimulationConfig = serde_yaml::from_str(yaml).unwrap();
    validate_config(&config).unwrap();

    assert_eq!(config.newton, NewtonDef::default());
    assert_eq!(config.newton.rel_tolerance, 1e-7);
    assert_eq!(config.newton.target_steps, 9);
    assert_eq!(config.newton.max_steps, 18);
    assert_eq!(config.time.record_every, 1);
    assert_eq!(config.domain.area, 1.0);
    assert!(!config.fluid.enable_energy);
    assert_eq!(config.boundaries.left, BoundaryDef::NoFlow);
}

#[test]
fn invalid_file_is_rejected_on_load() {
    let mut config = config();
    config.domain.cells = 0;
    let path = std::env::temp_dir().join("pf_project_invalid.yaml");
    std::fs::write(&path, serde_yaml::to_string(&config).unwrap()).unwrap();

    assert!(matches!(load_yaml(&path), Err(ConfigError::Validation(_))));
    assert!(save_yaml(&path, &config).is_err());
}
