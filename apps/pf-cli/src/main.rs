use clap::{Parser, Subcommand};
use pf_fluids::FluidSystem;
use pf_model::{Isothermal, Thermal};
use pf_project::SimulationConfig;
use pf_sim::{SimProgress, SimRecord};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::info;

mod setup;

#[derive(thiserror::Error, Debug)]
enum CliError {
    #[error(transparent)]
    Config(#[from] pf_project::ConfigError),

    #[error(transparent)]
    Sim(#[from] pf_sim::SimError),

    #[error(transparent)]
    Model(#[from] pf_model::ModelError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

type CliResult<T> = Result<T, CliError>;

#[derive(Parser)]
#[command(name = "pf-cli")]
#[command(about = "phaseflow CLI - Compositional two-phase porous media simulation", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a simulation config file
    Validate {
        /// Path to the config YAML file
        config_path: PathBuf,
    },
    /// Run a transient simulation
    Run {
        /// Path to the config YAML file
        config_path: PathBuf,
        /// Output CSV file for the recorded time series (optional)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> CliResult<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { config_path } => cmd_validate(&config_path),
        Commands::Run { config_path, output } => cmd_run(&config_path, output.as_deref()),
    }
}

fn cmd_validate(config_path: &Path) -> CliResult<()> {
    println!("Validating config: {}", config_path.display());
    let config = pf_project::load_yaml(config_path)?;
    println!("✓ Config is valid: {}", config.name);
    Ok(())
}

fn cmd_run(config_path: &Path, output: Option<&Path>) -> CliResult<()> {
    let config = pf_project::load_yaml(config_path)?;
    println!("Running simulation: {}", config.name);
    println!(
        "  cells = {}, dt = {:.3} s, t_end = {:.3} s, energy = {}",
        config.domain.cells, config.time.dt_initial, config.time.t_end, config.fluid.enable_energy
    );

    let started = Instant::now();
    let mut last_emit = Instant::now();
    let mut last_fraction = -1.0f64;
    let mut on_progress = |p: SimProgress| {
        let emit_now = (p.fraction_complete - last_fraction).abs() >= 0.005 || last_emit.elapsed().as_millis() >= 100;
        if emit_now {
            render_cli_progress(&p, started.elapsed().as_secs_f64());
            last_fraction = p.fraction_complete;
            last_emit = Instant::now();
        }
    };

    let record = if config.fluid.enable_energy {
        setup::simulate::<Thermal>(&config, Some(&mut on_progress))?
    } else {
        setup::simulate::<Isothermal>(&config, Some(&mut on_progress))?
    };
    clear_progress_line();
    info!(
        steps = record.steps,
        cutback_retries = record.cutback_retries,
        phase_changes = record.phase_changes.len(),
        "simulation finished"
    );

    println!("✓ Simulation completed in {:.3}s", started.elapsed().as_secs_f64());
    print_summary(&config, &record)?;

    if let Some(path) = output {
        std::fs::write(path, series_csv(&config, &record)?)?;
        println!("✓ Exported {} time points to {}", record.t.len(), path.display());
    }
    Ok(())
}

fn clear_progress_line() {
    print!("\r{}\r", " ".repeat(120));
    let _ = io::stdout().flush();
}

fn render_cli_progress(p: &SimProgress, elapsed_s: f64) {
    let width = 28usize;
    let filled = ((p.fraction_complete * width as f64).round() as usize).min(width);
    let bar = format!("{}{}", "#".repeat(filled), "-".repeat(width.saturating_sub(filled)));
    print!(
        "\r[{}] {:>6.2}%  t={:.3}/{:.3}s  step={}  dt={:.3e}s  cutbacks={}  elapsed={:.1}s",
        bar,
        p.fraction_complete * 100.0,
        p.sim_time,
        p.t_end,
        p.step,
        p.dt,
        p.cutback_retries,
        elapsed_s
    );
    let _ = io::stdout().flush();
}

fn print_summary(config: &SimulationConfig, record: &SimRecord) -> CliResult<()> {
    let fluid = setup::build_problem(config)?.fluid().clone();

    println!("\nRun summary:");
    println!("  Accepted steps:  {}", record.steps);
    println!("  Cutback retries: {}", record.cutback_retries);
    println!("  Time points:     {}", record.t.len());
    if let Some(max_iter) = record.iterations.iter().max() {
        println!("  Max Newton iterations per step: {}", max_iter);
    }

    if let Some(inventory) = record.phase_inventory.last() {
        println!("\nFinal inventory [mol]:");
        for (phase, amounts) in inventory.iter().enumerate() {
            for comp in 0..fluid.num_components() {
                println!(
                    "  {:<7} {:<6} {:.6e}",
                    fluid.phase_name(phase),
                    fluid.component_name(comp),
                    amounts[comp]
                );
            }
        }
    }

    if !record.phase_changes.is_empty() {
        println!("\nPhase changes: {}", record.phase_changes.len());
        for change in record.phase_changes.iter().take(10) {
            println!(
                "  t={:.3}s  dof={}  {} {}",
                change.t,
                change.dof,
                fluid.phase_name(change.phase),
                if change.appeared { "appeared" } else { "vanished" }
            );
        }
    }
    Ok(())
}

/// Time, step data and per-phase inventories, one row per recorded time point.
fn series_csv(config: &SimulationConfig, record: &SimRecord) -> CliResult<String> {
    let fluid = setup::build_problem(config)?.fluid().clone();

    let mut csv = String::from("time_s,dt_s,iterations");
    for phase in 0..fluid.num_phases() {
        for comp in 0..fluid.num_components() {
            csv.push_str(&format!(",{}_{}_mol", fluid.phase_name(phase), fluid.component_name(comp)));
        }
    }
    csv.push('\n');

    for (i, t) in record.t.iter().enumerate() {
        csv.push_str(&format!("{},{},{}", t, record.dt[i], record.iterations[i]));
        for amounts in &record.phase_inventory[i] {
            for comp in 0..fluid.num_components() {
                csv.push_str(&format!(",{}", amounts[comp]));
            }
        }
        csv.push('\n');
    }
    Ok(csv)
}
