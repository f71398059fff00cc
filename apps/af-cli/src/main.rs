use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use tracing::info;

use af_io::{Model, load_model, write_steady, write_transient};
use af_sim::{TransientConfig, TransientSimulation};
use af_solver::{Solver, SolverMethod};

#[derive(Parser)]
#[command(name = "af-cli")]
#[command(about = "Multizone airflow and contaminant transport engine", long_about = None)]
struct Cli {
    /// Input JSON model file
    #[arg(short, long)]
    input: PathBuf,

    /// Output results JSON file
    #[arg(short, long)]
    output: PathBuf,

    /// Solver method
    #[arg(short, long, value_enum, default_value_t = Method::Tr)]
    method: Method,

    /// Verbose output with progress reporting
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Method {
    /// Sub-relaxation updates
    Sur,
    /// Trust-region updates (default)
    Tr,
}

impl From<Method> for SolverMethod {
    fn from(method: Method) -> Self {
        match method {
            Method::Sur => SolverMethod::SubRelaxation,
            Method::Tr => SolverMethod::TrustRegion,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.verbose {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::WARN)
            .init();
    }

    match run(&cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::from(1)
        }
    }
}

fn run(cli: &Cli) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let mut model = load_model(&cli.input)?;

    info!(
        nodes = model.network.node_count(),
        links = model.network.link_count(),
        unknowns = model.network.unknown_count(),
        species = model.species.len(),
        "model loaded"
    );

    // Transient mode is auto-detected from the species/transient sections
    if model.is_transient() {
        run_transient(cli, &mut model)
    } else {
        run_steady(cli, &mut model)
    }
}

fn run_steady(cli: &Cli, model: &mut Model) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let solver = Solver::new(cli.method.into());
    let result = solver.solve(&mut model.network)?;

    if cli.verbose {
        println!(
            "{} in {} iterations (max residual {:.3e} kg/s)",
            if result.converged {
                "Converged"
            } else {
                "Did not converge"
            },
            result.iterations,
            result.max_residual
        );
    }

    let response = write_steady(&model.network, &result)?;
    std::fs::write(&cli.output, response)?;

    if cli.verbose {
        println!("Results written to {}", cli.output.display());
    }

    Ok(ExitCode::SUCCESS)
}

fn run_transient(cli: &Cli, model: &mut Model) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let mut config = model
        .transient
        .clone()
        .unwrap_or(TransientConfig::default());
    config.method = cli.method.into();

    if cli.verbose {
        println!(
            "Running transient simulation: {}s to {}s (dt={}s)",
            config.start_time, config.end_time, config.time_step
        );
    }

    let mut sim = TransientSimulation::new(config);
    sim.set_species(model.species.clone());
    sim.set_sources(model.sources.clone());
    sim.set_schedules(model.schedules.clone());

    if cli.verbose {
        sim.set_progress_callback(|t, end| {
            print!("\r  t={t:.0}/{end:.0}s");
            std::io::stdout().flush().ok();
            true
        });
    }

    let result = sim.run(&mut model.network)?;

    if cli.verbose {
        println!(
            "\n{} ({} output steps)",
            if result.completed {
                "Completed"
            } else {
                "Incomplete"
            },
            result.history.len()
        );
    }

    let completed = result.completed;
    let response = write_transient(&model.network, &result, &model.species)?;
    std::fs::write(&cli.output, response)?;

    if cli.verbose {
        println!("Results written to {}", cli.output.display());
    }

    Ok(if completed {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(2)
    })
}
