//! # ti3d_eigen
//!
//! Reads a k-point path, diagonalizes the selected k·p model at every point
//! and writes the band energies.
//!
//! ```text
//! ti3d_eigen 4band KPOINTS BAND.dat --jobs 8
//! ti3d_eigen mnk12 KPOINTS states.txt --layers 12 --format full
//! ```
//!
//! Exit status: 0 on success, 2 for bad arguments or input files (including
//! an unknown model), 1 when the computation or the output fails.

mod cli;
mod report;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;

use cli::Cli;
use report::Reporter;
use ti3d_eigen::io::write_records;
use ti3d_eigen::kpoints::read_kpoints;
use ti3d_eigen::{
    Hamiltonian, HermitianEigensolver, KpError, KpHamiltonian, ModelKind, ModelParams,
    SolverBackend, SweepOptions, sweep_with,
};

/// Marks failures while writing the results, which are not input errors even
/// when they surface as I/O errors.
#[derive(Debug, thiserror::Error)]
#[error("Failed to write {}", .0.display())]
struct OutputFailure(PathBuf);

fn main() -> ExitCode {
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    let cli = Cli::parse();
    let reporter = Reporter::new(cli.quiet);

    match run(&cli, &reporter) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report::print_error(&format!("{:#}", e));
            let input_error = e.downcast_ref::<OutputFailure>().is_none()
                && e
                    .downcast_ref::<KpError>()
                    .is_some_and(KpError::is_input_error);
            ExitCode::from(if input_error { 2 } else { 1 })
        }
    }
}

fn run(cli: &Cli, reporter: &Reporter) -> Result<()> {
    let kind: ModelKind = cli.model.parse()?;
    let backend: SolverBackend = cli.backend.parse()?;

    let mut params = load_params(kind, cli.params.as_deref(), reporter)?;
    if let Some(layers) = cli.layers {
        if kind == ModelKind::Mnk12 {
            params.mnk12.num_layers = layers;
        } else {
            reporter.warning(&format!("--layers only applies to mnk12, ignored for {}", kind));
        }
    }
    let model = Hamiltonian::from_kind(kind, &params)?;

    let mut kpoints = read_kpoints(&cli.kpoints)
        .with_context(|| format!("Failed to read k-points from {}", cli.kpoints.display()))?;
    if cli.k_scale != 1.0 {
        for k in kpoints.iter_mut() {
            *k = k.scaled(cli.k_scale);
        }
    }

    let options = SweepOptions {
        jobs: cli.jobs,
        solver: HermitianEigensolver {
            tolerance: cli.tolerance,
            max_sweeps: cli.max_sweeps,
            backend,
        },
    };
    reporter.info(&format!(
        "Model {} ({} bands), {} k-points, {} threads, {} solver",
        kind,
        model.dim(),
        kpoints.len(),
        options.threads(),
        backend
    ));

    let pb = reporter.progress_bar(kpoints.len() as u64, "Diagonalizing");
    let records = sweep_with(&model, &kpoints, &options, || pb.inc(1));
    pb.finish_and_clear();
    let records = records?;

    write_records(&cli.output, &records, cli.format.into(), model.layer_dim())
        .with_context(|| OutputFailure(cli.output.clone()))?;
    reporter.success(&format!(
        "Wrote {} k-points to {}",
        records.len(),
        cli.output.display()
    ));
    Ok(())
}

/// An explicit `--params` file, else `./<model>.json` when it exists, else
/// the built-in parameters. 8band has none, which fails when the model is
/// resolved.
fn load_params(kind: ModelKind, explicit: Option<&Path>, reporter: &Reporter) -> Result<ModelParams> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => {
            let default = PathBuf::from(ModelParams::default_file_name(kind));
            if !default.is_file() {
                if kind != ModelKind::EightBand {
                    reporter.info(&format!("Using built-in {} parameters", kind));
                }
                return Ok(ModelParams::default());
            }
            default
        }
    };
    reporter.info(&format!("Loading parameters from {}", path.display()));
    let params = ModelParams::load(kind, &path)
        .with_context(|| format!("Failed to load parameters from {}", path.display()))?;
    Ok(params)
}
