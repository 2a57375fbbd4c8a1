//! Command-line arguments of the `ti3d_eigen` binary.
use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use ti3d_eigen::OutputFormat;

/// Band structure of a 3D topological insulator along a k-point path
#[derive(Parser, Debug)]
#[command(name = "ti3d_eigen")]
#[command(version)]
#[command(about = "Diagonalize k·p Hamiltonians of 3D topological insulators over a list of k-points", long_about = None)]
pub struct Cli {
    /// Model identifier: 8band, 4band or mnk12
    pub model: String,

    /// K-point file: VASP line-mode KPOINTS or one `kx ky kz` per line
    pub kpoints: PathBuf,

    /// Output file
    pub output: PathBuf,

    /// JSON parameter file (default: ./<model>.json when present)
    #[arg(short, long, env = "TI3D_PARAMS")]
    pub params: Option<PathBuf>,

    /// Number of layers of the mnk12 slab, overriding the parameter file
    #[arg(long)]
    pub layers: Option<usize>,

    /// Worker threads (0 = all cores)
    #[arg(short, long, default_value_t = 0)]
    pub jobs: usize,

    /// Output layout
    #[arg(short, long, value_enum, default_value_t = Format::Bands)]
    pub format: Format,

    /// Factor applied to every k-point component after reading
    #[arg(long, default_value_t = 1.0)]
    pub k_scale: f64,

    /// Relative off-diagonal norm at which the Jacobi solver stops
    #[arg(long, default_value_t = 1e-13)]
    pub tolerance: f64,

    /// Maximum number of Jacobi sweeps per k-point
    #[arg(long, default_value_t = 100)]
    pub max_sweeps: usize,

    /// Eigensolver backend: lapack (zheev) or jacobi
    #[arg(long, default_value = "lapack")]
    pub backend: String,

    /// Suppress status messages and the progress bar
    #[arg(short, long)]
    pub quiet: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum Format {
    /// k distance, k and eigenvalues per row
    Bands,
    /// eigenvalues, eigenvectors and layer weights per k-point
    Full,
    /// JSON array of records
    Json,
}

impl From<Format> for OutputFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Bands => OutputFormat::Bands,
            Format::Full => OutputFormat::Full,
            Format::Json => OutputFormat::Json,
        }
    }
}
