//! src/error.rs
//! Custom error types for the band-structure pipeline.
//! Every fallible operation in the library returns [`Result`], so the
//! binary decides how a failure is reported and which exit code it maps to.

use thiserror::Error;

use crate::kpoints::ReciprocalVector;

/// The primary error type for all fallible operations in this library.
#[derive(Error, Debug)]
pub enum KpError {
    // --- Model selection ---
    #[error("Unknown model '{0}': expected one of 8band, 4band, mnk12")]
    UnknownModel(String),

    #[error("Invalid layer count {0} for the mnk12 model: must be at least 1")]
    InvalidLayerCount(usize),

    #[error("The {0} model has no built-in parameters: pass --params or provide ./{0}.json")]
    MissingParameters(String),

    // --- Input validation ---
    #[error("Invalid k-point #{index} {k}: all components must be finite")]
    InvalidKPoint { index: usize, k: ReciprocalVector },

    // --- Linear algebra and numerical errors ---
    #[error("Hamiltonian is not Hermitian: |H[{row}][{col}] - conj(H[{col}][{row}])| = {deviation:e}")]
    NonHermitianInput {
        row: usize,
        col: usize,
        deviation: f64,
    },

    /// `unconverged` is set by the LAPACK backend, which reports how many
    /// off-diagonal elements were left instead of a norm.
    #[error("Eigensolver did not converge: {}", convergence_detail(.sweeps, .off_norm, .unconverged))]
    ConvergenceFailure {
        sweeps: usize,
        off_norm: f64,
        unconverged: Option<usize>,
    },

    #[error("Dimension mismatch for '{context}': expected {expected}, got {found}")]
    DimensionMismatch {
        context: String,
        expected: usize,
        found: usize,
    },

    #[error("Linear algebra operation failed")]
    Linalg(#[source] ndarray_linalg::error::LinalgError),

    #[error("Unknown eigensolver backend '{0}'")]
    UnknownBackend(String),

    // --- Context wrapper for per-point failures ---
    #[error("k-point #{index} {k}")]
    AtKPoint {
        index: usize,
        k: ReciprocalVector,
        #[source]
        source: Box<KpError>,
    },

    // --- Scheduling ---
    #[error("Failed to build the worker pool")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    // --- I/O and parsing errors ---
    #[error("I/O error")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse data from file '{file}': {message}")]
    FileParse { file: String, message: String },

    #[error("Invalid parameter file '{file}'")]
    ParameterFile {
        file: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to serialize results")]
    Serialize(#[from] serde_json::Error),
}

impl KpError {
    /// The error with any [`KpError::AtKPoint`] context stripped off.
    pub fn root(&self) -> &KpError {
        match self {
            KpError::AtKPoint { source, .. } => source.root(),
            other => other,
        }
    }

    /// Whether the failure comes from the caller's input (model name, k-point
    /// list, files) rather than from the computation itself.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self.root(),
            KpError::UnknownModel(_)
                | KpError::InvalidLayerCount(_)
                | KpError::MissingParameters(_)
                | KpError::InvalidKPoint { .. }
                | KpError::UnknownBackend(_)
                | KpError::FileParse { .. }
                | KpError::ParameterFile { .. }
                | KpError::Io(_)
        )
    }
}

fn convergence_detail(sweeps: &usize, off_norm: &f64, unconverged: &Option<usize>) -> String {
    match *unconverged {
        Some(n) => format!("{} off-diagonal elements of the tridiagonal form left", n),
        None => format!("off-diagonal norm {:e} after {} sweeps", off_norm, sweeps),
    }
}

/// A specialized `Result` type for this library's operations.
pub type Result<T> = std::result::Result<T, KpError>;
