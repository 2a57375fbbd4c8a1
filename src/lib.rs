//! Band structures of 3D topological insulators from k·p Hamiltonians.
//!
//! For every wave vector $\bm k$ of a path the selected model builds the
//! Hermitian matrix $H(\bm k)$, which is then diagonalized; the sweep over
//! all k-points runs in parallel and keeps the input order. Diagonalization
//! goes through LAPACK `zheev` by default; a built-in Jacobi solver can be
//! selected instead. Three models are available:
//!
//! - `8band`: the 8-band model of Bi2Se3-family crystals, which needs a
//!   parameter file;
//! - `4band`: the reduced 4-band model with hexagonal-warping terms;
//! - `mnk12`: a thin-film lattice model built from `numLayers` layers.
//!
//! ```no_run
//! use ti3d_eigen::{ReciprocalVector, sweep};
//!
//! let path = ti3d_eigen::kpoints::k_line(
//!     ReciprocalVector::new(-0.1, 0.0, 0.0),
//!     ReciprocalVector::new(0.1, 0.0, 0.0),
//!     201,
//! );
//! let records = sweep("4band", &path).unwrap();
//! let bands = ti3d_eigen::sweep::band_matrix(&records);
//! ```
pub mod eigensolver;
pub mod eight_band;
pub mod error;
pub mod four_band;
pub mod hamiltonian;
pub mod io;
pub mod kpoints;
pub mod math;
pub mod mnk12;
pub mod ndarray_lapack;
pub mod registry;
pub mod sweep;

pub use crate::eigensolver::{EigenResult, HermitianEigensolver, SolverBackend};
pub use crate::error::{KpError, Result};
pub use crate::hamiltonian::{HamiltonianMatrix, KpHamiltonian};
pub use crate::io::OutputFormat;
pub use crate::kpoints::ReciprocalVector;
pub use crate::registry::{Hamiltonian, ModelKind, ModelParams, resolve, resolve_with};
pub use crate::sweep::{SweepOptions, SweepRecord, sweep, sweep_with};
