//! LAPACK backend of the eigensolver: `zheev` through ndarray-linalg, with the
//! BLAS/LAPACK library picked by the `intel-mkl-*`, `openblas-*` or
//! `netlib-*` features.
#[cfg(any(feature = "intel-mkl-system", feature = "intel-mkl-static"))]
extern crate intel_mkl_src as _src;

#[cfg(any(feature = "openblas-system", feature = "openblas-static"))]
extern crate openblas_src as _src;

#[cfg(any(feature = "netlib-system", feature = "netlib-static"))]
extern crate netlib_src as _src;

use ndarray::{Array1, Array2};
use ndarray_linalg::error::LinalgError;
use ndarray_linalg::{Eigh, UPLO};
use num_complex::Complex64;

use crate::error::{KpError, Result};
use crate::hamiltonian::HamiltonianMatrix;

/// Eigenvalues (ascending) and eigenvectors as columns, reading only the
/// upper triangle of `ham`.
pub fn eigh_upper(ham: &HamiltonianMatrix) -> Result<(Array1<f64>, Array2<Complex64>)> {
    ham.view().eigh(UPLO::Upper).map_err(lapack_error)
}

/// `info > 0` from `zheev` means the tridiagonal QL/QR iteration ran out of
/// steps with `info` off-diagonal elements left; that is a convergence
/// failure, anything else is a call error.
fn lapack_error(err: LinalgError) -> KpError {
    match err {
        LinalgError::Lapack(lax::error::Error::LapackComputationalFailure { return_code }) => {
            KpError::ConvergenceFailure {
                sweeps: 0,
                off_norm: f64::NAN,
                unconverged: Some(return_code.max(0) as usize),
            }
        }
        other => KpError::Linalg(other),
    }
}
