//! Dense Hermitian eigensolver.
//!
//! The default backend is LAPACK `zheev` through ndarray-linalg
//! ([`crate::ndarray_lapack`]). The cyclic complex Jacobi method is available
//! on request: every rotation $U^\dagger HU$ annihilates one off-diagonal
//! pair $H_{pq}$, and sweeps over all pairs repeat until
//! $$\mathrm{off}(H)=\Big(\sum_{i\ne j}|H_{ij}|^2\Big)^{1/2}\le\mathrm{tol}\,\|H\|_F.$$
//! The accumulated rotations are the eigenvectors. Jacobi is slower (cubic
//! per sweep, with several sweeps) but bit-reproducible whatever BLAS is
//! linked.
use std::fmt;
use std::str::FromStr;

use ndarray::{Array1, Array2, Axis};
use num_complex::Complex64;
use serde::Serialize;

use crate::error::{KpError, Result};
use crate::hamiltonian::{HamiltonianMatrix, check_hermitian};
use crate::math::frobenius_norm;
use crate::ndarray_lapack::eigh_upper;

/// Eigenvalues in ascending order; row `i` of `eigenvectors` is the unit
/// vector $v_i$ with $Hv_i=\lambda_iv_i$.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EigenResult {
    pub eigenvalues: Array1<f64>,
    pub eigenvectors: Array2<Complex64>,
}

impl EigenResult {
    pub fn nband(&self) -> usize {
        self.eigenvalues.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SolverBackend {
    #[default]
    Lapack,
    Jacobi,
}

impl FromStr for SolverBackend {
    type Err = KpError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "lapack" => Ok(SolverBackend::Lapack),
            "jacobi" => Ok(SolverBackend::Jacobi),
            _ => Err(KpError::UnknownBackend(s.to_string())),
        }
    }
}

impl fmt::Display for SolverBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolverBackend::Lapack => f.write_str("lapack"),
            SolverBackend::Jacobi => f.write_str("jacobi"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HermitianEigensolver {
    /// Jacobi only: convergence threshold on $\mathrm{off}(H)/\|H\|_F$.
    pub tolerance: f64,
    /// Jacobi only: number of full sweeps before giving up.
    pub max_sweeps: usize,
    pub backend: SolverBackend,
}

impl Default for HermitianEigensolver {
    fn default() -> Self {
        HermitianEigensolver {
            tolerance: 1e-13,
            max_sweeps: 100,
            backend: SolverBackend::Lapack,
        }
    }
}

impl HermitianEigensolver {
    pub fn jacobi() -> Self {
        HermitianEigensolver {
            backend: SolverBackend::Jacobi,
            ..HermitianEigensolver::default()
        }
    }
}

impl HermitianEigensolver {
    pub fn decompose(&self, ham: &HamiltonianMatrix) -> Result<EigenResult> {
        check_hermitian(&ham.view())?;
        let (eval, evec) = match self.backend {
            SolverBackend::Lapack => eigh_upper(ham)?,
            SolverBackend::Jacobi => jacobi(ham.view().to_owned(), self.tolerance, self.max_sweeps)?,
        };
        Ok(sorted(eval, evec))
    }
}

/// $\mathrm{off}(A)$
fn off_norm(a: &Array2<Complex64>) -> f64 {
    let mut s = 0.0;
    for ((i, j), x) in a.indexed_iter() {
        if i != j {
            s += x.norm_sqr();
        }
    }
    s.sqrt()
}

/// Cyclic Jacobi on a Hermitian matrix. Returns the unsorted eigenvalues and
/// the eigenvectors as columns.
fn jacobi(
    mut a: Array2<Complex64>,
    tolerance: f64,
    max_sweeps: usize,
) -> Result<(Array1<f64>, Array2<Complex64>)> {
    let n = a.nrows();
    let mut v = Array2::<Complex64>::eye(n);
    let norm = frobenius_norm(&a);
    if !norm.is_finite() {
        return Err(KpError::ConvergenceFailure {
            sweeps: 0,
            off_norm: f64::NAN,
            unconverged: None,
        });
    }
    let mut sweep = 0;
    loop {
        let off = off_norm(&a);
        if off <= tolerance * norm {
            break;
        }
        if sweep == max_sweeps || !off.is_finite() {
            return Err(KpError::ConvergenceFailure {
                sweeps: sweep,
                off_norm: off,
                unconverged: None,
            });
        }
        for p in 0..n {
            for q in (p + 1)..n {
                rotate(&mut a, &mut v, p, q);
            }
        }
        sweep += 1;
    }
    let eval = a.diag().mapv(|x| x.re);
    Ok((eval, v))
}

/// Applies $A\leftarrow U^\dagger AU$, $V\leftarrow VU$ with the unitary $U$
/// that zeroes $A_{pq}$. With $A_{pq}=re^{i\phi}$, $U$ is the phase
/// $\mathrm{diag}(1,e^{-i\phi})$ followed by the real rotation that
/// diagonalizes $\begin{pmatrix}A_{pp}&r\\\\r&A_{qq}\end{pmatrix}$.
fn rotate(a: &mut Array2<Complex64>, v: &mut Array2<Complex64>, p: usize, q: usize) {
    let apq = a[[p, q]];
    let r = apq.norm();
    if r == 0.0 {
        return;
    }
    let phase = (apq / r).conj();
    let theta = (a[[q, q]].re - a[[p, p]].re) / (2.0 * r);
    let t = if theta.abs() > 1e150 {
        0.5 / theta
    } else {
        theta.signum() / (theta.abs() + (theta * theta + 1.0).sqrt())
    };
    let c = 1.0 / (t * t + 1.0).sqrt();
    let s = t * c;
    let u_pp = Complex64::new(c, 0.0);
    let u_pq = Complex64::new(s, 0.0);
    let u_qp = phase * (-s);
    let u_qq = phase * c;

    let n = a.nrows();
    for k in 0..n {
        let akp = a[[k, p]];
        let akq = a[[k, q]];
        a[[k, p]] = akp * u_pp + akq * u_qp;
        a[[k, q]] = akp * u_pq + akq * u_qq;
    }
    for k in 0..n {
        let apk = a[[p, k]];
        let aqk = a[[q, k]];
        a[[p, k]] = u_pp.conj() * apk + u_qp.conj() * aqk;
        a[[q, k]] = u_pq.conj() * apk + u_qq.conj() * aqk;
    }
    a[[p, q]] = Complex64::new(0.0, 0.0);
    a[[q, p]] = Complex64::new(0.0, 0.0);
    a[[p, p]].im = 0.0;
    a[[q, q]].im = 0.0;

    for k in 0..n {
        let vkp = v[[k, p]];
        let vkq = v[[k, q]];
        v[[k, p]] = vkp * u_pp + vkq * u_qp;
        v[[k, q]] = vkp * u_pq + vkq * u_qq;
    }
}

/// Orders eigenpairs by eigenvalue (stable, so ties keep the solver order)
/// and turns eigenvector columns into normalized rows.
fn sorted(eval: Array1<f64>, evec_columns: Array2<Complex64>) -> EigenResult {
    let n = eval.len();
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&i, &j| eval[[i]].total_cmp(&eval[[j]]));
    let eigenvalues = order.iter().map(|&i| eval[[i]]).collect::<Array1<f64>>();
    let norms: Vec<f64> = evec_columns
        .axis_iter(Axis(1))
        .map(|col| col.iter().map(|x| x.norm_sqr()).sum::<f64>().sqrt())
        .collect();
    let eigenvectors = Array2::from_shape_fn((n, n), |(band, k)| {
        let col = order[band];
        if norms[col] > 0.0 {
            evec_columns[[k, col]] / norms[col]
        } else {
            evec_columns[[k, col]]
        }
    });
    EigenResult {
        eigenvalues,
        eigenvectors,
    }
}

#[cfg(test)]
impl EigenResult {
    /// $\|Hv_i-\lambda_iv_i\|$
    pub(crate) fn residual(&self, ham: &HamiltonianMatrix, band: usize) -> f64 {
        let v = self.eigenvectors.row(band);
        let hv = ham.view().dot(&v);
        hv.iter()
            .zip(v.iter())
            .map(|(a, b)| (*a - *b * self.eigenvalues[[band]]).norm_sqr())
            .sum::<f64>()
            .sqrt()
    }
}
