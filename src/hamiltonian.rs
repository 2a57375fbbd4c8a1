//! The Hermitian Hamiltonian matrix type and the builder trait shared by the
//! k·p models.
use ndarray::{Array2, ArrayView2};
use num_complex::Complex64;

use crate::error::{KpError, Result};
use crate::kpoints::ReciprocalVector;
use crate::math::hermitian_deviation;

/// Tolerance on $|H_{ij}-\overline{H_{ji}}|$, relative to the largest element.
pub const HERMITIAN_TOLERANCE: f64 = 1e-12;

/// A Hermitian matrix $H(\bm k)$.
///
/// The only constructor mirrors the upper triangle onto the lower one, so
/// $H_{ij}=\overline{H_{ji}}$ holds exactly and the diagonal is real. There is
/// no mutable access after construction.
#[derive(Debug, Clone, PartialEq)]
pub struct HamiltonianMatrix {
    ham: Array2<Complex64>,
}

impl HamiltonianMatrix {
    /// Builds $H=U+U^\dagger-\mathrm{diag}(U)$ from the upper triangle of
    /// `upper`. Entries below the diagonal are ignored and the imaginary part
    /// of the diagonal is dropped.
    pub fn from_upper(upper: Array2<Complex64>) -> Result<Self> {
        let n = upper.nrows();
        if upper.ncols() != n {
            return Err(KpError::DimensionMismatch {
                context: "Hamiltonian columns".into(),
                expected: n,
                found: upper.ncols(),
            });
        }
        Ok(Self {
            ham: mirror_upper(upper),
        })
    }

    #[inline(always)]
    pub fn dim(&self) -> usize {
        self.ham.nrows()
    }

    #[inline(always)]
    pub fn view(&self) -> ArrayView2<'_, Complex64> {
        self.ham.view()
    }
}

/// Fails with [`KpError::NonHermitianInput`] when some element pair breaks
/// $H_{ij}=\overline{H_{ji}}$ by more than [`HERMITIAN_TOLERANCE`].
pub fn check_hermitian(ham: &ArrayView2<'_, Complex64>) -> Result<()> {
    if ham.nrows() != ham.ncols() {
        return Err(KpError::DimensionMismatch {
            context: "Hamiltonian columns".into(),
            expected: ham.nrows(),
            found: ham.ncols(),
        });
    }
    let scale = ham.iter().fold(1.0_f64, |m, x| m.max(x.norm()));
    let (deviation, row, col) = hermitian_deviation(ham);
    if deviation > HERMITIAN_TOLERANCE * scale || deviation.is_nan() {
        return Err(KpError::NonHermitianInput {
            row,
            col,
            deviation,
        });
    }
    Ok(())
}

/// A k·p model: a fixed dimension and a pure map $\bm k\mapsto H(\bm k)$.
pub trait KpHamiltonian {
    /// Number of bands, i.e. the matrix dimension.
    fn dim(&self) -> usize;

    /// Upper triangle (diagonal included) of $H(\bm k)$; the lower triangle
    /// is ignored by [`KpHamiltonian::build`].
    fn upper(&self, k: &ReciprocalVector) -> Array2<Complex64>;

    fn build(&self, k: &ReciprocalVector) -> HamiltonianMatrix {
        let upper = self.upper(k);
        debug_assert_eq!(upper.dim(), (self.dim(), self.dim()));
        HamiltonianMatrix {
            ham: mirror_upper(upper),
        }
    }
}

fn mirror_upper(mut ham: Array2<Complex64>) -> Array2<Complex64> {
    let n = ham.nrows();
    for i in 0..n {
        ham[[i, i]].im = 0.0;
        for j in (i + 1)..n {
            ham[[j, i]] = ham[[i, j]].conj();
        }
    }
    ham
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::arr2;

    #[test]
    fn from_upper_mirrors_and_drops_lower() {
        let c = |re, im| Complex64::new(re, im);
        let upper = arr2(&[[c(1.0, 0.3), c(2.0, -1.0)], [c(9.0, 9.0), c(-1.0, 0.0)]]);
        let h = HamiltonianMatrix::from_upper(upper).unwrap();
        assert_eq!(h.view()[[1, 0]], c(2.0, 1.0));
        assert_eq!(h.view()[[0, 0]], c(1.0, 0.0));
        assert_eq!(h.view().diag().sum(), c(0.0, 0.0));
        assert!(check_hermitian(&h.view()).is_ok());
    }

    #[test]
    fn asymmetric_input_is_rejected() {
        let c = |re, im| Complex64::new(re, im);
        let full = arr2(&[[c(1.0, 0.0), c(2.0, 0.0)], [c(2.5, 0.0), c(0.0, 0.0)]]);
        match check_hermitian(&full.view()) {
            Err(KpError::NonHermitianInput { row, col, .. }) => assert_eq!((row, col), (0, 1)),
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn non_square_is_a_dimension_mismatch() {
        let upper = Array2::<Complex64>::zeros((2, 3));
        assert!(matches!(
            HamiltonianMatrix::from_upper(upper),
            Err(KpError::DimensionMismatch { .. })
        ));
    }
}
