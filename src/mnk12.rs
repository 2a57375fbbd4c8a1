//! Thin-film (slab) lattice model of a 3D topological insulator, stacked
//! along z in `num_layers` quintuple layers.
//!
//! Each layer carries the 4×4 block
//! $$D(\bm k)=C+d(\bm k)\Gamma_5+A(\sin k_x\Gamma_2+\sin k_y\Gamma_1),\quad
//! d(\bm k)=M-2B+2B(\cos k_x+\cos k_y-2)$$
//! and neighbouring layers are coupled by $T=B\Gamma_5-\frac{iA}{2}\Gamma_4$
//! (above the diagonal) and $T^\dagger$ (below), so $H$ is block
//! tridiagonal. k is read in units of $2\pi/a$; $k_z$ does not enter.
use std::f64::consts::PI;

use ndarray::{Array1, Array2, ArrayBase, Data, Ix1, s};
use num_complex::Complex64;
use serde::Deserialize;

use crate::error::{KpError, Result};
use crate::hamiltonian::KpHamiltonian;
use crate::kpoints::ReciprocalVector;
use crate::math::{gamma1, gamma2, gamma4, gamma5};

/// Orbitals per layer.
pub const LAYER_DIM: usize = 4;

#[allow(non_snake_case)]
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Mnk12Params {
    pub A: f64,
    pub B: f64,
    pub C: f64,
    pub M: f64,
    #[serde(alias = "numLayers")]
    pub num_layers: usize,
}

impl Default for Mnk12Params {
    /// Inverted regime $0<M<4B$.
    fn default() -> Self {
        Mnk12Params {
            A: 0.5,
            B: 0.25,
            C: 0.0,
            M: 0.3,
            num_layers: 5,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Mnk12 {
    pub params: Mnk12Params,
    g1: Array2<Complex64>,
    g2: Array2<Complex64>,
    g5: Array2<Complex64>,
    /// Interlayer hopping $T$, independent of k.
    cross: Array2<Complex64>,
}

impl Mnk12 {
    pub fn new(params: Mnk12Params) -> Result<Self> {
        if params.num_layers == 0 {
            return Err(KpError::InvalidLayerCount(params.num_layers));
        }
        let c = |x: f64| Complex64::new(x, 0.0);
        let cross = gamma5() * c(params.B) - gamma4() * Complex64::new(0.0, params.A / 2.0);
        Ok(Mnk12 {
            params,
            g1: gamma1(),
            g2: gamma2(),
            g5: gamma5(),
            cross,
        })
    }

    pub fn num_layers(&self) -> usize {
        self.params.num_layers
    }

    fn diagonal_block(&self, kx: f64, ky: f64) -> Array2<Complex64> {
        let p = &self.params;
        let c = |x: f64| Complex64::new(x, 0.0);
        let d = p.M - 2.0 * p.B + 2.0 * p.B * (kx.cos() + ky.cos() - 2.0);
        Array2::<Complex64>::eye(LAYER_DIM) * c(p.C)
            + &self.g5 * c(d)
            + (&self.g2 * c(kx.sin()) + &self.g1 * c(ky.sin())) * c(p.A)
    }
}

impl KpHamiltonian for Mnk12 {
    fn dim(&self) -> usize {
        LAYER_DIM * self.params.num_layers
    }

    fn upper(&self, k: &ReciprocalVector) -> Array2<Complex64> {
        let k = k.scaled(2.0 * PI);
        let n = self.dim();
        let diagonal = self.diagonal_block(k.kx, k.ky);
        let mut ham = Array2::<Complex64>::zeros((n, n));
        for i in (0..n).step_by(LAYER_DIM) {
            ham.slice_mut(s![i..i + LAYER_DIM, i..i + LAYER_DIM])
                .assign(&diagonal);
            if i + LAYER_DIM < n {
                ham.slice_mut(s![i..i + LAYER_DIM, i + LAYER_DIM..i + 2 * LAYER_DIM])
                    .assign(&self.cross);
            }
        }
        ham
    }
}

/// Weight $\sum_{j\in\mathrm{layer}}|c_j|^2$ of a state on each layer.
pub fn layer_weights<S: Data<Elem = Complex64>>(
    state: &ArrayBase<S, Ix1>,
    layer_dim: usize,
) -> Array1<f64> {
    state
        .exact_chunks(layer_dim)
        .into_iter()
        .map(|layer| layer.iter().map(|c| c.norm_sqr()).sum::<f64>())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hamiltonian::check_hermitian;

    fn model(num_layers: usize) -> Mnk12 {
        Mnk12::new(Mnk12Params {
            num_layers,
            ..Mnk12Params::default()
        })
        .unwrap()
    }

    #[test]
    fn block_tridiagonal() {
        let k = ReciprocalVector::new(0.05, 0.1, 0.03);
        for num_layers in 3..6 {
            let h = model(num_layers).build(&k);
            assert_eq!(h.dim(), 4 * num_layers);
            for bi in 0..num_layers {
                for bj in 0..num_layers {
                    if bi.abs_diff(bj) <= 1 {
                        continue;
                    }
                    for r in 0..LAYER_DIM {
                        for c in 0..LAYER_DIM {
                            assert_eq!(
                                h.view()[[4 * bi + r, 4 * bj + c]],
                                Complex64::new(0.0, 0.0),
                                "block ({}, {}) with {} layers",
                                bi,
                                bj,
                                num_layers
                            );
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn sub_diagonal_holds_cross_dagger() {
        let m = model(3);
        let h = m.build(&ReciprocalVector::new(0.2, -0.1, 0.0));
        assert!(check_hermitian(&h.view()).is_ok());
        let lower = h.view().slice(s![4..8, 0..4]).to_owned();
        assert_eq!(lower, m.cross.t().mapv(|x| x.conj()));
    }

    #[test]
    fn kz_does_not_enter() {
        let m = model(2);
        assert_eq!(
            m.build(&ReciprocalVector::new(0.1, 0.2, 0.0)),
            m.build(&ReciprocalVector::new(0.1, 0.2, 0.4))
        );
    }

    #[test]
    fn single_layer_is_one_diagonal_block() {
        let m = model(1);
        let k = ReciprocalVector::new(0.05, 0.1, 0.03);
        let h = m.build(&k);
        assert_eq!(h.dim(), LAYER_DIM);
        let block = m.diagonal_block(2.0 * PI * k.kx, 2.0 * PI * k.ky);
        for (x, y) in h.view().iter().zip(block.iter()) {
            assert!((x - y).norm() < 1e-15, "{} vs {}", x, y);
        }

        let res = crate::eigensolver::HermitianEigensolver::default()
            .decompose(&h)
            .unwrap();
        for state in res.eigenvectors.outer_iter() {
            let w = layer_weights(&state, LAYER_DIM);
            assert_eq!(w.len(), 1);
            assert!((w[[0]] - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn zero_layers_rejected() {
        assert!(matches!(
            Mnk12::new(Mnk12Params {
                num_layers: 0,
                ..Mnk12Params::default()
            }),
            Err(KpError::InvalidLayerCount(0))
        ));
    }

    #[test]
    fn layer_weights_sum_to_norm() {
        let state = Array1::from_vec(
            (0..8)
                .map(|i| Complex64::new(i as f64, 1.0))
                .collect::<Vec<_>>(),
        );
        let w = layer_weights(&state, LAYER_DIM);
        assert_eq!(w.len(), 2);
        assert_eq!(w[[0]], 0.0 + 1.0 + 1.0 + 4.0 + 1.0 + 9.0 + 1.0 + 1.0);
        let total: f64 = state.iter().map(|c| c.norm_sqr()).sum();
        assert!((w.sum() - total).abs() < 1e-12);
    }
}
