//! The 8-band k·p Hamiltonian of Liu et al., PRB 82, 045122 (2010).
//!
//! The basis is four Kramers pairs $\ket{\Lambda_{1,2}},\ket{\Lambda_{3,4}},
//! \ket{\Lambda_{5,6}},\ket{\Lambda_{7,8}}$. Each pair has the diagonal
//! dispersion $E_i+F_ik_z^2+K_ik_\parallel^2$, the first pair couples linearly
//! to the others through $P_i$ and $Q_i$, and the remaining pairs couple
//! through $g(\bm k,U,V)=Uk_zk_++Vk_-^2$ with $k_\pm=k_x\pm ik_y$.
//! Factors of $\hbar^2/2m$ and $2/\hbar$ are absorbed into the parameters.
use ndarray::Array2;
use num_complex::Complex64;
use serde::Deserialize;

use crate::hamiltonian::KpHamiltonian;
use crate::kpoints::ReciprocalVector;

/// Parameters in eV, eV·Å and eV·Å². Complex couplings are split into
/// `re`/`im` keys as in the parameter files.
///
/// There are no built-in values: every coupling must come from the
/// parameter file, and unknown keys are rejected. The band edges default to
/// zero, which measures every pair from its own edge.
#[allow(non_snake_case)]
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EightBandParams {
    /// Band-edge energy of each Kramers pair at $\Gamma$.
    #[serde(default)]
    pub E1: f64,
    #[serde(default)]
    pub E3: f64,
    #[serde(default)]
    pub E5: f64,
    #[serde(default)]
    pub E7: f64,
    pub F1: f64,
    pub K1: f64,
    pub F3: f64,
    pub K3: f64,
    pub F5: f64,
    pub K5: f64,
    pub F7: f64,
    pub K7: f64,
    pub P1: f64,
    pub P2: f64,
    pub P3: f64,
    pub Q1: f64,
    pub Q2: f64,
    pub Q3: f64,
    pub U35re: f64,
    pub U35im: f64,
    pub V35re: f64,
    pub V35im: f64,
    pub F37: f64,
    pub K37: f64,
    pub U47: f64,
    pub V47im: f64,
    pub U58re: f64,
    pub U58im: f64,
    pub V58re: f64,
    pub V58im: f64,
}

/// Synthetic couplings of realistic magnitude for exercising the model in
/// tests; not a material.
#[cfg(test)]
pub(crate) fn sample_params() -> EightBandParams {
    EightBandParams {
        E1: -0.28,
        E3: 0.30,
        E5: -1.05,
        E7: 1.12,
        F1: 1.62,
        K1: 18.7,
        F3: -2.38,
        K3: -22.5,
        F5: 3.04,
        K5: 9.80,
        F7: -1.10,
        K7: -14.2,
        P1: 2.23,
        P2: 3.14,
        P3: 1.04,
        Q1: 2.05,
        Q2: 1.52,
        Q3: 0.71,
        U35re: 1.36,
        U35im: 0.27,
        V35re: 8.42,
        V35im: -1.13,
        F37: 0.92,
        K37: 4.31,
        U47: 1.18,
        V47im: 6.05,
        U58re: -0.84,
        U58im: 0.49,
        V58re: 5.26,
        V58im: 2.07,
    }
}

#[derive(Debug, Clone)]
pub struct EightBand {
    pub params: EightBandParams,
}

impl EightBand {
    pub fn new(params: EightBandParams) -> Self {
        EightBand { params }
    }
}

/// $Fk_z^2+Kk_\parallel^2$
#[allow(non_snake_case)]
#[inline(always)]
fn f(k: &ReciprocalVector, F: f64, K: f64) -> f64 {
    F * k.kz * k.kz + K * k.k_par2()
}

/// $Uk_zk_++Vk_-^2$, even in $\bm k$.
#[allow(non_snake_case)]
#[inline(always)]
fn g(k: &ReciprocalVector, U: Complex64, V: Complex64) -> Complex64 {
    let k_plus = Complex64::new(k.kx, k.ky);
    let k_minus = Complex64::new(k.kx, -k.ky);
    U * k.kz * k_plus + V * k_minus * k_minus
}

#[allow(non_snake_case)]
impl KpHamiltonian for EightBand {
    fn dim(&self) -> usize {
        8
    }

    fn upper(&self, k: &ReciprocalVector) -> Array2<Complex64> {
        let p = &self.params;
        let c = |x: f64| Complex64::new(x, 0.0);
        let k_plus = Complex64::new(k.kx, k.ky);
        let k_minus = Complex64::new(k.kx, -k.ky);
        let kz = k.kz;

        let U35 = Complex64::new(p.U35re, p.U35im);
        let V35 = Complex64::new(p.V35re, p.V35im);
        let U36 = U35.conj();
        let V36 = -V35.conj();
        let U47 = c(p.U47);
        let V47 = Complex64::new(0.0, p.V47im);
        let U58 = Complex64::new(p.U58re, p.U58im);
        let V58 = Complex64::new(p.V58re, p.V58im);
        let U68 = -U58.conj();
        let V68 = V58.conj();
        let f37 = c(f(k, p.F37, p.K37));

        let mut ham = Array2::<Complex64>::zeros((8, 8));
        let diagonal = [
            p.E1 + f(k, p.F1, p.K1),
            p.E3 + f(k, p.F3, p.K3),
            p.E5 + f(k, p.F5, p.K5),
            p.E7 + f(k, p.F7, p.K7),
        ];
        for (pair, e) in diagonal.iter().enumerate() {
            ham[[2 * pair, 2 * pair]] = c(*e);
            ham[[2 * pair + 1, 2 * pair + 1]] = c(*e);
        }

        // first pair to all others
        ham[[0, 2]] = c(kz * p.Q1);
        ham[[0, 3]] = k_minus * p.P1;
        ham[[0, 4]] = k_plus * p.Q2;
        ham[[0, 5]] = k_plus * p.P2;
        ham[[0, 6]] = c(kz * p.Q3);
        ham[[0, 7]] = k_minus * p.P3;
        ham[[1, 2]] = k_plus * p.P1;
        ham[[1, 3]] = c(-kz * p.Q1);
        ham[[1, 4]] = -k_minus * p.P2;
        ham[[1, 5]] = k_minus * p.Q2;
        ham[[1, 6]] = k_plus * p.P3;
        ham[[1, 7]] = c(-kz * p.Q3);

        ham[[2, 4]] = g(k, U35, V35);
        ham[[2, 5]] = g(k, U36, V36);
        ham[[2, 6]] = f37;
        ham[[2, 7]] = -g(k, U47, V47).conj();
        ham[[3, 4]] = g(k, U36, V36).conj();
        ham[[3, 5]] = -g(k, U35, V35).conj();
        ham[[3, 6]] = g(k, U47, V47);
        ham[[3, 7]] = f37;

        ham[[4, 6]] = -g(k, U68, V68).conj();
        ham[[4, 7]] = g(k, U58, V58);
        ham[[5, 6]] = g(k, U58, V58).conj();
        ham[[5, 7]] = g(k, U68, V68);
        ham
    }
}
