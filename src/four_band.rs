//! The 4-band k·p Hamiltonian of Bi2Se3-type topological insulators.
//!
//! Liu et al., PRB 82, 045122 (2010), Eqs. (16)-(17):
//!
//! $$H_0=\epsilon(\bm k)+M(\bm k)\Gamma_5+B(k_z)k_z\Gamma_4+A(k_\parallel)(k_y\Gamma_1-k_x\Gamma_2)$$
//! $$H_3=R_1\Gamma_3(k_x^3-3k_xk_y^2)-R_2\Gamma_4(k_y^3-3k_yk_x^2)$$
//!
//! with $\epsilon=C_0+C_1k_z^2+C_2k_\parallel^2$, $M=M_0+M_1k_z^2+M_2k_\parallel^2$,
//! $A=A_0+A_2k_\parallel^2$ and $B=B_0+B_2k_z^2$. Energies in eV, k in 1/Å.
use ndarray::Array2;
use num_complex::Complex64;
use serde::Deserialize;

use crate::hamiltonian::KpHamiltonian;
use crate::kpoints::ReciprocalVector;
use crate::math::{gamma1, gamma2, gamma3, gamma4, gamma5};

/// Keys missing from a parameter file keep the Bi2Se3 values; unknown keys
/// are rejected.
#[allow(non_snake_case)]
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FourBandParams {
    pub C0: f64,
    pub C1: f64,
    pub C2: f64,
    pub M0: f64,
    pub M1: f64,
    pub M2: f64,
    pub A0: f64,
    /// Defaults to $-A_0/2$ when absent.
    pub A2: Option<f64>,
    pub B0: f64,
    /// Defaults to $-B_0/2$ when absent.
    pub B2: Option<f64>,
    pub R1: f64,
    pub R2: f64,
}

impl Default for FourBandParams {
    /// Bi2Se3, Liu et al. 2010.
    fn default() -> Self {
        FourBandParams {
            C0: -0.0083,
            C1: 5.74,
            C2: 30.4,
            M0: -0.28,
            M1: 6.86,
            M2: 44.5,
            A0: 3.33,
            A2: None,
            B0: 2.26,
            B2: None,
            R1: 50.6,
            R2: -113.3,
        }
    }
}

#[allow(non_snake_case)]
impl FourBandParams {
    pub fn A2(&self) -> f64 {
        self.A2.unwrap_or(-0.5 * self.A0)
    }

    pub fn B2(&self) -> f64 {
        self.B2.unwrap_or(-0.5 * self.B0)
    }
}

/// Precomputed $\Gamma$ matrices together with the parameters.
#[derive(Debug, Clone)]
pub struct FourBand {
    pub params: FourBandParams,
    g1: Array2<Complex64>,
    g2: Array2<Complex64>,
    g3: Array2<Complex64>,
    g4: Array2<Complex64>,
    g5: Array2<Complex64>,
}

impl FourBand {
    pub fn new(params: FourBandParams) -> Self {
        FourBand {
            params,
            g1: gamma1(),
            g2: gamma2(),
            g3: gamma3(),
            g4: gamma4(),
            g5: gamma5(),
        }
    }
}

/// $x^3-3xy^2$
#[inline(always)]
fn cubic(x: f64, y: f64) -> f64 {
    x * x * x - 3.0 * x * y * y
}

#[allow(non_snake_case)]
impl KpHamiltonian for FourBand {
    fn dim(&self) -> usize {
        4
    }

    fn upper(&self, k: &ReciprocalVector) -> Array2<Complex64> {
        let p = &self.params;
        let kp2 = k.k_par2();
        let kz2 = k.kz * k.kz;
        let epsilon = p.C0 + p.C1 * kz2 + p.C2 * kp2;
        let M = p.M0 + p.M1 * kz2 + p.M2 * kp2;
        let A = p.A0 + p.A2() * kp2;
        let B = p.B0 + p.B2() * kz2;
        let c = |x: f64| Complex64::new(x, 0.0);

        let mut ham = Array2::<Complex64>::eye(4) * c(epsilon);
        ham = ham + &self.g5 * c(M);
        ham = ham + &self.g4 * c(B * k.kz);
        ham = ham + &self.g1 * c(A * k.ky) - &self.g2 * c(A * k.kx);
        ham = ham + &self.g3 * c(p.R1 * cubic(k.kx, k.ky));
        ham - &self.g4 * c(p.R2 * cubic(k.ky, k.kx))
    }
}
