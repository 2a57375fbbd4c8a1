//! Small matrix helpers shared by the k·p models: the Dirac $\Gamma$ matrices
//! of the 3D topological-insulator basis and Hermitian checks.
use ndarray::{Array2, ArrayBase, Data, Ix2, arr2};
use num_complex::Complex64;

const O: Complex64 = Complex64::new(0.0, 0.0);
const R: Complex64 = Complex64::new(1.0, 0.0);
const I: Complex64 = Complex64::new(0.0, 1.0);

/// $\Gamma_1$ in the basis $\\{\ket{P1^+_z,\uparrow},\ket{P2^-_z,\uparrow},\ket{P1^+_z,\downarrow},\ket{P2^-_z,\downarrow}\\}$.
pub fn gamma1() -> Array2<Complex64> {
    arr2(&[[O, O, O, R], [O, O, R, O], [O, R, O, O], [R, O, O, O]])
}

pub fn gamma2() -> Array2<Complex64> {
    arr2(&[[O, O, O, -I], [O, O, I, O], [O, -I, O, O], [I, O, O, O]])
}

pub fn gamma3() -> Array2<Complex64> {
    arr2(&[[O, R, O, O], [R, O, O, O], [O, O, O, -R], [O, O, -R, O]])
}

pub fn gamma4() -> Array2<Complex64> {
    arr2(&[[O, -I, O, O], [I, O, O, O], [O, O, O, -I], [O, O, I, O]])
}

/// $\Gamma_5$, the mass term.
pub fn gamma5() -> Array2<Complex64> {
    arr2(&[[R, O, O, O], [O, -R, O, O], [O, O, R, O], [O, O, O, -R]])
}

/// Largest $|A_{ij}-\overline{A_{ji}}|$ together with its position.
pub fn hermitian_deviation<S: Data<Elem = Complex64>>(a: &ArrayBase<S, Ix2>) -> (f64, usize, usize) {
    let n = a.nrows();
    let mut worst = (0.0, 0, 0);
    for i in 0..n {
        for j in i..n {
            let d = (a[[i, j]] - a[[j, i]].conj()).norm();
            if d > worst.0 || d.is_nan() {
                worst = (d, i, j);
            }
        }
    }
    worst
}

/// $\sqrt{\sum_{ij}|A_{ij}|^2}$
pub fn frobenius_norm<S: Data<Elem = Complex64>>(a: &ArrayBase<S, Ix2>) -> f64 {
    a.iter().map(|x| x.norm_sqr()).sum::<f64>().sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gammas() -> Vec<Array2<Complex64>> {
        vec![gamma1(), gamma2(), gamma3(), gamma4(), gamma5()]
    }

    #[test]
    fn gammas_are_hermitian() {
        for g in gammas() {
            assert_eq!(hermitian_deviation(&g).0, 0.0);
        }
    }

    #[test]
    fn gammas_square_to_identity() {
        let id = Array2::<Complex64>::eye(4);
        for g in gammas() {
            assert_eq!(g.dot(&g), id);
        }
    }

    #[test]
    fn mass_term_anticommutes_with_the_rest() {
        let zero = Array2::<Complex64>::zeros((4, 4));
        let g5 = gamma5();
        for (a, g) in gammas().iter().enumerate().take(4) {
            assert_eq!(g5.dot(g) + g.dot(&g5), zero, "{{G5, G{}}}", a + 1);
        }
    }

    #[test]
    fn deviation_finds_asymmetric_element() {
        let mut a = gamma2();
        a[[0, 3]] = Complex64::new(0.0, -1.5);
        let (d, i, j) = hermitian_deviation(&a);
        assert!((d - 0.5).abs() < 1e-15);
        assert_eq!((i, j), (0, 3));
    }
}
