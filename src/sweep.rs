//! Parallel sweep over a list of k-points.
//!
//! Every k-point is an independent unit of work: build $H(\bm k)$, then
//! diagonalize it. Units run on a dedicated rayon pool and carry their input
//! index, so the records come back in input order whatever the worker count.
//! The first failure raises a halt flag; workers skip k-points they have not
//! started yet and the failure with the lowest index is returned.
use std::sync::atomic::{AtomicBool, Ordering};

use ndarray::Array2;
use rayon::prelude::*;
use serde::Serialize;

use crate::eigensolver::{EigenResult, HermitianEigensolver};
use crate::error::{KpError, Result};
use crate::hamiltonian::KpHamiltonian;
use crate::kpoints::{ReciprocalVector, validate};
use crate::registry::{Hamiltonian, resolve};

/// Eigen-decomposition at one k-point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SweepRecord {
    pub index: usize,
    pub k: ReciprocalVector,
    #[serde(flatten)]
    pub result: EigenResult,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweepOptions {
    /// Worker threads; 0 uses every hardware thread.
    pub jobs: usize,
    pub solver: HermitianEigensolver,
}

impl Default for SweepOptions {
    fn default() -> Self {
        SweepOptions {
            jobs: 0,
            solver: HermitianEigensolver::default(),
        }
    }
}

impl SweepOptions {
    pub fn threads(&self) -> usize {
        if self.jobs == 0 { num_cpus::get() } else { self.jobs }
    }
}

/// Resolves `model_id` with the built-in parameters and sweeps `kpoints`.
pub fn sweep(model_id: &str, kpoints: &[ReciprocalVector]) -> Result<Vec<SweepRecord>> {
    let model = resolve(model_id)?;
    sweep_with(&model, kpoints, &SweepOptions::default(), || {})
}

/// Sweeps `kpoints` through a resolved model. `observer` is called once for
/// every k-point that finishes successfully, from the worker thread.
pub fn sweep_with<F>(
    model: &Hamiltonian,
    kpoints: &[ReciprocalVector],
    options: &SweepOptions,
    observer: F,
) -> Result<Vec<SweepRecord>>
where
    F: Fn() + Sync,
{
    validate(kpoints)?;
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(options.threads())
        .build()?;
    let halt = AtomicBool::new(false);

    let outcomes: Vec<Option<Result<SweepRecord>>> = pool.install(|| {
        kpoints
            .par_iter()
            .enumerate()
            .map(|(index, k)| {
                if halt.load(Ordering::Relaxed) {
                    return None;
                }
                let ham = model.build(k);
                let outcome = options.solver.decompose(&ham);
                match outcome {
                    Ok(result) => {
                        observer();
                        Some(Ok(SweepRecord {
                            index,
                            k: *k,
                            result,
                        }))
                    }
                    Err(source) => {
                        halt.store(true, Ordering::Relaxed);
                        Some(Err(KpError::AtKPoint {
                            index,
                            k: *k,
                            source: Box::new(source),
                        }))
                    }
                }
            })
            .collect()
    });

    // Halted points only exist when some point failed, so a clean scan has
    // one record per input.
    let mut records = Vec::with_capacity(kpoints.len());
    for outcome in outcomes.into_iter().flatten() {
        records.push(outcome?);
    }
    Ok(records)
}

/// Eigenvalues of all records stacked as `(nk, nband)`, the layout of a band
/// plot.
pub fn band_matrix(records: &[SweepRecord]) -> Array2<f64> {
    let nband = records.first().map_or(0, |r| r.result.nband());
    let mut bands = Array2::<f64>::zeros((records.len(), nband));
    for (mut row, record) in bands.outer_iter_mut().zip(records) {
        row.assign(&record.result.eigenvalues);
    }
    bands
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kpoints::k_line;

    fn path() -> Vec<ReciprocalVector> {
        let mut ks = k_line(
            ReciprocalVector::new(-0.1, 0.0, 0.0),
            ReciprocalVector::GAMMA,
            9,
        );
        ks.extend(k_line(
            ReciprocalVector::GAMMA,
            ReciprocalVector::new(0.0, 0.07, 0.05),
            8,
        ));
        ks
    }

    fn with_jobs(jobs: usize, solver: HermitianEigensolver) -> SweepOptions {
        SweepOptions { jobs, solver }
    }

    #[test]
    fn records_follow_input_order_for_any_worker_count() {
        let ks = path();
        let model = resolve("4band").unwrap();
        let serial = sweep_with(&model, &ks, &with_jobs(1, HermitianEigensolver::jacobi()), || {}).unwrap();
        for jobs in [2, 3, 8] {
            let parallel =
                sweep_with(&model, &ks, &with_jobs(jobs, HermitianEigensolver::jacobi()), || {}).unwrap();
            assert_eq!(parallel, serial, "jobs = {}", jobs);
        }
        assert_eq!(serial.len(), ks.len());
        for (i, (record, k)) in serial.iter().zip(ks.iter()).enumerate() {
            assert_eq!(record.index, i);
            assert_eq!(record.k, *k);
        }
    }

    #[test]
    fn lapack_sweep_keeps_order_for_any_worker_count() {
        let ks = path();
        let model = resolve("mnk12").unwrap();
        let serial = sweep_with(&model, &ks, &with_jobs(1, HermitianEigensolver::default()), || {}).unwrap();
        for jobs in [2, 8] {
            let parallel =
                sweep_with(&model, &ks, &with_jobs(jobs, HermitianEigensolver::default()), || {}).unwrap();
            assert_eq!(parallel.len(), serial.len());
            for (a, b) in parallel.iter().zip(serial.iter()) {
                assert_eq!(a.index, b.index);
                assert_eq!(a.k, b.k);
                for (x, y) in a.result.eigenvalues.iter().zip(b.result.eigenvalues.iter()) {
                    assert!((x - y).abs() < 1e-12, "jobs = {}: {} vs {}", jobs, x, y);
                }
            }
        }
    }

    #[test]
    fn observer_sees_every_point() {
        use std::sync::atomic::AtomicUsize;
        let ks = path();
        let seen = AtomicUsize::new(0);
        let model = resolve("mnk12").unwrap();
        sweep_with(&model, &ks, &SweepOptions::default(), || {
            seen.fetch_add(1, Ordering::Relaxed);
        })
        .unwrap();
        assert_eq!(seen.into_inner(), ks.len());
    }

    #[test]
    fn unknown_model_fails_before_any_work() {
        let err = sweep("unsupported", &[ReciprocalVector::GAMMA]).unwrap_err();
        assert!(matches!(err, KpError::UnknownModel(ref id) if id == "unsupported"));
    }

    #[test]
    fn non_finite_kpoint_is_reported_with_its_index() {
        let mut ks = path();
        ks[5] = ReciprocalVector::new(0.0, f64::INFINITY, 0.0);
        match sweep("mnk12", &ks) {
            Err(KpError::InvalidKPoint { index, .. }) => assert_eq!(index, 5),
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn solver_failure_carries_the_kpoint() {
        let ks = path();
        let model = resolve("4band").unwrap();
        let options = with_jobs(
            1,
            HermitianEigensolver {
                max_sweeps: 0,
                ..HermitianEigensolver::jacobi()
            },
        );
        // a single worker visits the points in input order
        match sweep_with(&model, &ks, &options, || {}) {
            Err(KpError::AtKPoint { index, k, source }) => {
                assert_eq!(index, 0);
                assert_eq!(k, ks[0]);
                assert!(matches!(*source, KpError::ConvergenceFailure { .. }));
            }
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn halt_flag_skips_unstarted_points() {
        use std::sync::atomic::AtomicUsize;
        // 4band is diagonal at Gamma, so a Jacobi solver without sweeps only
        // fails off Gamma.
        let g = ReciprocalVector::GAMMA;
        let ks = [g, g, ReciprocalVector::new(0.05, 0.0, 0.0), g, g, g];
        let model = resolve("4band").unwrap();
        let options = with_jobs(
            1,
            HermitianEigensolver {
                max_sweeps: 0,
                ..HermitianEigensolver::jacobi()
            },
        );
        let solved = AtomicUsize::new(0);
        let result = sweep_with(&model, &ks, &options, || {
            solved.fetch_add(1, Ordering::Relaxed);
        });
        match result {
            Err(KpError::AtKPoint { index, .. }) => assert_eq!(index, 2),
            other => panic!("unexpected result {:?}", other),
        }
        assert_eq!(solved.into_inner(), 2);
    }

    #[test]
    fn eight_band_with_loaded_parameters() {
        let model = crate::registry::resolve_with("8band", &crate::registry::test_params()).unwrap();
        let records = sweep_with(&model, &path(), &SweepOptions::default(), || {}).unwrap();
        assert_eq!(band_matrix(&records).dim(), (path().len(), 8));
        assert!(matches!(
            sweep("8band", &path()),
            Err(KpError::MissingParameters(_))
        ));
    }

    #[test]
    fn empty_input_gives_empty_output() {
        assert!(sweep("4band", &[]).unwrap().is_empty());
        assert_eq!(band_matrix(&[]).dim(), (0, 0));
    }

    #[test]
    fn band_matrix_stacks_eigenvalues() {
        let ks = path();
        let records = sweep("4band", &ks).unwrap();
        let bands = band_matrix(&records);
        assert_eq!(bands.dim(), (ks.len(), 4));
        assert_eq!(bands.row(3), records[3].result.eigenvalues);
    }
}
