//! Model selection: the closed set of model identifiers and the dispatch from
//! an identifier to its Hamiltonian builder.
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use ndarray::Array2;
use num_complex::Complex64;

use crate::eight_band::{EightBand, EightBandParams};
use crate::error::{KpError, Result};
use crate::four_band::{FourBand, FourBandParams};
use crate::hamiltonian::KpHamiltonian;
use crate::kpoints::ReciprocalVector;
use crate::mnk12::{Mnk12, Mnk12Params};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModelKind {
    EightBand,
    FourBand,
    Mnk12,
}

impl ModelKind {
    /// Dispatch table from identifier to model.
    pub const ALL: [(&'static str, ModelKind); 3] = [
        ("8band", ModelKind::EightBand),
        ("4band", ModelKind::FourBand),
        ("mnk12", ModelKind::Mnk12),
    ];

    pub fn id(&self) -> &'static str {
        match self {
            ModelKind::EightBand => "8band",
            ModelKind::FourBand => "4band",
            ModelKind::Mnk12 => "mnk12",
        }
    }
}

impl FromStr for ModelKind {
    type Err = KpError;

    /// Exact, case-sensitive match.
    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .iter()
            .find(|(id, _)| *id == s)
            .map(|(_, kind)| *kind)
            .ok_or_else(|| KpError::UnknownModel(s.to_string()))
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Material parameters for every model; only the selected model's entry is
/// used. Deserializes from a single model's parameter file through
/// [`ModelParams::load`].
///
/// The 8-band model has no built-in parameters, so its entry is empty until
/// a parameter file is loaded.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelParams {
    pub eight_band: Option<EightBandParams>,
    pub four_band: FourBandParams,
    pub mnk12: Mnk12Params,
}

impl ModelParams {
    /// Parses a JSON parameter file for `kind`, keeping the defaults of the
    /// other models. Missing 4band and mnk12 keys fall back to the built-in
    /// values; unknown keys are an error.
    pub fn from_json(kind: ModelKind, text: &str, file: &str) -> Result<Self> {
        let err = |source| KpError::ParameterFile {
            file: file.to_string(),
            source,
        };
        let mut params = ModelParams::default();
        match kind {
            ModelKind::EightBand => params.eight_band = Some(serde_json::from_str(text).map_err(err)?),
            ModelKind::FourBand => params.four_band = serde_json::from_str(text).map_err(err)?,
            ModelKind::Mnk12 => params.mnk12 = serde_json::from_str(text).map_err(err)?,
        }
        Ok(params)
    }

    pub fn load<P: AsRef<Path>>(kind: ModelKind, path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        Self::from_json(kind, &text, &path.display().to_string())
    }

    /// `<model>.json`, the file looked up in the working directory when no
    /// parameter file is given.
    pub fn default_file_name(kind: ModelKind) -> String {
        format!("{}.json", kind.id())
    }
}

/// A resolved model. Each variant owns its parameters, fixed from here on.
#[derive(Debug, Clone)]
pub enum Hamiltonian {
    EightBand(EightBand),
    FourBand(FourBand),
    Mnk12(Mnk12),
}

impl Hamiltonian {
    pub fn from_kind(kind: ModelKind, params: &ModelParams) -> Result<Self> {
        Ok(match kind {
            ModelKind::EightBand => {
                let p = params
                    .eight_band
                    .clone()
                    .ok_or_else(|| KpError::MissingParameters(kind.id().to_string()))?;
                Hamiltonian::EightBand(EightBand::new(p))
            }
            ModelKind::FourBand => Hamiltonian::FourBand(FourBand::new(params.four_band.clone())),
            ModelKind::Mnk12 => Hamiltonian::Mnk12(Mnk12::new(params.mnk12.clone())?),
        })
    }

    pub fn kind(&self) -> ModelKind {
        match self {
            Hamiltonian::EightBand(_) => ModelKind::EightBand,
            Hamiltonian::FourBand(_) => ModelKind::FourBand,
            Hamiltonian::Mnk12(_) => ModelKind::Mnk12,
        }
    }

    /// Orbitals per layer for slab models, used to split eigenvectors into
    /// layer weights.
    pub fn layer_dim(&self) -> Option<usize> {
        match self {
            Hamiltonian::Mnk12(_) => Some(crate::mnk12::LAYER_DIM),
            _ => None,
        }
    }
}

impl KpHamiltonian for Hamiltonian {
    fn dim(&self) -> usize {
        match self {
            Hamiltonian::EightBand(m) => m.dim(),
            Hamiltonian::FourBand(m) => m.dim(),
            Hamiltonian::Mnk12(m) => m.dim(),
        }
    }

    fn upper(&self, k: &ReciprocalVector) -> Array2<Complex64> {
        match self {
            Hamiltonian::EightBand(m) => m.upper(k),
            Hamiltonian::FourBand(m) => m.upper(k),
            Hamiltonian::Mnk12(m) => m.upper(k),
        }
    }
}

/// Resolves a model identifier with the built-in parameters. Fails with
/// [`KpError::MissingParameters`] for 8band.
pub fn resolve(model_id: &str) -> Result<Hamiltonian> {
    resolve_with(model_id, &ModelParams::default())
}

pub fn resolve_with(model_id: &str, params: &ModelParams) -> Result<Hamiltonian> {
    let kind: ModelKind = model_id.parse()?;
    Hamiltonian::from_kind(kind, params)
}

/// Built-in parameters plus the synthetic 8-band couplings.
#[cfg(test)]
pub(crate) fn test_params() -> ModelParams {
    ModelParams {
        eight_band: Some(crate::eight_band::sample_params()),
        ..ModelParams::default()
    }
}
