use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SgoopError};
use crate::spectral::EigenSettings;

/// How the first frame is paired when counting neighbor transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FirstFrame {
    /// The first frame has no predecessor and never counts as a transition.
    #[default]
    Sentinel,
    /// The first frame is paired with the last one, counting transitions as
    /// if the sequence were closed. Opt-in; the default is [`Self::Sentinel`].
    Periodic,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SgoopConfig {
    /// Trajectory table to load.
    pub input: Option<PathBuf>,
    /// Expected dimensionality of candidate RCs. Informational only.
    pub rc_count: Option<usize>,
    pub bins: usize,
    /// Number of metastable wells the gap is measured at.
    pub wells: usize,
    /// Largest bin distance treated as a neighbor hop.
    pub hop: usize,
    /// Minimum nonzero probability. Callers apply it before scoring; the pipeline does not.
    pub prob_cutoff: f64,
    /// Eigenvalues below `-noise_tolerance` are discarded as noise.
    pub noise_tolerance: f64,
    pub first_frame: FirstFrame,
    pub eigen_tolerance: f64,
    pub eigen_max_iterations: usize,
}

impl Default for SgoopConfig {
    fn default() -> Self {
        Self {
            input: None,
            rc_count: None,
            bins: 20,
            wells: 2,
            hop: 1,
            prob_cutoff: 1e-5,
            noise_tolerance: 1e-10,
            first_frame: FirstFrame::Sentinel,
            eigen_tolerance: f64::EPSILON,
            eigen_max_iterations: 10_000,
        }
    }
}

impl SgoopConfig {
    pub fn from_path(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let config: Self = serde_json::from_reader(BufReader::new(file)).map_err(|err| {
            SgoopError::Config(format!("parse configuration {:?}: {}", path, err))
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|err| SgoopError::Config(format!("parse configuration: {}", err)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn eigen_settings(&self) -> EigenSettings {
        EigenSettings {
            tolerance: self.eigen_tolerance,
            max_iterations: self.eigen_max_iterations,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.bins == 0 {
            return Err(SgoopError::Config("bin count must be positive".to_string()));
        }
        if self.wells == 0 {
            return Err(SgoopError::Config("well count must be positive".to_string()));
        }
        if self.hop == 0 {
            return Err(SgoopError::Config("hop distance must be positive".to_string()));
        }
        if !(0.0..1.0).contains(&self.prob_cutoff) {
            return Err(SgoopError::Config(format!(
                "probability cutoff {} outside [0, 1)",
                self.prob_cutoff
            )));
        }
        if !self.noise_tolerance.is_finite() || self.noise_tolerance < 0.0 {
            return Err(SgoopError::Config(format!(
                "noise tolerance {} must be finite and non-negative",
                self.noise_tolerance
            )));
        }
        if !self.eigen_tolerance.is_finite() || self.eigen_tolerance <= 0.0 {
            return Err(SgoopError::Config(format!(
                "eigen tolerance {} must be finite and positive",
                self.eigen_tolerance
            )));
        }
        if self.bins == 1 {
            warn!("a single bin has no neighbors; every rate estimate will fail");
        }
        Ok(())
    }
}
