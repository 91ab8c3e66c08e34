use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::pipeline::session::Evaluation;

/// History of every scored coordinate in an optimization run.
///
/// The sequences are index-aligned: entry `i` of each belongs to the `i`-th
/// scoring call. They only grow through [`RunLog::record`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunLog {
    rcs: Vec<Vec<f64>>,
    probabilities: Vec<Vec<f64>>,
    eigenvalues: Vec<Vec<f64>>,
    relaxation_weights: Vec<Vec<f64>>,
    eigenvectors: Vec<Vec<Vec<f64>>>,
    scores: Vec<f64>,
}

impl RunLog {
    pub fn record(&mut self, evaluation: &Evaluation) {
        self.rcs.push(evaluation.rc.clone());
        self.probabilities.push(evaluation.binned.histogram.clone());
        self.eigenvalues.push(evaluation.spectrum.eigenvalues.clone());
        self.relaxation_weights
            .push(evaluation.spectrum.relaxation_weights.clone());
        self.eigenvectors.push(evaluation.spectrum.eigenvector_columns());
        self.scores.push(evaluation.score);
    }

    pub fn clear(&mut self) {
        self.rcs.clear();
        self.probabilities.clear();
        self.eigenvalues.clear();
        self.relaxation_weights.clear();
        self.eigenvectors.clear();
        self.scores.clear();
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    pub fn rcs(&self) -> &[Vec<f64>] {
        &self.rcs
    }

    pub fn probabilities(&self) -> &[Vec<f64>] {
        &self.probabilities
    }

    pub fn eigenvalues(&self) -> &[Vec<f64>] {
        &self.eigenvalues
    }

    pub fn relaxation_weights(&self) -> &[Vec<f64>] {
        &self.relaxation_weights
    }

    pub fn eigenvectors(&self) -> &[Vec<Vec<f64>>] {
        &self.eigenvectors
    }

    pub fn scores(&self) -> &[f64] {
        &self.scores
    }

    /// Index and score of the highest-scoring entry.
    pub fn best(&self) -> Option<(usize, f64)> {
        self.scores
            .iter()
            .copied()
            .enumerate()
            .filter(|(_, score)| score.is_finite())
            .max_by(|a, b| a.1.total_cmp(&b.1))
    }

    pub fn write_json(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(writer, self).map_err(std::io::Error::from)?;
        Ok(())
    }

    pub fn read_json(path: &Path) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        let log: Self = serde_json::from_reader(reader).map_err(std::io::Error::from)?;
        Ok(log)
    }
}
