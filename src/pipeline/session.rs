use std::sync::Arc;

use log::{debug, info, warn};
use ndarray::Array1;
use rayon::prelude::*;

use crate::binning::{bin_projection, bin_projection_with_bounds, normalize_rc, BinnedProjection};
use crate::caliber::mu_factor;
use crate::config::SgoopConfig;
use crate::error::{Result, SgoopError};
use crate::pipeline::run_log::RunLog;
use crate::reweight::biased_histogram;
use crate::spectral::{analyze, build_rate_matrix, Spectrum};
use crate::trajectory::Trajectory;

/// Where the occupancy histogram of a scoring call comes from.
#[derive(Debug, Clone)]
pub enum ProbabilitySource {
    /// Count frames per bin of the projection.
    Binned,
    /// Histogram computed elsewhere, e.g. by an external reweighting tool.
    /// The trajectory is binned with `histogram.len()` bins, optionally on an
    /// explicit `(rc_min, rc_max)` scale, and the histogram is trimmed to the
    /// occupied bin range.
    Supplied {
        histogram: Vec<f64>,
        bounds: Option<(f64, f64)>,
    },
}

/// Everything computed while scoring one reaction coordinate.
#[derive(Debug, Clone)]
pub struct Evaluation {
    /// Normalized reaction coordinate.
    pub rc: Vec<f64>,
    pub binned: BinnedProjection,
    pub mu: f64,
    pub spectrum: Spectrum,
    pub score: f64,
}

/// Scoring context for one optimization run: a trajectory, the settings it is
/// scored with, and the log of every evaluated coordinate.
pub struct SgoopSession {
    config: SgoopConfig,
    trajectory: Arc<Trajectory>,
    log: RunLog,
}

impl SgoopSession {
    pub fn new(config: SgoopConfig, trajectory: impl Into<Arc<Trajectory>>) -> Result<Self> {
        config.validate()?;
        let trajectory = trajectory.into();
        if let Some(expected) = config.rc_count {
            if expected != trajectory.dimension() {
                warn!(
                    "configured rc_count {} differs from trajectory dimension {}",
                    expected,
                    trajectory.dimension()
                );
            }
        }
        Ok(Self {
            config,
            trajectory,
            log: RunLog::default(),
        })
    }

    pub fn config(&self) -> &SgoopConfig {
        &self.config
    }

    pub fn trajectory(&self) -> &Trajectory {
        &self.trajectory
    }

    pub fn run_log(&self) -> &RunLog {
        &self.log
    }

    /// Starts a fresh run without reloading the trajectory.
    pub fn reset(&mut self) {
        self.log.clear();
    }

    /// Scores `rc` on the unbiased histogram and logs the result.
    pub fn rc_eval(&mut self, rc: &[f64]) -> Result<f64> {
        let evaluation = self.evaluate(rc)?;
        Ok(self.commit(evaluation))
    }

    /// Scores `rc` on a histogram reweighted against `reference_rc`.
    pub fn biased_eval(&mut self, rc: &[f64], reference_rc: &[f64]) -> Result<f64> {
        let evaluation = self.evaluate_biased(rc, reference_rc)?;
        Ok(self.commit(evaluation))
    }

    pub fn sgoop(&mut self, rc: &[f64], source: &ProbabilitySource) -> Result<f64> {
        let evaluation = self.evaluate_with(rc, source)?;
        Ok(self.commit(evaluation))
    }

    /// Scores many candidates in parallel and logs them in input order.
    /// Candidates before the first failing one stay logged.
    pub fn score_batch(&mut self, candidates: &[Vec<f64>]) -> Result<Vec<f64>> {
        let evaluations: Vec<Result<Evaluation>> = candidates
            .par_iter()
            .map(|rc| self.evaluate(rc))
            .collect();

        let mut scores = Vec::with_capacity(evaluations.len());
        for evaluation in evaluations {
            scores.push(self.commit(evaluation?));
        }
        Ok(scores)
    }

    pub fn evaluate(&self, rc: &[f64]) -> Result<Evaluation> {
        self.evaluate_with(rc, &ProbabilitySource::Binned)
    }

    pub fn evaluate_with(&self, rc: &[f64], source: &ProbabilitySource) -> Result<Evaluation> {
        let rc = normalize_rc(rc)?;
        let binned = match source {
            ProbabilitySource::Binned => bin_projection(&self.trajectory, &rc, self.config.bins)?,
            ProbabilitySource::Supplied { histogram, bounds } => {
                check_supplied_histogram(histogram)?;
                let full = match bounds {
                    Some(bounds) => bin_projection_with_bounds(
                        &self.trajectory,
                        &rc,
                        histogram.len(),
                        *bounds,
                    )?,
                    None => bin_projection(&self.trajectory, &rc, histogram.len())?,
                };
                full.trim_to(histogram)?
            }
        };
        self.score_binned(rc, binned)
    }

    pub fn evaluate_biased(&self, rc: &[f64], reference_rc: &[f64]) -> Result<Evaluation> {
        let rc = normalize_rc(rc)?;
        let reference = normalize_rc(reference_rc)?;
        let binned = biased_histogram(&self.trajectory, &rc, &reference, self.config.bins)?;
        self.score_binned(rc, binned)
    }

    fn score_binned(&self, rc: Array1<f64>, binned: BinnedProjection) -> Result<Evaluation> {
        let config = &self.config;
        let mu = mu_factor(
            &binned.bins,
            &binned.histogram,
            config.hop,
            config.first_frame,
        )?;
        let rates = build_rate_matrix(mu, &binned.histogram, config.hop)?;
        let spectrum = analyze(&rates, &binned.histogram, &config.eigen_settings())?;
        let score = spectrum.gap(config.wells, config.noise_tolerance)?;
        debug!(
            "scored rc over {} bins: mu {:.6}, score {:.6}",
            binned.rc_bin, mu, score
        );
        Ok(Evaluation {
            rc: rc.to_vec(),
            binned,
            mu,
            spectrum,
            score,
        })
    }

    fn commit(&mut self, evaluation: Evaluation) -> f64 {
        self.log.record(&evaluation);
        info!(
            "evaluation {}: rc {:?} score {:.6}",
            self.log.len(),
            evaluation.rc,
            evaluation.score
        );
        evaluation.score
    }
}

fn check_supplied_histogram(histogram: &[f64]) -> Result<()> {
    if histogram.is_empty() {
        return Err(SgoopError::Config("supplied histogram is empty".to_string()));
    }
    if let Some((bin, p)) = histogram
        .iter()
        .enumerate()
        .find(|(_, p)| !p.is_finite() || **p < 0.0)
    {
        return Err(SgoopError::Config(format!(
            "supplied histogram has invalid probability {} in bin {}",
            p, bin
        )));
    }
    Ok(())
}
