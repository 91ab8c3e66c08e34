pub mod binning;
pub mod caliber;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod reweight;
pub mod spectral;
pub mod trajectory;

pub use binning::{
    apply_probability_cutoff, bin_projection, bin_projection_with_bounds, normalize_rc,
    BinnedProjection,
};
pub use caliber::mu_factor;
pub use config::{FirstFrame, SgoopConfig};
pub use error::{Result, SgoopError};
pub use pipeline::{Evaluation, ProbabilitySource, RunLog, SgoopSession};
pub use reweight::{biased_histogram, reweighted_histogram};
pub use spectral::{analyze, build_rate_matrix, spectral_gap, EigenSettings, Spectrum};
pub use trajectory::{Trajectory, TrajectoryLoader};
