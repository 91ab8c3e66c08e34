pub mod eigen;
pub mod gap;
pub mod rate_matrix;

pub use eigen::{analyze, EigenSettings, Spectrum};
pub use gap::{spectral_gap, DEFAULT_NOISE_TOLERANCE};
pub use rate_matrix::build_rate_matrix;
