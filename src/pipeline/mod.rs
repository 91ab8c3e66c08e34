pub mod run_log;
pub mod session;

pub use run_log::RunLog;
pub use session::{Evaluation, ProbabilitySource, SgoopSession};
