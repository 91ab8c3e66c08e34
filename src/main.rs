use std::env;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use log::{info, warn};
use serde::Deserialize;

use sgoop::{SgoopConfig, SgoopSession, TrajectoryLoader};

const DEFAULT_PLAN: &str = "sgoop.json";

/// Candidates to score against one trajectory.
#[derive(Debug, Deserialize)]
struct RunPlan {
    #[serde(default)]
    config: SgoopConfig,
    candidates: Vec<Vec<f64>>,
    /// Switches every candidate to reweighted scoring against this coordinate.
    #[serde(default)]
    reference: Option<Vec<f64>>,
    #[serde(default)]
    output: Option<PathBuf>,
}

fn init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .try_init();
}

fn parse_args() -> Result<PathBuf> {
    let mut args = env::args().skip(1);
    let plan = args.next();
    if let Some(extra) = args.next() {
        anyhow::bail!("Unexpected extra argument: {extra}");
    }
    Ok(plan.map(PathBuf::from).unwrap_or_else(|| PathBuf::from(DEFAULT_PLAN)))
}

fn load_plan(path: &Path) -> Result<RunPlan> {
    let file = File::open(path).with_context(|| format!("open run plan {:?}", path))?;
    let plan: RunPlan = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("parse run plan {:?}", path))?;
    plan.config
        .validate()
        .with_context(|| format!("validate configuration in {:?}", path))?;
    if plan.candidates.is_empty() {
        anyhow::bail!("Run plan {:?} lists no candidate coordinates", path);
    }
    Ok(plan)
}

fn main() -> Result<()> {
    init_logging();
    let plan_path = parse_args()?;
    let plan = load_plan(&plan_path)?;

    let input = plan
        .config
        .input
        .clone()
        .context("configuration has no trajectory input path")?;
    let load_start = Instant::now();
    let trajectory = TrajectoryLoader::from_path(&input)
        .with_context(|| format!("load trajectory from {:?}", input))?;
    info!(
        "Loaded {} frames x {} coordinates from {:?} in {:?}",
        trajectory.frame_count(),
        trajectory.dimension(),
        input,
        load_start.elapsed()
    );

    let mut session = SgoopSession::new(plan.config, trajectory)?;
    let scoring_start = Instant::now();
    match &plan.reference {
        Some(reference) => {
            info!(
                "Scoring {} candidates reweighted against {:?}",
                plan.candidates.len(),
                reference
            );
            for rc in &plan.candidates {
                session
                    .biased_eval(rc, reference)
                    .with_context(|| format!("score candidate {:?}", rc))?;
            }
        }
        None => {
            info!("Scoring {} candidates", plan.candidates.len());
            session
                .score_batch(&plan.candidates)
                .context("score candidate batch")?;
        }
    }
    info!("Scoring finished in {:?}", scoring_start.elapsed());

    let log = session.run_log();
    match log.best() {
        Some((idx, score)) if score > 0.0 => info!(
            "Best candidate #{}: rc {:?} score {:.6}",
            idx,
            log.rcs()[idx],
            score
        ),
        _ => warn!(
            "No candidate resolves {} wells; every score is zero",
            session.config().wells
        ),
    }

    if let Some(output) = &plan.output {
        log.write_json(output)
            .with_context(|| format!("write run log to {:?}", output))?;
        info!("Wrote run log with {} entries to {:?}", log.len(), output);
    }
    Ok(())
}
