use std::fs::File;
use std::io::Read;
use std::path::Path;

use ndarray::{Array1, Array2, ArrayView1};

use crate::error::{Result, SgoopError};

/// Frames of collective-variable samples, one row per frame.
#[derive(Debug, Clone)]
pub struct Trajectory {
    frames: Array2<f64>,
}

impl Trajectory {
    pub fn from_frames(frames: Array2<f64>) -> Result<Self> {
        if frames.nrows() == 0 || frames.ncols() == 0 {
            return Err(SgoopError::Load(format!(
                "trajectory needs at least one frame and one coordinate, got {}x{}",
                frames.nrows(),
                frames.ncols()
            )));
        }
        if frames.iter().any(|value| !value.is_finite()) {
            return Err(SgoopError::Load(
                "trajectory contains non-finite values".to_string(),
            ));
        }
        Ok(Self { frames })
    }

    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self> {
        let dims = rows.first().map(Vec::len).unwrap_or(0);
        if let Some(idx) = rows.iter().position(|row| row.len() != dims) {
            return Err(SgoopError::Load(format!(
                "frame {} has {} columns, expected {}",
                idx,
                rows[idx].len(),
                dims
            )));
        }
        let flat: Vec<f64> = rows.iter().flatten().copied().collect();
        let frames = Array2::from_shape_vec((rows.len(), dims), flat)
            .map_err(|err| SgoopError::Load(err.to_string()))?;
        Self::from_frames(frames)
    }

    pub fn frame_count(&self) -> usize {
        self.frames.nrows()
    }

    pub fn dimension(&self) -> usize {
        self.frames.ncols()
    }

    pub fn frames(&self) -> &Array2<f64> {
        &self.frames
    }

    /// Dot product of every frame with `rc`.
    pub fn project(&self, rc: ArrayView1<'_, f64>) -> Result<Array1<f64>> {
        if rc.len() != self.dimension() {
            return Err(SgoopError::Config(format!(
                "reaction coordinate has {} components, trajectory has {}",
                rc.len(),
                self.dimension()
            )));
        }
        Ok(self.frames.dot(&rc))
    }
}

/// Reads whitespace-delimited numeric tables into trajectories.
#[derive(Debug, Default)]
pub struct TrajectoryLoader;

impl TrajectoryLoader {
    pub fn from_path(path: &Path) -> Result<Trajectory> {
        let file = File::open(path)?;
        Self::from_reader(file).map_err(|err| match err {
            SgoopError::Load(message) => SgoopError::Load(format!("{:?}: {}", path, message)),
            other => other,
        })
    }

    pub fn from_reader<R: Read>(mut reader: R) -> Result<Trajectory> {
        let mut buf = String::new();
        reader.read_to_string(&mut buf)?;
        Self::from_table_str(&buf)
    }

    /// Blank lines and `#` comment lines (COLVAR headers) are skipped.
    pub fn from_table_str(table: &str) -> Result<Trajectory> {
        let mut rows: Vec<Vec<f64>> = Vec::new();
        let mut width: Option<usize> = None;

        for (line_no, line) in table.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let row = trimmed
                .split_whitespace()
                .map(|token| {
                    token.parse::<f64>().map_err(|_| {
                        SgoopError::Load(format!(
                            "line {}: cannot parse '{}' as a number",
                            line_no + 1,
                            token
                        ))
                    })
                })
                .collect::<Result<Vec<f64>>>()?;

            match width {
                None => width = Some(row.len()),
                Some(expected) if expected != row.len() => {
                    return Err(SgoopError::Load(format!(
                        "line {}: found {} columns, expected {}",
                        line_no + 1,
                        row.len(),
                        expected
                    )));
                }
                Some(_) => {}
            }
            rows.push(row);
        }

        if rows.is_empty() {
            return Err(SgoopError::Load("no frames found".to_string()));
        }
        Trajectory::from_rows(&rows)
    }
}
