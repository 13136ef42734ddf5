//! Recorded rollout output for visualization and export.

use serde::Serialize;

/// One rollout's worth of states: per step, every object's `[x, y]` position,
/// and (mass-spring only) every spring's actuation signal.
///
/// Indexing matches the topology arrays exactly — renderers color and place
/// strictly by index. A trajectory is produced fresh by each rollout and
/// replaced wholesale, never mutated in place.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Trajectory {
    /// `steps × n_objects` positions.
    pub positions: Vec<Vec<[f64; 2]>>,
    /// `steps × n_springs` actuations; empty for scenarios without springs.
    pub actuations: Vec<Vec<f64>>,
}

impl Trajectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one step.
    pub fn push_step(&mut self, positions: Vec<[f64; 2]>, actuations: Vec<f64>) {
        self.positions.push(positions);
        if !actuations.is_empty() {
            self.actuations.push(actuations);
        }
    }

    /// Number of recorded steps.
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Positions at the final recorded step.
    pub fn final_positions(&self) -> Option<&[[f64; 2]]> {
        self.positions.last().map(Vec::as_slice)
    }

    /// Export to a JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Export to a JSON file.
    pub fn to_json_file(&self, path: &str) -> Result<(), Box<dyn std::error::Error>> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }
}
