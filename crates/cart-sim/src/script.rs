//! Timed POKEY write scripts
//!
//! A script is a JSON list of `{ "at": seconds, "register": n, "value": v }`
//! entries. Entries are sorted by time on load; equal times keep file order.

use crate::error::{Result, SimError};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One register write issued by the simulated host CPU
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegisterWrite {
    /// Time in seconds from the start of the render
    pub at: f64,
    /// Register offset within the POKEY window (0-15)
    pub register: u8,
    /// Value written
    pub value: u8,
}

/// Time-ordered list of register writes
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WriteScript {
    writes: Vec<RegisterWrite>,
}

impl WriteScript {
    /// Build from writes in any order
    pub fn new(mut writes: Vec<RegisterWrite>) -> Result<Self> {
        for (i, w) in writes.iter().enumerate() {
            if !w.at.is_finite() || w.at < 0.0 {
                return Err(SimError::Script(format!("entry {i}: bad time {}", w.at)));
            }
            if w.register > 0x0F {
                return Err(SimError::Script(format!(
                    "entry {i}: register {} outside the 16-register window",
                    w.register
                )));
            }
        }
        writes.sort_by(|a, b| a.at.total_cmp(&b.at));
        Ok(Self { writes })
    }

    /// Parse a JSON script
    pub fn from_json_str(json: &str) -> Result<Self> {
        let writes: Vec<RegisterWrite> = serde_json::from_str(json)?;
        Self::new(writes)
    }

    /// Load a JSON script from disk
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Writes in time order
    pub fn writes(&self) -> &[RegisterWrite] {
        &self.writes
    }

    /// Time of the last write, zero for an empty script
    pub fn duration(&self) -> f64 {
        self.writes.last().map_or(0.0, |w| w.at)
    }

    /// Number of writes
    pub fn len(&self) -> usize {
        self.writes.len()
    }

    /// Whether the script has no writes
    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }
}
