//! Tuning parameters of the partition-refinement scanners.
//!
//! Every configuration deserializes with defaults for missing fields and is checked with
//! `validate()` before a scan starts.

use serde::{Deserialize, Serialize};

use crate::error::{HaploError, Result};

/// Thresholds for [`crate::haplotypes::estimate_haplotype_blocks`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HaplotypeBlockConfig {
    /// Blocks spanning fewer SNPs are dropped
    pub min_snp_count: usize,
    /// Smaller strain groups are not tracked
    pub min_strain_count: usize,
}

impl Default for HaplotypeBlockConfig {
    fn default() -> Self {
        Self {
            min_snp_count: 3,
            min_strain_count: 2,
        }
    }
}

impl HaplotypeBlockConfig {
    pub fn validate(&self) -> Result<()> {
        if self.min_snp_count == 0 {
            return Err(HaploError::precondition("min_snp_count must be at least 1"));
        }
        if self.min_strain_count == 0 {
            return Err(HaploError::precondition(
                "min_strain_count must be at least 1",
            ));
        }
        Ok(())
    }
}

/// How far the window moves between two partitions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowStep {
    #[default]
    OneSnp,
    WholeWindow,
}

/// Parameters of [`crate::haplotypes::estimate_sliding_window_partitions`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlidingWindowConfig {
    /// Number of SNPs per window
    pub window_size: usize,
    pub step: WindowStep,
}

impl Default for SlidingWindowConfig {
    fn default() -> Self {
        Self {
            window_size: 10,
            step: WindowStep::default(),
        }
    }
}

impl SlidingWindowConfig {
    pub fn validate(&self) -> Result<()> {
        if self.window_size == 0 {
            return Err(HaploError::precondition("window_size must be at least 1"));
        }
        Ok(())
    }
}

/// Thresholds for [`crate::haplotypes::find_ibs_runs`] and
/// [`crate::haplotypes::find_pairwise_ibs_runs`]. A run is reported only if it meets both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IbsConfig {
    pub min_snp_count: usize,
    pub min_base_pair_extent: u64,
}

impl Default for IbsConfig {
    fn default() -> Self {
        Self {
            min_snp_count: 3,
            min_base_pair_extent: 1,
        }
    }
}

impl IbsConfig {
    pub fn validate(&self) -> Result<()> {
        if self.min_snp_count == 0 {
            return Err(HaploError::precondition("min_snp_count must be at least 1"));
        }
        Ok(())
    }
}
