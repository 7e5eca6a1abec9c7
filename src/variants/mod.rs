use std::fmt::{Display, Formatter};
use std::ops::Sub;

mod builder;
mod data;
mod sequence;
mod site;

pub use builder::GenotypeDataBuilder;
pub use data::GenotypeData;
pub use sequence::StrainGenotypes;
pub use site::{GenotypeCall, SnpSite};
pub(crate) use site::sdp_relative_to;

/// Chromosome number as used by the position streams.
pub type ChromosomeId = u8;

/// A base-pair coordinate on a chromosome. This newtype ensures that physical positions and SNP
/// indices (ordinal positions in a stream) aren't mixed up.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
pub struct SequencePosition(u64);

impl SequencePosition {
    /// Create a new sequence position from a raw base-pair coordinate.
    pub fn from_u64(position: u64) -> Self {
        Self(position)
    }

    #[inline]
    pub fn from_vec(positions: Vec<u64>) -> Vec<Self> {
        positions.into_iter().map(Self::from_u64).collect()
    }

    /// Get the underlying base-pair coordinate.
    pub fn unwrap(&self) -> u64 {
        self.0
    }

    /// Number of base pairs from `self` to `end`, both inclusive.
    ///
    /// # Panics
    /// If `end` lies before `self`
    pub fn extent_to(&self, end: SequencePosition) -> u64 {
        assert!(end.0 >= self.0, "extent end {end} lies before start {self}");
        end.0 - self.0 + 1
    }
}

impl Display for SequencePosition {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Sub for SequencePosition {
    type Output = u64;

    fn sub(self, rhs: Self) -> Self::Output {
        self.0 - rhs.0
    }
}
