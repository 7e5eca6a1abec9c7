//! Sequential access to SDPs and SNP positions.
//!
//! The scanners never see genotype files. They consume an ordered [`SdpStream`] (one bit-vector
//! per SNP, fixed strain order) and, where physical coordinates are needed, a [`SnpPositionStream`]
//! advanced in lockstep with it. Two implementations are provided: in-memory streams over
//! materialized vectors, and channel-backed streams fed by a producer thread.

use crate::error::{HaploError, Result};
use crate::sdp::Sdp;
use crate::variants::{ChromosomeId, SequencePosition};

mod channel;
mod memory;

pub use channel::{ChannelPositionStream, ChannelSdpStream, PositionSender, SdpSender};
pub use memory::{InMemoryPositionStream, InMemorySdpStream};

/// The order in which a stream presents the SNPs of a chromosome.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum StreamDirection {
    /// Ascending SNP index
    Forward,
    /// Descending SNP index, the last SNP of the chromosome is read first
    Reverse,
}

/// Sequential access to the SDPs of one chromosome.
pub trait SdpStream {
    /// Total number of SDPs the stream delivers
    fn sdp_count(&self) -> usize;

    /// Strain names in bit order. Fixed for the lifetime of the stream.
    fn strain_names(&self) -> &[String];

    fn strain_count(&self) -> usize {
        self.strain_names().len()
    }

    fn direction(&self) -> StreamDirection;

    /// Whether another SDP can be read
    fn has_next(&self) -> bool;

    /// Read the next SDP. Fails with an I/O error once the stream is exhausted.
    fn next_sdp(&mut self) -> Result<Sdp>;
}

/// Sequential access to the base-pair positions of the SNPs of one chromosome.
pub trait SnpPositionStream {
    fn chromosome(&self) -> ChromosomeId;

    /// Smallest position in the stream
    fn min_position(&self) -> SequencePosition;

    /// Number of base pairs between the smallest and the largest position, both inclusive
    fn extent_in_base_pairs(&self) -> u64;

    /// Total number of positions the stream delivers
    fn position_count(&self) -> usize;

    fn has_next(&self) -> bool;

    /// Read the next position. Fails with an I/O error once the stream is exhausted.
    fn next_position(&mut self) -> Result<SequencePosition>;
}

/// Check that an SDP stream and a position stream describe the same SNPs and can be read in
/// lockstep.
pub fn check_lockstep(sdps: &dyn SdpStream, positions: &dyn SnpPositionStream) -> Result<()> {
    if sdps.sdp_count() != positions.position_count() {
        return Err(HaploError::precondition(format!(
            "SDP stream has {} entries but position stream has {}",
            sdps.sdp_count(),
            positions.position_count()
        )));
    }
    if sdps.direction() != StreamDirection::Forward {
        return Err(HaploError::precondition(
            "position streams can only be paired with forward SDP streams",
        ));
    }
    Ok(())
}

/// Require a stream to be read in the given direction.
pub(crate) fn expect_direction(
    stream: &dyn SdpStream,
    expected: StreamDirection,
    role: &str,
) -> Result<()> {
    if stream.direction() != expected {
        return Err(HaploError::precondition(format!(
            "{role} stream must be {expected:?} but is {:?}",
            stream.direction()
        )));
    }
    Ok(())
}

pub(crate) fn exhausted(what: &str) -> HaploError {
    HaploError::Io(std::io::Error::new(
        std::io::ErrorKind::UnexpectedEof,
        format!("{what} stream is exhausted"),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lockstep_requires_equal_lengths() {
        let sdps = InMemorySdpStream::forward(
            vec!["01".parse().unwrap(), "11".parse().unwrap()],
            vec!["A".into(), "B".into()],
        );
        let positions = InMemoryPositionStream::new(1, SequencePosition::from_vec(vec![5]));
        assert!(matches!(
            check_lockstep(&sdps, &positions),
            Err(HaploError::Precondition { .. })
        ));

        let positions = InMemoryPositionStream::new(1, SequencePosition::from_vec(vec![5, 9]));
        assert!(check_lockstep(&sdps, &positions).is_ok());
    }

    #[test]
    fn lockstep_rejects_reverse_streams() {
        let sdps = InMemorySdpStream::reverse(vec!["01".parse().unwrap()], vec!["A".into(), "B".into()]);
        let positions = InMemoryPositionStream::new(1, SequencePosition::from_vec(vec![5]));
        assert!(check_lockstep(&sdps, &positions).is_err());
    }
}
