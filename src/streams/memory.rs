use super::{exhausted, SdpStream, SnpPositionStream, StreamDirection};
use crate::error::Result;
use crate::sdp::Sdp;
use crate::variants::{ChromosomeId, SequencePosition};

/// An SDP stream over a materialized vector of SDPs.
#[derive(Clone, Debug)]
pub struct InMemorySdpStream {
    sdps: Vec<Sdp>,
    strain_names: Vec<String>,
    direction: StreamDirection,
    /// number of SDPs read so far
    cursor: usize,
}

impl InMemorySdpStream {
    /// A stream presenting the SDPs in the given order.
    ///
    /// # Panics
    /// If an SDP does not have one bit per strain name
    pub fn forward(sdps: Vec<Sdp>, strain_names: Vec<String>) -> Self {
        Self::new(sdps, strain_names, StreamDirection::Forward)
    }

    /// A stream presenting the SDPs back-to-front. `sdps` is given in ascending SNP order.
    ///
    /// # Panics
    /// If an SDP does not have one bit per strain name
    pub fn reverse(sdps: Vec<Sdp>, strain_names: Vec<String>) -> Self {
        Self::new(sdps, strain_names, StreamDirection::Reverse)
    }

    fn new(sdps: Vec<Sdp>, strain_names: Vec<String>, direction: StreamDirection) -> Self {
        assert!(
            sdps.iter().all(|s| s.strain_count() == strain_names.len()),
            "every SDP needs one bit per strain"
        );
        Self {
            sdps,
            strain_names,
            direction,
            cursor: 0,
        }
    }
}

impl SdpStream for InMemorySdpStream {
    fn sdp_count(&self) -> usize {
        self.sdps.len()
    }

    fn strain_names(&self) -> &[String] {
        &self.strain_names
    }

    fn direction(&self) -> StreamDirection {
        self.direction
    }

    fn has_next(&self) -> bool {
        self.cursor < self.sdps.len()
    }

    fn next_sdp(&mut self) -> Result<Sdp> {
        if !self.has_next() {
            return Err(exhausted("SDP"));
        }

        let index = match self.direction {
            StreamDirection::Forward => self.cursor,
            StreamDirection::Reverse => self.sdps.len() - 1 - self.cursor,
        };
        self.cursor += 1;
        Ok(self.sdps[index].clone())
    }
}

/// A position stream over a materialized, ascending vector of base-pair positions.
#[derive(Clone, Debug)]
pub struct InMemoryPositionStream {
    chromosome: ChromosomeId,
    positions: Vec<SequencePosition>,
    cursor: usize,
}

impl InMemoryPositionStream {
    pub fn new(chromosome: ChromosomeId, positions: Vec<SequencePosition>) -> Self {
        debug_assert!(positions.windows(2).all(|w| w[0] <= w[1]));
        Self {
            chromosome,
            positions,
            cursor: 0,
        }
    }
}

impl SnpPositionStream for InMemoryPositionStream {
    fn chromosome(&self) -> ChromosomeId {
        self.chromosome
    }

    fn min_position(&self) -> SequencePosition {
        self.positions
            .first()
            .copied()
            .unwrap_or(SequencePosition::from_u64(0))
    }

    fn extent_in_base_pairs(&self) -> u64 {
        match (self.positions.first(), self.positions.last()) {
            (Some(first), Some(last)) => first.extent_to(*last),
            _ => 0,
        }
    }

    fn position_count(&self) -> usize {
        self.positions.len()
    }

    fn has_next(&self) -> bool {
        self.cursor < self.positions.len()
    }

    fn next_position(&mut self) -> Result<SequencePosition> {
        let position = self
            .positions
            .get(self.cursor)
            .copied()
            .ok_or_else(|| exhausted("position"))?;
        self.cursor += 1;
        Ok(position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("S{i}")).collect()
    }

    #[test]
    fn reverse_stream_reads_back_to_front() {
        let sdps: Vec<Sdp> = ["001", "010", "100"]
            .iter()
            .map(|s| s.parse().unwrap())
            .collect();
        let mut stream = InMemorySdpStream::reverse(sdps, names(3));
        assert_eq!(stream.direction(), StreamDirection::Reverse);
        assert_eq!(stream.next_sdp().unwrap().to_string(), "100");
        assert_eq!(stream.next_sdp().unwrap().to_string(), "010");
        assert_eq!(stream.next_sdp().unwrap().to_string(), "001");
        assert!(!stream.has_next());
        assert!(stream.next_sdp().is_err());
    }

    #[test]
    fn position_stream_reports_extent() {
        let mut stream =
            InMemoryPositionStream::new(4, SequencePosition::from_vec(vec![100, 150, 400]));
        assert_eq!(stream.min_position().unwrap(), 100);
        assert_eq!(stream.extent_in_base_pairs(), 301);
        assert_eq!(stream.next_position().unwrap().unwrap(), 100);
        assert!(stream.has_next());
    }
}
