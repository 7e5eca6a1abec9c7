use std::io;

use super::{exhausted, SdpStream, SnpPositionStream, StreamDirection};
use crate::error::{HaploError, Result};
use crate::sdp::Sdp;
use crate::variants::{ChromosomeId, SequencePosition};

/// Sending half of a [`ChannelSdpStream`]. A producer that fails to read its source sends the
/// I/O error, which the consuming scan propagates unchanged.
pub type SdpSender = flume::Sender<io::Result<Sdp>>;

/// Sending half of a [`ChannelPositionStream`].
pub type PositionSender = flume::Sender<io::Result<SequencePosition>>;

/// An SDP stream fed by a producer thread. The stream metadata (count, strain order, direction)
/// has to be known when the channel is created; reads block until the producer delivers.
pub struct ChannelSdpStream {
    receiver: flume::Receiver<io::Result<Sdp>>,
    sdp_count: usize,
    strain_names: Vec<String>,
    direction: StreamDirection,
    delivered: usize,
}

impl ChannelSdpStream {
    /// Create a bounded channel holding at most `capacity` SDPs in flight.
    pub fn bounded(
        capacity: usize,
        sdp_count: usize,
        strain_names: Vec<String>,
        direction: StreamDirection,
    ) -> (SdpSender, Self) {
        let (sender, receiver) = flume::bounded(capacity);
        (
            sender,
            Self {
                receiver,
                sdp_count,
                strain_names,
                direction,
                delivered: 0,
            },
        )
    }
}

impl SdpStream for ChannelSdpStream {
    fn sdp_count(&self) -> usize {
        self.sdp_count
    }

    fn strain_names(&self) -> &[String] {
        &self.strain_names
    }

    fn direction(&self) -> StreamDirection {
        self.direction
    }

    fn has_next(&self) -> bool {
        self.delivered < self.sdp_count
    }

    fn next_sdp(&mut self) -> Result<Sdp> {
        if !self.has_next() {
            return Err(exhausted("SDP"));
        }

        let sdp = self
            .receiver
            .recv()
            .map_err(|_| HaploError::StreamClosed {
                delivered: self.delivered,
                expected: self.sdp_count,
            })??;
        self.delivered += 1;
        Ok(sdp)
    }
}

/// A position stream fed by a producer thread, see [`ChannelSdpStream`].
pub struct ChannelPositionStream {
    receiver: flume::Receiver<io::Result<SequencePosition>>,
    chromosome: ChromosomeId,
    min_position: SequencePosition,
    extent: u64,
    position_count: usize,
    delivered: usize,
}

impl ChannelPositionStream {
    /// Create a bounded channel. The chromosome summary (smallest position and extent) is usually
    /// stored in the header of the source the producer reads from.
    pub fn bounded(
        capacity: usize,
        chromosome: ChromosomeId,
        min_position: SequencePosition,
        extent: u64,
        position_count: usize,
    ) -> (PositionSender, Self) {
        let (sender, receiver) = flume::bounded(capacity);
        (
            sender,
            Self {
                receiver,
                chromosome,
                min_position,
                extent,
                position_count,
                delivered: 0,
            },
        )
    }
}

impl SnpPositionStream for ChannelPositionStream {
    fn chromosome(&self) -> ChromosomeId {
        self.chromosome
    }

    fn min_position(&self) -> SequencePosition {
        self.min_position
    }

    fn extent_in_base_pairs(&self) -> u64 {
        self.extent
    }

    fn position_count(&self) -> usize {
        self.position_count
    }

    fn has_next(&self) -> bool {
        self.delivered < self.position_count
    }

    fn next_position(&mut self) -> Result<SequencePosition> {
        if !self.has_next() {
            return Err(exhausted("position"));
        }

        let position = self
            .receiver
            .recv()
            .map_err(|_| HaploError::StreamClosed {
                delivered: self.delivered,
                expected: self.position_count,
            })??;
        self.delivered += 1;
        Ok(position)
    }
}
