use tracing::{debug, instrument};

use crate::error::Result;
use crate::intervals::IndexedInterval;
use crate::sdp::{compatible, normalize, Sdp, SdpHashSet};
use crate::streams::{SdpStream, StreamDirection};

/// The distinct SDPs accepted into the interval currently being grown.
#[derive(Default)]
struct AcceptedSdps {
    ordered: Vec<Sdp>,
    distinct: SdpHashSet<Sdp>,
}

impl AcceptedSdps {
    /// Try to accept an SDP. Returns false if it conflicts with an accepted SDP.
    fn accept(&mut self, sdp: &Sdp) -> bool {
        if self.distinct.contains(sdp) {
            return true;
        }
        if !self.ordered.iter().all(|accepted| compatible(accepted, sdp)) {
            return false;
        }

        self.ordered.push(sdp.clone());
        self.distinct.insert(sdp.clone());
        true
    }

    fn restart_with(&mut self, sdp: Sdp) {
        self.ordered.clear();
        self.distinct.clear();
        self.distinct.insert(sdp.clone());
        self.ordered.push(sdp);
    }
}

/// Partition the stream into maximal compatible intervals, growing each interval as far as
/// possible in reading direction before starting the next one.
///
/// Reverse streams are scanned back-to-front and the found intervals are mapped back onto forward
/// SNP indices, so both directions return intervals in ascending order that exactly tile
/// `0..sdp_count`.
#[instrument(skip_all, fields(direction = ?stream.direction(), sdps = stream.sdp_count()))]
pub fn greedy_scan(stream: &mut dyn SdpStream) -> Result<Vec<IndexedInterval>> {
    let total = stream.sdp_count();
    let mut intervals = Vec::new();
    let mut accepted = AcceptedSdps::default();
    let mut start = 0;
    let mut index = 0;

    while stream.has_next() {
        let sdp = normalize(&stream.next_sdp()?);
        if !accepted.accept(&sdp) {
            intervals.push(IndexedInterval::from_bounds(start, index - 1));
            accepted.restart_with(sdp);
            start = index;
        }
        index += 1;
    }
    if index > start {
        intervals.push(IndexedInterval::from_bounds(start, index - 1));
    }

    if stream.direction() == StreamDirection::Reverse {
        intervals = intervals
            .into_iter()
            .rev()
            .map(|interval| interval.reversed(total))
            .collect();
    }

    debug!(intervals = intervals.len(), "greedy scan finished");
    Ok(intervals)
}
