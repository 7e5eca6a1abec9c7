use tracing::{debug, instrument};

use crate::error::Result;
use crate::intervals::IndexedInterval;
use crate::sdp::{compatible, normalize, Sdp};
use crate::streams::{expect_direction, SdpStream, StreamDirection};

/// A distinct SDP of the current interval together with the last SNP index it was seen at.
struct RecentSdp {
    sdp: Sdp,
    last_seen: usize,
}

/// Find every maximal compatible interval of a forward stream.
///
/// Unlike [`super::greedy_scan`], the result is not a partition: intervals overlap and are
/// anchored at every start point where a maximal interval begins. They serve as candidates for
/// [`super::max_k_scan`].
///
/// The distinct SDPs of the growing interval are kept ordered by the index they were last seen at.
/// A repeated SDP moves to the most recent position. An incompatible SDP closes the current
/// interval, and the next interval starts right after the most recent conflicting SDP, evicting
/// it together with everything seen before it.
#[instrument(skip_all, fields(sdps = stream.sdp_count()))]
pub fn uber_scan(stream: &mut dyn SdpStream) -> Result<Vec<IndexedInterval>> {
    expect_direction(stream, StreamDirection::Forward, "uber scan")?;

    let mut intervals = Vec::new();
    let mut recent: Vec<RecentSdp> = Vec::new();
    let mut start = 0;
    let mut index = 0;

    while stream.has_next() {
        let sdp = normalize(&stream.next_sdp()?);

        if let Some(seen) = recent.iter().position(|r| r.sdp == sdp) {
            let mut refreshed = recent.remove(seen);
            refreshed.last_seen = index;
            recent.push(refreshed);
        } else {
            if let Some(conflict) = recent.iter().rposition(|r| !compatible(&r.sdp, &sdp)) {
                let conflict_index = recent[conflict].last_seen;
                intervals.push(IndexedInterval::from_bounds(start, index - 1));
                recent.drain(..=conflict);
                start = conflict_index + 1;
            }
            recent.push(RecentSdp {
                sdp,
                last_seen: index,
            });
        }

        index += 1;
    }
    if index > start {
        intervals.push(IndexedInterval::from_bounds(start, index - 1));
    }

    debug!(intervals = intervals.len(), "uber scan finished");
    Ok(intervals)
}
