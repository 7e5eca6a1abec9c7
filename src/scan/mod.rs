//! Scans for genome intervals whose SDPs are pairwise compatible.
//!
//! - [`greedy_scan`]: one partition of the stream into maximal intervals, grown greedily in the
//!   reading direction
//! - [`uber_scan`]: every maximal compatible interval
//! - [`max_k_scan`]: combines both into a minimum-size cover of maximal total length

mod greedy;
mod maxk;
mod uber;

pub use greedy::greedy_scan;
pub use maxk::{core_intervals, max_k_scan, select_max_k, uber_cores};
pub use uber::uber_scan;
