use std::cmp::Ordering;
use std::fmt::{Debug, Display, Formatter};
use std::hash::BuildHasherDefault;
use std::str::FromStr;

use twox_hash::XxHash64;

mod compatibility;

pub use compatibility::{all_compatible, compatible, normalize};

/// Hash map keyed by SDPs (or anything else) using the xxHash hasher
pub type SdpHashMap<K, V> = std::collections::HashMap<K, V, BuildHasherDefault<XxHash64>>;

/// Hash set of SDPs using the xxHash hasher
pub type SdpHashSet<K> = std::collections::HashSet<K, BuildHasherDefault<XxHash64>>;

const WORD_BITS: usize = 64;

/// A strain distribution pattern: one bit per strain at a single SNP position. Bit `i` belongs to
/// the strain with index `i` in the stream's strain order.
///
/// The bits are packed into `u64` words. Bits beyond the strain count are always zero, so derived
/// equality and hashing only depend on the strain bits.
#[derive(Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Sdp {
    words: Vec<u64>,
    strain_count: usize,
}

impl Sdp {
    /// An SDP in which no strain carries the bit.
    pub fn zeros(strain_count: usize) -> Self {
        Self {
            words: vec![0; strain_count.div_ceil(WORD_BITS)],
            strain_count,
        }
    }

    /// An SDP in which every strain carries the bit.
    pub fn ones(strain_count: usize) -> Self {
        let mut sdp = Self {
            words: vec![u64::MAX; strain_count.div_ceil(WORD_BITS)],
            strain_count,
        };
        sdp.clear_tail();
        sdp
    }

    /// Create an SDP from one boolean per strain.
    pub fn from_bools(bits: &[bool]) -> Self {
        let mut sdp = Self::zeros(bits.len());
        bits.iter()
            .enumerate()
            .filter(|&(_, &b)| b)
            .for_each(|(i, _)| sdp.set(i, true));
        sdp
    }

    /// Create an SDP with the bits of the given strain indices set.
    ///
    /// # Panics
    /// If any index is not smaller than `strain_count`
    pub fn from_strain_indices(strain_count: usize, indices: impl IntoIterator<Item = usize>) -> Self {
        let mut sdp = Self::zeros(strain_count);
        for i in indices {
            sdp.set(i, true);
        }
        sdp
    }

    /// The number of strains covered by this SDP (set or not).
    pub fn strain_count(&self) -> usize {
        self.strain_count
    }

    /// Get the bit of a strain.
    pub fn get(&self, strain: usize) -> bool {
        assert!(strain < self.strain_count, "strain index {strain} out of range");
        self.words[strain / WORD_BITS] & (1u64 << (strain % WORD_BITS)) != 0
    }

    /// Set or clear the bit of a strain.
    pub fn set(&mut self, strain: usize, value: bool) {
        assert!(strain < self.strain_count, "strain index {strain} out of range");
        let mask = 1u64 << (strain % WORD_BITS);
        if value {
            self.words[strain / WORD_BITS] |= mask;
        } else {
            self.words[strain / WORD_BITS] &= !mask;
        }
    }

    /// Number of strains whose bit is set.
    pub fn count_ones(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Whether no strain has its bit set. Such an SDP carries no mutation.
    pub fn is_zero(&self) -> bool {
        self.words.iter().all(|&w| w == 0)
    }

    /// Whether every strain has its bit set.
    pub fn is_full(&self) -> bool {
        self.count_ones() == self.strain_count
    }

    pub fn intersection(&self, other: &Sdp) -> Sdp {
        self.zip_words(other, |a, b| a & b)
    }

    pub fn union(&self, other: &Sdp) -> Sdp {
        self.zip_words(other, |a, b| a | b)
    }

    /// Strains set in `self` but not in `other`.
    pub fn difference(&self, other: &Sdp) -> Sdp {
        self.zip_words(other, |a, b| a & !b)
    }

    /// Flip every strain bit.
    pub fn complement(&self) -> Sdp {
        let mut sdp = Self {
            words: self.words.iter().map(|w| !w).collect(),
            strain_count: self.strain_count,
        };
        sdp.clear_tail();
        sdp
    }

    /// Whether at least one strain is set in both SDPs.
    pub fn intersects(&self, other: &Sdp) -> bool {
        self.debug_check_width(other);
        self.words
            .iter()
            .zip(other.words.iter())
            .any(|(a, b)| a & b != 0)
    }

    pub fn is_disjoint(&self, other: &Sdp) -> bool {
        !self.intersects(other)
    }

    /// Whether every strain set in `self` is also set in `other`.
    pub fn is_subset_of(&self, other: &Sdp) -> bool {
        self.debug_check_width(other);
        self.words
            .iter()
            .zip(other.words.iter())
            .all(|(a, b)| a & !b == 0)
    }

    pub fn is_proper_subset_of(&self, other: &Sdp) -> bool {
        self != other && self.is_subset_of(other)
    }

    /// Iterate over the indices of all set strains in ascending order.
    pub fn iter_ones(&self) -> impl Iterator<Item = usize> + '_ {
        self.words.iter().enumerate().flat_map(|(w, &word)| {
            let mut remaining = word;
            std::iter::from_fn(move || {
                if remaining == 0 {
                    None
                } else {
                    let bit = remaining.trailing_zeros() as usize;
                    remaining &= remaining - 1;
                    Some(w * WORD_BITS + bit)
                }
            })
        })
    }

    fn zip_words(&self, other: &Sdp, op: impl Fn(u64, u64) -> u64) -> Sdp {
        self.debug_check_width(other);
        Sdp {
            words: self
                .words
                .iter()
                .zip(other.words.iter())
                .map(|(&a, &b)| op(a, b))
                .collect(),
            strain_count: self.strain_count,
        }
    }

    fn clear_tail(&mut self) {
        let used = self.strain_count % WORD_BITS;
        if used != 0 {
            if let Some(last) = self.words.last_mut() {
                *last &= (1u64 << used) - 1;
            }
        }
    }

    #[inline]
    fn debug_check_width(&self, other: &Sdp) {
        debug_assert_eq!(
            self.strain_count, other.strain_count,
            "SDPs over different strain sets"
        );
    }
}

/// SDPs are ordered strain by strain starting at strain 0: at the first strain where two SDPs
/// differ, the one with the bit set is greater. A proper superset is therefore always greater than
/// its subsets.
impl Ord for Sdp {
    fn cmp(&self, other: &Self) -> Ordering {
        for (a, b) in self.words.iter().zip(other.words.iter()) {
            let diff = a ^ b;
            if diff != 0 {
                let lowest = diff & diff.wrapping_neg();
                return if a & lowest != 0 {
                    Ordering::Greater
                } else {
                    Ordering::Less
                };
            }
        }
        self.strain_count.cmp(&other.strain_count)
    }
}

impl PartialOrd for Sdp {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Formats the SDP as a string of `0` and `1`, character `i` being strain `i`.
impl Display for Sdp {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for i in 0..self.strain_count {
            f.write_str(if self.get(i) { "1" } else { "0" })?;
        }
        Ok(())
    }
}

impl Debug for Sdp {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Sdp({self})")
    }
}

/// Parse the format written by [`Display`]: one `0` or `1` per strain.
impl FromStr for Sdp {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bits = s
            .chars()
            .map(|c| match c {
                '0' => Ok(false),
                '1' => Ok(true),
                other => Err(format!("invalid SDP character {other:?} in {s:?}")),
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Sdp::from_bools(&bits))
    }
}
