use crate::sdp::Sdp;
use crate::variants::SequencePosition;

/// A genotype call of one inbred strain at one SNP.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum GenotypeCall {
    /// Homozygous for the first allele
    A,
    /// Homozygous for the second allele
    B,
    Heterozygous,
    NoCall,
}

impl GenotypeCall {
    /// Whether the call names a single homozygous allele. Only such calls take part in SDPs and
    /// identity-by-state comparisons.
    pub fn is_informative(&self) -> bool {
        matches!(self, GenotypeCall::A | GenotypeCall::B)
    }
}

/// A single SNP defined by the genotype calls of every strain and its position in the genome.
#[derive(Clone, Debug)]
pub struct SnpSite {
    pub(crate) calls: Vec<GenotypeCall>,
    pub(crate) position: SequencePosition,
}

impl SnpSite {
    pub fn new(calls: Vec<GenotypeCall>, position: SequencePosition) -> Self {
        Self { calls, position }
    }

    pub fn calls(&self) -> &[GenotypeCall] {
        &self.calls
    }

    pub fn position(&self) -> SequencePosition {
        self.position
    }

    /// The raw strain distribution pattern relative to a reference strain: a strain's bit is set if
    /// its call differs from the reference call. Strains without an informative call, or every
    /// strain if the reference has none, are left unset.
    pub fn raw_sdp(&self, reference: usize) -> Sdp {
        sdp_relative_to(&self.calls, reference)
    }

    /// Whether every strain has a homozygous call at this SNP.
    pub fn is_fully_called(&self) -> bool {
        self.calls.iter().all(GenotypeCall::is_informative)
    }
}

/// Mark every strain whose informative call differs from the informative call of `reference`.
pub(crate) fn sdp_relative_to(calls: &[GenotypeCall], reference: usize) -> Sdp {
    let mut sdp = Sdp::zeros(calls.len());
    let reference_call = calls[reference];
    if !reference_call.is_informative() {
        return sdp;
    }

    calls
        .iter()
        .enumerate()
        .filter(|&(_, call)| call.is_informative() && *call != reference_call)
        .for_each(|(strain, _)| sdp.set(strain, true));
    sdp
}

#[cfg(test)]
mod tests {
    use super::*;
    use GenotypeCall::*;

    #[test]
    fn raw_sdp_marks_strains_differing_from_reference() {
        let site = SnpSite::new(vec![A, B, A, B], SequencePosition::from_u64(10));
        assert_eq!(site.raw_sdp(0).to_string(), "0101");
        assert_eq!(site.raw_sdp(1).to_string(), "1010");
    }

    #[test]
    fn uninformative_calls_never_set_bits() {
        let site = SnpSite::new(vec![A, NoCall, Heterozygous, B], SequencePosition::from_u64(10));
        assert_eq!(site.raw_sdp(0).to_string(), "0001");
        assert!(!site.is_fully_called());

        let site = SnpSite::new(vec![NoCall, B, B], SequencePosition::from_u64(10));
        assert!(site.raw_sdp(0).is_zero());
    }
}
