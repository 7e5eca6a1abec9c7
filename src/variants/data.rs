use super::{ChromosomeId, SequencePosition, SnpSite, StrainGenotypes};
use crate::sdp::Sdp;
use crate::streams::{InMemoryPositionStream, InMemorySdpStream};
use std::ops::Index;

/// Holds the genotype calls of a set of strains on one chromosome.
/// The data is the source of the SDP and position streams consumed by the scanners, and of the
/// per-strain call arrays used by the offline phylogeny builder and pairwise IBS search.
#[derive(Clone, Debug)]
pub struct GenotypeData {
    strain_names: Vec<String>,
    chromosome: ChromosomeId,
    sites: Vec<SnpSite>,
}

impl GenotypeData {
    pub(super) fn new(
        strain_names: Vec<String>,
        chromosome: ChromosomeId,
        sites: Vec<SnpSite>,
    ) -> Self {
        Self {
            strain_names,
            chromosome,
            sites,
        }
    }

    pub fn strain_names(&self) -> &[String] {
        &self.strain_names
    }

    pub fn chromosome(&self) -> ChromosomeId {
        self.chromosome
    }

    /// Get the number of SNPs in the collection
    pub fn len(&self) -> usize {
        self.sites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }

    /// Iterate through the [`SnpSite`]s in this instance
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &SnpSite> + DoubleEndedIterator + '_ {
        self.sites.iter()
    }

    /// Base-pair positions of all SNPs, in SNP index order
    pub fn positions(&self) -> Vec<SequencePosition> {
        self.sites.iter().map(|s| s.position).collect()
    }

    /// Raw SDPs relative to strain 0, in SNP index order
    pub fn raw_sdps(&self) -> Vec<Sdp> {
        self.sites.iter().map(|s| s.raw_sdp(0)).collect()
    }

    /// A forward SDP stream over all SNPs
    pub fn sdp_stream(&self) -> InMemorySdpStream {
        InMemorySdpStream::forward(self.raw_sdps(), self.strain_names.clone())
    }

    /// An SDP stream presenting the SNPs back-to-front
    pub fn reverse_sdp_stream(&self) -> InMemorySdpStream {
        InMemorySdpStream::reverse(self.raw_sdps(), self.strain_names.clone())
    }

    /// A position stream running in lockstep with [`Self::sdp_stream`]
    pub fn position_stream(&self) -> InMemoryPositionStream {
        InMemoryPositionStream::new(self.chromosome, self.positions())
    }

    /// Convert the SNP sites into per-strain call arrays by transposing the data.
    /// Data is copied, so the genotype data can still be used after this method is called.
    pub fn strains(&self) -> Vec<StrainGenotypes> {
        let mut calls = vec![Vec::with_capacity(self.sites.len()); self.strain_names.len()];
        for site in &self.sites {
            for (strain, call) in site.calls.iter().enumerate() {
                calls[strain].push(*call);
            }
        }

        self.strain_names
            .iter()
            .zip(calls)
            .map(|(name, calls)| StrainGenotypes::new(name.clone(), calls))
            .collect()
    }
}

/// Index genotype data by SNP index.
impl Index<usize> for GenotypeData {
    type Output = SnpSite;

    fn index(&self, index: usize) -> &Self::Output {
        &self.sites[index]
    }
}
