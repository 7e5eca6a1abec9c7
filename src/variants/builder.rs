use crate::variants::{ChromosomeId, GenotypeCall, GenotypeData, SequencePosition, SnpSite};

/// A builder for [`GenotypeData`] instances
#[derive(Clone, Debug)]
pub struct GenotypeDataBuilder {
    strain_names: Vec<String>,
    chromosome: ChromosomeId,
    sites: Vec<SnpSite>,
}

impl GenotypeDataBuilder {
    /// A new empty builder for the given strains on one chromosome. The order of the strain names
    /// fixes the strain order of every stream created from the finished data.
    pub fn new(strain_names: Vec<String>, chromosome: ChromosomeId) -> Self {
        Self {
            strain_names,
            chromosome,
            sites: Vec::new(),
        }
    }

    /// Create a builder from an iterator over `(calls, position)` tuples.
    pub fn from_iter(
        strain_names: Vec<String>,
        chromosome: ChromosomeId,
        iter: impl IntoIterator<Item = (Vec<GenotypeCall>, u64)>,
    ) -> Self {
        let mut builder = Self::new(strain_names, chromosome);
        iter.into_iter()
            .for_each(|(calls, position)| builder.add_snp(calls, position));
        builder
    }

    /// Add a SNP to the data.
    ///
    /// # Parameters
    /// - `calls` one [`GenotypeCall`] per strain, in the strain order given to the builder
    /// - `position` the base-pair position of the SNP. SNPs must be added in ascending position
    ///   order.
    ///
    /// # Panics
    /// - if the number of calls differs from the number of strains
    /// - if the position is smaller than the position of the previously added SNP
    pub fn add_snp(&mut self, calls: Vec<GenotypeCall>, position: u64) {
        assert_eq!(
            calls.len(),
            self.strain_names.len(),
            "every SNP needs one call per strain"
        );
        let position = SequencePosition::from_u64(position);
        if let Some(last) = self.sites.last() {
            assert!(last.position <= position, "SNPs must be added in position order");
        }

        self.sites.push(SnpSite::new(calls, position));
    }

    /// Generate [`GenotypeData`] from the current builder state.
    pub fn finalize(self) -> GenotypeData {
        GenotypeData::new(self.strain_names, self.chromosome, self.sites)
    }
}
