use crate::variants::GenotypeCall;
use std::ops::{Deref, Index};

/// The genotype calls of one strain along a chromosome, one call per SNP index. The data only
/// makes sense together with a [`super::GenotypeData`] instance that defines which SNP index
/// corresponds to which base-pair position.
#[derive(Clone, Debug, Eq, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct StrainGenotypes {
    name: String,
    calls: Vec<GenotypeCall>,
}

impl StrainGenotypes {
    pub fn new(name: impl Into<String>, calls: Vec<GenotypeCall>) -> Self {
        Self {
            name: name.into(),
            calls,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn calls(&self) -> &[GenotypeCall] {
        &self.calls
    }
}

/// Decay into the underlying call slice
impl Deref for StrainGenotypes {
    type Target = [GenotypeCall];

    fn deref(&self) -> &Self::Target {
        &self.calls
    }
}

impl Index<usize> for StrainGenotypes {
    type Output = GenotypeCall;

    fn index(&self, index: usize) -> &Self::Output {
        &self.calls[index]
    }
}
