use libhaplo::sdp::Sdp;
use libhaplo::streams::InMemorySdpStream;
use libhaplo::variants::{GenotypeCall, GenotypeData, GenotypeDataBuilder};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

#[allow(dead_code)]
pub fn strain_names(count: usize) -> Vec<String> {
    (0..count).map(|i| format!("S{i}")).collect()
}

#[allow(dead_code)]
pub fn sdps(patterns: &[&str]) -> Vec<Sdp> {
    patterns.iter().map(|p| p.parse().unwrap()).collect()
}

#[allow(dead_code)]
pub fn forward(sdps: &[Sdp]) -> InMemorySdpStream {
    let strains = sdps.first().map_or(0, |s| s.strain_count());
    InMemorySdpStream::forward(sdps.to_vec(), strain_names(strains))
}

#[allow(dead_code)]
pub fn reverse(sdps: &[Sdp]) -> InMemorySdpStream {
    let strains = sdps.first().map_or(0, |s| s.strain_count());
    InMemorySdpStream::reverse(sdps.to_vec(), strain_names(strains))
}

/// Build genotype data from 0/1 allele rows, one row per SNP. Positions are 100 base pairs apart.
#[allow(dead_code)]
pub fn create_genotype_data<const S: usize>(chromosome: u8, sites: &[[u8; S]]) -> GenotypeData {
    GenotypeDataBuilder::from_iter(
        strain_names(S),
        chromosome,
        sites.iter().enumerate().map(|(i, site)| {
            let calls = site
                .iter()
                .map(|&allele| if allele == 0 { GenotypeCall::A } else { GenotypeCall::B })
                .collect();
            (calls, 100 * (i as u64 + 1))
        }),
    )
    .finalize()
}

/// A seeded generator of allele columns drawn from a small pool of patterns, so that streams
/// contain runs of compatible SNPs broken up by conflicts.
#[allow(dead_code)]
pub struct RandomGenotypes {
    rng: StdRng,
    strains: usize,
    pool: Vec<Vec<bool>>,
}

#[allow(dead_code)]
impl RandomGenotypes {
    pub fn new(seed: u64, strains: usize, pool_size: usize) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let pool = (0..pool_size)
            .map(|_| (0..strains).map(|_| rng.gen_bool(0.5)).collect())
            .collect();
        Self { rng, strains, pool }
    }

    pub fn column(&mut self) -> Vec<bool> {
        let i = self.rng.gen_range(0..self.pool.len());
        self.pool[i].clone()
    }

    pub fn sdps(&mut self, len: usize) -> Vec<Sdp> {
        (0..len).map(|_| Sdp::from_bools(&self.column())).collect()
    }

    pub fn genotype_data(&mut self, chromosome: u8, len: usize) -> GenotypeData {
        let strains = self.strains;
        let mut position = 0;
        let rows: Vec<(Vec<GenotypeCall>, u64)> = (0..len)
            .map(|_| {
                position += self.rng.gen_range(1..500);
                let calls = self
                    .column()
                    .into_iter()
                    .map(|b| if b { GenotypeCall::B } else { GenotypeCall::A })
                    .collect();
                (calls, position)
            })
            .collect();
        GenotypeDataBuilder::from_iter(strain_names(strains), chromosome, rows).finalize()
    }
}
