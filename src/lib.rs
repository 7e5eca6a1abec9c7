//! Compatible-interval scanning and perfect phylogeny inference for inbred strain genotypes.
//!
//! Genotype calls enter as [`variants::GenotypeData`] or as external [`streams::SdpStream`]s.
//! The [`scan`] module partitions a chromosome into intervals whose strain distribution patterns
//! fit a single mutation tree, [`phylogeny`] builds those trees, and [`haplotypes`] groups strains
//! into shared haplotypes.

pub mod cache;
pub mod config;
pub mod convenience;
pub mod error;
pub mod haplotypes;
pub mod intervals;
pub mod phylogeny;
pub mod scan;
pub mod sdp;
pub mod streams;
pub mod variants;
