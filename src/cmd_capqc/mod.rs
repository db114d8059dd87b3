//! Subcommand modules for the `capqc` binary.

pub mod create_files;
pub mod filter_refgene;
pub mod refgene_positions;
pub mod refgene_to_bed;
pub mod refseq_to_bed;
pub mod summarize_assay;
pub mod xlsx;
