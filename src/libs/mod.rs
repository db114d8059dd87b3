pub mod bed;
pub mod chrom;
pub mod error;
pub mod exon;
pub mod index;
pub mod intervals;
pub mod io;
pub mod probe;
pub mod refgene;
pub mod report;
