//! Quality control for targeted-sequencing capture assays.
//!
//! The `capqc` binary wraps these modules as subcommands. The coverage
//! accounting behind `capqc summarize-assay` lives in [`libs::index`],
//! [`libs::exon`] and [`libs::report`].

pub mod libs;

pub use crate::libs::io::*;
