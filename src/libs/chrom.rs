//! Chromosome names.
//!
//! Vendor files, refGene tables and BED files spell the same chromosome as
//! `1`, `chr1` or occasionally lower case `chrx`. The capture QC tools only
//! consider the autosomes 1-22 plus X and Y.

use lazy_static::lazy_static;
use regex::Regex;
use std::cmp::Ordering;

lazy_static! {
    static ref RE_CANONICAL: Regex = Regex::new(r"^(?:chr)?([1-9]|1[0-9]|2[0-2]|X|Y)$").unwrap();
}

/// Drops a leading `chr`.
///
/// ```
/// assert_eq!(capqc::libs::chrom::strip_chr("chr7"), "7");
/// assert_eq!(capqc::libs::chrom::strip_chr("X"), "X");
/// ```
pub fn strip_chr(chrom: &str) -> &str {
    chrom.strip_prefix("chr").unwrap_or(chrom)
}

/// `true` for 1-22, X and Y, with or without the `chr` prefix.
pub fn is_canonical(chrom: &str) -> bool {
    RE_CANONICAL.is_match(chrom)
}

/// Canonical name without prefix, e.g. `chr2` => `2`; `None` for anything
/// else (contigs, alt haplotypes, mitochondria, header words).
pub fn canonical(chrom: &str) -> Option<&str> {
    RE_CANONICAL
        .captures(chrom)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Natural ordering: numbers by value, then everything else by name.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    sort_key(a).cmp(&sort_key(b))
}

fn sort_key(chrom: &str) -> (u8, u32, &str) {
    let name = strip_chr(chrom);
    match name.parse::<u32>() {
        Ok(n) => (0, n, ""),
        Err(_) => (1, 0, name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_names() {
        assert!(is_canonical("1"));
        assert!(is_canonical("chr22"));
        assert!(is_canonical("chrX"));
        assert!(is_canonical("Y"));

        assert!(!is_canonical("23"));
        assert!(!is_canonical("0"));
        assert!(!is_canonical("chrM"));
        assert!(!is_canonical("chr6_cox_hap2"));
        assert!(!is_canonical("chrm"));

        assert_eq!(canonical("chr14"), Some("14"));
        assert_eq!(canonical("chrUn_gl000220"), None);
    }

    #[test]
    fn natural_order() {
        let mut chroms = vec!["chr10", "chrX", "chr2", "chr1", "chrY", "chr22"];
        chroms.sort_by(|a, b| natural_cmp(a, b));
        assert_eq!(chroms, vec!["chr1", "chr2", "chr10", "chr22", "chrX", "chrY"]);

        let mut chroms = vec!["X", "10", "9"];
        chroms.sort_by(|a, b| natural_cmp(a, b));
        assert_eq!(chroms, vec!["9", "10", "X"]);
    }
}
