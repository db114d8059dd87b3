//! BED-like records.
//!
//! Two flavours are used by the capture QC tools:
//!
//! * [`Region`]: `chrom start end [extra...]`, probes and merged probe sets.
//! * [`RefGeneBed`]: the nine-column reference-gene BED written by
//!   `capqc refseq-to-bed` and read by `capqc summarize-assay`:
//!   `chrom chromStart chromEnd name refgene exonCount exonSizes exonStarts exonEnds`.
//!
//! Coordinates are 0-based and half-open.

use crate::libs::error::CapqcError;
use crate::libs::refgene::{join_int_list, parse_int_list};
use std::fmt;

pub const REFGENE_BED_FIELDS: [&str; 9] = [
    "chrom",
    "chromStart",
    "chromEnd",
    "name",
    "refgene",
    "exonCount",
    "exonSizes",
    "exonStarts",
    "exonEnds",
];

/// A genomic interval plus whatever columns followed it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Region {
    pub chrom: String,
    pub start: i64,
    pub end: i64,
    pub extra: Vec<String>,
}

impl Region {
    pub fn new(chrom: &str, start: i64, end: i64) -> Self {
        Self {
            chrom: chrom.to_string(),
            start,
            end,
            extra: vec![],
        }
    }

    pub fn len(&self) -> i64 {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// Parses a tab-delimited line. `lineno` is only used in error messages.
    pub fn parse(line: &str, lineno: usize) -> Result<Self, CapqcError> {
        let fields: Vec<&str> = line.trim_end_matches('\r').split('\t').collect();
        if fields.len() < 3 {
            return Err(CapqcError::format(
                lineno,
                format!("expected chrom, start, end; found {} column(s)", fields.len()),
            ));
        }

        Ok(Self {
            chrom: fields[0].to_string(),
            start: parse_coord(fields[1], lineno)?,
            end: parse_coord(fields[2], lineno)?,
            extra: fields[3..].iter().map(|s| s.to_string()).collect(),
        })
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\t{}\t{}", self.chrom, self.start, self.end)?;
        for field in &self.extra {
            write!(f, "\t{}", field)?;
        }
        Ok(())
    }
}

pub fn parse_coord(s: &str, lineno: usize) -> Result<i64, CapqcError> {
    s.trim()
        .parse::<i64>()
        .map_err(|_| CapqcError::format(lineno, format!("not a coordinate: {:?}", s)))
}

/// Reads a BED file into regions, skipping blank lines, comments and
/// `track`/`browser` lines.
pub fn read_regions(input: &str) -> anyhow::Result<Vec<Region>> {
    let mut regions = vec![];
    for (lineno, line) in crate::libs::io::read_lines(input)? {
        if line.starts_with("track") || line.starts_with("browser") {
            continue;
        }
        regions.push(Region::parse(&line, lineno)?);
    }
    Ok(regions)
}

/// One transcript of the reference-gene BED.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefGeneBed {
    pub chrom: String,
    pub start: i64,
    pub end: i64,
    /// Gene symbol
    pub gene: String,
    /// Transcript accession
    pub transcript: String,
    pub exon_starts: Vec<i64>,
    pub exon_ends: Vec<i64>,
}

impl RefGeneBed {
    /// Parses the nine reference-gene BED fields.
    pub fn from_fields(fields: &[&str], lineno: usize) -> Result<Self, CapqcError> {
        if fields.len() < REFGENE_BED_FIELDS.len() {
            return Err(CapqcError::format(
                lineno,
                format!(
                    "expected {} columns ({}), found {}",
                    REFGENE_BED_FIELDS.len(),
                    REFGENE_BED_FIELDS.join(", "),
                    fields.len()
                ),
            ));
        }

        let exon_count = fields[5].trim().parse::<usize>().map_err(|_| {
            CapqcError::format(lineno, format!("exonCount {:?} is not an integer", fields[5]))
        })?;
        let exon_starts = parse_int_list(fields[7])
            .map_err(|e| CapqcError::format(lineno, e.to_string()))?;
        let exon_ends = parse_int_list(fields[8])
            .map_err(|e| CapqcError::format(lineno, e.to_string()))?;
        if exon_starts.len() != exon_ends.len() {
            return Err(CapqcError::format(
                lineno,
                format!(
                    "{}: {} exon starts but {} exon ends",
                    fields[4],
                    exon_starts.len(),
                    exon_ends.len()
                ),
            ));
        }
        if exon_count != exon_starts.len() {
            return Err(CapqcError::format(
                lineno,
                format!(
                    "{}: exonCount is {} but {} exons are listed",
                    fields[4],
                    exon_count,
                    exon_starts.len()
                ),
            ));
        }

        Ok(Self {
            chrom: fields[0].to_string(),
            start: parse_coord(fields[1], lineno)?,
            end: parse_coord(fields[2], lineno)?,
            gene: fields[3].to_string(),
            transcript: fields[4].to_string(),
            exon_starts,
            exon_ends,
        })
    }

    pub fn parse(line: &str, lineno: usize) -> Result<Self, CapqcError> {
        let fields: Vec<&str> = line.trim_end_matches('\r').split('\t').collect();
        Self::from_fields(&fields, lineno)
    }

    /// Exons as `(start, end)` pairs
    pub fn exons(&self) -> Vec<(i64, i64)> {
        self.exon_starts
            .iter()
            .copied()
            .zip(self.exon_ends.iter().copied())
            .collect()
    }
}

impl fmt::Display for RefGeneBed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sizes: Vec<i64> = self.exons().iter().map(|(s, e)| e - s).collect();
        write!(
            f,
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
            self.chrom,
            self.start,
            self.end,
            self.gene,
            self.transcript,
            self.exon_starts.len(),
            join_int_list(&sizes),
            join_int_list(&self.exon_starts),
            join_int_list(&self.exon_ends),
        )
    }
}

/// Reads the whole reference-gene BED. Any malformed row is fatal.
pub fn read_refgene_bed(input: &str) -> anyhow::Result<Vec<RefGeneBed>> {
    let mut rows = vec![];
    for (lineno, line) in crate::libs::io::read_lines(input)? {
        rows.push(RefGeneBed::parse(&line, lineno)?);
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn region_roundtrip_text() {
        let region = Region::parse("1\t3407032\t3407158\tMEGF6", 1).unwrap();
        assert_eq!(region.chrom, "1");
        assert_eq!(region.len(), 126);
        assert_eq!(region.extra, vec!["MEGF6".to_string()]);
        assert_eq!(region.to_string(), "1\t3407032\t3407158\tMEGF6");
    }

    #[test]
    fn region_errors() {
        let err = Region::parse("1\t100", 4).unwrap_err();
        assert!(matches!(err, CapqcError::Format { line: 4, .. }));

        let err = Region::parse("1\tstart\t200", 2).unwrap_err();
        assert!(err.to_string().contains("not a coordinate"));
    }

    #[test]
    fn refgene_bed_row() {
        let line = "X\t153626571\t153630260\tRPL10\tNM_006013\t1\t3689\t153626571\t153630260";
        let row = RefGeneBed::parse(line, 1).unwrap();
        assert_eq!(row.gene, "RPL10");
        assert_eq!(row.transcript, "NM_006013");
        assert_eq!(row.exons(), vec![(153626571, 153630260)]);
        assert_eq!(row.to_string(), line);
    }

    #[test]
    fn refgene_bed_mismatched_exons() {
        let line = "14\t100\t900\tFOXA1\tNM_004496\t2\t100,100\t100,500\t200";
        let err = RefGeneBed::parse(line, 9).unwrap_err();
        match err {
            CapqcError::Format { line, message } => {
                assert_eq!(line, 9);
                assert!(message.contains("2 exon starts but 1 exon ends"));
            }
            other => panic!("unexpected error {:?}", other),
        }

        let line = "1\t100\t900\tG\tNM_1\t3\t100,100\t100,500\t200,600";
        let err = RefGeneBed::parse(line, 4).unwrap_err();
        assert!(err
            .to_string()
            .contains("line 4: NM_1: exonCount is 3 but 2 exons are listed"));

        let line = "1\t100\t900\tG\tNM_1\ttwo\t100,100\t100,500\t200,600";
        assert!(RefGeneBed::parse(line, 4)
            .unwrap_err()
            .to_string()
            .contains("exonCount \"two\" is not an integer"));
    }
}
