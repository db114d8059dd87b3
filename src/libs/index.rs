//! Reference index and coverage aggregation.
//!
//! The index maps transcript accessions to their gene, coordinates, exon
//! tracker and covered-bases counter. It is built once from the
//! reference-gene BED, then mutated by [`ReferenceIndex::process_overlap`]
//! for every overlap record, and finally read by the report builder.

use crate::libs::bed::{RefGeneBed, Region, REFGENE_BED_FIELDS};
use crate::libs::chrom::strip_chr;
use crate::libs::error::CapqcError;
use crate::libs::exon::ExonTracker;
use indexmap::IndexMap;

#[derive(Debug, Clone)]
pub struct TranscriptRecord {
    pub transcript: String,
    pub gene: String,
    pub chrom: String,
    pub start: i64,
    pub end: i64,
    pub exons: ExonTracker,
    /// Overlap bases attributed to this transcript
    pub bases_covered: i64,
}

impl TranscriptRecord {
    /// Checks the exon invariants of `row` and builds a record with no coverage.
    pub fn from_bed(row: &RefGeneBed, lineno: usize) -> Result<Self, CapqcError> {
        let exons = row.exons();
        if exons.is_empty() {
            return Err(CapqcError::format(
                lineno,
                format!("{} has no exons", row.transcript),
            ));
        }
        if row.end <= row.start {
            return Err(CapqcError::format(
                lineno,
                format!("{} has an empty span {}-{}", row.transcript, row.start, row.end),
            ));
        }
        for &(start, end) in exons.iter() {
            if start >= end {
                return Err(CapqcError::format(
                    lineno,
                    format!("{}: exon start {} >= end {}", row.transcript, start, end),
                ));
            }
            if start < row.start || end > row.end {
                return Err(CapqcError::format(
                    lineno,
                    format!(
                        "{}: exon {}-{} outside {}-{}",
                        row.transcript, start, end, row.start, row.end
                    ),
                ));
            }
        }

        Ok(Self {
            transcript: row.transcript.clone(),
            gene: row.gene.clone(),
            chrom: strip_chr(&row.chrom).to_string(),
            start: row.start,
            end: row.end,
            exons: ExonTracker::new(&exons),
            bases_covered: 0,
        })
    }

    pub fn len(&self) -> i64 {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.len() <= 0
    }
}

/// One line of `intersect -wo` output: probe fields, the nine reference-gene
/// BED fields, and the number of overlapping bases.
#[derive(Debug, Clone)]
pub struct OverlapRecord {
    pub probe: Region,
    pub gene: RefGeneBed,
    pub overlap: i64,
}

impl OverlapRecord {
    /// Fields are taken from the right, so probe files with any number of
    /// columns (3 or more) are accepted.
    pub fn parse(line: &str, lineno: usize) -> Result<Self, CapqcError> {
        let fields: Vec<&str> = line.trim_end_matches('\r').split('\t').collect();
        let n_gene = REFGENE_BED_FIELDS.len();
        if fields.len() < 3 + n_gene + 1 {
            return Err(CapqcError::ExternalTool(format!(
                "overlap record {}: expected at least {} columns, found {}",
                lineno,
                3 + n_gene + 1,
                fields.len()
            )));
        }

        let unparsable =
            |e: CapqcError| CapqcError::ExternalTool(format!("overlap record {}: {}", lineno, e));

        let overlap_at = fields.len() - 1;
        let gene_at = overlap_at - n_gene;

        let probe = Region::parse(&fields[..gene_at].join("\t"), lineno).map_err(unparsable)?;
        let gene = RefGeneBed::from_fields(&fields[gene_at..overlap_at], lineno)
            .map_err(unparsable)?;
        let overlap = fields[overlap_at].trim().parse::<i64>().map_err(|_| {
            CapqcError::ExternalTool(format!(
                "overlap record {}: overlap length {:?} is not an integer",
                lineno, fields[overlap_at]
            ))
        })?;

        Ok(Self {
            probe,
            gene,
            overlap,
        })
    }
}

/// Counts from one aggregation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AggregateStats {
    pub records: usize,
    pub not_found: usize,
}

#[derive(Debug, Clone, Default)]
pub struct ReferenceIndex {
    transcripts: IndexMap<String, TranscriptRecord>,
    duplicates: Vec<String>,
}

impl ReferenceIndex {
    pub fn new() -> Self {
        Default::default()
    }

    /// Builds the index from reference-gene BED rows. Malformed rows are
    /// fatal; repeated transcripts keep their first row.
    pub fn build(rows: &[RefGeneBed]) -> Result<Self, CapqcError> {
        let mut index = Self::new();
        for (i, row) in rows.iter().enumerate() {
            index.add(row, i + 1)?;
        }
        Ok(index)
    }

    pub fn from_file(input: &str) -> anyhow::Result<Self> {
        let mut index = Self::new();
        for (lineno, line) in crate::libs::io::read_lines(input)? {
            let row = RefGeneBed::parse(&line, lineno)?;
            index.add(&row, lineno)?;
        }
        Ok(index)
    }

    fn add(&mut self, row: &RefGeneBed, lineno: usize) -> Result<(), CapqcError> {
        if self.transcripts.contains_key(&row.transcript) {
            let warning = CapqcError::DuplicateTranscript(row.transcript.clone());
            log::warn!("{} (line {}), keeping the first entry", warning, lineno);
            self.duplicates.push(row.transcript.clone());
            return Ok(());
        }

        let record = TranscriptRecord::from_bed(row, lineno)?;
        self.transcripts.insert(row.transcript.clone(), record);
        Ok(())
    }

    pub fn get(&self, transcript: &str) -> Option<&TranscriptRecord> {
        self.transcripts.get(transcript)
    }

    pub fn len(&self) -> usize {
        self.transcripts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transcripts.is_empty()
    }

    /// Records in the order transcripts were first seen
    pub fn iter(&self) -> impl Iterator<Item = &TranscriptRecord> {
        self.transcripts.values()
    }

    /// Transcript IDs that appeared more than once in the reference
    pub fn duplicates(&self) -> &[String] {
        &self.duplicates
    }

    /// Attributes one overlap record to its transcript: the overlap length
    /// goes to the covered-bases counter and the probe interval to the exon
    /// tracker.
    pub fn process_overlap(&mut self, record: &OverlapRecord) -> Result<(), CapqcError> {
        let entry = self
            .transcripts
            .get_mut(&record.gene.transcript)
            .ok_or_else(|| CapqcError::TranscriptNotFound(record.gene.transcript.clone()))?;

        entry.bases_covered += record.overlap;
        entry.exons.insert(record.probe.start, record.probe.end);
        Ok(())
    }

    /// Runs every line of an `intersect -wo` stream through
    /// [`process_overlap`](Self::process_overlap). Unknown transcripts are
    /// logged and skipped; unparsable lines are fatal.
    pub fn aggregate(&mut self, overlaps: &str) -> Result<AggregateStats, CapqcError> {
        let mut stats = AggregateStats::default();
        for (i, line) in overlaps.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let record = OverlapRecord::parse(line, i + 1)?;
            stats.records += 1;

            match self.process_overlap(&record) {
                Ok(()) => {}
                Err(e) if !e.is_fatal() => {
                    log::warn!("{}; overlap record {} skipped", e, i + 1);
                    stats.not_found += 1;
                }
                Err(e) => return Err(e),
            }
        }
        Ok(stats)
    }
}
