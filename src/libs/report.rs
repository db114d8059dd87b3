//! Per-gene and overall coverage reports.

use crate::libs::error::CapqcError;
use crate::libs::index::{ReferenceIndex, TranscriptRecord};
use std::collections::BTreeMap;
use std::fmt;
use std::io::Write;

pub const PER_REFGENE_HEADER: [&str; 7] = [
    "gene",
    "refgene",
    "total_bases_targeted",
    "length_of_gene",
    "fraction_of_gene_covered",
    "exons_with_any_coverage",
    "total_exons_in_gene",
];

/// One line of the preferred-transcript list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreferredTranscript {
    pub gene: String,
    /// As written, possibly with a version suffix
    pub refseq: String,
}

impl PreferredTranscript {
    /// Accession without its version, `NM_000546.5` => `NM_000546`
    pub fn accession(&self) -> &str {
        self.refseq.split('.').next().unwrap_or_default()
    }

    /// The header row names the transcript column `RefSeq`
    pub fn is_header(&self) -> bool {
        self.accession().eq_ignore_ascii_case("refseq")
    }
}

/// Reads a `gene<TAB>transcript` list; the header row is dropped.
///
/// Rows with a gene but no transcript keep an empty `refseq`.
pub fn read_preferred(input: &str) -> anyhow::Result<Vec<PreferredTranscript>> {
    let mut list = vec![];
    for (lineno, line) in crate::libs::io::read_lines(input)? {
        let fields: Vec<&str> = line.split('\t').collect();
        let gene = fields[0].trim();
        if gene.is_empty() {
            return Err(CapqcError::format(lineno, "empty gene name in preferred transcripts").into());
        }
        let entry = PreferredTranscript {
            gene: gene.to_string(),
            refseq: fields.get(1).map(|s| s.trim()).unwrap_or_default().to_string(),
        };
        if entry.is_header() {
            continue;
        }
        list.push(entry);
    }
    Ok(list)
}

/// Coverage of one gene, or why it could not be computed.
#[derive(Debug, Clone, PartialEq)]
pub enum GeneStatus {
    Covered {
        bases: i64,
        length: i64,
        fraction: f64,
        exons_covered: usize,
        exons_total: usize,
    },
    RefSeqNotFound,
    IncorrectRefSeq,
}

impl GeneStatus {
    pub fn from_record(record: &TranscriptRecord) -> Self {
        let length = record.len();
        GeneStatus::Covered {
            bases: record.bases_covered,
            length,
            fraction: round3(record.bases_covered as f64 / length as f64),
            exons_covered: record.exons.covered(),
            exons_total: record.exons.total(),
        }
    }

    pub fn bases(&self) -> i64 {
        match self {
            GeneStatus::Covered { bases, .. } => *bases,
            _ => 0,
        }
    }
}

fn round3(x: f64) -> f64 {
    (x * 1000.0).round() / 1000.0
}

#[derive(Debug, Clone, PartialEq)]
pub struct GeneRow {
    pub gene: String,
    pub refgene: String,
    pub status: GeneStatus,
}

impl fmt::Display for GeneRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\t{}\t", self.gene, self.refgene)?;
        match &self.status {
            GeneStatus::Covered {
                bases,
                length,
                fraction,
                exons_covered,
                exons_total,
            } => write!(
                f,
                "{}\t{}\t{:?}\t{}\t{}",
                bases, length, fraction, exons_covered, exons_total
            ),
            GeneStatus::RefSeqNotFound => write!(f, "RefSeq not found\tNA\tNA\tNA\tNA"),
            GeneStatus::IncorrectRefSeq => {
                write!(f, "Incorrect RefSeq for this Gene\tNA\tNA\tNA\tNA")
            }
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PerGeneReport {
    /// Keyed and therefore ordered by gene name
    pub rows: BTreeMap<String, GeneRow>,
    /// Genes with at least one base targeted
    pub gene_count: usize,
    /// Sum of bases targeted over reported genes
    pub coding_bases: i64,
}

impl PerGeneReport {
    /// Classifies every preferred gene, then adds genes the probes hit
    /// without being asked for.
    pub fn build(preferred: &[PreferredTranscript], index: &ReferenceIndex) -> Self {
        let mut report = Self::default();

        for entry in preferred.iter().filter(|e| !e.is_header()) {
            let accession = entry.accession();
            let row = match index.get(accession) {
                None => {
                    let err = CapqcError::TranscriptNotFound(accession.to_string());
                    log::warn!("{} (requested for {})", err, entry.gene);
                    GeneRow {
                        gene: entry.gene.clone(),
                        refgene: entry.refseq.clone(),
                        status: GeneStatus::RefSeqNotFound,
                    }
                }
                Some(record) if record.gene != entry.gene => {
                    let err = CapqcError::GeneMismatch {
                        transcript: accession.to_string(),
                        requested: entry.gene.clone(),
                        found: record.gene.clone(),
                    };
                    log::warn!("{}", err);
                    GeneRow {
                        gene: entry.gene.clone(),
                        refgene: entry.refseq.clone(),
                        status: GeneStatus::IncorrectRefSeq,
                    }
                }
                Some(record) => {
                    report.tally(record);
                    GeneRow {
                        gene: entry.gene.clone(),
                        refgene: accession.to_string(),
                        status: GeneStatus::from_record(record),
                    }
                }
            };
            report.rows.insert(entry.gene.clone(), row);
        }

        // incidental coverage
        for record in index.iter() {
            if report.rows.contains_key(&record.gene) || record.bases_covered <= 0 {
                continue;
            }
            report.tally(record);
            report.rows.insert(
                record.gene.clone(),
                GeneRow {
                    gene: record.gene.clone(),
                    refgene: record.transcript.clone(),
                    status: GeneStatus::from_record(record),
                },
            );
        }

        report
    }

    fn tally(&mut self, record: &TranscriptRecord) {
        if record.bases_covered > 0 {
            self.gene_count += 1;
        }
        self.coding_bases += record.bases_covered;
    }

    /// Writes the header and one row per gene, sorted by gene name.
    pub fn write_to(&self, writer: &mut dyn Write) -> anyhow::Result<()> {
        writer.write_fmt(format_args!("{}\n", PER_REFGENE_HEADER.join("\t")))?;
        for row in self.rows.values() {
            writer.write_fmt(format_args!("{}\n", row))?;
        }
        Ok(())
    }
}

/// Total bases in a BED file, Σ(end - start) over its rows.
///
/// Run on the merged probe set this is the number of unique bases targeted,
/// whatever genes they fall in.
pub fn calculate_total_covered(input: &str) -> anyhow::Result<i64> {
    let regions = crate::libs::bed::read_regions(input)?;
    Ok(regions.iter().map(|r| r.len()).sum())
}

#[derive(Debug, Clone, Default)]
pub struct OverallSummary {
    pub total_bases: i64,
    pub coding_bases: i64,
    pub gene_count: usize,
    /// Probe rows that hit no reference gene, verbatim
    pub intergenic: Vec<String>,
}

impl OverallSummary {
    pub fn write_to(&self, writer: &mut dyn Write) -> anyhow::Result<()> {
        writer.write_fmt(format_args!(
            "{} unique bases were targeted\n",
            self.total_bases
        ))?;
        writer.write_fmt(format_args!(
            "{} unique bases within gene boundaries were targeted\n",
            self.coding_bases
        ))?;
        writer.write_fmt(format_args!(
            "{} unique refgenes had at least one base targeted\n",
            self.gene_count
        ))?;
        writer.write_all(
            b"The following probes did not intersect with transcription region of any UCSC gene:\n",
        )?;
        for line in &self.intergenic {
            writer.write_fmt(format_args!("{}\n", line))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::libs::bed::RefGeneBed;

    fn index() -> ReferenceIndex {
        let rows: Vec<RefGeneBed> = [
            "X\t1000\t2000\tRPL10\tNM_006013\t1\t1000\t1000\t2000",
            "14\t5000\t9000\tFOXA1\tNM_004496\t2\t1000,1000\t5000,8000\t6000,9000",
            "1\t100\t400\tMEGF6\tNM_001409\t1\t300\t100\t400",
            "1\t500\t600\tMEGF6\tNM_999999\t1\t100\t500\t600",
        ]
        .iter()
        .map(|l| RefGeneBed::parse(l, 1).unwrap())
        .collect();
        ReferenceIndex::build(&rows).unwrap()
    }

    fn preferred(pairs: &[(&str, &str)]) -> Vec<PreferredTranscript> {
        pairs
            .iter()
            .map(|(g, r)| PreferredTranscript {
                gene: g.to_string(),
                refseq: r.to_string(),
            })
            .collect()
    }

    fn overlap(gene_row: &str, start: i64, end: i64, bases: i64) -> String {
        format!("1\t{}\t{}\t{}\t{}\n", start, end, gene_row, bases)
    }

    #[test]
    fn accession_and_header() {
        let entry = PreferredTranscript {
            gene: "TP53".to_string(),
            refseq: "NM_000546.5".to_string(),
        };
        assert_eq!(entry.accession(), "NM_000546");
        assert!(!entry.is_header());

        let header = PreferredTranscript {
            gene: "Gene".to_string(),
            refseq: "RefSeq".to_string(),
        };
        assert!(header.is_header());
    }

    #[test]
    fn fully_covered_single_exon() {
        let mut index = index();
        let rpl10 = "X\t1000\t2000\tRPL10\tNM_006013\t1\t1000\t1000\t2000";
        let stream = overlap(rpl10, 990, 1500, 500) + &overlap(rpl10, 1500, 2010, 500);
        index.aggregate(&stream).unwrap();

        let report = PerGeneReport::build(&preferred(&[("RPL10", "NM_006013.2")]), &index);
        let row = report.rows.get("RPL10").unwrap();
        assert_eq!(row.refgene, "NM_006013");
        match row.status {
            GeneStatus::Covered {
                bases,
                length,
                fraction,
                exons_covered,
                exons_total,
            } => {
                assert_eq!(bases, 1000);
                assert_eq!(length, 1000);
                assert_eq!(fraction, 1.0);
                assert_eq!(exons_covered, exons_total);
            }
            ref other => panic!("unexpected status {:?}", other),
        }
        assert_eq!(row.to_string(), "RPL10\tNM_006013\t1000\t1000\t1.0\t1\t1");
        assert_eq!(report.gene_count, 1);
        assert_eq!(report.coding_bases, 1000);
    }

    #[test]
    fn sentinel_rows() {
        let index = index();
        let report = PerGeneReport::build(
            &preferred(&[("GPR146", "NM_138445.3"), ("FAKE", "NM_006013")]),
            &index,
        );

        let missing = report.rows.get("GPR146").unwrap();
        assert_eq!(missing.status, GeneStatus::RefSeqNotFound);
        assert_eq!(
            missing.to_string(),
            "GPR146\tNM_138445.3\tRefSeq not found\tNA\tNA\tNA\tNA"
        );

        let wrong = report.rows.get("FAKE").unwrap();
        assert_eq!(wrong.status, GeneStatus::IncorrectRefSeq);
        assert_eq!(
            wrong.to_string(),
            "FAKE\tNM_006013\tIncorrect RefSeq for this Gene\tNA\tNA\tNA\tNA"
        );

        assert_eq!(report.gene_count, 0);
        assert_eq!(report.rows.len(), 2);
    }

    #[test]
    fn uncovered_preferred_gene() {
        let index = index();
        let report = PerGeneReport::build(&preferred(&[("FOXA1", "NM_004496")]), &index);
        let row = report.rows.get("FOXA1").unwrap();
        assert_eq!(row.to_string(), "FOXA1\tNM_004496\t0\t4000\t0.0\t0\t2");
        assert_eq!(report.gene_count, 0);
    }

    #[test]
    fn incidental_coverage() {
        let mut index = index();
        let megf6 = "1\t100\t400\tMEGF6\tNM_001409\t1\t300\t100\t400";
        let megf6_alt = "1\t500\t600\tMEGF6\tNM_999999\t1\t100\t500\t600";
        let stream = overlap(megf6, 150, 250, 100) + &overlap(megf6_alt, 550, 650, 50);
        index.aggregate(&stream).unwrap();

        let report = PerGeneReport::build(&preferred(&[("FOXA1", "NM_004496")]), &index);

        // first transcript of MEGF6 in index order wins
        let row = report.rows.get("MEGF6").unwrap();
        assert_eq!(row.refgene, "NM_001409");
        assert_eq!(row.to_string(), "MEGF6\tNM_001409\t100\t300\t0.333\t1\t1");

        let genes: Vec<&String> = report.rows.keys().collect();
        assert_eq!(genes, vec!["FOXA1", "MEGF6"]);
        assert_eq!(report.gene_count, 1);
        assert_eq!(report.coding_bases, 100);
    }

    #[test]
    fn fraction_in_range() {
        let mut index = index();
        let foxa1 = "14\t5000\t9000\tFOXA1\tNM_004496\t2\t1000,1000\t5000,8000\t6000,9000";
        index
            .aggregate(&overlap(foxa1, 5000, 5333, 333))
            .unwrap();
        let report = PerGeneReport::build(&preferred(&[("FOXA1", "NM_004496")]), &index);
        match report.rows.get("FOXA1").unwrap().status {
            GeneStatus::Covered { fraction, .. } => {
                assert!((0.0..=1.0).contains(&fraction));
                assert_eq!(fraction, 0.083);
            }
            ref other => panic!("unexpected status {:?}", other),
        }
    }

    #[test]
    fn write_reports() {
        let index = index();
        let report = PerGeneReport::build(&preferred(&[("GPR146", "NM_138445")]), &index);
        let mut buf: Vec<u8> = vec![];
        report.write_to(&mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.starts_with("gene\trefgene\ttotal_bases_targeted\t"));
        assert_eq!(text.lines().count(), 2);

        let summary = OverallSummary {
            total_bases: 1504,
            coding_bases: 1384,
            gene_count: 3,
            intergenic: vec!["2\t47617462\t47617582".to_string()],
        };
        let mut buf: Vec<u8> = vec![];
        summary.write_to(&mut buf).unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "1504 unique bases were targeted\n\
             1384 unique bases within gene boundaries were targeted\n\
             3 unique refgenes had at least one base targeted\n\
             The following probes did not intersect with transcription region of any UCSC gene:\n\
             2\t47617462\t47617582\n"
        );
    }
}
