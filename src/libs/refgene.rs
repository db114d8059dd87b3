//! Rows of the UCSC `refGene` table.
//!
//! The schema is documented on the UCSC Table Browser ("describe table schema"
//! for track RefSeq Genes, table refGene). Columns:
//!
//! `bin name chrom strand txStart txEnd cdsStart cdsEnd exonCount exonStarts
//! exonEnds score name2 cdsStartStat cdsEndStat exonFrames`

use std::fmt;

pub const REFGENE_FIELDS: [&str; 16] = [
    "bin",
    "name",
    "chrom",
    "strand",
    "txStart",
    "txEnd",
    "cdsStart",
    "cdsEnd",
    "exonCount",
    "exonStarts",
    "exonEnds",
    "score",
    "name2",
    "cdsStartStat",
    "cdsEndStat",
    "exonFrames",
];

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RefGene {
    /// Transcript accession, e.g. `NM_004496`
    pub name: String,
    pub chrom: String,
    pub strand: String,
    pub tx_start: i64,
    pub tx_end: i64,
    pub exon_count: usize,
    pub exon_starts: Vec<i64>,
    pub exon_ends: Vec<i64>,
    /// Gene symbol, e.g. `FOXA1`
    pub name2: String,
    /// The untouched input line, for tools that pass rows through verbatim
    pub line: String,
}

impl RefGene {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn exon_sizes(&self) -> Vec<i64> {
        self.exon_starts
            .iter()
            .zip(self.exon_ends.iter())
            .map(|(s, e)| e - s)
            .collect()
    }
}

/// `"66999638,67091529,"` => `[66999638, 67091529]`
pub fn parse_int_list(s: &str) -> anyhow::Result<Vec<i64>> {
    s.trim()
        .split(',')
        .filter(|v| !v.is_empty())
        .map(|v| {
            v.parse::<i64>()
                .map_err(|_| anyhow::anyhow!("Invalid integer in list: {}", v))
        })
        .collect()
}

/// `[66999638, 67091529]` => `"66999638,67091529"`
pub fn join_int_list(list: &[i64]) -> String {
    list.iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

/// Header lines of table browser downloads start with `#` or a `bin` column
pub fn is_header(line: &str) -> bool {
    line.starts_with('#') || line.split('\t').next().is_some_and(|f| f.contains("bin"))
}

impl std::str::FromStr for RefGene {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = s.trim_end_matches(['\r', '\n']).split('\t').collect();
        if fields.len() < REFGENE_FIELDS.len() {
            return Err(anyhow::anyhow!(
                "Invalid refGene line: expected {} columns ({}), found {}",
                REFGENE_FIELDS.len(),
                REFGENE_FIELDS.join(", "),
                fields.len()
            ));
        }

        let parse_i64 = |s: &str| {
            s.trim()
                .parse::<i64>()
                .map_err(|_| anyhow::anyhow!("Invalid coordinate: {}", s))
        };

        let row = RefGene {
            name: fields[1].to_string(),
            chrom: fields[2].to_string(),
            strand: fields[3].to_string(),
            tx_start: parse_i64(fields[4])?,
            tx_end: parse_i64(fields[5])?,
            exon_count: fields[8]
                .trim()
                .parse::<usize>()
                .map_err(|_| anyhow::anyhow!("Invalid exonCount: {}", fields[8]))?,
            exon_starts: parse_int_list(fields[9])?,
            exon_ends: parse_int_list(fields[10])?,
            name2: fields[12].to_string(),
            line: s.trim_end_matches(['\r', '\n']).to_string(),
        };

        if row.exon_starts.len() != row.exon_ends.len() {
            return Err(anyhow::anyhow!(
                "{}: {} exonStarts but {} exonEnds",
                row.name,
                row.exon_starts.len(),
                row.exon_ends.len()
            ));
        }

        Ok(row)
    }
}

impl fmt::Display for RefGene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    const FOXA1: &str = "875\tNM_004496\tchr14\t-\t38058756\t38064325\t38060569\t38064177\t2\t38058756,38064105,\t38061916,38064325,\t0\tFOXA1\tcmpl\tcmpl\t0,0,";

    #[test]
    fn read_refgene_row() {
        let row = RefGene::from_str(FOXA1).unwrap();
        assert_eq!(row.name, "NM_004496");
        assert_eq!(row.name2, "FOXA1");
        assert_eq!(row.chrom, "chr14");
        assert_eq!(row.strand, "-");
        assert_eq!(row.tx_start, 38058756);
        assert_eq!(row.tx_end, 38064325);
        assert_eq!(row.exon_count, 2);
        assert_eq!(row.exon_starts, vec![38058756, 38064105]);
        assert_eq!(row.exon_ends, vec![38061916, 38064325]);
        assert_eq!(row.exon_sizes(), vec![3160, 220]);
        assert_eq!(row.to_string(), FOXA1);
    }

    #[test]
    fn short_row() {
        let err = RefGene::from_str("875\tNM_004496\tchr14").unwrap_err();
        assert!(err.to_string().contains("expected 16 columns"));
    }

    #[test]
    fn int_lists() {
        let parsed = parse_int_list("66999638,67091529,67098752,67101626").unwrap();
        assert_eq!(parsed, vec![66999638, 67091529, 67098752, 67101626]);
        assert_eq!(parse_int_list("1,2,").unwrap(), vec![1, 2]);
        assert_eq!(join_int_list(&parsed), "66999638,67091529,67098752,67101626");
        assert!(parse_int_list("1,x").is_err());
    }

    #[test]
    fn headers() {
        assert!(is_header("#bin\tname\tchrom"));
        assert!(is_header("bin\tname\tchrom"));
        assert!(!is_header(FOXA1));
    }
}
