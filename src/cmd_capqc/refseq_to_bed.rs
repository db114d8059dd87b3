use capqc::libs::bed::RefGeneBed;
use capqc::libs::chrom::strip_chr;
use capqc::libs::error::CapqcError;
use capqc::libs::refgene::{is_header, RefGene};
use clap::*;
use indexmap::IndexMap;
use std::io::{BufRead, Write};
use std::str::FromStr;

// Create clap subcommand arguments
pub fn make_subcommand() -> Command {
    Command::new("refseq-to-bed")
        .about("Converts a UCSC refGene table to the reference-gene BED")
        .after_help(
            r###"
Writes the nine-column BED read by `capqc summarize-assay`:

    chrom chromStart chromEnd gene refseq exonCount exonSizes exonStarts exonEnds

Notes:
* Only NM_ (curated mRNA) transcripts are kept
* A transcript listed more than once keeps its first row
* The `chr` prefix is removed from chromosome names
* Rows are sorted by chromosome name, then start and end
* The input must have the 16 refGene columns; header lines are skipped

Examples:
1. Convert a table browser download:
   capqc refseq-to-bed refGene.txt -o refgene.bed

"###,
        )
        .arg(
            Arg::new("infile")
                .required(true)
                .num_args(1)
                .index(1)
                .help("UCSC table browser download. [stdin] for standard input"),
        )
        .arg(
            Arg::new("outfile")
                .long("outfile")
                .short('o')
                .num_args(1)
                .default_value("stdout")
                .help("Output filename. [stdout] for screen"),
        )
}

// command implementation
pub fn execute(args: &ArgMatches) -> anyhow::Result<()> {
    let reader = capqc::reader(args.get_one::<String>("infile").unwrap())?;
    let mut writer = capqc::writer(args.get_one::<String>("outfile").unwrap())?;

    let mut bed_of: IndexMap<String, RefGeneBed> = IndexMap::new();
    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() || is_header(&line) {
            continue;
        }
        let row = RefGene::from_str(&line).map_err(|e| CapqcError::format(i + 1, e.to_string()))?;

        if !row.name.contains("NM") || bed_of.contains_key(&row.name) {
            continue;
        }
        bed_of.insert(
            row.name.clone(),
            RefGeneBed {
                chrom: strip_chr(&row.chrom).to_string(),
                start: row.tx_start,
                end: row.tx_end,
                gene: row.name2.clone(),
                transcript: row.name.clone(),
                exon_starts: row.exon_starts.clone(),
                exon_ends: row.exon_ends.clone(),
            },
        );
    }

    let mut rows: Vec<RefGeneBed> = bed_of.into_values().collect();
    rows.sort_by(|a, b| {
        a.chrom
            .cmp(&b.chrom)
            .then(a.start.cmp(&b.start))
            .then(a.end.cmp(&b.end))
    });

    for row in rows {
        writer.write_fmt(format_args!("{}\n", row))?;
    }

    Ok(())
}
