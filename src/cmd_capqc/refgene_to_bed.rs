use capqc::libs::chrom;
use capqc::libs::error::CapqcError;
use capqc::libs::refgene::{join_int_list, RefGene};
use clap::*;
use std::io::{BufRead, Write};
use std::str::FromStr;

// Create clap subcommand arguments
pub fn make_subcommand() -> Command {
    Command::new("refgene-to-bed")
        .about("Converts a UCSC refGene table to a transcript BED")
        .after_help(
            r###"
Columns written:

    chrom txStart txEnd name2 name strand exonCount exonStarts exonEnds

Notes:
* Lines starting with `#` are skipped
* Only chromosomes 1-22, X and Y are kept
* Rows are sorted naturally by chromosome (1, 2, ..., 10, ..., X, Y); the
  input order is kept within a chromosome

Examples:
1. Convert a table browser download:
   capqc refgene-to-bed refGene.txt -o refgene.tx.bed

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

    let mut rows = vec![];
    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() || line.starts_with('#') {
            continue;
        }
        let row = RefGene::from_str(&line).map_err(|e| CapqcError::format(i + 1, e.to_string()))?;
        if chrom::is_canonical(&row.chrom) {
            rows.push(row);
        }
    }

    // stable
    rows.sort_by(|a, b| chrom::natural_cmp(&a.chrom, &b.chrom));

    for row in rows {
        writer.write_fmt(format_args!(
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\n",
            row.chrom,
            row.tx_start,
            row.tx_end,
            row.name2,
            row.name,
            row.strand,
            row.exon_count,
            join_int_list(&row.exon_starts),
            join_int_list(&row.exon_ends),
        ))?;
    }

    Ok(())
}
