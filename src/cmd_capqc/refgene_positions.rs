use capqc::libs::chrom;
use capqc::libs::error::CapqcError;
use capqc::libs::refgene::RefGene;
use clap::*;
use std::io::{BufRead, Write};
use std::str::FromStr;

// Create clap subcommand arguments
pub fn make_subcommand() -> Command {
    Command::new("refgene-positions")
        .about("Reports the position of every gene in a refGene table")
        .after_help(
            r###"
Columns written, sorted by gene:

    name2 name chrom txStart txEnd

Usually run on the output of `capqc filter-refgene`.

Examples:
1. Positions of the assay's preferred transcripts:
   capqc refgene-positions filtered.refGene -o positions.tsv

"###,
        )
        .arg(
            Arg::new("infile")
                .required(true)
                .num_args(1)
                .index(1)
                .help("refGene table. [stdin] for standard input"),
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
    rows.sort_by(|a, b| a.name2.cmp(&b.name2));

    for row in rows {
        writer.write_fmt(format_args!(
            "{}\t{}\t{}\t{}\t{}\n",
            row.name2, row.name, row.chrom, row.tx_start, row.tx_end
        ))?;
    }

    Ok(())
}
