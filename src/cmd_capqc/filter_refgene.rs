use capqc::libs::chrom;
use capqc::libs::error::CapqcError;
use capqc::libs::refgene::RefGene;
use capqc::libs::report::read_preferred;
use clap::*;
use itertools::Itertools;
use std::collections::HashMap;
use std::io::{BufRead, Write};
use std::str::FromStr;

// Create clap subcommand arguments
pub fn make_subcommand() -> Command {
    Command::new("filter-refgene")
        .about("Limits a refGene table to the preferred transcripts")
        .after_help(
            r###"
Keeps one transcript for every gene of the preferred list.

Notes:
* Version suffixes of the preferred RefSeq IDs are ignored
* A gene without a preferred transcript keeps its first row
* A preferred transcript that is absent from the table is an error
* Kept genes that overlap on a chromosome are an error
* Rows are written verbatim, sorted by chromosome and txStart

Examples:
1. Filter a table browser download:
   capqc filter-refgene refGene.txt genes.txt -o filtered.refGene

"###,
        )
        .arg(
            Arg::new("refgene")
                .required(true)
                .index(1)
                .help("refGene table from the UCSC table browser"),
        )
        .arg(
            Arg::new("genes")
                .required(true)
                .index(2)
                .help("Preferred transcripts, gene and RefSeq"),
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
    //----------------------------
    // Args
    //----------------------------
    let reader = capqc::reader(args.get_one::<String>("refgene").unwrap())?;
    let mut writer = capqc::writer(args.get_one::<String>("outfile").unwrap())?;

    let preferred_of: HashMap<String, String> = read_preferred(args.get_one::<String>("genes").unwrap())?
        .into_iter()
        .map(|p| (p.gene.clone(), p.accession().to_string()))
        .collect();

    //----------------------------
    // Loading
    //----------------------------
    let mut rows = vec![];
    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() || line.starts_with('#') {
            continue;
        }
        let row = RefGene::from_str(&line).map_err(|e| CapqcError::format(i + 1, e.to_string()))?;
        if chrom::is_canonical(&row.chrom) && preferred_of.contains_key(&row.name2) {
            rows.push(row);
        }
    }
    rows.sort_by(|a, b| {
        chrom::natural_cmp(&a.chrom, &b.chrom).then(a.tx_start.cmp(&b.tx_start))
    });

    //----------------------------
    // Operating
    //----------------------------
    let mut kept: Vec<&RefGene> = vec![];
    for (gene, grp) in &rows.iter().chunk_by(|r| r.name2.clone()) {
        let grp: Vec<&RefGene> = grp.collect();
        let preferred = preferred_of.get(&gene).map(|s| s.as_str()).unwrap_or_default();

        if preferred.is_empty() {
            log::warn!("no preferred transcript for {}", gene);
            kept.push(grp[0]);
            continue;
        }

        let matched: Vec<&RefGene> = grp.iter().copied().filter(|r| r.name == preferred).collect();
        match matched.len() {
            0 => {
                return Err(anyhow::anyhow!(
                    "{} has a preferred transcript of {} but only {} was found",
                    gene,
                    preferred,
                    grp.iter().map(|r| r.name.as_str()).join(",")
                ))
            }
            1 => {}
            _ => log::warn!(
                "{} has more than one preferred transcript; using {}",
                gene,
                matched[0].name
            ),
        }
        kept.push(matched[0]);
    }

    check_overlapping(&kept)?;

    //----------------------------
    // Output
    //----------------------------
    for row in kept {
        writer.write_fmt(format_args!("{}\n", row))?;
    }

    Ok(())
}

// Adjacent genes on a chromosome, ordered by (start, end), must not touch
fn check_overlapping(kept: &[&RefGene]) -> anyhow::Result<()> {
    let by_chrom = kept
        .iter()
        .map(|r| (r.chrom.as_str(), *r))
        .into_group_map();

    for (chrom, mut features) in by_chrom.into_iter().sorted_by(|a, b| a.0.cmp(b.0)) {
        features.sort_by_key(|r| (r.tx_start, r.tx_end));
        for (prev, next) in features.iter().tuple_windows() {
            if prev.tx_end >= next.tx_start {
                anyhow::bail!(
                    "overlapping features on {}: ({}, {}, {}) and ({}, {}, {})",
                    chrom,
                    prev.name2,
                    prev.tx_start,
                    prev.tx_end,
                    next.name2,
                    next.tx_start,
                    next.tx_end
                );
            }
        }
    }

    Ok(())
}
