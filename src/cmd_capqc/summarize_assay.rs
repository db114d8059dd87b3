use capqc::libs::index::ReferenceIndex;
use capqc::libs::intervals::backend;
use capqc::libs::report::{calculate_total_covered, read_preferred, OverallSummary, PerGeneReport};
use clap::*;
use std::fs;
use std::io::Write;
use std::path::Path;

// Create clap subcommand arguments
pub fn make_subcommand() -> Command {
    Command::new("summarize-assay")
        .about("Per-gene and overall coverage of an assay's probes")
        .after_help(
            r###"
Given the assay BED, the preferred transcripts and the reference-gene BED, compute how many bases and
exons of every gene the probes cover.

Inputs:
* <bed>         Assay probes: chrom, start, end [, annotation]
* <genes>       Preferred transcripts: gene, RefSeq (version suffixes are ignored)
* <refgene_bed> Reference genes as written by `capqc refseq-to-bed`

Files written to --outdir:
* merged_probes.bed                 Probes after merging
* intersect_probes_refgene.txt      Probe x gene overlaps
* non_intersect_probes_refgene.txt  Probes outside every gene
* per_refgene_summary.txt           One row per gene
* overall_summary.txt               Totals and intergenic probes

Notes:
* Preferred genes whose transcript is missing from the reference are reported as `RefSeq not found`
* Preferred genes whose transcript belongs to another gene are reported as `Incorrect RefSeq for this Gene`
* Genes hit by probes but absent from the preferred list are reported too
* --bedtools accepts a bedtools command or a singularity image (*.img)
* --in-process does the interval arithmetic without bedtools

Examples:
1. With bedtools in PATH:
   capqc summarize-assay assay.bed genes.txt refgene.bed -o summary

2. With a singularity image:
   capqc summarize-assay assay.bed genes.txt refgene.bed --bedtools bedtools-2.26.img -o summary

3. Without bedtools:
   capqc summarize-assay assay.bed genes.txt refgene.bed --in-process -o summary

"###,
        )
        .arg(
            Arg::new("bed")
                .required(true)
                .index(1)
                .help("Assay BED file, sorted"),
        )
        .arg(
            Arg::new("genes")
                .required(true)
                .index(2)
                .help("Preferred transcripts, gene and RefSeq"),
        )
        .arg(
            Arg::new("refgene_bed")
                .required(true)
                .index(3)
                .help("Reference genes in BED format"),
        )
        .arg(
            Arg::new("bedtools")
                .long("bedtools")
                .num_args(1)
                .help("Path to bedtools, accepts binary or singularity image"),
        )
        .arg(
            Arg::new("in_process")
                .long("in-process")
                .action(ArgAction::SetTrue)
                .help("Compute intervals without bedtools"),
        )
        .arg(
            Arg::new("timeout")
                .long("timeout")
                .num_args(1)
                .default_value("600")
                .value_parser(value_parser!(u64))
                .help("Seconds to wait for each bedtools call"),
        )
        .arg(
            Arg::new("outdir")
                .short('o')
                .long("outdir")
                .num_args(1)
                .default_value(".")
                .help("Output directory for summary files"),
        )
}

// command implementation
pub fn execute(args: &ArgMatches) -> anyhow::Result<()> {
    //----------------------------
    // Args
    //----------------------------
    let bed = args.get_one::<String>("bed").unwrap();
    let genes = args.get_one::<String>("genes").unwrap();
    let refgene_bed = args.get_one::<String>("refgene_bed").unwrap();
    let outdir = args.get_one::<String>("outdir").unwrap();

    let ops = backend(
        args.get_flag("in_process"),
        args.get_one::<String>("bedtools")
            .map(|s| s.as_str())
            .unwrap_or(""),
        *args.get_one::<u64>("timeout").unwrap(),
    )?;

    //----------------------------
    // Loading
    //----------------------------
    let mut index = ReferenceIndex::from_file(refgene_bed)?;
    log::info!("Indexed {} transcripts from {}", index.len(), refgene_bed);
    if !index.duplicates().is_empty() {
        log::warn!(
            "{} repeated transcripts in {}, first rows kept: {}",
            index.duplicates().len(),
            refgene_bed,
            index.duplicates().join(",")
        );
    }

    let preferred = read_preferred(genes)?;
    log::info!("Read {} preferred transcripts from {}", preferred.len(), genes);

    fs::create_dir_all(outdir)?;
    let out_path = |name: &str| Path::new(outdir).join(name).display().to_string();

    //----------------------------
    // Operating
    //----------------------------
    let merged_bed = out_path("merged_probes.bed");
    fs::write(&merged_bed, ops.merge(bed)?)?;

    let overlaps = ops.intersect_with_overlap(&merged_bed, refgene_bed)?;
    fs::write(out_path("intersect_probes_refgene.txt"), &overlaps)?;

    let stats = index.aggregate(&overlaps)?;
    log::info!(
        "Processed {} overlap records, {} with unknown transcripts",
        stats.records,
        stats.not_found
    );

    let non_overlaps = ops.subtract(&merged_bed, refgene_bed)?;
    fs::write(out_path("non_intersect_probes_refgene.txt"), &non_overlaps)?;

    let report = PerGeneReport::build(&preferred, &index);
    let summary = OverallSummary {
        total_bases: calculate_total_covered(&merged_bed)?,
        coding_bases: report.coding_bases,
        gene_count: report.gene_count,
        intergenic: non_overlaps
            .lines()
            .filter(|l| !l.trim().is_empty())
            .map(|l| l.to_string())
            .collect(),
    };

    //----------------------------
    // Output
    //----------------------------
    let mut writer = capqc::writer(&out_path("per_refgene_summary.txt"))?;
    report.write_to(&mut writer)?;
    writer.flush()?;

    let mut writer = capqc::writer(&out_path("overall_summary.txt"))?;
    summary.write_to(&mut writer)?;
    writer.flush()?;

    log::info!(
        "{} genes reported, {} with coverage",
        report.rows.len(),
        report.gene_count
    );

    Ok(())
}
