use capqc::libs::intervals::backend;
use capqc::libs::probe::{read_probes, Probe};
use clap::*;
use indexmap::IndexSet;
use std::io::Write;
use std::path::Path;

// Create clap subcommand arguments
pub fn make_subcommand() -> Command {
    Command::new("create-files")
        .about("Creates assay files from a vendor probe file")
        .after_help(
            r###"
The probe file is tab-delimited without a header:

    chrom start stop annotation strand [more columns are ignored]

Files written to --outdir, named after the probe file:
* --bed      <basename>-anno.bed     Merged probes annotated with the genes they hit
* --picard   <basename>.Picard.bed   Picard interval list, optional header first

Notes:
* The `chr` prefix is removed from chromosome names
* --bed needs --refseq-genes, the reference genes in BED format (gene in column 4)
* --bedtools accepts a bedtools command or a singularity image (*.img)
* --in-process does the interval arithmetic without bedtools

Examples:
1. Both files:
   capqc create-files probes.txt --bed --refseq-genes refgene.bed --picard --picard-header PicardHeader

2. Picard only:
   capqc create-files probes.txt --picard -o assay/

"###,
        )
        .arg(
            Arg::new("probefile")
                .required(true)
                .index(1)
                .help("The probe file from the vendor"),
        )
        .arg(
            Arg::new("bed")
                .long("bed")
                .short('b')
                .action(ArgAction::SetTrue)
                .help("Create the annotated bed file"),
        )
        .arg(
            Arg::new("refseq_genes")
                .long("refseq-genes")
                .short('g')
                .num_args(1)
                .help("Reference genes in bed format, chrom|start|stop|gene"),
        )
        .arg(
            Arg::new("picard")
                .long("picard")
                .short('p')
                .action(ArgAction::SetTrue)
                .help("Create the picard formatted file"),
        )
        .arg(
            Arg::new("picard_header")
                .long("picard-header")
                .num_args(1)
                .help("Lines copied to the top of the picard file"),
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
                .help("Output directory"),
        )
}

// command implementation
pub fn execute(args: &ArgMatches) -> anyhow::Result<()> {
    //----------------------------
    // Args
    //----------------------------
    let probefile = args.get_one::<String>("probefile").unwrap();
    let outdir = args.get_one::<String>("outdir").unwrap();

    if !args.get_flag("bed") && !args.get_flag("picard") {
        anyhow::bail!("Nothing to create, give --bed and/or --picard");
    }
    if args.get_flag("bed") && !args.contains_id("refseq_genes") {
        anyhow::bail!("Creating the bed file requires --refseq-genes");
    }

    let basename = Path::new(probefile)
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| anyhow::anyhow!("Can't name outputs after {}", probefile))?;

    let probes = read_probes(probefile)?;
    log::info!("Read {} probes from {}", probes.len(), probefile);

    std::fs::create_dir_all(outdir)?;

    //----------------------------
    // Output
    //----------------------------
    if args.get_flag("bed") {
        let ops = backend(
            args.get_flag("in_process"),
            args.get_one::<String>("bedtools")
                .map(|s| s.as_str())
                .unwrap_or(""),
            *args.get_one::<u64>("timeout").unwrap(),
        )?;
        let refseq_genes = args.get_one::<String>("refseq_genes").unwrap();

        let mut probe_bed = tempfile::NamedTempFile::new()?;
        for p in &probes {
            probe_bed.write_fmt(format_args!("{}\t{}\t{}\n", p.chrom, p.start, p.stop))?;
        }
        probe_bed.flush()?;

        let mut merged_bed = tempfile::NamedTempFile::new()?;
        merged_bed.write_all(ops.merge(&path_of(&probe_bed)?)?.as_bytes())?;
        merged_bed.flush()?;

        let pairs = ops.intersect_pairs(&path_of(&merged_bed)?, refseq_genes)?;
        let anno = annotate(&pairs)?;

        let anno_bed = Path::new(outdir).join(format!("{}-anno.bed", basename));
        let mut writer = capqc::writer(&anno_bed.display().to_string())?;
        for line in &anno {
            writer.write_fmt(format_args!("{}\n", line))?;
        }
        writer.flush()?;
        log::info!("Wrote {} annotated intervals to {}", anno.len(), anno_bed.display());
    }

    if args.get_flag("picard") {
        let picard_bed = Path::new(outdir).join(format!("{}.Picard.bed", basename));
        let mut writer = capqc::writer(&picard_bed.display().to_string())?;
        if let Some(header) = args.get_one::<String>("picard_header") {
            writer.write_all(&std::fs::read(header)?)?;
        }
        for p in &probes {
            writer.write_fmt(format_args!("{}\n", picard_line(p)))?;
        }
        writer.flush()?;
        log::info!("Wrote {}", picard_bed.display());
    }

    Ok(())
}

fn path_of(file: &tempfile::NamedTempFile) -> anyhow::Result<String> {
    file.path()
        .to_str()
        .map(|s| s.to_string())
        .ok_or_else(|| anyhow::anyhow!("Temporary path is not UTF-8"))
}

// `chrom start stop` of the merged probe, then the gene of the hit record
fn annotate(pairs: &str) -> anyhow::Result<IndexSet<String>> {
    let mut anno = IndexSet::new();
    for line in pairs.lines().filter(|l| !l.trim().is_empty()) {
        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() < 7 {
            anyhow::bail!("Unexpected intersect record: {}", line);
        }
        anno.insert(format!(
            "{}\t{}\t{}\t{}",
            fields[0], fields[1], fields[2], fields[6]
        ));
    }
    Ok(anno)
}

fn picard_line(p: &Probe) -> String {
    format!(
        "{}\t{}\t{}\t{}\t{}",
        p.chrom, p.start, p.stop, p.strand, p.annotation
    )
}
