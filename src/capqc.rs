extern crate clap;
use clap::*;

mod cmd_capqc;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .init();

    let app = Command::new("capqc")
        .version(crate_version!())
        .author(crate_authors!())
        .about("`capqc` - Quality control of targeted capture assays")
        .propagate_version(true)
        .arg_required_else_help(true)
        .color(ColorChoice::Auto)
        .subcommand(cmd_capqc::summarize_assay::make_subcommand())
        .subcommand(cmd_capqc::create_files::make_subcommand())
        .subcommand(cmd_capqc::refseq_to_bed::make_subcommand())
        .subcommand(cmd_capqc::refgene_to_bed::make_subcommand())
        .subcommand(cmd_capqc::refgene_positions::make_subcommand())
        .subcommand(cmd_capqc::filter_refgene::make_subcommand())
        .subcommand(cmd_capqc::xlsx::make_subcommand())
        .after_help(
            r###"Subcommand groups:

* Assays:
    * summarize-assay - Per-gene and overall coverage of the probes
    * create-files    - Annotated BED and Picard files from vendor probes

* Reference genes:
    * refseq-to-bed     - refGene table to the reference-gene BED
    * refgene-to-bed    - refGene table to a transcript BED
    * refgene-positions - Position of every gene
    * filter-refgene    - One preferred transcript per gene

* Reports:
    * xlsx - Tab-delimited files to one workbook

Set RUST_LOG (e.g. RUST_LOG=debug) to change the log level.

"###,
        );

    // Check which subcomamnd the user ran...
    match app.get_matches().subcommand() {
        Some(("summarize-assay", sub_matches)) => cmd_capqc::summarize_assay::execute(sub_matches),
        Some(("create-files", sub_matches)) => cmd_capqc::create_files::execute(sub_matches),
        Some(("refseq-to-bed", sub_matches)) => cmd_capqc::refseq_to_bed::execute(sub_matches),
        Some(("refgene-to-bed", sub_matches)) => cmd_capqc::refgene_to_bed::execute(sub_matches),
        Some(("refgene-positions", sub_matches)) => {
            cmd_capqc::refgene_positions::execute(sub_matches)
        }
        Some(("filter-refgene", sub_matches)) => cmd_capqc::filter_refgene::execute(sub_matches),
        Some(("xlsx", sub_matches)) => cmd_capqc::xlsx::execute(sub_matches),
        _ => unreachable!(),
    }?;

    Ok(())
}
