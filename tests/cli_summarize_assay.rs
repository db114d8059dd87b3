use assert_cmd::Command;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/capqc")
        .join(name)
}

fn summarize(outdir: &std::path::Path) -> anyhow::Result<()> {
    let mut cmd = Command::cargo_bin("capqc")?;
    cmd.arg("summarize-assay")
        .arg(fixture("assay.bed"))
        .arg(fixture("test.genes_for_summarize"))
        .arg(fixture("refgene.bed"))
        .arg("--in-process")
        .arg("-o")
        .arg(outdir);
    cmd.assert().success();
    Ok(())
}

#[test]
fn command_summarize_outputs() -> anyhow::Result<()> {
    let temp = TempDir::new()?;
    summarize(temp.path())?;

    for name in [
        "merged_probes.bed",
        "intersect_probes_refgene.txt",
        "non_intersect_probes_refgene.txt",
        "per_refgene_summary.txt",
        "overall_summary.txt",
    ] {
        assert!(temp.path().join(name).is_file(), "{} is missing", name);
    }

    // p1 and p2 overlap
    let merged = fs::read_to_string(temp.path().join("merged_probes.bed"))?;
    assert_eq!(
        merged,
        "1\t1100\t1250\n1\t1800\t1900\n1\t3000\t3100\nX\t1000\t2000\n2\t50\t150\n"
    );

    let overlaps = fs::read_to_string(temp.path().join("intersect_probes_refgene.txt"))?;
    assert_eq!(overlaps.lines().count(), 4);
    assert!(overlaps
        .lines()
        .all(|l| l.split('\t').count() == 3 + 9 + 1));

    let non_overlaps = fs::read_to_string(temp.path().join("non_intersect_probes_refgene.txt"))?;
    assert_eq!(non_overlaps, "1\t3000\t3100\n");

    Ok(())
}

#[test]
fn command_summarize_per_refgene() -> anyhow::Result<()> {
    let temp = TempDir::new()?;
    summarize(temp.path())?;

    let content = fs::read_to_string(temp.path().join("per_refgene_summary.txt"))?;
    let lines: Vec<&str> = content.lines().collect();

    assert_eq!(
        lines[0],
        "gene\trefgene\ttotal_bases_targeted\tlength_of_gene\tfraction_of_gene_covered\texons_with_any_coverage\ttotal_exons_in_gene"
    );
    // sorted by gene; GENEC is hit without being asked for
    assert_eq!(
        &lines[1..],
        &[
            "FOXA1\tNM_004496\t0\t4000\t0.0\t0\t2",
            "GENEA\tNM_000001\t250\t1000\t0.25\t2\t2",
            "GENEC\tNM_000003\t50\t400\t0.125\t1\t1",
            "MISSING\tNM_123456\tRefSeq not found\tNA\tNA\tNA\tNA",
            "RPL10\tNM_006013\t1000\t1000\t1.0\t1\t1",
            "WRONG\tNM_000002\tIncorrect RefSeq for this Gene\tNA\tNA\tNA\tNA",
        ]
    );

    Ok(())
}

#[test]
fn command_summarize_overall() -> anyhow::Result<()> {
    let temp = TempDir::new()?;
    summarize(temp.path())?;

    let content = fs::read_to_string(temp.path().join("overall_summary.txt"))?;
    let expected = "1450 unique bases were targeted\n\
                    1300 unique bases within gene boundaries were targeted\n\
                    3 unique refgenes had at least one base targeted\n\
                    The following probes did not intersect with transcription region of any UCSC gene:\n\
                    1\t3000\t3100\n";
    assert_eq!(content, expected);

    Ok(())
}

#[test]
fn command_summarize_fully_covered() -> anyhow::Result<()> {
    let temp = TempDir::new()?;

    let mut cmd = Command::cargo_bin("capqc")?;
    cmd.arg("summarize-assay")
        .arg(fixture("rpl10.bed"))
        .arg(fixture("rpl10.genes"))
        .arg(fixture("refgene.bed"))
        .arg("--in-process")
        .arg("-o")
        .arg(temp.path());
    cmd.assert().success();

    let content = fs::read_to_string(temp.path().join("per_refgene_summary.txt"))?;
    let row: Vec<&str> = content.lines().nth(1).unwrap().split('\t').collect();
    assert_eq!(row[0], "RPL10");
    assert_eq!(row[2], "1000");
    approx::assert_relative_eq!(row[4].parse::<f64>()?, 1.0);
    assert_eq!(content.lines().count(), 2);

    let overall = fs::read_to_string(temp.path().join("overall_summary.txt"))?;
    assert!(overall.starts_with("1000 unique bases were targeted\n"));
    assert!(overall.ends_with("any UCSC gene:\n"));

    Ok(())
}

#[test]
fn command_summarize_bad_reference() -> anyhow::Result<()> {
    let temp = TempDir::new()?;
    let refgene = temp.path().join("bad.bed");
    fs::write(&refgene, "1\t1000\t2000\tGENEA\tNM_000001\t1\t100\tabc\t1100\n")?;

    let mut cmd = Command::cargo_bin("capqc")?;
    cmd.arg("summarize-assay")
        .arg(fixture("assay.bed"))
        .arg(fixture("test.genes_for_summarize"))
        .arg(&refgene)
        .arg("--in-process")
        .arg("-o")
        .arg(temp.path().join("out"));
    cmd.assert()
        .failure()
        .stderr(predicates::str::contains("line 1"));

    // nothing written before the inputs are validated
    assert!(!temp.path().join("out").exists());

    Ok(())
}

#[test]
fn command_summarize_missing_bedtools() -> anyhow::Result<()> {
    let temp = TempDir::new()?;

    let mut cmd = Command::cargo_bin("capqc")?;
    cmd.arg("summarize-assay")
        .arg(fixture("assay.bed"))
        .arg(fixture("test.genes_for_summarize"))
        .arg(fixture("refgene.bed"))
        .arg("--bedtools")
        .arg("/nonexistent/bin/bedtools")
        .arg("-o")
        .arg(temp.path());
    cmd.assert().failure();

    Ok(())
}
