use clap::*;
use rust_xlsxwriter::Workbook;
use std::collections::HashSet;
use std::io::BufRead;
use std::path::Path;

/// Excel's limit on worksheet names
const SHEET_NAME_MAX: usize = 31;

// Create clap subcommand arguments
pub fn make_subcommand() -> Command {
    Command::new("xlsx")
        .about("Combines tab-delimited files into one .xlsx workbook")
        .after_help(
            r###"
Every input becomes a worksheet named after the file, without its extension.

Notes:
* Names longer than 31 characters are truncated
* Cells that parse as numbers are written as numbers, the rest as text
* Two inputs can't share a worksheet name

Examples:
1. Bundle the outputs of summarize-assay:
   capqc xlsx summary/per_refgene_summary.txt summary/overall_summary.txt -o summary.xlsx

"###,
        )
        .arg(
            Arg::new("infiles")
                .required(true)
                .num_args(1..)
                .index(1)
                .help("Tab-delimited files to add as worksheets"),
        )
        .arg(
            Arg::new("outfile")
                .long("outfile")
                .short('o')
                .num_args(1)
                .required(true)
                .help("Output .xlsx filename"),
        )
}

// command implementation
pub fn execute(args: &ArgMatches) -> anyhow::Result<()> {
    let outfile = args.get_one::<String>("outfile").unwrap();

    let mut workbook = Workbook::new();
    let mut seen = HashSet::new();

    for infile in args.get_many::<String>("infiles").unwrap() {
        let name = sheet_name(infile);
        if !seen.insert(name.clone()) {
            anyhow::bail!("Duplicated worksheet name {} from {}", name, infile);
        }

        let worksheet = workbook.add_worksheet();
        worksheet.set_name(&name)?;

        let reader = capqc::reader(infile)?;
        for (row, line) in reader.lines().enumerate() {
            let line = line?;
            for (col, cell) in line.trim_end_matches('\r').split('\t').enumerate() {
                let (row, col) = (row as u32, col as u16);
                match cell.parse::<f64>() {
                    Ok(v) if v.is_finite() => worksheet.write_number(row, col, v)?,
                    _ => worksheet.write_string(row, col, cell)?,
                };
            }
        }
        log::debug!("Added {} as worksheet {}", infile, name);
    }

    workbook.save(outfile)?;

    Ok(())
}

// `dir/per_refgene_summary.txt` => `per_refgene_summary`
fn sheet_name(path: &str) -> String {
    let stem = Path::new(path)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(path);
    stem.chars().take(SHEET_NAME_MAX).collect()
}
