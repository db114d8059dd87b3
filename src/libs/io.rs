use anyhow::Context;
use std::io::{BufRead, BufReader, BufWriter, Write};

/// Opens `input` for buffered reading. `stdin` reads standard input and
/// `.gz` files are decompressed on the fly.
///
/// ```
/// use std::io::BufRead;
/// let reader = capqc::reader("tests/capqc/test.genes_for_summarize").unwrap();
/// let lines: Vec<_> = reader.lines().collect();
/// assert_eq!(lines.len(), 6);
/// ```
pub fn reader(input: &str) -> anyhow::Result<Box<dyn BufRead>> {
    let reader: Box<dyn BufRead> = if input == "stdin" {
        Box::new(BufReader::new(std::io::stdin()))
    } else {
        let path = std::path::Path::new(input);
        let file = std::fs::File::open(path)
            .with_context(|| format!("could not open {}", path.display()))?;

        if path.extension() == Some(std::ffi::OsStr::new("gz")) {
            Box::new(BufReader::new(flate2::read::MultiGzDecoder::new(file)))
        } else {
            Box::new(BufReader::new(file))
        }
    };

    Ok(reader)
}

/// Opens `output` for buffered writing. `stdout` writes to the screen.
pub fn writer(output: &str) -> anyhow::Result<Box<dyn Write>> {
    let writer: Box<dyn Write> = if output == "stdout" {
        Box::new(BufWriter::new(std::io::stdout()))
    } else {
        let file = std::fs::File::create(output)
            .with_context(|| format!("could not create {}", output))?;
        Box::new(BufWriter::new(file))
    };

    Ok(writer)
}

/// Non-empty lines of `input` that are not `#` comments, with their 1-based
/// line numbers.
pub fn read_lines(input: &str) -> anyhow::Result<Vec<(usize, String)>> {
    let mut lines = vec![];
    for (i, line) in reader(input)?.lines().enumerate() {
        let line = line.with_context(|| format!("could not read {}", input))?;
        let line = line.trim_end_matches('\r');
        if line.trim().is_empty() || line.starts_with('#') {
            continue;
        }
        lines.push((i + 1, line.to_string()));
    }
    Ok(lines)
}
