//! Vendor probe files: `chrom start stop annotation strand [more...]`, no header.

use crate::libs::chrom;
use crate::libs::error::CapqcError;
use std::fmt;

const PROBE_FORMAT: &str =
    "Please format input file as chrm|start|stop|annotation|strand, without a header";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Probe {
    /// Without the `chr` prefix
    pub chrom: String,
    pub start: i64,
    pub stop: i64,
    pub annotation: String,
    pub strand: String,
}

fn split(line: &str, lineno: usize) -> Result<Vec<&str>, CapqcError> {
    let fields: Vec<&str> = line.trim_end_matches('\r').split('\t').collect();
    if fields.len() < 5 {
        return Err(CapqcError::format(
            lineno,
            format!("Five columns expected. {}", PROBE_FORMAT),
        ));
    }
    Ok(fields)
}

impl Probe {
    /// Reads one row of a probe file. The first five columns are kept; only
    /// the coordinates are checked.
    pub fn parse(line: &str, lineno: usize) -> Result<Self, CapqcError> {
        let fields = split(line, lineno)?;

        let coord = |s: &str| {
            s.trim().parse::<i64>().map_err(|_| {
                CapqcError::format(
                    lineno,
                    format!(
                        "Column 2 and/or 3 is not an obvious start|stop position. {}",
                        PROBE_FORMAT
                    ),
                )
            })
        };

        Ok(Self {
            chrom: chrom::strip_chr(fields[0].trim()).to_string(),
            start: coord(fields[1])?,
            stop: coord(fields[2])?,
            annotation: fields[3].trim().to_string(),
            strand: fields[4].trim().to_string(),
        })
    }

    /// Reads the first row of a probe file, which also decides whether the
    /// file has the expected layout: a canonical chromosome (so no header),
    /// integer coordinates, a non-numeric annotation and a `+`/`-` strand.
    pub fn check_format(line: &str, lineno: usize) -> Result<Self, CapqcError> {
        let fields = split(line, lineno)?;
        if !chrom::is_canonical(fields[0].trim()) {
            return Err(CapqcError::format(
                lineno,
                format!("Column 1 is not an obvious chromosome. {}", PROBE_FORMAT),
            ));
        }

        let probe = Self::parse(line, lineno)?;

        if probe.annotation.is_empty() || probe.annotation.parse::<f64>().is_ok() {
            return Err(CapqcError::format(
                lineno,
                format!("Column 4 is not an obvious annotation. {}", PROBE_FORMAT),
            ));
        }
        if probe.strand != "+" && probe.strand != "-" {
            return Err(CapqcError::format(
                lineno,
                format!("Column 5 is not an obvious strand (-,+). {}", PROBE_FORMAT),
            ));
        }

        Ok(probe)
    }
}

impl fmt::Display for Probe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\t{}\t{}\t{}\t{}",
            self.chrom, self.start, self.stop, self.annotation, self.strand
        )
    }
}

/// Reads a whole probe file. The first row is checked with
/// [`Probe::check_format`]; later rows only need five columns and integer
/// coordinates, so contigs such as `chrM` pass through.
pub fn read_probes(input: &str) -> anyhow::Result<Vec<Probe>> {
    let mut probes = vec![];
    for (i, (lineno, line)) in crate::libs::io::read_lines(input)?.into_iter().enumerate() {
        let probe = if i == 0 {
            Probe::check_format(&line, lineno)?
        } else {
            Probe::parse(&line, lineno)?
        };
        probes.push(probe);
    }
    if probes.is_empty() {
        return Err(CapqcError::format(0, format!("{} has no probes", input)).into());
    }
    Ok(probes)
}
