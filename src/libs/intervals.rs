//! Interval set operations over BED files.
//!
//! Callers only see [`IntervalOps`]. [`Bedtools`] runs an external `bedtools`
//! (a binary, or a singularity image holding one); [`InProcess`] does the same
//! work with `intspan` sets and needs nothing installed.
//!
//! Every operation takes paths and returns the tab-delimited text `bedtools`
//! would print, so downstream parsing is identical for both.

use crate::libs::bed::{read_regions, Region};
use crate::libs::error::CapqcError;
use indexmap::IndexMap;
use std::io::{Read, Seek, SeekFrom};
use std::time::{Duration, Instant};

pub trait IntervalOps {
    /// Overlapping and book-ended intervals of `bed` joined, `chrom start end`.
    /// `bedtools merge -i bed`
    fn merge(&self, bed: &str) -> anyhow::Result<String>;

    /// Every overlapping pair of records, then the number of shared bases.
    /// `bedtools intersect -wo -a a -b b`
    fn intersect_with_overlap(&self, a: &str, b: &str) -> anyhow::Result<String>;

    /// Every overlapping pair of records.
    /// `bedtools intersect -wa -wb -a a -b b`
    fn intersect_pairs(&self, a: &str, b: &str) -> anyhow::Result<String>;

    /// Records of `a` that overlap nothing in `b`, unchanged.
    /// `bedtools intersect -v -a a -b b`
    fn subtract(&self, a: &str, b: &str) -> anyhow::Result<String>;
}

/// `bedtools` as a child process.
#[derive(Debug, Clone)]
pub struct Bedtools {
    command: Vec<String>,
    timeout: Duration,
}

impl Bedtools {
    /// * `""`: `bedtools` from `PATH`
    /// * `*.img`: `singularity exec --bind $PWD --pwd $PWD <img> bedtools`
    /// * anything else: the bedtools command itself, e.g. `/opt/bin/bedtools`
    pub fn new(invocation: &str, timeout: Duration) -> anyhow::Result<Self> {
        let invocation = invocation.trim();
        let command: Vec<String> = if invocation.is_empty() {
            vec!["bedtools".to_string()]
        } else if invocation.ends_with(".img") {
            let cwd = std::env::current_dir()?.display().to_string();
            vec![
                "singularity".to_string(),
                "exec".to_string(),
                "--bind".to_string(),
                cwd.clone(),
                "--pwd".to_string(),
                cwd,
                invocation.to_string(),
                "bedtools".to_string(),
            ]
        } else {
            invocation.split_whitespace().map(|s| s.to_string()).collect()
        };

        if which::which(&command[0]).is_err() {
            return Err(CapqcError::ExternalTool(format!(
                "{} not found. Please install bedtools or pass --bedtools",
                command[0]
            ))
            .into());
        }

        Ok(Self { command, timeout })
    }

    pub fn command(&self) -> &[String] {
        &self.command
    }

    /// Runs `<command> <args>` and returns its stdout once it exits.
    ///
    /// Output goes to temporary files rather than pipes so a chatty child
    /// can't block. A non-zero exit, a timeout, or non-UTF-8 output is an
    /// error.
    fn run(&self, args: &[&str]) -> anyhow::Result<String> {
        let mut stdout = tempfile::tempfile()?;
        let mut stderr = tempfile::tempfile()?;

        let mut cmd = std::process::Command::new(&self.command[0]);
        cmd.args(&self.command[1..])
            .args(args)
            .stdout(stdout.try_clone()?)
            .stderr(stderr.try_clone()?);

        log::info!("Running {} {}", self.command.join(" "), args.join(" "));
        let mut child = cmd.spawn().map_err(|e| {
            CapqcError::ExternalTool(format!("could not start {}: {}", self.command[0], e))
        })?;

        let deadline = Instant::now() + self.timeout;
        let status = loop {
            if let Some(status) = child.try_wait()? {
                break status;
            }
            if Instant::now() >= deadline {
                child.kill()?;
                child.wait()?;
                return Err(CapqcError::ExternalTool(format!(
                    "{} {} timed out after {}s",
                    self.command[0],
                    args.join(" "),
                    self.timeout.as_secs()
                ))
                .into());
            }
            std::thread::sleep(Duration::from_millis(20));
        };

        if !status.success() {
            let mut message = String::new();
            stderr.seek(SeekFrom::Start(0))?;
            stderr.read_to_string(&mut message).unwrap_or_default();
            return Err(CapqcError::ExternalTool(format!(
                "{} {} failed ({}): {}",
                self.command[0],
                args.join(" "),
                status,
                message.trim()
            ))
            .into());
        }

        let mut bytes = vec![];
        stdout.seek(SeekFrom::Start(0))?;
        stdout.read_to_end(&mut bytes)?;
        let text = String::from_utf8(bytes).map_err(|_| {
            CapqcError::ExternalTool(format!("{} wrote non-UTF-8 output", self.command[0]))
        })?;

        Ok(text)
    }
}

impl IntervalOps for Bedtools {
    fn merge(&self, bed: &str) -> anyhow::Result<String> {
        self.run(&["merge", "-i", bed])
    }

    fn intersect_with_overlap(&self, a: &str, b: &str) -> anyhow::Result<String> {
        self.run(&["intersect", "-wo", "-a", a, "-b", b])
    }

    fn intersect_pairs(&self, a: &str, b: &str) -> anyhow::Result<String> {
        self.run(&["intersect", "-wa", "-wb", "-a", a, "-b", b])
    }

    fn subtract(&self, a: &str, b: &str) -> anyhow::Result<String> {
        self.run(&["intersect", "-v", "-a", a, "-b", b])
    }
}

/// Interval operations without leaving the process.
///
/// ```
/// use capqc::libs::intervals::{InProcess, IntervalOps};
///
/// let dir = tempfile::TempDir::new().unwrap();
/// let bed = dir.path().join("probes.bed");
/// std::fs::write(&bed, "1\t100\t200\n1\t150\t300\n1\t300\t350\n2\t10\t20\n").unwrap();
///
/// let merged = InProcess.merge(bed.to_str().unwrap()).unwrap();
/// assert_eq!(merged, "1\t100\t350\n2\t10\t20\n");
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct InProcess;

impl InProcess {
    /// `b` indexed by chromosome, then for every record of `a` the indices of
    /// the `b` records it overlaps, in `b` order.
    fn hits(a: &[Region], b: &[Region]) -> Vec<Vec<usize>> {
        let mut by_chrom: IndexMap<&str, ChromIndex> = IndexMap::new();
        for (i, region) in b.iter().enumerate() {
            by_chrom
                .entry(region.chrom.as_str())
                .or_default()
                .push(region.start, region.end, i);
        }
        for index in by_chrom.values_mut() {
            index.finish();
        }

        a.iter()
            .map(|region| match by_chrom.get(region.chrom.as_str()) {
                Some(index) => index.overlapping(region.start, region.end),
                None => vec![],
            })
            .collect()
    }
}

/// Intervals of one chromosome sorted by start, with the running maximum of
/// their ends so a query can stop scanning early.
#[derive(Debug, Default)]
struct ChromIndex {
    intervals: Vec<(i64, i64, usize)>,
    max_end: Vec<i64>,
}

impl ChromIndex {
    fn push(&mut self, start: i64, end: i64, idx: usize) {
        self.intervals.push((start, end, idx));
    }

    fn finish(&mut self) {
        self.intervals.sort_unstable();
        let mut max_end = i64::MIN;
        self.max_end = self
            .intervals
            .iter()
            .map(|&(_, end, _)| {
                max_end = max_end.max(end);
                max_end
            })
            .collect();
    }

    fn overlapping(&self, start: i64, end: i64) -> Vec<usize> {
        let upper = self.intervals.partition_point(|&(s, _, _)| s < end);
        let mut hits = vec![];
        for i in (0..upper).rev() {
            if self.max_end[i] <= start {
                break;
            }
            let (s, e, idx) = self.intervals[i];
            if overlap_len(start, end, s, e) > 0 {
                hits.push(idx);
            }
        }
        hits.sort_unstable();
        hits
    }
}

fn overlap_len(a_start: i64, a_end: i64, b_start: i64, b_end: i64) -> i64 {
    a_end.min(b_end) - a_start.max(b_start)
}

fn to_i32(v: i64) -> anyhow::Result<i32> {
    i32::try_from(v).map_err(|_| anyhow::anyhow!("coordinate {} is out of range", v))
}

impl IntervalOps for InProcess {
    fn merge(&self, bed: &str) -> anyhow::Result<String> {
        let mut set_of: IndexMap<String, intspan::IntSpan> = IndexMap::new();
        for region in read_regions(bed)? {
            if region.is_empty() {
                continue;
            }
            // BED [start, end) is [start + 1, end] in intspan's 1-based runlists
            let span = intspan::IntSpan::from_pair(to_i32(region.start + 1)?, to_i32(region.end)?);
            set_of
                .entry(region.chrom.clone())
                .or_insert_with(intspan::IntSpan::new)
                .merge(&span);
        }

        let mut out = String::new();
        for (chrom, set) in set_of.iter() {
            for (lower, upper) in set.spans() {
                out += &format!("{}\t{}\t{}\n", chrom, lower - 1, upper);
            }
        }
        Ok(out)
    }

    fn intersect_with_overlap(&self, a: &str, b: &str) -> anyhow::Result<String> {
        let (a, b) = (read_regions(a)?, read_regions(b)?);
        let mut out = String::new();
        for (ra, hits) in a.iter().zip(Self::hits(&a, &b)) {
            for i in hits {
                let rb = &b[i];
                let bases = overlap_len(ra.start, ra.end, rb.start, rb.end);
                out += &format!("{}\t{}\t{}\n", ra, rb, bases);
            }
        }
        Ok(out)
    }

    fn intersect_pairs(&self, a: &str, b: &str) -> anyhow::Result<String> {
        let (a, b) = (read_regions(a)?, read_regions(b)?);
        let mut out = String::new();
        for (ra, hits) in a.iter().zip(Self::hits(&a, &b)) {
            for i in hits {
                out += &format!("{}\t{}\n", ra, b[i]);
            }
        }
        Ok(out)
    }

    fn subtract(&self, a: &str, b: &str) -> anyhow::Result<String> {
        let (a, b) = (read_regions(a)?, read_regions(b)?);
        let mut out = String::new();
        for (ra, hits) in a.iter().zip(Self::hits(&a, &b)) {
            if hits.is_empty() {
                out += &format!("{}\n", ra);
            }
        }
        Ok(out)
    }
}

/// Picks the backend from command-line options.
pub fn backend(
    in_process: bool,
    bedtools: &str,
    timeout_secs: u64,
) -> anyhow::Result<Box<dyn IntervalOps>> {
    if in_process {
        Ok(Box::new(InProcess))
    } else {
        Ok(Box::new(Bedtools::new(
            bedtools,
            Duration::from_secs(timeout_secs),
        )?))
    }
}
