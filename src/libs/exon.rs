/// A transcript's exon and whether any covered interval has touched it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Exon {
    pub start: i64,
    pub end: i64,
    pub covered: bool,
}

/// Tracks which exons of one transcript received coverage.
///
/// Exons keep their input order. Two exons with identical bounds are two
/// entries, each with its own flag.
///
/// ```
/// use capqc::libs::exon::ExonTracker;
///
/// let mut tracker = ExonTracker::new(&[(100, 200), (300, 400)]);
/// assert_eq!(tracker.covered(), 0);
///
/// tracker.insert(150, 175);
/// assert_eq!(tracker.covered(), 1);
/// assert_eq!(tracker.total(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExonTracker {
    exons: Vec<Exon>,
}

impl ExonTracker {
    pub fn new(bounds: &[(i64, i64)]) -> Self {
        Self {
            exons: bounds
                .iter()
                .map(|&(start, end)| Exon {
                    start,
                    end,
                    covered: false,
                })
                .collect(),
        }
    }

    /// Flags every exon the interval `[start, end)` lands on.
    ///
    /// An exon is flagged when the interval starts inside it, when the
    /// interval ends inside it (`exon.start < end <= exon.end`), or when it
    /// lies strictly inside the interval. Merged probes may span several exons.
    pub fn insert(&mut self, start: i64, end: i64) {
        for exon in self.exons.iter_mut() {
            if (start >= exon.start && start < exon.end)
                || (end > exon.start && end <= exon.end)
                || (exon.start > start && exon.end < end)
            {
                exon.covered = true;
            }
        }
    }

    /// Number of exons with any coverage
    pub fn covered(&self) -> usize {
        self.exons.iter().filter(|e| e.covered).count()
    }

    pub fn total(&self) -> usize {
        self.exons.len()
    }

    pub fn exons(&self) -> &[Exon] {
        &self.exons
    }
}
