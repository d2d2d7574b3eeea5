use crate::catalog::Category;
use std::fmt;
use std::path::PathBuf;

/// What happened (or would happen) at one link path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkOutcome {
    /// A new link was written.
    Created,
    /// The link already pointed at the right source.
    AlreadyCorrect,
    /// A link to another target was replaced. `previous` is gone.
    Overwritten { previous: PathBuf },
    /// Dry run: the link would be written.
    WouldLink,
    /// A dangling link was unlinked.
    Removed,
    /// Dry run: the dangling link would be unlinked.
    WouldRemove,
    /// The scene's source file is not on disk.
    SourceMissing,
    /// Something other than a symlink occupies the link path.
    Occupied,
    /// The OS refused the operation.
    Failed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Planned,
    Warning,
    Error,
}

impl LinkOutcome {
    pub fn severity(&self) -> Severity {
        match self {
            LinkOutcome::Created
            | LinkOutcome::AlreadyCorrect
            | LinkOutcome::Overwritten { .. }
            | LinkOutcome::Removed => Severity::Success,
            LinkOutcome::WouldLink | LinkOutcome::WouldRemove => Severity::Planned,
            LinkOutcome::SourceMissing => Severity::Warning,
            LinkOutcome::Occupied | LinkOutcome::Failed(_) => Severity::Error,
        }
    }

    /// True when a link was written to disk.
    pub fn is_new_link(&self) -> bool {
        matches!(self, LinkOutcome::Created | LinkOutcome::Overwritten { .. })
    }
}

impl fmt::Display for LinkOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkOutcome::Created => write!(f, "created"),
            LinkOutcome::AlreadyCorrect => write!(f, "already correct"),
            LinkOutcome::Overwritten { previous } => {
                write!(f, "overwritten (previously -> {})", previous.display())
            }
            LinkOutcome::WouldLink => write!(f, "would link"),
            LinkOutcome::Removed => write!(f, "removed"),
            LinkOutcome::WouldRemove => write!(f, "would remove"),
            LinkOutcome::SourceMissing => write!(f, "source missing"),
            LinkOutcome::Occupied => write!(f, "regular file occupies link location"),
            LinkOutcome::Failed(msg) => write!(f, "failed: {}", msg),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkRecord {
    pub path: PathBuf,
    pub source: Option<PathBuf>,
    pub outcome: LinkOutcome,
}

/// Outcome counts, summable across items and categories.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    pub created: usize,
    pub overwritten: usize,
    pub unchanged: usize,
    pub planned: usize,
    pub removed: usize,
    pub skipped: usize,
    pub warnings: usize,
    pub errors: usize,
}

impl Tally {
    pub fn record(&mut self, outcome: &LinkOutcome) {
        match outcome {
            LinkOutcome::Created => self.created += 1,
            LinkOutcome::AlreadyCorrect => self.unchanged += 1,
            LinkOutcome::Overwritten { .. } => self.overwritten += 1,
            LinkOutcome::WouldLink | LinkOutcome::WouldRemove => self.planned += 1,
            LinkOutcome::Removed => self.removed += 1,
            LinkOutcome::SourceMissing => self.warnings += 1,
            LinkOutcome::Occupied | LinkOutcome::Failed(_) => self.errors += 1,
        }
    }

    pub fn merge(&mut self, other: &Tally) {
        self.created += other.created;
        self.overwritten += other.overwritten;
        self.unchanged += other.unchanged;
        self.planned += other.planned;
        self.removed += other.removed;
        self.skipped += other.skipped;
        self.warnings += other.warnings;
        self.errors += other.errors;
    }
}

/// Result of placing one item's scenes into its directory.
#[derive(Debug, Clone)]
pub struct PlacementReport {
    pub category: Category,
    pub item_name: String,
    pub directory: PathBuf,
    /// Links written to disk (created or overwritten).
    pub created: usize,
    /// Scenes without any file.
    pub skipped: usize,
    pub records: Vec<LinkRecord>,
}

impl PlacementReport {
    pub fn tally(&self) -> Tally {
        let mut tally = Tally {
            skipped: self.skipped,
            ..Tally::default()
        };
        for record in &self.records {
            tally.record(&record.outcome);
        }
        tally
    }

    pub fn issues(&self) -> impl Iterator<Item = &LinkRecord> {
        self.records
            .iter()
            .filter(|r| matches!(r.outcome.severity(), Severity::Warning | Severity::Error))
    }
}

/// Result of unlinking a batch of dangling links.
#[derive(Debug, Clone, Default)]
pub struct RemovalReport {
    pub records: Vec<LinkRecord>,
}

impl RemovalReport {
    pub fn tally(&self) -> Tally {
        let mut tally = Tally::default();
        for record in &self.records {
            tally.record(&record.outcome);
        }
        tally
    }

    pub fn failures(&self) -> impl Iterator<Item = &LinkRecord> {
        self.records
            .iter()
            .filter(|r| r.outcome.severity() == Severity::Error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tally_counts_by_outcome() {
        let mut tally = Tally::default();
        for outcome in [
            LinkOutcome::Created,
            LinkOutcome::Created,
            LinkOutcome::AlreadyCorrect,
            LinkOutcome::SourceMissing,
            LinkOutcome::Occupied,
            LinkOutcome::Failed("denied".into()),
        ] {
            tally.record(&outcome);
        }
        assert_eq!(tally.created, 2);
        assert_eq!(tally.unchanged, 1);
        assert_eq!(tally.warnings, 1);
        assert_eq!(tally.errors, 2);

        let mut total = Tally {
            skipped: 3,
            ..Tally::default()
        };
        total.merge(&tally);
        assert_eq!(total.created, 2);
        assert_eq!(total.skipped, 3);
    }

    #[test]
    fn test_overwrite_counts_as_new_link() {
        let outcome = LinkOutcome::Overwritten {
            previous: PathBuf::from("/old.mp4"),
        };
        assert!(outcome.is_new_link());
        assert_eq!(outcome.severity(), Severity::Success);
        assert!(!LinkOutcome::AlreadyCorrect.is_new_link());
        assert_eq!(outcome.to_string(), "overwritten (previously -> /old.mp4)");
    }
}
