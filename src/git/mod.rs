//! Version-control access
//!
//! Provides:
//! - The `VcsReader` seam over a repository's history
//! - A git2-backed implementation
//! - `BranchDiffReader`, which lists what a source branch adds over a target

pub mod diff;
pub mod repository;
pub mod types;

pub use diff::{BranchDiff, BranchDiffReader};
pub use repository::GitRepository;
pub use types::{Commit, CommitAuthor};

/// Read-only queries against a repository's history.
pub trait VcsReader {
    /// Whether `reference` resolves to a commit.
    fn verify_ref_exists(&self, reference: &str) -> Result<bool, git2::Error>;

    /// Commits reachable from `to` but not from `from`, newest first.
    fn log_range(&self, from: &str, to: &str) -> Result<Vec<Commit>, git2::Error>;
}
