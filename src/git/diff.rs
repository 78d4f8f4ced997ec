use tracing::{debug, info};

use super::types::Commit;
use super::VcsReader;
use crate::error::CheckError;

/// Outcome of diffing two branches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BranchDiff {
    /// Commits on the source branch that the target lacks, newest first.
    Commits(Vec<Commit>),
    /// Nothing to check: the target already contains the whole source history.
    Empty,
}

pub struct BranchDiffReader<'a, V: VcsReader + ?Sized> {
    vcs: &'a V,
}

impl<'a, V: VcsReader + ?Sized> BranchDiffReader<'a, V> {
    pub fn new(vcs: &'a V) -> Self {
        Self { vcs }
    }

    /// List commits reachable from `source` but not from `target`.
    ///
    /// Both references are resolved before any history is walked, and the
    /// first one that does not resolve is reported as `RefNotFound`.
    pub fn diff(&self, source: &str, target: &str) -> Result<BranchDiff, CheckError> {
        for reference in [source, target] {
            if !self.vcs.verify_ref_exists(reference)? {
                return Err(CheckError::RefNotFound {
                    reference: reference.to_string(),
                });
            }
        }

        let commits = self.vcs.log_range(target, source)?;
        if commits.is_empty() {
            info!("No differences between {} and {}", source, target);
            return Ok(BranchDiff::Empty);
        }

        debug!(
            "Found {} commit(s) on {} not present in {}",
            commits.len(),
            source,
            target
        );
        Ok(BranchDiff::Commits(commits))
    }
}
