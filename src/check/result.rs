use chrono::{DateTime, Utc};
use serde::Serialize;

use super::classifier::{Classification, ClassifiedCommit, Verdict};
use super::membership::ResolveWarning;
use crate::github::PullRequestRef;

#[derive(Debug, Clone, Serialize)]
pub struct ReleaseCheckResult {
    pub source_branch: String,
    pub target_branch: String,
    pub pull_requests: Vec<PullRequestRef>,
    pub checked_at: DateTime<Utc>,
    /// Non-merge commits in diff order.
    pub commits: Vec<ClassifiedCommit>,
    pub summary: CheckSummary,
    pub warnings: Vec<ResolveWarning>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CheckSummary {
    pub examined: usize,
    pub flagged: usize,
    pub merge_skipped: usize,
    pub excluded_by_pattern: usize,
    pub not_in_pr: usize,
    pub release_safe: usize,
}

impl CheckSummary {
    fn tally(classification: &Classification) -> Self {
        let mut summary = CheckSummary {
            examined: classification.commits.len(),
            merge_skipped: classification.merge_skipped,
            ..Default::default()
        };
        for commit in &classification.commits {
            match commit.verdict {
                Verdict::ExcludedByPattern(_) => summary.excluded_by_pattern += 1,
                Verdict::NotInPr => summary.not_in_pr += 1,
                Verdict::ReleaseSafe => summary.release_safe += 1,
                Verdict::MergeSkipped => {}
            }
        }
        summary.flagged = summary.excluded_by_pattern + summary.not_in_pr;
        summary
    }
}

impl ReleaseCheckResult {
    pub fn new(
        source_branch: &str,
        target_branch: &str,
        pull_requests: Vec<PullRequestRef>,
        warnings: Vec<ResolveWarning>,
        classification: Classification,
    ) -> Self {
        Self {
            source_branch: source_branch.to_string(),
            target_branch: target_branch.to_string(),
            pull_requests,
            checked_at: Utc::now(),
            summary: CheckSummary::tally(&classification),
            commits: classification.commits,
            warnings,
        }
    }

    pub fn flagged(&self) -> impl Iterator<Item = &ClassifiedCommit> {
        self.commits.iter().filter(|c| c.verdict.is_flagged())
    }

    pub fn release_safe(&self) -> impl Iterator<Item = &ClassifiedCommit> {
        self.commits.iter().filter(|c| !c.verdict.is_flagged())
    }

    pub fn is_safe(&self) -> bool {
        self.summary.flagged == 0
    }
}
