use std::time::Duration;
use tracing::info;

use super::classifier::CommitClassifier;
use super::membership::PrMembershipResolver;
use super::result::ReleaseCheckResult;
use crate::config::Config;
use crate::error::CheckError;
use crate::git::{BranchDiff, BranchDiffReader, VcsReader};
use crate::github::PullRequestSource;

#[derive(Debug)]
pub enum CheckOutcome {
    /// The target already has everything the source has.
    NoDifferences { source: String, target: String },
    Checked(ReleaseCheckResult),
}

/// One release check over injected collaborators.
pub struct ReleaseChecker<'a> {
    vcs: &'a dyn VcsReader,
    pull_requests: &'a dyn PullRequestSource,
    config: &'a Config,
}

impl<'a> ReleaseChecker<'a> {
    pub fn new(
        vcs: &'a dyn VcsReader,
        pull_requests: &'a dyn PullRequestSource,
        config: &'a Config,
    ) -> Self {
        Self {
            vcs,
            pull_requests,
            config,
        }
    }

    /// Diff the configured branches, then resolve the given pull request
    /// URLs and classify every non-merge commit of the diff.
    pub async fn run<S: AsRef<str>>(&self, pr_urls: &[S]) -> Result<CheckOutcome, CheckError> {
        let source = self.config.branches.source.as_str();
        let target = self.config.branches.target.as_str();
        info!("Checking {} against {}", source, target);

        let commits = match BranchDiffReader::new(self.vcs).diff(source, target)? {
            BranchDiff::Empty => {
                return Ok(CheckOutcome::NoDifferences {
                    source: source.to_string(),
                    target: target.to_string(),
                })
            }
            BranchDiff::Commits(commits) => commits,
        };

        let timeout = Duration::from_secs(self.config.github.timeout_secs);
        let membership = PrMembershipResolver::new(self.pull_requests, timeout)
            .resolve(pr_urls)
            .await?;
        info!(
            "{} commit(s) across {} pull request(s)",
            membership.commits.len(),
            membership.pull_requests.len()
        );

        let classification =
            CommitClassifier::from_config(&self.config.patterns).classify(&commits, &membership.commits);
        let result = ReleaseCheckResult::new(
            source,
            target,
            membership.pull_requests,
            membership.warnings,
            classification,
        );
        info!(
            "Examined {} commit(s): {} flagged, {} merge(s) skipped",
            result.summary.examined, result.summary.flagged, result.summary.merge_skipped
        );

        Ok(CheckOutcome::Checked(result))
    }
}
