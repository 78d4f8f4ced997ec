use futures::future::join_all;
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::error::{CheckError, FetchError};
use crate::github::{PullRequestRef, PullRequestSource};

/// Commit identifiers belonging to the pull requests under release.
///
/// Identifiers are stored lowercased, so lookups ignore case.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrCommitSet {
    shas: HashSet<String>,
}

impl PrCommitSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, sha: &str) -> bool {
        self.shas.insert(sha.trim().to_lowercase())
    }

    pub fn contains(&self, sha: &str) -> bool {
        self.shas.contains(&sha.trim().to_lowercase())
    }

    pub fn union(&mut self, other: &PrCommitSet) {
        self.shas.extend(other.shas.iter().cloned());
    }

    pub fn len(&self) -> usize {
        self.shas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shas.is_empty()
    }
}

impl<S: AsRef<str>> FromIterator<S> for PrCommitSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = PrCommitSet::new();
        for sha in iter {
            set.insert(sha.as_ref());
        }
        set
    }
}

/// Non-fatal problem met while resolving pull request membership.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResolveWarning {
    MalformedReference { input: String, reason: String },
    FetchFailed { pull_request: String, reason: String },
}

impl fmt::Display for ResolveWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolveWarning::MalformedReference { input, reason } => {
                write!(f, "skipped `{}`: {}", input, reason)
            }
            ResolveWarning::FetchFailed {
                pull_request,
                reason,
            } => write!(f, "could not fetch commits of {}: {}", pull_request, reason),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Membership {
    pub commits: PrCommitSet,
    /// Every well-formed reference that was attempted, in input order.
    pub pull_requests: Vec<PullRequestRef>,
    pub warnings: Vec<ResolveWarning>,
}

pub struct PrMembershipResolver<'a> {
    source: &'a dyn PullRequestSource,
    timeout: Duration,
}

impl<'a> PrMembershipResolver<'a> {
    pub fn new(source: &'a dyn PullRequestSource, timeout: Duration) -> Self {
        Self { source, timeout }
    }

    /// Parse the given pull request URLs, fetch each one's commits
    /// concurrently and union the identifiers.
    ///
    /// Malformed URLs and failed fetches become warnings. Resolution only
    /// fails when no commit identifier at all could be collected.
    pub async fn resolve<S: AsRef<str>>(&self, inputs: &[S]) -> Result<Membership, CheckError> {
        if inputs.is_empty() {
            return Err(CheckError::NoPullRequests);
        }

        let mut warnings = Vec::new();
        let mut pull_requests: Vec<PullRequestRef> = Vec::new();
        for input in inputs {
            let input = input.as_ref();
            match input.parse::<PullRequestRef>() {
                Ok(pr) if pull_requests.contains(&pr) => {
                    debug!("Ignoring duplicate reference {}", pr);
                }
                Ok(pr) => pull_requests.push(pr),
                Err(reason) => {
                    warn!("Skipping pull request reference {:?}: {}", input, reason);
                    warnings.push(ResolveWarning::MalformedReference {
                        input: input.to_string(),
                        reason,
                    });
                }
            }
        }

        let fetches = pull_requests.iter().map(|pr| async move {
            let outcome = match tokio::time::timeout(self.timeout, self.source.list_commits(pr)).await {
                Ok(result) => result,
                Err(_) => Err(FetchError::Timeout {
                    seconds: self.timeout.as_secs(),
                }),
            };
            (pr, outcome)
        });
        let outcomes = join_all(fetches).await;

        let mut commits = PrCommitSet::new();
        for (pr, outcome) in outcomes {
            match outcome {
                Ok(pr_commits) => {
                    info!("{}: {} commit(s)", pr, pr_commits.len());
                    for commit in &pr_commits {
                        commits.insert(&commit.sha);
                    }
                }
                Err(e) => {
                    warn!("Failed to fetch commits of {}: {}", pr, e);
                    warnings.push(ResolveWarning::FetchFailed {
                        pull_request: pr.to_string(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        if commits.is_empty() {
            return Err(CheckError::AllPrFetchesFailed {
                attempted: pull_requests.len(),
            });
        }

        Ok(Membership {
            commits,
            pull_requests,
            warnings,
        })
    }
}
