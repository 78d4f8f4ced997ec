use serde::{Deserialize, Serialize};
use std::fmt;

use super::membership::PrCommitSet;
use crate::config::PatternsConfig;
use crate::git::Commit;

pub const NOT_IN_PR_LABEL: &str = "not in PR";
pub const RELEASE_SAFE_LABEL: &str = "release safe";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "pattern", rename_all = "snake_case")]
pub enum Verdict {
    ReleaseSafe,
    ExcludedByPattern(String),
    NotInPr,
    /// Routine merge bookkeeping. Never part of a report.
    MergeSkipped,
}

impl Verdict {
    pub fn is_flagged(&self) -> bool {
        matches!(self, Verdict::ExcludedByPattern(_) | Verdict::NotInPr)
    }

    pub fn label(&self) -> &str {
        match self {
            Verdict::ExcludedByPattern(pattern) => pattern.as_str(),
            Verdict::NotInPr => NOT_IN_PR_LABEL,
            Verdict::ReleaseSafe => RELEASE_SAFE_LABEL,
            Verdict::MergeSkipped => "merge",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::ExcludedByPattern(pattern) => write!(f, "excluded by \"{}\"", pattern),
            other => f.write_str(other.label()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifiedCommit {
    pub commit: Commit,
    pub verdict: Verdict,
    pub label: String,
    /// Whether the identifier belongs to one of the pull requests,
    /// whatever the verdict.
    pub in_pr: bool,
}

/// Output of one classification pass, in diff order with merges removed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classification {
    pub commits: Vec<ClassifiedCommit>,
    pub merge_skipped: usize,
}

pub struct CommitClassifier {
    exclude_patterns: Vec<String>,
    merge_prefixes: Vec<String>,
    merge_by_parents: bool,
}

impl CommitClassifier {
    pub fn new(exclude_patterns: Vec<String>, merge_prefixes: Vec<String>) -> Self {
        // An empty needle would match every message.
        let non_empty = |values: Vec<String>| -> Vec<String> {
            values.into_iter().filter(|v| !v.is_empty()).collect()
        };
        Self {
            exclude_patterns: non_empty(exclude_patterns),
            merge_prefixes: non_empty(merge_prefixes),
            merge_by_parents: false,
        }
    }

    pub fn from_config(config: &PatternsConfig) -> Self {
        Self::new(config.exclude.clone(), config.merge_prefixes.clone())
            .with_merge_by_parents(config.merge_by_parents)
    }

    pub fn with_merge_by_parents(mut self, enabled: bool) -> Self {
        self.merge_by_parents = enabled;
        self
    }

    pub fn is_merge(&self, commit: &Commit) -> bool {
        let message = commit.message.trim_start();
        self.merge_prefixes
            .iter()
            .any(|prefix| message.starts_with(prefix.as_str()))
            || (self.merge_by_parents && commit.parent_count > 1)
    }

    /// First configured pattern contained in `text`.
    pub fn matched_pattern(&self, text: &str) -> Option<&str> {
        self.exclude_patterns
            .iter()
            .map(String::as_str)
            .find(|pattern| text.contains(pattern))
    }

    /// A matched pattern wins over membership: a commit that belongs to a
    /// pull request is still flagged when its subject line carries a pattern.
    /// The message body is not searched.
    pub fn verdict(&self, commit: &Commit, pr_commits: &PrCommitSet) -> Verdict {
        if self.is_merge(commit) {
            return Verdict::MergeSkipped;
        }

        match self.matched_pattern(commit.summary()) {
            Some(pattern) => Verdict::ExcludedByPattern(pattern.to_string()),
            None if !pr_commits.contains(&commit.sha) => Verdict::NotInPr,
            None => Verdict::ReleaseSafe,
        }
    }

    pub fn classify(&self, commits: &[Commit], pr_commits: &PrCommitSet) -> Classification {
        let mut classification = Classification::default();

        for commit in commits {
            let verdict = self.verdict(commit, pr_commits);
            if verdict == Verdict::MergeSkipped {
                classification.merge_skipped += 1;
                continue;
            }

            classification.commits.push(ClassifiedCommit {
                label: verdict.label().to_string(),
                in_pr: pr_commits.contains(&commit.sha),
                commit: commit.clone(),
                verdict,
            });
        }

        classification
    }
}
