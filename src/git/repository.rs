use chrono::{TimeZone, Utc};
use git2::{ErrorCode, Repository, Sort};
use std::path::Path;

use super::types::{Commit, CommitAuthor};
use super::VcsReader;

/// Read-only view of a local git repository.
pub struct GitRepository {
    repo: Repository,
}

impl GitRepository {
    pub fn discover(path: &Path) -> Result<Self, git2::Error> {
        let repo = Repository::discover(path)?;
        Ok(Self { repo })
    }

    pub fn workdir(&self) -> Option<&Path> {
        self.repo.workdir()
    }

    fn to_commit(commit: &git2::Commit<'_>) -> Commit {
        let author = commit.author();
        let date = Utc
            .timestamp_opt(commit.time().seconds(), 0)
            .single()
            .unwrap_or_else(Utc::now);

        Commit {
            sha: commit.id().to_string(),
            message: String::from_utf8_lossy(commit.message_bytes()).into_owned(),
            author: CommitAuthor {
                name: author.name().unwrap_or("Unknown").to_string(),
                email: author.email().unwrap_or("").to_string(),
            },
            date,
            parent_count: commit.parent_count(),
        }
    }
}

impl VcsReader for GitRepository {
    fn verify_ref_exists(&self, reference: &str) -> Result<bool, git2::Error> {
        let resolved = self
            .repo
            .revparse_single(reference)
            .and_then(|object| object.peel_to_commit());
        match resolved {
            Ok(_) => Ok(true),
            Err(e)
                if matches!(
                    e.code(),
                    ErrorCode::NotFound | ErrorCode::Ambiguous | ErrorCode::InvalidSpec
                ) =>
            {
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    fn log_range(&self, from: &str, to: &str) -> Result<Vec<Commit>, git2::Error> {
        let from_commit = self.repo.revparse_single(from)?.peel_to_commit()?;
        let to_commit = self.repo.revparse_single(to)?.peel_to_commit()?;

        // Same order as `git log from..to`: newest first.
        let mut revwalk = self.repo.revwalk()?;
        revwalk.set_sorting(Sort::TOPOLOGICAL | Sort::TIME)?;
        revwalk.push(to_commit.id())?;
        revwalk.hide(from_commit.id())?;

        let mut commits = Vec::new();
        for oid in revwalk {
            let commit = self.repo.find_commit(oid?)?;
            commits.push(Self::to_commit(&commit));
        }

        Ok(commits)
    }
}
