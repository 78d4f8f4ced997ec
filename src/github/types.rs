use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

static PULL_REQUEST_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^https?://(?P<host>[^/\s]+)/(?P<owner>[A-Za-z0-9_.-]+)/(?P<repo>[A-Za-z0-9_.-]+)/pull/(?P<number>[0-9]+)(?:/(?:commits|files|checks))?/?(?:[?#]\S*)?$",
    )
    .unwrap()
});

/// A pull request identified by `https://<host>/<owner>/<repo>/pull/<number>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PullRequestRef {
    pub host: String,
    pub owner: String,
    pub repo: String,
    pub number: u64,
}

impl PullRequestRef {
    pub fn url(&self) -> String {
        format!(
            "https://{}/{}/{}/pull/{}",
            self.host, self.owner, self.repo, self.number
        )
    }
}

impl FromStr for PullRequestRef {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let caps = PULL_REQUEST_URL
            .captures(s.trim())
            .ok_or_else(|| format!("not a pull request URL: {s}"))?;
        let number = caps["number"]
            .parse::<u64>()
            .map_err(|e| format!("invalid pull request number in {s}: {e}"))?;
        if number == 0 {
            return Err(format!("invalid pull request number in {s}: 0"));
        }

        Ok(PullRequestRef {
            host: caps["host"].to_lowercase(),
            owner: caps["owner"].to_string(),
            repo: caps["repo"].to_string(),
            number,
        })
    }
}

impl fmt::Display for PullRequestRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}#{}", self.owner, self.repo, self.number)
    }
}

/// One entry of `GET /repos/{owner}/{repo}/pulls/{number}/commits`.
#[derive(Debug, Clone, Deserialize)]
pub struct PrCommit {
    pub sha: String,
    pub commit: PrCommitDetail,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PrCommitDetail {
    pub message: String,
    pub author: Option<PrCommitAuthor>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PrCommitAuthor {
    pub name: Option<String>,
    pub email: Option<String>,
}
