use thiserror::Error;

/// Fatal failures that stop a release check before a verdict is produced.
#[derive(Debug, Error)]
pub enum CheckError {
    #[error("branch reference `{reference}` could not be resolved")]
    RefNotFound { reference: String },

    #[error("no pull request references were given")]
    NoPullRequests,

    #[error("commits could not be fetched for any of the {attempted} pull request(s)")]
    AllPrFetchesFailed { attempted: usize },

    #[error("git error: {0}")]
    Git(#[from] git2::Error),
}

/// Failure to fetch the commit list of a single pull request.
///
/// These are downgraded to warnings by the membership resolver.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("GitHub API request failed: {0}")]
    Api(#[from] octocrab::Error),

    #[error("request timed out after {seconds}s")]
    Timeout { seconds: u64 },

    #[error("unexpected response payload: {0}")]
    Payload(String),
}
