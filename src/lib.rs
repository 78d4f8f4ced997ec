//! Release check: verify that merging a source branch into a target branch
//! only ships commits that belong to the named pull requests and that carry
//! no disqualifying marker in their message.

pub mod check;
pub mod config;
pub mod error;
pub mod git;
pub mod github;

pub use check::{CheckOutcome, ReleaseCheckResult, ReleaseChecker};
pub use config::Config;
pub use error::{CheckError, FetchError};
