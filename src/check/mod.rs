pub mod classifier;
pub mod membership;
pub mod report;
pub mod result;
pub mod runner;

pub use classifier::{ClassifiedCommit, CommitClassifier, Verdict};
pub use membership::{PrCommitSet, PrMembershipResolver, ResolveWarning};
pub use report::{OutputFormat, ReportGenerator};
pub use result::{CheckSummary, ReleaseCheckResult};
pub use runner::{CheckOutcome, ReleaseChecker};
