use serde::{Deserialize, Serialize};

pub const DEFAULT_SOURCE_BRANCH: &str = "develop";
pub const DEFAULT_TARGET_BRANCH: &str = "main";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub branches: BranchesConfig,
    pub patterns: PatternsConfig,
    pub github: GithubConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BranchesConfig {
    pub source: String,
    pub target: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatternsConfig {
    /// Literal, case-sensitive substrings that disqualify a commit message.
    /// Checked in order; the first one found is reported.
    pub exclude: Vec<String>,
    /// Message prefixes that mark a commit as routine merge bookkeeping.
    pub merge_prefixes: Vec<String>,
    /// Also treat any commit with more than one parent as a merge.
    pub merge_by_parents: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GithubConfig {
    /// API root to query. Derived from the pull request host when unset.
    pub api_base: Option<String>,
    pub timeout_secs: u64,
}

impl Default for BranchesConfig {
    fn default() -> Self {
        BranchesConfig {
            source: DEFAULT_SOURCE_BRANCH.to_string(),
            target: DEFAULT_TARGET_BRANCH.to_string(),
        }
    }
}

impl Default for PatternsConfig {
    fn default() -> Self {
        PatternsConfig {
            exclude: vec![
                "WIP".to_string(),
                "DO NOT MERGE".to_string(),
                "NOT FOR RELEASE".to_string(),
            ],
            merge_prefixes: vec![
                "Merge pull request".to_string(),
                "Merge branch".to_string(),
            ],
            merge_by_parents: false,
        }
    }
}

impl Default for GithubConfig {
    fn default() -> Self {
        GithubConfig {
            api_base: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}
