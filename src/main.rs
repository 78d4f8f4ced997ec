use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use release_check::check::{CheckOutcome, OutputFormat, ReleaseChecker, ReportGenerator};
use release_check::config::Config;
use release_check::git::{BranchDiff, BranchDiffReader, GitRepository};
use release_check::github::GitHubClient;

#[derive(Parser)]
#[command(name = "release-check")]
#[command(about = "Check that a branch merge only releases commits from the given pull requests")]
struct Cli {
    /// GitHub token (can also be set via GITHUB_TOKEN env var)
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Path inside the repository to check
    #[arg(long, default_value = ".")]
    repo: PathBuf,

    /// Config file (defaults to release-check.toml in the repository root)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Branch holding the changes to release
    #[arg(long, global = true)]
    source: Option<String>,

    /// Branch the changes are merged into
    #[arg(long, global = true)]
    target: Option<String>,

    /// Disqualifying message pattern; replaces the configured list
    #[arg(long = "exclude", global = true)]
    exclude: Vec<String>,

    /// Log debug output unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify every commit the source branch adds over the target
    Check {
        /// Pull request URL, e.g. https://github.com/owner/repo/pull/123
        #[arg(long = "pr", required = true, num_args = 1..)]
        prs: Vec<String>,

        /// Output file path (stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format
        #[arg(short = 'f', long, default_value = "markdown")]
        format: OutputFormat,
    },

    /// List the commits the source branch adds over the target
    Diff,

    /// Print the effective configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(if cli.verbose { "debug" } else { "info" })
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let repo = GitRepository::discover(&cli.repo)
        .with_context(|| format!("Failed to open git repository at {}", cli.repo.display()))?;
    let repo_root = repo.workdir().unwrap_or(cli.repo.as_path()).to_path_buf();

    let mut config = Config::discover(cli.config.as_deref(), &repo_root)?;
    if let Some(source) = cli.source {
        config.branches.source = source;
    }
    if let Some(target) = cli.target {
        config.branches.target = target;
    }
    if !cli.exclude.is_empty() {
        config.patterns.exclude = cli.exclude;
    }

    match cli.command {
        Commands::Check {
            prs,
            output,
            format,
        } => {
            let github_client = GitHubClient::new(cli.token, config.github.api_base.clone())
                .context("Failed to create GitHub client")?;
            let checker = ReleaseChecker::new(&repo, &github_client, &config);
            let outcome = checker.run(&prs).await?;

            let generator = ReportGenerator::new(format)?;
            let (content, flagged) = match &outcome {
                CheckOutcome::NoDifferences { source, target } => {
                    (generator.generate_no_differences(source, target)?, 0)
                }
                CheckOutcome::Checked(result) => {
                    (generator.generate(result)?, result.summary.flagged)
                }
            };

            if let Some(output_path) = output {
                std::fs::write(&output_path, content)
                    .with_context(|| format!("Failed to write {}", output_path.display()))?;
                println!("Report written to {}", output_path.display());
            } else {
                println!("{}", content);
            }

            if flagged > 0 {
                std::process::exit(1);
            }
        }
        Commands::Diff => {
            let (source, target) = (&config.branches.source, &config.branches.target);
            match BranchDiffReader::new(&repo).diff(source, target)? {
                BranchDiff::Empty => {
                    println!("No differences between {} and {}.", source, target);
                }
                BranchDiff::Commits(commits) => {
                    println!("{} commit(s) on {} not in {}:", commits.len(), source, target);
                    for commit in commits {
                        println!("  {} {} ({})", commit.short_sha(), commit.summary(), commit.author);
                    }
                }
            }
        }
        Commands::Config => {
            print!("{}", config.to_toml_string()?);
        }
    }

    Ok(())
}
