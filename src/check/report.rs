use anyhow::Result;
use handlebars::Handlebars;
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::classifier::ClassifiedCommit;
use super::result::ReleaseCheckResult;

const REPORT_TEMPLATE: &str = include_str!("../../templates/report.md.hbs");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Markdown,
    Json,
    Html,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            "json" => Ok(OutputFormat::Json),
            "html" => Ok(OutputFormat::Html),
            _ => Err(format!("Unknown output format: {}", s)),
        }
    }
}

pub struct ReportGenerator {
    template_engine: Handlebars<'static>,
    format: OutputFormat,
}

impl ReportGenerator {
    pub fn new(format: OutputFormat) -> Result<Self> {
        let mut template_engine = Handlebars::new();
        // Values are escaped up front for HTML and left raw for markdown.
        template_engine.register_escape_fn(handlebars::no_escape);
        template_engine.register_template_string("report", REPORT_TEMPLATE)?;

        Ok(Self {
            template_engine,
            format,
        })
    }

    pub fn generate(&self, result: &ReleaseCheckResult) -> Result<String> {
        match self.format {
            OutputFormat::Markdown => self.generate_markdown(result, false),
            OutputFormat::Json => Ok(serde_json::to_string_pretty(result)?),
            OutputFormat::Html => {
                let markdown = self.generate_markdown(result, true)?;
                let title = format!(
                    "Release check: {} → {}",
                    handlebars::html_escape(&result.source_branch),
                    handlebars::html_escape(&result.target_branch)
                );
                Ok(wrap_html(&title, &markdown))
            }
        }
    }

    /// Report for a source branch that adds nothing over the target.
    pub fn generate_no_differences(&self, source: &str, target: &str) -> Result<String> {
        let message = format!("No differences between {} and {}.", source, target);
        match self.format {
            OutputFormat::Markdown => Ok(format!("{}\n", message)),
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&json!({
                "source_branch": source,
                "target_branch": target,
                "status": "no_differences",
            }))?),
            OutputFormat::Html => Ok(wrap_html(
                "Release check",
                &handlebars::html_escape(&message),
            )),
        }
    }

    fn generate_markdown(&self, result: &ReleaseCheckResult, escape: bool) -> Result<String> {
        let text = |value: &str| -> String {
            if escape {
                handlebars::html_escape(&escape_markdown(value))
            } else {
                value.to_string()
            }
        };
        let commit_data = |c: &ClassifiedCommit| {
            json!({
                "sha": c.commit.short_sha(),
                "subject": text(c.commit.summary()),
                "body": c.commit.body_lines().into_iter().map(|line| text(line)).collect::<Vec<_>>(),
                "author": text(&c.commit.author.to_string()),
                "label": text(&c.label),
                "in_pr": c.in_pr,
            })
        };

        let data = json!({
            "source": text(&result.source_branch),
            "target": text(&result.target_branch),
            "checked_at": result.checked_at.format("%Y-%m-%d %H:%M UTC").to_string(),
            "pull_requests": result.pull_requests.iter().map(|pr| json!({
                "name": text(&pr.to_string()),
                "url": pr.url(),
            })).collect::<Vec<_>>(),
            "summary": result.summary,
            "flagged": result.flagged().map(commit_data).collect::<Vec<_>>(),
            "safe": result.release_safe().map(commit_data).collect::<Vec<_>>(),
            "warnings": result.warnings.iter().map(|w| text(&w.to_string())).collect::<Vec<_>>(),
        });

        Ok(self.template_engine.render("report", &data)?)
    }
}

/// Backslash-escape characters that markdown would turn into markup, so
/// commit text stays literal once rendered to HTML. `<`, `>` and backticks
/// are left to `html_escape`, whose entities markdown never parses as markup.
fn escape_markdown(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        if matches!(
            ch,
            '\\' | '*' | '_' | '[' | ']' | '(' | ')' | '{' | '}' | '#' | '!' | '|' | '~'
        ) {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

fn wrap_html(title: &str, markdown: &str) -> String {
    let parser = pulldown_cmark::Parser::new(markdown);
    let mut body = String::new();
    pulldown_cmark::html::push_html(&mut body, parser);

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{}</title>
    <style>
        body {{ font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Helvetica, Arial, sans-serif; max-width: 900px; margin: 0 auto; padding: 20px; }}
        h1, h2 {{ border-bottom: 1px solid #e1e4e8; padding-bottom: 0.3em; }}
        code {{ background: #f6f8fa; padding: 2px 4px; border-radius: 3px; color: #3498db; }}
    </style>
</head>
<body>
    {}
</body>
</html>"#,
        title, body
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::check::classifier::{Classification, Verdict};
    use crate::check::membership::ResolveWarning;
    use crate::git::{Commit, CommitAuthor};
    use crate::github::PullRequestRef;
    use chrono::Utc;

    fn classified(sha: &str, message: &str, verdict: Verdict, in_pr: bool) -> ClassifiedCommit {
        ClassifiedCommit {
            commit: Commit {
                sha: sha.to_string(),
                message: message.to_string(),
                author: CommitAuthor {
                    name: "Ann".to_string(),
                    email: "ann@example.com".to_string(),
                },
                date: Utc::now(),
                parent_count: 1,
            },
            label: verdict.label().to_string(),
            verdict,
            in_pr,
        }
    }

    fn sample(commits: Vec<ClassifiedCommit>) -> ReleaseCheckResult {
        ReleaseCheckResult::new(
            "develop",
            "main",
            vec!["https://github.com/acme/widgets/pull/12".parse::<PullRequestRef>().unwrap()],
            vec![ResolveWarning::FetchFailed {
                pull_request: "acme/widgets#13".to_string(),
                reason: "request timed out after 30s".to_string(),
            }],
            Classification {
                commits,
                merge_skipped: 1,
            },
        )
    }

    #[test]
    fn parses_output_formats() {
        assert_eq!("md".parse::<OutputFormat>().unwrap(), OutputFormat::Markdown);
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("html".parse::<OutputFormat>().unwrap(), OutputFormat::Html);
        assert!("pdf".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn markdown_lists_flagged_commits_with_their_label() {
        let result = sample(vec![
            classified("0123456789abcdef", "WIP: parser\n\nbody", Verdict::ExcludedByPattern("WIP".into()), true),
            classified("fedcba9876543210", "Fix bug", Verdict::ReleaseSafe, true),
        ]);
        let report = ReportGenerator::new(OutputFormat::Markdown).unwrap().generate(&result).unwrap();

        assert!(report.contains("# Release check: develop → main"));
        assert!(report.contains("[acme/widgets#12](https://github.com/acme/widgets/pull/12)"));
        assert!(report.contains("1 commit(s) not fit for release"));
        assert!(report.contains("`0123456` WIP: parser"));
        assert!(report.contains("**Author:** Ann <ann@example.com>"));
        assert!(report.contains("**Detected:** WIP (part of a pull request)"));
        assert!(report.contains("`fedcba9` Fix bug"));
        assert!(report.contains("could not fetch commits of acme/widgets#13"));
        assert!(report.contains("    > body"));
    }

    #[test]
    fn markdown_reports_safe_merge() {
        let result = sample(vec![classified("abcdef0", "Fix bug", Verdict::ReleaseSafe, true)]);
        let report = ReportGenerator::new(OutputFormat::Markdown).unwrap().generate(&result).unwrap();
        assert!(report.contains("Merging develop into main is safe."));
        assert!(!report.contains("not fit for release"));
    }

    #[test]
    fn html_escapes_commit_text() {
        let result = sample(vec![classified(
            "abcdef0",
            "Render <script>alert(1)</script>",
            Verdict::NotInPr,
            false,
        )]);
        let report = ReportGenerator::new(OutputFormat::Html).unwrap().generate(&result).unwrap();

        assert!(report.starts_with("<!DOCTYPE html>"));
        assert!(!report.contains("<script>"));
        assert!(report.contains("&lt;script&gt;"));
        assert!(report.contains("not in PR"));
    }

    #[test]
    fn html_keeps_markdown_in_commit_text_literal() {
        let result = sample(vec![classified(
            "abcdef0",
            "[docs](javascript:alert(1))\n\n![img](http://example.com/x.png) *bold*",
            Verdict::NotInPr,
            false,
        )]);
        let report = ReportGenerator::new(OutputFormat::Html).unwrap().generate(&result).unwrap();

        assert!(!report.contains("<a href"));
        assert!(!report.contains("<img"));
        assert!(!report.contains("<em>"));
        assert!(report.contains("[docs](javascript:alert(1))"));
        assert!(report.contains("*bold*"));
        assert!(report.contains("Ann &lt;ann@example.com&gt;"));
    }

    #[test]
    fn markdown_shows_body_of_flagged_commits() {
        let result = sample(vec![classified(
            "abcdef0",
            "Add cache\n\nDO NOT MERGE until the migration lands\nSecond line",
            Verdict::NotInPr,
            false,
        )]);
        let report = ReportGenerator::new(OutputFormat::Markdown).unwrap().generate(&result).unwrap();

        assert!(report.contains("  - **Message:**"));
        assert!(report.contains("    > DO NOT MERGE until the migration lands"));
        assert!(report.contains("    > Second line"));
    }

    #[test]
    fn json_carries_the_full_result() {
        let result = sample(vec![classified("abcdef0", "Fix", Verdict::NotInPr, false)]);
        let report = ReportGenerator::new(OutputFormat::Json).unwrap().generate(&result).unwrap();
        let value: serde_json::Value = serde_json::from_str(&report).unwrap();
        assert_eq!(value["summary"]["not_in_pr"], 1);
        assert_eq!(value["warnings"][0]["kind"], "fetch_failed");
        assert_eq!(value["pull_requests"][0]["number"], 12);
    }

    #[test]
    fn no_differences_is_informational() {
        let generator = ReportGenerator::new(OutputFormat::Json).unwrap();
        let value: serde_json::Value =
            serde_json::from_str(&generator.generate_no_differences("develop", "main").unwrap()).unwrap();
        assert_eq!(value["status"], "no_differences");

        let markdown = ReportGenerator::new(OutputFormat::Markdown)
            .unwrap()
            .generate_no_differences("develop", "main")
            .unwrap();
        assert_eq!(markdown, "No differences between develop and main.\n");
    }
}
