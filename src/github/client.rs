use async_trait::async_trait;
use octocrab::Octocrab;
use serde::Serialize;
use tracing::debug;

use super::types::{PrCommit, PullRequestRef};
use super::PullRequestSource;
use crate::error::FetchError;

const GITHUB_HOST: &str = "github.com";
const PER_PAGE: u8 = 100;
// GitHub stops listing pull request commits after 250 entries.
const MAX_PAGES: u32 = 3;

#[derive(Serialize)]
struct PageParams {
    per_page: u8,
    page: u32,
}

pub struct GitHubClient {
    client: Octocrab,
    token: Option<String>,
    /// Set when every request goes to one configured API root.
    fixed_base: bool,
}

impl GitHubClient {
    /// Client for `api_base`, or for api.github.com with per-host
    /// GitHub Enterprise endpoints when `api_base` is `None`.
    pub fn new(token: Option<String>, api_base: Option<String>) -> Result<Self, FetchError> {
        let fixed_base = api_base.is_some();
        let client = Self::build(token.as_deref(), api_base.as_deref())?;
        Ok(Self {
            client,
            token,
            fixed_base,
        })
    }

    fn build(token: Option<&str>, base_uri: Option<&str>) -> Result<Octocrab, FetchError> {
        let mut builder = Octocrab::builder();
        if let Some(token) = token {
            builder = builder.personal_token(token.to_string());
        }
        if let Some(base_uri) = base_uri {
            builder = builder.base_uri(base_uri.trim_end_matches('/'))?;
        }
        Ok(builder.build()?)
    }

    fn client_for(&self, pr: &PullRequestRef) -> Result<Option<Octocrab>, FetchError> {
        if self.fixed_base || pr.host == GITHUB_HOST {
            return Ok(None);
        }
        let base = format!("https://{}/api/v3", pr.host);
        debug!("Using GitHub Enterprise endpoint {}", base);
        Self::build(self.token.as_deref(), Some(&base)).map(Some)
    }

    async fn fetch_page(
        client: &Octocrab,
        pr: &PullRequestRef,
        page: u32,
    ) -> Result<Vec<PrCommit>, FetchError> {
        let route = format!("/repos/{}/{}/pulls/{}/commits", pr.owner, pr.repo, pr.number);
        let params = PageParams {
            per_page: PER_PAGE,
            page,
        };

        client
            .get::<Vec<PrCommit>, _, _>(route, Some(&params))
            .await
            .map_err(|e| match e {
                octocrab::Error::Serde { source, .. } => FetchError::Payload(source.to_string()),
                octocrab::Error::Json { source, .. } => FetchError::Payload(source.to_string()),
                other => FetchError::Api(other),
            })
    }
}

#[async_trait]
impl PullRequestSource for GitHubClient {
    async fn list_commits(&self, pr: &PullRequestRef) -> Result<Vec<PrCommit>, FetchError> {
        let enterprise = self.client_for(pr)?;
        let client = enterprise.as_ref().unwrap_or(&self.client);

        let mut commits = Vec::new();
        for page in 1..=MAX_PAGES {
            let batch = Self::fetch_page(client, pr, page).await?;
            let last_page = batch.len() < usize::from(PER_PAGE);
            commits.extend(batch);
            if last_page {
                break;
            }
        }

        if let Some(bad) = commits.iter().find(|c| c.sha.trim().is_empty()) {
            return Err(FetchError::Payload(format!(
                "commit without an identifier: {:?}",
                bad.commit.message
            )));
        }

        debug!("Fetched {} commit(s) for {}", commits.len(), pr);
        Ok(commits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn pr(number: u64) -> PullRequestRef {
        PullRequestRef {
            host: "github.com".to_string(),
            owner: "acme".to_string(),
            repo: "widgets".to_string(),
            number,
        }
    }

    fn commit_json(sha: &str, message: &str) -> serde_json::Value {
        serde_json::json!({
            "sha": sha,
            "commit": {
                "message": message,
                "author": { "name": "Ann", "email": "ann@example.com" }
            }
        })
    }

    #[tokio::test]
    async fn lists_pull_request_commits() {
        let mut server = mockito::Server::new_async().await;
        let body = serde_json::json!([commit_json("abc123", "Fix bug"), commit_json("DEF456", "Add docs")]);
        let mock = server
            .mock("GET", "/repos/acme/widgets/pulls/12/commits")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("per_page".into(), "100".into()),
                Matcher::UrlEncoded("page".into(), "1".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body.to_string())
            .create_async()
            .await;

        let client = GitHubClient::new(None, Some(server.url())).unwrap();
        let commits = client.list_commits(&pr(12)).await.unwrap();

        mock.assert_async().await;
        let shas: Vec<_> = commits.iter().map(|c| c.sha.as_str()).collect();
        assert_eq!(shas, vec!["abc123", "DEF456"]);
    }

    #[tokio::test]
    async fn follows_full_pages() {
        let mut server = mockito::Server::new_async().await;
        let full: Vec<_> = (0..100).map(|i| commit_json(&format!("{i:040x}"), "work")).collect();
        let first = server
            .mock("GET", "/repos/acme/widgets/pulls/3/commits")
            .match_query(Matcher::UrlEncoded("page".into(), "1".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(serde_json::Value::Array(full).to_string())
            .create_async()
            .await;
        let second = server
            .mock("GET", "/repos/acme/widgets/pulls/3/commits")
            .match_query(Matcher::UrlEncoded("page".into(), "2".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(serde_json::json!([commit_json("ffff", "last")]).to_string())
            .create_async()
            .await;

        let client = GitHubClient::new(None, Some(server.url())).unwrap();
        let commits = client.list_commits(&pr(3)).await.unwrap();

        first.assert_async().await;
        second.assert_async().await;
        assert_eq!(commits.len(), 101);
    }

    #[tokio::test]
    async fn not_found_is_an_api_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/repos/acme/widgets/pulls/404/commits")
            .match_query(Matcher::Any)
            .with_status(404)
            .with_header("content-type", "application/json")
            .with_body(r#"{"message": "Not Found", "documentation_url": "https://docs.github.com"}"#)
            .create_async()
            .await;

        let client = GitHubClient::new(Some("token".to_string()), Some(server.url())).unwrap();
        let err = client.list_commits(&pr(404)).await.unwrap_err();
        assert!(matches!(err, FetchError::Api(_)), "{err:?}");
    }

    #[tokio::test]
    async fn malformed_payload_is_rejected() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/repos/acme/widgets/pulls/5/commits")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"unexpected": true}"#)
            .create_async()
            .await;

        let client = GitHubClient::new(None, Some(server.url())).unwrap();
        assert!(client.list_commits(&pr(5)).await.is_err());
    }

    #[tokio::test]
    async fn blank_identifier_is_a_payload_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/repos/acme/widgets/pulls/6/commits")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(serde_json::json!([commit_json("", "ghost")]).to_string())
            .create_async()
            .await;

        let client = GitHubClient::new(None, Some(server.url())).unwrap();
        let err = client.list_commits(&pr(6)).await.unwrap_err();
        assert!(matches!(err, FetchError::Payload(_)), "{err:?}");
    }
}
