//! GitHub REST client implementing [`SourceHost`].

use std::time::Duration;

use async_trait::async_trait;
use praxis_guard_core::{
    CheckContext, CheckRunId, CheckRunUpdate, FileChange, HostResult, NewCheckRun, SourceHost,
    LEDGER_DIR,
};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::config::GithubConfig;
use crate::error::GithubError;
use crate::Result;

/// Page size used for paginated listings (GitHub maximum).
pub const PER_PAGE: usize = 100;

/// GitHub stops listing pull request files after 3000 entries.
const MAX_FILE_PAGES: usize = 30;

const API_VERSION: &str = "2022-11-28";

/// Entry of a repository directory listing.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ContentEntry {
    pub name: String,
    pub path: String,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Deserialize)]
struct RefPayload {
    sha: String,
}

#[derive(Debug, Deserialize)]
struct PullRequestPayload {
    number: u64,
    head: RefPayload,
    base: RefPayload,
}

/// Head and base revisions of a pull request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestRefs {
    pub number: u64,
    pub head_sha: String,
    pub base_sha: String,
}

#[derive(Debug, Deserialize)]
struct CheckRunPayload {
    id: u64,
}

/// GitHub API client
pub struct GithubClient {
    config: GithubConfig,
    http: reqwest::Client,
}

impl GithubClient {
    /// Create a client for `config`
    pub fn new(config: GithubConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
        headers.insert("x-github-api-version", HeaderValue::from_static(API_VERSION));
        if let Some(token) = &config.token {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|e| GithubError::InvalidConfig(format!("token: {}", e)))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(GithubClient { config, http })
    }

    /// Create client from environment variables
    pub fn from_env() -> Result<Self> {
        Self::new(GithubConfig::from_env())
    }

    /// Fail early when an operation needs authentication
    pub fn require_token(&self) -> Result<()> {
        match self.config.token {
            Some(_) => Ok(()),
            None => Err(GithubError::MissingToken),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url(), path)
    }

    /// Send a request and turn non-success statuses into errors
    async fn send(&self, request: RequestBuilder, what: &str) -> Result<Response> {
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        if status == StatusCode::NOT_FOUND {
            return Err(GithubError::NotFound(what.to_string()));
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<Value>(&body)
            .ok()
            .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_string))
            .unwrap_or(body);
        Err(GithubError::Api {
            status: status.as_u16(),
            message,
        })
    }

    /// Fetch head/base revisions of a pull request
    pub async fn get_pull_request(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
    ) -> Result<PullRequestRefs> {
        let what = format!("pull request {}/{}#{}", owner, repo, number);
        let request = self
            .http
            .get(self.url(&format!("/repos/{}/{}/pulls/{}", owner, repo, number)));
        let pr: PullRequestPayload = self.send(request, &what).await?.json().await?;
        Ok(PullRequestRefs {
            number: pr.number,
            head_sha: pr.head.sha,
            base_sha: pr.base.sha,
        })
    }

    /// List every file changed by a pull request, following pagination
    pub async fn list_pull_request_files(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
    ) -> Result<Vec<FileChange>> {
        let what = format!("files of {}/{}#{}", owner, repo, number);
        let url = self.url(&format!("/repos/{}/{}/pulls/{}/files", owner, repo, number));
        let mut files = Vec::new();

        for page in 1..=MAX_FILE_PAGES {
            let request = self
                .http
                .get(&url)
                .query(&[("per_page", PER_PAGE), ("page", page)]);
            let batch: Vec<FileChange> = self.send(request, &what).await?.json().await?;
            let count = batch.len();
            files.extend(batch);
            debug!(page, count, "fetched pull request files");
            if count < PER_PAGE {
                break;
            }
        }

        Ok(files)
    }

    /// List a repository directory at `git_ref`.
    ///
    /// A missing directory, or a path that is a file, yields an empty list.
    pub async fn list_directory(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
        git_ref: Option<&str>,
    ) -> Result<Vec<ContentEntry>> {
        let what = format!("{}/{}:{}", owner, repo, path);
        let mut request = self
            .http
            .get(self.url(&format!("/repos/{}/{}/contents/{}", owner, repo, path)));
        if let Some(r) = git_ref {
            request = request.query(&[("ref", r)]);
        }

        let body: Value = match self.send(request, &what).await {
            Ok(response) => response.json().await?,
            Err(GithubError::NotFound(_)) => {
                debug!(path, "directory not found");
                return Ok(Vec::new());
            }
            Err(e) => return Err(e),
        };

        match body {
            Value::Array(_) => {
                serde_json::from_value(body).map_err(|e| GithubError::Decode(e.to_string()))
            }
            _ => Ok(Vec::new()),
        }
    }

    /// Create a check run
    pub async fn create_check_run(
        &self,
        owner: &str,
        repo: &str,
        check_run: &NewCheckRun,
    ) -> Result<CheckRunId> {
        let what = format!("check runs of {}/{}", owner, repo);
        let request = self
            .http
            .post(self.url(&format!("/repos/{}/{}/check-runs", owner, repo)))
            .json(check_run);
        let created: CheckRunPayload = self.send(request, &what).await?.json().await?;
        info!(check_run_id = created.id, "created check run");
        Ok(CheckRunId(created.id))
    }

    /// Update a check run
    pub async fn update_check_run(
        &self,
        owner: &str,
        repo: &str,
        id: CheckRunId,
        update: &CheckRunUpdate,
    ) -> Result<()> {
        let what = format!("check run {} of {}/{}", id, owner, repo);
        let request = self
            .http
            .patch(self.url(&format!("/repos/{}/{}/check-runs/{}", owner, repo, id)))
            .json(update);
        self.send(request, &what).await?;
        Ok(())
    }
}

#[async_trait]
impl SourceHost for GithubClient {
    async fn list_changed_files(&self, ctx: &CheckContext) -> HostResult<Vec<FileChange>> {
        Ok(self
            .list_pull_request_files(&ctx.owner, &ctx.repo, ctx.pull_number)
            .await?)
    }

    async fn get_ledger_entries(
        &self,
        owner: &str,
        repo: &str,
        git_ref: Option<&str>,
    ) -> HostResult<Vec<String>> {
        let entries = self.list_directory(owner, repo, LEDGER_DIR, git_ref).await?;
        Ok(entries
            .into_iter()
            .filter(|e| e.kind == "file")
            .map(|e| e.name)
            .collect())
    }

    async fn create_check_run(
        &self,
        owner: &str,
        repo: &str,
        check_run: &NewCheckRun,
    ) -> HostResult<CheckRunId> {
        Ok(GithubClient::create_check_run(self, owner, repo, check_run).await?)
    }

    async fn update_check_run(
        &self,
        owner: &str,
        repo: &str,
        id: CheckRunId,
        update: &CheckRunUpdate,
    ) -> HostResult<()> {
        Ok(GithubClient::update_check_run(self, owner, repo, id, update).await?)
    }
}
