/// Common test utilities and helpers for RelSentry tests
use std::path::PathBuf;

use relsentry::config::GitHubConfig;
use relsentry::{GitHubClient, StateStore, SyncEngine};
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const USER_AGENT: &str = "relsentry-tests";

/// A mock GitHub API plus a scratch directory for the baseline file
pub struct TestEnvironment {
    pub server: MockServer,
    pub temp_dir: TempDir,
}

impl TestEnvironment {
    pub async fn new() -> Self {
        Self {
            server: MockServer::start().await,
            temp_dir: TempDir::new().expect("Failed to create temp dir"),
        }
    }

    pub fn github_config(&self) -> GitHubConfig {
        GitHubConfig {
            api_endpoint: self.server.uri(),
            account: "tester".to_string(),
            user_agent: USER_AGENT.to_string(),
            timeout: Some(10),
        }
    }

    pub fn state_path(&self) -> PathBuf {
        self.temp_dir.path().join("releases.json")
    }

    pub fn store(&self) -> StateStore {
        StateStore::new(self.state_path())
    }

    pub fn engine(&self) -> SyncEngine<GitHubClient> {
        let client = GitHubClient::new(&self.github_config()).expect("Failed to build client");
        SyncEngine::new(client, self.store())
    }

    pub fn read_state(&self) -> String {
        std::fs::read_to_string(self.state_path()).expect("Failed to read state file")
    }

    pub async fn mock_starred(&self, account: &str, repos: &[&str]) {
        let body: Vec<_> = repos
            .iter()
            .enumerate()
            .map(|(id, name)| json!({ "id": id, "full_name": name, "private": false }))
            .collect();

        Mock::given(method("GET"))
            .and(path(format!("/users/{}/starred", account)))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_release(&self, repo: &str, tag: &str) {
        Mock::given(method("GET"))
            .and(path(format!("/repos/{}/releases/latest", repo)))
            .respond_with(ResponseTemplate::new(200).set_body_json(release_json(repo, tag)))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_no_release(&self, repo: &str) {
        Mock::given(method("GET"))
            .and(path(format!("/repos/{}/releases/latest", repo)))
            .respond_with(
                ResponseTemplate::new(404).set_body_json(json!({ "message": "Not Found" })),
            )
            .mount(&self.server)
            .await;
    }
}

pub fn release_json(repo: &str, tag: &str) -> serde_json::Value {
    json!({
        "id": 1,
        "tag_name": tag,
        "name": format!("Release {}", tag),
        "html_url": format!("https://github.com/{}/releases/tag/{}", repo, tag),
        "body": format!("Changes in {}", tag),
        "draft": false,
        "prerelease": false
    })
}
