//! GitHub Release management: create the release object and upload artifacts to it

use crate::error::{PublishError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Configuration for GitHub releases
#[derive(Debug, Clone)]
pub struct GitHubReleaseConfig {
    /// API base URL, e.g. `https://api.github.com`
    pub api_base: String,
    /// Repository owner
    pub owner: String,
    /// Repository name
    pub repo: String,
    /// Pre-obtained access token
    pub token: String,
}

#[derive(Debug, Serialize)]
struct CreateReleaseRequest<'a> {
    tag_name: &'a str,
    target_commitish: &'a str,
    name: &'a str,
    body: &'a str,
}

#[derive(Debug, Deserialize)]
struct CreatedRelease {
    upload_url: String,
    #[serde(default)]
    html_url: Option<String>,
}

/// GitHub release manager
#[derive(Debug, Clone)]
pub struct GitHubReleaseManager {
    client: reqwest::Client,
    config: GitHubReleaseConfig,
}

impl GitHubReleaseManager {
    /// Create new GitHub release manager
    pub fn new(config: GitHubReleaseConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(std::io::Error::other)?;

        Ok(Self { client, config })
    }

    fn authorization(&self) -> String {
        format!("token {}", self.config.token)
    }

    /// Create a release and return its upload URL with the URI template suffix removed
    pub async fn create_release(
        &self,
        tag: &str,
        target_branch: &str,
        title: &str,
        body: &str,
    ) -> Result<String> {
        let url = format!(
            "{}/repos/{}/{}/releases",
            self.config.api_base.trim_end_matches('/'),
            self.config.owner,
            self.config.repo
        );
        log::info!("POST {url} (tag {tag})");

        let request_failed = |status: String, body: String| PublishError::PublishRequestFailed {
            tag: tag.to_string(),
            status,
            body,
        };

        let response = self
            .client
            .post(&url)
            .header(reqwest::header::AUTHORIZATION, self.authorization())
            .json(&CreateReleaseRequest {
                tag_name: tag,
                target_commitish: target_branch,
                name: title,
                body,
            })
            .send()
            .await
            .map_err(|e| request_failed("request".to_string(), e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_string());
            return Err(request_failed(status.to_string(), body).into());
        }

        let release: CreatedRelease = response
            .json()
            .await
            .map_err(|e| request_failed(status.to_string(), format!("Failed to parse response: {e}")))?;

        if let Some(html_url) = &release.html_url {
            log::info!("Created release {html_url}");
        }

        Ok(strip_upload_url_template(&release.upload_url).to_string())
    }

    /// Upload one artifact to a release
    pub async fn upload_asset(
        &self,
        upload_url: &str,
        filename: &str,
        content: Vec<u8>,
        mime_type: &str,
    ) -> Result<()> {
        log::info!("POST {upload_url}?name={filename} ({} bytes, {mime_type})", content.len());

        let upload_failed = |status: String, body: String| PublishError::AssetUploadFailed {
            filename: filename.to_string(),
            status,
            body,
        };

        let response = self
            .client
            .post(upload_url)
            .header(reqwest::header::AUTHORIZATION, self.authorization())
            .header(reqwest::header::CONTENT_TYPE, mime_type)
            .query(&[("name", filename)])
            .body(content)
            .send()
            .await
            .map_err(|e| upload_failed("request".to_string(), e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_string());
            return Err(upload_failed(status.to_string(), body).into());
        }

        Ok(())
    }

    /// Upload artifacts in order, stopping at the first failure.
    ///
    /// Returns the uploaded file names.
    pub async fn upload_artifacts(
        &self,
        upload_url: &str,
        artifacts: &[(PathBuf, &str)],
    ) -> Result<Vec<String>> {
        let mut uploaded = Vec::with_capacity(artifacts.len());

        for (path, mime_type) in artifacts {
            let Some(filename) = path.file_name().and_then(|name| name.to_str()) else {
                log::warn!("Skipping artifact with non UTF-8 name: {}", path.display());
                continue;
            };

            let content = tokio::fs::read(path).await?;
            self.upload_asset(upload_url, filename, content, mime_type).await?;
            uploaded.push(filename.to_string());
        }

        Ok(uploaded)
    }
}

/// Remove the `{?name,label}` URI template suffix from an upload URL
pub fn strip_upload_url_template(upload_url: &str) -> &str {
    match upload_url.find('{') {
        Some(index) => &upload_url[..index],
        None => upload_url,
    }
}
