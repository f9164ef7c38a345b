//! Redmine REST APIクライアント
//!
//! APIキーと接続先は `RedmineContext` として明示的に渡す。
//! 一覧系のエンドポイントは `offset` / `limit` で全件を取得する。

use super::{IssueQuery, IssueSource, PhotoDownloader};
use crate::error::{ReportError, Result};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use welding_report_common::redmine::{
    AccountResponse, Issue, IssueListResponse, IssueResponse, Project, ProjectResponse, User,
};

const API_KEY_HEADER: &str = "X-Redmine-API-Key";
const PAGE_LIMIT: u32 = 100;

/// 接続先とAPIキー
#[derive(Debug, Clone)]
pub struct RedmineContext {
    pub base_url: String,
    pub api_key: String,
}

impl RedmineContext {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    /// 相対パスを絶対URLにする
    pub fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

pub struct RedmineClient {
    client: reqwest::Client,
    context: RedmineContext,
}

impl RedmineClient {
    pub fn new(context: RedmineContext, accept_invalid_certs: bool) -> Result<Self> {
        if context.base_url.trim().is_empty() {
            return Err(ReportError::Config("RedmineのURLが設定されていません".into()));
        }
        let client = reqwest::Client::builder()
            .danger_accept_invalid_certs(accept_invalid_certs)
            .build()?;
        Ok(Self { client, context })
    }

    pub fn context(&self) -> &RedmineContext {
        &self.context
    }

    /// GETしてJSONを返す（404は None）
    async fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<Option<T>> {
        let url = self.context.url(path);
        tracing::debug!(%url, ?query, "Redmine GET");

        let response = self
            .client
            .get(&url)
            .header(API_KEY_HEADER, &self.context.api_key)
            .query(query)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ReportError::Transport(format!("{} {}: {}", status, url, body)));
        }

        let body = response.bytes().await?;
        Ok(Some(serde_json::from_slice(&body)?))
    }

    /// チケット一覧を全ページ取得
    async fn list_issues(&self, path: &str, query: &[(&str, String)]) -> Result<Vec<Issue>> {
        let mut issues = Vec::new();
        let mut offset: u32 = 0;

        loop {
            let mut page_query = query.to_vec();
            page_query.push(("offset", offset.to_string()));
            page_query.push(("limit", PAGE_LIMIT.to_string()));

            let page: IssueListResponse = self
                .get_json(path, &page_query)
                .await?
                .ok_or_else(|| ReportError::NotFound(path.to_string()))?;

            let received = page.issues.len() as u32;
            issues.extend(page.issues);

            match next_offset(offset, received, page.total_count) {
                Some(next) => offset = next,
                None => break,
            }
        }

        tracing::debug!(path, count = issues.len(), "チケット一覧を取得");
        Ok(issues)
    }
}

/// 次ページの開始位置（最終ページなら None）
///
/// `total_count` が無い場合は1ページのみ。
fn next_offset(offset: u32, received: u32, total_count: Option<u32>) -> Option<u32> {
    let next = offset + received;
    match total_count {
        Some(total) if received > 0 && next < total => Some(next),
        _ => None,
    }
}

impl IssueSource for RedmineClient {
    async fn issue(&self, id: u32) -> Result<Issue> {
        let response: Option<IssueResponse> = self.get_json(&format!("issues/{}.json", id), &[]).await?;
        response
            .map(|r| r.issue)
            .ok_or_else(|| ReportError::NotFound(format!("#{}", id)))
    }

    async fn child_issues(&self, project: &str, parent_id: u32) -> Result<Vec<Issue>> {
        let query = [
            ("parent_id", parent_id.to_string()),
            ("status_id", "*".to_string()),
            ("include", "attachments".to_string()),
        ];
        self.list_issues(&format!("projects/{}/issues.json", project), &query).await
    }

    async fn project(&self, identifier: &str) -> Result<Option<Project>> {
        let response: Option<ProjectResponse> =
            self.get_json(&format!("projects/{}.json", identifier), &[]).await?;
        Ok(response.map(|r| r.project))
    }

    async fn project_issues(&self, identifier: &str, query: &IssueQuery) -> Result<Vec<Issue>> {
        self.list_issues(&format!("projects/{}/issues.json", identifier), query).await
    }

    async fn current_user(&self) -> Result<User> {
        let response: Option<AccountResponse> = self.get_json("my/account.json", &[]).await?;
        response
            .map(|r| r.user)
            .ok_or_else(|| ReportError::NotFound("my/account.json".into()))
    }
}

impl PhotoDownloader for RedmineClient {
    async fn download(&self, url: &str) -> Result<Vec<u8>> {
        let url = if url.starts_with("http://") || url.starts_with("https://") {
            url.to_string()
        } else {
            self.context.url(url)
        };

        let response = self
            .client
            .get(&url)
            .header(API_KEY_HEADER, &self.context.api_key)
            .send()
            .await?
            .error_for_status()?;
        Ok(response.bytes().await?.to_vec())
    }
}
