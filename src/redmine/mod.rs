//! Redmine連携
//!
//! 集計処理は `IssueSource`、写真取得は `PhotoDownloader` を通してのみ
//! Redmineにアクセスする。テストでは偽の実装に差し替える。

pub mod client;

pub use client::{RedmineClient, RedmineContext};

use crate::error::Result;
use welding_report_common::redmine::{Issue, Project, User};

/// 検索条件（クエリ文字列のキーと値）
pub type IssueQuery = Vec<(&'static str, String)>;

#[allow(async_fn_in_trait)]
pub trait IssueSource {
    /// チケット1件（存在しなければ `NotFound`）
    async fn issue(&self, id: u32) -> Result<Issue>;

    /// 親チケット配下の子チケット（添付ファイル付き）
    async fn child_issues(&self, project: &str, parent_id: u32) -> Result<Vec<Issue>>;

    /// プロジェクト情報（存在しなければ None）
    async fn project(&self, identifier: &str) -> Result<Option<Project>>;

    /// プロジェクト内のチケットを条件で検索
    async fn project_issues(&self, identifier: &str, query: &IssueQuery) -> Result<Vec<Issue>>;

    /// APIキーの持ち主
    async fn current_user(&self) -> Result<User>;
}

#[allow(async_fn_in_trait)]
pub trait PhotoDownloader {
    async fn download(&self, url: &str) -> Result<Vec<u8>>;
}
