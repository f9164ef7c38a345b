//! Redmine REST APIのレスポンス型
//!
//! 必要なフィールドだけを定義し、欠けている項目はデフォルト値にする。

use crate::custom_fields::CustomField;
use serde::{Deserialize, Serialize};

/// `{ "id": .., "name": .. }` 形式の参照
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IdName {
    pub id: i64,
    pub name: String,
}

/// 添付ファイル
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Attachment {
    pub id: i64,
    pub filename: String,
    /// 説明欄（溶接記録では `{"Contractor": .., "MarkedJoints": ..}` のJSON）
    pub description: Option<String>,
    pub content_url: String,
}

/// チケット
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Issue {
    pub id: u32,
    pub subject: String,
    pub project: Option<IdName>,
    pub tracker: Option<IdName>,
    pub priority: Option<IdName>,
    pub created_on: Option<String>,
    pub custom_fields: Vec<CustomField>,
    pub attachments: Vec<Attachment>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IssueResponse {
    pub issue: Issue,
}

/// チケット一覧（ページング情報付き）
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct IssueListResponse {
    pub issues: Vec<Issue>,
    pub total_count: Option<u32>,
    pub offset: Option<u32>,
    pub limit: Option<u32>,
}

/// プロジェクト
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Project {
    pub id: i64,
    pub name: String,
    pub identifier: String,
    pub description: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProjectResponse {
    pub project: Project,
}

/// ログインユーザー（`my/account.json`）
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct User {
    pub id: i64,
    pub login: String,
    pub firstname: String,
    pub lastname: String,
    pub mail: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AccountResponse {
    pub user: User,
}
