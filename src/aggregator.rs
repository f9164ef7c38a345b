//! 報告書データの取得
//!
//! `IssueSource` から親・子チケットを取得し、共通ライブラリの集計処理に渡す。
//! 取得に失敗した場合は部分的な結果を返さずエラーにする。

use crate::error::Result;
use crate::redmine::{IssueQuery, IssueSource};
use welding_report_common::aggregate::build_issue_report;
use welding_report_common::supr::build_supr_report;
use welding_report_common::{IssueReportData, ProjectReportData, SuprGroupReportData};

/// 溶接検査記録（アクト）のトラッカーID
pub const ACT_TRACKER_ID: u32 = 1;
/// 依頼番号（カスタムフィールド38）での絞り込み
const APPLICATION_NUMBER_FILTER: &str = "cf_38";

/// 検査記録1件の報告書データ
pub async fn fetch_issue_report<S: IssueSource>(source: &S, project: &str, issue_id: u32) -> Result<IssueReportData> {
    let parent = source.issue(issue_id).await?;
    let children = source.child_issues(project, issue_id).await?;
    tracing::info!(issue = issue_id, children = children.len(), "検査記録を取得");
    Ok(build_issue_report(&parent, &children))
}

/// プロジェクト内の全検査記録をまとめる
pub async fn fetch_project_report<S: IssueSource>(source: &S, identifier: &str) -> Result<ProjectReportData> {
    let name = source
        .project(identifier)
        .await?
        .map(|p| p.name)
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| identifier.to_string());

    let query: IssueQuery = vec![
        ("tracker_id", ACT_TRACKER_ID.to_string()),
        ("status_id", "*".to_string()),
    ];
    let act_issues = source.project_issues(identifier, &query).await?;
    tracing::info!(project = identifier, acts = act_issues.len(), "検査記録一覧を取得");

    let mut acts = Vec::with_capacity(act_issues.len());
    for act in &act_issues {
        acts.push(fetch_issue_report(source, identifier, act.id).await?);
    }

    Ok(ProjectReportData {
        identifier: identifier.to_string(),
        name,
        acts,
    })
}

/// SUPR検査依頼書のデータ
pub async fn fetch_supr_report<S: IssueSource>(
    source: &S,
    identifier: &str,
    application_number: u32,
) -> Result<SuprGroupReportData> {
    let query: IssueQuery = vec![(APPLICATION_NUMBER_FILTER, application_number.to_string())];
    let issues = source.project_issues(identifier, &query).await?;
    tracing::info!(project = identifier, application_number, issues = issues.len(), "SUPR依頼を取得");
    Ok(build_supr_report(application_number, &issues))
}
