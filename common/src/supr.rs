//! SUPR検査依頼書の集計
//!
//! 依頼番号（カスタムフィールド38）で絞り込んだチケット群から、
//! 行番号順の依頼書データを組み立てる。

use crate::custom_fields::CustomFields;
use crate::redmine::Issue;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// カスタムフィールドID
pub mod field_ids {
    pub const APPLICATION_NUMBER: i64 = 38;
    pub const ROW_NUMBER: i64 = 58;
    pub const SCANNING_PERIOD: i64 = 20;
    pub const CONDITION: i64 = 54;
    pub const JOB_TYPES: i64 = 55;
    pub const INSTALLATION: i64 = 1;
    pub const TECH_POSITION: i64 = 18;
    pub const EQUIPMENT_NUMBER: i64 = 53;
    pub const MARK: i64 = 3;
    pub const MANUFACTURER: i64 = 40;
}

/// 依頼書の1行
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SuprItem {
    pub detail: String,
    pub scanning_period: String,
    pub condition: String,
    pub priority: String,
    pub job_type: String,
    pub installation_name: String,
    pub tech_position_name: String,
    pub equipment_unit_number: String,
    pub mark_and_manufacturer: String,
}

/// 依頼書全体
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SuprGroupReportData {
    pub application_number: u32,
    /// 工場名（先頭チケットのプロジェクト名の最初の語）
    pub factory: String,
    /// 行番号 → 行
    pub items: BTreeMap<u32, SuprItem>,
}

impl SuprItem {
    /// チケット1件から行を作る
    pub fn from_issue(issue: &Issue) -> Self {
        let fields = CustomFields::from_fields(&issue.custom_fields);
        let text = |id| fields.text_by_id(id).unwrap_or_default();

        Self {
            detail: issue.subject.clone(),
            priority: issue.priority.as_ref().map(|p| p.name.clone()).unwrap_or_default(),
            scanning_period: text(field_ids::SCANNING_PERIOD),
            condition: text(field_ids::CONDITION),
            job_type: fields.list_by_id(field_ids::JOB_TYPES).join(", "),
            installation_name: text(field_ids::INSTALLATION),
            tech_position_name: text(field_ids::TECH_POSITION),
            equipment_unit_number: text(field_ids::EQUIPMENT_NUMBER),
            mark_and_manufacturer: mark_and_manufacturer(&text(field_ids::MARK), &text(field_ids::MANUFACTURER)),
        }
    }
}

/// `マーク, 製造者`（片方だけならその値）
pub fn mark_and_manufacturer(mark: &str, manufacturer: &str) -> String {
    match (mark.is_empty(), manufacturer.is_empty()) {
        (true, _) => manufacturer.to_string(),
        (false, true) => mark.to_string(),
        (false, false) => format!("{}, {}", mark, manufacturer),
    }
}

/// 行番号を決める
///
/// 指定番号が正の整数で未使用ならそれを使う。そうでなければ
/// チケット件数から1へ向かって最初の空き番号、それも無ければ最大番号+1。
pub fn assign_row_number<V>(requested: Option<i64>, used: &BTreeMap<u32, V>, issue_count: usize) -> u32 {
    if let Some(n) = requested.and_then(|n| u32::try_from(n).ok()).filter(|n| *n > 0) {
        if !used.contains_key(&n) {
            return n;
        }
    }

    let top = u32::try_from(issue_count).unwrap_or(u32::MAX);
    (1..=top)
        .rev()
        .find(|n| !used.contains_key(n))
        .unwrap_or_else(|| used.keys().next_back().map_or(1, |max| max + 1))
}

/// チケット一覧から依頼書データを組み立てる（入力順に番号を割り当てる）
pub fn build_supr_report(application_number: u32, issues: &[Issue]) -> SuprGroupReportData {
    let mut report = SuprGroupReportData {
        application_number,
        ..Default::default()
    };

    if let Some(first) = issues.first() {
        report.factory = first
            .project
            .as_ref()
            .and_then(|p| p.name.split(' ').next())
            .unwrap_or_default()
            .to_string();
    }

    for issue in issues {
        let fields = CustomFields::from_fields(&issue.custom_fields);
        let number = assign_row_number(fields.int_by_id(field_ids::ROW_NUMBER), &report.items, issues.len());
        tracing::debug!(issue = issue.id, number, "SUPR行番号を割り当て");
        report.items.insert(number, SuprItem::from_issue(issue));
    }

    report
}
