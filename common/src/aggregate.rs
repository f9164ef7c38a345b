//! 溶接検査記録の集計
//!
//! 取得済みの親チケット・子チケット・添付ファイルから `IssueReportData` を組み立てる。
//! カスタムフィールドと添付説明のパース失敗はその項目だけを捨てて続行する。

use crate::custom_fields::{round2, CustomFields};
use crate::redmine::{Attachment, Issue};
use crate::types::{IssueReportData, JointEntry, JointGroup};
use serde::Deserialize;
use std::collections::HashMap;

/// カスタムフィールド名
pub mod field_names {
    pub const JOINTS_COUNT: &str = "Количество стыков";
    pub const INCHES_PLAN: &str = "Дюймы_ПЛАН";
    pub const INCHES_FACT: &str = "Дюймы_ФАКТ";
    pub const OUTER_DIAMETER: &str = "Наружный диаметр";
    pub const ACT_PARAGRAPH: &str = "Пункт акта";
    pub const EQUIPMENT_TYPE: &str = "Тип оборудования";
    pub const PIPELINE_NUMBER: &str = "№ трубопровода/аппарата";
}

/// 添付ファイル説明欄のJSON
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AttachmentTag {
    #[serde(rename = "Contractor")]
    pub contractor: String,
    #[serde(rename = "MarkedJoints")]
    pub marked_joints: String,
}

/// 説明欄をパース（不正なら None）
pub fn parse_attachment_tag(description: &str) -> Option<AttachmentTag> {
    match serde_json::from_str::<AttachmentTag>(description) {
        Ok(tag) => Some(tag),
        Err(e) => {
            tracing::debug!(error = %e, "添付説明のパースに失敗、スキップ");
            None
        }
    }
}

/// 親チケットから集計の土台を作る
pub fn new_report(parent: &Issue) -> IssueReportData {
    let fields = CustomFields::from_fields(&parent.custom_fields);
    let mut report = IssueReportData {
        report_number: parent.subject.clone(),
        ..Default::default()
    };

    if let Some(plan) = fields.int(field_names::JOINTS_COUNT) {
        report.joints_count_plan = plan;
    }
    if let Some(plan) = fields.decimal(field_names::INCHES_PLAN) {
        report.diameter_inches_plan = round2(plan);
    }
    if let Some(fact) = fields.decimal(field_names::INCHES_FACT) {
        report.diameter_inches_fact = round2(fact);
    }

    tracing::debug!(
        report = %report.report_number,
        joints_plan = report.joints_count_plan,
        inches_plan = report.diameter_inches_plan,
        inches_fact = report.diameter_inches_fact,
        "親チケットを解析"
    );
    report
}

/// 子チケット1件をグループに変換
pub fn build_group(child: &Issue) -> JointGroup {
    let fields = CustomFields::from_fields(&child.custom_fields);
    let mut group = JointGroup::default();

    if let Some(mm) = fields.decimal(field_names::OUTER_DIAMETER) {
        group.diameter_mm = mm;
    }
    if let Some(inches) = fields.decimal(field_names::INCHES_FACT) {
        group.diameter_inches = round2(inches);
    }
    if let Some(paragraph) = fields.int(field_names::ACT_PARAGRAPH) {
        group.act_paragraph = paragraph;
    }
    if let Some(equipment) = fields.text(field_names::EQUIPMENT_TYPE) {
        group.equipment_type = equipment;
    }
    if let Some(pipeline) = fields.text(field_names::PIPELINE_NUMBER) {
        group.pipeline_number = pipeline;
    }
    if let Some(count) = fields.int(field_names::JOINTS_COUNT) {
        group.joints_count = count;
    }

    group.entries = collect_entries(&child.attachments);
    tracing::debug!(
        issue = child.id,
        paragraph = group.act_paragraph,
        entries = group.entries.len(),
        "子チケットを解析"
    );
    group
}

/// 添付ファイルを施工業者ごとにまとめる（初出順）
pub fn collect_entries(attachments: &[Attachment]) -> Vec<JointEntry> {
    let mut entries: Vec<JointEntry> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for attachment in attachments {
        let Some(description) = attachment.description.as_deref() else {
            continue;
        };
        let Some(tag) = parse_attachment_tag(description) else {
            continue;
        };
        if attachment.content_url.is_empty() {
            tracing::debug!(attachment = attachment.id, "content_urlなし、スキップ");
            continue;
        }

        let position = *index.entry(tag.contractor.clone()).or_insert_with(|| {
            entries.push(JointEntry::new(tag.contractor.clone()));
            entries.len() - 1
        });
        entries[position].add_photo(&tag.marked_joints, attachment.content_url.clone());
    }

    entries
}

/// 子チケットを追加し、継手数の実績を加算
pub fn add_child(report: &mut IssueReportData, child: &Issue) {
    let group = build_group(child);
    report.joints_count_fact += group.joints_count;
    report.groups.push(group);
}

/// 親チケットと子チケット一覧から報告書データを組み立てる
pub fn build_issue_report(parent: &Issue, children: &[Issue]) -> IssueReportData {
    let mut report = new_report(parent);
    for child in children {
        add_child(&mut report, child);
    }
    report
}
