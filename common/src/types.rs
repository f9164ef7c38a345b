//! 報告書モデルの型定義
//!
//! - IssueReportData: 1件の溶接検査記録（親チケット）
//! - JointGroup: 子チケット1件分の属性
//! - JointEntry: グループ内の施工業者ごとの継手・写真の対応
//! - ProjectReportData: プロジェクト内の全検査記録のまとめ

use crate::joint_label::JointLabel;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 溶接検査記録1件分の報告書データ
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IssueReportData {
    /// 記録番号（親チケットの題名）
    pub report_number: String,
    pub joints_count_plan: i64,
    /// 子チケットの継手数の合計
    pub joints_count_fact: i64,
    pub diameter_inches_plan: f64,
    pub diameter_inches_fact: f64,
    /// 子チケットの取得順
    pub groups: Vec<JointGroup>,
}

impl IssueReportData {
    /// インチ実績/計画の比率から換算した継手数（計画インチが0なら0）
    pub fn calculated_joints_fact(&self) -> i64 {
        if self.diameter_inches_plan == 0.0 {
            return 0;
        }
        // f64::round は0.5を0から遠い方へ丸める
        (self.diameter_inches_fact / self.diameter_inches_plan * self.joints_count_plan as f64)
            .round() as i64
    }
}

/// 子チケット1件分の属性
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct JointGroup {
    pub act_paragraph: i64,
    pub equipment_type: String,
    pub pipeline_number: String,
    pub diameter_mm: f64,
    pub diameter_inches: f64,
    pub joints_count: i64,
    /// 施工業者の初出順
    pub entries: Vec<JointEntry>,
}

/// 施工業者1社分の継手番号と写真URL
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct JointEntry {
    pub contractor: String,
    pub joint_photo_map: BTreeMap<JointLabel, Vec<String>>,
}

impl JointEntry {
    pub fn new(contractor: impl Into<String>) -> Self {
        Self {
            contractor: contractor.into(),
            joint_photo_map: BTreeMap::new(),
        }
    }

    /// 写真URLを継手ラベルに追加（同じラベル内は追加順を保つ）
    pub fn add_photo(&mut self, joints: &str, photo_url: impl Into<String>) {
        self.joint_photo_map
            .entry(JointLabel::new(joints))
            .or_default()
            .push(photo_url.into());
    }

    /// 並び替え済み継手ラベルのカンマ区切り
    pub fn joint_labels(&self) -> String {
        self.joint_photo_map
            .keys()
            .map(|label| label.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// 描画順の写真URL
    pub fn photos(&self) -> impl Iterator<Item = &str> {
        self.joint_photo_map
            .values()
            .flat_map(|urls| urls.iter().map(|u| u.as_str()))
    }

    pub fn photo_count(&self) -> usize {
        self.joint_photo_map.values().map(|urls| urls.len()).sum()
    }
}

/// プロジェクト単位の集計（検査記録ごとに色分けして出力）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProjectReportData {
    pub identifier: String,
    pub name: String,
    pub acts: Vec<IssueReportData>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_photos_follow_label_order() {
        let mut entry = JointEntry::new("ACME");
        entry.add_photo("J12", "u12a");
        entry.add_photo("J3", "u3a");
        entry.add_photo("J12", "u12b");
        entry.add_photo("без номера", "ux");
        entry.add_photo("J3", "u3b");

        let photos: Vec<&str> = entry.photos().collect();
        assert_eq!(photos, vec!["u3a", "u3b", "u12a", "u12b", "ux"]);
        assert_eq!(entry.joint_labels(), "J3, J12, без номера");
        assert_eq!(entry.photo_count(), 5);
    }

    #[test]
    fn test_calculated_joints_fact() {
        let data = IssueReportData {
            joints_count_plan: 10,
            diameter_inches_plan: 40.0,
            diameter_inches_fact: 10.0,
            ..Default::default()
        };
        assert_eq!(data.calculated_joints_fact(), 3); // 2.5 → 3

        let zero_plan = IssueReportData {
            joints_count_plan: 10,
            diameter_inches_fact: 10.0,
            ..Default::default()
        };
        assert_eq!(zero_plan.calculated_joints_fact(), 0);
    }

    #[test]
    fn test_report_serialize_roundtrip_keeps_order() {
        let mut entry = JointEntry::new("ACME");
        entry.add_photo("J10", "b");
        entry.add_photo("J2", "a");
        let data = IssueReportData {
            report_number: "АКТ-1".to_string(),
            groups: vec![JointGroup {
                entries: vec![entry],
                ..Default::default()
            }],
            ..Default::default()
        };

        let json = serde_json::to_string(&data).unwrap();
        assert!(json.contains("\"reportNumber\":\"АКТ-1\""));
        let back: IssueReportData = serde_json::from_str(&json).unwrap();
        assert_eq!(back, data);
        assert_eq!(back.groups[0].entries[0].joint_labels(), "J2, J10");
    }
}
