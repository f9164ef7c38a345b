//! Redmineカスタムフィールド
//!
//! カスタムフィールドは管理者が自由に編集できるため、名前（またはID）で
//! 引いて `Option` を返す袋として扱う。型が合わない・パースできない値は
//! エラーにせず「無かったもの」とする。

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Redmine APIの `custom_fields` 要素
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CustomField {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub value: Value,
}

impl CustomField {
    pub fn new(id: i64, name: impl Into<String>, value: Value) -> Self {
        Self { id, name: name.into(), value }
    }
}

/// 名前・IDで引けるカスタムフィールドの袋
///
/// 同名のフィールドが複数ある場合は後勝ち。
#[derive(Debug, Clone, Default)]
pub struct CustomFields {
    by_name: HashMap<String, Value>,
    by_id: HashMap<i64, Value>,
}

impl CustomFields {
    pub fn from_fields(fields: &[CustomField]) -> Self {
        let mut bag = Self::default();
        for field in fields {
            bag.by_name.insert(field.name.clone(), field.value.clone());
            bag.by_id.insert(field.id, field.value.clone());
        }
        bag
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.by_name.get(name)
    }

    pub fn get_by_id(&self, id: i64) -> Option<&Value> {
        self.by_id.get(&id)
    }

    /// 文字列値
    pub fn text(&self, name: &str) -> Option<String> {
        self.get(name).and_then(value_text)
    }

    pub fn text_by_id(&self, id: i64) -> Option<String> {
        self.get_by_id(id).and_then(value_text)
    }

    /// 整数値（"12" / "12.0" / 12 を受け付ける）
    pub fn int(&self, name: &str) -> Option<i64> {
        self.text(name).and_then(|s| parse_invariant_int(&s))
    }

    pub fn int_by_id(&self, id: i64) -> Option<i64> {
        self.text_by_id(id).and_then(|s| parse_invariant_int(&s))
    }

    /// 小数値
    pub fn decimal(&self, name: &str) -> Option<f64> {
        self.text(name).and_then(|s| parse_invariant_decimal(&s))
    }

    /// 複数選択フィールド（配列）の文字列値
    pub fn list_by_id(&self, id: i64) -> Vec<String> {
        match self.get_by_id(id) {
            Some(Value::Array(items)) => items.iter().filter_map(value_text).collect(),
            Some(other) => value_text(other).into_iter().collect(),
            None => Vec::new(),
        }
    }
}

/// JSON値をテキストとして取り出す（null・配列・オブジェクトはNone）
pub fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// ロケール非依存の小数パース
///
/// 小数点は `.`、`,` は桁区切りとして読み飛ばす。前後の空白と符号は許容。
pub fn parse_invariant_decimal(text: &str) -> Option<f64> {
    let cleaned: String = text.trim().chars().filter(|c| *c != ',').collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// ロケール非依存の整数パース（小数部が0なら受け付ける）
pub fn parse_invariant_int(text: &str) -> Option<i64> {
    let trimmed = text.trim();
    if let Ok(v) = trimmed.replace(',', "").parse::<i64>() {
        return Some(v);
    }
    let value = parse_invariant_decimal(trimmed)?;
    if value.fract() != 0.0 || value < i64::MIN as f64 || value > i64::MAX as f64 {
        return None;
    }
    Some(value as i64)
}

/// 小数第2位に丸める
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
