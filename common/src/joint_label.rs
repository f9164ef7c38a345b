//! 継手番号ラベルの並び順
//!
//! 添付ファイルの `MarkedJoints` は "J12, J3" のような自由記述。
//! ラベル中で最初に現れる整数で並べ、整数を含まないラベルは末尾に回す。

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// 継手番号ラベル（`JointEntry::joint_photo_map` のキー）
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JointLabel(String);

impl JointLabel {
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// ラベル中で最初に現れる整数
    ///
    /// 桁あふれする数字列は数値なしとして扱う。
    pub fn leading_number(&self) -> Option<u64> {
        lazy_static::lazy_static! {
            static ref NUMBER_RE: Regex = Regex::new(r"\d+").unwrap();
        }

        NUMBER_RE
            .find(&self.0)
            .and_then(|m| m.as_str().parse::<u64>().ok())
    }
}

impl Ord for JointLabel {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.leading_number(), other.leading_number()) {
            (Some(a), Some(b)) => a.cmp(&b).then_with(|| self.0.cmp(&other.0)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => self.0.cmp(&other.0),
        }
    }
}

impl PartialOrd for JointLabel {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for JointLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for JointLabel {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}
