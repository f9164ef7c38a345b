pub mod supr;
pub mod welding;

pub use supr::render_supr;
pub use welding::WeldingRenderer;

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use welding_report_common::{IssueReportData, ProjectReportData};

/// `fetch` で保存し `render` で読み込む報告書データ
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "camelCase")]
pub enum ReportModel {
    Issue(IssueReportData),
    Project(ProjectReportData),
}

impl ReportModel {
    /// 出力ファイル名の元になる番号（プロジェクトは識別子）
    pub fn report_number(&self) -> &str {
        match self {
            ReportModel::Issue(data) => &data.report_number,
            ReportModel::Project(data) => &data.identifier,
        }
    }

    pub fn from_json(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// 記録番号からファイル名を作る（パスに使えない文字は `_`）
pub fn report_file_name(report_number: &str) -> String {
    let stem: String = report_number
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    if stem.is_empty() {
        "report.xlsx".to_string()
    } else {
        format!("{}.xlsx", stem)
    }
}

/// 出力先がディレクトリ（または拡張子なし）ならファイル名を付ける
pub fn output_path_for(output: &Path, file_name: &str) -> PathBuf {
    if output.is_dir() || output.extension().is_none() {
        output.join(file_name)
    } else {
        output.to_path_buf()
    }
}

pub fn write_report(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(path, bytes)?;
    Ok(())
}

/// 保存用ディレクトリへ日時付きでコピー
pub fn store_report(storage_dir: &Path, file_name: &str, bytes: &[u8]) -> Result<PathBuf> {
    std::fs::create_dir_all(storage_dir)?;
    let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    let path = storage_dir.join(format!("{}_{}", stamp, file_name));
    std::fs::write(&path, bytes)?;
    tracing::info!(path = %path.display(), "報告書を保存");
    Ok(path)
}
