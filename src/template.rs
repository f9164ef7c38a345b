//! テンプレート読み込み
//!
//! calamine でテンプレートのシートを開き、セル値と結合範囲を `TemplateSheet` に写す。
//! ファイルやシートが無い場合は `Template` エラー。

use crate::error::{ReportError, Result};
use calamine::{open_workbook, Data, Reader, Xlsx};
use std::path::Path;
use welding_report_common::{CellValue, MergeRange, TemplateSheet};

/// 名前を指定してシートを読み込む（None なら先頭シート）
pub fn load_template(path: &Path, sheet_name: Option<&str>) -> Result<TemplateSheet> {
    if !path.exists() {
        return Err(ReportError::Template(format!(
            "テンプレートが見つかりません: {}",
            path.display()
        )));
    }

    let mut workbook: Xlsx<_> = open_workbook(path)
        .map_err(|e| ReportError::Template(format!("{}: {}", path.display(), e)))?;

    let names = workbook.sheet_names();
    let name = match sheet_name {
        Some(name) if names.iter().any(|n| n == name) => name.to_string(),
        Some(name) => {
            return Err(ReportError::Template(format!(
                "シート「{}」が見つかりません: {}",
                name,
                path.display()
            )))
        }
        None => names
            .first()
            .cloned()
            .ok_or_else(|| ReportError::Template(format!("シートがありません: {}", path.display())))?,
    };

    let range = workbook
        .worksheet_range(&name)
        .map_err(|e| ReportError::Template(format!("シート「{}」の読み込みに失敗: {}", name, e)))?;

    let (start_row, start_col) = range.start().unwrap_or((0, 0));
    let cells = range
        .used_cells()
        .filter_map(|(r, c, data)| {
            let value = to_cell_value(data)?;
            Some((start_row + r as u32, (start_col as usize + c) as u16, value))
        })
        .collect::<Vec<_>>();

    workbook
        .load_merged_regions()
        .map_err(|e| ReportError::Template(format!("結合範囲の読み込みに失敗: {}", e)))?;
    let merges = workbook
        .merged_regions_by_sheet(&name)
        .iter()
        .map(|(_, _, dims)| MergeRange {
            first_row: dims.start.0,
            first_col: dims.start.1 as u16,
            last_row: dims.end.0,
            last_col: dims.end.1 as u16,
        })
        .collect::<Vec<_>>();

    tracing::debug!(sheet = %name, cells = cells.len(), merges = merges.len(), "テンプレートを読み込み");
    Ok(TemplateSheet {
        sheet_name: name,
        cells,
        merges,
    })
}

fn to_cell_value(data: &Data) -> Option<CellValue> {
    match data {
        Data::String(s) if !s.is_empty() => Some(CellValue::Text(s.clone())),
        Data::Float(f) => Some(CellValue::Number(*f)),
        Data::Int(i) => Some(CellValue::Number(*i as f64)),
        Data::Bool(b) => Some(CellValue::Text(b.to_string())),
        Data::DateTime(dt) => Some(CellValue::Number(dt.as_f64())),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Some(CellValue::Text(s.clone())),
        _ => None,
    }
}
