//! SUPR検査依頼書シートの組み立て
//!
//! テンプレート先頭シートの見出しを引き継ぎ、10行目から行番号順に書き込む。
//! 工場名列は全行で結合し、設備関連の列は同じ値が続く範囲を結合する。

use super::sheet_plan::{CellStyle, SheetPlan, TemplateSheet};
use crate::error::Result;
use crate::supr::SuprGroupReportData;
use serde::{Deserialize, Serialize};

/// データ開始行
pub const SUPR_START_ROW: u32 = 9;
/// 依頼番号セル
pub const APPLICATION_CELL: (u32, u16) = (4, 7);

pub const COL_NUMBER: u16 = 1;
pub const COL_FACTORY: u16 = 2;
pub const COL_INSTALLATION: u16 = 3;
pub const COL_TECH_POSITION: u16 = 4;
pub const COL_EQUIPMENT_NUMBER: u16 = 5;
/// 値は書かず、工場名列と同じく全行で結合する
pub const COL_UNASSIGNED: u16 = 6;
pub const COL_MARK: u16 = 7;
pub const COL_DETAIL: u16 = 8;
pub const COL_SCANNING_PERIOD: u16 = 9;
pub const COL_CONDITION: u16 = 10;
pub const COL_PRIORITY: u16 = 11;
pub const COL_JOB_TYPE: u16 = 12;

/// 同じ値が続く範囲を結合する列
pub const CONSECUTIVE_MERGE_COLUMNS: &[u16] = &[COL_INSTALLATION, COL_TECH_POSITION, COL_EQUIPMENT_NUMBER, COL_MARK];

/// 署名欄の列（実施者・依頼者）
pub const COL_PERFORMER_SIGNATURE: u16 = 3;
pub const COL_CUSTOMER_SIGNATURE: u16 = 9;

/// 署名欄1つ分
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignatureBlock {
    pub title: String,
    pub position: String,
    pub organization: String,
    /// 署名行（`____/氏名`）
    pub signature: String,
}

impl Default for SignatureBlock {
    fn default() -> Self {
        Self {
            title: String::new(),
            position: "Генеральный директор".to_string(),
            organization: String::new(),
            signature: "________________/".to_string(),
        }
    }
}

/// 依頼書末尾の署名欄
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuprSignatures {
    pub performer: SignatureBlock,
    pub customer: SignatureBlock,
}

impl Default for SuprSignatures {
    fn default() -> Self {
        Self {
            performer: SignatureBlock {
                title: "Исполнитель".to_string(),
                ..Default::default()
            },
            customer: SignatureBlock {
                title: "Заказчик".to_string(),
                ..Default::default()
            },
        }
    }
}

const BORDERED: CellStyle = CellStyle {
    fill: None,
    border: true,
    wrap: true,
    align_left: false,
    font_size: None,
};

const SIGNATURE_STYLE: CellStyle = CellStyle {
    fill: None,
    border: false,
    wrap: false,
    align_left: true,
    font_size: Some(16),
};

/// 依頼書シートを組み立てる
pub fn build_supr_sheet(
    template: &TemplateSheet,
    data: &SuprGroupReportData,
    signatures: &SuprSignatures,
) -> Result<SheetPlan> {
    let mut plan = SheetPlan::from_template(template, SUPR_START_ROW);

    let (app_row, app_col) = APPLICATION_CELL;
    let prefix = plan.text(app_row, app_col);
    let separator = if prefix.is_empty() || prefix.ends_with(char::is_whitespace) { "" } else { " " };
    plan.set_value(
        app_row,
        app_col,
        format!("{}{}{} от __.__ 20__г", prefix, separator, data.application_number),
    );

    let start = SUPR_START_ROW;
    let mut row = start;
    for (number, item) in &data.items {
        plan.write(row, COL_NUMBER, *number as i64, BORDERED);
        plan.write(row, COL_INSTALLATION, item.installation_name.as_str(), BORDERED);
        plan.write(row, COL_TECH_POSITION, item.tech_position_name.as_str(), BORDERED);
        plan.write(row, COL_EQUIPMENT_NUMBER, item.equipment_unit_number.as_str(), BORDERED);
        plan.write(row, COL_MARK, item.mark_and_manufacturer.as_str(), BORDERED);
        plan.write(row, COL_DETAIL, item.detail.as_str(), BORDERED);
        plan.write(row, COL_SCANNING_PERIOD, item.scanning_period.as_str(), BORDERED);
        plan.write(row, COL_CONDITION, item.condition.as_str(), BORDERED);
        plan.write(row, COL_PRIORITY, item.priority.as_str(), BORDERED);
        plan.write(row, COL_JOB_TYPE, item.job_type.as_str(), BORDERED);
        plan.border_range(row, COL_INSTALLATION, row, COL_JOB_TYPE);
        row += 1;
    }

    if row > start {
        let last = row - 1;
        plan.write(start, COL_FACTORY, data.factory.as_str(), BORDERED);
        for col in [COL_FACTORY, COL_UNASSIGNED] {
            plan.border_range(start, col, last, col);
            plan.merge(start, col, last, col)?;
        }
        for &col in CONSECUTIVE_MERGE_COLUMNS {
            merge_consecutive(&mut plan, start, last, col)?;
        }
    }

    write_signature(&mut plan, row + 3, COL_PERFORMER_SIGNATURE, &signatures.performer);
    write_signature(&mut plan, row + 3, COL_CUSTOMER_SIGNATURE, &signatures.customer);

    tracing::debug!(rows = data.items.len(), "SUPRシートを組み立て");
    Ok(plan)
}

/// 同じ値が2行以上続く範囲を結合
fn merge_consecutive(plan: &mut SheetPlan, first_row: u32, last_row: u32, col: u16) -> Result<()> {
    let mut run_start = first_row;
    for row in (first_row + 1)..=(last_row + 1) {
        let changed = row > last_row || plan.text(row, col) != plan.text(run_start, col);
        if changed {
            plan.merge(run_start, col, row - 1, col)?;
            run_start = row;
        }
    }
    Ok(())
}

/// 署名欄（見出し・役職・組織・1行空けて署名）
fn write_signature(plan: &mut SheetPlan, row: u32, col: u16, block: &SignatureBlock) {
    let lines = [
        (0, &block.title),
        (1, &block.position),
        (2, &block.organization),
        (4, &block.signature),
    ];
    for (offset, text) in lines {
        if !text.is_empty() {
            plan.write(row + offset, col, text.as_str(), SIGNATURE_STYLE);
        }
    }
}
