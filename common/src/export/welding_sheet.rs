//! 溶接報告書シートの組み立て
//!
//! 集計行・グループ行・施工業者行を順に書き込み、写真は `PhotoPacker` で
//! 写真列に並べる。写真の取得は呼び出し側（非同期の描画ループ）が行い、
//! 取得できた写真だけを `place_photo` に渡す。

use super::sheet_plan::{CellStyle, PlacedPicture, SheetPlan, TemplateSheet};
use crate::error::Result;
use crate::layout::*;
use crate::packer::{PhotoCursor, PhotoImage, PhotoPacker, Placement};
use crate::types::{IssueReportData, JointEntry, JointGroup};

const DATA_STYLE: CellStyle = CellStyle {
    fill: None,
    border: true,
    wrap: true,
    align_left: false,
    font_size: None,
};

/// 書き込み中のグループ
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupRows {
    pub start_row: u32,
}

/// 溶接報告書シートのビルダー
pub struct WeldingSheetBuilder<'a> {
    layout: &'a ReportLayout,
    packer: PhotoPacker,
    plan: SheetPlan,
    row: u32,
}

impl<'a> WeldingSheetBuilder<'a> {
    /// テンプレートの見出しを引き継いで開始
    pub fn new(layout: &'a ReportLayout, template: &TemplateSheet) -> Self {
        let mut plan = SheetPlan::from_template(template, START_ROW);
        for col in COL_REPORT_NUMBER..=COL_PHOTO {
            plan.set_column_width(col, layout.column_width(col));
        }
        Self {
            layout,
            packer: PhotoPacker::from_layout(layout),
            plan,
            row: START_ROW,
        }
    }

    /// 次に書き込む行
    pub fn current_row(&self) -> u32 {
        self.row
    }

    pub fn plan(&self) -> &SheetPlan {
        &self.plan
    }

    /// 集計行 `Итого по акту: ..` を書き込む
    pub fn write_summary_line(&mut self, data: &IssueReportData) -> Result<()> {
        let row = self.row;
        let title_style = CellStyle {
            align_left: true,
            ..DATA_STYLE
        };

        self.plan.write(
            row,
            COL_REPORT_NUMBER,
            format!("Итого по акту: {}", data.report_number),
            title_style,
        );
        self.plan.write(
            row,
            COL_JOINTS,
            format!("{} из {}", data.calculated_joints_fact(), data.joints_count_plan),
            DATA_STYLE,
        );
        self.plan.write(
            row,
            COL_DIAMETER_INCHES,
            format!("{} из {}", data.diameter_inches_fact, data.diameter_inches_plan),
            DATA_STYLE,
        );
        self.plan.merge(row, COL_REPORT_NUMBER, row, SUMMARY_MERGE_LAST_COL)?;
        self.plan.border_range(row, COL_REPORT_NUMBER, row, COL_PHOTO);

        let height = self.summary_row_height(row);
        self.plan.set_row_height(row, height);
        self.row += 1;
        Ok(())
    }

    /// 集計行の高さ（結合範囲は列幅の合計で折り返す）
    fn summary_row_height(&self, row: u32) -> f64 {
        let merged_width = self.layout.span_width(COL_REPORT_NUMBER, SUMMARY_MERGE_LAST_COL);
        let mut height = wrapped_text_height(&self.plan.text(row, COL_REPORT_NUMBER), merged_width);

        for col in (SUMMARY_MERGE_LAST_COL + 1)..=COL_PHOTO {
            let text = self.plan.text(row, col);
            if !text.is_empty() {
                height = height.max(wrapped_text_height(&text, self.layout.column_width(col)));
            }
        }
        height
    }

    /// グループの共通列を書き込む
    pub fn begin_group(&mut self, report_number: &str, group: &JointGroup) -> GroupRows {
        let row = self.row;
        self.plan.write(row, COL_REPORT_NUMBER, report_number, DATA_STYLE);
        self.plan.write(row, COL_ACT_PARAGRAPH, group.act_paragraph, DATA_STYLE);
        self.plan.write(
            row,
            COL_EQUIPMENT_TYPE,
            group.equipment_type.as_str(),
            CellStyle {
                fill: Some(EQUIPMENT_FILL),
                ..DATA_STYLE
            },
        );
        self.plan.write(row, COL_PIPELINE_NUMBER, group.pipeline_number.as_str(), DATA_STYLE);
        self.plan.write(row, COL_DIAMETER_MM, group.diameter_mm, DATA_STYLE);
        self.plan.write(row, COL_DIAMETER_INCHES, group.diameter_inches, DATA_STYLE);
        GroupRows { start_row: row }
    }

    /// 施工業者行を開始し、写真配置用のカーソルを返す
    pub fn begin_entry(&mut self, entry: &JointEntry) -> PhotoCursor {
        let row = self.row;
        self.plan.write(row, COL_CONTRACTOR, entry.contractor.as_str(), DATA_STYLE);
        self.plan.write(row, COL_JOINTS, entry.joint_labels(), DATA_STYLE);
        self.packer.start_row()
    }

    /// 取得済みの写真を現在の行に配置
    ///
    /// 表示サイズが0になる写真は配置せず None を返す。
    pub fn place_photo(&mut self, cursor: &mut PhotoCursor, source_url: &str, photo: PhotoImage) -> Option<Placement> {
        let (width, height) = self.packer.display_size(photo.width, photo.height);
        if width == 0 || height == 0 {
            tracing::warn!(url = source_url, "表示サイズが0の写真をスキップ");
            return None;
        }

        let placement = self.packer.place(cursor, width, height);
        self.plan.add_picture(PlacedPicture {
            row: self.row,
            col: COL_PHOTO,
            x_offset: placement.x,
            y_offset: placement.y,
            width: placement.width,
            height: placement.height,
            data: photo.data,
            source_url: source_url.to_string(),
        });
        Some(placement)
    }

    /// 施工業者行を閉じる（行高さと罫線）
    pub fn finish_entry(&mut self, cursor: &PhotoCursor) {
        let row = self.row;
        self.plan.set_row_height(row, self.packer.finish_row(cursor));
        self.plan.border_range(row, COL_REPORT_NUMBER, row, COL_PHOTO);
        self.row += 1;
    }

    /// グループを閉じ、共通列を行範囲で結合する
    ///
    /// 施工業者が無いグループも1行を占める。
    pub fn finish_group(&mut self, group: GroupRows) -> Result<()> {
        if self.row == group.start_row {
            self.plan.border_range(group.start_row, COL_REPORT_NUMBER, group.start_row, COL_PHOTO);
            self.row += 1;
        }

        let last_row = self.row - 1;
        for &col in GROUP_MERGE_COLUMNS {
            self.plan.merge(group.start_row, col, last_row, col)?;
        }
        Ok(())
    }

    /// 行範囲を帯色で塗る（プロジェクト集計の節ごと）
    pub fn apply_band(&mut self, first_row: u32, last_row: u32, section: usize) {
        if last_row < first_row {
            return;
        }
        let color = self.layout.band_color(section);
        self.plan.fill_range(first_row, COL_REPORT_NUMBER, last_row, COL_PHOTO, color);
    }

    pub fn finish(self) -> SheetPlan {
        self.plan
    }
}
