//! シート出力計画
//!
//! セル値・書式・結合範囲・行高さ・画像配置を xlsx へ書き出す前に保持する。
//! 書き出し処理（excel_core）と切り離しておくことで、同じモデルから
//! 同じ計画が得られることをテストで確認できる。

use crate::error::{Error, Result};
use std::collections::BTreeMap;

/// セル値
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Number(f64),
}

impl CellValue {
    /// 行高さ計算用の表示文字列
    pub fn display(&self) -> String {
        match self {
            CellValue::Text(s) => s.clone(),
            CellValue::Number(n) => n.to_string(),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        CellValue::Number(value as f64)
    }
}

/// セル書式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct CellStyle {
    /// 背景色（0xRRGGBB）
    pub fill: Option<u32>,
    /// 細線の罫線
    pub border: bool,
    pub wrap: bool,
    pub align_left: bool,
    pub font_size: Option<u8>,
}

/// セル
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cell {
    pub value: Option<CellValue>,
    pub style: CellStyle,
}

/// 結合範囲（両端を含む）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MergeRange {
    pub first_row: u32,
    pub first_col: u16,
    pub last_row: u32,
    pub last_col: u16,
}

impl MergeRange {
    pub fn contains(&self, row: u32, col: u16) -> bool {
        (self.first_row..=self.last_row).contains(&row) && (self.first_col..=self.last_col).contains(&col)
    }

    pub fn overlaps(&self, other: &MergeRange) -> bool {
        self.first_row <= other.last_row
            && other.first_row <= self.last_row
            && self.first_col <= other.last_col
            && other.first_col <= self.last_col
    }
}

/// セル内に配置した画像
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedPicture {
    pub row: u32,
    pub col: u16,
    pub x_offset: u32,
    pub y_offset: u32,
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
    pub source_url: String,
}

/// テンプレートから読み込んだシート
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TemplateSheet {
    pub sheet_name: String,
    pub cells: Vec<(u32, u16, CellValue)>,
    pub merges: Vec<MergeRange>,
}

impl TemplateSheet {
    pub fn text_at(&self, row: u32, col: u16) -> Option<String> {
        self.cells
            .iter()
            .find(|(r, c, _)| *r == row && *c == col)
            .map(|(_, _, v)| v.display())
    }
}

/// 1シート分の出力計画
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SheetPlan {
    pub sheet_name: String,
    cells: BTreeMap<(u32, u16), Cell>,
    merges: Vec<MergeRange>,
    row_heights: BTreeMap<u32, f64>,
    column_widths: BTreeMap<u16, f64>,
    pictures: Vec<PlacedPicture>,
}

impl SheetPlan {
    pub fn new(sheet_name: impl Into<String>) -> Self {
        Self {
            sheet_name: sheet_name.into(),
            ..Default::default()
        }
    }

    /// テンプレートの内容（指定行より上の値と結合）を引き継ぐ
    pub fn from_template(template: &TemplateSheet, before_row: u32) -> Self {
        let mut plan = Self::new(template.sheet_name.clone());
        for (row, col, value) in &template.cells {
            if *row < before_row {
                plan.set_value(*row, *col, value.clone());
            }
        }
        for range in template.merges.iter().filter(|m| m.last_row < before_row) {
            if let Err(e) = plan.merge(range.first_row, range.first_col, range.last_row, range.last_col) {
                tracing::debug!(error = %e, "テンプレートの結合範囲をスキップ");
            }
        }
        plan
    }

    /// 値を設定（書式は保持）
    pub fn set_value(&mut self, row: u32, col: u16, value: impl Into<CellValue>) {
        self.cells.entry((row, col)).or_default().value = Some(value.into());
    }

    /// 値と書式を設定
    pub fn write(&mut self, row: u32, col: u16, value: impl Into<CellValue>, style: CellStyle) {
        self.cells.insert(
            (row, col),
            Cell {
                value: Some(value.into()),
                style,
            },
        );
    }

    /// 書式を更新（セルが無ければ空セルを作る）
    pub fn update_style(&mut self, row: u32, col: u16, f: impl FnOnce(&mut CellStyle)) {
        f(&mut self.cells.entry((row, col)).or_default().style);
    }

    /// 範囲に罫線を付ける
    pub fn border_range(&mut self, first_row: u32, first_col: u16, last_row: u32, last_col: u16) {
        for row in first_row..=last_row {
            for col in first_col..=last_col {
                self.update_style(row, col, |s| s.border = true);
            }
        }
    }

    /// 範囲を塗りつぶす
    pub fn fill_range(&mut self, first_row: u32, first_col: u16, last_row: u32, last_col: u16, color: u32) {
        for row in first_row..=last_row {
            for col in first_col..=last_col {
                self.update_style(row, col, |s| s.fill = Some(color));
            }
        }
    }

    pub fn cell(&self, row: u32, col: u16) -> Option<&Cell> {
        self.cells.get(&(row, col))
    }

    pub fn value(&self, row: u32, col: u16) -> Option<&CellValue> {
        self.cell(row, col).and_then(|c| c.value.as_ref())
    }

    /// 表示文字列（空セルは空文字）
    pub fn text(&self, row: u32, col: u16) -> String {
        self.value(row, col).map(|v| v.display()).unwrap_or_default()
    }

    /// セルを結合（1セルだけの範囲は何もしない）
    pub fn merge(&mut self, first_row: u32, first_col: u16, last_row: u32, last_col: u16) -> Result<()> {
        if first_row == last_row && first_col == last_col {
            return Ok(());
        }
        let range = MergeRange {
            first_row,
            first_col,
            last_row,
            last_col,
        };
        if let Some(existing) = self.merges.iter().find(|m| m.overlaps(&range)) {
            return Err(Error::Excel(format!(
                "結合範囲が重複しています: {:?} と {:?}",
                existing, range
            )));
        }
        self.merges.push(range);
        Ok(())
    }

    /// セルを含む結合範囲
    pub fn merge_at(&self, row: u32, col: u16) -> Option<&MergeRange> {
        self.merges.iter().find(|m| m.contains(row, col))
    }

    pub fn set_row_height(&mut self, row: u32, height: f64) {
        self.row_heights.insert(row, height);
    }

    pub fn row_height(&self, row: u32) -> Option<f64> {
        self.row_heights.get(&row).copied()
    }

    pub fn set_column_width(&mut self, col: u16, width: f64) {
        self.column_widths.insert(col, width);
    }

    pub fn add_picture(&mut self, picture: PlacedPicture) {
        self.pictures.push(picture);
    }

    pub fn cells(&self) -> impl Iterator<Item = (&(u32, u16), &Cell)> {
        self.cells.iter()
    }

    pub fn merges(&self) -> &[MergeRange] {
        &self.merges
    }

    pub fn row_heights(&self) -> impl Iterator<Item = (&u32, &f64)> {
        self.row_heights.iter()
    }

    pub fn column_widths(&self) -> impl Iterator<Item = (&u16, &f64)> {
        self.column_widths.iter()
    }

    pub fn pictures(&self) -> &[PlacedPicture] {
        &self.pictures
    }

    /// 最後に使われている行（空シートなら None）
    pub fn last_row(&self) -> Option<u32> {
        self.cells.keys().map(|(r, _)| *r).max()
    }

    /// セル値と結合範囲が一致するか（画像データは比較しない）
    pub fn same_layout(&self, other: &SheetPlan) -> bool {
        let values = |plan: &SheetPlan| -> Vec<((u32, u16), Option<CellValue>)> {
            plan.cells.iter().map(|(k, c)| (*k, c.value.clone())).collect()
        };
        let mut mine = self.merges.clone();
        let mut theirs = other.merges.clone();
        mine.sort();
        theirs.sort();
        values(self) == values(other) && mine == theirs
    }
}
