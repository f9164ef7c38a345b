//! Excel生成（共通ライブラリ）
//!
//! `SheetPlan` を rust_xlsxwriter でxlsxバッファへ書き出す。

use super::sheet_plan::{CellStyle, CellValue, PlacedPicture, SheetPlan};
use crate::error::{Error, Result};
use rust_xlsxwriter::*;
use std::collections::HashMap;

fn xlsx_error(context: &'static str) -> impl Fn(XlsxError) -> Error {
    move |e| Error::Excel(format!("{}: {}", context, e))
}

/// 書式をFormatに変換
fn to_format(style: &CellStyle) -> Format {
    let mut format = Format::new().set_align(FormatAlign::VerticalCenter);
    if let Some(color) = style.fill {
        format = format
            .set_pattern(FormatPattern::Solid)
            .set_background_color(Color::RGB(color));
    }
    if style.border {
        format = format.set_border(FormatBorder::Thin);
    }
    if style.wrap {
        format = format.set_text_wrap();
    }
    if style.align_left {
        format = format.set_align(FormatAlign::Left);
    }
    if let Some(size) = style.font_size {
        format = format.set_font_size(size);
    }
    format
}

/// 書式ごとにFormatを使い回す
#[derive(Default)]
struct FormatCache {
    formats: HashMap<CellStyle, Format>,
}

impl FormatCache {
    fn get(&mut self, style: &CellStyle) -> &Format {
        self.formats.entry(*style).or_insert_with(|| to_format(style))
    }
}

/// 1シート分の計画をxlsxバッファに生成
pub fn generate_excel_buffer(plan: &SheetPlan) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    if !plan.sheet_name.is_empty() {
        worksheet
            .set_name(&plan.sheet_name)
            .map_err(xlsx_error("シート名設定エラー"))?;
    }

    write_sheet(worksheet, plan)?;

    workbook.save_to_buffer().map_err(xlsx_error("Excel保存エラー"))
}

/// ワークシートに計画を書き込む
pub fn write_sheet(worksheet: &mut Worksheet, plan: &SheetPlan) -> Result<()> {
    let mut formats = FormatCache::default();

    for (&col, &width) in plan.column_widths() {
        worksheet
            .set_column_width(col, width)
            .map_err(xlsx_error("列幅設定エラー"))?;
    }
    for (&row, &height) in plan.row_heights() {
        worksheet
            .set_row_height(row, height)
            .map_err(xlsx_error("行高さ設定エラー"))?;
    }

    // 結合範囲は先頭セルの書式で作成し、先頭セルに値を書き直す
    for range in plan.merges() {
        let anchor = plan.cell(range.first_row, range.first_col).cloned().unwrap_or_default();
        let format = formats.get(&anchor.style).clone();
        worksheet
            .merge_range(range.first_row, range.first_col, range.last_row, range.last_col, "", &format)
            .map_err(xlsx_error("セルマージエラー"))?;
        if let Some(value) = &anchor.value {
            write_value(worksheet, range.first_row, range.first_col, value, &format)?;
        }
    }

    for (&(row, col), cell) in plan.cells() {
        if plan.merge_at(row, col).is_some() {
            continue;
        }
        let format = formats.get(&cell.style);
        match &cell.value {
            Some(value) => write_value(worksheet, row, col, value, format)?,
            None if cell.style != CellStyle::default() => {
                worksheet
                    .write_blank(row, col, format)
                    .map_err(xlsx_error("セル書式設定エラー"))?;
            }
            None => {}
        }
    }

    for picture in plan.pictures() {
        insert_picture(worksheet, picture)?;
    }
    Ok(())
}

fn write_value(worksheet: &mut Worksheet, row: u32, col: u16, value: &CellValue, format: &Format) -> Result<()> {
    match value {
        CellValue::Text(text) => worksheet
            .write_string_with_format(row, col, text, format)
            .map_err(xlsx_error("セル書き込みエラー"))?,
        CellValue::Number(number) => worksheet
            .write_number_with_format(row, col, *number, format)
            .map_err(xlsx_error("セル書き込みエラー"))?,
    };
    Ok(())
}

/// 画像を表示サイズに合わせてセル内オフセット位置へ埋め込む
fn insert_picture(worksheet: &mut Worksheet, picture: &PlacedPicture) -> Result<()> {
    let image = Image::new_from_buffer(&picture.data).map_err(xlsx_error("画像読み込みエラー"))?;
    if image.width() <= 0.0 || image.height() <= 0.0 {
        return Err(Error::Excel(format!("画像サイズが不正です: {}", picture.source_url)));
    }

    let scale_width = picture.width as f64 / image.width();
    let scale_height = picture.height as f64 / image.height();
    let image = image
        .set_scale_width(scale_width)
        .set_scale_height(scale_height)
        .set_object_movement(ObjectMovement::DontMoveOrSizeWithCells);

    worksheet
        .insert_image_with_offset(picture.row, picture.col, &image, picture.x_offset, picture.y_offset)
        .map_err(xlsx_error("画像埋め込みエラー"))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_plan_produces_xlsx() {
        let buffer = generate_excel_buffer(&SheetPlan::new("Отчет")).unwrap();
        assert!(buffer.starts_with(b"PK"));
    }

    #[test]
    fn test_merged_number_anchor() {
        let mut plan = SheetPlan::new("Отчет");
        let style = CellStyle {
            border: true,
            fill: Some(0xD6DCE4),
            ..Default::default()
        };
        plan.write(1, 1, 3i64, style);
        plan.border_range(1, 1, 3, 1);
        plan.merge(1, 1, 3, 1).unwrap();
        plan.write(1, 4, "ACME", CellStyle::default());
        plan.set_row_height(1, 105.0);
        plan.set_column_width(9, 60.0);

        let buffer = generate_excel_buffer(&plan).unwrap();
        assert!(!buffer.is_empty());
    }

    #[test]
    fn test_invalid_picture_data_is_error() {
        let mut plan = SheetPlan::new("s");
        plan.add_picture(PlacedPicture {
            row: 1,
            col: 9,
            x_offset: 5,
            y_offset: 5,
            width: 10,
            height: 10,
            data: b"not an image".to_vec(),
            source_url: "u".to_string(),
        });
        assert!(matches!(generate_excel_buffer(&plan), Err(Error::Excel(_))));
    }

    #[test]
    fn test_format_for_style() {
        let mut cache = FormatCache::default();
        let style = CellStyle {
            wrap: true,
            ..Default::default()
        };
        cache.get(&style);
        cache.get(&style);
        cache.get(&CellStyle::default());
        assert_eq!(cache.formats.len(), 2);
    }
}
