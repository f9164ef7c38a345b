//! シート出力（計画の組み立てとxlsx書き出し）

pub mod sheet_plan;
pub mod supr_sheet;
pub mod welding_sheet;

#[cfg(feature = "excel")]
pub mod excel_core;
