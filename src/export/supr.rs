//! SUPR検査依頼書の描画

use super::welding::to_xlsx;
use crate::error::Result;
use crate::template::load_template;
use std::path::Path;
use welding_report_common::{build_supr_sheet, SuprGroupReportData, SuprSignatures};

/// テンプレートの先頭シートに依頼書を書き込む
pub fn render_supr(template_path: &Path, data: &SuprGroupReportData, signatures: &SuprSignatures) -> Result<Vec<u8>> {
    let template = load_template(template_path, None)?;
    let plan = build_supr_sheet(&template, data, signatures)?;
    to_xlsx(&plan)
}
