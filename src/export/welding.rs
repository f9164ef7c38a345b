//! 溶接報告書の描画（CLI版）
//!
//! 写真は1枚ずつ順に取得し、取得できたものだけを配置する。
//! 写真の失敗はログに残してスキップし、報告書全体は失敗させない。

use crate::error::{ReportError, Result};
use crate::photo::PhotoFetcher;
use crate::redmine::PhotoDownloader;
use welding_report_common::export::excel_core::generate_excel_buffer;
use welding_report_common::{
    IssueReportData, ProjectReportData, ReportLayout, SheetPlan, TemplateSheet, WeldingSheetBuilder,
};

pub struct WeldingRenderer<'a, D: PhotoDownloader> {
    layout: ReportLayout,
    template: TemplateSheet,
    fetcher: PhotoFetcher<'a, D>,
}

impl<'a, D: PhotoDownloader> WeldingRenderer<'a, D> {
    pub fn new(layout: ReportLayout, template: TemplateSheet, fetcher: PhotoFetcher<'a, D>) -> Self {
        Self {
            layout,
            template,
            fetcher,
        }
    }

    /// 検査記録1件のシート計画（写真キャッシュは使わない）
    pub async fn plan_issue(&self, data: &IssueReportData) -> Result<SheetPlan> {
        let mut builder = WeldingSheetBuilder::new(&self.layout, &self.template);
        self.write_act(&mut builder, data, None).await?;
        Ok(builder.finish())
    }

    /// プロジェクト集計のシート計画（検査記録ごとに帯色を交互に付ける）
    pub async fn plan_project(&self, data: &ProjectReportData) -> Result<SheetPlan> {
        let mut builder = WeldingSheetBuilder::new(&self.layout, &self.template);
        let scope = Some(data.identifier.as_str());

        for (section, act) in data.acts.iter().enumerate() {
            let first_row = builder.current_row();
            self.write_act(&mut builder, act, scope).await?;
            let last_row = builder.current_row() - 1;
            builder.apply_band(first_row, last_row, section);
            println!("  ✔ {} ({}/{})", act.report_number, section + 1, data.acts.len());
        }
        Ok(builder.finish())
    }

    pub async fn render_issue(&self, data: &IssueReportData) -> Result<Vec<u8>> {
        let plan = self.plan_issue(data).await?;
        to_xlsx(&plan)
    }

    pub async fn render_project(&self, data: &ProjectReportData) -> Result<Vec<u8>> {
        let plan = self.plan_project(data).await?;
        to_xlsx(&plan)
    }

    /// 集計行とグループを書き込む
    async fn write_act(
        &self,
        builder: &mut WeldingSheetBuilder<'_>,
        data: &IssueReportData,
        scope: Option<&str>,
    ) -> Result<()> {
        builder.write_summary_line(data)?;

        for group in &data.groups {
            let rows = builder.begin_group(&data.report_number, group);
            for entry in &group.entries {
                let mut cursor = builder.begin_entry(entry);
                for url in entry.photos() {
                    match self.fetcher.fetch(url, scope).await {
                        Ok(photo) => {
                            builder.place_photo(&mut cursor, url, photo);
                        }
                        Err(e) => {
                            tracing::warn!(url, error = %e, "写真の取得に失敗、スキップ");
                        }
                    }
                }
                builder.finish_entry(&cursor);
            }
            builder.finish_group(rows)?;
        }

        tracing::debug!(report = %data.report_number, rows = builder.current_row(), "検査記録を書き込み");
        Ok(())
    }
}

pub(crate) fn to_xlsx(plan: &SheetPlan) -> Result<Vec<u8>> {
    generate_excel_buffer(plan).map_err(|e| ReportError::ExcelGeneration(e.to_string()))
}
