//! 報告書描画テスト
//!
//! テンプレートを作成して描画し、calamine で読み戻して検証

mod support;

use calamine::{open_workbook, Data, Reader, Xlsx};
use rust_xlsxwriter::Workbook;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use support::{png, FakeDownloader};
use tempfile::tempdir;
use welding_report::error::ReportError;
use welding_report::export::{render_supr, WeldingRenderer};
use welding_report::photo::{FetchOptions, PhotoCache, PhotoFetcher};
use welding_report::template::load_template;
use welding_report_common::{
    IssueReportData, JointEntry, JointGroup, ProjectReportData, ReportLayout, SuprGroupReportData, SuprItem,
    SuprSignatures, TemplateSheet,
};

const SHEET: &str = "Отчет";
const PHOTO_A: &str = "https://r/attachments/download/1/a.jpg";
const PHOTO_B: &str = "https://r/attachments/download/2/b.jpg";
const PHOTO_MISSING: &str = "https://r/attachments/download/9/gone.jpg";

fn welding_template(dir: &Path) -> PathBuf {
    let path = dir.join("welding.xlsx");
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET).unwrap();
    worksheet.write_string(0, 0, "№ акта").unwrap();
    worksheet.write_string(0, 9, "Фото").unwrap();
    workbook.save(&path).unwrap();
    path
}

fn entry(contractor: &str, photos: &[(&str, &str)]) -> JointEntry {
    let mut entry = JointEntry::new(contractor);
    for (joints, url) in photos {
        entry.add_photo(joints, *url);
    }
    entry
}

fn act(report_number: &str, entries: Vec<JointEntry>) -> IssueReportData {
    IssueReportData {
        report_number: report_number.into(),
        joints_count_plan: 10,
        joints_count_fact: 2,
        diameter_inches_plan: 40.0,
        diameter_inches_fact: 20.0,
        groups: vec![JointGroup {
            act_paragraph: 1,
            equipment_type: "Трубопровод".into(),
            pipeline_number: "P-101".into(),
            diameter_mm: 219.1,
            diameter_inches: 8.63,
            joints_count: 2,
            entries,
        }],
    }
}

fn downloader() -> FakeDownloader {
    FakeDownloader::default()
        .with_photo(PHOTO_A, png(640, 480))
        .with_photo(PHOTO_B, png(480, 640))
}

fn renderer<'a>(template: TemplateSheet, downloader: &'a FakeDownloader, cache: &'a PhotoCache) -> WeldingRenderer<'a, FakeDownloader> {
    let fetcher = PhotoFetcher::new(downloader, cache, FetchOptions::default());
    WeldingRenderer::new(ReportLayout::default(), template, fetcher)
}

fn cell_text(range: &calamine::Range<Data>, row: u32, col: u32) -> String {
    range.get_value((row, col)).map(|v| v.to_string()).unwrap_or_default()
}

/// テンプレートが無い・シートが無い場合は Template エラー
#[test]
fn test_missing_template_or_sheet() {
    let dir = tempdir().expect("Failed to create temp dir");
    let missing = load_template(&dir.path().join("none.xlsx"), Some(SHEET));
    assert!(matches!(missing, Err(ReportError::Template(_))));

    let path = welding_template(dir.path());
    let wrong_sheet = load_template(&path, Some("Лист9"));
    assert!(matches!(wrong_sheet, Err(ReportError::Template(_))));

    let template = load_template(&path, Some(SHEET)).unwrap();
    assert_eq!(template.text_at(0, 9).as_deref(), Some("Фото"));
}

/// 描画結果を読み戻すと見出し・集計行・グループ行・結合が入っている
#[tokio::test]
async fn test_issue_report_round_trip() {
    let dir = tempdir().expect("Failed to create temp dir");
    let template = load_template(&welding_template(dir.path()), Some(SHEET)).unwrap();
    let cache = PhotoCache::new(dir.path().join("cache"));
    let downloader = downloader();

    let data = act(
        "АКТ-10",
        vec![
            entry("ACME", &[("J3", PHOTO_A)]),
            entry("Бета", &[("J1", PHOTO_B)]),
        ],
    );
    let bytes = renderer(template, &downloader, &cache).render_issue(&data).await.unwrap();
    let out = dir.path().join("out.xlsx");
    std::fs::write(&out, &bytes).unwrap();

    let mut workbook: Xlsx<_> = open_workbook(&out).unwrap();
    let range = workbook.worksheet_range(SHEET).unwrap();
    assert_eq!(cell_text(&range, 0, 0), "№ акта");
    assert_eq!(cell_text(&range, 1, 0), "Итого по акту: АКТ-10");
    assert_eq!(cell_text(&range, 1, 5), "5 из 10");
    assert_eq!(cell_text(&range, 2, 0), "АКТ-10");
    assert_eq!(cell_text(&range, 2, 4), "ACME");
    assert_eq!(cell_text(&range, 3, 4), "Бета");
    assert_eq!(cell_text(&range, 2, 3), "P-101");

    workbook.load_merged_regions().unwrap();
    let merges: Vec<((u32, u32), (u32, u32))> = workbook
        .merged_regions_by_sheet(SHEET)
        .iter()
        .map(|(_, _, dims)| (dims.start, dims.end))
        .collect();
    assert!(merges.contains(&((1, 0), (1, 4))));
    assert!(merges.contains(&((2, 0), (3, 0))));
    assert!(merges.contains(&((2, 8), (3, 8))));
    assert!(!merges.iter().any(|(start, _)| start.1 == 4));

    // 単発の検査記録はキャッシュしない
    assert_eq!(cache.info(None).unwrap().files, 0);
}

/// テンプレート見出しの結合範囲は出力にも残る
#[tokio::test]
async fn test_template_header_merge_survives() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("merged.xlsx");
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET).unwrap();
    worksheet
        .merge_range(0, 0, 0, 3, "Заголовок", &rust_xlsxwriter::Format::new())
        .unwrap();
    worksheet.write_string(0, 9, "Фото").unwrap();
    workbook.save(&path).unwrap();

    let template = load_template(&path, Some(SHEET)).unwrap();
    assert_eq!(template.merges.len(), 1);

    let cache = PhotoCache::new(dir.path().join("cache"));
    let downloader = downloader();
    let data = act("АКТ-13", vec![entry("ACME", &[("J1", PHOTO_A)])]);
    let bytes = renderer(template, &downloader, &cache).render_issue(&data).await.unwrap();
    let out = dir.path().join("merged-out.xlsx");
    std::fs::write(&out, &bytes).unwrap();

    let mut workbook: Xlsx<_> = open_workbook(&out).unwrap();
    let range = workbook.worksheet_range(SHEET).unwrap();
    assert_eq!(cell_text(&range, 0, 0), "Заголовок");

    workbook.load_merged_regions().unwrap();
    let merges: Vec<((u32, u32), (u32, u32))> = workbook
        .merged_regions_by_sheet(SHEET)
        .iter()
        .map(|(_, _, dims)| (dims.start, dims.end))
        .collect();
    assert!(merges.contains(&((0, 0), (0, 3))));
    assert!(merges.contains(&((1, 0), (1, 4))));
}

/// 取得できない写真はスキップされ、行の高さは配置した写真だけで決まる
#[tokio::test]
async fn test_missing_photo_is_skipped() {
    let dir = tempdir().expect("Failed to create temp dir");
    let template = load_template(&welding_template(dir.path()), Some(SHEET)).unwrap();
    let cache = PhotoCache::new(dir.path().join("cache"));
    let downloader = downloader();
    let renderer = renderer(template, &downloader, &cache);

    let with_missing = act(
        "АКТ-11",
        vec![entry("ACME", &[("J1", PHOTO_A), ("J2", PHOTO_MISSING), ("J3", PHOTO_B)])],
    );
    let without_missing = act("АКТ-11", vec![entry("ACME", &[("J1", PHOTO_A), ("J3", PHOTO_B)])]);

    let plan = renderer.plan_issue(&with_missing).await.unwrap();
    let expected = renderer.plan_issue(&without_missing).await.unwrap();

    let urls: Vec<&str> = plan.pictures().iter().map(|p| p.source_url.as_str()).collect();
    assert_eq!(urls, vec![PHOTO_A, PHOTO_B]);
    assert_eq!(plan.row_height(2), expected.row_height(2));
    assert_eq!(plan.pictures(), expected.pictures());
}

/// 同じデータを2回描画すると同じ結果になる
#[tokio::test]
async fn test_render_is_repeatable() {
    let dir = tempdir().expect("Failed to create temp dir");
    let template = load_template(&welding_template(dir.path()), Some(SHEET)).unwrap();
    let cache = PhotoCache::new(dir.path().join("cache"));
    let downloader = downloader();
    let renderer = renderer(template, &downloader, &cache);

    let data = act("АКТ-12", vec![entry("ACME", &[("J1", PHOTO_A), ("J2", PHOTO_B)])]);
    let first = renderer.plan_issue(&data).await.unwrap();
    let second = renderer.plan_issue(&data).await.unwrap();
    assert!(first.same_layout(&second));
}

/// プロジェクト集計は検査記録ごとに帯色が交互になり、写真はキャッシュされる
#[tokio::test]
async fn test_project_rollup_bands_and_cache() {
    let dir = tempdir().expect("Failed to create temp dir");
    let template = load_template(&welding_template(dir.path()), Some(SHEET)).unwrap();
    let cache = PhotoCache::new(dir.path().join("cache"));
    let downloader = downloader();
    let renderer = renderer(template, &downloader, &cache);
    let layout = ReportLayout::default();

    let data = ProjectReportData {
        identifier: "unit-7".into(),
        name: "Установка".into(),
        acts: vec![
            act("АКТ-1", vec![entry("ACME", &[("J1", PHOTO_A)])]),
            act("АКТ-2", vec![entry("ACME", &[("J1", PHOTO_A)])]),
        ],
    };
    let plan = renderer.plan_project(&data).await.unwrap();

    // 各検査記録は集計行＋グループ1行
    let fill = |row: u32, col: u16| plan.cell(row, col).and_then(|c| c.style.fill);
    assert_eq!(fill(1, 0), Some(layout.band_color(0)));
    assert_eq!(fill(2, 2), Some(layout.band_color(0)));
    assert_eq!(fill(3, 0), Some(layout.band_color(1)));
    assert_eq!(fill(4, 9), Some(layout.band_color(1)));

    assert!(cache.path_for("unit-7", PHOTO_A).unwrap().exists());
    assert_eq!(downloader.calls.get(), 1);
}

/// SUPR依頼書は依頼番号セルに番号を追記し、10行目から番号順に書く
#[test]
fn test_supr_round_trip() {
    let dir = tempdir().expect("Failed to create temp dir");
    let template_path = dir.path().join("supr.xlsx");
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.write_string(4, 7, "Заявка №").unwrap();
    worksheet.write_string(8, 1, "№").unwrap();
    workbook.save(&template_path).unwrap();

    let item = |detail: &str, equipment: &str| SuprItem {
        detail: detail.into(),
        installation_name: "ГО-1".into(),
        equipment_unit_number: equipment.into(),
        ..Default::default()
    };
    let data = SuprGroupReportData {
        application_number: 77,
        factory: "НПЗ".into(),
        items: BTreeMap::from([(2, item("Проверка B", "E-2")), (1, item("Проверка A", "E-1"))]),
    };

    let bytes = render_supr(&template_path, &data, &SuprSignatures::default()).unwrap();
    let out = dir.path().join("supr-out.xlsx");
    std::fs::write(&out, &bytes).unwrap();

    let mut workbook: Xlsx<_> = open_workbook(&out).unwrap();
    let name = workbook.sheet_names()[0].clone();
    let range = workbook.worksheet_range(&name).unwrap();
    assert_eq!(cell_text(&range, 4, 7), "Заявка № 77 от __.__ 20__г");
    assert_eq!(cell_text(&range, 9, 1), "1");
    assert_eq!(cell_text(&range, 9, 8), "Проверка A");
    assert_eq!(cell_text(&range, 10, 8), "Проверка B");
    assert_eq!(cell_text(&range, 9, 2), "НПЗ");
    assert_eq!(cell_text(&range, 14, 3), "Исполнитель");
    assert_eq!(cell_text(&range, 14, 9), "Заказчик");

    workbook.load_merged_regions().unwrap();
    let merges: Vec<((u32, u32), (u32, u32))> = workbook
        .merged_regions_by_sheet(&name)
        .iter()
        .map(|(_, _, dims)| (dims.start, dims.end))
        .collect();
    assert!(merges.contains(&((9, 2), (10, 2))));
    assert!(merges.contains(&((9, 3), (10, 3))));
    assert!(!merges.contains(&((9, 5), (10, 5))));
}
