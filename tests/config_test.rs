//! 設定ファイルテスト
//!
//! 読み込み・保存・既定値の扱いを検証

use tempfile::tempdir;
use welding_report::config::Config;
use welding_report::error::ReportError;

/// ファイルが無ければ既定値
#[test]
fn test_load_missing_file_uses_defaults() {
    let dir = tempdir().expect("Failed to create temp dir");
    let config = Config::load_from(&dir.path().join("config.json")).unwrap();

    assert_eq!(config.report.worksheet_name, "Отчет");
    assert_eq!(config.report.photo_jpeg_quality, 75);
    assert!(config.redmine.api_key.is_none());
}

/// APIキーを設定すると保存され、読み直しても残る
#[test]
fn test_set_api_key_persists() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("nested").join("config.json");

    let mut config = Config::default();
    config.redmine.welding_url = "https://redmine.local".into();
    config.set_api_key("abc123".into(), &path).unwrap();

    let loaded = Config::load_from(&path).unwrap();
    assert_eq!(loaded.redmine.api_key.as_deref(), Some("abc123"));
    assert_eq!(loaded.redmine.welding_url, "https://redmine.local");
}

/// 壊れたJSONは JsonParse エラー
#[test]
fn test_broken_json_is_error() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("config.json");
    std::fs::write(&path, "{ not json").unwrap();

    let result = Config::load_from(&path);
    assert!(matches!(result, Err(ReportError::JsonParse(_))));
}

/// メール設定とSUPR署名欄を読み込める
#[test]
fn test_load_email_and_signatures() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("config.json");
    std::fs::write(
        &path,
        r#"{
            "email": {"smtp_server": "smtp.example.com", "sender_email": "reports@example.com"},
            "supr_signatures": {"performer": {"organization": "ООО Контроль"}}
        }"#,
    )
    .unwrap();

    let config = Config::load_from(&path).unwrap();
    let email = config.email.unwrap();
    assert_eq!(email.smtp_server, "smtp.example.com");
    assert_eq!(email.port, 465);
    assert_eq!(config.supr_signatures.performer.organization, "ООО Контроль");
    assert_eq!(config.supr_signatures.performer.position, "Генеральный директор");
}
