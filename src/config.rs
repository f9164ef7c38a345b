//! 設定ファイル
//!
//! `~/.config/welding-report/config.json` を読み込む。ファイルが無ければ既定値。
//! APIキーは環境変数 `REDMINE_API_KEY` を優先する。

use crate::error::{ReportError, Result};
use crate::photo::FetchOptions;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use welding_report_common::layout::{parse_hex_color, ReportLayout, DEFAULT_COLUMN_WIDTHS};
use welding_report_common::SuprSignatures;

pub const API_KEY_ENV: &str = "REDMINE_API_KEY";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub redmine: RedmineSettings,
    pub report: ReportSettings,
    pub email: Option<EmailSettings>,
    pub supr_signatures: SuprSignatures,
}

/// Redmine接続設定
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct RedmineSettings {
    /// 溶接記録のRedmine
    pub welding_url: String,
    /// SUPR依頼のRedmine
    pub supr_url: String,
    pub api_key: Option<String>,
    /// 自己署名証明書のサーバーに接続する
    pub accept_invalid_certs: bool,
}

/// 報告書生成の設定
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportSettings {
    pub template_dir: PathBuf,
    pub welding_template: String,
    pub supr_template: String,
    pub worksheet_name: String,
    /// 写真1段分の行高さ（pt）
    pub max_row_height: f64,
    /// 写真列の幅（Excel幅単位）
    pub max_photo_column_width: f64,
    pub max_photo_width_px: u32,
    pub max_photo_height_px: u32,
    pub photo_jpeg_quality: u8,
    pub photo_cache_path: PathBuf,
    pub project_report_row_color1: String,
    pub project_report_row_color2: String,
    /// 写真列より左の列幅（テンプレートから読めないため設定で持つ）
    pub column_widths: Vec<f64>,
    pub output_dir: PathBuf,
    /// 生成したファイルの保存先（未設定なら保存しない）
    pub report_storage_path: Option<PathBuf>,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            template_dir: PathBuf::from("Templates"),
            welding_template: "WeldingReportTemplate.xlsx".into(),
            supr_template: "SuprReportTemplate.xlsx".into(),
            worksheet_name: "Отчет".into(),
            max_row_height: 100.0,
            max_photo_column_width: 60.0,
            max_photo_width_px: 1280,
            max_photo_height_px: 960,
            photo_jpeg_quality: 75,
            photo_cache_path: PathBuf::from("Resources/Welding/Photos"),
            project_report_row_color1: "#F5F5F5".into(),
            project_report_row_color2: "#E8F0FE".into(),
            column_widths: DEFAULT_COLUMN_WIDTHS.to_vec(),
            output_dir: PathBuf::from("."),
            report_storage_path: None,
        }
    }
}

impl ReportSettings {
    pub fn welding_template_path(&self) -> PathBuf {
        self.template_dir.join(&self.welding_template)
    }

    pub fn supr_template_path(&self) -> PathBuf {
        self.template_dir.join(&self.supr_template)
    }

    /// シートレイアウト（色の書式が不正なら設定エラー）
    pub fn layout(&self) -> Result<ReportLayout> {
        let color = |value: &str| {
            parse_hex_color(value).ok_or_else(|| ReportError::Config(format!("色の指定が不正です: {}", value)))
        };
        if self.max_row_height <= 0.0 || self.max_photo_column_width <= 0.0 {
            return Err(ReportError::Config("行高さ・写真列幅は正の値で指定してください".into()));
        }
        Ok(ReportLayout {
            max_row_height: self.max_row_height,
            max_photo_column_width: self.max_photo_column_width,
            column_widths: self.column_widths.clone(),
            band_colors: (
                color(&self.project_report_row_color1)?,
                color(&self.project_report_row_color2)?,
            ),
        })
    }

    pub fn fetch_options(&self) -> FetchOptions {
        FetchOptions {
            max_width_px: self.max_photo_width_px,
            max_height_px: self.max_photo_height_px,
            jpeg_quality: self.photo_jpeg_quality,
        }
    }
}

/// SMTP設定
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmailSettings {
    pub smtp_server: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub sender_email: String,
    pub sender_name: String,
}

impl Default for EmailSettings {
    fn default() -> Self {
        Self {
            smtp_server: String::new(),
            port: 465,
            username: String::new(),
            password: String::new(),
            sender_email: String::new(),
            sender_name: "Welding Report".into(),
        }
    }
}

impl Config {
    pub fn load_from(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            let content = std::fs::read_to_string(config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| ReportError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("welding-report").join("config.json"))
    }

    pub fn get_api_key(&self) -> Result<String> {
        // 環境変数を優先
        if let Ok(key) = std::env::var(API_KEY_ENV) {
            if !key.trim().is_empty() {
                return Ok(key);
            }
        }

        self.redmine
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or(ReportError::MissingApiKey)
    }

    pub fn set_api_key(&mut self, key: String, config_path: &Path) -> Result<()> {
        self.redmine.api_key = Some(key);
        self.save_to(config_path)
    }
}
