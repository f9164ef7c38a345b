use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("APIキーが設定されていません。`welding-report config --set-api-key YOUR_KEY` または環境変数 REDMINE_API_KEY で設定してください")]
    MissingApiKey,

    #[error("チケットが見つかりません: {0}")]
    NotFound(String),

    #[error("通信エラー: {0}")]
    Transport(String),

    #[error("画像デコードエラー: {0}")]
    InvalidImage(String),

    #[error("テンプレートエラー: {0}")]
    Template(String),

    #[error("Excel生成エラー: {0}")]
    ExcelGeneration(String),

    #[error("メール送信エラー: {0}")]
    Email(String),

    #[error("送信先メールアドレスをRedmineアカウントから取得できません")]
    MissingRecipient,

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Common(#[from] welding_report_common::Error),
}

impl From<reqwest::Error> for ReportError {
    fn from(e: reqwest::Error) -> Self {
        ReportError::Transport(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ReportError>;
