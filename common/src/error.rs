//! 共通ライブラリのエラー
//!
//! 不正なカスタムフィールドや添付説明はエラーにせず読み飛ばすため、
//! ここに来るのはシート計画の矛盾と出力時の失敗だけ。

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// 結合範囲の重複・xlsx書き出しの失敗
    #[error("Excel error: {0}")]
    Excel(String),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(feature = "excel")]
impl From<rust_xlsxwriter::XlsxError> for Error {
    fn from(err: rust_xlsxwriter::XlsxError) -> Self {
        Error::Excel(err.to_string())
    }
}
