//! 写真キャッシュ
//!
//! `<root>/<scope>/<URLから作るファイル名>` に縮小済みの写真を置く。
//! 無効化はせず、同じ名前への書き込みは後勝ち。
//! スコープはルート直下の1階層に限る。

use crate::error::{ReportError, Result};
use std::fs;
use std::path::{Component, Path, PathBuf};

const DOWNLOAD_MARKER: &str = "attachments/download/";

/// キャッシュの統計
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheInfo {
    pub files: usize,
    pub bytes: u64,
}

#[derive(Debug, Clone)]
pub struct PhotoCache {
    root: PathBuf,
}

impl PhotoCache {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// URLからキャッシュファイル名を作る
    ///
    /// `.../attachments/download/7/photo.jpg` → `7_photo.jpg`。
    /// マーカーが無いURLはパス全体を使う。
    pub fn file_name_for(url: &str) -> String {
        let without_scheme = url.split_once("://").map_or(url, |(_, rest)| rest);
        let path = if url.contains("://") {
            without_scheme.find('/').map_or("", |i| &without_scheme[i..])
        } else {
            without_scheme
        };
        let path = path.split(['?', '#']).next().unwrap_or_default();

        let tail = match path.find(DOWNLOAD_MARKER) {
            Some(i) => &path[i + DOWNLOAD_MARKER.len()..],
            None => path.trim_start_matches('/'),
        };
        tail.replace('/', "_")
    }

    /// スコープのディレクトリ
    ///
    /// スコープはルート直下の1階層だけ。区切り文字や `..` を含むものは拒否する。
    pub fn scope_dir(&self, scope: &str) -> Result<PathBuf> {
        let mut components = Path::new(scope).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(name)), None) if !scope.contains(['/', '\\']) => {
                Ok(self.root.join(name))
            }
            _ => Err(ReportError::Config(format!(
                "キャッシュのスコープが不正です: {:?}",
                scope
            ))),
        }
    }

    pub fn path_for(&self, scope: &str, url: &str) -> Result<PathBuf> {
        Ok(self.scope_dir(scope)?.join(Self::file_name_for(url)))
    }

    /// キャッシュ済みのデータ（無ければ None）
    pub fn get(&self, scope: &str, url: &str) -> Result<Option<Vec<u8>>> {
        let path = self.path_for(scope, url)?;
        Ok(match fs::read(&path) {
            Ok(data) => {
                tracing::debug!(path = %path.display(), "写真キャッシュを使用");
                Some(data)
            }
            Err(_) => None,
        })
    }

    /// 書き込み（上書き）
    pub fn put(&self, scope: &str, url: &str, data: &[u8]) -> Result<PathBuf> {
        let path = self.path_for(scope, url)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, data)?;
        Ok(path)
    }

    /// ファイル数と合計サイズ（scope 省略時は全体）
    pub fn info(&self, scope: Option<&str>) -> Result<CacheInfo> {
        let dir = self.target_dir(scope)?;
        let mut info = CacheInfo::default();
        if dir.exists() {
            collect_info(&dir, &mut info)?;
        }
        Ok(info)
    }

    /// 削除したファイル数を返す
    pub fn clear(&self, scope: Option<&str>) -> Result<usize> {
        let dir = self.target_dir(scope)?;
        if !dir.exists() {
            return Ok(0);
        }
        let removed = self.info(scope)?.files;
        fs::remove_dir_all(&dir)?;
        tracing::info!(dir = %dir.display(), removed, "写真キャッシュを削除");
        Ok(removed)
    }

    /// scope 省略時はルート全体
    pub fn target_dir(&self, scope: Option<&str>) -> Result<PathBuf> {
        match scope {
            Some(s) => self.scope_dir(s),
            None => Ok(self.root.clone()),
        }
    }
}

fn collect_info(dir: &Path, info: &mut CacheInfo) -> Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let metadata = entry.metadata()?;
        if metadata.is_dir() {
            collect_info(&entry.path(), info)?;
        } else {
            info.files += 1;
            info.bytes += metadata.len();
        }
    }
    Ok(())
}
