//! 写真の取得と縮小
//!
//! キャッシュがあればそのまま返す。無ければダウンロードして
//! 上限サイズまで縮小（拡大はしない）し、JPEGに再エンコードする。

use super::cache::PhotoCache;
use crate::error::{ReportError, Result};
use crate::redmine::PhotoDownloader;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageReader};
use std::io::Cursor;
use welding_report_common::PhotoImage;

/// 縮小・再エンコードの設定
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchOptions {
    pub max_width_px: u32,
    pub max_height_px: u32,
    pub jpeg_quality: u8,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            max_width_px: 1280,
            max_height_px: 960,
            jpeg_quality: 75,
        }
    }
}

/// 縮小率（1を超えない）
pub fn bounded_scale(width: u32, height: u32, options: &FetchOptions) -> f64 {
    let scale_x = options.max_width_px as f64 / width as f64;
    let scale_y = options.max_height_px as f64 / height as f64;
    1.0_f64.min(scale_x.min(scale_y))
}

pub struct PhotoFetcher<'a, D: PhotoDownloader> {
    downloader: &'a D,
    cache: &'a PhotoCache,
    options: FetchOptions,
}

impl<'a, D: PhotoDownloader> PhotoFetcher<'a, D> {
    pub fn new(downloader: &'a D, cache: &'a PhotoCache, options: FetchOptions) -> Self {
        Self {
            downloader,
            cache,
            options,
        }
    }

    /// 写真を取得
    ///
    /// `scope` を指定した場合のみキャッシュを読み書きする。
    pub async fn fetch(&self, url: &str, scope: Option<&str>) -> Result<PhotoImage> {
        if let Some(scope) = scope {
            if let Some(data) = self.cache.get(scope, url)? {
                let (width, height) = read_dimensions(&data)?;
                return Ok(PhotoImage { data, width, height });
            }
        }

        let bytes = self.downloader.download(url).await?;
        let photo = shrink(&bytes, &self.options)?;
        tracing::debug!(url, width = photo.width, height = photo.height, "写真を縮小");

        if let Some(scope) = scope {
            self.cache.put(scope, url, &photo.data)?;
        }
        Ok(photo)
    }
}

/// デコード・縮小・JPEG再エンコード
pub fn shrink(bytes: &[u8], options: &FetchOptions) -> Result<PhotoImage> {
    let img = image::load_from_memory(bytes).map_err(|e| ReportError::InvalidImage(e.to_string()))?;
    let (width, height) = (img.width(), img.height());
    if width == 0 || height == 0 {
        return Err(ReportError::InvalidImage(format!("画像サイズが0です: {}x{}", width, height)));
    }

    let scale = bounded_scale(width, height, options);
    let img = if scale < 1.0 {
        let new_width = ((width as f64 * scale) as u32).max(1);
        let new_height = ((height as f64 * scale) as u32).max(1);
        img.resize_exact(new_width, new_height, FilterType::Triangle)
    } else {
        img
    };

    let data = encode_jpeg(&img, options.jpeg_quality)?;
    Ok(PhotoImage {
        data,
        width: img.width(),
        height: img.height(),
    })
}

fn encode_jpeg(img: &DynamicImage, quality: u8) -> Result<Vec<u8>> {
    let rgb = img.to_rgb8();
    let mut buf = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut buf, quality);
    encoder
        .encode_image(&rgb)
        .map_err(|e| ReportError::InvalidImage(e.to_string()))?;
    Ok(buf)
}

/// キャッシュ済みデータの幅・高さ
fn read_dimensions(data: &[u8]) -> Result<(u32, u32)> {
    let (width, height) = ImageReader::new(Cursor::new(data))
        .with_guessed_format()?
        .into_dimensions()
        .map_err(|e| ReportError::InvalidImage(e.to_string()))?;
    if width == 0 || height == 0 {
        return Err(ReportError::InvalidImage("キャッシュ画像のサイズが0です".into()));
    }
    Ok((width, height))
}
