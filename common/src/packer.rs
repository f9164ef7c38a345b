//! 写真配置（パッキング）
//!
//! 写真列の幅に収まるよう左から順に並べ、はみ出す場合は次の段へ折り返す。
//! カーソルは描画ループ側が1行ごとに持ち、配置のたびに更新される。

use crate::layout::{ReportLayout, PX_PER_WIDTH_UNIT, ROW_HEIGHT_TO_PX, X_GAP, Y_GAP};

/// 配置対象の写真（JPEGなどのエンコード済みデータと画素数）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoImage {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// 1行分の配置カーソル
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhotoCursor {
    /// 次の写真のX位置（px）
    pub x: f64,
    /// 現在の段のY位置（px）
    pub y: f64,
    /// 行高さの累計（pt）
    pub row_height: f64,
    /// 配置済み枚数
    pub placed: usize,
}

/// 1枚分の配置結果
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    /// この写真で次の段へ折り返したか
    pub new_row: bool,
}

/// 写真列へのパッキング
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhotoPacker {
    max_row_height: f64,
    max_column_width: f64,
}

impl PhotoPacker {
    pub fn new(max_row_height: f64, max_column_width: f64) -> Self {
        Self {
            max_row_height,
            max_column_width,
        }
    }

    pub fn from_layout(layout: &ReportLayout) -> Self {
        Self::new(layout.max_row_height, layout.max_photo_column_width)
    }

    /// 行の先頭カーソル
    pub fn start_row(&self) -> PhotoCursor {
        PhotoCursor {
            x: X_GAP,
            y: Y_GAP,
            row_height: self.max_row_height,
            placed: 0,
        }
    }

    /// 表示サイズ（px）
    ///
    /// 縦を `max_row_height * 1.3` に揃える。キャッシュ時の縮小とは独立。
    pub fn display_size(&self, width_px: u32, height_px: u32) -> (u32, u32) {
        if width_px == 0 || height_px == 0 {
            return (0, 0);
        }
        let scale = self.max_row_height * ROW_HEIGHT_TO_PX / height_px as f64;
        (
            (width_px as f64 * scale) as u32,
            (height_px as f64 * scale) as u32,
        )
    }

    /// 次の写真を配置してカーソルを進める
    pub fn place(&self, cursor: &mut PhotoCursor, width: u32, height: u32) -> Placement {
        let w = width as f64;
        let h = height as f64;

        let new_row = (cursor.x + w) / PX_PER_WIDTH_UNIT > self.max_column_width;
        if new_row {
            cursor.x = X_GAP;
            cursor.y += h + Y_GAP;
            cursor.row_height += self.max_row_height + Y_GAP;
        }

        let placement = Placement {
            x: cursor.x as u32,
            y: cursor.y as u32,
            width,
            height,
            new_row,
        };

        cursor.x += w + X_GAP;
        cursor.placed += 1;
        placement
    }

    /// 行を閉じたときの最終行高さ（pt）
    pub fn finish_row(&self, cursor: &PhotoCursor) -> f64 {
        cursor.row_height + Y_GAP
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn packer() -> PhotoPacker {
        // 100pt → 写真高さ130px、列幅60単位 = 420px
        PhotoPacker::new(100.0, 60.0)
    }

    #[test]
    fn test_display_size_fixed_height() {
        let p = packer();
        assert_eq!(p.display_size(4000, 3000), (173, 130));
        assert_eq!(p.display_size(300, 600), (65, 130));
        assert_eq!(p.display_size(0, 600), (0, 0));
    }

    #[test]
    fn test_place_without_wrap() {
        let p = packer();
        let mut cursor = p.start_row();
        let first = p.place(&mut cursor, 173, 130);
        assert_eq!((first.x, first.y, first.new_row), (5, 5, false));
        let second = p.place(&mut cursor, 173, 130);
        assert_eq!((second.x, second.y, second.new_row), (183, 5, false));
        assert_eq!(cursor.row_height, 100.0);
        assert_eq!(p.finish_row(&cursor), 105.0);
    }

    #[test]
    fn test_place_wraps_to_next_row() {
        let p = packer();
        let mut cursor = p.start_row();
        p.place(&mut cursor, 173, 130);
        p.place(&mut cursor, 173, 130);
        // 361 + 173 = 534px > 420px
        let third = p.place(&mut cursor, 173, 130);
        assert!(third.new_row);
        assert_eq!((third.x, third.y), (5, 140));
        assert_eq!(cursor.x, 5.0 + 173.0 + 5.0);
        assert_eq!(cursor.row_height, 205.0);
        assert_eq!(p.finish_row(&cursor), 210.0);

        let fourth = p.place(&mut cursor, 173, 130);
        assert!(!fourth.new_row);
        assert_eq!((fourth.x, fourth.y), (183, 140));
    }

    #[test]
    fn test_no_silent_overflow() {
        let p = packer();
        let widths = [173u32, 65, 200, 90, 173, 173, 10, 300, 65, 65, 65, 65, 65, 120];
        let mut cursor = p.start_row();
        for w in widths {
            let placement = p.place(&mut cursor, w, 130);
            if placement.new_row {
                assert_eq!(placement.x as f64, X_GAP);
            } else {
                let right = placement.x as f64 + placement.width as f64;
                assert!(right / PX_PER_WIDTH_UNIT <= 60.0, "overflow at x={}", placement.x);
            }
        }
        assert_eq!(cursor.placed, widths.len());
    }

    #[test]
    fn test_y_grows_only_on_wrap() {
        let p = packer();
        let mut cursor = p.start_row();
        let mut last_y = 0;
        let mut wraps = 0;
        for _ in 0..10 {
            let placement = p.place(&mut cursor, 173, 130);
            if placement.new_row {
                wraps += 1;
                assert!(placement.y > last_y);
            } else if last_y != 0 {
                assert_eq!(placement.y, last_y);
            }
            last_y = placement.y;
        }
        assert_eq!(cursor.row_height, 100.0 + wraps as f64 * (100.0 + Y_GAP));
    }
}
