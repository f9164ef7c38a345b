//! レイアウト設定モジュール
//!
//! 溶接報告書シートの列配置・余白・単位換算の定義

// ============================================
// 列配置（0始まり）
// ============================================

pub const COL_REPORT_NUMBER: u16 = 0;
pub const COL_ACT_PARAGRAPH: u16 = 1;
pub const COL_EQUIPMENT_TYPE: u16 = 2;
pub const COL_PIPELINE_NUMBER: u16 = 3;
pub const COL_CONTRACTOR: u16 = 4;
pub const COL_JOINTS: u16 = 5;
pub const COL_DIAMETER_MM: u16 = 6;
/// テンプレート側の列（値は書かず、グループ結合だけ行う）
pub const COL_RESERVED: u16 = 7;
pub const COL_DIAMETER_INCHES: u16 = 8;
pub const COL_PHOTO: u16 = 9;

/// グループ行で結合する列
pub const GROUP_MERGE_COLUMNS: &[u16] = &[
    COL_REPORT_NUMBER,
    COL_ACT_PARAGRAPH,
    COL_EQUIPMENT_TYPE,
    COL_PIPELINE_NUMBER,
    COL_DIAMETER_MM,
    COL_RESERVED,
    COL_DIAMETER_INCHES,
];

/// 集計行で結合する説明欄（A〜E列）
pub const SUMMARY_MERGE_LAST_COL: u16 = COL_CONTRACTOR;

/// データ開始行（1行目はテンプレートの見出し）
pub const START_ROW: u32 = 1;

// ============================================
// 写真配置
// ============================================

/// 写真間の横ギャップ（px）
pub const X_GAP: f64 = 5.0;
/// 写真間の縦ギャップ（px）
pub const Y_GAP: f64 = 5.0;

/// Excel列幅1単位あたりのpx
pub const PX_PER_WIDTH_UNIT: f64 = 7.0;
/// 行高さ(pt) → 表示px の換算係数
pub const ROW_HEIGHT_TO_PX: f64 = 1.3;

// ============================================
// 行高さ・色
// ============================================

/// 1行分の標準行高さ（pt）
pub const DEFAULT_LINE_HEIGHT: f64 = 14.4;

/// 設備種別セルの塗りつぶし
pub const EQUIPMENT_FILL: u32 = 0xD6DCE4;

/// 写真列より左の列幅の既定値（Excel幅単位）
pub const DEFAULT_COLUMN_WIDTHS: &[f64] = &[14.0, 8.0, 18.0, 18.0, 20.0, 16.0, 10.0, 10.0, 10.0];

/// 溶接報告書のレイアウト設定
#[derive(Debug, Clone, PartialEq)]
pub struct ReportLayout {
    /// 写真1段分の行高さ（pt）
    pub max_row_height: f64,
    /// 写真列の幅（Excel幅単位）
    pub max_photo_column_width: f64,
    /// 写真列より左の列幅（Excel幅単位）
    pub column_widths: Vec<f64>,
    /// プロジェクト集計の帯色
    pub band_colors: (u32, u32),
}

impl Default for ReportLayout {
    fn default() -> Self {
        Self {
            max_row_height: 100.0,
            max_photo_column_width: 60.0,
            column_widths: DEFAULT_COLUMN_WIDTHS.to_vec(),
            band_colors: (0xF5F5F5, 0xE8F0FE),
        }
    }
}

impl ReportLayout {
    /// 列幅（Excel幅単位）
    pub fn column_width(&self, col: u16) -> f64 {
        if col == COL_PHOTO {
            return self.max_photo_column_width;
        }
        self.column_widths
            .get(col as usize)
            .copied()
            .unwrap_or(DEFAULT_COLUMN_WIDTHS[col as usize % DEFAULT_COLUMN_WIDTHS.len()])
    }

    /// 列範囲の幅の合計
    pub fn span_width(&self, first_col: u16, last_col: u16) -> f64 {
        (first_col..=last_col).map(|c| self.column_width(c)).sum()
    }

    /// 帯色（節番号の偶奇で交互）
    pub fn band_color(&self, section: usize) -> u32 {
        if section % 2 == 0 {
            self.band_colors.0
        } else {
            self.band_colors.1
        }
    }
}

/// 折り返しを考慮したテキストの行高さ
///
/// `ceil(文字数 / 列幅) * 標準行高さ`。空文字は0。
pub fn wrapped_text_height(text: &str, width: f64) -> f64 {
    let len = text.chars().count();
    if len == 0 || width <= 0.0 {
        return 0.0;
    }
    (len as f64 / width).ceil() * DEFAULT_LINE_HEIGHT
}

/// `#RRGGBB` 形式の色をパース
pub fn parse_hex_color(value: &str) -> Option<u32> {
    let hex = value.trim().trim_start_matches('#');
    if hex.len() != 6 {
        return None;
    }
    u32::from_str_radix(hex, 16).ok()
}
