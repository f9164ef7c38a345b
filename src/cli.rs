use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "welding-report")]
#[command(about = "Redmine溶接記録から写真付きExcel報告書を生成するツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// 設定ファイル（デフォルト: ~/.config/welding-report/config.json）
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

/// メール送信の指定
#[derive(clap::Args, Debug, Clone, Default)]
pub struct SendArgs {
    /// 生成した報告書をメールで送る
    #[arg(long)]
    pub send: bool,

    /// 送信先（省略時はAPIキーの持ち主のアドレス）
    #[arg(long, requires = "send")]
    pub to: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 検査記録1件の報告書を生成
    Issue {
        /// 親チケットID
        #[arg(required = true)]
        issue_id: u32,

        /// プロジェクト識別子
        #[arg(short, long)]
        project: String,

        /// 出力ファイル/ディレクトリ（デフォルト: 設定の output_dir）
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        send: SendArgs,
    },

    /// プロジェクト内の全検査記録をまとめた報告書を生成
    Project {
        /// プロジェクト識別子
        #[arg(required = true)]
        project: String,

        /// 出力ファイル/ディレクトリ
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        send: SendArgs,
    },

    /// 報告書データをJSONで出力（Excelは作らない）
    Fetch {
        /// プロジェクト識別子
        #[arg(short, long)]
        project: String,

        /// 親チケットID（省略時はプロジェクト全体）
        #[arg(short, long)]
        issue: Option<u32>,

        /// 出力JSONファイル
        #[arg(short, long, default_value = "report.json")]
        output: PathBuf,
    },

    /// JSONの報告書データからExcelを生成
    Render {
        /// 入力JSONファイル
        #[arg(required = true)]
        input: PathBuf,

        /// 出力ファイル/ディレクトリ
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// SUPR検査依頼書を生成
    Supr {
        /// プロジェクト識別子
        #[arg(short, long)]
        project: String,

        /// 依頼番号
        #[arg(required = true)]
        application_number: u32,

        /// 出力ファイル/ディレクトリ
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// 設定管理
    Config {
        /// APIキーを設定
        #[arg(long)]
        set_api_key: Option<String>,

        /// 現在の設定を表示
        #[arg(long)]
        show: bool,
    },

    /// 写真キャッシュ管理
    Cache {
        /// キャッシュを削除
        #[arg(long)]
        clear: bool,

        /// 対象のプロジェクト識別子（省略時は全体）
        #[arg(short, long)]
        scope: Option<String>,

        /// キャッシュ情報を表示
        #[arg(long)]
        info: bool,
    },
}
