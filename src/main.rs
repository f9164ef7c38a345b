use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use welding_report::{aggregator, cli, config, export, mailer, photo, redmine, template};
use cli::{Cli, Commands, SendArgs};
use config::Config;
use export::{ReportModel, WeldingRenderer};
use photo::{PhotoCache, PhotoFetcher};
use redmine::{RedmineClient, RedmineContext};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config_path = match &cli.config {
        Some(path) => path.clone(),
        None => Config::config_path()?,
    };
    let config = Config::load_from(&config_path)
        .with_context(|| format!("設定ファイルを読み込めません: {}", config_path.display()))?;

    match cli.command {
        Commands::Issue {
            issue_id,
            project,
            output,
            send,
        } => {
            println!("🔧 welding-report - 検査記録 #{}\n", issue_id);
            let client = welding_client(&config)?;

            println!("[1/3] Redmineからデータを取得中...");
            let data = aggregator::fetch_issue_report(&client, &project, issue_id).await?;
            println!("✔ {} ({}グループ)\n", data.report_number, data.groups.len());

            println!("[2/3] 報告書を作成中...");
            let model = ReportModel::Issue(data);
            let bytes = render_welding(&config, &client, &model).await?;
            println!("✔ 作成完了\n");

            println!("[3/3] 保存中...");
            deliver(&config, &client, model.report_number(), &bytes, output.as_deref(), &send).await?;
            println!("\n✅ 完了");
        }

        Commands::Project { project, output, send } => {
            println!("🔧 welding-report - プロジェクト {}\n", project);
            let client = welding_client(&config)?;

            println!("[1/3] Redmineからデータを取得中...");
            let data = aggregator::fetch_project_report(&client, &project).await?;
            println!("✔ {} ({}件の検査記録)\n", data.name, data.acts.len());

            println!("[2/3] 報告書を作成中...");
            let model = ReportModel::Project(data);
            let bytes = render_welding(&config, &client, &model).await?;
            println!("✔ 作成完了\n");

            println!("[3/3] 保存中...");
            deliver(&config, &client, model.report_number(), &bytes, output.as_deref(), &send).await?;
            println!("\n✅ 完了");
        }

        Commands::Fetch { project, issue, output } => {
            println!("📥 welding-report - データ取得\n");
            let client = welding_client(&config)?;

            let model = match issue {
                Some(issue_id) => {
                    ReportModel::Issue(aggregator::fetch_issue_report(&client, &project, issue_id).await?)
                }
                None => ReportModel::Project(aggregator::fetch_project_report(&client, &project).await?),
            };
            std::fs::write(&output, model.to_json()?)?;
            println!("✔ 結果を保存: {}", output.display());
        }

        Commands::Render { input, output } => {
            println!("📄 welding-report - Excel生成\n");
            let content = std::fs::read_to_string(&input)
                .with_context(|| format!("入力ファイルを読み込めません: {}", input.display()))?;
            let model = ReportModel::from_json(&content)?;
            let client = welding_client(&config)?;

            println!("[1/2] 報告書を作成中...");
            let bytes = render_welding(&config, &client, &model).await?;
            println!("✔ 作成完了\n");

            println!("[2/2] 保存中...");
            deliver(&config, &client, model.report_number(), &bytes, output.as_deref(), &SendArgs::default()).await?;
            println!("\n✅ 完了");
        }

        Commands::Supr {
            project,
            application_number,
            output,
        } => {
            println!("📋 welding-report - SUPR依頼書 №{}\n", application_number);
            let api_key = config.get_api_key()?;
            let client = RedmineClient::new(
                RedmineContext::new(config.redmine.supr_url.clone(), api_key),
                config.redmine.accept_invalid_certs,
            )?;

            println!("[1/3] Redmineからデータを取得中...");
            let data = aggregator::fetch_supr_report(&client, &project, application_number).await?;
            println!("✔ {}件 ({})\n", data.items.len(), data.factory);

            println!("[2/3] 依頼書を作成中...");
            let bytes = export::render_supr(&config.report.supr_template_path(), &data, &config.supr_signatures)?;
            println!("✔ 作成完了\n");

            println!("[3/3] 保存中...");
            let path = save_report(&config, &application_number.to_string(), &bytes, output.as_deref())?;
            println!("✔ 保存: {}", path.display());
            println!("\n✅ 完了");
        }

        Commands::Config { set_api_key, show } => {
            let mut config = config;

            if let Some(key) = set_api_key {
                config.set_api_key(key, &config_path)?;
                println!("✔ APIキーを設定しました");
            }

            if show {
                println!("設定: {}", config_path.display());
                println!("  溶接Redmine: {}", config.redmine.welding_url);
                println!("  SUPR Redmine: {}", config.redmine.supr_url);
                println!(
                    "  APIキー: {}",
                    if config.get_api_key().is_ok() { "設定済み" } else { "未設定" }
                );
                println!("  溶接テンプレート: {}", config.report.welding_template_path().display());
                println!("  SUPRテンプレート: {}", config.report.supr_template_path().display());
                println!("  写真キャッシュ: {}", config.report.photo_cache_path.display());
                println!(
                    "  写真上限: {}x{}px (JPEG品質 {})",
                    config.report.max_photo_width_px,
                    config.report.max_photo_height_px,
                    config.report.photo_jpeg_quality
                );
                println!(
                    "  メール: {}",
                    if config.email.is_some() { "設定済み" } else { "未設定" }
                );
            }
        }

        Commands::Cache { clear, scope, info } => {
            let cache = PhotoCache::new(&config.report.photo_cache_path);
            let target = cache.target_dir(scope.as_deref())?;

            if info || !clear {
                let stats = cache.info(scope.as_deref())?;
                println!("キャッシュ情報:");
                println!("  パス: {}", target.display());
                println!("  件数: {}", stats.files);
                println!("  サイズ: {} bytes", stats.bytes);
            }

            if clear {
                let removed = cache.clear(scope.as_deref())?;
                println!("✔ {}件のキャッシュを削除しました: {}", removed, target.display());
            }
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();
}

fn welding_client(config: &Config) -> Result<RedmineClient> {
    let api_key = config.get_api_key()?;
    let client = RedmineClient::new(
        RedmineContext::new(config.redmine.welding_url.clone(), api_key),
        config.redmine.accept_invalid_certs,
    )?;
    Ok(client)
}

async fn render_welding(config: &Config, client: &RedmineClient, model: &ReportModel) -> Result<Vec<u8>> {
    let layout = config.report.layout()?;
    let template = template::load_template(
        &config.report.welding_template_path(),
        Some(&config.report.worksheet_name),
    )?;
    let cache = PhotoCache::new(&config.report.photo_cache_path);
    let fetcher = PhotoFetcher::new(client, &cache, config.report.fetch_options());
    let renderer = WeldingRenderer::new(layout, template, fetcher);

    let bytes = match model {
        ReportModel::Issue(data) => renderer.render_issue(data).await?,
        ReportModel::Project(data) => renderer.render_project(data).await?,
    };
    Ok(bytes)
}

/// ファイルに書き出し、保存先へのコピーとメール送信を行う
async fn deliver(
    config: &Config,
    client: &RedmineClient,
    report_number: &str,
    bytes: &[u8],
    output: Option<&Path>,
    send: &SendArgs,
) -> Result<()> {
    let path = save_report(config, report_number, bytes, output)?;
    println!("✔ 保存: {}", path.display());

    if send.send {
        let settings = config
            .email
            .as_ref()
            .context("メール設定（email）がありません")?;
        let recipient = mailer::resolve_recipient(client, send.to.as_deref()).await?;
        let file_name = export::report_file_name(report_number);
        mailer::Mailer::new(settings)?
            .send_report(
                &recipient,
                mailer::REPORT_SUBJECT,
                mailer::REPORT_BODY,
                bytes.to_vec(),
                &file_name,
            )
            .await?;
        println!("✔ メール送信: {}", recipient);
    }
    Ok(())
}

fn save_report(config: &Config, report_number: &str, bytes: &[u8], output: Option<&Path>) -> Result<PathBuf> {
    let file_name = export::report_file_name(report_number);
    let output = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| config.report.output_dir.clone());
    let path = export::output_path_for(&output, &file_name);
    export::write_report(&path, bytes)?;

    if let Some(storage) = &config.report.report_storage_path {
        export::store_report(storage, &file_name, bytes)?;
    }
    Ok(path)
}
