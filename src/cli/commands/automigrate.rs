// automigrateコマンドハンドラー
//
// モデル定義からテーブルを作り直します。
// - 設定とモデル定義の読み込み
// - データベース接続とモデル登録
// - 対象モデルごとに DROP → CREATE → デフォルト設定

use crate::cli::command_context::{resolve_targets, CommandContext};
use crate::cli::commands::{format_report_line, render_output, CommandOutput};
use crate::cli::OutputFormat;
use crate::services::migration_applier::ApplyReport;
use anyhow::{Context, Result};
use serde::Serialize;
use std::path::PathBuf;
use tracing::debug;

/// automigrateコマンドの入力パラメータ
#[derive(Debug, Clone)]
pub struct AutomigrateCommand {
    /// プロジェクトのルートパス
    pub project_path: PathBuf,
    /// カスタム設定ファイルパス
    pub config_path: Option<PathBuf>,
    /// 対象環境
    pub env: String,
    /// 対象モデル（空ならすべて）
    pub models: Vec<String>,
    /// 出力フォーマット
    pub format: OutputFormat,
}

/// automigrateコマンドの出力
#[derive(Debug, Clone, Serialize)]
pub struct AutomigrateOutput {
    /// モデルごとの適用結果
    pub reports: Vec<ApplyReport>,
}

impl CommandOutput for AutomigrateOutput {
    fn to_text(&self) -> String {
        self.reports
            .iter()
            .map(format_report_line)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// automigrateコマンドハンドラー
#[derive(Debug, Clone, Default)]
pub struct AutomigrateCommandHandler {}

impl AutomigrateCommandHandler {
    /// 新しいAutomigrateCommandHandlerを作成
    pub fn new() -> Self {
        Self {}
    }

    /// automigrateコマンドを実行
    pub async fn execute(&self, command: &AutomigrateCommand) -> Result<String> {
        let context = CommandContext::load_with_config(
            command.project_path.clone(),
            command.config_path.clone(),
        )?;
        let reconciler = context.build_reconciler(&command.env).await?;

        let targets = resolve_targets(&reconciler, &command.models);
        debug!(models = ?targets, "Executing automigrate command");

        let mut reports = Vec::new();
        for name in &targets {
            let report = reconciler
                .automigrate(name)
                .await
                .with_context(|| format!("automigrate failed for model '{}'", name))?;
            reports.push(report);
        }

        render_output(&AutomigrateOutput { reports }, &command.format)
    }
}
