// checkコマンドハンドラー
//
// ライブテーブルがモデル定義と一致しているかを確認します。DDLは実行しません。
// 一致しないモデルがある場合、呼び出し元は非ゼロで終了します。

use crate::cli::command_context::{resolve_targets, CommandContext};
use crate::cli::commands::{render_output, CommandOutput};
use crate::cli::OutputFormat;
use anyhow::{Context, Result};
use colored::Colorize;
use serde::Serialize;
use std::path::PathBuf;
use tracing::debug;

/// checkコマンドの入力パラメータ
#[derive(Debug, Clone)]
pub struct CheckCommand {
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

/// モデルごとの状態
#[derive(Debug, Clone, Serialize)]
pub struct ModelStatus {
    /// モデル名
    pub model: String,
    /// テーブル名
    pub table: String,
    /// 未適用の変更数
    pub pending_changes: usize,
}

impl ModelStatus {
    /// ライブスキーマが一致しているか
    pub fn is_actual(&self) -> bool {
        self.pending_changes == 0
    }
}

/// checkコマンドの出力
#[derive(Debug, Clone, Serialize)]
pub struct CheckOutput {
    /// モデルごとの状態
    pub models: Vec<ModelStatus>,
    /// すべて一致しているか
    pub all_actual: bool,
}

impl CommandOutput for CheckOutput {
    fn to_text(&self) -> String {
        let mut lines: Vec<String> = self
            .models
            .iter()
            .map(|status| {
                if status.is_actual() {
                    format!("{} {}: up to date", "✓".green(), status.model)
                } else {
                    format!(
                        "{} {}: {} pending change(s) on {}",
                        "✗".red(),
                        status.model.bold(),
                        status.pending_changes,
                        status.table
                    )
                }
            })
            .collect();

        if !self.all_actual {
            lines.push("Run `stratum-reconcile autoupdate` to apply pending changes.".to_string());
        }
        lines.join("\n")
    }
}

/// checkコマンドの結果（出力と判定）
#[derive(Debug, Clone)]
pub struct CheckResult {
    /// 表示用の出力
    pub output: String,
    /// すべて一致しているか
    pub all_actual: bool,
}

/// checkコマンドハンドラー
#[derive(Debug, Default)]
pub struct CheckCommandHandler {}

impl CheckCommandHandler {
    /// 新しいCheckCommandHandlerを作成
    pub fn new() -> Self {
        Self {}
    }

    /// checkコマンドを実行
    pub async fn execute(&self, command: &CheckCommand) -> Result<CheckResult> {
        let context = CommandContext::load_with_config(
            command.project_path.clone(),
            command.config_path.clone(),
        )?;
        let reconciler = context.build_reconciler(&command.env).await?;

        let targets = resolve_targets(&reconciler, &command.models);
        debug!(models = ?targets, "Executing check command");

        let mut models = Vec::new();
        for name in &targets {
            let change_set = reconciler
                .plan_autoupdate(name)
                .await
                .with_context(|| format!("Failed to check model '{}'", name))?;
            models.push(ModelStatus {
                model: name.clone(),
                table: change_set.table.clone(),
                pending_changes: change_set.len(),
            });
        }

        let output = CheckOutput {
            all_actual: models.iter().all(ModelStatus::is_actual),
            models,
        };

        Ok(CheckResult {
            output: render_output(&output, &command.format)?,
            all_actual: output.all_actual,
        })
    }
}
