// autoupdateコマンドハンドラー
//
// ライブスキーマとモデル定義の差分だけを適用します。
// --dry-run 指定時は計画されたDDLを表示するだけで実行しません。

use crate::cli::command_context::{resolve_targets, CommandContext};
use crate::cli::commands::{format_report_line, render_output, CommandOutput};
use crate::cli::OutputFormat;
use crate::services::migration_applier::ApplyReport;
use anyhow::{Context, Result};
use colored::Colorize;
use serde::Serialize;
use std::path::PathBuf;
use tracing::debug;

/// autoupdateコマンドの入力パラメータ
#[derive(Debug, Clone)]
pub struct AutoupdateCommand {
    /// プロジェクトのルートパス
    pub project_path: PathBuf,
    /// カスタム設定ファイルパス
    pub config_path: Option<PathBuf>,
    /// 対象環境
    pub env: String,
    /// 対象モデル（空ならすべて）
    pub models: Vec<String>,
    /// Dry run - 実行せずにSQLを表示
    pub dry_run: bool,
    /// 出力フォーマット
    pub format: OutputFormat,
}

/// 計画された変更
#[derive(Debug, Clone, Serialize)]
pub struct PlannedChanges {
    /// モデル名
    pub model: String,
    /// スキーマ名
    pub schema: String,
    /// テーブル名
    pub table: String,
    /// 実行予定のDDL文
    pub statements: Vec<String>,
    /// カラム削除などの破壊的変更を含むか
    pub destructive: bool,
}

/// autoupdateコマンドの出力
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum AutoupdateOutput {
    /// 適用結果
    Applied { reports: Vec<ApplyReport> },
    /// dry-runの計画
    DryRun { plans: Vec<PlannedChanges> },
}

impl CommandOutput for AutoupdateOutput {
    fn to_text(&self) -> String {
        match self {
            AutoupdateOutput::Applied { reports } => reports
                .iter()
                .map(format_report_line)
                .collect::<Vec<_>>()
                .join("\n"),
            AutoupdateOutput::DryRun { plans } => {
                let mut lines = vec![format!("{}", "=== DRY RUN ===".bold())];
                for plan in plans {
                    if plan.statements.is_empty() {
                        lines.push(format!(
                            "-- {} ({}.{}): up to date",
                            plan.model, plan.schema, plan.table
                        ));
                        continue;
                    }
                    lines.push(format!(
                        "-- {} ({}.{})",
                        plan.model.bold(),
                        plan.schema,
                        plan.table
                    ));
                    if plan.destructive {
                        lines.push(format!(
                            "{}",
                            "-- WARNING: plan contains destructive changes".red()
                        ));
                    }
                    for statement in &plan.statements {
                        lines.push(format!("{};", statement));
                    }
                }
                lines.join("\n")
            }
        }
    }
}

/// autoupdateコマンドハンドラー
#[derive(Debug, Clone, Default)]
pub struct AutoupdateCommandHandler {}

impl AutoupdateCommandHandler {
    /// 新しいAutoupdateCommandHandlerを作成
    pub fn new() -> Self {
        Self {}
    }

    /// autoupdateコマンドを実行
    pub async fn execute(&self, command: &AutoupdateCommand) -> Result<String> {
        let context = CommandContext::load_with_config(
            command.project_path.clone(),
            command.config_path.clone(),
        )?;
        let reconciler = context.build_reconciler(&command.env).await?;

        let targets = resolve_targets(&reconciler, &command.models);
        debug!(models = ?targets, dry_run = command.dry_run, "Executing autoupdate command");

        let output = if command.dry_run {
            let mut plans = Vec::new();
            for name in &targets {
                let change_set = reconciler
                    .plan_autoupdate(name)
                    .await
                    .with_context(|| format!("Failed to plan changes for model '{}'", name))?;
                plans.push(PlannedChanges {
                    model: name.clone(),
                    schema: change_set.schema.clone(),
                    table: change_set.table.clone(),
                    statements: reconciler.render_statements(&change_set),
                    destructive: change_set.has_destructive_changes(),
                });
            }
            AutoupdateOutput::DryRun { plans }
        } else {
            let mut reports = Vec::new();
            for name in &targets {
                let report = reconciler
                    .autoupdate(name)
                    .await
                    .with_context(|| format!("autoupdate failed for model '{}'", name))?;
                reports.push(report);
            }
            AutoupdateOutput::Applied { reports }
        };

        render_output(&output, &command.format)
    }
}
