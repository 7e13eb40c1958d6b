// discoverコマンドハンドラー
//
// ライブテーブルのカラムを序数順に表示します。
// 生のデフォルト式とデコード済みの値を両方出力します。

use crate::adapters::database::DatabaseConnectionService;
use crate::cli::command_context::CommandContext;
use crate::cli::commands::{render_output, CommandOutput};
use crate::cli::OutputFormat;
use crate::core::schema::{IntrospectOptions, LogicalDefault, PropertyDescriptor};
use crate::services::reconciler::SchemaReconciler;
use anyhow::{anyhow, Context, Result};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

/// discoverコマンドの入力パラメータ
#[derive(Debug, Clone)]
pub struct DiscoverCommand {
    /// プロジェクトのルートパス
    pub project_path: PathBuf,
    /// カスタム設定ファイルパス
    pub config_path: Option<PathBuf>,
    /// 対象環境
    pub env: String,
    /// テーブル名
    pub table: String,
    /// スキーマ名（未指定時は設定値）
    pub schema: Option<String>,
    /// 出力フォーマット
    pub format: OutputFormat,
}

/// discoverコマンドの出力
#[derive(Debug, Clone, Serialize)]
pub struct DiscoverOutput {
    /// スキーマ名
    pub schema: String,
    /// テーブル名
    pub table: String,
    /// カラム序数順のプロパティ
    pub properties: Vec<PropertyDescriptor>,
}

impl CommandOutput for DiscoverOutput {
    fn to_text(&self) -> String {
        let mut lines = vec![format!("Table {}.{}", self.schema, self.table)];
        for property in &self.properties {
            let mut line = format!(
                "  {} {}{}",
                property.column_name,
                property.data_type,
                if property.nullable { "" } else { " NOT NULL" }
            );
            if let Some(raw) = &property.column_default {
                line.push_str(&format!(" DEFAULT {}", raw));
            }
            if let Some(default) = &property.default {
                line.push_str(&format!("  [{}]", describe_default(default)));
            }
            lines.push(line);
        }
        lines.join("\n")
    }
}

fn describe_default(default: &LogicalDefault) -> String {
    match default {
        LogicalDefault::Number(n) => format!("number {}", n),
        LogicalDefault::Text(s) => format!("text {:?}", s),
        LogicalDefault::Boolean(b) => format!("boolean {}", b),
        LogicalDefault::Expression(e) => format!("expression {}", e),
    }
}

/// discoverコマンドハンドラー
#[derive(Debug, Clone, Default)]
pub struct DiscoverCommandHandler {}

impl DiscoverCommandHandler {
    /// 新しいDiscoverCommandHandlerを作成
    pub fn new() -> Self {
        Self {}
    }

    /// discoverコマンドを実行
    pub async fn execute(&self, command: &DiscoverCommand) -> Result<String> {
        let context = CommandContext::load_with_config(
            command.project_path.clone(),
            command.config_path.clone(),
        )?;
        let db_config = context.database_config(&command.env)?;
        let executor = DatabaseConnectionService::new()
            .connect(&db_config)
            .await
            .with_context(|| format!("Failed to connect to environment '{}'", command.env))?;

        // モデル定義は不要
        let reconciler =
            SchemaReconciler::new(Arc::new(executor), context.config.reconcile_options());
        let schema = command
            .schema
            .clone()
            .unwrap_or_else(|| context.config.schema.clone());

        let properties = reconciler
            .discover_model_properties(&command.table, &IntrospectOptions::with_schema(&schema))
            .await?;
        if properties.is_empty() {
            return Err(anyhow!(
                "Table '{}.{}' not found or has no columns",
                schema,
                command.table
            ));
        }

        render_output(
            &DiscoverOutput {
                schema,
                table: command.table.clone(),
                properties,
            },
            &command.format,
        )
    }
}
