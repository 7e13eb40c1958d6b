// コマンドハンドラー層
// 各CLIコマンドの実装

pub mod automigrate;
pub mod autoupdate;
pub mod check;
pub mod discover;

use crate::cli::OutputFormat;
use crate::services::migration_applier::ApplyReport;
use anyhow::{Context, Result};
use colored::Colorize;
use serde::Serialize;

/// 出力フォーマットに応じた表示を持つコマンド結果
pub trait CommandOutput: Serialize {
    /// テキスト形式の表示
    fn to_text(&self) -> String;
}

/// 出力フォーマットに応じて結果を文字列化
pub fn render_output<T: CommandOutput>(output: &T, format: &OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(output.to_text()),
        OutputFormat::Json => {
            serde_json::to_string_pretty(output).with_context(|| "Failed to serialize output")
        }
    }
}

/// 適用結果の1行サマリー
pub(crate) fn format_report_line(report: &ApplyReport) -> String {
    if report.is_noop() {
        format!(
            "{} {} ({}.{}): up to date",
            "=".dimmed(),
            report.model,
            report.schema,
            report.table
        )
    } else {
        format!(
            "{} {} ({}.{}): {} statement(s) in {}ms",
            "✓".green(),
            report.model.bold(),
            report.schema,
            report.table,
            report.statements.len(),
            report.duration_ms
        )
    }
}
