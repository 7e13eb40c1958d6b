// マイグレーション適用サービス
//
// 変更セットをDDL文に変換し、1つのセッション内で順番に実行します。
// 失敗した時点で停止し、失敗した文・カラム・デフォルト式を含むエラーを返します。

use crate::adapters::executor::{Executor, ExecutorSession};
use crate::adapters::sql_generator::SqlGenerator;
use crate::core::config::ApplyMode;
use crate::core::error::{DatabaseError, ReconcileError, ReconciliationError};
use crate::core::schema_diff::{ChangeSet, TableChange};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

/// 適用結果
#[derive(Debug, Clone, Serialize)]
pub struct ApplyReport {
    /// モデル名
    pub model: String,
    /// スキーマ名
    pub schema: String,
    /// テーブル名
    pub table: String,
    /// 実行したDDL文（実行順）
    pub statements: Vec<String>,
    /// 適用開始時刻
    pub applied_at: DateTime<Utc>,
    /// 所要時間（ミリ秒）
    pub duration_ms: i64,
}

impl ApplyReport {
    /// DDLを実行しなかったかどうか
    pub fn is_noop(&self) -> bool {
        self.statements.is_empty()
    }
}

/// マイグレーション適用サービス
pub struct MigrationApplier<'a> {
    executor: &'a dyn Executor,
    generator: &'a dyn SqlGenerator,
    mode: ApplyMode,
}

impl<'a> MigrationApplier<'a> {
    /// 新しいMigrationApplierを作成
    pub fn new(
        executor: &'a dyn Executor,
        generator: &'a dyn SqlGenerator,
        mode: ApplyMode,
    ) -> Self {
        Self {
            executor,
            generator,
            mode,
        }
    }

    /// BEGIN文のSQL文字列
    pub fn begin_transaction_sql(&self) -> &'static str {
        "BEGIN"
    }

    /// COMMIT文のSQL文字列
    pub fn commit_transaction_sql(&self) -> &'static str {
        "COMMIT"
    }

    /// ROLLBACK文のSQL文字列
    pub fn rollback_transaction_sql(&self) -> &'static str {
        "ROLLBACK"
    }

    /// 変更セットを適用
    ///
    /// # Arguments
    ///
    /// * `model` - モデル名（エラー報告用）
    /// * `change_set` - 適用する変更セット
    ///
    /// # Returns
    ///
    /// 適用結果、または失敗した文の情報を含むエラー
    pub async fn apply(
        &self,
        model: &str,
        change_set: &ChangeSet,
    ) -> Result<ApplyReport, ReconcileError> {
        let start_time = Utc::now();
        let mut report = ApplyReport {
            model: model.to_string(),
            schema: change_set.schema.clone(),
            table: change_set.table.clone(),
            statements: Vec::new(),
            applied_at: start_time,
            duration_ms: 0,
        };

        if change_set.is_empty() {
            debug!(model = %model, table = %change_set.table, "Schema is up to date");
            return Ok(report);
        }

        // BEGINからCOMMITまで接続を専有する
        let mut session = self.executor.session().await?;
        let transactional = self.mode == ApplyMode::Transactional;
        if transactional {
            session.execute(self.begin_transaction_sql(), &[]).await?;
        }

        for change in change_set.iter() {
            let statement =
                self.generator
                    .generate_change(&change_set.schema, &change_set.table, change);
            debug!(model = %model, statement = %statement, "Executing DDL");

            if let Err(error) = session.execute(&statement, &[]).await {
                warn!(
                    model = %model,
                    table = %change_set.table,
                    column = change.column_name().unwrap_or_default(),
                    statement = %statement,
                    error = %error,
                    "Schema change rejected"
                );
                if transactional {
                    self.rollback(session.as_mut()).await;
                }
                return Err(classify_failure(model, change, statement, error));
            }

            report.statements.push(statement);
        }

        if transactional {
            session.execute(self.commit_transaction_sql(), &[]).await?;
        }
        drop(session);

        report.duration_ms = Utc::now()
            .signed_duration_since(start_time)
            .num_milliseconds();

        info!(
            model = %model,
            table = %change_set.table,
            statements = report.statements.len(),
            mode = %self.mode,
            "Applied schema changes"
        );

        Ok(report)
    }

    async fn rollback(&self, session: &mut dyn ExecutorSession) {
        if let Err(error) = session.execute(self.rollback_transaction_sql(), &[]).await {
            warn!(error = %error, "Rollback failed");
        }
    }
}

/// 失敗した変更からエラー種別を決定
///
/// デフォルト式を含む変更の失敗は `InvalidDefaultExpression`、それ以外は `ApplyFailure`。
fn classify_failure(
    model: &str,
    change: &TableChange,
    statement: String,
    error: DatabaseError,
) -> ReconcileError {
    let expression = change.default_expression().map(str::to_string);
    let detail = ReconciliationError {
        model: model.to_string(),
        column: change.column_name().map(str::to_string),
        expression: expression.clone(),
        statement,
        message: error.message().to_string(),
        code: error.code().map(str::to_string),
    };

    match expression {
        Some(_) => ReconcileError::InvalidDefaultExpression(detail),
        None => ReconcileError::ApplyFailure(detail),
    }
}
