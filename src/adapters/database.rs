// データベース接続アダプター
//
// SQLxを使用したデータベース接続の管理と、Executor の実装を提供します。
// エンジンは単一接続のリクエスト/レスポンスモデルを前提とするため、接続は1本だけ保持します。
// トランザクションはセッションが接続のロックを保持したまま実行します。

use crate::adapters::connection_string::build_connection_string;
use crate::adapters::executor::{Executor, ExecutorSession, Row};
use crate::core::config::DatabaseConfig;
use crate::core::error::DatabaseError;
use async_trait::async_trait;
use sqlx::any::AnyRow;
use sqlx::{AnyConnection, Column, Connection, Executor as _, Row as _};
use std::time::Duration;
use tokio::sync::{Mutex, MutexGuard};
use tracing::debug;

/// 既定の接続タイムアウト（秒）
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 30;

/// データベース接続サービス
///
/// 接続の確立と疎通確認を行います。
#[derive(Debug, Clone, Default)]
pub struct DatabaseConnectionService {}

impl DatabaseConnectionService {
    /// 新しいDatabaseConnectionServiceを作成
    pub fn new() -> Self {
        Self {}
    }

    /// データベースに接続してExecutorを作成
    ///
    /// # Arguments
    ///
    /// * `config` - データベース設定
    ///
    /// # Returns
    ///
    /// 接続済みのExecutorまたはエラー
    pub async fn connect(&self, config: &DatabaseConfig) -> Result<SqlxExecutor, DatabaseError> {
        sqlx::any::install_default_drivers();

        let connection_string = build_connection_string(config);
        let timeout =
            Duration::from_secs(config.timeout.unwrap_or(DEFAULT_CONNECT_TIMEOUT_SECS));

        debug!(host = %config.host, port = config.port, database = %config.database, "Connecting to database");

        let connection = tokio::time::timeout(timeout, AnyConnection::connect(&connection_string))
            .await
            .map_err(|_| DatabaseError::Connection {
                message: format!("Timed out connecting to database '{}'", config.database),
                cause: format!("no response within {}s", timeout.as_secs()),
            })?
            .map_err(|e| DatabaseError::Connection {
                message: format!("Failed to connect to database '{}'", config.database),
                cause: e.to_string(),
            })?;

        Ok(SqlxExecutor::new(connection))
    }

    /// 接続テストを実行
    pub async fn test_connection(&self, executor: &dyn Executor) -> Result<(), DatabaseError> {
        executor.execute("SELECT 1", &[]).await.map(|_| ())
    }
}

/// SQLxの単一接続によるExecutor実装
pub struct SqlxExecutor {
    connection: Mutex<AnyConnection>,
}

impl SqlxExecutor {
    /// 接続からExecutorを作成
    pub fn new(connection: AnyConnection) -> Self {
        Self {
            connection: Mutex::new(connection),
        }
    }

    /// 接続を閉じる
    pub async fn close(self) -> Result<(), DatabaseError> {
        self.connection
            .into_inner()
            .close()
            .await
            .map_err(|e| DatabaseError::Connection {
                message: "Failed to close database connection".to_string(),
                cause: e.to_string(),
            })
    }
}

impl std::fmt::Debug for SqlxExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqlxExecutor").finish_non_exhaustive()
    }
}

#[async_trait]
impl Executor for SqlxExecutor {
    async fn execute(&self, sql: &str, params: &[String]) -> Result<Vec<Row>, DatabaseError> {
        let mut connection = self.connection.lock().await;
        run_statement(&mut connection, sql, params).await
    }

    async fn session<'a>(&'a self) -> Result<Box<dyn ExecutorSession + 'a>, DatabaseError> {
        let connection = self.connection.lock().await;
        Ok(Box::new(SqlxSession { connection }))
    }
}

/// 接続のロックを保持したセッション
struct SqlxSession<'a> {
    connection: MutexGuard<'a, AnyConnection>,
}

#[async_trait]
impl ExecutorSession for SqlxSession<'_> {
    async fn execute(&mut self, sql: &str, params: &[String]) -> Result<Vec<Row>, DatabaseError> {
        run_statement(&mut self.connection, sql, params).await
    }
}

/// 1本の接続で文を実行し、結果をRowへ変換
async fn run_statement(
    connection: &mut AnyConnection,
    sql: &str,
    params: &[String],
) -> Result<Vec<Row>, DatabaseError> {
    // パラメータなしの文（DDL・トランザクション制御）はシンプルクエリプロトコルで送る
    let result = if params.is_empty() {
        connection.fetch_all(sqlx::raw_sql(sql)).await
    } else {
        let mut query = sqlx::query(sql);
        for param in params {
            query = query.bind(param.clone());
        }
        connection.fetch_all(query).await
    };

    let rows = result.map_err(|e| to_database_error(e, sql))?;
    Ok(rows.iter().map(convert_row).collect())
}

/// sqlxのエラーをDatabaseErrorへ変換
fn to_database_error(error: sqlx::Error, sql: &str) -> DatabaseError {
    match error.as_database_error() {
        Some(db_error) => DatabaseError::Query {
            message: db_error.message().to_string(),
            sql: Some(sql.to_string()),
            code: db_error.code().map(|c| c.to_string()),
        },
        None => DatabaseError::Query {
            message: error.to_string(),
            sql: Some(sql.to_string()),
            code: None,
        },
    }
}

/// AnyRowをテキストデコード済みのRowへ変換
fn convert_row(row: &AnyRow) -> Row {
    let columns = row
        .columns()
        .iter()
        .map(|c| c.name().to_string())
        .collect::<Vec<_>>();
    let values = (0..columns.len()).map(|i| decode_value(row, i)).collect();
    Row::new(columns, values)
}

fn decode_value(row: &AnyRow, index: usize) -> Option<String> {
    if let Ok(value) = row.try_get::<Option<String>, _>(index) {
        return value;
    }
    if let Ok(value) = row.try_get::<Option<i64>, _>(index) {
        return value.map(|v| v.to_string());
    }
    if let Ok(value) = row.try_get::<Option<i32>, _>(index) {
        return value.map(|v| v.to_string());
    }
    if let Ok(value) = row.try_get::<Option<f64>, _>(index) {
        return value.map(|v| v.to_string());
    }
    if let Ok(value) = row.try_get::<Option<bool>, _>(index) {
        return value.map(|v| v.to_string());
    }
    None
}
