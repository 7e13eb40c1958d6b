// エラー型定義
//
// ライブラリ全体で使用されるカスタムエラー型を提供します。
// thiserrorを使用して、ValidationError, DatabaseError, ReconciliationError, ReconcileError を定義します。

use thiserror::Error;

/// モデル定義のバリデーションエラー
///
/// モデル登録時（define）に検出される定義上の不整合を表現します。
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// Empty model or field name
    #[error("Model '{model}': name must not be empty")]
    EmptyName {
        /// モデル名
        model: String,
    },

    /// Identifier not usable as a Postgres identifier
    #[error("Model '{model}': invalid identifier '{name}': {reason}")]
    InvalidIdentifier {
        /// モデル名
        model: String,
        /// 識別子
        name: String,
        /// 不正な理由
        reason: String,
    },

    /// Two fields mapping to the same column
    #[error("Model '{model}': duplicate field or column '{field}'")]
    DuplicateField {
        /// モデル名
        model: String,
        /// 重複したフィールド名（フォールディング後）
        field: String,
    },

    /// NaN / infinity numeric default
    #[error("Model '{model}': field '{field}' has a non-finite numeric default")]
    NonFiniteDefault {
        /// モデル名
        model: String,
        /// フィールド名
        field: String,
    },
}

impl ValidationError {
    /// 重複エラーかどうか
    pub fn is_duplicate_field(&self) -> bool {
        matches!(self, ValidationError::DuplicateField { .. })
    }

    /// 対象モデル名を取得
    pub fn model(&self) -> &str {
        match self {
            ValidationError::EmptyName { model }
            | ValidationError::InvalidIdentifier { model, .. }
            | ValidationError::DuplicateField { model, .. }
            | ValidationError::NonFiniteDefault { model, .. } => model,
        }
    }
}

/// データベースエラー
///
/// Executor経由のデータベース操作時に発生するエラーを表現します。
#[derive(Debug, Clone, Error)]
pub enum DatabaseError {
    /// Connection error
    #[error("Database connection error: {message} (cause: {cause})")]
    Connection {
        /// エラーメッセージ
        message: String,
        /// エラー原因
        cause: String,
    },

    /// Query execution error
    #[error("Query execution error: {message}")]
    Query {
        /// エラーメッセージ
        message: String,
        /// 失敗したSQL
        sql: Option<String>,
        /// SQLSTATEコード（バックエンドが返した場合）
        code: Option<String>,
    },
}

impl DatabaseError {
    /// 接続エラーかどうか
    pub fn is_connection(&self) -> bool {
        matches!(self, DatabaseError::Connection { .. })
    }

    /// クエリエラーかどうか
    pub fn is_query(&self) -> bool {
        matches!(self, DatabaseError::Query { .. })
    }

    /// バックエンドのエラーメッセージ
    pub fn message(&self) -> &str {
        match self {
            DatabaseError::Connection { message, .. } | DatabaseError::Query { message, .. } => {
                message
            }
        }
    }

    /// SQLSTATEコード
    pub fn code(&self) -> Option<&str> {
        match self {
            DatabaseError::Query { code, .. } => code.as_deref(),
            DatabaseError::Connection { .. } => None,
        }
    }
}

/// スキーマ調整エラー
///
/// DDL文の適用に失敗した際の詳細。どのモデル・カラム・式・文で失敗したかを保持します。
#[derive(Debug, Clone, PartialEq, Error)]
#[error(
    "Model '{model}'{}: {message} (statement: {statement})",
    format_column_opt(.column, .expression)
)]
pub struct ReconciliationError {
    /// モデル名
    pub model: String,
    /// 対象カラム（テーブル単位の変更ではNone）
    pub column: Option<String>,
    /// 適用しようとしたデフォルト式
    pub expression: Option<String>,
    /// 失敗したDDL文
    pub statement: String,
    /// バックエンドのエラーメッセージ
    pub message: String,
    /// SQLSTATEコード
    pub code: Option<String>,
}

impl ReconciliationError {
    /// カラム名を取得
    pub fn column(&self) -> Option<&str> {
        self.column.as_deref()
    }

    /// デフォルト式を取得
    pub fn expression(&self) -> Option<&str> {
        self.expression.as_deref()
    }
}

fn format_column_opt(column: &Option<String>, expression: &Option<String>) -> String {
    match (column, expression) {
        (Some(column), Some(expression)) => {
            format!(" (column: {}, default: {})", column, expression)
        }
        (Some(column), None) => format!(" (column: {})", column),
        _ => String::new(),
    }
}

/// 調整処理全体のエラー
///
/// automigrate / autoupdate / discover の呼び出し元に同期的に返されます。
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// Default expression rejected by the backend
    #[error("Invalid default expression: {0}")]
    InvalidDefaultExpression(ReconciliationError),

    /// Failure while reading live schema metadata
    #[error("Failed to introspect table '{table}': {source}")]
    IntrospectionFailure {
        /// テーブル名
        table: String,
        /// 原因
        #[source]
        source: DatabaseError,
    },

    /// DDL statement rejected
    #[error("Failed to apply schema change: {0}")]
    ApplyFailure(ReconciliationError),

    /// Model not registered
    #[error("Model '{name}' is not defined")]
    UnknownModel {
        /// モデル名
        name: String,
    },

    /// Model definition rejected at registration
    #[error(transparent)]
    InvalidModel(#[from] ValidationError),

    /// Transaction control failure
    #[error(transparent)]
    Database(#[from] DatabaseError),
}

impl ReconcileError {
    /// 不正なデフォルト式エラーかどうか
    pub fn is_invalid_default(&self) -> bool {
        matches!(self, ReconcileError::InvalidDefaultExpression(_))
    }

    /// イントロスペクションエラーかどうか
    pub fn is_introspection_failure(&self) -> bool {
        matches!(self, ReconcileError::IntrospectionFailure { .. })
    }

    /// 適用エラーかどうか
    pub fn is_apply_failure(&self) -> bool {
        matches!(self, ReconcileError::ApplyFailure(_))
    }

    /// DDL適用失敗の詳細を取得
    pub fn reconciliation_error(&self) -> Option<&ReconciliationError> {
        match self {
            ReconcileError::InvalidDefaultExpression(e) | ReconcileError::ApplyFailure(e) => {
                Some(e)
            }
            _ => None,
        }
    }
}
