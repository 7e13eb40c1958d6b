// ライブスキーマドメインモデル
//
// イントロスペクションで取得したカラム情報と、discover結果のプロパティ記述を表現します。

use crate::core::model::FieldType;
use crate::core::naming::DEFAULT_SCHEMA;
use serde::{Deserialize, Serialize};

/// イントロスペクションオプション
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntrospectOptions {
    /// 対象スキーマ（名前空間）
    pub schema: String,
}

impl IntrospectOptions {
    /// スキーマを指定して作成
    pub fn with_schema(schema: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
        }
    }
}

impl Default for IntrospectOptions {
    fn default() -> Self {
        Self::with_schema(DEFAULT_SCHEMA)
    }
}

/// カラム記述
///
/// ライブDBのカラム状態のスナップショット。イントロスペクションのたびに新しく生成されます。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    /// カラム名
    pub name: String,
    /// 正規化済みのデータ型（例: `character varying(20)`）
    pub data_type: String,
    /// NULL許可フラグ
    pub nullable: bool,
    /// バックエンドが保持するデフォルト式（そのまま）
    pub default_text: Option<String>,
}

impl ColumnDescriptor {
    /// 新しいカラム記述を作成
    pub fn new(name: impl Into<String>, data_type: impl Into<String>, nullable: bool) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            nullable,
            default_text: None,
        }
    }

    /// デフォルト式を設定
    pub fn with_default(mut self, default_text: impl Into<String>) -> Self {
        self.default_text = Some(default_text.into());
        self
    }
}

/// 論理デフォルト値
///
/// コーデックでデコードしたデフォルト値。キャストは取り除かれています。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum LogicalDefault {
    Number(f64),
    Text(String),
    Boolean(bool),
    /// スカラーとして解釈できない式（例: `now()`）
    Expression(String),
}

impl LogicalDefault {
    /// 数値として取得
    pub fn as_number(&self) -> Option<f64> {
        match self {
            LogicalDefault::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// 文字列リテラルとして取得
    pub fn as_text(&self) -> Option<&str> {
        match self {
            LogicalDefault::Text(s) => Some(s),
            _ => None,
        }
    }

    /// スカラー値かどうか
    pub fn is_scalar(&self) -> bool {
        !matches!(self, LogicalDefault::Expression(_))
    }
}

/// プロパティ記述
///
/// プロパティ探索の結果。カラム序数順に並びます。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyDescriptor {
    /// テーブル名
    pub table: String,
    /// スキーマ名
    pub schema: String,
    /// カラム名
    pub column_name: String,
    /// データ型
    pub data_type: String,
    /// 推定される論理型
    pub field_type: Option<FieldType>,
    /// NULL許可フラグ
    pub nullable: bool,
    /// ライブのデフォルト式（そのまま）
    pub column_default: Option<String>,
    /// デコード済みのデフォルト値
    pub default: Option<LogicalDefault>,
}
