// モデル定義ドメインモデル
//
// 呼び出し元が宣言する論理モデル（フィールド、論理型、デフォルト値）を表現する型システム。
// デフォルト値は Literal / Expression / None のタグ付きバリアントで保持します。

use crate::core::error::ValidationError;
use crate::core::naming::{fold_identifier, is_valid_identifier, INJECTED_ID_COLUMN};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// 論理型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    #[serde(alias = "String")]
    String,
    #[serde(alias = "Number")]
    Number,
    #[serde(alias = "Boolean")]
    Boolean,
    #[serde(alias = "Date")]
    Date,
    #[serde(alias = "JSON", alias = "Object")]
    Json,
    /// 型指定なし（テキストとして保存）
    #[serde(alias = "Any")]
    Any,
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::String => write!(f, "String"),
            FieldType::Number => write!(f, "Number"),
            FieldType::Boolean => write!(f, "Boolean"),
            FieldType::Date => write!(f, "Date"),
            FieldType::Json => write!(f, "JSON"),
            FieldType::Any => write!(f, "Any"),
        }
    }
}

/// スカラーリテラル
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Boolean(bool),
    Number(f64),
    Text(String),
}

impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Scalar::Number(value)
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Scalar::Number(value as f64)
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Scalar::Text(value.to_string())
    }
}

impl From<bool> for Scalar {
    fn from(value: bool) -> Self {
        Scalar::Boolean(value)
    }
}

/// デフォルト値
///
/// 型付きリテラルと生のバックエンド式を区別して保持します。
#[derive(Debug, Clone, PartialEq, Default)]
pub enum DefaultValue {
    /// デフォルトなし（既存のデフォルトは削除される）
    #[default]
    None,
    /// 型付きリテラル（コーデックが方言に応じてエンコードする）
    Literal(Scalar),
    /// 生のバックエンド式（例: `now()`）。解釈・エスケープせずにそのまま渡す
    Expression(String),
}

impl DefaultValue {
    /// デフォルトが宣言されているか
    pub fn is_present(&self) -> bool {
        !matches!(self, DefaultValue::None)
    }
}

/// フィールド定義
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    /// 論理フィールド名
    pub name: String,
    /// 論理型
    pub field_type: FieldType,
    /// デフォルト値
    pub default: DefaultValue,
    /// カラム名の上書き
    pub column: Option<String>,
    /// バックエンド型の上書き（例: `varchar(20)`）
    pub data_type: Option<String>,
    /// NOT NULL制約
    pub required: bool,
    /// 主キーフラグ
    pub id: bool,
    /// 自動採番フラグ（SERIALとして作成し、デフォルト比較の対象外とする）
    pub generated: bool,
}

impl FieldSpec {
    /// 新しいフィールドを作成
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            default: DefaultValue::None,
            column: None,
            data_type: None,
            required: false,
            id: false,
            generated: false,
        }
    }

    /// リテラルのデフォルトを設定
    pub fn with_default(mut self, value: impl Into<Scalar>) -> Self {
        self.default = DefaultValue::Literal(value.into());
        self
    }

    /// 生の式デフォルトを設定
    pub fn with_raw_default(mut self, expression: impl Into<String>) -> Self {
        self.default = DefaultValue::Expression(expression.into());
        self
    }

    /// バックエンド型を上書き
    pub fn with_data_type(mut self, data_type: impl Into<String>) -> Self {
        self.data_type = Some(data_type.into());
        self
    }

    /// カラム名を上書き
    pub fn with_column(mut self, column: impl Into<String>) -> Self {
        self.column = Some(column.into());
        self
    }

    /// NOT NULLにする
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// バックエンドのカラム名
    ///
    /// 上書きがあればそのまま、なければフォールディングしたフィールド名。
    pub fn column_name(&self) -> String {
        match &self.column {
            Some(column) => column.clone(),
            None => fold_identifier(&self.name),
        }
    }

    /// 自動採番IDかどうか
    pub fn is_generated_id(&self) -> bool {
        self.id && self.generated
    }

    /// 自動注入されるIDフィールド
    pub fn injected_id() -> Self {
        Self {
            name: INJECTED_ID_COLUMN.to_string(),
            field_type: FieldType::Number,
            default: DefaultValue::None,
            column: None,
            data_type: None,
            required: true,
            id: true,
            generated: true,
        }
    }
}

/// モデル定義
#[derive(Debug, Clone, PartialEq)]
pub struct ModelDefinition {
    /// モデル名
    pub name: String,
    /// 宣言順のフィールド
    pub fields: Vec<FieldSpec>,
    /// テーブル名の上書き
    pub table: Option<String>,
    /// スキーマ名の上書き
    pub schema: Option<String>,
    /// ID未宣言時に `id SERIAL PRIMARY KEY` を末尾に追加するか
    pub id_injection: bool,
}

impl ModelDefinition {
    /// 新しいモデルを作成
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
            table: None,
            schema: None,
            id_injection: true,
        }
    }

    /// フィールドを追加
    pub fn field(mut self, field: FieldSpec) -> Self {
        self.fields.push(field);
        self
    }

    /// スキーマを指定
    pub fn in_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    /// 宣言されたフィールド
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// バックエンドのテーブル名
    pub fn table_name(&self) -> String {
        match &self.table {
            Some(table) => table.clone(),
            None => fold_identifier(&self.name),
        }
    }

    /// スキーマ名（未指定時は既定値）
    pub fn schema_name<'a>(&'a self, default_schema: &'a str) -> &'a str {
        self.schema.as_deref().unwrap_or(default_schema)
    }

    /// 望ましいカラム構成（注入IDを含む、カラム順）
    ///
    /// 注入IDは宣言済みフィールドの後ろに配置し、宣言フィールドの序数を保ちます。
    pub fn effective_fields(&self) -> Vec<FieldSpec> {
        let mut fields = self.fields.clone();
        if self.id_injection && !fields.iter().any(|f| f.id) {
            fields.push(FieldSpec::injected_id());
        }
        fields
    }

    /// 主キーカラム名
    pub fn primary_key_columns(&self) -> Vec<String> {
        self.effective_fields()
            .iter()
            .filter(|f| f.id)
            .map(|f| f.column_name())
            .collect()
    }

    /// 定義の妥当性を検証
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyName {
                model: self.name.clone(),
            });
        }

        let table = self.table_name();
        if !is_valid_identifier(&table) {
            return Err(ValidationError::InvalidIdentifier {
                model: self.name.clone(),
                name: table,
                reason: "table name must be 1-63 bytes without NUL".to_string(),
            });
        }

        let mut seen = HashSet::new();
        for field in self.effective_fields() {
            if field.name.trim().is_empty() {
                return Err(ValidationError::EmptyName {
                    model: self.name.clone(),
                });
            }

            let column = field.column_name();
            if !is_valid_identifier(&column) {
                return Err(ValidationError::InvalidIdentifier {
                    model: self.name.clone(),
                    name: column,
                    reason: "column name must be 1-63 bytes without NUL".to_string(),
                });
            }

            if !seen.insert(column.clone()) {
                return Err(ValidationError::DuplicateField {
                    model: self.name.clone(),
                    field: column,
                });
            }

            if let DefaultValue::Literal(Scalar::Number(n)) = &field.default {
                if !n.is_finite() {
                    return Err(ValidationError::NonFiniteDefault {
                        model: self.name.clone(),
                        field: field.name.clone(),
                    });
                }
            }
        }

        Ok(())
    }
}
