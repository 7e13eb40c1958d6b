// スキーマ差分ドメインモデル
//
// 望ましいスキーマとライブスキーマの差分を表現する型システム。
// 差分検出器が生成し、マイグレーション適用器が一度だけ消費します。

use serde::{Deserialize, Serialize};

/// カラム定義（作成・追加用）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDefinition {
    /// カラム名
    pub name: String,
    /// DDL上の型（例: `integer`, `SERIAL`）
    pub data_type: String,
    /// NULL許可フラグ
    pub nullable: bool,
    /// エンコード済みのデフォルト式
    pub default: Option<String>,
}

/// カラム単位の変更
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum ColumnChange {
    /// カラム追加
    AddColumn { column: ColumnDefinition },
    /// 型変更
    AlterType { column: String, data_type: String },
    /// NOT NULL付与
    SetNotNull { column: String },
    /// NOT NULL解除
    DropNotNull { column: String },
    /// デフォルト設定
    SetDefault { column: String, expression: String },
    /// デフォルト削除
    DropDefault { column: String },
    /// カラム削除（drop_extra_columns 指定時のみ）
    DropColumn { column: String },
}

impl ColumnChange {
    /// 対象カラム名
    pub fn column_name(&self) -> &str {
        match self {
            ColumnChange::AddColumn { column } => &column.name,
            ColumnChange::AlterType { column, .. }
            | ColumnChange::SetNotNull { column }
            | ColumnChange::DropNotNull { column }
            | ColumnChange::SetDefault { column, .. }
            | ColumnChange::DropDefault { column }
            | ColumnChange::DropColumn { column } => column,
        }
    }

    /// 変更に含まれるデフォルト式
    pub fn default_expression(&self) -> Option<&str> {
        match self {
            ColumnChange::AddColumn { column } => column.default.as_deref(),
            ColumnChange::SetDefault { expression, .. } => Some(expression),
            _ => None,
        }
    }

    /// 破壊的変更かどうか
    pub fn is_destructive(&self) -> bool {
        matches!(self, ColumnChange::DropColumn { .. })
    }
}

/// テーブル単位の変更
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action")]
pub enum TableChange {
    /// テーブル削除（automigrateのみ）
    DropTable,
    /// テーブル作成
    CreateTable {
        columns: Vec<ColumnDefinition>,
        primary_key: Vec<String>,
    },
    /// カラム変更
    Column(ColumnChange),
}

impl TableChange {
    /// 対象カラム名（テーブル単位の変更ではNone）
    pub fn column_name(&self) -> Option<&str> {
        match self {
            TableChange::Column(change) => Some(change.column_name()),
            _ => None,
        }
    }

    /// 変更に含まれるデフォルト式
    pub fn default_expression(&self) -> Option<&str> {
        match self {
            TableChange::Column(change) => change.default_expression(),
            _ => None,
        }
    }
}

/// 変更セット
///
/// 1テーブルに対する順序付きの変更リスト。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeSet {
    /// スキーマ名
    pub schema: String,
    /// テーブル名
    pub table: String,
    /// 適用順の変更
    pub changes: Vec<TableChange>,
}

impl ChangeSet {
    /// 空の変更セットを作成
    pub fn new(schema: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            table: table.into(),
            changes: Vec::new(),
        }
    }

    /// テーブル変更を追加
    pub fn push(&mut self, change: TableChange) {
        self.changes.push(change);
    }

    /// カラム変更を追加
    pub fn push_column(&mut self, change: ColumnChange) {
        self.changes.push(TableChange::Column(change));
    }

    /// 変更がないかどうか
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// 変更数
    pub fn len(&self) -> usize {
        self.changes.len()
    }

    /// 変更のイテレータ
    pub fn iter(&self) -> std::slice::Iter<'_, TableChange> {
        self.changes.iter()
    }

    /// 破壊的変更を含むかどうか
    pub fn has_destructive_changes(&self) -> bool {
        self.changes.iter().any(|c| match c {
            TableChange::DropTable => true,
            TableChange::Column(change) => change.is_destructive(),
            TableChange::CreateTable { .. } => false,
        })
    }
}
