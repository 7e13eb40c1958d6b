// PostgreSQL用SQLジェネレーター
//
// 変更セットからPostgreSQL用のDDL文を生成します。
// 識別子はすべてクォートし、テーブル名はスキーマで修飾します。

use crate::adapters::sql_generator::SqlGenerator;
use crate::adapters::sql_quote::{qualified_table, quote_identifier};
use crate::core::schema_diff::{ColumnChange, ColumnDefinition};

/// PostgreSQL用SQLジェネレーター
#[derive(Debug, Clone)]
pub struct PostgresSqlGenerator {}

impl PostgresSqlGenerator {
    /// 新しいPostgresSqlGeneratorを作成
    pub fn new() -> Self {
        Self {}
    }

    /// カラム定義のSQL文字列を生成
    fn generate_column_definition(&self, column: &ColumnDefinition) -> String {
        let mut parts = Vec::new();

        parts.push(quote_identifier(&column.name));
        parts.push(column.data_type.clone());

        if !column.nullable {
            parts.push("NOT NULL".to_string());
        }

        if let Some(ref default_value) = column.default {
            parts.push(format!("DEFAULT {}", default_value));
        }

        parts.join(" ")
    }

    fn alter_table(&self, schema: &str, table: &str) -> String {
        format!("ALTER TABLE {}", qualified_table(schema, table))
    }
}

impl SqlGenerator for PostgresSqlGenerator {
    fn generate_drop_table(&self, schema: &str, table: &str) -> String {
        format!("DROP TABLE IF EXISTS {}", qualified_table(schema, table))
    }

    fn generate_create_table(
        &self,
        schema: &str,
        table: &str,
        columns: &[ColumnDefinition],
        primary_key: &[String],
    ) -> String {
        let mut elements: Vec<String> = columns
            .iter()
            .map(|column| format!("    {}", self.generate_column_definition(column)))
            .collect();

        if !primary_key.is_empty() {
            let key_columns = primary_key
                .iter()
                .map(|c| quote_identifier(c))
                .collect::<Vec<_>>()
                .join(", ");
            elements.push(format!("    PRIMARY KEY ({})", key_columns));
        }

        format!(
            "CREATE TABLE {} (\n{}\n)",
            qualified_table(schema, table),
            elements.join(",\n")
        )
    }

    fn generate_column_change(&self, schema: &str, table: &str, change: &ColumnChange) -> String {
        let alter = self.alter_table(schema, table);

        match change {
            ColumnChange::AddColumn { column } => {
                format!(
                    "{} ADD COLUMN {}",
                    alter,
                    self.generate_column_definition(column)
                )
            }
            ColumnChange::AlterType { column, data_type } => {
                let name = quote_identifier(column);
                format!(
                    "{} ALTER COLUMN {} TYPE {} USING {}::{}",
                    alter, name, data_type, name, data_type
                )
            }
            ColumnChange::SetNotNull { column } => {
                format!(
                    "{} ALTER COLUMN {} SET NOT NULL",
                    alter,
                    quote_identifier(column)
                )
            }
            ColumnChange::DropNotNull { column } => {
                format!(
                    "{} ALTER COLUMN {} DROP NOT NULL",
                    alter,
                    quote_identifier(column)
                )
            }
            ColumnChange::SetDefault { column, expression } => {
                format!(
                    "{} ALTER COLUMN {} SET DEFAULT {}",
                    alter,
                    quote_identifier(column),
                    expression
                )
            }
            ColumnChange::DropDefault { column } => {
                format!(
                    "{} ALTER COLUMN {} DROP DEFAULT",
                    alter,
                    quote_identifier(column)
                )
            }
            ColumnChange::DropColumn { column } => {
                format!("{} DROP COLUMN {}", alter, quote_identifier(column))
            }
        }
    }
}

impl Default for PostgresSqlGenerator {
    fn default() -> Self {
        Self::new()
    }
}
