// SQL生成アダプター
//
// 変更セットからDDL文を生成するアダプター層。
// 生成した文は変更セットと同じ順序で返します。

pub mod postgres;

use crate::core::schema_diff::{ChangeSet, ColumnChange, ColumnDefinition, TableChange};

/// SQLジェネレータートレイト
///
/// 方言ごとのSQLジェネレーターが実装すべきインターフェース。
pub trait SqlGenerator: Send + Sync {
    /// DROP TABLE文を生成
    fn generate_drop_table(&self, schema: &str, table: &str) -> String;

    /// CREATE TABLE文を生成
    ///
    /// # Arguments
    ///
    /// * `schema` - スキーマ名
    /// * `table` - テーブル名
    /// * `columns` - カラム定義（宣言順）
    /// * `primary_key` - 主キーのカラム名
    fn generate_create_table(
        &self,
        schema: &str,
        table: &str,
        columns: &[ColumnDefinition],
        primary_key: &[String],
    ) -> String;

    /// カラム単位の ALTER TABLE 文を生成
    fn generate_column_change(&self, schema: &str, table: &str, change: &ColumnChange) -> String;

    /// 1件の変更に対応する文を生成
    fn generate_change(&self, schema: &str, table: &str, change: &TableChange) -> String {
        match change {
            TableChange::DropTable => self.generate_drop_table(schema, table),
            TableChange::CreateTable {
                columns,
                primary_key,
            } => self.generate_create_table(schema, table, columns, primary_key),
            TableChange::Column(column_change) => {
                self.generate_column_change(schema, table, column_change)
            }
        }
    }

    /// 変更セット全体の文を順序どおりに生成
    fn generate_change_set(&self, change_set: &ChangeSet) -> Vec<String> {
        change_set
            .iter()
            .map(|change| self.generate_change(&change_set.schema, &change_set.table, change))
            .collect()
    }
}
