// データベースイントロスペクター
//
// データベースからライブスキーマ情報を取得するための抽象化レイヤー。
// 結果はキャッシュせず、呼び出し時点でコミット済みの状態を反映します。

use crate::adapters::executor::{Executor, Row};
use crate::adapters::type_mapping::{PostgresTypeMapper, TypeMetadata};
use crate::core::error::DatabaseError;
use crate::core::schema::{ColumnDescriptor, IntrospectOptions};
use async_trait::async_trait;
use tracing::debug;

/// データベーススキーマ取得インターフェース
#[async_trait]
pub trait DatabaseIntrospector: Send + Sync {
    /// テーブルが存在するか確認
    async fn table_exists(
        &self,
        executor: &dyn Executor,
        table_name: &str,
        options: &IntrospectOptions,
    ) -> Result<bool, DatabaseError>;

    /// カラム情報を序数順で取得
    async fn describe_columns(
        &self,
        executor: &dyn Executor,
        table_name: &str,
        options: &IntrospectOptions,
    ) -> Result<Vec<ColumnDescriptor>, DatabaseError>;
}

/// PostgreSQL用イントロスペクター
#[derive(Debug, Clone, Copy, Default)]
pub struct PostgresIntrospector {
    types: PostgresTypeMapper,
}

impl PostgresIntrospector {
    /// 新しいPostgresIntrospectorを作成
    pub fn new() -> Self {
        Self {
            types: PostgresTypeMapper,
        }
    }

    /// テーブル存在確認SQL
    pub fn table_exists_sql(&self) -> &'static str {
        r#"
            SELECT table_name::text
            FROM information_schema.tables
            WHERE table_schema = $1 AND table_name = $2
        "#
    }

    /// カラム情報取得SQL
    pub fn describe_columns_sql(&self) -> &'static str {
        r#"
            SELECT
                column_name::text,
                data_type::text,
                is_nullable::text,
                column_default::text,
                character_maximum_length::text,
                numeric_precision::text,
                numeric_scale::text,
                udt_name::text,
                datetime_precision::text
            FROM information_schema.columns
            WHERE table_schema = $1 AND table_name = $2
            ORDER BY ordinal_position
        "#
    }

    /// 結果行をカラム記述へ変換
    fn to_descriptor(&self, row: &Row) -> Option<ColumnDescriptor> {
        let name = row.get(0)?.to_string();
        let data_type = row.get(1)?;
        let metadata = TypeMetadata {
            char_max_length: row.get(4).and_then(|v| v.parse().ok()),
            numeric_precision: row.get(5).and_then(|v| v.parse().ok()),
            numeric_scale: row.get(6).and_then(|v| v.parse().ok()),
            udt_name: row.get(7).map(str::to_string),
            datetime_precision: row.get(8).and_then(|v| v.parse().ok()),
        };

        Some(ColumnDescriptor {
            name,
            data_type: self.types.describe_live_type(data_type, &metadata),
            nullable: row.get(2) == Some("YES"),
            default_text: row.get(3).map(str::to_string),
        })
    }
}

#[async_trait]
impl DatabaseIntrospector for PostgresIntrospector {
    async fn table_exists(
        &self,
        executor: &dyn Executor,
        table_name: &str,
        options: &IntrospectOptions,
    ) -> Result<bool, DatabaseError> {
        let rows = executor
            .execute(
                self.table_exists_sql(),
                &[options.schema.clone(), table_name.to_string()],
            )
            .await?;

        Ok(!rows.is_empty())
    }

    async fn describe_columns(
        &self,
        executor: &dyn Executor,
        table_name: &str,
        options: &IntrospectOptions,
    ) -> Result<Vec<ColumnDescriptor>, DatabaseError> {
        let rows = executor
            .execute(
                self.describe_columns_sql(),
                &[options.schema.clone(), table_name.to_string()],
            )
            .await?;

        let columns: Vec<ColumnDescriptor> =
            rows.iter().filter_map(|row| self.to_descriptor(row)).collect();

        debug!(
            schema = %options.schema,
            table = %table_name,
            columns = columns.len(),
            "Introspected columns"
        );

        Ok(columns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// 固定の行を返すExecutor
    struct StaticExecutor {
        rows: Vec<Row>,
        calls: Mutex<Vec<(String, Vec<String>)>>,
    }

    #[async_trait]
    impl Executor for StaticExecutor {
        async fn execute(&self, sql: &str, params: &[String]) -> Result<Vec<Row>, DatabaseError> {
            self.calls
                .lock()
                .unwrap()
                .push((sql.to_string(), params.to_vec()));
            Ok(self.rows.clone())
        }
    }

    fn column_row(values: [Option<&str>; 9]) -> Row {
        let names = [
            "column_name",
            "data_type",
            "is_nullable",
            "column_default",
            "character_maximum_length",
            "numeric_precision",
            "numeric_scale",
            "udt_name",
            "datetime_precision",
        ];
        Row::from_pairs(
            names
                .iter()
                .zip(values.iter())
                .map(|(n, v)| (*n, v.map(str::to_string))),
        )
    }

    #[tokio::test]
    async fn test_describe_columns_maps_rows_in_order() {
        let executor = StaticExecutor {
            rows: vec![
                column_row([
                    Some("string"),
                    Some("text"),
                    Some("YES"),
                    Some("'{}'::text"),
                    None,
                    None,
                    None,
                    Some("text"),
                    None,
                ]),
                column_row([
                    Some("code"),
                    Some("character varying"),
                    Some("NO"),
                    None,
                    Some("20"),
                    None,
                    None,
                    Some("varchar"),
                    None,
                ]),
                column_row([
                    Some("created"),
                    Some("timestamp without time zone"),
                    Some("YES"),
                    None,
                    None,
                    None,
                    None,
                    Some("timestamp"),
                    Some("3"),
                ]),
                column_row([
                    Some("tags"),
                    Some("ARRAY"),
                    Some("YES"),
                    None,
                    None,
                    None,
                    None,
                    Some("_text"),
                    None,
                ]),
            ],
            calls: Mutex::new(Vec::new()),
        };

        let introspector = PostgresIntrospector::new();
        let columns = introspector
            .describe_columns(
                &executor,
                "simpleemployee",
                &IntrospectOptions::with_schema("public"),
            )
            .await
            .unwrap();

        assert_eq!(columns.len(), 4);
        assert_eq!(columns[0].name, "string");
        assert_eq!(columns[0].default_text.as_deref(), Some("'{}'::text"));
        assert!(columns[0].nullable);
        assert_eq!(columns[1].data_type, "character varying(20)");
        assert!(!columns[1].nullable);
        assert_eq!(columns[1].default_text, None);
        assert_eq!(columns[2].data_type, "timestamp(3) without time zone");
        assert_eq!(columns[3].data_type, "text[]");

        let calls = executor.calls.lock().unwrap();
        assert!(calls[0].0.contains("ORDER BY ordinal_position"));
        assert_eq!(
            calls[0].1,
            vec!["public".to_string(), "simpleemployee".to_string()]
        );
    }

    #[tokio::test]
    async fn test_table_exists() {
        let empty = StaticExecutor {
            rows: vec![],
            calls: Mutex::new(Vec::new()),
        };
        let introspector = PostgresIntrospector::new();
        assert!(!introspector
            .table_exists(&empty, "missing", &IntrospectOptions::default())
            .await
            .unwrap());

        let present = StaticExecutor {
            rows: vec![Row::from_pairs(vec![("table_name", Some("t".to_string()))])],
            calls: Mutex::new(Vec::new()),
        };
        assert!(introspector
            .table_exists(&present, "t", &IntrospectOptions::default())
            .await
            .unwrap());
    }
}
