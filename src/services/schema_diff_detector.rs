// スキーマ差分検出サービス
//
// モデル定義（望ましいスキーマ）とライブスキーマの差分を検出し、
// 適用順に並んだ変更セットを生成します。副作用はありません。

use crate::adapters::default_codec::DefaultCodec;
use crate::adapters::type_mapping::TypeMapper;
use crate::core::model::{FieldSpec, ModelDefinition};
use crate::core::schema::ColumnDescriptor;
use crate::core::schema_diff::{ChangeSet, ColumnChange, ColumnDefinition, TableChange};
use std::collections::HashSet;
use tracing::debug;

/// 差分検出オプション
#[derive(Debug, Clone, Copy, Default)]
pub struct DiffOptions {
    /// モデルにないライブカラムを削除するか
    pub drop_extra_columns: bool,
}

/// スキーマ差分検出サービス
pub struct SchemaDiffDetector<'a> {
    codec: &'a dyn DefaultCodec,
    types: &'a dyn TypeMapper,
}

impl<'a> SchemaDiffDetector<'a> {
    /// 新しいSchemaDiffDetectorを作成
    pub fn new(codec: &'a dyn DefaultCodec, types: &'a dyn TypeMapper) -> Self {
        Self { codec, types }
    }

    /// テーブル作成用の変更セットを生成
    ///
    /// `DropTable`（`drop_existing` 指定時）、デフォルトなしの `CreateTable`、
    /// デフォルトを持つカラムごとの `SetDefault` の順に並べます。
    /// デフォルトを個別の文にすることで、失敗したカラムを特定できます。
    pub fn plan_create(
        &self,
        model: &ModelDefinition,
        schema: &str,
        drop_existing: bool,
    ) -> ChangeSet {
        let mut change_set = ChangeSet::new(schema, model.table_name());
        let fields = model.effective_fields();

        if drop_existing {
            change_set.push(TableChange::DropTable);
        }

        let columns = fields
            .iter()
            .map(|field| ColumnDefinition {
                name: field.column_name(),
                data_type: self.types.format_sql_type(field),
                nullable: is_nullable(field),
                default: None,
            })
            .collect();

        change_set.push(TableChange::CreateTable {
            columns,
            primary_key: model.primary_key_columns(),
        });

        for field in fields.iter().filter(|f| !f.is_generated_id()) {
            let data_type = self.types.format_sql_type(field);
            if let Some(expression) = self.codec.encode(field, &data_type) {
                change_set.push_column(ColumnChange::SetDefault {
                    column: field.column_name(),
                    expression,
                });
            }
        }

        change_set
    }

    /// モデルとライブカラムの差分を検出
    ///
    /// # Arguments
    ///
    /// * `model` - モデル定義
    /// * `schema` - スキーマ名
    /// * `live` - 序数順のライブカラム
    /// * `options` - 差分検出オプション
    ///
    /// # Returns
    ///
    /// 変更セット（一致していれば空）
    pub fn detect_diff(
        &self,
        model: &ModelDefinition,
        schema: &str,
        live: &[ColumnDescriptor],
        options: DiffOptions,
    ) -> ChangeSet {
        let mut change_set = ChangeSet::new(schema, model.table_name());
        let fields = model.effective_fields();

        for field in &fields {
            let column_name = field.column_name();
            match live.iter().find(|c| c.name == column_name) {
                Some(live_column) => self.detect_column_diff(field, live_column, &mut change_set),
                None => {
                    let data_type = self.types.format_sql_type(field);
                    let default = if field.is_generated_id() {
                        None
                    } else {
                        self.codec.encode(field, &data_type)
                    };
                    change_set.push_column(ColumnChange::AddColumn {
                        column: ColumnDefinition {
                            name: column_name,
                            data_type,
                            nullable: is_nullable(field),
                            default,
                        },
                    });
                }
            }
        }

        // モデルにないカラム
        let desired: HashSet<String> = fields.iter().map(|f| f.column_name()).collect();
        for extra in live.iter().filter(|c| !desired.contains(&c.name)) {
            if options.drop_extra_columns {
                change_set.push_column(ColumnChange::DropColumn {
                    column: extra.name.clone(),
                });
            } else {
                debug!(
                    model = %model.name,
                    column = %extra.name,
                    "Leaving column that is not part of the model"
                );
            }
        }

        change_set
    }

    fn detect_column_diff(
        &self,
        field: &FieldSpec,
        live: &ColumnDescriptor,
        change_set: &mut ChangeSet,
    ) {
        let column = field.column_name();
        let data_type = self.types.format_sql_type(field);
        let type_changed =
            self.types.canonical_type(&data_type) != self.types.canonical_type(&live.data_type);
        let desired_default = if field.is_generated_id() {
            None
        } else {
            self.codec.encode(field, &data_type)
        };

        // 型変更前に既存デフォルトを外す（新しい型へキャストできない場合がある）
        let default_dropped = type_changed && live.default_text.is_some() && !field.is_generated_id();
        if default_dropped {
            change_set.push_column(ColumnChange::DropDefault {
                column: column.clone(),
            });
        }

        if type_changed {
            // SERIALは作成時のみ有効な疑似型
            let target_type = if field.is_generated_id() {
                self.types.canonical_type(&data_type)
            } else {
                data_type.clone()
            };
            change_set.push_column(ColumnChange::AlterType {
                column: column.clone(),
                data_type: target_type,
            });
        }

        let nullable = is_nullable(field);
        if live.nullable && !nullable {
            change_set.push_column(ColumnChange::SetNotNull {
                column: column.clone(),
            });
        } else if !live.nullable && nullable {
            change_set.push_column(ColumnChange::DropNotNull {
                column: column.clone(),
            });
        }

        if field.is_generated_id() {
            return;
        }

        if default_dropped {
            if let Some(expression) = desired_default {
                change_set.push_column(ColumnChange::SetDefault { column, expression });
            }
            return;
        }

        if !self
            .codec
            .matches(field, &data_type, live.default_text.as_deref())
        {
            match desired_default {
                Some(expression) => {
                    change_set.push_column(ColumnChange::SetDefault { column, expression })
                }
                None => change_set.push_column(ColumnChange::DropDefault { column }),
            }
        }
    }
}

/// 主キーと必須フィールドはNOT NULL
fn is_nullable(field: &FieldSpec) -> bool {
    !(field.required || field.id)
}
