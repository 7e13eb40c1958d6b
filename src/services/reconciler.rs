// スキーマ調整サービス
//
// モデルレジストリ・イントロスペクター・差分検出・適用器を組み合わせ、
// automigrate / autoupdate / discover を提供するエンジン本体。

use crate::adapters::default_codec::{DefaultCodec, PostgresDefaultCodec};
use crate::adapters::executor::Executor;
use crate::adapters::introspector::{DatabaseIntrospector, PostgresIntrospector};
use crate::adapters::sql_generator::postgres::PostgresSqlGenerator;
use crate::adapters::sql_generator::SqlGenerator;
use crate::adapters::type_mapping::{PostgresTypeMapper, TypeMapper};
use crate::core::config::ReconcileOptions;
use crate::core::error::{DatabaseError, ReconcileError};
use crate::core::model::ModelDefinition;
use crate::core::schema::{ColumnDescriptor, IntrospectOptions, PropertyDescriptor};
use crate::core::schema_diff::ChangeSet;
use crate::services::migration_applier::{ApplyReport, MigrationApplier};
use crate::services::model_registry::ModelRegistry;
use crate::services::schema_diff_detector::{DiffOptions, SchemaDiffDetector};
use std::sync::Arc;
use tracing::{info, warn};

/// スキーマ調整サービス
pub struct SchemaReconciler {
    executor: Arc<dyn Executor>,
    registry: ModelRegistry,
    introspector: Box<dyn DatabaseIntrospector>,
    codec: Box<dyn DefaultCodec>,
    types: Box<dyn TypeMapper>,
    generator: Box<dyn SqlGenerator>,
    options: ReconcileOptions,
}

impl SchemaReconciler {
    /// PostgreSQL用のエンジンを作成
    pub fn new(executor: Arc<dyn Executor>, options: ReconcileOptions) -> Self {
        Self {
            executor,
            registry: ModelRegistry::new(),
            introspector: Box::new(PostgresIntrospector::new()),
            codec: Box::new(PostgresDefaultCodec::new()),
            types: Box::new(PostgresTypeMapper),
            generator: Box::new(PostgresSqlGenerator::new()),
            options,
        }
    }

    /// モデルレジストリ
    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    /// 調整オプション
    pub fn options(&self) -> &ReconcileOptions {
        &self.options
    }

    /// モデルを検証して登録
    pub fn define(&self, model: ModelDefinition) -> Result<(), ReconcileError> {
        model.validate()?;
        self.registry.register(model);
        Ok(())
    }

    /// テーブルを作り直す（DROP → CREATE → デフォルト設定）
    ///
    /// 失敗時はモデルの登録を解除します。
    pub async fn automigrate(&self, name: &str) -> Result<ApplyReport, ReconcileError> {
        let _guard = self.registry.lock(name).await;
        let model = self.model(name)?;
        let schema = self.schema_of(&model);

        let change_set = self.detector().plan_create(&model, &schema, true);
        self.apply(&model, &change_set).await
    }

    /// 登録順にすべてのモデルをautomigrate
    pub async fn automigrate_all(&self) -> Result<Vec<ApplyReport>, ReconcileError> {
        let mut reports = Vec::new();
        for name in self.registry.names() {
            reports.push(self.automigrate(&name).await?);
        }
        Ok(reports)
    }

    /// ライブスキーマとの差分だけを適用
    ///
    /// テーブルが存在しない場合は作成します。失敗時はモデルの登録を解除します。
    pub async fn autoupdate(&self, name: &str) -> Result<ApplyReport, ReconcileError> {
        let _guard = self.registry.lock(name).await;
        let model = self.model(name)?;

        let change_set = self.plan(&model).await?;
        self.apply(&model, &change_set).await
    }

    /// 登録順にすべてのモデルをautoupdate
    pub async fn autoupdate_all(&self) -> Result<Vec<ApplyReport>, ReconcileError> {
        let mut reports = Vec::new();
        for name in self.registry.names() {
            reports.push(self.autoupdate(&name).await?);
        }
        Ok(reports)
    }

    /// autoupdateで適用される変更セットを計算（DDLは実行しない）
    pub async fn plan_autoupdate(&self, name: &str) -> Result<ChangeSet, ReconcileError> {
        let _guard = self.registry.lock(name).await;
        let model = self.model(name)?;
        self.plan(&model).await
    }

    /// ライブスキーマがモデルと一致しているか
    pub async fn is_actual(&self, name: &str) -> Result<bool, ReconcileError> {
        Ok(self.plan_autoupdate(name).await?.is_empty())
    }

    /// 変更セットのDDL文を生成
    pub fn render_statements(&self, change_set: &ChangeSet) -> Vec<String> {
        self.generator.generate_change_set(change_set)
    }

    /// テーブルのプロパティを探索
    ///
    /// カラム序数順に、生のデフォルト式とデコード済みの値を両方返します。
    pub async fn discover_model_properties(
        &self,
        table: &str,
        options: &IntrospectOptions,
    ) -> Result<Vec<PropertyDescriptor>, ReconcileError> {
        let columns = self.describe(table, options).await?;

        Ok(columns
            .into_iter()
            .map(|column| PropertyDescriptor {
                table: table.to_string(),
                schema: options.schema.clone(),
                field_type: self.types.parse_sql_type(&column.data_type),
                default: column
                    .default_text
                    .as_deref()
                    .map(|text| self.codec.decode(text)),
                column_name: column.name,
                data_type: column.data_type,
                nullable: column.nullable,
                column_default: column.default_text,
            })
            .collect())
    }

    fn model(&self, name: &str) -> Result<ModelDefinition, ReconcileError> {
        self.registry
            .get(name)
            .ok_or_else(|| ReconcileError::UnknownModel {
                name: name.to_string(),
            })
    }

    fn schema_of(&self, model: &ModelDefinition) -> String {
        model.schema_name(&self.options.schema).to_string()
    }

    fn detector(&self) -> SchemaDiffDetector<'_> {
        SchemaDiffDetector::new(self.codec.as_ref(), self.types.as_ref())
    }

    async fn plan(&self, model: &ModelDefinition) -> Result<ChangeSet, ReconcileError> {
        let schema = self.schema_of(model);
        let table = model.table_name();
        let options = IntrospectOptions::with_schema(schema.clone());

        let exists = self
            .introspector
            .table_exists(self.executor.as_ref(), &table, &options)
            .await
            .map_err(|e| introspection_failure(&table, e))?;
        if !exists {
            info!(model = %model.name, table = %table, "Table does not exist, planning create");
            return Ok(self.detector().plan_create(model, &schema, false));
        }

        let live = self.describe(&table, &options).await?;
        Ok(self.detector().detect_diff(
            model,
            &schema,
            &live,
            DiffOptions {
                drop_extra_columns: self.options.drop_extra_columns,
            },
        ))
    }

    async fn describe(
        &self,
        table: &str,
        options: &IntrospectOptions,
    ) -> Result<Vec<ColumnDescriptor>, ReconcileError> {
        self.introspector
            .describe_columns(self.executor.as_ref(), table, options)
            .await
            .map_err(|e| introspection_failure(table, e))
    }

    async fn apply(
        &self,
        model: &ModelDefinition,
        change_set: &ChangeSet,
    ) -> Result<ApplyReport, ReconcileError> {
        let applier = MigrationApplier::new(
            self.executor.as_ref(),
            self.generator.as_ref(),
            self.options.apply_mode,
        );

        match applier.apply(&model.name, change_set).await {
            Ok(report) => Ok(report),
            Err(error) => {
                warn!(model = %model.name, error = %error, "Unregistering model after failed apply");
                self.registry.unregister(&model.name);
                Err(error)
            }
        }
    }
}

impl std::fmt::Debug for SchemaReconciler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemaReconciler")
            .field("registry", &self.registry)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

fn introspection_failure(table: &str, source: DatabaseError) -> ReconcileError {
    ReconcileError::IntrospectionFailure {
        table: table.to_string(),
        source,
    }
}
