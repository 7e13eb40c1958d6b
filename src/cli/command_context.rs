// コマンド共通コンテキスト
//
// 設定ファイル読み込み、モデル読み込み、エンジン構築の重複をCLI層で集約する。

use crate::adapters::database::DatabaseConnectionService;
use crate::core::config::{Config, DatabaseConfig};
use crate::core::model::ModelDefinition;
use crate::services::config_loader::ConfigLoader;
use crate::services::database_config_resolver::DatabaseConfigResolver;
use crate::services::model_loader::ModelLoader;
use crate::services::reconciler::SchemaReconciler;
use anyhow::{anyhow, Context, Result};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

/// CLIコマンド共通の実行コンテキスト
#[derive(Debug, Clone)]
pub struct CommandContext {
    pub project_path: PathBuf,
    pub config_path: PathBuf,
    pub config: Config,
}

impl CommandContext {
    /// プロジェクトルートから設定を読み込んでコンテキストを作成
    pub fn load(project_path: PathBuf) -> Result<Self> {
        Self::load_with_config(project_path, None)
    }

    /// カスタム設定ファイルパスを指定してコンテキストを作成
    pub fn load_with_config(
        project_path: PathBuf,
        custom_config_path: Option<PathBuf>,
    ) -> Result<Self> {
        let config_path = custom_config_path
            .unwrap_or_else(|| project_path.join(Config::DEFAULT_CONFIG_PATH));

        if !config_path.exists() {
            return Err(anyhow!("Config file not found: {:?}", config_path));
        }

        let config =
            ConfigLoader::from_file(&config_path).with_context(|| "Failed to read config file")?;

        Ok(Self {
            project_path,
            config_path,
            config,
        })
    }

    /// モデル定義パスの絶対パス
    pub fn models_path(&self) -> PathBuf {
        self.project_path.join(&self.config.models)
    }

    /// モデル定義を読み込む
    pub fn load_models(&self) -> Result<Vec<ModelDefinition>> {
        let path = self.models_path();
        ModelLoader::new()
            .load(&path)
            .with_context(|| format!("Failed to load models from {:?}", path))
    }

    /// 環境に応じたデータベース設定を取得（環境変数上書き込み）
    pub fn database_config(&self, env: &str) -> Result<DatabaseConfig> {
        let config = self
            .config
            .get_database_config(env)
            .with_context(|| format!("Config for environment '{}' not found", env))?;
        Ok(DatabaseConfigResolver::apply_env_overrides(&config))
    }

    /// 接続し、モデルを登録済みのエンジンを作成
    pub async fn build_reconciler(&self, env: &str) -> Result<SchemaReconciler> {
        let models = self.load_models()?;
        let db_config = self.database_config(env)?;

        let executor = DatabaseConnectionService::new()
            .connect(&db_config)
            .await
            .with_context(|| format!("Failed to connect to environment '{}'", env))?;

        let reconciler =
            SchemaReconciler::new(Arc::new(executor), self.config.reconcile_options());
        for model in models {
            let name = model.name.clone();
            reconciler
                .define(model)
                .with_context(|| format!("Invalid model definition '{}'", name))?;
        }

        debug!(
            models = reconciler.registry().len(),
            env = %env,
            "Reconciler ready"
        );

        Ok(reconciler)
    }
}

/// 対象モデル名を解決（未指定なら登録順のすべて）
pub fn resolve_targets(reconciler: &SchemaReconciler, requested: &[String]) -> Vec<String> {
    if requested.is_empty() {
        reconciler.registry().names()
    } else {
        requested.to_vec()
    }
}
