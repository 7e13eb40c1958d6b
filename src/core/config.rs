// 設定ファイル管理
//
// プロジェクトの設定ファイル（YAML形式）の読み込み、検証、
// 環境別のデータベース接続設定と調整オプションの管理を行います。

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::str::FromStr;

/// 変更セットの適用モード
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplyMode {
    /// 変更セット全体を1トランザクションで適用（失敗時はロールバック）
    #[default]
    Transactional,
    /// 1文ずつ適用（失敗前の文は適用されたまま）
    Sequential,
}

impl std::fmt::Display for ApplyMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApplyMode::Transactional => write!(f, "transactional"),
            ApplyMode::Sequential => write!(f, "sequential"),
        }
    }
}

/// 調整エンジンのオプション
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileOptions {
    /// 既定のスキーマ
    pub schema: String,
    /// 適用モード
    pub apply_mode: ApplyMode,
    /// モデルに存在しないカラムを削除するか（破壊的、明示的なオプトインのみ）
    pub drop_extra_columns: bool,
}

impl Default for ReconcileOptions {
    fn default() -> Self {
        Self {
            schema: default_schema(),
            apply_mode: ApplyMode::default(),
            drop_extra_columns: false,
        }
    }
}

/// プロジェクト設定
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// 設定ファイルのバージョン
    pub version: String,

    /// モデル定義のパス（ファイルまたはディレクトリ）
    #[serde(default = "default_models_path")]
    pub models: PathBuf,

    /// 既定のスキーマ
    #[serde(default = "default_schema")]
    pub schema: String,

    /// 適用モード
    #[serde(default)]
    pub apply_mode: ApplyMode,

    /// モデルに存在しないカラムを削除するか
    #[serde(default)]
    pub drop_extra_columns: bool,

    /// 環境別のデータベース設定
    pub environments: HashMap<String, DatabaseConfig>,
}

fn default_models_path() -> PathBuf {
    PathBuf::from("models")
}

fn default_schema() -> String {
    crate::core::naming::DEFAULT_SCHEMA.to_string()
}

impl Config {
    /// デフォルトの設定ファイルパス
    pub const DEFAULT_CONFIG_PATH: &'static str = crate::core::naming::CONFIG_FILE;

    /// 指定された環境のデータベース設定を取得
    pub fn get_database_config(&self, environment: &str) -> Result<DatabaseConfig> {
        self.environments.get(environment).cloned().ok_or_else(|| {
            anyhow!(
                "Environment '{}' not found. Available environments: {:?}",
                environment,
                self.environments.keys().collect::<Vec<_>>()
            )
        })
    }

    /// 調整エンジンのオプションを取得
    pub fn reconcile_options(&self) -> ReconcileOptions {
        ReconcileOptions {
            schema: self.schema.clone(),
            apply_mode: self.apply_mode,
            drop_extra_columns: self.drop_extra_columns,
        }
    }

    /// 設定の妥当性を検証
    pub fn validate(&self) -> Result<()> {
        // バージョンチェック
        if self.version.is_empty() {
            return Err(anyhow!("Config file version is not specified"));
        }

        if self.schema.trim().is_empty() {
            return Err(anyhow!("Schema name must not be empty"));
        }

        // 環境設定チェック
        if self.environments.is_empty() {
            return Err(anyhow!(
                "At least one environment configuration is required"
            ));
        }

        // 各環境のデータベース設定を検証
        for (env_name, db_config) in &self.environments {
            db_config
                .validate()
                .with_context(|| format!("Invalid config for environment '{}'", env_name))?;
        }

        Ok(())
    }
}

/// std::str::FromStrトレイトの実装
impl FromStr for Config {
    type Err = anyhow::Error;

    fn from_str(yaml: &str) -> Result<Self, Self::Err> {
        serde_saphyr::from_str(yaml).with_context(|| "Failed to parse config file")
    }
}

/// データベース接続設定
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// ホスト名
    #[serde(default = "default_host")]
    pub host: String,

    /// ポート番号
    #[serde(default = "default_port")]
    pub port: u16,

    /// データベース名
    pub database: String,

    /// ユーザー名
    pub user: Option<String>,

    /// パスワード
    pub password: Option<String>,

    /// 接続タイムアウト（秒）
    pub timeout: Option<u64>,
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    5432 // PostgreSQLのデフォルトポート
}

impl DatabaseConfig {
    /// Validate database configuration
    pub fn validate(&self) -> Result<()> {
        if self.database.is_empty() {
            return Err(anyhow!("Database name is not specified"));
        }

        if self.host.is_empty() {
            return Err(anyhow!("Database host is not specified"));
        }

        Ok(())
    }
}
