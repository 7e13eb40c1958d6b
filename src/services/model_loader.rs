// モデル定義読み込みサービス
//
// YAMLのモデル定義ファイル（単一ファイルまたはディレクトリ）を読み込み、
// DTOを経由して ModelDefinition に変換します。

use crate::core::model::{DefaultValue, FieldSpec, FieldType, ModelDefinition, Scalar};
use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

/// モデル定義ファイル用DTO
#[derive(Debug, Clone, Deserialize)]
pub struct ModelFileDto {
    /// 宣言順のモデル
    #[serde(default)]
    pub models: Vec<ModelDto>,
}

/// モデル定義DTO
#[derive(Debug, Clone, Deserialize)]
pub struct ModelDto {
    /// モデル名
    pub name: String,

    /// テーブル名の上書き
    #[serde(default)]
    pub table: Option<String>,

    /// スキーマ名の上書き
    #[serde(default)]
    pub schema: Option<String>,

    /// IDカラムの自動注入（デフォルト: true）
    #[serde(default = "default_true")]
    pub id_injection: bool,

    /// プロパティ（宣言順）
    #[serde(default)]
    pub properties: Vec<PropertyDto>,
}

/// プロパティ定義DTO
///
/// `default` は型付きリテラル、`db_default` は生のバックエンド式。
#[derive(Debug, Clone, Deserialize)]
pub struct PropertyDto {
    pub name: String,

    #[serde(rename = "type")]
    pub field_type: FieldType,

    #[serde(default)]
    pub default: Option<Scalar>,

    #[serde(default)]
    pub db_default: Option<String>,

    #[serde(default)]
    pub column: Option<String>,

    #[serde(default)]
    pub data_type: Option<String>,

    #[serde(default)]
    pub required: bool,

    #[serde(default)]
    pub id: bool,

    #[serde(default)]
    pub generated: bool,
}

fn default_true() -> bool {
    true
}

impl ModelDto {
    /// ドメインモデルへ変換
    pub fn into_model(self) -> ModelDefinition {
        let model_name = self.name;
        let fields = self
            .properties
            .into_iter()
            .map(|property| property.into_field(&model_name))
            .collect();

        ModelDefinition {
            name: model_name,
            fields,
            table: self.table,
            schema: self.schema,
            id_injection: self.id_injection,
        }
    }
}

impl PropertyDto {
    /// ドメインのフィールド定義へ変換
    ///
    /// `db_default` と `default` が両方ある場合は `db_default` を優先します。
    pub fn into_field(self, model: &str) -> FieldSpec {
        let default = match (self.db_default, self.default) {
            (Some(expression), literal) => {
                if literal.is_some() {
                    warn!(
                        model = %model,
                        field = %self.name,
                        "Both default and db_default are set; using db_default"
                    );
                }
                DefaultValue::Expression(expression)
            }
            (None, Some(literal)) => DefaultValue::Literal(literal),
            (None, None) => DefaultValue::None,
        };

        FieldSpec {
            name: self.name,
            field_type: self.field_type,
            default,
            column: self.column,
            data_type: self.data_type,
            required: self.required,
            id: self.id,
            generated: self.generated,
        }
    }
}

/// モデル定義読み込みサービス
#[derive(Debug, Clone, Default)]
pub struct ModelLoader;

impl ModelLoader {
    /// 新しいModelLoaderを作成
    pub fn new() -> Self {
        Self
    }

    /// ファイルまたはディレクトリからモデル定義を読み込む
    ///
    /// ディレクトリの場合は `.yaml` / `.yml` をファイル名順に読み込みます。
    pub fn load(&self, path: &Path) -> Result<Vec<ModelDefinition>> {
        if !path.exists() {
            return Err(anyhow!("Model path not found: {:?}", path));
        }

        if path.is_dir() {
            let mut models = Vec::new();
            for file in self.scan_yaml_files(path)? {
                models.extend(self.load_file(&file)?);
            }
            Ok(models)
        } else {
            self.load_file(path)
        }
    }

    /// 単一のYAMLファイルを読み込む
    pub fn load_file(&self, path: &Path) -> Result<Vec<ModelDefinition>> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read model file: {:?}", path))?;
        self.parse(&content)
            .with_context(|| format!("Failed to parse model file: {:?}", path))
    }

    /// YAML文字列を解析
    pub fn parse(&self, yaml: &str) -> Result<Vec<ModelDefinition>> {
        let dto: ModelFileDto = serde_saphyr::from_str(yaml)?;
        Ok(dto.models.into_iter().map(ModelDto::into_model).collect())
    }

    fn scan_yaml_files(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        let mut yaml_files = Vec::new();

        for entry in
            fs::read_dir(dir).with_context(|| format!("Failed to read directory: {:?}", dir))?
        {
            let path = entry?.path();
            if !path.is_file() {
                continue;
            }
            if let Some(extension) = path.extension() {
                if extension == "yaml" || extension == "yml" {
                    yaml_files.push(path);
                }
            }
        }

        yaml_files.sort();
        Ok(yaml_files)
    }
}
