/// モデル定義ローダーのテスト
///
/// YAMLファイル・ディレクトリからの読み込みと、
/// 読み込んだモデルがエンジンに登録できることを確認します。
mod common;

#[cfg(test)]
mod model_loader_tests {
    use super::common::fake_postgres::FakePostgres;
    use std::fs;
    use std::sync::Arc;
    use stratum_reconcile::core::config::ReconcileOptions;
    use stratum_reconcile::core::model::{DefaultValue, FieldType, Scalar};
    use stratum_reconcile::services::model_loader::ModelLoader;
    use stratum_reconcile::services::reconciler::SchemaReconciler;
    use tempfile::TempDir;

    const EMPLOYEES: &str = r#"
models:
  - name: SimpleEmployee
    properties:
      - name: name
        type: String
        required: true
      - name: number
        type: Number
        default: 5
"#;

    const POSTS: &str = r#"
models:
  - name: Post
    schema: blog
    properties:
      - name: body
        type: String
        default: "{}"
      - name: created
        type: Date
        db_default: now()
  - name: Tag
    table: tags
    id_injection: false
    properties:
      - name: label
        type: String
        id: true
"#;

    /// ディレクトリ内のYAMLをファイル名順に読み込む
    #[test]
    fn test_load_directory_in_file_name_order() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("b_posts.yml"), POSTS).unwrap();
        fs::write(temp_dir.path().join("a_employees.yaml"), EMPLOYEES).unwrap();
        fs::write(temp_dir.path().join("notes.txt"), "not a model").unwrap();

        let models = ModelLoader::new().load(temp_dir.path()).unwrap();

        let names: Vec<&str> = models.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["SimpleEmployee", "Post", "Tag"]);
    }

    /// デフォルト値の種別が保持される
    #[test]
    fn test_default_kinds() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("posts.yaml");
        fs::write(&path, POSTS).unwrap();

        let models = ModelLoader::new().load(&path).unwrap();
        let post = &models[0];

        assert_eq!(post.schema.as_deref(), Some("blog"));
        assert_eq!(post.fields[1].field_type, FieldType::Date);
        assert_eq!(
            post.fields[0].default,
            DefaultValue::Literal(Scalar::Text("{}".to_string()))
        );
        assert_eq!(
            post.fields[1].default,
            DefaultValue::Expression("now()".to_string())
        );

        let tag = &models[1];
        assert_eq!(tag.table_name(), "tags");
        assert_eq!(tag.primary_key_columns(), vec!["label".to_string()]);
    }

    /// 存在しないパスはエラー
    #[test]
    fn test_missing_path() {
        let temp_dir = TempDir::new().unwrap();
        let result = ModelLoader::new().load(&temp_dir.path().join("missing"));
        assert!(result.is_err());
    }

    /// 不正なYAMLはファイル名付きのエラー
    #[test]
    fn test_invalid_yaml_reports_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("broken.yaml");
        fs::write(&path, "models:\n  - name: Broken\n    properties:\n      - name: x\n        type: Unknown\n").unwrap();

        let error = ModelLoader::new().load(&path).unwrap_err();
        assert!(format!("{:#}", error).contains("broken.yaml"));
    }

    /// 読み込んだモデルをエンジンに登録して適用できる
    #[tokio::test]
    async fn test_loaded_models_reconcile() {
        let models = ModelLoader::new().parse(EMPLOYEES).unwrap();
        let db = Arc::new(FakePostgres::new());
        let reconciler = SchemaReconciler::new(db.clone(), ReconcileOptions::default());
        for model in models {
            reconciler.define(model).unwrap();
        }

        reconciler.automigrate_all().await.unwrap();

        assert_eq!(
            db.column_default("simpleemployee", "number").as_deref(),
            Some("5")
        );
        assert!(reconciler.is_actual("SimpleEmployee").await.unwrap());
    }
}
