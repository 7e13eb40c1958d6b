/// 設定ファイル管理機能のテスト
///
/// このテストは、設定ファイルの読み込み、検証、環境別設定の管理が
/// 正しく動作することを確認します。

#[cfg(test)]
mod config_tests {
    use std::path::Path;
    use stratum_reconcile::core::config::{ApplyMode, Config};
    use stratum_reconcile::services::config_loader::ConfigLoader;
    use stratum_reconcile::services::database_config_resolver::DatabaseConfigResolver;
    use tempfile::TempDir;

    const CONFIG: &str = r#"
version: "1.0"
models: models/app.yaml
schema: hr
apply_mode: sequential
drop_extra_columns: true

environments:
  development:
    host: localhost
    port: 5432
    database: reconcile_dev
    user: postgres
    password: password

  production:
    host: prod.example.com
    database: reconcile_prod
    user: app_user
    timeout: 10
"#;

    /// Config構造体が正しくデシリアライズできることを確認
    #[test]
    fn test_config_deserialization() {
        let config: Config = CONFIG.parse().unwrap();

        assert_eq!(config.version, "1.0");
        assert_eq!(config.models, Path::new("models/app.yaml"));
        assert_eq!(config.schema, "hr");
        assert_eq!(config.apply_mode, ApplyMode::Sequential);
        assert!(config.drop_extra_columns);
    }

    /// 省略時のデフォルト値を確認
    #[test]
    fn test_config_defaults() {
        let yaml = r#"
version: "1.0"
environments:
  development:
    database: reconcile_dev
"#;
        let config: Config = yaml.parse().unwrap();

        assert_eq!(config.models, Path::new("models"));
        assert_eq!(config.schema, "public");
        assert_eq!(config.apply_mode, ApplyMode::Transactional);
        assert!(!config.drop_extra_columns);

        let db = config.get_database_config("development").unwrap();
        assert_eq!(db.host, "localhost");
        assert_eq!(db.port, 5432);
    }

    /// 環境別のデータベース設定を取得できることを確認
    #[test]
    fn test_get_database_config_for_environment() {
        let config: Config = CONFIG.parse().unwrap();

        let dev = config.get_database_config("development").unwrap();
        assert_eq!(dev.database, "reconcile_dev");

        let prod = config.get_database_config("production").unwrap();
        assert_eq!(prod.host, "prod.example.com");
        assert_eq!(prod.port, 5432);
        assert_eq!(prod.timeout, Some(10));

        let error = config.get_database_config("staging").unwrap_err();
        assert!(error.to_string().contains("staging"));
    }

    /// 調整オプションへの変換を確認
    #[test]
    fn test_reconcile_options() {
        let config: Config = CONFIG.parse().unwrap();
        let options = config.reconcile_options();

        assert_eq!(options.schema, "hr");
        assert_eq!(options.apply_mode, ApplyMode::Sequential);
        assert!(options.drop_extra_columns);
    }

    /// 検証エラーを確認
    #[test]
    fn test_validation_rejects_incomplete_config() {
        let no_envs: Config = r#"
version: "1.0"
environments: {}
"#
        .parse()
        .unwrap();
        assert!(no_envs.validate().is_err());

        let empty_database: Config = r#"
version: "1.0"
environments:
  development:
    database: ""
"#
        .parse()
        .unwrap();
        let error = empty_database.validate().unwrap_err();
        assert!(format!("{:#}", error).contains("development"));
    }

    /// ファイルからの読み込みと環境変数による上書き
    #[test]
    fn test_load_from_file_with_overrides() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(Config::DEFAULT_CONFIG_PATH);
        std::fs::write(&path, CONFIG).unwrap();

        let config = ConfigLoader::from_file(&path).unwrap();
        let base = config.get_database_config("development").unwrap();

        let resolved = DatabaseConfigResolver::apply_overrides(&base, |key| match key {
            "DB_HOST" => Some("db.internal".to_string()),
            "DB_PORT" => Some("6543".to_string()),
            _ => None,
        });

        assert_eq!(resolved.host, "db.internal");
        assert_eq!(resolved.port, 6543);
        assert_eq!(resolved.database, "reconcile_dev");
    }

    /// 存在しないファイルはエラー
    #[test]
    fn test_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let result = ConfigLoader::from_file(&temp_dir.path().join("missing.yaml"));
        assert!(result.is_err());
    }
}
