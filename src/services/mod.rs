// Services Layer
// ドメインロジックを実行するサービス層

pub mod config_loader;
pub mod database_config_resolver;
pub mod migration_applier;
pub mod model_loader;
pub mod model_registry;
pub mod reconciler;
pub mod schema_diff_detector;
