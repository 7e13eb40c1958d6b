// Adapters
// データベースへのアクセスと方言固有の処理を抽象化

pub mod connection_string;
pub mod database;
pub mod default_codec;
pub mod executor;
pub mod introspector;
pub mod sql_generator;
pub mod sql_quote;
pub mod type_mapping;
