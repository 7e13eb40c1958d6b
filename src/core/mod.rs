// Core Domain
// モデル定義、ライブスキーマ記述、差分表現、エラー型などの純粋なドメイン型

pub mod config;
pub mod error;
pub mod model;
pub mod naming;
pub mod schema;
pub mod schema_diff;
