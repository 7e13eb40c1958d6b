// 命名ポリシー
//
// アプリケーション名、設定ファイル名、識別子フォールディング規則の単一ソースを提供します。

/// 現行アプリケーション名
pub const APP_NAME: &str = "stratum-reconcile";

/// 既定の設定ファイル名
pub const CONFIG_FILE: &str = ".stratum-reconcile.yaml";

/// 既定のスキーマ名
pub const DEFAULT_SCHEMA: &str = "public";

/// 自動注入されるIDカラム名
pub const INJECTED_ID_COLUMN: &str = "id";

/// PostgreSQLの識別子フォールディング（クォートなし識別子は小文字化される）
///
/// モデル名・プロパティ名からテーブル名・カラム名を導出する際に使用します。
pub fn fold_identifier(name: &str) -> String {
    name.to_lowercase()
}

/// 識別子として妥当かどうか
///
/// 空文字列、NUL文字、63バイト超（PostgreSQLのNAMEDATALEN - 1）を拒否します。
pub fn is_valid_identifier(name: &str) -> bool {
    !name.is_empty() && !name.contains('\0') && name.len() <= 63
}
