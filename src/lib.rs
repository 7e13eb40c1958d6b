// stratum-reconcileライブラリのエントリーポイント
//
// モジュール構造:
// - cli: CLIレイヤー（ユーザー入力の受付とコマンドルーティング）
// - core: コアドメインモデル（モデル定義、ライブスキーマ記述、変更セット、エラー）
// - adapters: データベースアクセスと方言固有処理（イントロスペクション、DDL生成、デフォルト値コーデック）
// - services: 差分検出、適用、レジストリ、調整エンジン

pub mod adapters;
pub mod cli;
pub mod core;
pub mod services;
