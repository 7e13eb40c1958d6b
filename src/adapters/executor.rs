// SQL実行インターフェース
//
// 調整エンジンが消費する唯一のデータベース境界。
// イントロスペクションクエリとDDLの両方がここを通ります。
// トランザクションは ExecutorSession で1本の接続を専有して実行します。

use crate::core::error::DatabaseError;
use async_trait::async_trait;

/// 結果行
///
/// 値はテキストにデコード済み（NULLはNone）。
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Row {
    columns: Vec<String>,
    values: Vec<Option<String>>,
}

impl Row {
    /// カラム名と値から行を作成
    pub fn new(columns: Vec<String>, values: Vec<Option<String>>) -> Self {
        Self { columns, values }
    }

    /// 名前付きの値のペアから行を作成
    pub fn from_pairs<I, K>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, Option<String>)>,
        K: Into<String>,
    {
        let (columns, values) = pairs.into_iter().map(|(k, v)| (k.into(), v)).unzip();
        Self { columns, values }
    }

    /// 位置で値を取得
    pub fn get(&self, index: usize) -> Option<&str> {
        self.values.get(index).and_then(|v| v.as_deref())
    }

    /// カラム名で値を取得
    pub fn get_by_name(&self, name: &str) -> Option<&str> {
        self.columns
            .iter()
            .position(|c| c == name)
            .and_then(|i| self.get(i))
    }

    /// カラム数
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// 空の行かどうか
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// カラム名一覧
    pub fn columns(&self) -> &[String] {
        &self.columns
    }
}

/// SQL実行インターフェース
///
/// 接続管理やタイムアウトは実装側の責務です。
/// エンジンは呼び出しを逐次的に待機します。
#[async_trait]
pub trait Executor: Send + Sync {
    /// SQLを実行して結果行を返す
    ///
    /// # Arguments
    ///
    /// * `sql` - 実行するSQL（プレースホルダは `$1`, `$2`, ...）
    /// * `params` - テキストとしてバインドするパラメータ
    async fn execute(&self, sql: &str, params: &[String]) -> Result<Vec<Row>, DatabaseError>;

    /// 接続を専有するセッションを開始
    ///
    /// セッションが破棄されるまで、他の呼び出しは同じ接続に割り込めません。
    /// `BEGIN` から `COMMIT` / `ROLLBACK` までを1つのセッションで実行します。
    /// 既定の実装は呼び出しごとに `execute` へ委譲します（専有なし）。
    async fn session<'a>(&'a self) -> Result<Box<dyn ExecutorSession + 'a>, DatabaseError> {
        Ok(Box::new(SharedSession { executor: self }))
    }
}

/// 接続を専有したセッション
#[async_trait]
pub trait ExecutorSession: Send {
    /// セッションの接続でSQLを実行
    async fn execute(&mut self, sql: &str, params: &[String]) -> Result<Vec<Row>, DatabaseError>;
}

/// 呼び出しごとにExecutorへ委譲するセッション
struct SharedSession<'a, E: ?Sized> {
    executor: &'a E,
}

#[async_trait]
impl<E> ExecutorSession for SharedSession<'_, E>
where
    E: Executor + ?Sized,
{
    async fn execute(&mut self, sql: &str, params: &[String]) -> Result<Vec<Row>, DatabaseError> {
        self.executor.execute(sql, params).await
    }
}
