// モデルレジストリ
//
// エンジンインスタンスが所有するモデル定義の登録簿。
// 同一モデルに対する調整処理はモデルごとの非同期ロックで直列化します。

use crate::core::model::ModelDefinition;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::debug;

#[derive(Default)]
struct RegistryState {
    models: HashMap<String, ModelDefinition>,
    order: Vec<String>,
    locks: HashMap<String, Arc<Mutex<()>>>,
}

/// モデルレジストリ
#[derive(Default)]
pub struct ModelRegistry {
    state: RwLock<RegistryState>,
}

impl ModelRegistry {
    /// 空のレジストリを作成
    pub fn new() -> Self {
        Self::default()
    }

    /// モデルを登録
    ///
    /// 同名のモデルが登録済みの場合は置き換えます（登録順は維持）。
    pub fn register(&self, model: ModelDefinition) {
        let mut state = self.write();
        let name = model.name.clone();
        if !state.models.contains_key(&name) {
            state.order.push(name.clone());
        }
        state.locks.entry(name.clone()).or_default();
        state.models.insert(name.clone(), model);
        debug!(model = %name, "Registered model");
    }

    /// モデルの登録を解除
    pub fn unregister(&self, name: &str) -> Option<ModelDefinition> {
        let mut state = self.write();
        let removed = state.models.remove(name);
        if removed.is_some() {
            state.order.retain(|n| n != name);
            state.locks.remove(name);
            debug!(model = %name, "Unregistered model");
        }
        removed
    }

    /// モデル定義を取得
    pub fn get(&self, name: &str) -> Option<ModelDefinition> {
        self.read().models.get(name).cloned()
    }

    /// 登録済みかどうか
    pub fn contains(&self, name: &str) -> bool {
        self.read().models.contains_key(name)
    }

    /// 登録順のモデル名
    pub fn names(&self) -> Vec<String> {
        self.read().order.clone()
    }

    /// 登録数
    pub fn len(&self) -> usize {
        self.read().order.len()
    }

    /// 空かどうか
    pub fn is_empty(&self) -> bool {
        self.read().order.is_empty()
    }

    /// モデル単位のロックを取得
    ///
    /// 未登録のモデル名には共有されない一時的なロックを返します。
    pub async fn lock(&self, name: &str) -> OwnedMutexGuard<()> {
        let lock = self.read().locks.get(name).cloned().unwrap_or_default();
        lock.lock_owned().await
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, RegistryState> {
        self.state.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, RegistryState> {
        self.state.write().unwrap_or_else(|e| e.into_inner())
    }
}

impl std::fmt::Debug for ModelRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelRegistry")
            .field("models", &self.names())
            .finish()
    }
}
