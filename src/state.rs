use std::sync::Arc;

use crate::repositories::UserStore;
use crate::services::UserService;

/// アプリケーション共有状態
///
/// axum の State として全ハンドラーで共有される。
/// Clone は必須（axum が内部で clone するため）。
#[derive(Clone)]
pub struct AppState {
    /// ユーザーサービス（ストアは起動時に注入）
    pub users: UserService,
}

impl AppState {
    /// 新しい AppState を作成
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self {
            users: UserService::new(store),
        }
    }
}
