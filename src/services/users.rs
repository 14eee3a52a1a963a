use std::sync::Arc;

use crate::error::{ApiError, ErrorKind};
use crate::models::user::DEFAULT_STATUS;
use crate::models::{LoginRequest, User};
use crate::repositories::UserStore;
use crate::services::password::{hash_password, verify_dummy, verify_password};

/// ユーザー操作サービス
///
/// リクエスト単位で状態を持たない。ストアは起動時に注入する。
#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn UserStore>,
}

impl UserService {
    /// 新しい UserService を作成
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self { store }
    }

    /// ユーザー作成
    ///
    /// `user.password` は平文で受け取り、保存前にハッシュ化する。
    /// status 未指定なら `active`。
    pub async fn create(&self, mut user: User) -> Result<User, ApiError> {
        if user.status.trim().is_empty() {
            user.status = DEFAULT_STATUS.to_string();
        }
        user.password = match user.password.take().filter(|p| !p.is_empty()) {
            Some(plain) => Some(hash_password(&plain)?),
            None => None,
        };

        self.store.insert(user).await
    }

    /// ユーザー更新
    ///
    /// `is_partial` の場合は既存レコードに空でない項目だけを重ねてから保存する。
    /// それ以外は受け取った値をそのまま保存する。
    pub async fn update(&self, is_partial: bool, user: User) -> Result<User, ApiError> {
        let target = if is_partial {
            let mut current = self.store.find_by_id(user.id).await?;
            current.overlay(user);
            current
        } else {
            user
        };

        self.store.update(target).await
    }

    pub async fn get(&self, id: i64) -> Result<User, ApiError> {
        self.store.find_by_id(id).await
    }

    pub async fn delete(&self, id: i64) -> Result<(), ApiError> {
        self.store.delete(id).await
    }

    pub async fn search(&self, status: &str) -> Result<Vec<User>, ApiError> {
        self.store.find_by_status(status).await
    }

    /// ログイン照合
    ///
    /// ユーザー不在・パスワード未設定・不一致はすべて同じエラーを返す
    /// （どの項目が誤っていたかを漏らさない）。
    pub async fn login(&self, request: &LoginRequest) -> Result<User, ApiError> {
        let user = match self.store.find_by_email(&request.email).await {
            Ok(user) => Some(user),
            Err(e) if e.error_kind == ErrorKind::NotFound => None,
            Err(e) => return Err(e),
        };

        let verified = match user.as_ref().and_then(|u| u.password.as_deref()) {
            Some(hash) => verify_password(&request.password, hash),
            None => {
                verify_dummy(&request.password);
                false
            }
        };

        match user {
            Some(user) if verified => {
                tracing::info!(user_id = user.id, "認証成功");
                Ok(user)
            }
            _ => {
                tracing::warn!(email = %request.email, "認証失敗");
                Err(invalid_credentials())
            }
        }
    }
}

fn invalid_credentials() -> ApiError {
    ApiError::bad_request("invalid user credentials")
}
