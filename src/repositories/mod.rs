pub mod memory;
pub mod postgres;
pub mod translate;

use async_trait::async_trait;

use crate::error::ApiError;
use crate::models::User;

pub use memory::MemoryUserStore;
pub use postgres::PgUserStore;
pub use translate::{ErrorContext, StoreError, translate};

/// users テーブルに対する永続化操作
///
/// 全操作は結果か `ApiError` のどちらか一方を返す。
/// ドライバーのエラーは各実装の中で `translate` を通してから返すこと。
#[async_trait]
pub trait UserStore: Send + Sync {
    /// ユーザーを作成し、採番済みのレコードを返す
    ///
    /// # Errors
    /// - 氏名・メールアドレス欠落: `bad_request`
    /// - メールアドレス重複: `bad_request`
    async fn insert(&self, user: User) -> Result<User, ApiError>;

    /// ID でユーザーを取得
    async fn find_by_id(&self, id: i64) -> Result<User, ApiError>;

    /// メールアドレスでユーザーを取得（パスワードハッシュを含む）
    async fn find_by_email(&self, email: &str) -> Result<User, ApiError>;

    /// 氏名とメールアドレスのみ上書きする（status / password は変更しない）
    async fn update(&self, user: User) -> Result<User, ApiError>;

    /// ユーザーを削除。該当行がなければ `not_found`
    async fn delete(&self, id: i64) -> Result<(), ApiError>;

    /// status が一致する全ユーザーを id 昇順で返す。0 件は `not_found`
    async fn find_by_status(&self, status: &str) -> Result<Vec<User>, ApiError>;
}

/// id は 1 以上
pub(crate) fn ensure_valid_id(id: i64) -> Result<(), ApiError> {
    if id <= 0 {
        return Err(ApiError::bad_request("user id must be a positive number"));
    }
    Ok(())
}

/// insert 前の必須項目チェック
pub(crate) fn ensure_insertable(user: &User) -> Result<(), ApiError> {
    let missing: Vec<String> = [
        ("first_name", &user.first_name),
        ("last_name", &user.last_name),
        ("email", &user.email),
    ]
    .into_iter()
    .filter(|(_, value)| value.trim().is_empty())
    .map(|(field, _)| format!("{field}: required"))
    .collect();

    if !missing.is_empty() {
        return Err(ApiError::bad_request("missing required user fields").with_causes(missing));
    }
    Ok(())
}
