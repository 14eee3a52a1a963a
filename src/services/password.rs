use std::sync::LazyLock;

use argon2::password_hash::SaltString;
use argon2::password_hash::rand_core::OsRng;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};

use crate::error::ApiError;

/// ユーザー不在時の照合に使うダミーハッシュ
///
/// タイミング攻撃対策: 存在しないユーザーでも同じコストの検証を行う
static DUMMY_HASH: LazyLock<Option<String>> = LazyLock::new(|| {
    let salt = SaltString::encode_b64(b"users-api-dummy-salt").ok()?;
    Argon2::default()
        .hash_password(b"users-api-dummy-password", &salt)
        .ok()
        .map(|hash| hash.to_string())
});

/// パスワードをargon2idでハッシュ化
pub fn hash_password(password: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| {
            tracing::error!(error = ?e, "パスワードハッシュ生成エラー");
            ApiError::internal("password hash error")
        })?;
    Ok(hash.to_string())
}

/// パスワードを検証
///
/// ハッシュが壊れている場合も不一致として扱う
pub fn verify_password(password: &str, hash: &str) -> bool {
    let parsed_hash = match PasswordHash::new(hash) {
        Ok(parsed) => parsed,
        Err(e) => {
            tracing::error!(error = ?e, "パスワードハッシュのパースエラー");
            return false;
        }
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

/// 照合対象がない場合のダミー検証（結果は常に不一致）
pub fn verify_dummy(password: &str) {
    if let Some(hash) = DUMMY_HASH.as_deref() {
        let _ = verify_password(password, hash);
    }
}
